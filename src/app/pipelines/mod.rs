pub mod fleet_pipeline;

pub use fleet_pipeline::FleetPipeline;
