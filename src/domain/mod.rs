// Domain layer: delivery records, fleet summaries and the ports the pipeline runs through.

pub mod model;
pub mod ports;
