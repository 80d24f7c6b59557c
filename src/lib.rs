pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use app::pipelines::FleetPipeline;
pub use config::toml_config::TomlConfig;
pub use core::etl::EtlEngine;
pub use domain::model::{DeliveryRecord, FleetReport, FleetSummary, TruckSummary, Utilization};
pub use utils::error::{FleetError, Result};
