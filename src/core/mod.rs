pub mod aggregator;
pub mod etl;
pub mod normalizer;
pub mod palette;
pub mod reader;

pub use crate::domain::model::{DeliveryRecord, FleetReport, FleetSummary, RawTable, TruckSummary};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
