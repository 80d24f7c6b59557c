use crate::config::options::{ColumnMapping, LoadOptions, RenderOptions, SourceOptions};
use crate::domain::model::{FleetReport, RawTable};
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn source_options(&self) -> SourceOptions;
    fn columns(&self) -> ColumnMapping;
    fn render_options(&self) -> RenderOptions;
    fn load_options(&self) -> LoadOptions;
}

pub trait Pipeline {
    fn extract(&self) -> Result<RawTable>;
    fn transform(&self, table: RawTable) -> Result<FleetReport>;
    fn load(&self, report: FleetReport) -> Result<String>;
}
