//! CLI 與 TOML 配置共用的選項

use crate::core::palette::DEFAULT_PALETTE;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_delimiter, validate_encoding, validate_non_empty_list, validate_non_empty_string,
    validate_path, validate_range, validate_url,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceOptions {
    pub path: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_delimiter() -> String {
    ";".to_string()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

impl SourceOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            delimiter: default_delimiter(),
            encoding: default_encoding(),
        }
    }
}

/// 輸入表頭名稱，去除空白後需完全相符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub truck: String,
    pub weight: String,
    pub capacity: String,
    pub latitude: String,
    pub longitude: String,
    pub origin_latitude: String,
    pub origin_longitude: String,
    pub customer: String,
    pub revenue: String,
    /// 選填欄位，缺少時班別為空字串
    pub shift: Option<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            truck: "CAMINHAO".to_string(),
            weight: "PESO".to_string(),
            capacity: "CARGA".to_string(),
            latitude: "LATITUDE".to_string(),
            longitude: "LONGITUDE".to_string(),
            origin_latitude: "LATITUDE CASA".to_string(),
            origin_longitude: "LONGITUDE CASA".to_string(),
            customer: "NOME FANTASIA".to_string(),
            revenue: "FATURAMENTO".to_string(),
            shift: Some("TURNO".to_string()),
        }
    }
}

impl ColumnMapping {
    /// 必要欄位（欄位設定名稱, 表頭名稱）
    pub fn required(&self) -> [(&'static str, &str); 9] {
        [
            ("truck", self.truck.as_str()),
            ("weight", self.weight.as_str()),
            ("capacity", self.capacity.as_str()),
            ("latitude", self.latitude.as_str()),
            ("longitude", self.longitude.as_str()),
            ("origin_latitude", self.origin_latitude.as_str()),
            ("origin_longitude", self.origin_longitude.as_str()),
            ("customer", self.customer.as_str()),
            ("revenue", self.revenue.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupFields {
    pub weight: bool,
    pub revenue: bool,
    pub shift: bool,
}

impl Default for PopupFields {
    fn default() -> Self {
        Self {
            weight: true,
            revenue: true,
            shift: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendFields {
    pub customer_count: bool,
    pub updated: bool,
    pub utilization: bool,
    pub truck_revenue: bool,
    pub total_revenue: bool,
}

impl Default for LegendFields {
    fn default() -> Self {
        Self {
            customer_count: true,
            updated: true,
            utilization: true,
            truck_revenue: false,
            total_revenue: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub title: String,
    /// `[lat, lon]`，未設定時取所有座標平均
    pub center: Option<[f64; 2]>,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub palette: Vec<String>,
    pub origin_label: String,
    pub origin_color: String,
    pub origin_icon: String,
    pub destination_icon: String,
    pub icon_by_shift: bool,
    pub shift_icons: BTreeMap<String, String>,
    pub line_weight: u32,
    pub line_opacity: f64,
    pub currency_symbol: String,
    /// 圖例上的日期，未設定時為今天
    pub updated: Option<String>,
    pub popup: PopupFields,
    pub legend: LegendFields,
}

impl Default for RenderOptions {
    fn default() -> Self {
        let shift_icons = [("MANHA", "sun-o"), ("DIURNO", "clock-o")]
            .into_iter()
            .map(|(shift, icon)| (shift.to_string(), icon.to_string()))
            .collect();

        Self {
            title: "Mapa de clientes".to_string(),
            center: None,
            zoom: 10,
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            origin_label: "Casa de origem".to_string(),
            origin_color: "green".to_string(),
            origin_icon: "home".to_string(),
            destination_icon: "shopping-cart".to_string(),
            icon_by_shift: false,
            shift_icons,
            line_weight: 2,
            line_opacity: 0.8,
            currency_symbol: "R$".to_string(),
            updated: None,
            popup: PopupFields::default(),
            legend: LegendFields::default(),
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<()> {
        validate_range("render.zoom", self.zoom, 1, 19)?;
        validate_url("render.tile_url", &self.tile_url)?;
        validate_non_empty_list("render.palette", &self.palette)?;
        validate_range("render.line_opacity", self.line_opacity, 0.0, 1.0)?;
        validate_non_empty_string("render.origin_label", &self.origin_label)?;
        if let Some([lat, lon]) = self.center {
            validate_range("render.center.lat", lat, -90.0, 90.0)?;
            validate_range("render.center.lon", lon, -180.0, 180.0)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputFilenames {
    pub html: String,
    pub json: String,
    pub csv: String,
}

impl Default for OutputFilenames {
    fn default() -> Self {
        Self {
            html: "mapa_clientes.html".to_string(),
            json: "fleet_report.json".to_string(),
            csv: "truck_summary.csv".to_string(),
        }
    }
}

impl OutputFilenames {
    pub fn for_format(&self, format: OutputFormat) -> &str {
        match format {
            OutputFormat::Html => &self.html,
            OutputFormat::Json => &self.json,
            OutputFormat::Csv => &self.csv,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionOptions {
    pub enabled: bool,
    #[serde(default = "default_archive_name")]
    pub filename: String,
}

fn default_archive_name() -> String {
    "fleet_map.zip".to_string()
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            filename: default_archive_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOptions {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<OutputFormat>,
    #[serde(default)]
    pub filenames: OutputFilenames,
    pub compression: Option<CompressionOptions>,
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_output_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Html]
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            output_formats: default_output_formats(),
            filenames: OutputFilenames::default(),
            compression: None,
        }
    }
}

impl LoadOptions {
    pub fn archive_name(&self) -> Option<&str> {
        self.compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

/// 所有配置來源共用的檢查
pub fn validate_options(
    source: &SourceOptions,
    render: &RenderOptions,
    load: &LoadOptions,
) -> Result<()> {
    validate_path("source.path", &source.path)?;
    validate_delimiter("source.delimiter", &source.delimiter)?;
    validate_encoding("source.encoding", &source.encoding)?;
    render.validate()?;
    validate_path("load.output_path", &load.output_path)?;
    validate_non_empty_list("load.output_formats", &load.output_formats)?;
    for format in &load.output_formats {
        validate_path("load.filenames", load.filenames.for_format(*format))?;
    }
    if let Some(archive) = load.archive_name() {
        validate_path("load.compression.filename", archive)?;
    }
    Ok(())
}
