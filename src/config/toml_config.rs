use crate::config::options::{
    validate_options, ColumnMapping, LoadOptions, RenderOptions, SourceOptions,
};
use crate::core::ConfigProvider;
use crate::utils::error::{FleetError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceOptions,
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub render: RenderOptions,
    #[serde(default)]
    pub load: LoadOptions,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FleetError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${DELIVERY_FILE})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        if let Some(leftover) = ENV_PLACEHOLDER.find(&self.source.path) {
            return Err(FleetError::ConfigValidationError {
                field: "source.path".to_string(),
                message: format!("Environment variable {} is not set", leftover.as_str()),
            });
        }

        validate_options(&self.source, &self.render, &self.load)
    }

    pub fn output_path(&self) -> &str {
        &self.load.output_path
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn source_options(&self) -> SourceOptions {
        self.source.clone()
    }

    fn columns(&self) -> ColumnMapping {
        self.columns.clone()
    }

    fn render_options(&self) -> RenderOptions {
        self.render.clone()
    }

    fn load_options(&self) -> LoadOptions {
        self.load.clone()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::OutputFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_toml_config() {
        let toml_content = r#"
[pipeline]
name = "entregas"

[source]
path = "dbcaminhoes.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "entregas");
        assert_eq!(config.source.delimiter, ";");
        assert_eq!(config.source.encoding, "utf-8");
        assert_eq!(config.columns, ColumnMapping::default());
        assert_eq!(config.load.output_formats, vec![OutputFormat::Html]);
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[pipeline]
name = "entregas-abril"
description = "Rotas do CD"

[source]
path = "entregas.csv"
delimiter = ","
encoding = "windows-1252"

[columns]
truck = "Caminhao"
revenue = "Faturamento Bruto"
shift = "Turno"

[render]
origin_label = "VALEMILK-CD"
icon_by_shift = true
center = [-3.87, -38.58]
zoom = 11
palette = ["red", "blue"]

[render.popup]
shift = false

[render.legend]
truck_revenue = true

[load]
output_path = "./mapas"
output_formats = ["html", "csv"]

[load.filenames]
html = "rotas.html"

[load.compression]
enabled = true

[monitoring]
enabled = true
json_logs = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.columns.truck, "Caminhao");
        assert_eq!(config.columns.weight, "PESO");
        assert_eq!(config.columns.shift.as_deref(), Some("Turno"));
        assert_eq!(config.render.origin_label, "VALEMILK-CD");
        assert!(config.render.icon_by_shift);
        assert!(!config.render.popup.shift);
        assert!(config.render.popup.weight);
        assert!(config.render.legend.truck_revenue);
        assert_eq!(config.render.palette.len(), 2);
        assert_eq!(config.load.filenames.html, "rotas.html");
        assert_eq!(config.load.filenames.csv, "truck_summary.csv");
        assert_eq!(config.load.archive_name(), Some("fleet_map.zip"));
        assert!(config.monitoring_enabled());
        assert!(config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FLEET_MAP_TEST_INPUT", "/data/entregas.csv");

        let toml_content = r#"
[pipeline]
name = "env"

[source]
path = "${FLEET_MAP_TEST_INPUT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.path, "/data/entregas.csv");

        std::env::remove_var("FLEET_MAP_TEST_INPUT");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let toml_content = r#"
[pipeline]
name = "env"

[source]
path = "${FLEET_MAP_TEST_NEVER_SET}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let bad_delimiter = r#"
[pipeline]
name = "bad"

[source]
path = "entregas.csv"
delimiter = ";;"
"#;
        let config = TomlConfig::from_toml_str(bad_delimiter).unwrap();
        assert!(config.validate().is_err());

        let bad_format = r#"
[pipeline]
name = "bad"

[source]
path = "entregas.csv"

[load]
output_formats = ["pdf"]
"#;
        let err = TomlConfig::from_toml_str(bad_format).unwrap_err();
        assert!(matches!(err, FleetError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"

[source]
path = "entregas.csv"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
    }
}
