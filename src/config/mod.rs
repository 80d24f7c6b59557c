#[cfg(feature = "cli")]
pub mod cli;
pub mod options;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use crate::config::options::{
        validate_options, ColumnMapping, CompressionOptions, LoadOptions, OutputFormat,
        RenderOptions, SourceOptions,
    };
    use crate::core::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{validate_file_extension, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "fleet-map")]
    #[command(about = "Builds an interactive delivery map and truck load summary from a delivery table")]
    pub struct CliConfig {
        /// Delivery table (';' separated by default)
        #[arg(short, long)]
        pub input: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, default_value = ";")]
        pub delimiter: String,

        #[arg(long, default_value = "utf-8")]
        pub encoding: String,

        #[arg(long, value_delimiter = ',', default_value = "html")]
        pub formats: Vec<OutputFormat>,

        #[arg(long, help = "Pick the destination icon from the delivery shift")]
        pub icon_by_shift: bool,

        #[arg(long, default_value = "Casa de origem")]
        pub origin_label: String,

        #[arg(long, help = "Date shown in the legend (defaults to today)")]
        pub updated: Option<String>,

        #[arg(long, help = "Bundle every output file into one zip archive")]
        pub zip: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,

        #[arg(long, help = "Emit JSON log lines")]
        pub json_logs: bool,
    }

    impl ConfigProvider for CliConfig {
        fn source_options(&self) -> SourceOptions {
            SourceOptions {
                path: self.input.clone(),
                delimiter: self.delimiter.clone(),
                encoding: self.encoding.clone(),
            }
        }

        fn columns(&self) -> ColumnMapping {
            ColumnMapping::default()
        }

        fn render_options(&self) -> RenderOptions {
            RenderOptions {
                icon_by_shift: self.icon_by_shift,
                origin_label: self.origin_label.clone(),
                updated: self.updated.clone(),
                ..RenderOptions::default()
            }
        }

        fn load_options(&self) -> LoadOptions {
            LoadOptions {
                output_path: self.output_path.clone(),
                output_formats: self.formats.clone(),
                compression: self.zip.then(|| CompressionOptions {
                    enabled: true,
                    ..CompressionOptions::default()
                }),
                ..LoadOptions::default()
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_file_extension("input", &self.input, &["csv", "txt"])?;
            validate_options(
                &self.source_options(),
                &self.render_options(),
                &self.load_options(),
            )
        }
    }

}
