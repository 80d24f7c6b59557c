use anyhow::Context;
use clap::Parser;
use fleet_map::config::options::OutputFormat;
use fleet_map::utils::{logger, validation::Validate};
use fleet_map::{EtlEngine, FleetPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-fleet")]
#[command(about = "Delivery map generator driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "fleet-map.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the input file from config
    #[arg(long)]
    input: Option<String>,

    /// Read and aggregate the table without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based fleet map: {}", config.pipeline.name);
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 套用命令列覆蓋設定
    if let Some(input) = args.input {
        tracing::info!("🔧 Input overridden to: {}", input);
        config.source.path = input;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let dry_run = args.dry_run;
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = FleetPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    let result = if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        engine.analyze().map(|report| {
            println!(
                "✅ {} deliveries, {} trucks, {} customers",
                report.records.len(),
                report.summary.len(),
                report.summary.customer_count
            );
            for truck in &report.summary.trucks {
                println!("   {}: {}", truck.truck_id, truck.utilization);
            }
        })
    } else {
        engine.run().map(|output_path| {
            tracing::info!("✅ Delivery map generated");
            println!("✅ Output saved to: {}", output_path);
        })
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  Pipeline: {}", config.pipeline.name);
    if let Some(description) = &config.pipeline.description {
        tracing::info!("  Description: {}", description);
    }
    tracing::info!(
        "  Source: {} (delimiter '{}', {})",
        config.source.path,
        config.source.delimiter,
        config.source.encoding
    );
    tracing::info!("  Output Path: {}", config.load.output_path);
    tracing::info!(
        "  Formats: {}",
        config
            .load
            .output_formats
            .iter()
            .map(OutputFormat::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    if let Some(archive) = config.load.archive_name() {
        tracing::info!("  Archive: {}", archive);
    }
    tracing::info!("  Origin label: {}", config.render.origin_label);
    tracing::info!("  Icon by shift: {}", config.render.icon_by_shift);
}
