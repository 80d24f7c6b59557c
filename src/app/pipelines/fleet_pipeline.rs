use crate::adapters::export::{bundle_zip, report_json, summary_csv};
use crate::adapters::map::{build_map, render_html};
use crate::config::options::OutputFormat;
use crate::core::aggregator::aggregate;
use crate::core::normalizer::RecordNormalizer;
use crate::core::reader::read_table;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{FleetReport, RawTable, RunStats};
use crate::utils::error::{FleetError, Result};
use std::collections::HashSet;
use std::path::Path;

/// 配送表 → 正規化紀錄 → 車隊彙總 → 地圖與匯出檔
pub struct FleetPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<S: Storage, C: ConfigProvider> FleetPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn render(&self, format: OutputFormat, report: &FleetReport) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Html => {
                let options = self.config.render_options();
                let updated = options
                    .updated
                    .clone()
                    .unwrap_or_else(|| chrono::Local::now().format("%d/%m/%Y").to_string());
                let document = build_map(report, &options, &updated);
                Ok(render_html(&document)?.into_bytes())
            }
            OutputFormat::Json => report_json(report),
            OutputFormat::Csv => summary_csv(&report.summary),
        }
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for FleetPipeline<S, C> {
    fn extract(&self) -> Result<RawTable> {
        let source = self.config.source_options();
        tracing::debug!("Reading delivery table from: {}", source.path);

        let bytes = self.storage.read_file(&source.path)?;
        let table = read_table(&bytes, &source, &self.config.columns())?;

        if table.rows.is_empty() {
            tracing::warn!("⚠️ {} has a header but no delivery rows", source.path);
        }
        Ok(table)
    }

    fn transform(&self, table: RawTable) -> Result<FleetReport> {
        let normalizer = RecordNormalizer::new(table.columns);
        let mut stats = RunStats {
            rows_read: table.rows.len(),
            ..RunStats::default()
        };
        let mut records = Vec::with_capacity(table.rows.len());

        for row in &table.rows {
            match normalizer.normalize(row) {
                Ok(normalized) => {
                    stats.weights_unparsed += usize::from(normalized.failures.weight);
                    stats.capacities_unparsed += usize::from(normalized.failures.capacity);
                    stats.revenues_unparsed += usize::from(normalized.failures.revenue);
                    records.push(normalized.record);
                }
                Err(e) => {
                    tracing::warn!("⚠️ Skipping {}", e);
                    stats.rows_skipped += 1;
                }
            }
        }

        let summary = aggregate(&records);
        Ok(FleetReport {
            records,
            summary,
            stats,
        })
    }

    fn load(&self, report: FleetReport) -> Result<String> {
        let load = self.config.load_options();

        let mut seen = HashSet::new();
        let mut formats = load.output_formats.clone();
        formats.retain(|format| seen.insert(*format));

        let mut files = Vec::with_capacity(formats.len());
        for format in formats {
            let name = load.filenames.for_format(format).to_string();
            tracing::debug!("Rendering {} output as {}", format, name);
            files.push((name, self.render(format, &report)?));
        }

        let primary = match load.archive_name() {
            Some(archive) => {
                let zip_data = bundle_zip(&files)?;
                tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
                self.storage.write_file(archive, &zip_data)?;
                archive.to_string()
            }
            None => {
                for (name, data) in &files {
                    self.storage.write_file(name, data)?;
                }
                files
                    .first()
                    .map(|(name, _)| name.clone())
                    .ok_or_else(|| FleetError::MissingConfigError {
                        field: "load.output_formats".to_string(),
                    })?
            }
        };

        Ok(Path::new(&load.output_path)
            .join(primary)
            .display()
            .to_string())
    }
}
