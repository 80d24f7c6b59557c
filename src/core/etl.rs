use crate::core::Pipeline;
use crate::domain::model::FleetReport;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// 只執行讀取與轉換，不寫出任何檔案
    pub fn analyze(&self) -> Result<FleetReport> {
        let started = Instant::now();
        tracing::info!("📥 Reading delivery table...");
        let table = self.pipeline.extract()?;
        tracing::info!(
            "Read {} rows in {:?}",
            table.rows.len(),
            started.elapsed()
        );
        self.monitor.log_stats("Extract");

        let started = Instant::now();
        tracing::info!("🔄 Normalizing and aggregating...");
        let report = self.pipeline.transform(table)?;
        tracing::info!(
            "Aggregated {} records into {} trucks in {:?}",
            report.records.len(),
            report.summary.len(),
            started.elapsed()
        );
        self.monitor.log_stats("Transform");

        log_summary(&report);
        Ok(report)
    }

    pub fn run(&self) -> Result<String> {
        let report = self.analyze()?;

        let started = Instant::now();
        tracing::info!("💾 Writing outputs...");
        let output_path = self.pipeline.load(report)?;
        tracing::info!("Output saved to {} in {:?}", output_path, started.elapsed());
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}

fn log_summary(report: &FleetReport) {
    let summary = &report.summary;
    tracing::info!(
        "🚚 {} trucks, {} customers, total revenue {:.2}",
        summary.len(),
        summary.customer_count,
        summary.total_revenue
    );
    for truck in &summary.trucks {
        tracing::info!(
            "  {}: {} deliveries, {:.1} of {} ({})",
            truck.truck_id,
            truck.deliveries,
            truck.total_weight,
            truck
                .capacity
                .map(|c| c.to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            truck.utilization
        );
    }
    for gap in &summary.gaps {
        tracing::warn!("⚠️ Utilization unavailable: {}", gap);
    }

    let stats = &report.stats;
    if stats.rows_skipped > 0 {
        tracing::warn!("⚠️ {} of {} rows skipped", stats.rows_skipped, stats.rows_read);
    }
    if stats.weights_unparsed + stats.revenues_unparsed + stats.capacities_unparsed > 0 {
        tracing::info!(
            "Unparsed values counted as empty - weight: {}, capacity: {}, revenue: {}",
            stats.weights_unparsed,
            stats.capacities_unparsed,
            stats.revenues_unparsed
        );
    }
}
