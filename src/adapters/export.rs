use crate::domain::model::{FleetReport, FleetSummary};
use crate::utils::error::{FleetError, Result};
use serde::Serialize;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

#[derive(Debug, Serialize)]
struct TruckSummaryRow<'a> {
    truck_id: &'a str,
    deliveries: usize,
    total_weight: f64,
    capacity: Option<f64>,
    /// 使用率無法計算時留空
    utilization_pct: Option<f64>,
    total_revenue: f64,
}

pub fn report_json(report: &FleetReport) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(report)?)
}

pub fn summary_csv(summary: &FleetSummary) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for truck in &summary.trucks {
        writer.serialize(TruckSummaryRow {
            truck_id: &truck.truck_id,
            deliveries: truck.deliveries,
            total_weight: truck.total_weight,
            capacity: truck.capacity,
            utilization_pct: truck.utilization.percent(),
            total_revenue: truck.total_revenue,
        })?;
    }

    writer
        .into_inner()
        .map_err(|e| FleetError::IoError(e.into_error()))
}

/// 將所有輸出打包成單一 ZIP
pub fn bundle_zip(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    tracing::debug!("Creating ZIP file with {} files", files.len());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file(name.as_str(), SimpleFileOptions::default())?;
        zip.write_all(data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
