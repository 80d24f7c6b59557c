//! 將原始文字欄位正規化為 [`DeliveryRecord`]
//!
//! 數值欄位解析失敗時為 `None`，不會中斷執行；只有座標無法使用的列會被略過。

use crate::domain::model::{ColumnIndex, DeliveryRecord, GeoPoint, RawRow};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static CURRENCY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?P<sign>-?)\s*(?:[a-z]{0,3}\s?[$€£¥]|brl|usd|eur)\s*")
        .expect("valid currency pattern")
});

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("row {line}: empty truck id")]
    MissingTruckId { line: usize },

    #[error("row {line}: invalid coordinate '{value}' in column {column}")]
    InvalidCoordinate {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// 記錄單列中哪些數值欄位解析失敗
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFailures {
    pub weight: bool,
    pub capacity: bool,
    pub revenue: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub record: DeliveryRecord,
    pub failures: FieldFailures,
}

/// 重量：逗號視為小數點
pub fn parse_weight(raw: &str) -> Option<f64> {
    parse_finite(&raw.trim().replace(',', "."))
}

/// 金額：去掉幣別符號與千分位點，逗號視為小數點
pub fn parse_revenue(raw: &str) -> Option<f64> {
    let without_symbol = CURRENCY_PREFIX.replace(raw, "${sign}");
    let cleaned: String = without_symbol
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    parse_finite(&cleaned)
}

pub fn parse_coordinate(raw: &str) -> Option<f64> {
    parse_finite(raw.trim())
}

pub fn normalize_shift(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub struct RecordNormalizer {
    columns: ColumnIndex,
}

impl RecordNormalizer {
    pub fn new(columns: ColumnIndex) -> Self {
        Self { columns }
    }

    pub fn normalize(&self, row: &RawRow) -> Result<NormalizedRow, RowError> {
        let c = &self.columns;

        let truck_id = row.field(c.truck).trim().to_string();
        if truck_id.is_empty() {
            return Err(RowError::MissingTruckId { line: row.line });
        }

        let destination = GeoPoint::new(
            self.coordinate(row, c.latitude, "latitude")?,
            self.coordinate(row, c.longitude, "longitude")?,
        );
        let origin = GeoPoint::new(
            self.coordinate(row, c.origin_latitude, "origin_latitude")?,
            self.coordinate(row, c.origin_longitude, "origin_longitude")?,
        );

        let weight_text = row.field(c.weight);
        let capacity_text = row.field(c.capacity);
        let revenue_text = row.field(c.revenue);

        let weight = parse_weight(weight_text);
        let capacity = parse_weight(capacity_text);
        let revenue = parse_revenue(revenue_text);

        let failures = FieldFailures {
            weight: weight.is_none(),
            capacity: capacity.is_none(),
            revenue: revenue.is_none(),
        };
        if failures != FieldFailures::default() {
            tracing::debug!(
                line = row.line,
                weight = weight_text,
                capacity = capacity_text,
                revenue = revenue_text,
                "Numeric field(s) not parseable, treated as empty"
            );
        }

        let shift = c
            .shift
            .map(|index| normalize_shift(row.field(index)))
            .unwrap_or_default();

        Ok(NormalizedRow {
            record: DeliveryRecord {
                row: row.line,
                truck_id,
                customer_name: row.field(c.customer).trim().to_string(),
                destination,
                origin,
                weight,
                capacity,
                revenue,
                shift,
            },
            failures,
        })
    }

    fn coordinate(&self, row: &RawRow, index: usize, column: &'static str) -> Result<f64, RowError> {
        let text = row.field(index);
        parse_coordinate(text).ok_or_else(|| RowError::InvalidCoordinate {
            line: row.line,
            column,
            value: text.to_string(),
        })
    }
}
