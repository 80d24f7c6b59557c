//! 讀取階段：解碼輸入並對應表頭欄位
//!
//! 缺少必要欄位時直接中止，不會進入正規化。

use crate::config::options::{ColumnMapping, SourceOptions};
use crate::domain::model::{ColumnIndex, RawRow, RawTable};
use crate::utils::error::{FleetError, Result};
use crate::utils::validation::{validate_delimiter, validate_encoding};
use encoding_rs::Encoding;
use std::borrow::Cow;

/// 依指定編碼嚴格解碼，開頭的 BOM 優先於設定的編碼
pub fn decode_input<'a>(bytes: &'a [u8], encoding_label: &str) -> Result<Cow<'a, str>> {
    let configured = validate_encoding("source.encoding", encoding_label)?;
    let (encoding, bom_len): (&'static Encoding, usize) =
        Encoding::for_bom(bytes).unwrap_or((configured, 0));

    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .ok_or_else(|| FleetError::DecodeError {
            encoding: encoding.name().to_string(),
            message: "input contains byte sequences that are not valid in this encoding"
                .to_string(),
        })
}

pub fn read_table(bytes: &[u8], source: &SourceOptions, mapping: &ColumnMapping) -> Result<RawTable> {
    let delimiter = validate_delimiter("source.delimiter", &source.delimiter)?;
    let text = decode_input(bytes, &source.encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(FleetError::EmptyInputError {
            message: format!("no header row found in {}", source.path),
        });
    }

    let columns = resolve_columns(&headers, mapping)?;
    tracing::debug!(?columns, "Resolved input columns");

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        // 表頭是第 1 行
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        if record.iter().all(|field| field.is_empty()) {
            tracing::debug!(line, "Skipping blank line");
            continue;
        }

        rows.push(RawRow {
            line,
            fields: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(RawTable {
        headers,
        columns,
        rows,
    })
}

pub fn resolve_columns(headers: &[String], mapping: &ColumnMapping) -> Result<ColumnIndex> {
    let find = |name: &str| headers.iter().position(|h| h == name.trim());

    let mut required = [0usize; 9];
    for (slot, (_, name)) in required.iter_mut().zip(mapping.required()) {
        *slot = find(name).ok_or_else(|| FleetError::SchemaError {
            column: name.to_string(),
            found: headers.join(", "),
        })?;
    }

    let shift = match mapping.shift.as_deref() {
        Some(name) => {
            let index = find(name);
            if index.is_none() {
                tracing::info!("Optional column '{}' not found, shifts will be empty", name);
            }
            index
        }
        None => None,
    };

    let [
        truck,
        weight,
        capacity,
        latitude,
        longitude,
        origin_latitude,
        origin_longitude,
        customer,
        revenue,
    ] = required;

    Ok(ColumnIndex {
        truck,
        weight,
        capacity,
        latitude,
        longitude,
        origin_latitude,
        origin_longitude,
        customer,
        revenue,
        shift,
    })
}
