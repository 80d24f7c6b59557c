//! Leaflet 地圖文件：每台卡車一個可切換圖層，每筆配送一組標記與連線，外加固定圖例

use crate::config::options::RenderOptions;
use crate::core::palette::{assign_colors, FALLBACK_COLOR};
use crate::domain::model::{DeliveryRecord, FleetReport, FleetSummary, GeoPoint};
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// 沒有任何座標時的地圖中心
pub const DEFAULT_CENTER: [f64; 2] = [-3.8666699, -38.5773332];

#[derive(Debug, Clone, Serialize)]
pub struct MapDocument {
    pub title: String,
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub line_weight: u32,
    pub line_opacity: f64,
    pub origin: OriginStyle,
    pub layers: Vec<TruckLayer>,
    #[serde(skip)]
    pub legend_html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OriginStyle {
    pub color: String,
    pub icon: String,
    pub popup: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TruckLayer {
    pub truck_id: String,
    pub name: String,
    pub color: String,
    pub deliveries: Vec<MapDelivery>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapDelivery {
    pub destination: [f64; 2],
    pub origin: [f64; 2],
    pub tooltip: String,
    pub popup: String,
    pub icon: String,
}

pub fn build_map(report: &FleetReport, options: &RenderOptions, updated: &str) -> MapDocument {
    let colors = assign_colors(report.summary.truck_ids(), &options.palette);

    let mut by_truck: BTreeMap<&str, Vec<&DeliveryRecord>> = BTreeMap::new();
    for record in &report.records {
        by_truck.entry(record.truck_id.as_str()).or_default().push(record);
    }

    let layers = by_truck
        .into_iter()
        .map(|(truck_id, records)| TruckLayer {
            truck_id: truck_id.to_string(),
            name: format!("Caminhão: {}", escape_html(truck_id)),
            color: colors
                .get(truck_id)
                .cloned()
                .unwrap_or_else(|| FALLBACK_COLOR.to_string()),
            deliveries: records
                .into_iter()
                .map(|record| MapDelivery {
                    destination: record.destination.as_pair(),
                    origin: record.origin.as_pair(),
                    tooltip: escape_html(&record.customer_name),
                    popup: popup_html(record, options),
                    icon: marker_icon(&record.shift, options).to_string(),
                })
                .collect(),
        })
        .collect();

    MapDocument {
        title: options.title.clone(),
        center: options.center.unwrap_or_else(|| map_center(&report.records)),
        zoom: options.zoom,
        tile_url: options.tile_url.clone(),
        attribution: options.attribution.clone(),
        line_weight: options.line_weight,
        line_opacity: options.line_opacity,
        origin: OriginStyle {
            color: options.origin_color.clone(),
            icon: options.origin_icon.clone(),
            popup: escape_html(&options.origin_label),
        },
        layers,
        legend_html: render_legend(&report.summary, options, updated),
    }
}

/// 所有起點與目的地座標的平均
pub fn map_center(records: &[DeliveryRecord]) -> [f64; 2] {
    let points: Vec<&GeoPoint> = records
        .iter()
        .flat_map(|r| [&r.destination, &r.origin])
        .collect();

    if points.is_empty() {
        return DEFAULT_CENTER;
    }

    let n = points.len() as f64;
    let lat = points.iter().map(|p| p.lat).sum::<f64>() / n;
    let lon = points.iter().map(|p| p.lon).sum::<f64>() / n;
    [lat, lon]
}

pub fn marker_icon<'a>(shift: &str, options: &'a RenderOptions) -> &'a str {
    if options.icon_by_shift {
        if let Some(icon) = options.shift_icons.get(shift) {
            return icon;
        }
    }
    &options.destination_icon
}

pub fn popup_html(record: &DeliveryRecord, options: &RenderOptions) -> String {
    let mut lines = vec![
        format!("<b>Caminhão:</b> {}", escape_html(&record.truck_id)),
        format!("<b>Cliente:</b> {}", escape_html(&record.customer_name)),
    ];
    if options.popup.weight {
        let weight = record
            .weight
            .map(|w| w.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        lines.push(format!("<b>Peso:</b> {}", weight));
    }
    if options.popup.revenue {
        let revenue = record
            .revenue
            .map(|r| format_currency(r, &options.currency_symbol))
            .unwrap_or_else(|| "n/a".to_string());
        lines.push(format!("<b>Faturamento Bruto:</b> {}", escape_html(&revenue)));
    }
    if options.popup.shift && !record.shift.is_empty() {
        lines.push(format!("<b>Turno:</b> {}", escape_html(&record.shift)));
    }
    lines.join("<br>")
}

pub fn render_legend(summary: &FleetSummary, options: &RenderOptions, updated: &str) -> String {
    let fields = &options.legend;
    let mut body = String::new();

    if fields.customer_count {
        body.push_str(&format!(
            "<b>🏬 Número de Clientes:</b> {}<br>",
            summary.customer_count
        ));
    }
    if fields.updated {
        body.push_str(&format!("<b>🔄 Atualizado:</b> {}<br>", escape_html(updated)));
    }
    if fields.utilization || fields.truck_revenue {
        let heading = if fields.utilization {
            "% de carga usada por Caminhão:"
        } else {
            "Faturamento por Caminhão:"
        };
        let mut trucks: Vec<_> = summary.trucks.iter().collect();
        trucks.sort_by(|a, b| a.truck_id.cmp(&b.truck_id));

        body.push_str(&format!("<br><b>{}</b><ul>", heading));
        for truck in trucks {
            let mut parts = Vec::new();
            if fields.utilization {
                parts.push(truck.utilization.to_string());
            }
            if fields.truck_revenue {
                parts.push(escape_html(&format_currency(
                    truck.total_revenue,
                    &options.currency_symbol,
                )));
            }
            body.push_str(&format!(
                "<li>{}: {}</li>",
                escape_html(&truck.truck_id),
                parts.join(" · ")
            ));
        }
        body.push_str("</ul>");
    }
    if fields.total_revenue {
        body.push_str(&format!(
            "<b>💰 Faturamento total:</b> {}<br>",
            escape_html(&format_currency(summary.total_revenue, &options.currency_symbol))
        ));
    }

    format!("<div class=\"fleet-legend\" style=\"{}\">{}</div>", LEGEND_STYLE, body)
}

const LEGEND_STYLE: &str = "position: fixed; bottom: 50px; left: 50px; width: 300px; \
background-color: white; border: 2px solid grey; z-index: 9999; font-size: 14px; \
padding: 10px; box-shadow: 2px 2px 5px rgba(0,0,0,0.3); white-space: normal;";

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css">
<link rel="stylesheet" href="https://maxcdn.bootstrapcdn.com/font-awesome/4.7.0/css/font-awesome.min.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.js"></script>
<style>html, body, #map { width: 100%; height: 100%; margin: 0; padding: 0; }</style>
"#;

const HTML_SCRIPT: &str = r#"
const map = L.map("map").setView(fleet.center, fleet.zoom);
L.tileLayer(fleet.tile_url, { attribution: fleet.attribution, maxZoom: 19 }).addTo(map);
const originIcon = L.AwesomeMarkers.icon({ icon: fleet.origin.icon, prefix: "fa", markerColor: fleet.origin.color });
const overlays = {};
for (const layer of fleet.layers) {
  const group = L.featureGroup();
  for (const d of layer.deliveries) {
    const icon = L.AwesomeMarkers.icon({ icon: d.icon, prefix: "fa", markerColor: layer.color });
    L.marker(d.destination, { icon: icon }).bindPopup(d.popup).bindTooltip(d.tooltip).addTo(group);
    L.marker(d.origin, { icon: originIcon }).bindPopup(fleet.origin.popup).addTo(group);
    L.polyline([d.origin, d.destination], { color: layer.color, weight: fleet.line_weight, opacity: fleet.line_opacity }).addTo(group);
  }
  group.addTo(map);
  overlays[layer.name] = group;
}
L.control.layers(null, overlays).addTo(map);
</script>
</body>
</html>
"#;

pub fn render_html(doc: &MapDocument) -> Result<String> {
    // 內嵌在 <script> 中，避免資料提前關閉標籤
    let data = serde_json::to_string(doc)?.replace("</", "<\\/");

    let mut html = String::with_capacity(HTML_HEAD.len() + HTML_SCRIPT.len() + data.len() + 1024);
    html.push_str(HTML_HEAD);
    html.push_str(&format!("<title>{}</title>\n</head>\n<body>\n", escape_html(&doc.title)));
    html.push_str("<div id=\"map\"></div>\n");
    html.push_str(&doc.legend_html);
    html.push_str("\n<script>\nconst fleet = ");
    html.push_str(&data);
    html.push(';');
    html.push_str(HTML_SCRIPT);
    Ok(html)
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 巴西幣別格式：`R$ 1.234,56`
pub fn format_currency(value: f64, symbol: &str) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (integer, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::new();
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    if symbol.is_empty() {
        format!("{}{},{}", sign, grouped, cents)
    } else {
        format!("{}{} {},{}", sign, symbol, grouped, cents)
    }
}
