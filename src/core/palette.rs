use std::collections::{BTreeMap, BTreeSet};

/// Leaflet.awesome-markers 支援的標記顏色
pub const DEFAULT_PALETTE: [&str; 17] = [
    "red",
    "blue",
    "green",
    "purple",
    "orange",
    "darkred",
    "beige",
    "darkblue",
    "darkgreen",
    "cadetblue",
    "darkpurple",
    "pink",
    "lightblue",
    "lightgreen",
    "gray",
    "black",
    "lightgray",
];

/// 調色盤為空時使用
pub const FALLBACK_COLOR: &str = "gray";

/// 依排序後的卡車編號分配顏色，卡車多於顏色時循環使用
pub fn assign_colors<'a, I>(truck_ids: I, palette: &[String]) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: BTreeSet<&str> = truck_ids.into_iter().collect();

    distinct
        .into_iter()
        .enumerate()
        .map(|(position, truck)| {
            let color = palette
                .get(position % palette.len().max(1))
                .map(String::as_str)
                .unwrap_or(FALLBACK_COLOR);
            (truck.to_string(), color.to_string())
        })
        .collect()
}
