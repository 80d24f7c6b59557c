// Adapters layer: output renderers consuming the fleet report (map document, JSON/CSV exports, archives).

pub mod export;
pub mod map;
