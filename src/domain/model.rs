use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 解碼後、尚未正規化的一列資料
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 原始檔案中的行號（表頭為第 1 行）
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

/// 正規化所需欄位在表頭中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub truck: usize,
    pub weight: usize,
    pub capacity: usize,
    pub latitude: usize,
    pub longitude: usize,
    pub origin_latitude: usize,
    pub origin_longitude: usize,
    pub customer: usize,
    pub revenue: usize,
    pub shift: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub columns: ColumnIndex,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn as_pair(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub row: usize,
    pub truck_id: String,
    pub customer_name: String,
    pub destination: GeoPoint,
    pub origin: GeoPoint,
    pub weight: Option<f64>,
    pub capacity: Option<f64>,
    pub revenue: Option<f64>,
    /// 轉為大寫，來源沒有時為空字串
    pub shift: String,
}

/// 單一卡車的容量使用率
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "percent", rename_all = "snake_case")]
pub enum Utilization {
    Percent(f64),
    Unavailable,
}

impl Utilization {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Utilization::Percent(value) => Some(*value),
            Utilization::Unavailable => None,
        }
    }
}

impl fmt::Display for Utilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Utilization::Percent(value) => write!(f, "{:.0}%", value),
            Utilization::Unavailable => write!(f, "n/a"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckSummary {
    pub truck_id: String,
    pub deliveries: usize,
    pub total_weight: f64,
    pub capacity: Option<f64>,
    pub utilization: Utilization,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "capacity", rename_all = "snake_case")]
pub enum GapReason {
    MissingCapacity,
    NonPositiveCapacity(f64),
    /// 載重比例溢位（容量過小或總重過大）
    NonFiniteRatio(f64),
}

/// 無法計算使用率的卡車
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationGap {
    pub truck_id: String,
    #[serde(flatten)]
    pub reason: GapReason,
}

impl fmt::Display for AggregationGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            GapReason::MissingCapacity => {
                write!(f, "truck {} has no usable capacity value", self.truck_id)
            }
            GapReason::NonPositiveCapacity(capacity) => {
                write!(f, "truck {} has capacity {}", self.truck_id, capacity)
            }
            GapReason::NonFiniteRatio(capacity) => write!(
                f,
                "truck {} load ratio is not finite for capacity {}",
                self.truck_id, capacity
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSummary {
    /// 依首次出現順序
    pub trucks: Vec<TruckSummary>,
    pub customer_count: usize,
    pub total_revenue: f64,
    pub gaps: Vec<AggregationGap>,
    #[serde(skip)]
    pub(crate) index: HashMap<String, usize>,
}

impl FleetSummary {
    pub fn get(&self, truck_id: &str) -> Option<&TruckSummary> {
        self.index.get(truck_id).map(|&i| &self.trucks[i])
    }

    pub fn truck_ids(&self) -> impl Iterator<Item = &str> {
        self.trucks.iter().map(|t| t.truck_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.trucks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trucks.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub weights_unparsed: usize,
    pub revenues_unparsed: usize,
    pub capacities_unparsed: usize,
}

/// 轉換階段的輸出，供各輸出格式使用
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub records: Vec<DeliveryRecord>,
    pub summary: FleetSummary,
    pub stats: RunStats,
}
