//! 依卡車彙總載重、營收與容量使用率

use crate::domain::model::{
    AggregationGap, DeliveryRecord, FleetSummary, GapReason, TruckSummary, Utilization,
};
use std::collections::{HashMap, HashSet};

struct TruckAccumulator<'a> {
    truck_id: &'a str,
    deliveries: usize,
    total_weight: f64,
    capacity: Option<f64>,
    total_revenue: f64,
}

/// 依首次出現順序分組，缺少的重量與營收視為 0
///
/// 容量取該卡車第一個有值的紀錄，之後不同的值一律忽略。
pub fn aggregate(records: &[DeliveryRecord]) -> FleetSummary {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<TruckAccumulator> = Vec::new();
    let mut customers: HashSet<&str> = HashSet::new();

    for record in records {
        if !record.customer_name.is_empty() {
            customers.insert(record.customer_name.as_str());
        }

        let slot = match index.get(record.truck_id.as_str()) {
            Some(&slot) => slot,
            None => {
                index.insert(record.truck_id.clone(), groups.len());
                groups.push(TruckAccumulator {
                    truck_id: &record.truck_id,
                    deliveries: 0,
                    total_weight: 0.0,
                    capacity: None,
                    total_revenue: 0.0,
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[slot];
        match (group.capacity, record.capacity) {
            (None, Some(capacity)) => group.capacity = Some(capacity),
            (Some(first), Some(found)) if found != first => {
                tracing::debug!(
                    truck = group.truck_id,
                    line = record.row,
                    first,
                    found,
                    "Ignoring differing capacity on later record"
                );
            }
            _ => {}
        }
        group.deliveries += 1;
        group.total_weight += record.weight.unwrap_or(0.0);
        group.total_revenue += record.revenue.unwrap_or(0.0);
    }

    let mut gaps = Vec::new();
    let trucks: Vec<TruckSummary> = groups
        .into_iter()
        .map(|group| {
            let (utilization, gap) = utilization(group.total_weight, group.capacity);
            if let Some(reason) = gap {
                gaps.push(AggregationGap {
                    truck_id: group.truck_id.to_string(),
                    reason,
                });
            }
            TruckSummary {
                truck_id: group.truck_id.to_string(),
                deliveries: group.deliveries,
                total_weight: group.total_weight,
                capacity: group.capacity,
                utilization,
                total_revenue: group.total_revenue,
            }
        })
        .collect();

    let total_revenue = trucks.iter().fold(0.0, |acc, t| acc + t.total_revenue);

    FleetSummary {
        customer_count: customers.len(),
        total_revenue,
        trucks,
        gaps,
        index,
    }
}

/// `total_weight / capacity * 100`，容量缺漏、非正值或結果溢位時為 Unavailable
pub fn utilization(total_weight: f64, capacity: Option<f64>) -> (Utilization, Option<GapReason>) {
    match capacity {
        Some(capacity) if capacity.is_finite() && capacity > 0.0 => {
            let percent = total_weight * 100.0 / capacity;
            if percent.is_finite() {
                (Utilization::Percent(percent), None)
            } else {
                (
                    Utilization::Unavailable,
                    Some(GapReason::NonFiniteRatio(capacity)),
                )
            }
        }
        Some(capacity) => (
            Utilization::Unavailable,
            Some(GapReason::NonPositiveCapacity(capacity)),
        ),
        None => (Utilization::Unavailable, Some(GapReason::MissingCapacity)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::GeoPoint;

    fn record(truck: &str, customer: &str, weight: Option<f64>, capacity: Option<f64>) -> DeliveryRecord {
        DeliveryRecord {
            row: 0,
            truck_id: truck.to_string(),
            customer_name: customer.to_string(),
            destination: GeoPoint::new(-3.7, -38.5),
            origin: GeoPoint::new(-3.86, -38.57),
            weight,
            capacity,
            revenue: None,
            shift: String::new(),
        }
    }

    fn with_revenue(mut record: DeliveryRecord, revenue: Option<f64>) -> DeliveryRecord {
        record.revenue = revenue;
        record
    }

    #[test]
    fn test_two_truck_scenario() {
        let records = vec![
            record("T1", "A", Some(500.0), Some(1000.0)),
            record("T1", "B", Some(300.0), None),
            record("T1", "C", None, None),
            record("T2", "D", Some(800.0), Some(800.0)),
        ];

        let summary = aggregate(&records);

        let t1 = summary.get("T1").unwrap();
        assert_eq!(t1.total_weight, 800.0);
        assert_eq!(t1.deliveries, 3);
        assert_eq!(t1.capacity, Some(1000.0));
        assert_eq!(t1.utilization, Utilization::Percent(80.0));

        let t2 = summary.get("T2").unwrap();
        assert_eq!(t2.total_weight, 800.0);
        assert_eq!(t2.utilization, Utilization::Percent(100.0));

        assert_eq!(summary.customer_count, 4);
        assert!(summary.gaps.is_empty());
    }

    #[test]
    fn test_total_weight_equals_null_safe_sum() {
        let weights = [Some(0.1), Some(0.2), None, Some(1234.567), Some(0.3), None];
        let records: Vec<DeliveryRecord> = weights
            .iter()
            .map(|w| record("T9", "X", *w, Some(5000.0)))
            .collect();

        let expected: f64 = weights.iter().fold(0.0, |acc, w| acc + w.unwrap_or(0.0));
        assert_eq!(aggregate(&records).get("T9").unwrap().total_weight, expected);
    }

    #[test]
    fn test_capacity_comes_from_first_record() {
        let records = vec![
            record("T1", "A", Some(100.0), Some(1000.0)),
            record("T1", "B", Some(100.0), Some(1200.0)),
            record("T1", "C", Some(100.0), Some(1000.0)),
        ];

        let t1 = aggregate(&records).get("T1").cloned().unwrap();
        assert_eq!(t1.capacity, Some(1000.0));
        assert_eq!(t1.utilization, Utilization::Percent(30.0));
    }

    #[test]
    fn test_capacity_comes_from_first_present_value() {
        let records = vec![
            record("T1", "A", Some(100.0), None),
            record("T1", "B", Some(100.0), Some(1000.0)),
            record("T1", "C", None, Some(2000.0)),
        ];

        let summary = aggregate(&records);
        let t1 = summary.get("T1").unwrap();
        assert_eq!(t1.capacity, Some(1000.0));
        assert_eq!(t1.utilization, Utilization::Percent(20.0));
        assert!(summary.gaps.is_empty());
    }

    #[test]
    fn test_truck_without_any_capacity_is_a_gap() {
        let records = vec![
            record("T1", "A", Some(100.0), None),
            record("T1", "B", Some(100.0), None),
        ];

        let summary = aggregate(&records);
        assert_eq!(summary.get("T1").unwrap().utilization, Utilization::Unavailable);
        assert_eq!(summary.gaps[0].reason, GapReason::MissingCapacity);
    }

    #[test]
    fn test_blank_customer_is_not_counted() {
        let records = vec![
            record("T1", "Padaria", Some(1.0), Some(10.0)),
            record("T1", "", Some(1.0), Some(10.0)),
            record("T2", "", Some(1.0), Some(10.0)),
        ];

        assert_eq!(aggregate(&records).customer_count, 1);
    }

    #[test]
    fn test_overflowing_ratio_is_unavailable() {
        let (utilization_value, gap) = utilization(f64::MAX, Some(1e-300));
        assert_eq!(utilization_value, Utilization::Unavailable);
        assert_eq!(gap, Some(GapReason::NonFiniteRatio(1e-300)));

        let records = vec![record("T5", "A", Some(f64::MAX), Some(0.5))];
        let summary = aggregate(&records);
        assert_eq!(summary.get("T5").unwrap().utilization, Utilization::Unavailable);
        assert_eq!(summary.gaps[0].reason, GapReason::NonFiniteRatio(0.5));
    }

    #[test]
    fn test_zero_capacity_is_unavailable_not_infinite() {
        let records = vec![record("T3", "A", Some(500.0), Some(0.0))];

        let summary = aggregate(&records);
        let t3 = summary.get("T3").unwrap();

        assert_eq!(t3.utilization, Utilization::Unavailable);
        assert_eq!(t3.utilization.percent(), None);
        assert_eq!(t3.utilization.to_string(), "n/a");
        assert_eq!(
            summary.gaps,
            vec![AggregationGap {
                truck_id: "T3".to_string(),
                reason: GapReason::NonPositiveCapacity(0.0),
            }]
        );
    }

    #[test]
    fn test_all_null_weights_give_zero_utilization() {
        let records = vec![
            record("T4", "A", None, Some(900.0)),
            record("T4", "B", None, Some(900.0)),
        ];

        let t4 = aggregate(&records).get("T4").cloned().unwrap();
        assert_eq!(t4.total_weight, 0.0);
        assert_eq!(t4.utilization, Utilization::Percent(0.0));
    }

    #[test]
    fn test_fleet_totals() {
        let records = vec![
            with_revenue(record("T1", "Padaria", Some(1.0), Some(10.0)), Some(100.5)),
            with_revenue(record("T2", "Padaria", Some(1.0), Some(10.0)), Some(200.0)),
            with_revenue(record("T2", "Mercado", Some(1.0), Some(10.0)), None),
            with_revenue(record("T3", "Farmacia", Some(1.0), Some(10.0)), Some(50.0)),
        ];

        let summary = aggregate(&records);

        assert_eq!(summary.customer_count, 3);
        assert_eq!(summary.get("T2").unwrap().total_revenue, 200.0);
        assert_eq!(summary.total_revenue, 350.5);
        assert_eq!(summary.truck_ids().collect::<Vec<_>>(), vec!["T1", "T2", "T3"]);
    }

    #[test]
    fn test_first_seen_order() {
        let records = vec![
            record("B", "1", None, None),
            record("A", "2", None, None),
            record("B", "3", None, None),
        ];
        let summary = aggregate(&records);
        assert_eq!(summary.truck_ids().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let summary = aggregate(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.customer_count, 0);
        assert_eq!(summary.total_revenue, 0.0);
    }
}
