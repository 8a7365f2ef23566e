//! Action items derived from the current view, in the spirit of a playbook:
//! which carriers to review, which routes to re-plan, what to restock.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::models::{StockStatus, UnifiedRecord, WarehouseItem};
use crate::summary::{carrier_summary, kpi_snapshot, route_summary, top_routes_by_mean_delay};
use crate::thresholds::{
    CARRIERS_TO_REVIEW, DELAYED_ROUTES_TO_REROUTE, EXCESS_ITEMS_TO_LIST, LOW_RATING,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StockRecommendation {
    pub product_category: String,
    pub location: String,
    pub current_stock_units: Option<f64>,
    pub reorder_level: Option<f64>,
    pub status: StockStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendations {
    pub immediate_actions: Vec<String>,
    /// Critical and Low items, input order
    pub needs_attention: Vec<StockRecommendation>,
    /// First few Excess items that could be moved elsewhere
    pub redistribute: Vec<StockRecommendation>,
}

pub fn recommend(records: &[&UnifiedRecord], warehouse: &[WarehouseItem]) -> Recommendations {
    let mut actions = Vec::new();

    let mut carriers = carrier_summary(records);
    carriers.sort_by(|a, b| a.on_time_rate.partial_cmp(&b.on_time_rate).unwrap_or(Ordering::Equal));
    let worst: Vec<String> = carriers
        .iter()
        .take(CARRIERS_TO_REVIEW)
        .map(|c| format!("{} ({:.1}% on-time)", c.carrier, c.on_time_rate * 100.0))
        .collect();
    if !worst.is_empty() {
        actions.push(format!(
            "Carrier Performance Review: renegotiate with {}",
            worst.join(", ")
        ));
    }

    let routes = route_summary(records);
    let delayed: Vec<String> = top_routes_by_mean_delay(&routes, DELAYED_ROUTES_TO_REROUTE)
        .into_iter()
        .filter(|r| r.avg_delay.map_or(false, |d| d > 0.0))
        .map(|r| format!("{} ({:.1} days)", r.route, r.avg_delay.unwrap_or(0.0)))
        .collect();
    if !delayed.is_empty() {
        actions.push(format!(
            "Route Optimization: dynamic routing for {}",
            delayed.join(", ")
        ));
    }

    let critical: Vec<&WarehouseItem> = warehouse
        .iter()
        .filter(|i| i.stock_status == Some(StockStatus::Critical))
        .collect();
    if !critical.is_empty() {
        let sites: BTreeSet<&str> = critical.iter().map(|i| i.record.location.as_str()).collect();
        actions.push(format!(
            "Critical Stock Replenishment: restock {} critical items across {} warehouses",
            critical.len(),
            sites.len()
        ));
    }

    let low_rated = records
        .iter()
        .filter(|r| r.rating.map_or(false, |rating| rating < LOW_RATING))
        .count();
    if low_rated > 0 {
        actions.push(format!(
            "Customer Feedback Loop: review {} low-rating orders weekly",
            low_rated
        ));
    }

    if let Some(avg) = kpi_snapshot(records).avg_cost_per_order {
        actions.push(format!(
            "Cost Benchmarking: network average is ₹{:.0} per order, compare with industry targets",
            avg
        ));
    }

    let needs_attention = warehouse
        .iter()
        .filter(|i| matches!(i.stock_status, Some(StockStatus::Critical | StockStatus::Low)))
        .filter_map(to_recommendation)
        .collect();
    let redistribute = warehouse
        .iter()
        .filter(|i| i.stock_status == Some(StockStatus::Excess))
        .take(EXCESS_ITEMS_TO_LIST)
        .filter_map(to_recommendation)
        .collect();

    Recommendations {
        immediate_actions: actions,
        needs_attention,
        redistribute,
    }
}

fn to_recommendation(item: &WarehouseItem) -> Option<StockRecommendation> {
    Some(StockRecommendation {
        product_category: item.record.product_category.clone(),
        location: item.record.location.clone(),
        current_stock_units: item.record.current_stock_units,
        reorder_level: item.record.reorder_level,
        status: item.stock_status?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::all;
    use crate::testutil::{record, routed, stock, with_delay};

    #[test]
    fn test_actions_from_data() {
        let mut bad = routed(with_delay(record("O1"), 4.0), "Delhi-Agra", "SlowCo", 200.0, 800.0);
        bad.rating = Some(1.0);
        let good = routed(with_delay(record("O2"), 0.0), "Mumbai-Pune", "FastCo", 150.0, 400.0);
        let ok = routed(with_delay(record("O3"), 1.0), "Mumbai-Pune", "MidCo", 150.0, 600.0);
        let records = vec![bad, good, ok];
        let warehouse = vec![
            stock("Books", "Delhi", 10.0, 100.0),
            stock("Toys", "Delhi", 20.0, 100.0),
            stock("Fashion", "Pune", 60.0, 100.0),
            stock("Home", "Pune", 300.0, 100.0),
        ];

        let recs = recommend(&all(&records), &warehouse);
        let actions = &recs.immediate_actions;

        assert_eq!(actions.len(), 5);
        assert_eq!(
            actions[0],
            "Carrier Performance Review: renegotiate with MidCo (0.0% on-time), SlowCo (0.0% on-time)"
        );
        assert_eq!(
            actions[1],
            "Route Optimization: dynamic routing for Delhi-Agra (4.0 days), Mumbai-Pune (0.5 days)"
        );
        assert!(actions[2].contains("restock 2 critical items across 1 warehouses"));
        assert!(actions[3].contains("1 low-rating orders"));
        assert!(actions[4].contains("₹600 per order"));

        assert_eq!(recs.needs_attention.len(), 3);
        assert_eq!(recs.needs_attention[2].status, StockStatus::Low);
        assert_eq!(recs.redistribute.len(), 1);
        assert_eq!(recs.redistribute[0].product_category, "Home");
    }

    #[test]
    fn test_redistribute_capped_in_input_order() {
        let warehouse: Vec<WarehouseItem> = (0..7)
            .map(|i| stock(&format!("Cat{}", i), "Mumbai", 150.0 + i as f64, 100.0))
            .chain(std::iter::once(stock("Books", "Delhi", 100.0, 100.0)))
            .collect();

        let recs = recommend(&[], &warehouse);
        let listed: Vec<&str> = recs
            .redistribute
            .iter()
            .map(|r| r.product_category.as_str())
            .collect();

        assert_eq!(listed.len(), EXCESS_ITEMS_TO_LIST);
        assert_eq!(listed, vec!["Cat0", "Cat1", "Cat2", "Cat3", "Cat4"]);
        assert!(recs.redistribute.iter().all(|r| r.status == StockStatus::Excess));
        assert!(recs.needs_attention.is_empty());
    }

    #[test]
    fn test_empty_view() {
        let recs = recommend(&[], &[]);
        assert!(recs.immediate_actions.is_empty());
        assert!(recs.needs_attention.is_empty());
        assert!(recs.redistribute.is_empty());
    }
}
