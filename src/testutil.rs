//! Record builders shared by unit tests

use chrono::NaiveDate;

use crate::models::{DelaySeverity, StockStatus, UnifiedRecord, WarehouseItem, WarehouseRecord};

/// An on-time order with no route, cost or feedback data
pub fn record(id: &str) -> UnifiedRecord {
    UnifiedRecord {
        order_id: id.to_string(),
        order_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        priority: "Standard".to_string(),
        product_category: "Electronics".to_string(),
        order_value_inr: Some(1000.0),
        promised_delivery_days: Some(3.0),
        actual_delivery_days: Some(3.0),
        route: None,
        origin: None,
        destination: None,
        distance_km: None,
        carrier: None,
        fuel_cost: None,
        labor_cost: None,
        vehicle_maintenance: None,
        insurance: None,
        packaging_cost: None,
        technology_platform_fee: None,
        other_overhead: None,
        rating: None,
        issue_category: None,
        delivery_delay_days: Some(0.0),
        on_time: true,
        delay_severity: Some(DelaySeverity::OnTime),
        total_cost: 0.0,
        cost_per_km: None,
        revenue_to_cost_ratio: None,
    }
}

/// Set the delay and everything derived from it
pub fn with_delay(mut r: UnifiedRecord, delay: f64) -> UnifiedRecord {
    r.actual_delivery_days = r.promised_delivery_days.map(|p| p + delay);
    r.delivery_delay_days = Some(delay);
    r.on_time = delay <= 0.0;
    r.delay_severity = DelaySeverity::classify(delay);
    r
}

/// Put the order on a route with a carrier, distance and total cost
pub fn routed(
    mut r: UnifiedRecord,
    route: &str,
    carrier: &str,
    km: f64,
    cost: f64,
) -> UnifiedRecord {
    let mut parts = route.splitn(2, '-');
    r.origin = parts.next().map(str::to_string);
    r.destination = parts.next().map(str::to_string);
    r.route = Some(route.to_string());
    r.carrier = Some(carrier.to_string());
    r.distance_km = Some(km);
    r.fuel_cost = Some(cost);
    r.total_cost = cost;
    r.cost_per_km = (km != 0.0).then(|| cost / km);
    r.revenue_to_cost_ratio = r.order_value_inr.filter(|_| cost != 0.0).map(|v| v / cost);
    r
}

pub fn stock(category: &str, location: &str, current: f64, reorder: f64) -> WarehouseItem {
    let ratio = (reorder != 0.0).then(|| current / reorder);
    WarehouseItem {
        record: WarehouseRecord {
            product_category: category.to_string(),
            location: location.to_string(),
            current_stock_units: Some(current),
            reorder_level: Some(reorder),
            storage_cost_per_unit: Some(3.0),
            last_restocked_date: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
        },
        stock_ratio: ratio,
        stock_status: ratio.and_then(StockStatus::classify),
    }
}
