//! Join & derivation engine
//!
//! Left-joins delivery, route, cost and aggregated feedback rows onto the
//! orders table and computes the derived metrics. Orders are the driving
//! side: every distinct order id appears exactly once, in input order.

use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::loader::{
    Datasets, Table, COSTS_FILE, DELIVERY_FILE, FEEDBACK_FILE, ORDERS_FILE, ROUTES_FILE,
};
use crate::models::{
    CostRecord, DelaySeverity, DeliveryRecord, FeedbackRecord, Order, RouteRecord, StockStatus,
    UnifiedRecord, Vehicle, VehicleRecord, WarehouseItem, WarehouseRecord,
};
use crate::thresholds::NO_ISSUE_CATEGORY;

const JOIN_KEY: &str = "Order_ID";

/// Derived, immutable view of one loaded data directory
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedSet {
    pub records: Vec<UnifiedRecord>,
    pub warehouse: Vec<WarehouseItem>,
    pub vehicles: Vec<Vehicle>,
}

/// Per-order feedback rollup
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackSummary {
    pub rating: Option<f64>,
    pub issue_category: String,
}

/// Build the unified record set plus derived warehouse and fleet views
pub fn build_unified(data: &Datasets) -> Result<UnifiedSet> {
    require_key(&data.orders, ORDERS_FILE)?;
    require_key(&data.delivery, DELIVERY_FILE)?;
    require_key(&data.routes, ROUTES_FILE)?;
    require_key(&data.costs, COSTS_FILE)?;
    require_key(&data.feedback, FEEDBACK_FILE)?;

    let delivery = index_by_order(
        &data.delivery.rows,
        |d: &DeliveryRecord| &d.order_id,
        DELIVERY_FILE,
    );
    let routes = index_by_order(&data.routes.rows, |r: &RouteRecord| &r.order_id, ROUTES_FILE);
    let costs = index_by_order(&data.costs.rows, |c: &CostRecord| &c.order_id, COSTS_FILE);
    let feedback = aggregate_feedback(&data.feedback.rows);

    let mut seen: HashSet<&str> = HashSet::with_capacity(data.orders.len());
    let mut records = Vec::with_capacity(data.orders.len());
    for order in &data.orders.rows {
        if !seen.insert(order.order_id.as_str()) {
            warn!("Duplicate order {} in {}, keeping first", order.order_id, ORDERS_FILE);
            continue;
        }
        let id = order.order_id.as_str();
        records.push(unify(
            order,
            delivery.get(id).copied(),
            routes.get(id).copied(),
            costs.get(id).copied(),
            feedback.get(id),
        ));
    }

    let warehouse = data.warehouse.rows.iter().map(derive_stock).collect();
    let vehicles = data.vehicles.rows.iter().map(derive_vehicle).collect();

    info!(
        "Built {} unified records ({} orders in input)",
        records.len(),
        data.orders.len()
    );

    Ok(UnifiedSet {
        records,
        warehouse,
        vehicles,
    })
}

fn require_key<T>(table: &Table<T>, file: &str) -> Result<()> {
    if table.has_column(JOIN_KEY) {
        Ok(())
    } else {
        Err(PipelineError::SchemaMismatch {
            file: file.to_string(),
            column: JOIN_KEY.to_string(),
        })
    }
}

/// Index right-side rows by order id; the first row for a key wins.
fn index_by_order<'a, T, F>(rows: &'a [T], key: F, file: &str) -> HashMap<&'a str, &'a T>
where
    F: Fn(&'a T) -> &'a String,
{
    let mut index: HashMap<&'a str, &'a T> = HashMap::with_capacity(rows.len());
    let mut duplicates = 0usize;
    for row in rows {
        let id = key(row).as_str();
        if index.contains_key(id) {
            duplicates += 1;
        } else {
            index.insert(id, row);
        }
    }
    if duplicates > 0 {
        warn!("{} duplicate order rows in {} ignored", duplicates, file);
    }
    index
}

/// Mean rating and modal issue category per order.
///
/// Ties between equally frequent categories go to the one seen first.
pub fn aggregate_feedback(rows: &[FeedbackRecord]) -> HashMap<String, FeedbackSummary> {
    struct Acc<'a> {
        rating_sum: f64,
        rating_count: usize,
        // (category, count) in first-seen order
        categories: Vec<(&'a str, usize)>,
    }

    let mut groups: HashMap<&str, Acc> = HashMap::new();
    for row in rows {
        let acc = groups.entry(row.order_id.as_str()).or_insert_with(|| Acc {
            rating_sum: 0.0,
            rating_count: 0,
            categories: Vec::new(),
        });
        if let Some(rating) = row.rating.filter(|r| !r.is_nan()) {
            acc.rating_sum += rating;
            acc.rating_count += 1;
        }
        if let Some(category) = row.issue_category.as_deref() {
            match acc.categories.iter_mut().find(|(c, _)| *c == category) {
                Some((_, count)) => *count += 1,
                None => acc.categories.push((category, 1)),
            }
        }
    }

    groups
        .into_iter()
        .map(|(id, acc)| {
            let rating = (acc.rating_count > 0).then(|| acc.rating_sum / acc.rating_count as f64);
            // max_by_key returns the last maximum; scan manually to keep the first
            let mut modal: Option<(&str, usize)> = None;
            for &(category, count) in &acc.categories {
                if modal.map_or(true, |(_, best)| count > best) {
                    modal = Some((category, count));
                }
            }
            let issue_category = modal
                .map(|(c, _)| c.to_string())
                .unwrap_or_else(|| NO_ISSUE_CATEGORY.to_string());
            (
                id.to_string(),
                FeedbackSummary {
                    rating,
                    issue_category,
                },
            )
        })
        .collect()
}

fn unify(
    order: &Order,
    delivery: Option<&DeliveryRecord>,
    route: Option<&RouteRecord>,
    cost: Option<&CostRecord>,
    feedback: Option<&FeedbackSummary>,
) -> UnifiedRecord {
    let actual_delivery_days = delivery.and_then(|d| d.actual_delivery_days);
    let delivery_delay_days = match (actual_delivery_days, order.promised_delivery_days) {
        (Some(actual), Some(promised)) => Some(actual - promised),
        _ => None,
    };
    let on_time = delivery_delay_days.map_or(false, |d| d <= 0.0);
    let delay_severity = delivery_delay_days.and_then(DelaySeverity::classify);

    let empty_cost = CostRecord::default();
    let cost = cost.unwrap_or(&empty_cost);

    let distance_km = route.and_then(|r| r.distance_km);
    let mut record = UnifiedRecord {
        order_id: order.order_id.clone(),
        order_date: order.order_date,
        priority: order.priority.clone(),
        product_category: order.product_category.clone(),
        order_value_inr: order.order_value_inr,
        promised_delivery_days: order.promised_delivery_days,
        actual_delivery_days,
        route: route.and_then(|r| r.route.clone()),
        origin: route.and_then(|r| r.origin.clone()),
        destination: route.and_then(|r| r.destination.clone()),
        distance_km,
        carrier: route.and_then(|r| r.carrier.clone()),
        fuel_cost: cost.fuel_cost,
        labor_cost: cost.labor_cost,
        vehicle_maintenance: cost.vehicle_maintenance,
        insurance: cost.insurance,
        packaging_cost: cost.packaging_cost,
        technology_platform_fee: cost.technology_platform_fee,
        other_overhead: cost.other_overhead,
        rating: feedback.and_then(|f| f.rating),
        issue_category: feedback.map(|f| f.issue_category.clone()),
        delivery_delay_days,
        on_time,
        delay_severity,
        total_cost: 0.0,
        cost_per_km: None,
        revenue_to_cost_ratio: None,
    };

    record.total_cost = record
        .cost_components()
        .iter()
        .map(|c| c.filter(|v| !v.is_nan()).unwrap_or(0.0))
        .sum();
    record.cost_per_km = distance_km.and_then(|km| ratio(record.total_cost, km));
    record.revenue_to_cost_ratio = record
        .order_value_inr
        .and_then(|value| ratio(value, record.total_cost));
    record
}

/// Division that yields `None` for a zero (or NaN) denominator
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || denominator.is_nan() || numerator.is_nan() {
        None
    } else {
        Some(numerator / denominator)
    }
}

pub fn derive_stock(record: &WarehouseRecord) -> WarehouseItem {
    let stock_ratio = match (record.current_stock_units, record.reorder_level) {
        (Some(current), Some(reorder)) => ratio(current, reorder),
        _ => None,
    };
    WarehouseItem {
        record: record.clone(),
        stock_ratio,
        stock_status: stock_ratio.and_then(StockStatus::classify),
    }
}

pub fn derive_vehicle(record: &VehicleRecord) -> Vehicle {
    let efficiency_score = match (record.fuel_efficiency_km_per_l, record.co2_emissions_kg_per_km) {
        (Some(fuel), Some(co2)) => ratio(fuel, co2),
        _ => None,
    };
    Vehicle {
        record: record.clone(),
        efficiency_score,
    }
}
