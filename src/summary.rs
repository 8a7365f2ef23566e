//! Group-level rollups over a (possibly filtered) view of unified records.
//!
//! Every function here is pure. Groups come back ordered by key, and
//! records whose group key is null are left out of that grouping. Null
//! metric values are skipped when averaging.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    DelaySeverity, StockStatus, UnifiedRecord, Vehicle, WarehouseItem, COST_COLUMNS,
};
use crate::pipeline::ratio;

/// Running mean that ignores nulls and non-finite values
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.count += 1;
        }
    }

    fn get(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut m = Mean::default();
    values.into_iter().for_each(|v| m.add(v));
    m.get()
}

fn on_time_rate(records: &[&UnifiedRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().filter(|r| r.on_time).count() as f64 / records.len() as f64
}

fn group_by<'a, F>(
    records: &[&'a UnifiedRecord],
    key: F,
) -> BTreeMap<String, Vec<&'a UnifiedRecord>>
where
    F: Fn(&UnifiedRecord) -> Option<&str>,
{
    let mut groups: BTreeMap<String, Vec<&'a UnifiedRecord>> = BTreeMap::new();
    for &r in records {
        if let Some(k) = key(r) {
            groups.entry(k.to_string()).or_default().push(r);
        }
    }
    groups
}

fn sort_desc<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> f64,
{
    // stable: ties keep their key order
    items.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
}

/// Borrow every record, for callers without a filter
pub fn all(records: &[UnifiedRecord]) -> Vec<&UnifiedRecord> {
    records.iter().collect()
}

// ============================================================================
// Order-level groupings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarrierSummary {
    pub carrier: String,
    pub order_count: usize,
    pub on_time_rate: f64,
    pub avg_rating: Option<f64>,
    pub avg_total_cost: f64,
}

pub fn carrier_summary(records: &[&UnifiedRecord]) -> Vec<CarrierSummary> {
    group_by(records, |r| r.carrier.as_deref())
        .into_iter()
        .map(|(carrier, rows)| CarrierSummary {
            order_count: rows.len(),
            on_time_rate: on_time_rate(&rows),
            avg_rating: mean(rows.iter().map(|r| r.rating)),
            avg_total_cost: mean(rows.iter().map(|r| Some(r.total_cost))).unwrap_or(0.0),
            carrier,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrioritySummary {
    pub priority: String,
    pub order_count: usize,
    pub on_time_rate: f64,
    pub avg_delay: Option<f64>,
    pub max_delay: Option<f64>,
    pub min_delay: Option<f64>,
    pub avg_cost: f64,
    pub avg_rating: Option<f64>,
}

pub fn priority_summary(records: &[&UnifiedRecord]) -> Vec<PrioritySummary> {
    group_by(records, |r| Some(r.priority.as_str()))
        .into_iter()
        .map(|(priority, rows)| {
            let delays: Vec<f64> = rows.iter().filter_map(|r| r.delivery_delay_days).collect();
            PrioritySummary {
                order_count: rows.len(),
                on_time_rate: on_time_rate(&rows),
                avg_delay: mean(delays.iter().copied().map(Some)),
                max_delay: delays.iter().copied().reduce(f64::max),
                min_delay: delays.iter().copied().reduce(f64::min),
                avg_cost: mean(rows.iter().map(|r| Some(r.total_cost))).unwrap_or(0.0),
                avg_rating: mean(rows.iter().map(|r| r.rating)),
                priority,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub route: String,
    pub order_count: usize,
    pub avg_delay: Option<f64>,
    pub avg_cost: f64,
    pub avg_distance: Option<f64>,
    /// Mean cost over mean distance; null when the mean distance is zero
    pub cost_per_km: Option<f64>,
}

pub fn route_summary(records: &[&UnifiedRecord]) -> Vec<RouteSummary> {
    group_by(records, |r| r.route.as_deref())
        .into_iter()
        .map(|(route, rows)| {
            let avg_cost = mean(rows.iter().map(|r| Some(r.total_cost))).unwrap_or(0.0);
            let avg_distance = mean(rows.iter().map(|r| r.distance_km));
            RouteSummary {
                order_count: rows.len(),
                avg_delay: mean(rows.iter().map(|r| r.delivery_delay_days)),
                avg_cost,
                avg_distance,
                cost_per_km: avg_distance.and_then(|d| ratio(avg_cost, d)),
                route,
            }
        })
        .collect()
}

/// Routes with the highest cost per km; routes without one are skipped
pub fn top_routes_by_cost_per_km(routes: &[RouteSummary], n: usize) -> Vec<RouteSummary> {
    let mut ranked: Vec<RouteSummary> = routes
        .iter()
        .filter(|r| r.cost_per_km.is_some())
        .cloned()
        .collect();
    sort_desc(&mut ranked, |r| r.cost_per_km.unwrap_or(f64::NEG_INFINITY));
    ranked.truncate(n);
    ranked
}

pub fn top_routes_by_order_count(routes: &[RouteSummary], n: usize) -> Vec<RouteSummary> {
    let mut ranked = routes.to_vec();
    ranked.sort_by(|a, b| b.order_count.cmp(&a.order_count));
    ranked.truncate(n);
    ranked
}

pub fn top_routes_by_mean_cost(routes: &[RouteSummary], n: usize) -> Vec<RouteSummary> {
    let mut ranked = routes.to_vec();
    sort_desc(&mut ranked, |r| r.avg_cost);
    ranked.truncate(n);
    ranked
}

pub fn top_routes_by_mean_delay(routes: &[RouteSummary], n: usize) -> Vec<RouteSummary> {
    let mut ranked: Vec<RouteSummary> = routes
        .iter()
        .filter(|r| r.avg_delay.is_some())
        .cloned()
        .collect();
    sort_desc(&mut ranked, |r| r.avg_delay.unwrap_or(f64::NEG_INFINITY));
    ranked.truncate(n);
    ranked
}

// ============================================================================
// Headline numbers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSnapshot {
    pub total_orders: usize,
    pub on_time_rate: Option<f64>,
    /// Mean delay over late orders only
    pub avg_delay_late: Option<f64>,
    pub avg_rating: Option<f64>,
    pub total_revenue: f64,
    pub total_cost: f64,
    /// (revenue - cost) / revenue, zero without revenue
    pub profit_margin: f64,
    pub avg_cost_per_order: Option<f64>,
}

pub fn kpi_snapshot(records: &[&UnifiedRecord]) -> KpiSnapshot {
    let total_orders = records.len();
    let total_revenue: f64 = records
        .iter()
        .filter_map(|r| r.order_value_inr)
        .filter(|v| v.is_finite())
        .sum();
    let total_cost: f64 = records.iter().map(|r| r.total_cost).sum();
    let profit_margin = if total_revenue > 0.0 {
        (total_revenue - total_cost) / total_revenue
    } else {
        0.0
    };

    KpiSnapshot {
        total_orders,
        on_time_rate: (total_orders > 0).then(|| on_time_rate(records)),
        avg_delay_late: mean(
            records
                .iter()
                .map(|r| r.delivery_delay_days.filter(|d| *d > 0.0)),
        ),
        avg_rating: mean(records.iter().map(|r| r.rating)),
        total_revenue,
        total_cost,
        profit_margin,
        avg_cost_per_order: ratio(total_cost, total_orders as f64),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityCount {
    pub severity: DelaySeverity,
    pub label: &'static str,
    pub count: usize,
}

/// Orders per delay band, every band reported
pub fn delay_distribution(records: &[&UnifiedRecord]) -> Vec<SeverityCount> {
    DelaySeverity::ALL
        .iter()
        .map(|&severity| SeverityCount {
            severity,
            label: severity.label(),
            count: records.iter().filter(|r| r.delay_severity == Some(severity)).count(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostComponentTotal {
    pub component: &'static str,
    pub total: f64,
}

/// Network-wide total per cost component
pub fn cost_breakdown(records: &[&UnifiedRecord]) -> Vec<CostComponentTotal> {
    let mut totals = [0.0f64; 7];
    for r in records {
        for (total, value) in totals.iter_mut().zip(r.cost_components()) {
            *total += value.filter(|v| v.is_finite()).unwrap_or(0.0);
        }
    }
    COST_COLUMNS
        .iter()
        .zip(totals)
        .map(|(&component, total)| CostComponentTotal { component, total })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostDetail {
    pub order_id: String,
    pub priority: String,
    pub carrier: Option<String>,
    pub route: Option<String>,
    pub total_cost: f64,
    pub fuel_cost: Option<f64>,
    pub labor_cost: Option<f64>,
    pub vehicle_maintenance: Option<f64>,
}

pub fn cost_details(records: &[&UnifiedRecord], n: usize) -> Vec<CostDetail> {
    records
        .iter()
        .take(n)
        .map(|r| CostDetail {
            order_id: r.order_id.clone(),
            priority: r.priority.clone(),
            carrier: r.carrier.clone(),
            route: r.route.clone(),
            total_cost: r.total_cost,
            fuel_cost: r.fuel_cost,
            labor_cost: r.labor_cost,
            vehicle_maintenance: r.vehicle_maintenance,
        })
        .collect()
}

// ============================================================================
// Warehouse and fleet
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockStatusCount {
    pub status: StockStatus,
    pub count: usize,
}

pub fn stock_status_counts(items: &[WarehouseItem]) -> Vec<StockStatusCount> {
    StockStatus::ALL
        .iter()
        .map(|&status| StockStatusCount {
            status,
            count: items.iter().filter(|i| i.stock_status == Some(status)).count(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub location: String,
    pub total_stock: f64,
    pub avg_storage_cost: Option<f64>,
    pub unique_categories: usize,
}

pub fn location_summary(items: &[WarehouseItem]) -> Vec<LocationSummary> {
    let mut groups: BTreeMap<&str, Vec<&WarehouseItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.record.location.as_str()).or_default().push(item);
    }
    groups
        .into_iter()
        .map(|(location, rows)| LocationSummary {
            location: location.to_string(),
            total_stock: rows
                .iter()
                .filter_map(|i| i.record.current_stock_units)
                .filter(|v| v.is_finite())
                .sum(),
            avg_storage_cost: mean(rows.iter().map(|i| i.record.storage_cost_per_unit)),
            unique_categories: rows
                .iter()
                .map(|i| i.record.product_category.as_str())
                .collect::<BTreeSet<_>>()
                .len(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSummary {
    pub vehicle_type: String,
    pub vehicle_count: usize,
    pub avg_efficiency_score: Option<f64>,
    pub avg_fuel_efficiency: Option<f64>,
    pub avg_co2_emissions: Option<f64>,
}

pub fn vehicle_summary(vehicles: &[Vehicle]) -> Vec<VehicleSummary> {
    let mut groups: BTreeMap<&str, Vec<&Vehicle>> = BTreeMap::new();
    for v in vehicles {
        groups.entry(v.record.vehicle_type.as_str()).or_default().push(v);
    }
    groups
        .into_iter()
        .map(|(vehicle_type, rows)| VehicleSummary {
            vehicle_type: vehicle_type.to_string(),
            vehicle_count: rows.len(),
            avg_efficiency_score: mean(rows.iter().map(|v| v.efficiency_score)),
            avg_fuel_efficiency: mean(rows.iter().map(|v| v.record.fuel_efficiency_km_per_l)),
            avg_co2_emissions: mean(rows.iter().map(|v| v.record.co2_emissions_kg_per_km)),
        })
        .collect()
}
