//! Threshold breach scan over unified records and warehouse stock.
//!
//! Rules are evaluated independently and may co-occur. Output order is
//! critical stock, severe delays, low ratings, then high-cost routes.

use serde::Serialize;
use std::fmt;

use crate::models::{DelaySeverity, StockStatus, UnifiedRecord, WarehouseItem};
use crate::summary::{route_summary, top_routes_by_mean_cost};
use crate::thresholds::{
    LOW_RATING, MAX_CRITICAL_STOCK_ALERTS, MAX_HIGH_COST_ROUTE_ALERTS, MAX_SEVERE_DELAY_ALERTS,
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum AlertSeverity {
    Critical,
    Warning,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Critical => f.write_str("CRITICAL"),
            AlertSeverity::Warning => f.write_str("WARNING"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum AlertKind {
    CriticalStock,
    SevereDelay,
    LowRating,
    HighCostRoute,
}

impl AlertKind {
    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::CriticalStock => "Critical Stock Alert",
            AlertKind::SevereDelay => "Severe Delay Alert",
            AlertKind::LowRating => "Low Rating Alert",
            AlertKind::HighCostRoute => "High Cost Route",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    fn new(severity: AlertSeverity, kind: AlertKind, message: String) -> Self {
        Self {
            severity,
            kind,
            message,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind.title(), self.message)
    }
}

pub fn generate_alerts(records: &[&UnifiedRecord], warehouse: &[WarehouseItem]) -> Vec<Alert> {
    let mut alerts = Vec::new();
    alerts.extend(critical_stock_alerts(warehouse));
    alerts.extend(severe_delay_alerts(records));
    alerts.extend(low_rating_alert(records));
    alerts.extend(high_cost_route_alerts(records));
    alerts
}

pub fn critical_stock_alerts(warehouse: &[WarehouseItem]) -> Vec<Alert> {
    warehouse
        .iter()
        .filter(|item| item.stock_status == Some(StockStatus::Critical))
        .take(MAX_CRITICAL_STOCK_ALERTS)
        .map(|item| {
            let r = &item.record;
            Alert::new(
                AlertSeverity::Critical,
                AlertKind::CriticalStock,
                format!(
                    "{} at {}: {} units (reorder level {})",
                    r.product_category,
                    r.location,
                    fmt_units(r.current_stock_units),
                    fmt_units(r.reorder_level)
                ),
            )
        })
        .collect()
}

pub fn severe_delay_alerts(records: &[&UnifiedRecord]) -> Vec<Alert> {
    records
        .iter()
        .filter(|r| r.delay_severity == Some(DelaySeverity::Major))
        .take(MAX_SEVERE_DELAY_ALERTS)
        .map(|r| {
            Alert::new(
                AlertSeverity::Critical,
                AlertKind::SevereDelay,
                format!(
                    "Order {}: {} → {}, delay {:.0} days, carrier {}",
                    r.order_id,
                    r.origin.as_deref().unwrap_or("?"),
                    r.destination.as_deref().unwrap_or("?"),
                    r.delivery_delay_days.unwrap_or(0.0),
                    r.carrier.as_deref().unwrap_or("unknown")
                ),
            )
        })
        .collect()
}

pub fn low_rating_alert(records: &[&UnifiedRecord]) -> Option<Alert> {
    let count = records
        .iter()
        .filter(|r| r.rating.map_or(false, |rating| rating < LOW_RATING))
        .count();
    (count > 0).then(|| {
        Alert::new(
            AlertSeverity::Warning,
            AlertKind::LowRating,
            format!("{} orders with rating below {:.0}/5", count, LOW_RATING),
        )
    })
}

pub fn high_cost_route_alerts(records: &[&UnifiedRecord]) -> Vec<Alert> {
    let routes = route_summary(records);
    top_routes_by_mean_cost(&routes, MAX_HIGH_COST_ROUTE_ALERTS)
        .into_iter()
        .map(|route| {
            Alert::new(
                AlertSeverity::Warning,
                AlertKind::HighCostRoute,
                format!("Route {}: average cost ₹{:.0}", route.route, route.avg_cost),
            )
        })
        .collect()
}

fn fmt_units(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.0}", v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::all;
    use crate::testutil::{record, routed, stock, with_delay};

    #[test]
    fn test_critical_stock_capped_in_input_order() {
        let warehouse = vec![
            stock("Electronics", "Mumbai", 10.0, 100.0),
            stock("Books", "Delhi", 90.0, 100.0),
            stock("Fashion", "Pune", 20.0, 100.0),
            stock("Grocery", "Chennai", 0.0, 100.0),
            stock("Toys", "Kolkata", 30.0, 100.0),
            stock("Home", "Hyderabad", 49.0, 100.0),
        ];
        let alerts = critical_stock_alerts(&warehouse);

        assert_eq!(alerts.len(), MAX_CRITICAL_STOCK_ALERTS);
        assert!(alerts[0].message.starts_with("Electronics at Mumbai"));
        assert!(alerts[1].message.starts_with("Fashion at Pune"));
        assert!(alerts[2].message.starts_with("Grocery at Chennai"));
        assert!(alerts.iter().all(|a| a.severity == AlertSeverity::Critical));
    }

    #[test]
    fn test_no_major_delays_no_delay_alerts() {
        let records = vec![
            with_delay(record("O1"), 1.0),
            with_delay(record("O2"), 5.0),
            with_delay(record("O3"), -2.0),
        ];
        assert!(severe_delay_alerts(&all(&records)).is_empty());
    }

    #[test]
    fn test_severe_delays_capped() {
        let records: Vec<_> = (1..=4)
            .map(|i| {
                let late = with_delay(record(&format!("O{}", i)), 6.0 + i as f64);
                routed(late, "Delhi-Agra", "Delhivery", 200.0, 500.0)
            })
            .collect();
        let alerts = severe_delay_alerts(&all(&records));

        assert_eq!(alerts.len(), MAX_SEVERE_DELAY_ALERTS);
        assert!(alerts[0].message.starts_with("Order O1: Delhi → Agra, delay 7 days"));
        assert!(alerts[1].message.contains("O2"));
    }

    #[test]
    fn test_low_rating_single_summary() {
        let mut a = record("O1");
        a.rating = Some(2.0);
        let mut b = record("O2");
        b.rating = Some(1.5);
        let mut c = record("O3");
        c.rating = Some(3.0);
        let records = vec![a, b, c, record("O4")];

        let alert = low_rating_alert(&all(&records)).unwrap();
        assert_eq!(alert.message, "2 orders with rating below 3/5");
        assert!(low_rating_alert(&all(&records[2..])).is_none());
    }

    #[test]
    fn test_high_cost_routes_and_ordering() {
        let records = vec![
            routed(record("O1"), "A-B", "X", 10.0, 100.0),
            routed(record("O2"), "C-D", "X", 10.0, 400.0),
            routed(record("O3"), "E-F", "X", 10.0, 300.0),
            routed(record("O4"), "G-H", "X", 10.0, 200.0),
        ];
        let alerts = high_cost_route_alerts(&all(&records));
        let routes: Vec<&str> = alerts.iter().map(|a| &a.message[6..9]).collect();
        assert_eq!(routes, vec!["C-D", "E-F", "G-H"]);

        let warehouse = vec![stock("Books", "Delhi", 10.0, 100.0)];
        let mut late = with_delay(record("O5"), 9.0);
        late.rating = Some(1.0);
        let mut records = records;
        records.push(late);

        let kinds: Vec<AlertKind> = generate_alerts(&all(&records), &warehouse)
            .iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                AlertKind::CriticalStock,
                AlertKind::SevereDelay,
                AlertKind::LowRating,
                AlertKind::HighCostRoute,
                AlertKind::HighCostRoute,
                AlertKind::HighCostRoute,
            ]
        );
    }

    #[test]
    fn test_no_routes_no_route_alerts() {
        let records = vec![record("O1")];
        assert!(high_cost_route_alerts(&all(&records)).is_empty());
        assert!(generate_alerts(&all(&records), &[]).is_empty());
    }
}
