use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::thresholds::{
    EXCESS_STOCK_RATIO, LOW_STOCK_RATIO, MINOR_MAX_DELAY, MODERATE_MAX_DELAY, NORMAL_STOCK_RATIO,
    ON_TIME_MAX_DELAY,
};

/// Cost component column names, in the order they are summed and exported.
pub const COST_COLUMNS: [&str; 7] = [
    "Fuel_Cost",
    "Labor_Cost",
    "Vehicle_Maintenance",
    "Insurance",
    "Packaging_Cost",
    "Technology_Platform_Fee",
    "Other_Overhead",
];

/// Raw row from orders.csv
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCsv {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Order_Date")]
    pub order_date: String,
    #[serde(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "Product_Category")]
    pub product_category: String,
    #[serde(rename = "Order_Value_INR")]
    pub order_value_inr: Option<f64>,
    #[serde(rename = "Promised_Delivery_Days")]
    pub promised_delivery_days: Option<f64>,
}

/// Order with its date parsed
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub priority: String,
    pub product_category: String,
    pub order_value_inr: Option<f64>,
    pub promised_delivery_days: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeliveryRecord {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Actual_Delivery_Days")]
    pub actual_delivery_days: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RouteRecord {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Route")]
    pub route: Option<String>,
    #[serde(rename = "Origin")]
    pub origin: Option<String>,
    #[serde(rename = "Destination")]
    pub destination: Option<String>,
    #[serde(rename = "Distance_KM")]
    pub distance_km: Option<f64>,
    #[serde(rename = "Carrier")]
    pub carrier: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VehicleRecord {
    #[serde(rename = "Vehicle_Type")]
    pub vehicle_type: String,
    #[serde(rename = "Fuel_Efficiency_KM_per_L")]
    pub fuel_efficiency_km_per_l: Option<f64>,
    #[serde(rename = "CO2_Emissions_Kg_per_KM")]
    pub co2_emissions_kg_per_km: Option<f64>,
}

/// Raw row from warehouse_inventory.csv
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseCsv {
    #[serde(rename = "Product_Category")]
    pub product_category: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Current_Stock_Units")]
    pub current_stock_units: Option<f64>,
    #[serde(rename = "Reorder_Level")]
    pub reorder_level: Option<f64>,
    #[serde(rename = "Storage_Cost_per_Unit")]
    pub storage_cost_per_unit: Option<f64>,
    #[serde(rename = "Last_Restocked_Date")]
    pub last_restocked_date: String,
}

/// Warehouse snapshot with its restock date parsed
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseRecord {
    pub product_category: String,
    pub location: String,
    pub current_stock_units: Option<f64>,
    pub reorder_level: Option<f64>,
    pub storage_cost_per_unit: Option<f64>,
    pub last_restocked_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FeedbackRecord {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Rating")]
    pub rating: Option<f64>,
    #[serde(rename = "Issue_Category")]
    pub issue_category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CostRecord {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Fuel_Cost")]
    pub fuel_cost: Option<f64>,
    #[serde(rename = "Labor_Cost")]
    pub labor_cost: Option<f64>,
    #[serde(rename = "Vehicle_Maintenance")]
    pub vehicle_maintenance: Option<f64>,
    #[serde(rename = "Insurance")]
    pub insurance: Option<f64>,
    #[serde(rename = "Packaging_Cost")]
    pub packaging_cost: Option<f64>,
    #[serde(rename = "Technology_Platform_Fee")]
    pub technology_platform_fee: Option<f64>,
    #[serde(rename = "Other_Overhead")]
    pub other_overhead: Option<f64>,
}

/// Delivery delay band
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DelaySeverity {
    OnTime,
    Minor,
    Moderate,
    Major,
}

impl DelaySeverity {
    pub const ALL: [DelaySeverity; 4] = [
        DelaySeverity::OnTime,
        DelaySeverity::Minor,
        DelaySeverity::Moderate,
        DelaySeverity::Major,
    ];

    /// Right-closed bands: (-inf, 0], (0, 2], (2, 5], (5, inf)
    pub fn classify(delay_days: f64) -> Option<Self> {
        if delay_days.is_nan() {
            None
        } else if delay_days <= ON_TIME_MAX_DELAY {
            Some(DelaySeverity::OnTime)
        } else if delay_days <= MINOR_MAX_DELAY {
            Some(DelaySeverity::Minor)
        } else if delay_days <= MODERATE_MAX_DELAY {
            Some(DelaySeverity::Moderate)
        } else {
            Some(DelaySeverity::Major)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DelaySeverity::OnTime => "On Time",
            DelaySeverity::Minor => "Minor Delay (<2 days)",
            DelaySeverity::Moderate => "Moderate Delay (2-5 days)",
            DelaySeverity::Major => "Major Delay (>5 days)",
        }
    }
}

impl fmt::Display for DelaySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Restocking urgency band
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StockStatus {
    Critical,
    Low,
    Normal,
    Excess,
}

impl StockStatus {
    pub const ALL: [StockStatus; 4] = [
        StockStatus::Critical,
        StockStatus::Low,
        StockStatus::Normal,
        StockStatus::Excess,
    ];

    /// Left-closed bands: [0, 0.5), [0.5, 0.8), [0.8, 1.2), [1.2, inf)
    pub fn classify(ratio: f64) -> Option<Self> {
        if ratio.is_nan() || ratio < 0.0 {
            None
        } else if ratio < LOW_STOCK_RATIO {
            Some(StockStatus::Critical)
        } else if ratio < NORMAL_STOCK_RATIO {
            Some(StockStatus::Low)
        } else if ratio < EXCESS_STOCK_RATIO {
            Some(StockStatus::Normal)
        } else {
            Some(StockStatus::Excess)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::Critical => "Critical",
            StockStatus::Low => "Low",
            StockStatus::Normal => "Normal",
            StockStatus::Excess => "Excess",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One order joined with delivery, route, cost and feedback data
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedRecord {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub priority: String,
    pub product_category: String,
    pub order_value_inr: Option<f64>,
    pub promised_delivery_days: Option<f64>,
    pub actual_delivery_days: Option<f64>,
    pub route: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub distance_km: Option<f64>,
    pub carrier: Option<String>,
    pub fuel_cost: Option<f64>,
    pub labor_cost: Option<f64>,
    pub vehicle_maintenance: Option<f64>,
    pub insurance: Option<f64>,
    pub packaging_cost: Option<f64>,
    pub technology_platform_fee: Option<f64>,
    pub other_overhead: Option<f64>,
    pub rating: Option<f64>,
    pub issue_category: Option<String>,
    pub delivery_delay_days: Option<f64>,
    pub on_time: bool,
    pub delay_severity: Option<DelaySeverity>,
    pub total_cost: f64,
    pub cost_per_km: Option<f64>,
    pub revenue_to_cost_ratio: Option<f64>,
}

impl UnifiedRecord {
    /// Cost components in `COST_COLUMNS` order
    pub fn cost_components(&self) -> [Option<f64>; 7] {
        [
            self.fuel_cost,
            self.labor_cost,
            self.vehicle_maintenance,
            self.insurance,
            self.packaging_cost,
            self.technology_platform_fee,
            self.other_overhead,
        ]
    }
}

/// Warehouse snapshot with stock ratio and status
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseItem {
    pub record: WarehouseRecord,
    pub stock_ratio: Option<f64>,
    pub stock_status: Option<StockStatus>,
}

/// Fleet vehicle with its efficiency score
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub record: VehicleRecord,
    pub efficiency_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_boundaries() {
        assert_eq!(DelaySeverity::classify(-3.0), Some(DelaySeverity::OnTime));
        assert_eq!(DelaySeverity::classify(0.0), Some(DelaySeverity::OnTime));
        assert_eq!(DelaySeverity::classify(0.5), Some(DelaySeverity::Minor));
        assert_eq!(DelaySeverity::classify(2.0), Some(DelaySeverity::Minor));
        assert_eq!(DelaySeverity::classify(2.1), Some(DelaySeverity::Moderate));
        assert_eq!(DelaySeverity::classify(5.0), Some(DelaySeverity::Moderate));
        assert_eq!(DelaySeverity::classify(6.0), Some(DelaySeverity::Major));
        assert_eq!(DelaySeverity::classify(f64::NAN), None);
    }

    #[test]
    fn test_stock_boundaries() {
        assert_eq!(StockStatus::classify(0.0), Some(StockStatus::Critical));
        assert_eq!(StockStatus::classify(0.49), Some(StockStatus::Critical));
        assert_eq!(StockStatus::classify(0.5), Some(StockStatus::Low));
        assert_eq!(StockStatus::classify(0.8), Some(StockStatus::Normal));
        assert_eq!(StockStatus::classify(1.2), Some(StockStatus::Excess));
        assert_eq!(StockStatus::classify(-1.0), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DelaySeverity::Moderate.to_string(), "Moderate Delay (2-5 days)");
        assert_eq!(StockStatus::Excess.to_string(), "Excess");
    }
}
