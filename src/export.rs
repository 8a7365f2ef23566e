//! CSV export of the unified record set.

use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::models::UnifiedRecord;

pub const DEFAULT_EXPORT_FILE: &str = "nexgen_logistics_data.csv";

pub const EXPORT_COLUMNS: [&str; 27] = [
    "Order_ID",
    "Order_Date",
    "Priority",
    "Product_Category",
    "Order_Value_INR",
    "Promised_Delivery_Days",
    "Actual_Delivery_Days",
    "Route",
    "Origin",
    "Destination",
    "Distance_KM",
    "Carrier",
    "Fuel_Cost",
    "Labor_Cost",
    "Vehicle_Maintenance",
    "Insurance",
    "Packaging_Cost",
    "Technology_Platform_Fee",
    "Other_Overhead",
    "Rating",
    "Issue_Category",
    "Delivery_Delay_Days",
    "On_Time",
    "Delay_Severity",
    "Total_Cost",
    "Cost_per_KM",
    "Revenue_to_Cost_Ratio",
];

/// One exported row; field order matches `EXPORT_COLUMNS`
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    order_id: &'a str,
    order_date: NaiveDate,
    priority: &'a str,
    product_category: &'a str,
    order_value_inr: Option<f64>,
    promised_delivery_days: Option<f64>,
    actual_delivery_days: Option<f64>,
    route: Option<&'a str>,
    origin: Option<&'a str>,
    destination: Option<&'a str>,
    distance_km: Option<f64>,
    carrier: Option<&'a str>,
    fuel_cost: Option<f64>,
    labor_cost: Option<f64>,
    vehicle_maintenance: Option<f64>,
    insurance: Option<f64>,
    packaging_cost: Option<f64>,
    technology_platform_fee: Option<f64>,
    other_overhead: Option<f64>,
    rating: Option<f64>,
    issue_category: Option<&'a str>,
    delivery_delay_days: Option<f64>,
    on_time: &'static str,
    delay_severity: Option<&'static str>,
    total_cost: f64,
    cost_per_km: Option<f64>,
    revenue_to_cost_ratio: Option<f64>,
}

impl<'a> From<&'a UnifiedRecord> for ExportRow<'a> {
    fn from(r: &'a UnifiedRecord) -> Self {
        Self {
            order_id: &r.order_id,
            order_date: r.order_date,
            priority: &r.priority,
            product_category: &r.product_category,
            order_value_inr: r.order_value_inr,
            promised_delivery_days: r.promised_delivery_days,
            actual_delivery_days: r.actual_delivery_days,
            route: r.route.as_deref(),
            origin: r.origin.as_deref(),
            destination: r.destination.as_deref(),
            distance_km: r.distance_km,
            carrier: r.carrier.as_deref(),
            fuel_cost: r.fuel_cost,
            labor_cost: r.labor_cost,
            vehicle_maintenance: r.vehicle_maintenance,
            insurance: r.insurance,
            packaging_cost: r.packaging_cost,
            technology_platform_fee: r.technology_platform_fee,
            other_overhead: r.other_overhead,
            rating: r.rating,
            issue_category: r.issue_category.as_deref(),
            delivery_delay_days: r.delivery_delay_days,
            on_time: if r.on_time { "True" } else { "False" },
            delay_severity: r.delay_severity.map(|s| s.label()),
            total_cost: r.total_cost,
            cost_per_km: r.cost_per_km,
            revenue_to_cost_ratio: r.revenue_to_cost_ratio,
        }
    }
}

/// Write `records` as CSV; the header row is written even when empty
pub fn write_unified_csv<W: Write>(records: &[&UnifiedRecord], writer: W) -> Result<()> {
    write_csv(records, writer, "unified export")
}

/// Write the export to `path`, replacing any existing file
pub fn export_unified(records: &[&UnifiedRecord], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(records, file, &path.display().to_string())?;
    info!("Exported {} records to {:?}", records.len(), path);
    Ok(())
}

/// CSV errors are reported against `target`
fn write_csv<W: Write>(records: &[&UnifiedRecord], writer: W, target: &str) -> Result<()> {
    let csv_error = |source: csv::Error| PipelineError::Csv {
        file: target.to_string(),
        source,
    };
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(EXPORT_COLUMNS).map_err(csv_error)?;
    for &r in records {
        wtr.serialize(ExportRow::from(r)).map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::all;
    use crate::testutil::{record, routed, with_delay};

    #[test]
    fn test_header_and_nulls() {
        let records = vec![
            routed(with_delay(record("O1"), 6.0), "Delhi-Agra", "Delhivery", 0.0, 150.0),
            record("O2"),
        ];
        let mut buf = Vec::new();
        write_unified_csv(&all(&records), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0]
            .starts_with("Order_ID,Order_Date,Priority,Product_Category,Order_Value_INR"));
        assert!(lines[0]
            .ends_with("On_Time,Delay_Severity,Total_Cost,Cost_per_KM,Revenue_to_Cost_Ratio"));
        assert!(lines[1].starts_with("O1,2024-09-01,Standard,Electronics,"));
        assert!(lines[1].contains(",False,Major Delay (>5 days),150.0,,"));
        assert!(lines[2].contains(",True,On Time,0.0,,"));
    }

    #[test]
    fn test_empty_export_keeps_header() {
        let mut buf = Vec::new();
        write_unified_csv(&[], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.trim_end(), EXPORT_COLUMNS.join(","));
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error_names_target() {
        // enough rows to overflow the writer's buffer mid-export
        let records: Vec<_> = (0..500).map(|i| record(&format!("O{}", i))).collect();
        match write_csv(&all(&records), FullDisk, "reports/september.csv") {
            Err(PipelineError::Csv { file, .. }) => assert_eq!(file, "reports/september.csv"),
            other => panic!("expected csv error, got {:?}", other),
        }
    }
}
