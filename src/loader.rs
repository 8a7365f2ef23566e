//! Reads the seven input tables from a data directory.
//!
//! Every file must exist and carry its required header columns; extra
//! columns are ignored. No joining happens here.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::models::{
    CostRecord, DeliveryRecord, FeedbackRecord, Order, OrderCsv, RouteRecord, VehicleRecord,
    WarehouseCsv, WarehouseRecord,
};

pub const ORDERS_FILE: &str = "orders.csv";
pub const DELIVERY_FILE: &str = "delivery_performance.csv";
pub const ROUTES_FILE: &str = "routes_distance.csv";
pub const VEHICLES_FILE: &str = "vehicle_fleet.csv";
pub const WAREHOUSE_FILE: &str = "warehouse_inventory.csv";
pub const FEEDBACK_FILE: &str = "customer_feedback.csv";
pub const COSTS_FILE: &str = "cost_breakdown.csv";

/// All input files, in the order they are checked and read
pub const DATA_FILES: [&str; 7] = [
    ORDERS_FILE,
    DELIVERY_FILE,
    ROUTES_FILE,
    VEHICLES_FILE,
    WAREHOUSE_FILE,
    FEEDBACK_FILE,
    COSTS_FILE,
];

pub const ORDERS_COLUMNS: &[&str] = &[
    "Order_ID",
    "Order_Date",
    "Priority",
    "Product_Category",
    "Order_Value_INR",
    "Promised_Delivery_Days",
];
pub const DELIVERY_COLUMNS: &[&str] = &["Order_ID", "Actual_Delivery_Days"];
pub const ROUTES_COLUMNS: &[&str] = &[
    "Order_ID",
    "Route",
    "Origin",
    "Destination",
    "Distance_KM",
    "Carrier",
];
pub const VEHICLES_COLUMNS: &[&str] = &[
    "Vehicle_Type",
    "Fuel_Efficiency_KM_per_L",
    "CO2_Emissions_Kg_per_KM",
];
pub const WAREHOUSE_COLUMNS: &[&str] = &[
    "Product_Category",
    "Location",
    "Current_Stock_Units",
    "Reorder_Level",
    "Storage_Cost_per_Unit",
    "Last_Restocked_Date",
];
pub const FEEDBACK_COLUMNS: &[&str] = &["Order_ID", "Rating", "Issue_Category"];
pub const COSTS_COLUMNS: &[&str] = &[
    "Order_ID",
    "Fuel_Cost",
    "Labor_Cost",
    "Vehicle_Maintenance",
    "Insurance",
    "Packaging_Cost",
    "Technology_Platform_Fee",
    "Other_Overhead",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Header columns plus typed rows of one input file
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    pub columns: Vec<String>,
    pub rows: Vec<T>,
}

impl<T> Table<T> {
    pub fn new(columns: &[&str], rows: Vec<T>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The seven input tables, unmerged
#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    pub orders: Table<Order>,
    pub delivery: Table<DeliveryRecord>,
    pub routes: Table<RouteRecord>,
    pub vehicles: Table<VehicleRecord>,
    pub warehouse: Table<WarehouseRecord>,
    pub feedback: Table<FeedbackRecord>,
    pub costs: Table<CostRecord>,
}

/// Load all seven tables from `dir`
pub fn load_datasets(dir: &Path) -> Result<Datasets> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingDirectory(dir.to_path_buf()));
    }
    for file in DATA_FILES {
        if !dir.join(file).is_file() {
            return Err(PipelineError::MissingFile(file.to_string()));
        }
    }

    info!("Loading datasets from {:?}", dir);

    let orders_raw: Table<OrderCsv> = read_table(dir, ORDERS_FILE, ORDERS_COLUMNS)?;
    let orders = parse_orders(orders_raw)?;
    let delivery = read_table(dir, DELIVERY_FILE, DELIVERY_COLUMNS)?;
    let routes = read_table(dir, ROUTES_FILE, ROUTES_COLUMNS)?;
    let vehicles = read_table(dir, VEHICLES_FILE, VEHICLES_COLUMNS)?;
    let warehouse_raw: Table<WarehouseCsv> = read_table(dir, WAREHOUSE_FILE, WAREHOUSE_COLUMNS)?;
    let warehouse = parse_warehouse(warehouse_raw)?;
    let feedback = read_table(dir, FEEDBACK_FILE, FEEDBACK_COLUMNS)?;
    let costs = read_table(dir, COSTS_FILE, COSTS_COLUMNS)?;

    Ok(Datasets {
        orders,
        delivery,
        routes,
        vehicles,
        warehouse,
        feedback,
        costs,
    })
}

fn read_table<T: DeserializeOwned>(dir: &Path, file: &str, required: &[&str]) -> Result<Table<T>> {
    let csv_error = |source| PipelineError::Csv {
        file: file.to_string(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(dir.join(file))
        .map_err(csv_error)?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if let Some(missing) = required.iter().find(|col| !columns.iter().any(|c| c == *col)) {
        return Err(PipelineError::SchemaMismatch {
            file: file.to_string(),
            column: missing.to_string(),
        });
    }

    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(csv_error)?;

    info!("Loaded {} rows from {}", rows.len(), file);
    debug!("{} columns: {:?}", file, columns);

    Ok(Table { columns, rows })
}

fn parse_orders(raw: Table<OrderCsv>) -> Result<Table<Order>> {
    let mut rows = Vec::with_capacity(raw.rows.len());
    for (i, r) in raw.rows.into_iter().enumerate() {
        let order_date = parse_date_field(&r.order_date, ORDERS_FILE, "Order_Date", i + 1)?;
        rows.push(Order {
            order_id: r.order_id,
            order_date,
            priority: r.priority,
            product_category: r.product_category,
            order_value_inr: r.order_value_inr,
            promised_delivery_days: r.promised_delivery_days,
        });
    }
    Ok(Table {
        columns: raw.columns,
        rows,
    })
}

fn parse_warehouse(raw: Table<WarehouseCsv>) -> Result<Table<WarehouseRecord>> {
    let mut rows = Vec::with_capacity(raw.rows.len());
    for (i, r) in raw.rows.into_iter().enumerate() {
        let last_restocked_date =
            parse_date_field(&r.last_restocked_date, WAREHOUSE_FILE, "Last_Restocked_Date", i + 1)?;
        rows.push(WarehouseRecord {
            product_category: r.product_category,
            location: r.location,
            current_stock_units: r.current_stock_units,
            reorder_level: r.reorder_level,
            storage_cost_per_unit: r.storage_cost_per_unit,
            last_restocked_date,
        });
    }
    Ok(Table {
        columns: raw.columns,
        rows,
    })
}

fn parse_date_field(value: &str, file: &str, column: &str, row: usize) -> Result<NaiveDate> {
    parse_date(value).ok_or_else(|| PipelineError::DateParse {
        file: file.to_string(),
        column: column.to_string(),
        row,
        value: value.to_string(),
    })
}

/// Parse a date cell, accepting plain dates and timestamps
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, file: &str, contents: &str) {
        fs::write(dir.join(file), contents).unwrap();
    }

    fn write_minimal(dir: &Path) {
        write(
            dir,
            ORDERS_FILE,
            "Order_ID,Order_Date,Priority,Product_Category,Order_Value_INR,Promised_Delivery_Days\n\
             O1,2024-09-01,Express,Electronics,1000,2\n",
        );
        write(dir, DELIVERY_FILE, "Order_ID,Actual_Delivery_Days\nO1,3\n");
        write(
            dir,
            ROUTES_FILE,
            "Order_ID,Route,Origin,Destination,Distance_KM,Carrier\n\
             O1,Mumbai-Pune,Mumbai,Pune,150,SpeedyLogistics\n",
        );
        write(
            dir,
            VEHICLES_FILE,
            "Vehicle_Type,Fuel_Efficiency_KM_per_L,CO2_Emissions_Kg_per_KM\n\
             Small_Van,12,0.2\n",
        );
        write(
            dir,
            WAREHOUSE_FILE,
            "Product_Category,Location,Current_Stock_Units,Reorder_Level,Storage_Cost_per_Unit,Last_Restocked_Date\n\
             Electronics,Mumbai,40,100,5.5,2024-08-20\n",
        );
        write(dir, FEEDBACK_FILE, "Order_ID,Rating,Issue_Category\nO1,4,\n");
        write(
            dir,
            COSTS_FILE,
            "Order_ID,Fuel_Cost,Labor_Cost,Vehicle_Maintenance,Insurance,Packaging_Cost,Technology_Platform_Fee,Other_Overhead\n\
             O1,100,50,,10,5,2,1\n",
        );
    }

    #[test]
    fn test_missing_directory() {
        let err = load_datasets(Path::new("/nonexistent/nexgen-data")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingDirectory(_)));
    }

    #[test]
    fn test_missing_file_is_named() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal(dir.path());
        fs::remove_file(dir.path().join(FEEDBACK_FILE)).unwrap();

        match load_datasets(dir.path()) {
            Err(PipelineError::MissingFile(name)) => assert_eq!(name, FEEDBACK_FILE),
            other => panic!("expected MissingFile, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal(dir.path());
        write(dir.path(), DELIVERY_FILE, "OrderID,Actual_Delivery_Days\nO1,3\n");

        match load_datasets(dir.path()) {
            Err(PipelineError::SchemaMismatch { file, column }) => {
                assert_eq!(file, DELIVERY_FILE);
                assert_eq!(column, "Order_ID");
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_reports_row() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal(dir.path());
        write(
            dir.path(),
            ORDERS_FILE,
            "Order_ID,Order_Date,Priority,Product_Category,Order_Value_INR,Promised_Delivery_Days\n\
             O1,2024-09-01,Express,Electronics,1000,2\n\
             O2,someday,Standard,Books,200,4\n",
        );

        match load_datasets(dir.path()) {
            Err(PipelineError::DateParse { column, row, value, .. }) => {
                assert_eq!(column, "Order_Date");
                assert_eq!(row, 2);
                assert_eq!(value, "someday");
            }
            other => panic!("expected DateParse, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_restock_date_reports_row() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal(dir.path());
        write(
            dir.path(),
            WAREHOUSE_FILE,
            "Product_Category,Location,Current_Stock_Units,Reorder_Level,\
             Storage_Cost_per_Unit,Last_Restocked_Date\n\
             Electronics,Mumbai,40,100,5.5,2024-08-20\n\
             Books,Delhi,90,100,2.0,2024-08-21\n\
             Toys,Pune,10,100,1.0,31.02.2024\n",
        );

        match load_datasets(dir.path()) {
            Err(PipelineError::DateParse { file, column, row, value }) => {
                assert_eq!(file, WAREHOUSE_FILE);
                assert_eq!(column, "Last_Restocked_Date");
                assert_eq!(row, 3);
                assert_eq!(value, "31.02.2024");
            }
            other => panic!("expected DateParse, got {:?}", other),
        }
    }

    #[test]
    fn test_load_minimal() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal(dir.path());

        let data = load_datasets(dir.path()).unwrap();
        assert_eq!(data.orders.len(), 1);
        assert_eq!(data.orders.rows[0].order_date, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
        assert_eq!(data.costs.rows[0].vehicle_maintenance, None);
        assert_eq!(data.feedback.rows[0].issue_category, None);
        assert!(data.routes.has_column("Carrier"));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date("2024-03-15 08:30:00"), expected);
        assert_eq!(parse_date("03/15/2024"), expected);
        assert_eq!(parse_date("not a date"), None);
    }
}
