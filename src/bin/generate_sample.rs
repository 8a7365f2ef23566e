//! Sample dataset generator for the NexGen dashboard
//!
//! Writes the seven input CSV files with consistent Order_IDs, so every
//! dashboard section has something to show. A few orders are left without
//! delivery, route, cost or feedback rows to exercise the left joins.
//!
//! Usage:
//!   cargo run --release --bin generate_sample -- [OPTIONS]
//!
//! Options:
//!   --orders <N>       Number of orders to generate (default: 200)
//!   --seed <N>         Random seed for reproducibility (optional)
//!   --output-dir <DIR> Directory to write into (default: data)

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;
use csv::WriterBuilder;
use nexgen_dashboard::loader::{
    COSTS_COLUMNS, COSTS_FILE, DELIVERY_COLUMNS, DELIVERY_FILE, FEEDBACK_COLUMNS, FEEDBACK_FILE,
    ORDERS_COLUMNS, ORDERS_FILE, ROUTES_COLUMNS, ROUTES_FILE, VEHICLES_COLUMNS, VEHICLES_FILE,
    WAREHOUSE_COLUMNS, WAREHOUSE_FILE,
};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sample data generator
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
#[command(about = "Generate a consistent seven-file NexGen sample dataset")]
struct Args {
    /// Number of orders
    #[arg(long, default_value = "200")]
    orders: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// Share of orders with no delivery, route or cost row (0.0 - 1.0)
    #[arg(long, default_value = "0.05")]
    missing_rate: f64,
}

const PRIORITIES: [&str; 3] = ["Express", "Standard", "Economy"];
const CATEGORIES: [&str; 6] = [
    "Electronics",
    "Fashion",
    "Food & Beverage",
    "Healthcare",
    "Home Goods",
    "Books",
];
const CITIES: [&str; 8] = [
    "Mumbai", "Delhi", "Bangalore", "Chennai", "Kolkata", "Hyderabad", "Pune", "Ahmedabad",
];
const CARRIERS: [&str; 5] = [
    "SpeedyLogistics",
    "QuickShip",
    "GlobalTransit",
    "ReliableExpress",
    "EcoDeliver",
];
const VEHICLE_TYPES: [&str; 5] = [
    "Small Van",
    "Large Truck",
    "Refrigerated",
    "Express Bike",
    "Medium Truck",
];
const ISSUES: [&str; 5] = [
    "Late Delivery",
    "Damaged",
    "Wrong Item",
    "Poor Packaging",
    "Rude Staff",
];

#[derive(Debug, Serialize)]
struct OrderRow {
    #[serde(rename = "Order_ID")]
    order_id: String,
    #[serde(rename = "Order_Date")]
    order_date: String,
    #[serde(rename = "Priority")]
    priority: &'static str,
    #[serde(rename = "Product_Category")]
    product_category: &'static str,
    #[serde(rename = "Order_Value_INR")]
    order_value_inr: f64,
    #[serde(rename = "Promised_Delivery_Days")]
    promised_delivery_days: u32,
}

#[derive(Debug, Serialize)]
struct DeliveryRow {
    #[serde(rename = "Order_ID")]
    order_id: String,
    #[serde(rename = "Actual_Delivery_Days")]
    actual_delivery_days: u32,
}

#[derive(Debug, Serialize)]
struct RouteRow {
    #[serde(rename = "Order_ID")]
    order_id: String,
    #[serde(rename = "Route")]
    route: String,
    #[serde(rename = "Origin")]
    origin: &'static str,
    #[serde(rename = "Destination")]
    destination: &'static str,
    #[serde(rename = "Distance_KM")]
    distance_km: f64,
    #[serde(rename = "Carrier")]
    carrier: &'static str,
}

#[derive(Debug, Serialize)]
struct VehicleRow {
    #[serde(rename = "Vehicle_ID")]
    vehicle_id: String,
    #[serde(rename = "Vehicle_Type")]
    vehicle_type: &'static str,
    #[serde(rename = "Fuel_Efficiency_KM_per_L")]
    fuel_efficiency_km_per_l: f64,
    #[serde(rename = "CO2_Emissions_Kg_per_KM")]
    co2_emissions_kg_per_km: f64,
}

#[derive(Debug, Serialize)]
struct WarehouseRow {
    #[serde(rename = "Product_Category")]
    product_category: &'static str,
    #[serde(rename = "Location")]
    location: &'static str,
    #[serde(rename = "Current_Stock_Units")]
    current_stock_units: u32,
    #[serde(rename = "Reorder_Level")]
    reorder_level: u32,
    #[serde(rename = "Storage_Cost_per_Unit")]
    storage_cost_per_unit: f64,
    #[serde(rename = "Last_Restocked_Date")]
    last_restocked_date: String,
}

#[derive(Debug, Serialize)]
struct FeedbackRow {
    #[serde(rename = "Order_ID")]
    order_id: String,
    #[serde(rename = "Rating")]
    rating: u32,
    #[serde(rename = "Issue_Category")]
    issue_category: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct CostRow {
    #[serde(rename = "Order_ID")]
    order_id: String,
    #[serde(rename = "Fuel_Cost")]
    fuel_cost: f64,
    #[serde(rename = "Labor_Cost")]
    labor_cost: f64,
    #[serde(rename = "Vehicle_Maintenance")]
    vehicle_maintenance: f64,
    #[serde(rename = "Insurance")]
    insurance: f64,
    #[serde(rename = "Packaging_Cost")]
    packaging_cost: f64,
    #[serde(rename = "Technology_Platform_Fee")]
    technology_platform_fee: f64,
    #[serde(rename = "Other_Overhead")]
    other_overhead: f64,
}

/// Round to two decimals, as money is stored
fn money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Promised days by priority
fn promised_days(priority: &str, rng: &mut impl Rng) -> u32 {
    match priority {
        "Express" => rng.gen_range(1..=2),
        "Standard" => rng.gen_range(3..=5),
        _ => rng.gen_range(5..=8),
    }
}

/// Actual days: mostly on time, with a tail of late deliveries
fn actual_days(promised: u32, rng: &mut impl Rng) -> u32 {
    let roll: f64 = rng.gen();
    let slip = if roll < 0.55 {
        -(rng.gen_range(0..=1) as i64)
    } else if roll < 0.80 {
        rng.gen_range(1..=2)
    } else if roll < 0.93 {
        rng.gen_range(3..=5)
    } else {
        rng.gen_range(6..=10)
    };
    (promised as i64 + slip).max(1) as u32
}

/// Header first, so a table with no rows still loads
fn write_rows<T: Serialize>(dir: &Path, file: &str, header: &[&str], rows: &[T]) -> Result<()> {
    let path = dir.join(file);
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let args = Args::parse();

    println!("🔧 Sample Data Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Output dir:       {}", args.output_dir.display());
    println!("Orders:           {}", args.orders);
    println!("Missing rate:     {:.1}%", args.missing_rate * 100.0);
    if let Some(seed) = args.seed {
        println!("Random seed:      {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;

    let start = NaiveDate::from_ymd_opt(2024, 9, 1).context("invalid start date")?;

    let mut orders = Vec::with_capacity(args.orders);
    let mut delivery = Vec::new();
    let mut routes = Vec::new();
    let mut feedback = Vec::new();
    let mut costs = Vec::new();

    for i in 1..=args.orders {
        let order_id = format!("ORD{:06}", i);
        let priority = *PRIORITIES.choose(&mut rng).context("no priorities")?;
        let category = *CATEGORIES.choose(&mut rng).context("no categories")?;
        let promised = promised_days(priority, &mut rng);
        let date = start + Duration::days(rng.gen_range(0..60));

        orders.push(OrderRow {
            order_id: order_id.clone(),
            order_date: date.format("%Y-%m-%d").to_string(),
            priority,
            product_category: category,
            order_value_inr: money(rng.gen_range(200.0..20000.0)),
            promised_delivery_days: promised,
        });

        if rng.gen_bool(args.missing_rate.clamp(0.0, 1.0)) {
            continue;
        }

        let actual = actual_days(promised, &mut rng);
        delivery.push(DeliveryRow {
            order_id: order_id.clone(),
            actual_delivery_days: actual,
        });

        let mut ends = CITIES.choose_multiple(&mut rng, 2);
        let (origin, destination) = match (ends.next(), ends.next()) {
            (Some(&o), Some(&d)) => (o, d),
            _ => continue,
        };
        let distance = money(rng.gen_range(50.0..2500.0));
        routes.push(RouteRow {
            order_id: order_id.clone(),
            route: format!("{}-{}", origin, destination),
            origin,
            destination,
            distance_km: distance,
            carrier: *CARRIERS.choose(&mut rng).context("no carriers")?,
        });

        costs.push(CostRow {
            order_id: order_id.clone(),
            fuel_cost: money(distance * rng.gen_range(0.3..0.6)),
            labor_cost: money(rng.gen_range(80.0..400.0)),
            vehicle_maintenance: money(rng.gen_range(20.0..150.0)),
            insurance: money(rng.gen_range(10.0..80.0)),
            packaging_cost: money(rng.gen_range(15.0..120.0)),
            technology_platform_fee: money(rng.gen_range(5.0..40.0)),
            other_overhead: money(rng.gen_range(10.0..90.0)),
        });

        // roughly two thirds of customers leave feedback, late ones rate lower
        if rng.gen_bool(0.66) {
            let late = actual > promised;
            let rating = if late { rng.gen_range(1..=3) } else { rng.gen_range(3..=5) };
            let issue = if late {
                Some("Late Delivery")
            } else if rating < 4 {
                ISSUES.choose(&mut rng).copied()
            } else {
                None
            };
            feedback.push(FeedbackRow {
                order_id,
                rating,
                issue_category: issue,
            });
        }
    }

    let vehicles: Vec<VehicleRow> = (1..=30)
        .map(|i| {
            let vehicle_type = VEHICLE_TYPES[i % VEHICLE_TYPES.len()];
            VehicleRow {
                vehicle_id: format!("VEH{:03}", i),
                vehicle_type,
                fuel_efficiency_km_per_l: money(rng.gen_range(4.0..35.0)),
                co2_emissions_kg_per_km: money(rng.gen_range(0.05..0.9)),
            }
        })
        .collect();

    let mut warehouse = Vec::new();
    for &location in CITIES.iter().take(5) {
        for &category in CATEGORIES.iter() {
            let reorder = rng.gen_range(50..=300);
            // spread ratios across every stock band
            let ratio: f64 = rng.gen_range(0.2..2.0);
            warehouse.push(WarehouseRow {
                product_category: category,
                location,
                current_stock_units: (reorder as f64 * ratio).round() as u32,
                reorder_level: reorder,
                storage_cost_per_unit: money(rng.gen_range(1.0..12.0)),
                last_restocked_date: (start - Duration::days(rng.gen_range(1..45)))
                    .format("%Y-%m-%d")
                    .to_string(),
            });
        }
    }

    let vehicle_header: Vec<&str> = std::iter::once("Vehicle_ID")
        .chain(VEHICLES_COLUMNS.iter().copied())
        .collect();

    let dir = &args.output_dir;
    write_rows(dir, ORDERS_FILE, ORDERS_COLUMNS, &orders)?;
    write_rows(dir, DELIVERY_FILE, DELIVERY_COLUMNS, &delivery)?;
    write_rows(dir, ROUTES_FILE, ROUTES_COLUMNS, &routes)?;
    write_rows(dir, VEHICLES_FILE, &vehicle_header, &vehicles)?;
    write_rows(dir, WAREHOUSE_FILE, WAREHOUSE_COLUMNS, &warehouse)?;
    write_rows(dir, FEEDBACK_FILE, FEEDBACK_COLUMNS, &feedback)?;
    write_rows(dir, COSTS_FILE, COSTS_COLUMNS, &costs)?;

    println!("\n✅ Done");
    println!("   Orders:           {}", orders.len());
    println!("   With delivery:    {}", delivery.len());
    println!("   With feedback:    {}", feedback.len());
    println!("   Warehouse rows:   {}", warehouse.len());
    println!("   Vehicles:         {}", vehicles.len());

    Ok(())
}
