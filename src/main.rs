//! NexGen logistics dashboard - terminal report over the seven CSV inputs
//!
//! Run: ./target/release/nexgen_dashboard [--data-dir DIR] [filters] [section]
//! Sections: all, overview, performance, costs, inventory, recommendations,
//! alerts, export

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use nexgen_dashboard::alerts::generate_alerts;
use nexgen_dashboard::cache::DatasetCache;
use nexgen_dashboard::export::{export_unified, DEFAULT_EXPORT_FILE};
use nexgen_dashboard::filter::FilterConfig;
use nexgen_dashboard::loader::parse_date;
use nexgen_dashboard::models::UnifiedRecord;
use nexgen_dashboard::pipeline::UnifiedSet;
use nexgen_dashboard::recommendations::recommend;
use nexgen_dashboard::summary::{
    all, carrier_summary, cost_breakdown, cost_details, delay_distribution, kpi_snapshot,
    location_summary, priority_summary, route_summary, stock_status_counts,
    top_routes_by_cost_per_km, top_routes_by_mean_delay, top_routes_by_order_count,
    vehicle_summary,
};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const TOP_ROUTES: usize = 10;
const COST_DETAIL_ROWS: usize = 10;

/// Logistics performance report
#[derive(Parser, Debug)]
#[command(name = "nexgen_dashboard")]
#[command(about = "Delivery, cost and inventory report over the NexGen CSV exports")]
struct Args {
    /// Directory holding the seven input CSV files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Keep only these priorities (repeatable)
    #[arg(long = "priority")]
    priorities: Vec<String>,

    /// Keep only these carriers (repeatable)
    #[arg(long = "carrier")]
    carriers: Vec<String>,

    /// Keep only these product categories (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// First order date to include
    #[arg(long, value_parser = parse_date_arg)]
    from: Option<NaiveDate>,

    /// Last order date to include
    #[arg(long, value_parser = parse_date_arg)]
    to: Option<NaiveDate>,

    /// Print the section as JSON instead of tables
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    section: Option<Section>,
}

#[derive(Subcommand, Debug, Clone)]
enum Section {
    /// Every report section
    All,
    /// Headline KPIs and delay distribution
    Overview,
    /// Carrier, priority and route delivery performance
    Performance,
    /// Cost components and cost efficiency by route
    Costs,
    /// Warehouse stock levels and fleet efficiency
    Inventory,
    /// Action items for carriers, routes and stock
    Recommendations,
    /// Threshold breaches
    Alerts,
    /// Write every unified record to CSV; filters do not apply
    Export {
        #[arg(long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },
}

fn parse_date_arg(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("unrecognised date: {}", value))
}

impl Args {
    fn filter(&self) -> FilterConfig {
        FilterConfig {
            date_from: self.from,
            date_to: self.to,
            priorities: self.priorities.clone(),
            carriers: self.carriers.clone(),
            categories: self.categories.clone(),
        }
    }
}

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(80));
    println!("  {}", title);
    println!("{}\n", "═".repeat(80));
}

fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(70));
}

fn pct(rate: Option<f64>) -> String {
    rate.map_or_else(|| "n/a".to_string(), |r| format!("{:.1}%", r * 100.0))
}

fn num(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.*}", decimals, v))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let section = args.section.clone().unwrap_or(Section::All);
    let filter = args.filter();

    let mut cache = DatasetCache::new(args.data_dir.clone());
    let set = cache
        .snapshot()
        .with_context(|| format!("failed to load data from {}", args.data_dir.display()))?;

    let view = filter.apply(&set.records);
    if filter.is_unconstrained() {
        info!("Reporting on all {} orders", view.len());
    } else {
        info!("Filter kept {} of {} orders", view.len(), set.records.len());
    }

    if let Section::Export { output } = &section {
        let records = all(&set.records);
        export_unified(&records, output)
            .with_context(|| format!("failed to export to {}", output.display()))?;
        println!("Exported {} records to {}", records.len(), output.display());
        return Ok(());
    }

    if args.json {
        let value = section_json(&section, &view, &set);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("\n{}", "█".repeat(80));
    println!("{}  NEXGEN LOGISTICS DASHBOARD  {}", "█".repeat(25), "█".repeat(24));
    println!("{}\n", "█".repeat(80));

    match section {
        Section::All => {
            run_overview_section(&view);
            run_performance_section(&view);
            run_costs_section(&view);
            run_inventory_section(&set);
            run_recommendations_section(&view, &set);
            run_alerts_section(&view, &set);
        }
        Section::Overview => run_overview_section(&view),
        Section::Performance => run_performance_section(&view),
        Section::Costs => run_costs_section(&view),
        Section::Inventory => run_inventory_section(&set),
        Section::Recommendations => run_recommendations_section(&view, &set),
        Section::Alerts => run_alerts_section(&view, &set),
        Section::Export { .. } => {}
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn section_json(section: &Section, view: &[&UnifiedRecord], set: &UnifiedSet) -> serde_json::Value {
    let routes = route_summary(view);
    let overview = || {
        json!({
            "kpis": kpi_snapshot(view),
            "delay_distribution": delay_distribution(view),
            "top_routes_by_orders": top_routes_by_order_count(&routes, TOP_ROUTES),
        })
    };
    let performance = || {
        json!({
            "carriers": carrier_summary(view),
            "priorities": priority_summary(view),
            "most_delayed_routes": top_routes_by_mean_delay(&routes, TOP_ROUTES),
        })
    };
    let costs = || {
        json!({
            "breakdown": cost_breakdown(view),
            "costliest_routes_per_km": top_routes_by_cost_per_km(&routes, TOP_ROUTES),
            "orders": cost_details(view, COST_DETAIL_ROWS),
        })
    };
    let inventory = || {
        json!({
            "stock_status": stock_status_counts(&set.warehouse),
            "locations": location_summary(&set.warehouse),
            "vehicles": vehicle_summary(&set.vehicles),
        })
    };
    let recommendations = || json!(recommend(view, &set.warehouse));
    let alerts = || json!(generate_alerts(view, &set.warehouse));

    match section {
        Section::All | Section::Export { .. } => json!({
            "overview": overview(),
            "performance": performance(),
            "costs": costs(),
            "inventory": inventory(),
            "recommendations": recommendations(),
            "alerts": alerts(),
        }),
        Section::Overview => overview(),
        Section::Performance => performance(),
        Section::Costs => costs(),
        Section::Inventory => inventory(),
        Section::Recommendations => recommendations(),
        Section::Alerts => alerts(),
    }
}

fn run_overview_section(view: &[&UnifiedRecord]) {
    print_section_header("1. OVERVIEW");

    let kpi = kpi_snapshot(view);
    print_subsection("Key Performance Indicators");
    println!("  Total Orders:         {:>12}", kpi.total_orders);
    println!("  On-Time Delivery:     {:>12}", pct(kpi.on_time_rate));
    println!("  Avg Delay (late):     {:>12} days", num(kpi.avg_delay_late, 1));
    println!("  Avg Rating:           {:>12}", num(kpi.avg_rating, 2));
    println!("  Total Revenue:        {:>12.0} INR", kpi.total_revenue);
    println!("  Total Cost:           {:>12.0} INR", kpi.total_cost);
    println!("  Profit Margin:        {:>11.1}%", kpi.profit_margin * 100.0);
    println!("  Avg Cost per Order:   {:>12} INR", num(kpi.avg_cost_per_order, 0));

    print_subsection("Delivery Delay Distribution");
    let total = view.len().max(1) as f64;
    for band in delay_distribution(view) {
        println!("  {:28} {:>8} {:>9.1}%",
                 band.label, band.count, band.count as f64 / total * 100.0);
    }

    print_subsection("Busiest Routes");
    let routes = route_summary(view);
    println!("  {:28} {:>8} {:>12} {:>12}", "Route", "Orders", "Avg Delay", "Avg Cost");
    println!("  {}", "─".repeat(64));
    for r in top_routes_by_order_count(&routes, TOP_ROUTES) {
        println!("  {:28} {:>8} {:>12} {:>12.0}",
                 r.route, r.order_count, num(r.avg_delay, 1), r.avg_cost);
    }
}

fn run_performance_section(view: &[&UnifiedRecord]) {
    print_section_header("2. DELIVERY PERFORMANCE");

    print_subsection("By Carrier");
    println!("  {:22} {:>8} {:>10} {:>10} {:>12}",
             "Carrier", "Orders", "OTD%", "Rating", "Avg Cost");
    println!("  {}", "─".repeat(66));
    for c in carrier_summary(view) {
        println!("  {:22} {:>8} {:>9.1}% {:>10} {:>12.0}",
                 c.carrier, c.order_count, c.on_time_rate * 100.0,
                 num(c.avg_rating, 2), c.avg_total_cost);
    }

    print_subsection("By Priority");
    println!("  {:12} {:>8} {:>10} {:>10} {:>8} {:>8} {:>10}",
             "Priority", "Orders", "OTD%", "Avg Delay", "Max", "Min", "Avg Cost");
    println!("  {}", "─".repeat(72));
    for p in priority_summary(view) {
        println!("  {:12} {:>8} {:>9.1}% {:>10} {:>8} {:>8} {:>10.0}",
                 p.priority, p.order_count, p.on_time_rate * 100.0,
                 num(p.avg_delay, 1), num(p.max_delay, 0), num(p.min_delay, 0), p.avg_cost);
    }

    print_subsection("Most Delayed Routes");
    let routes = route_summary(view);
    println!("  {:28} {:>8} {:>12}", "Route", "Orders", "Avg Delay");
    println!("  {}", "─".repeat(50));
    for r in top_routes_by_mean_delay(&routes, TOP_ROUTES) {
        println!("  {:28} {:>8} {:>12}", r.route, r.order_count, num(r.avg_delay, 1));
    }
}

fn run_costs_section(view: &[&UnifiedRecord]) {
    print_section_header("3. COST ANALYSIS");

    print_subsection("Cost Components");
    let breakdown = cost_breakdown(view);
    let grand_total: f64 = breakdown.iter().map(|c| c.total).sum();
    for c in &breakdown {
        let share = if grand_total > 0.0 { c.total / grand_total * 100.0 } else { 0.0 };
        println!("  {:26} {:>14.0} INR {:>7.1}%", c.component, c.total, share);
    }

    print_subsection("Highest Cost per KM");
    let routes = route_summary(view);
    println!("  {:28} {:>10} {:>12} {:>12}", "Route", "Orders", "Avg KM", "Cost/KM");
    println!("  {}", "─".repeat(66));
    for r in top_routes_by_cost_per_km(&routes, TOP_ROUTES) {
        println!("  {:28} {:>10} {:>12} {:>12}",
                 r.route, r.order_count, num(r.avg_distance, 0), num(r.cost_per_km, 2));
    }

    print_subsection("Order Cost Detail");
    println!("  {:10} {:10} {:18} {:>10} {:>10} {:>10}",
             "Order", "Priority", "Carrier", "Total", "Fuel", "Labor");
    println!("  {}", "─".repeat(72));
    for d in cost_details(view, COST_DETAIL_ROWS) {
        println!("  {:10} {:10} {:18} {:>10.0} {:>10} {:>10}",
                 d.order_id, d.priority, d.carrier.as_deref().unwrap_or("-"),
                 d.total_cost, num(d.fuel_cost, 0), num(d.labor_cost, 0));
    }
}

fn run_inventory_section(set: &UnifiedSet) {
    print_section_header("4. INVENTORY & FLEET");

    print_subsection("Stock Status");
    for s in stock_status_counts(&set.warehouse) {
        println!("  {:12} {:>8}", s.status.label(), s.count);
    }

    print_subsection("By Warehouse");
    println!("  {:18} {:>14} {:>16} {:>12}",
             "Location", "Total Stock", "Storage/Unit", "Categories");
    println!("  {}", "─".repeat(64));
    for l in location_summary(&set.warehouse) {
        println!("  {:18} {:>14.0} {:>16} {:>12}",
                 l.location, l.total_stock, num(l.avg_storage_cost, 2), l.unique_categories);
    }

    print_subsection("Fleet Efficiency");
    println!("  {:18} {:>8} {:>12} {:>12} {:>12}",
             "Vehicle Type", "Count", "Score", "KM/L", "CO2 kg/KM");
    println!("  {}", "─".repeat(68));
    for v in vehicle_summary(&set.vehicles) {
        println!("  {:18} {:>8} {:>12} {:>12} {:>12}",
                 v.vehicle_type, v.vehicle_count, num(v.avg_efficiency_score, 2),
                 num(v.avg_fuel_efficiency, 1), num(v.avg_co2_emissions, 3));
    }
}

fn run_recommendations_section(view: &[&UnifiedRecord], set: &UnifiedSet) {
    print_section_header("5. RECOMMENDATIONS");

    let recs = recommend(view, &set.warehouse);

    print_subsection("Immediate Actions");
    if recs.immediate_actions.is_empty() {
        println!("  No actions for the current selection");
    }
    for (i, action) in recs.immediate_actions.iter().enumerate() {
        println!("  {}. {}", i + 1, action);
    }

    print_subsection("Stock Needing Attention");
    for item in &recs.needs_attention {
        println!("  {:18} {:18} {:>8} / {:<8} {}",
                 item.product_category, item.location,
                 num(item.current_stock_units, 0), num(item.reorder_level, 0), item.status);
    }

    print_subsection("Redistribution Candidates");
    for item in &recs.redistribute {
        println!("  {:18} {:18} {:>8} / {:<8}",
                 item.product_category, item.location,
                 num(item.current_stock_units, 0), num(item.reorder_level, 0));
    }
}

fn run_alerts_section(view: &[&UnifiedRecord], set: &UnifiedSet) {
    print_section_header("6. ALERTS");

    let alerts = generate_alerts(view, &set.warehouse);
    if alerts.is_empty() {
        println!("  No threshold breaches");
    }
    for alert in &alerts {
        println!("  {}", alert);
    }
}
