/// Pulse CLI: run the sales intelligence pipeline over a JSON export

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use serde::Deserialize;
use tracing::{info, warn};

use pulse::report::weekly_report;
use pulse::{Config, IntelligenceEngine, Observation, ProductIntelligence};

/// One product record in the input export.
#[derive(Debug, Deserialize)]
struct ProductInput {
    #[serde(rename = "productId")]
    product_id: String,
    #[serde(rename = "productName")]
    product_name: String,
    #[serde(rename = "salesHistory")]
    sales_history: Vec<Observation>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .context("Usage: pulse <sales-export.json> [config.toml]")?;
    let config = match args.next() {
        Some(path) => Config::load_from_file(&path)?,
        None => Config::default(),
    };

    println!("{} {}", "📊", "Pulse Sales Intelligence".bold());
    println!("{}", "═".repeat(60));

    let content = std::fs::read_to_string(&input_path)
        .with_context(|| format!("Failed to read {}", input_path))?;
    let products: Vec<ProductInput> =
        serde_json::from_str(&content).context("Invalid sales export format")?;
    info!("Loaded {} product(s) from {}", products.len(), input_path);

    let engine = IntelligenceEngine::new(config)?;

    let mut results: Vec<ProductIntelligence> = Vec::new();
    for product in &products {
        match engine
            .analyze(
                &product.product_id,
                &product.product_name,
                &product.sales_history,
            )
            .await
        {
            Ok(result) => {
                print_product_summary(&result);
                results.push(result);
            }
            Err(e) => {
                warn!("Skipping {}: {}", product.product_id, e);
                println!(
                    "\n{} {} - {}",
                    "⚠️",
                    product.product_name.bold(),
                    e.to_string().red()
                );
            }
        }
    }

    if results.len() > 1 {
        print_weekly_summary(&results);
    }

    println!("\n{}", "═".repeat(60));
    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}

fn print_product_summary(result: &ProductIntelligence) {
    println!("\n{} {}", "🛒", result.product_name.bold());

    let momentum = &result.realtime.momentum;
    println!(
        "   Momentum: {} (combined {:.2})",
        momentum.status.to_string().cyan(),
        momentum.combined
    );

    let burst = &result.realtime.burst;
    let severity = burst.severity.to_string();
    let severity_colored = match burst.severity.rank() {
        0 => severity.green(),
        1 => severity.yellow(),
        _ => severity.red(),
    };
    println!(
        "   Burst: {} ({:.1}x baseline)",
        severity_colored, burst.score
    );

    println!("   Forecast: {}", result.forecast.summary);
    println!(
        "   Confidence: {:.0}% overall ({:.0}% data quality)",
        result.confidence.overall * 100.0,
        result.confidence.data_quality * 100.0
    );

    if let Some(top) = result.recommendations.first() {
        println!(
            "   {} [{}] {} {}",
            "→".bold(),
            top.priority.to_string().magenta(),
            top.message,
            top.action.dimmed()
        );
    }
}

fn print_weekly_summary(results: &[ProductIntelligence]) {
    let report = weekly_report(results, Utc::now(), 3);

    println!("\n{} {}", "📈", "WEEKLY PORTFOLIO".bold());
    println!("{}", "─".repeat(60));
    let s = &report.summary;
    println!(
        "   {} products | up: {} | growing: {} | stable: {} | declining: {} | falling: {}",
        s.total_products, s.trending_up, s.growing, s.stable, s.declining, s.falling
    );
    for insight in &report.insights {
        println!("   • {}", insight);
    }
}
