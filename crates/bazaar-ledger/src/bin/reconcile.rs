//! # Reconciliation Operator Tool
//!
//! Runs ledger operations by hand against a configured database.
//!
//! ## Usage
//! ```bash
//! # Record sales for an order (no-op if already recorded)
//! cargo run -p bazaar-ledger --bin reconcile -- record <order_id>
//!
//! # Finish an order left partial by a skipped line
//! cargo run -p bazaar-ledger --bin reconcile -- resume <order_id>
//!
//! # Order transitions (recording fires on the edge)
//! cargo run -p bazaar-ledger --bin reconcile -- pay <order_id>
//! cargo run -p bazaar-ledger --bin reconcile -- deliver <order_id>
//!
//! # Reports
//! cargo run -p bazaar-ledger --bin reconcile -- breakdown <order_id>
//! cargo run -p bazaar-ledger --bin reconcile -- history <product_id> [limit]
//!
//! # Alternate config file
//! cargo run -p bazaar-ledger --bin reconcile -- --config ./bazaar.toml record <order_id>
//! ```
//!
//! Results are printed as JSON.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::info;

use bazaar_db::Database;
use bazaar_ledger::telemetry::init_tracing;
use bazaar_ledger::{sales_breakdown, LedgerConfig, OrderFlow, SalesRecorder, StockLedger};

const USAGE: &str = "\
Bazaar Reconciliation Tool

Usage: reconcile [--config <PATH>] <COMMAND> <ID> [LIMIT]

Commands:
  record <order_id>             Record vendor sales for an order
  resume <order_id>             Record the remaining lines of a partial or stalled order
  pay <order_id>                Confirm payment (records on the paid edge)
  deliver <order_id>            Confirm delivery (records on the delivered edge)
  breakdown <order_id>          Show per-vendor sales totals
  history <product_id> [limit]  Show recent stock movements (default limit 20)

Options:
  -c, --config <PATH>   Config file (default: $BAZAAR_CONFIG or ./bazaar.toml)
  -h, --help            Show this help message";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut config_path: Option<PathBuf> = None;
    if let Some(pos) = args.iter().position(|a| a == "--config" || a == "-c") {
        if pos + 1 >= args.len() {
            bail!("--config needs a path\n\n{USAGE}");
        }
        config_path = Some(PathBuf::from(args.remove(pos + 1)));
        args.remove(pos);
    }

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let config = LedgerConfig::load(config_path).context("loading configuration")?;
    init_tracing(Some(&config.logging.filter));

    let command = args[0].as_str();
    let id = args
        .get(1)
        .with_context(|| format!("`{command}` needs an id\n\n{USAGE}"))?;

    let db = Database::new(config.db_config())
        .await
        .with_context(|| format!("opening {}", config.database.path.display()))?;
    info!(command, id = %id, "Running reconcile command");

    let recorder =
        SalesRecorder::new(db.clone(), config.commission_rate()).with_claim_lease(config.claim_lease());

    match command {
        "record" => match recorder.record_sales_for_order(id).await {
            Ok(outcome) => print_json(&outcome)?,
            Err(err) if err.is_already_recorded() => println!("Order {id} is already recorded"),
            Err(err) => return Err(err.into()),
        },
        "resume" => print_json(&recorder.resume_sales_for_order(id).await?)?,
        "pay" => print_json(&OrderFlow::new(db.clone(), recorder).confirm_payment(id).await?)?,
        "deliver" => print_json(&OrderFlow::new(db.clone(), recorder).confirm_delivery(id).await?)?,
        "breakdown" => match sales_breakdown(&db, id).await? {
            Some(breakdown) => print_json(&breakdown)?,
            None => println!("No sales recorded for order {id}"),
        },
        "history" => {
            let limit: u32 = match args.get(2) {
                Some(raw) => raw.parse().with_context(|| format!("invalid limit `{raw}`"))?,
                None => 20,
            };
            let movements = StockLedger::new(db.clone()).movement_history(id, limit).await?;
            print_json(&movements)?;
        }
        other => bail!("unknown command `{other}`\n\n{USAGE}"),
    }

    db.close().await;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
