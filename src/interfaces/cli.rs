//! Command-line surface: one subcommand per strategy plus order/account queries.
//!
//! Commands return the lines to print; `main` decides where they go and
//! maps failures to a non-zero exit code.

use crate::application::strategies::{OrderRequest, SliceOutcome};
use crate::application::system::Application;
use crate::domain::trading::types::OrderAck;
use crate::domain::validation::OrderValidator;
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "fapi-trader", author, version, about = "Binance USDT-M futures order toolkit", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Market order, filled immediately at the best available price
    Market {
        symbol: String,
        side: String,
        quantity: String,
    },
    /// Limit order resting at PRICE
    Limit {
        symbol: String,
        side: String,
        quantity: String,
        price: String,
        #[arg(default_value = "GTC")]
        time_in_force: String,
    },
    /// Stop-limit order: a LIMIT_PRICE order armed when STOP_PRICE trades
    StopLimit {
        symbol: String,
        side: String,
        quantity: String,
        stop_price: String,
        limit_price: String,
        #[arg(default_value = "GTC")]
        time_in_force: String,
    },
    /// Take-profit and stop-loss placed as two independent orders
    Oco {
        symbol: String,
        side: String,
        quantity: String,
        take_profit_price: String,
        stop_loss_price: String,
        stop_limit_price: String,
    },
    /// Ladder of limit orders between LOWER_PRICE and UPPER_PRICE
    Grid {
        symbol: String,
        lower_price: String,
        upper_price: String,
        num_grids: u32,
        quantity_per_grid: String,
    },
    /// Split TOTAL_QUANTITY into NUM_ORDERS market orders, INTERVAL_SECONDS apart
    Twap {
        symbol: String,
        side: String,
        total_quantity: String,
        num_orders: u32,
        interval_seconds: u64,
    },
    /// Cancel an open order
    Cancel { symbol: String, order_id: i64 },
    /// Query an order
    Status { symbol: String, order_id: i64 },
    /// Account balances and positions
    Account,
    /// Trading rules, optionally for one symbol
    ExchangeInfo { symbol: Option<String> },
    /// Validate configuration and a market order without sending anything
    Check {
        symbol: String,
        side: String,
        quantity: String,
    },
}

/// Exit code for an argument error: help and version output exit 0, every
/// rejected command line (bad counts included) exits 1 like any other
/// validation failure.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

fn order_lines(title: &str, response: &Value) -> Vec<String> {
    let ack = OrderAck::from_value(response);
    vec![
        format!("✓ {title}"),
        format!(
            "Order ID: {}",
            ack.order_id.map(|id| id.to_string()).unwrap_or_else(|| "N/A".into())
        ),
        format!("Symbol: {}", opt(&ack.symbol)),
        format!("Side: {}", opt(&ack.side)),
        format!("Type: {}", opt(&ack.order_type)),
        format!("Quantity: {}", opt(&ack.orig_qty)),
        format!("Executed Quantity: {}", opt(&ack.executed_qty)),
        format!("Price: {}", opt(&ack.price)),
        format!("Status: {}", opt(&ack.status)),
    ]
}

pub async fn execute(app: &Application, command: Commands) -> Result<Vec<String>> {
    let lines = match command {
        Commands::Market {
            symbol,
            side,
            quantity,
        } => {
            let request = OrderRequest::market(&symbol, &side, quantity.as_str())?;
            let response = app.orders.place(&request).await?;
            let mut lines = order_lines("Market Order Executed Successfully!", &response);
            lines.push(format!(
                "Average Price: {}",
                opt(&OrderAck::from_value(&response).avg_price)
            ));
            lines
        }
        Commands::Limit {
            symbol,
            side,
            quantity,
            price,
            time_in_force,
        } => {
            let request = OrderRequest::limit(
                &symbol,
                &side,
                quantity.as_str(),
                price.as_str(),
                &time_in_force,
            )?;
            let response = app.orders.place(&request).await?;
            let mut lines = order_lines("Limit Order Placed Successfully!", &response);
            lines.push(format!(
                "Time in Force: {}",
                opt(&OrderAck::from_value(&response).time_in_force)
            ));
            lines
        }
        Commands::StopLimit {
            symbol,
            side,
            quantity,
            stop_price,
            limit_price,
            time_in_force,
        } => {
            let request = OrderRequest::stop_limit(
                &symbol,
                &side,
                quantity.as_str(),
                stop_price.as_str(),
                limit_price.as_str(),
                &time_in_force,
            )?;
            let response = app.orders.place(&request).await?;
            let mut lines = order_lines("Stop-Limit Order Placed Successfully!", &response);
            lines.push(format!(
                "Stop Price: {}",
                opt(&OrderAck::from_value(&response).stop_price)
            ));
            lines
        }
        Commands::Oco {
            symbol,
            side,
            quantity,
            take_profit_price,
            stop_loss_price,
            stop_limit_price,
        } => {
            let report = app
                .oco
                .execute(
                    &symbol,
                    &side,
                    quantity.as_str(),
                    take_profit_price.as_str(),
                    stop_loss_price.as_str(),
                    stop_limit_price.as_str(),
                )
                .await?;
            let id = |v: &Value| {
                OrderAck::from_value(v)
                    .order_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "N/A".into())
            };
            vec![
                "✓ OCO Orders Placed Successfully!".to_string(),
                format!("Take-Profit Order ID: {}", id(&report.take_profit_order)),
                format!("Stop-Loss Order ID: {}", id(&report.stop_loss_order)),
                format!("Note: {}", report.message),
            ]
        }
        Commands::Grid {
            symbol,
            lower_price,
            upper_price,
            num_grids,
            quantity_per_grid,
        } => {
            let report = app
                .grid
                .execute(
                    &symbol,
                    lower_price.as_str(),
                    upper_price.as_str(),
                    num_grids,
                    quantity_per_grid.as_str(),
                )
                .await?;
            let mut lines = vec![
                "✓ Grid Orders Placed Successfully!".to_string(),
                format!("Buy Orders: {}", report.buy_orders.len()),
                format!("Sell Orders: {}", report.sell_orders.len()),
                format!("Total Orders: {}", report.total_orders()),
            ];
            if !report.failures.is_empty() {
                lines.push(format!("Failed Levels: {}", report.failures.len()));
            }
            for price in &report.skipped_levels {
                lines.push(format!("Skipped midpoint level: {}", price));
            }
            lines
        }
        Commands::Twap {
            symbol,
            side,
            total_quantity,
            num_orders,
            interval_seconds,
        } => {
            let report = app
                .twap
                .execute(
                    &symbol,
                    &side,
                    total_quantity.as_str(),
                    num_orders,
                    interval_seconds,
                )
                .await?;
            let mut lines = vec![
                "✓ TWAP Execution Completed!".to_string(),
                format!("Total Orders Placed: {}", report.slices.len()),
                format!("Successful Slices: {}", report.successful()),
                format!("Total Executed Quantity: {}", report.total_executed().normalize()),
                match report.average_price() {
                    Some(price) => format!("Average Execution Price: {:.2}", price),
                    None => "Average Execution Price: N/A".to_string(),
                },
            ];
            for slice in &report.slices {
                if let SliceOutcome::Failed(reason) = &slice.outcome {
                    lines.push(format!("Slice {} failed: {}", slice.index, reason));
                }
            }
            lines
        }
        Commands::Cancel { symbol, order_id } => {
            let symbol = OrderValidator::validate_symbol(&symbol)?;
            let response = app.client.cancel_order(&symbol, order_id).await?;
            order_lines("Order Cancelled Successfully!", &response)
        }
        Commands::Status { symbol, order_id } => {
            let symbol = OrderValidator::validate_symbol(&symbol)?;
            let response = app.client.get_order(&symbol, order_id).await?;
            order_lines("Order Status", &response)
        }
        Commands::Account => {
            let account = app.client.account_info().await?;
            let field = |name: &str| {
                account
                    .get(name)
                    .and_then(Value::as_str)
                    .unwrap_or("N/A")
                    .to_string()
            };
            vec![
                "✓ Account Information".to_string(),
                format!("Total Wallet Balance: {}", field("totalWalletBalance")),
                format!("Available Balance: {}", field("availableBalance")),
                format!("Unrealized PnL: {}", field("totalUnrealizedProfit")),
            ]
        }
        Commands::ExchangeInfo { symbol } => {
            let symbol = symbol
                .as_deref()
                .map(OrderValidator::validate_symbol)
                .transpose()?;
            let info = app.client.exchange_info(symbol.as_deref()).await?;
            let symbols = info
                .get("symbols")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            vec![
                "✓ Exchange Information".to_string(),
                format!("Server Time: {}", info.get("serverTime").unwrap_or(&Value::Null)),
                format!("Symbols: {}", symbols),
            ]
        }
        Commands::Check {
            symbol,
            side,
            quantity,
        } => {
            let request = OrderRequest::market(&symbol, &side, quantity.as_str())?;
            let credentials = &app.config.binance.credentials;
            vec![
                "✓ Configuration Valid!".to_string(),
                format!(
                    "API Key: configured (length: {})",
                    credentials.api_key().len()
                ),
                format!(
                    "Environment: {}",
                    if app.config.binance.testnet { "Testnet" } else { "Production" }
                ),
                format!("Symbol: {}", request.symbol),
                format!("Side: {}", request.side),
                format!("Quantity: {}", request.quantity),
                format!("Type: {}", request.order_type()),
                "This is a dry run - no order was sent".to_string(),
            ]
        }
    };

    Ok(lines)
}
