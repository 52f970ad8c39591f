use clap::Parser;
use fapi_trader::application::system::Application;
use fapi_trader::config::Config;
use fapi_trader::infrastructure::observability::{Redactor, init_logging};
use fapi_trader::interfaces::cli::{self, Cli};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = cli::usage_exit_code(&e);
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Error: {e:#}");
            eprintln!("Set BINANCE_API_KEY and BINANCE_API_SECRET in the environment or a .env file");
            std::process::exit(1);
        }
    };

    let redactor = Arc::new(Redactor::for_credentials(&config.binance.credentials));
    let guard = match init_logging(&config.observability, redactor) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("✗ Error: failed to initialize logging: {e:#}");
            std::process::exit(1);
        }
    };

    info!(version = env!("CARGO_PKG_VERSION"), "Starting fapi-trader");
    let app = Application::build(config);

    match cli::execute(&app, args.command).await {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            println!("✗ Error: {e}");
            drop(guard);
            std::process::exit(1);
        }
    }
}
