//! Spreedly gateway client CLI
//!
//! Thin command line front end over `GatewayService`.
//!
//! # Architecture Overview
//!
//! ```text
//!     CLI args / config file / SPREEDLY_* env
//!         │
//!         ▼
//!     ┌──────────┐    ┌────────────────┐    ┌─────────────┐    ┌───────────┐
//!     │  config  │───▶│ GatewayService │───▶│ resilience  │───▶│   http    │──▶ API
//!     └──────────┘    │   (client)     │    │ (deadlines) │    │ transport │
//!                     └───────┬────────┘    └──────┬──────┘    └───────────┘
//!                             │                    │
//!                             ▼                    ▼
//!                     ┌──────────────┐     ┌─────────────┐
//!                     │   gateway    │◀────│     xml     │
//!                     │   mapping    │     │   parser    │
//!                     └──────────────┘     └─────────────┘
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use spreedly_client::config::loader::{config_from_env, load_config};
use spreedly_client::observability::logging::init_logging;
use spreedly_client::GatewayService;

#[derive(Parser)]
#[command(name = "spreedly-client")]
#[command(about = "Command line client for the Spreedly gateway API", long_about = None)]
struct Cli {
    /// TOML config file; defaults plus SPREEDLY_* environment when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API answers
    Ping,
    /// List gateways on the account
    Gateways,
    /// Add a gateway unless an enabled one of the type exists
    AddGateway {
        gateway_type: String,
        /// Credential field as name=value, repeatable
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Redact a gateway
    Redact { token: String },
    /// Charge a payment method
    Purchase {
        payment_method: String,
        /// Amount in major units, e.g. 10.50
        amount: Decimal,
        #[arg(short, long, default_value = "test")]
        gateway_type: String,
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// Verify a payment method
    Verify {
        payment_method: String,
        #[arg(short, long, default_value = "test")]
        gateway_type: String,
    },
    /// Retain a payment method
    Retain { payment_method: String },
    /// Check whether a gateway token exists
    Exists { token: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => config_from_env()?,
    };
    init_logging(&config.observability);

    let service = GatewayService::from_config(&config)?;

    let ok = match cli.command {
        Commands::Ping => match service.ping().await {
            Ok(()) => print_json(&json!({ "ok": true }))?,
            Err(reason) => {
                print_json(&json!({ "ok": false, "reason": reason }))?;
                false
            }
        },
        Commands::Gateways => print_option(service.gateways().await)?,
        Commands::AddGateway {
            gateway_type,
            fields,
        } => {
            let fields: BTreeMap<String, String> = fields.into_iter().collect();
            print_option(service.add_gateway(&gateway_type, &fields).await)?
        }
        Commands::Redact { token } => print_option(service.redact_gateway(&token).await)?,
        Commands::Purchase {
            payment_method,
            amount,
            gateway_type,
            currency,
        } => {
            let tx = service
                .process_payment(&gateway_type, &payment_method, amount, &currency)
                .await;
            print_json(&tx)? && tx.succeeded
        }
        Commands::Verify {
            payment_method,
            gateway_type,
        } => {
            let tx = service
                .verify_payment_method(&gateway_type, &payment_method)
                .await;
            print_json(&tx)? && tx.succeeded
        }
        Commands::Retain { payment_method } => {
            print_option(service.retain_payment_method(&payment_method).await)?
        }
        Commands::Exists { token } => {
            let exists = service.gateway_exists(&token).await;
            print_json(&json!({ "token": token, "exists": exists }))? && exists
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got `{}`", raw)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<bool, Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(true)
}

fn print_option<T: Serialize>(value: Option<T>) -> Result<bool, Box<dyn std::error::Error>> {
    match value {
        Some(value) => print_json(&value),
        None => {
            eprintln!("Error: call failed, see log output for the cause");
            Ok(false)
        }
    }
}
