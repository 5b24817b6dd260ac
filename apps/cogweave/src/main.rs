//! # Cogweave
//!
//! The command-line binary for the cogweave knowledge substrate.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                apps/cogweave (THE BINARY)            │
//! │                                                      │
//! │   ┌──────────────┐          ┌──────────────────┐     │
//! │   │     CLI      │          │  snapshot file   │     │
//! │   │   (clap)     │◀────────▶│  + TOML config   │     │
//! │   └──────┬───────┘          └──────────────────┘     │
//! │          ▼                                           │
//! │   ┌──────────────────┐                               │
//! │   │  cogweave-core   │                               │
//! │   │   (THE LOGIC)    │                               │
//! │   └──────────────────┘                               │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! cogweave init
//! cogweave node Human && cogweave node Mammal && cogweave node Animal
//! cogweave link Human Mammal -s 0.9 && cogweave link Mammal Animal -s 0.85
//! cogweave infer-inheritance Human Mammal Animal
//! cogweave pipeline "hello world"
//! cogweave encode "(()())"
//! ```

use clap::Parser;
use cogweave::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // COGWEAVE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("COGWEAVE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cogweave=info,cogweave_core=warn".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!("cogweave v{} - atoms, units, trees", env!("CARGO_PKG_VERSION"));
    println!();
}
