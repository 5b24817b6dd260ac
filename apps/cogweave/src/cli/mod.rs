//! # Cogweave CLI Module
//!
//! This module implements the CLI interface for cogweave.
//!
//! ## Available Commands
//!
//! - `init` - Create an empty snapshot
//! - `status` - Show store counters
//! - `node` / `link` - Add atoms to the AtomSpace
//! - `pipeline` - Run text through the full transduction pipeline
//! - `encode` - Encode tree expressions with the prime tree encoder
//! - `tick` - Run attention and activation updates
//! - `infer-inheritance` / `infer-similarity` - PLN inference by atom name
//! - `coherence` - Compute the three-store coherence
//! - `hash` - Compute BLAKE3 hash of the snapshot

mod commands;

use clap::{Parser, Subcommand};
use cogweave_core::CogError;
use std::path::PathBuf;

pub use commands::*;

/// Environment variable naming the default config file.
pub const CONFIG_ENV: &str = "COGWEAVE_CONFIG";

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Cogweave - knowledge substrate
///
/// Typed knowledge graph, knowledge units and prime tree encodings,
/// persisted as a single snapshot file.
#[derive(Parser, Debug)]
#[command(name = "cogweave")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the snapshot file
    #[arg(short = 'S', long, global = true, default_value = "cogweave.snap")]
    pub snapshot: PathBuf,

    /// Path to a TOML config file (falls back to $COGWEAVE_CONFIG)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new empty snapshot
    Init {
        /// Overwrite an existing snapshot
        #[arg(short, long)]
        force: bool,
    },

    /// Show store counters
    Status,

    /// Add a named node
    Node {
        /// Atom type (concept, predicate, variable, ...)
        #[arg(short = 't', long, default_value = "concept")]
        atom_type: String,

        /// Node name
        name: String,
    },

    /// Add a link between named atoms
    Link {
        /// Atom type (inheritance, similarity, member, ...)
        #[arg(short = 't', long, default_value = "inheritance")]
        atom_type: String,

        /// Strength of the new link
        #[arg(short, long)]
        strength: Option<f32>,

        /// Confidence of the new link
        #[arg(short = 'C', long)]
        confidence: Option<f32>,

        /// Target atom names, in order
        #[arg(required = true)]
        targets: Vec<String>,
    },

    /// Run text through unit → atom → tensor
    Pipeline {
        /// Input texts
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Encode parenthesis tree expressions
    Encode {
        /// Expressions such as "(()())"
        #[arg(required = true)]
        expressions: Vec<String>,
    },

    /// Run attention/activation updates
    Tick {
        /// Number of ticks
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },

    /// Deduce A → C from A → B and B → C
    InferInheritance { a: String, b: String, c: String },

    /// Infer a similarity link between two atoms
    InferSimilarity { a: String, b: String },

    /// Compute coherence across the three stores
    Coherence,

    /// Compute BLAKE3 cryptographic hash of the snapshot
    Hash,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CogError> {
    let config_path = cli
        .config
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    let config = load_config(config_path.as_deref())?;
    let ctx = Context {
        snapshot: cli.snapshot,
        config,
        json_mode: cli.json_mode,
    };

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&ctx, force),
        Some(Commands::Status) | None => cmd_status(&ctx),
        Some(Commands::Node { atom_type, name }) => cmd_node(&ctx, &atom_type, &name),
        Some(Commands::Link {
            atom_type,
            strength,
            confidence,
            targets,
        }) => cmd_link(&ctx, &atom_type, &targets, strength, confidence),
        Some(Commands::Pipeline { texts }) => cmd_pipeline(&ctx, &texts),
        Some(Commands::Encode { expressions }) => cmd_encode(&ctx, &expressions),
        Some(Commands::Tick { count }) => cmd_tick(&ctx, count),
        Some(Commands::InferInheritance { a, b, c }) => cmd_infer_inheritance(&ctx, &a, &b, &c),
        Some(Commands::InferSimilarity { a, b }) => cmd_infer_similarity(&ctx, &a, &b),
        Some(Commands::Coherence) => cmd_coherence(&ctx),
        Some(Commands::Hash) => cmd_hash(&ctx),
    }
}
