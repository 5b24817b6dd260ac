//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Every command loads the snapshot (or starts empty), runs against the
//! in-memory pipeline, and writes the snapshot back if it changed anything.

use cogweave_core::{
    AtomId, AtomSpace, AtomType, CogError, CognitiveKernel, CogweaveConfig, Pipeline, TruthValue,
    pipeline_from_bytes, pipeline_to_bytes, primitives::MAX_SNAPSHOT_SIZE, snapshot_hash,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CogError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CogError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(CogError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Resolved global options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub snapshot: PathBuf,
    pub config: CogweaveConfig,
    pub json_mode: bool,
}

impl Context {
    /// Context with default config and text output.
    pub fn new(snapshot: impl Into<PathBuf>) -> Self {
        Self {
            snapshot: snapshot.into(),
            config: CogweaveConfig::default(),
            json_mode: false,
        }
    }
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Write an empty snapshot.
pub fn cmd_init(ctx: &Context, force: bool) -> Result<(), CogError> {
    if ctx.snapshot.exists() && !force {
        return Err(CogError::IoError(
            "Snapshot already exists. Use --force to overwrite.".to_string(),
        ));
    }

    let pipeline = Pipeline::new(&ctx.config);
    save_pipeline(&pipeline, &ctx.snapshot)?;
    println!("Initialized new snapshot at {:?}", ctx.snapshot);
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store counters.
pub fn cmd_status(ctx: &Context) -> Result<(), CogError> {
    let pipeline = load_or_create_pipeline(ctx)?;
    let stats = pipeline.stats();

    if ctx.json_mode {
        let output = serde_json::json!({
            "snapshot": ctx.snapshot.to_string_lossy(),
            "stats": stats,
        });
        print_json(&output);
        return Ok(());
    }

    let atoms = &stats.atomspace;
    let units = &stats.cogfluence;
    println!("Cogweave Status");
    println!("===============");
    println!("Snapshot: {:?}", ctx.snapshot);
    println!();
    println!("AtomSpace");
    println!(
        "  Atoms:      {} live / {} allocated / {} max",
        atoms.live_atoms, atoms.atoms, atoms.capacity
    );
    println!(
        "  Inferences: {} ({} successful, accuracy {:.3})",
        atoms.total_inferences, atoms.successful_inferences, atoms.reasoning_accuracy
    );
    println!("  Mean STI:   {:.4}", atoms.mean_sti);
    println!("  Mean LTI:   {:.4}", atoms.mean_lti);
    for (atom_type, count) in atoms.by_type.iter().filter(|(_, n)| *n > 0) {
        println!("    {:<12} {}", atom_type.name(), count);
    }
    println!();
    println!("Cogfluence");
    println!("  Units:      {} / {}", units.units, units.unit_capacity);
    println!("  Workflows:  {} / {}", units.workflows, units.workflow_capacity);
    println!("  Coherence:  {:.4}", units.coherence);
    println!();
    println!(
        "Transductions: {} ({} successful)",
        stats.total_transductions, stats.successful_transductions
    );

    Ok(())
}

// =============================================================================
// ATOM COMMANDS
// =============================================================================

/// Add a named node.
pub fn cmd_node(ctx: &Context, atom_type: &str, name: &str) -> Result<(), CogError> {
    let atom_type = parse_atom_type(atom_type)?;
    let mut pipeline = load_or_create_pipeline(ctx)?;
    let id = pipeline.atomspace_mut().add_node(atom_type, name)?;
    save_pipeline(&pipeline, &ctx.snapshot)?;

    if ctx.json_mode {
        print_json(&serde_json::json!({ "atom": id.0, "type": atom_type, "name": name }));
    } else {
        println!("Added {} node '{}' as atom {}", atom_type, name, id);
    }
    Ok(())
}

/// Add a link over named targets, optionally with an explicit truth value.
pub fn cmd_link(
    ctx: &Context,
    atom_type: &str,
    targets: &[String],
    strength: Option<f32>,
    confidence: Option<f32>,
) -> Result<(), CogError> {
    let atom_type = parse_atom_type(atom_type)?;
    let mut pipeline = load_or_create_pipeline(ctx)?;
    let space = pipeline.atomspace_mut();

    let outgoing = targets
        .iter()
        .map(|name| resolve_atom(&*space, name))
        .collect::<Result<Vec<_>, _>>()?;
    let link = space.add_link(atom_type, &outgoing)?;
    if strength.is_some() || confidence.is_some() {
        let current = space.truth_value(link).unwrap_or_default();
        let truth = TruthValue::new(
            strength.unwrap_or(current.strength()),
            confidence.unwrap_or(current.confidence()),
            current.count(),
        );
        space.set_truth_value(link, truth)?;
    }
    let truth = space.truth_value(link).unwrap_or_default();
    save_pipeline(&pipeline, &ctx.snapshot)?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "atom": link.0,
            "type": atom_type,
            "outgoing": outgoing.iter().map(|id| id.0).collect::<Vec<_>>(),
            "strength": truth.strength(),
            "confidence": truth.confidence(),
        }));
    } else {
        println!(
            "Added {} link {} over {:?} (strength {:.3}, confidence {:.3})",
            atom_type,
            link,
            targets,
            truth.strength(),
            truth.confidence()
        );
    }
    Ok(())
}

// =============================================================================
// PIPELINE COMMAND
// =============================================================================

/// Run each text through the full pipeline.
pub fn cmd_pipeline(ctx: &Context, texts: &[String]) -> Result<(), CogError> {
    let mut pipeline = load_or_create_pipeline(ctx)?;

    let mut receipts = Vec::with_capacity(texts.len());
    for text in texts {
        receipts.push(pipeline.full_pipeline(text)?);
    }
    save_pipeline(&pipeline, &ctx.snapshot)?;

    if ctx.json_mode {
        print_json(&serde_json::json!({ "receipts": receipts }));
    } else {
        for receipt in &receipts {
            println!("{}", receipt);
        }
    }
    Ok(())
}

// =============================================================================
// ENCODE COMMAND
// =============================================================================

/// Encode tree expressions into a fresh kernel and print the encodings.
///
/// The kernel is not part of the snapshot, so nothing is written.
pub fn cmd_encode(ctx: &Context, expressions: &[String]) -> Result<(), CogError> {
    let mut kernel = CognitiveKernel::from_config(&ctx.config.kernel);

    let mut encodings = Vec::with_capacity(expressions.len());
    for expression in expressions {
        encodings.push((expression, kernel.write(expression)?));
    }

    if ctx.json_mode {
        let rows: Vec<_> = encodings
            .iter()
            .map(|(expression, enc)| {
                serde_json::json!({
                    "expression": expression,
                    "encoding": enc,
                    "summary": enc.summary(),
                })
            })
            .collect();
        print_json(&serde_json::json!({ "encodings": rows }));
        return Ok(());
    }

    for (expression, enc) in &encodings {
        println!(
            "{} -> matula {} (level {}, breadth {}, depth {}, phase {:.4}{:+.4}i)",
            expression,
            enc.matula_value,
            enc.system_level,
            enc.breadth_index,
            enc.depth_index,
            enc.phase.re,
            enc.phase.im
        );
    }
    Ok(())
}

// =============================================================================
// TICK COMMAND
// =============================================================================

/// Run `count` attention/activation ticks.
pub fn cmd_tick(ctx: &Context, count: u32) -> Result<(), CogError> {
    let mut pipeline = load_or_create_pipeline(ctx)?;
    for _ in 0..count {
        pipeline.tick();
    }
    save_pipeline(&pipeline, &ctx.snapshot)?;

    let stats = pipeline.atomspace().stats();
    if ctx.json_mode {
        print_json(&serde_json::json!({
            "ticks": count,
            "mean_sti": stats.mean_sti,
            "mean_lti": stats.mean_lti,
        }));
    } else {
        println!(
            "Ran {} tick(s): mean STI {:.4}, mean LTI {:.4}",
            count, stats.mean_sti, stats.mean_lti
        );
    }
    Ok(())
}

// =============================================================================
// INFERENCE COMMANDS
// =============================================================================

/// Deduce `a → c` from `a → b` and `b → c`, by atom name.
pub fn cmd_infer_inheritance(ctx: &Context, a: &str, b: &str, c: &str) -> Result<(), CogError> {
    let mut pipeline = load_or_create_pipeline(ctx)?;
    let space = pipeline.atomspace_mut();
    let (ia, ib, ic) = (
        resolve_atom(space, a)?,
        resolve_atom(space, b)?,
        resolve_atom(space, c)?,
    );

    let link = space.infer_inheritance(ia, ib, ic)?;
    let truth = link.and_then(|id| space.truth_value(id));
    save_pipeline(&pipeline, &ctx.snapshot)?;

    report_inference(ctx, "inheritance", &format!("{a} -> {c}"), link, truth);
    Ok(())
}

/// Infer similarity between two atoms, by name.
pub fn cmd_infer_similarity(ctx: &Context, a: &str, b: &str) -> Result<(), CogError> {
    let mut pipeline = load_or_create_pipeline(ctx)?;
    let space = pipeline.atomspace_mut();
    let (ia, ib) = (resolve_atom(space, a)?, resolve_atom(space, b)?);

    let link = space.infer_similarity(ia, ib)?;
    let truth = link.and_then(|id| space.truth_value(id));
    save_pipeline(&pipeline, &ctx.snapshot)?;

    report_inference(ctx, "similarity", &format!("{a} <-> {b}"), link, truth);
    Ok(())
}

fn report_inference(
    ctx: &Context,
    kind: &str,
    relation: &str,
    link: Option<AtomId>,
    truth: Option<TruthValue>,
) {
    if ctx.json_mode {
        print_json(&serde_json::json!({
            "kind": kind,
            "relation": relation,
            "link": link.map(|id| id.0),
            "truth": truth,
        }));
        return;
    }
    match (link, truth) {
        (Some(link), Some(truth)) => println!(
            "Inferred {} {} as atom {} (strength {:.3}, confidence {:.3})",
            kind,
            relation,
            link,
            truth.strength(),
            truth.confidence()
        ),
        _ => println!("No {} inferred for {}", kind, relation),
    }
}

// =============================================================================
// COHERENCE COMMAND
// =============================================================================

/// Compute and store the three-store coherence.
pub fn cmd_coherence(ctx: &Context) -> Result<(), CogError> {
    let mut pipeline = load_or_create_pipeline(ctx)?;
    let coherence = pipeline.coherence();
    save_pipeline(&pipeline, &ctx.snapshot)?;

    if ctx.json_mode {
        print_json(&serde_json::json!({ "coherence": coherence }));
    } else {
        println!("Coherence: {:.4}", coherence);
    }
    Ok(())
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// BLAKE3 hash of the snapshot file.
pub fn cmd_hash(ctx: &Context) -> Result<(), CogError> {
    let bytes = read_snapshot_bytes(&ctx.snapshot)?;
    let hash = snapshot_hash(&bytes);

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "hash": hash,
            "algorithm": "blake3",
            "bytes": bytes.len(),
        }));
    } else {
        println!("BLAKE3: {}", hash);
    }
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Load a TOML config, or the defaults when no path is given or the file
/// does not exist.
pub fn load_config(path: Option<&Path>) -> Result<CogweaveConfig, CogError> {
    let Some(path) = path else {
        return Ok(CogweaveConfig::default());
    };
    if !path.exists() {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
        return Ok(CogweaveConfig::default());
    }

    validate_file_size(path, MAX_CONFIG_FILE_SIZE)?;
    let text = std::fs::read_to_string(path)
        .map_err(|e| CogError::IoError(format!("Read config: {}", e)))?;
    let config: CogweaveConfig =
        toml::from_str(&text).map_err(|e| CogError::Config(e.to_string()))?;
    config.validate()?;
    tracing::info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Parse an atom type by its snake_case name.
pub fn parse_atom_type(name: &str) -> Result<AtomType, CogError> {
    AtomType::ALL
        .into_iter()
        .find(|t| t.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let known: Vec<_> = AtomType::ALL.iter().map(|t| t.name()).collect();
            CogError::Config(format!(
                "Unknown atom type: {}. Use: {}",
                name,
                known.join(", ")
            ))
        })
}

/// First live atom carrying `name`.
pub fn resolve_atom(space: &AtomSpace, name: &str) -> Result<AtomId, CogError> {
    space
        .query_by_name(name)
        .first()
        .copied()
        .ok_or_else(|| CogError::AtomNameNotFound(name.to_string()))
}

fn read_snapshot_bytes(path: &Path) -> Result<Vec<u8>, CogError> {
    validate_file_size(path, MAX_SNAPSHOT_SIZE as u64)?;
    std::fs::read(path).map_err(|e| CogError::IoError(format!("Read snapshot: {}", e)))
}

/// Load the snapshot at `ctx.snapshot`, or a fresh pipeline if there is none.
pub fn load_or_create_pipeline(ctx: &Context) -> Result<Pipeline, CogError> {
    if !ctx.snapshot.exists() {
        tracing::debug!(path = %ctx.snapshot.display(), "no snapshot, starting empty");
        return Ok(Pipeline::new(&ctx.config));
    }
    let bytes = read_snapshot_bytes(&ctx.snapshot)?;
    pipeline_from_bytes(&bytes, &ctx.config.kernel)
}

/// Write a pipeline snapshot to `path`.
pub fn save_pipeline(pipeline: &Pipeline, path: &Path) -> Result<(), CogError> {
    let bytes = pipeline_to_bytes(pipeline)?;
    std::fs::write(path, &bytes)
        .map_err(|e| CogError::IoError(format!("Write snapshot: {}", e)))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "snapshot saved");
    Ok(())
}
