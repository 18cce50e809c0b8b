//! RareCrowds Core - synthetic rare-disease cohort generator
//!
//! The main entry point for rc-core, handling:
//! - Cohort simulation from an ontology and disease annotations
//! - Sampling preset listing
//! - Input and configuration checks
//! - Ontology closure queries

use clap::{Args, Parser, Subcommand};
use rc_common::error::format_error_human;
use rc_common::{DiseaseId, Error, OutputFormat, StructuredError, TermId, SCHEMA_VERSION};
use rc_config::{list_presets, PresetName};
use rc_core::annotation::{AnnotationSet, DiseaseAnnotations};
use rc_core::cohort::{CohortAssembler, CohortRequest, Patient, SimulationRun};
use rc_core::config::{load_sampling, ConfigOptions};
use rc_core::exit_codes::ExitCode;
use rc_core::logging::{
    emit, event_names, generate_run_id, init_logging, Level, LogConfig, LogContext, LogFormat,
    LogLevel, Stage,
};
use rc_core::ontology::{Ontology, OntologyQuery, FULL_DEPTH};
use rc_core::phenopacket::to_phenopackets;
use serde::Serialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::info;

/// RareCrowds Core - synthetic patient cohorts for rare-disease research
#[derive(Parser)]
#[command(name = "rc-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log level (overrides -v/-q and RC_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr: human or jsonl (overrides RC_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample synthetic patients for one or more diseases
    Simulate(SimulateArgs),

    /// List the built-in sampling presets
    Presets,

    /// Validate ontology, annotation and sampling config files
    Check(CheckArgs),

    /// Closure queries over the ontology
    Ontology(OntologyArgs),

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Ontology graph JSON (node-link)
    #[arg(long)]
    ontology: PathBuf,

    /// Disease annotation JSON
    #[arg(long)]
    annotations: PathBuf,

    /// Sampling config file (sampling.json)
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Sampling preset (default, ideal, freqs, impre, impre2)
    #[arg(long)]
    preset: Option<PresetName>,

    /// Patients per disease
    #[arg(short = 'n', long = "patients", default_value = "20")]
    patients: usize,

    /// Diseases to simulate (default: every annotated disease)
    #[arg(long = "disease", value_delimiter = ',')]
    diseases: Vec<String>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Sample diseases in parallel
    #[arg(long)]
    parallel: bool,

    /// Write the payload to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Ontology graph JSON to validate
    #[arg(long)]
    ontology: Option<PathBuf>,

    /// Disease annotation JSON to validate
    #[arg(long)]
    annotations: Option<PathBuf>,

    /// Sampling config file to validate (default: resolved sampling.json)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct OntologyArgs {
    #[command(subcommand)]
    command: OntologyCommands,
}

#[derive(Subcommand, Debug)]
enum OntologyCommands {
    /// Terms reachable via parent edges
    Ancestors(TermQueryArgs),

    /// Terms reachable via child edges
    Descendants(TermQueryArgs),

    /// Drop terms that are ancestors of other given terms
    Simplify(TermQueryArgs),
}

#[derive(Args, Debug)]
struct TermQueryArgs {
    /// Ontology graph JSON (node-link)
    #[arg(long)]
    ontology: PathBuf,

    /// Maximum number of hops (default: full closure)
    #[arg(long)]
    depth: Option<usize>,

    /// Term ids
    #[arg(required = true)]
    terms: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let cli_level = cli.global.log_level.or(if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    });
    let log_config = LogConfig::from_env(cli_level, cli.global.log_format);
    init_logging(&log_config);

    let exit_code = match cli.command {
        Commands::Simulate(args) => run_simulate(&cli.global, &args),
        Commands::Presets => run_presets(&cli.global),
        Commands::Check(args) => run_check(&cli.global, &args),
        Commands::Ontology(args) => run_ontology(&cli.global, &args),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_simulate(global: &GlobalOpts, args: &SimulateArgs) -> ExitCode {
    match simulate(global, args) {
        Ok(code) => code,
        Err(e) => report_error(global, &e),
    }
}

fn simulate(global: &GlobalOpts, args: &SimulateArgs) -> rc_common::Result<ExitCode> {
    let run_id = generate_run_id();
    let ctx = LogContext::new(&run_id);
    emit(
        &ctx.info(event_names::RUN_STARTED, Stage::Init, "starting simulation run")
            .with_field("patients_per_disease", args.patients)
            .with_field("seed", args.seed)
            .with_field("parallel", args.parallel),
    );

    let sampling = load_sampling(&ConfigOptions {
        sampling_path: args.config.clone(),
        preset: args.preset,
    })
    .inspect_err(|e| {
        emit(
            &ctx.event(
                Level::Error,
                event_names::CONFIG_ERROR,
                Stage::Load,
                "sampling config rejected",
            )
            .with_field("code", e.code())
            .with_field("error", e.to_string()),
        )
    })?;

    let ontology = Ontology::from_file(&args.ontology)?;
    info!(
        event = event_names::ONTOLOGY_LOADED,
        terms = ontology.len(),
        root = %ontology.root(),
        "ontology loaded"
    );
    let annotations = AnnotationSet::from_file(&args.annotations)?;
    info!(
        event = event_names::ANNOTATIONS_LOADED,
        diseases = annotations.len(),
        "annotations loaded"
    );

    let mut request = CohortRequest::new(args.patients)
        .with_diseases(args.diseases.iter().map(DiseaseId::new))
        .with_parallel(args.parallel);
    if let Some(seed) = args.seed {
        request = request.with_seed(seed);
    }

    let assembled = CohortAssembler::new(&ontology, &annotations, &sampling.config)
        .assemble(&request)?;
    let run = SimulationRun::new(&run_id, args.seed, sampling.snapshot, assembled);

    let payload = render_run(global.format, &run, &ontology)?;
    write_payload(args.output.as_deref(), &payload)?;
    if let Some(path) = &args.output {
        info!(
            event = event_names::EXPORT_WRITTEN,
            path = %path.display(),
            format = %global.format,
            "payload written"
        );
    }

    let summary = &run.summary;
    let finished = if summary.is_partial() {
        ctx.warn(event_names::RUN_FINISHED, Stage::Assemble, "simulation run finished with skips")
    } else {
        ctx.info(event_names::RUN_FINISHED, Stage::Assemble, "simulation run finished")
    };
    emit(
        &finished
            .with_field("diseases_sampled", summary.diseases_sampled)
            .with_field("diseases_skipped", summary.diseases_skipped)
            .with_field("patients_generated", summary.patients_generated)
            .with_field("patients_skipped", summary.patients_skipped),
    );

    Ok(if summary.is_partial() {
        ExitCode::PartialRun
    } else {
        ExitCode::Clean
    })
}

/// One line of JSONL output.
#[derive(Serialize)]
struct PatientLine<'a> {
    disease_id: &'a DiseaseId,
    #[serde(flatten)]
    patient: &'a Patient,
}

fn render_run(
    format: OutputFormat,
    run: &SimulationRun,
    ontology: &Ontology,
) -> rc_common::Result<String> {
    let payload = match format {
        OutputFormat::Json => run.to_json()?,
        OutputFormat::Jsonl => {
            let mut out = String::new();
            for (cohort, patient) in run.patients() {
                let line = PatientLine {
                    disease_id: &cohort.disease_id,
                    patient,
                };
                out.push_str(&serde_json::to_string(&line)?);
                out.push('\n');
            }
            out
        }
        OutputFormat::Phenopacket => serde_json::to_string_pretty(&to_phenopackets(run, ontology))?,
        OutputFormat::Summary => {
            let summary = &run.summary;
            let mut out = format!(
                "run {}: {} diseases ({} skipped), {} patients generated, {} skipped\n",
                run.run_id,
                summary.diseases_requested,
                summary.diseases_skipped,
                summary.patients_generated,
                summary.patients_skipped
            );
            for outcome in &summary.outcomes {
                let status = match &outcome.error {
                    Some(e) => format!("skipped: {}", e.message),
                    None => "ok".to_string(),
                };
                out.push_str(&format!(
                    "  {:<16} {:>5} generated {:>5} skipped  {}\n",
                    outcome.disease_id.as_str(), outcome.generated, outcome.skipped, status
                ));
            }
            out
        }
    };
    Ok(payload)
}

fn write_payload(path: Option<&Path>, payload: &str) -> rc_common::Result<()> {
    match path {
        Some(path) => std::fs::write(path, payload)?,
        None if payload.ends_with('\n') => print!("{}", payload),
        None => println!("{}", payload),
    }
    Ok(())
}

fn run_presets(global: &GlobalOpts) -> ExitCode {
    let presets = list_presets();
    match global.format {
        OutputFormat::Json | OutputFormat::Phenopacket => {
            let output = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "presets": presets,
            });
            print_json(&output);
        }
        OutputFormat::Jsonl => {
            for preset in &presets {
                if let Ok(line) = serde_json::to_string(preset) {
                    println!("{}", line);
                }
            }
        }
        OutputFormat::Summary => {
            for preset in &presets {
                println!(
                    "{:<8} imprecision={} noise={:.2} omit_frequency={}  {}",
                    preset.name,
                    preset.imprecision,
                    preset.noise_ratio,
                    preset.omit_frequency,
                    preset.description
                );
            }
        }
    }
    ExitCode::Clean
}

fn run_check(global: &GlobalOpts, args: &CheckArgs) -> ExitCode {
    let mut results: Vec<serde_json::Value> = Vec::new();
    let mut worst = ExitCode::Clean;
    let mut fail = |results: &mut Vec<serde_json::Value>, check: &str, err: &Error| {
        let code = ExitCode::from_error(err);
        if worst == ExitCode::Clean {
            worst = code;
        }
        results.push(serde_json::json!({
            "check": check,
            "status": "error",
            "error": StructuredError::from(err),
        }));
    };

    match load_sampling(&ConfigOptions {
        sampling_path: args.config.clone(),
        preset: None,
    }) {
        Ok(sampling) => results.push(serde_json::json!({
            "check": "config",
            "status": "ok",
            "source": sampling.snapshot.source,
            "path": sampling.snapshot.path,
            "preset": sampling.snapshot.preset,
            "config_hash": sampling.snapshot.config_hash,
        })),
        Err(e) => fail(&mut results, "config", &e),
    }

    let ontology = match &args.ontology {
        Some(path) => match Ontology::from_file(path) {
            Ok(ontology) => {
                results.push(serde_json::json!({
                    "check": "ontology",
                    "status": "ok",
                    "terms": ontology.len(),
                    "root": ontology.root(),
                }));
                Some(ontology)
            }
            Err(e) => {
                fail(&mut results, "ontology", &e);
                None
            }
        },
        None => None,
    };

    if let Some(path) = &args.annotations {
        match AnnotationSet::from_file(path) {
            Ok(annotations) => {
                let invalid: Vec<serde_json::Value> = annotations
                    .iter()
                    .filter_map(|(id, record)| {
                        record.validate(id).err().map(|e| {
                            serde_json::json!({
                                "disease_id": id,
                                "error": StructuredError::from(&e),
                            })
                        })
                    })
                    .collect();
                let unknown_terms: Vec<TermId> = match &ontology {
                    Some(ontology) => annotations
                        .annotated_terms()
                        .into_iter()
                        .filter(|t| !ontology.contains(t.as_str()))
                        .collect(),
                    None => Vec::new(),
                };
                let status = if invalid.is_empty() && unknown_terms.is_empty() {
                    "ok"
                } else {
                    "warn"
                };
                results.push(serde_json::json!({
                    "check": "annotations",
                    "status": status,
                    "diseases": annotations.len(),
                    "invalid": invalid,
                    "unknown_terms": unknown_terms,
                }));
            }
            Err(e) => fail(&mut results, "annotations", &e),
        }
    }

    match global.format {
        OutputFormat::Json | OutputFormat::Phenopacket => {
            print_json(&serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "ok": worst == ExitCode::Clean,
                "checks": results,
            }));
        }
        OutputFormat::Jsonl => {
            for result in &results {
                println!("{}", result);
            }
        }
        OutputFormat::Summary => {
            for result in &results {
                println!(
                    "{:<12} {}",
                    result["check"].as_str().unwrap_or("?"),
                    result["status"].as_str().unwrap_or("?")
                );
            }
        }
    }
    worst
}

fn run_ontology(global: &GlobalOpts, args: &OntologyArgs) -> ExitCode {
    let (query, name) = match &args.command {
        OntologyCommands::Ancestors(q) => (q, "ancestors"),
        OntologyCommands::Descendants(q) => (q, "descendants"),
        OntologyCommands::Simplify(q) => (q, "simplify"),
    };
    let ontology = match Ontology::from_file(&query.ontology) {
        Ok(ontology) => ontology,
        Err(e) => return report_error(global, &e),
    };

    let ids: Vec<TermId> = query.terms.iter().map(|t| TermId::new(t.as_str())).collect();
    let depth = query.depth.unwrap_or(FULL_DEPTH);
    let terms = match &args.command {
        OntologyCommands::Ancestors(_) => ontology.ancestors(&ids, depth),
        OntologyCommands::Descendants(_) => ontology.descendants(&ids, depth),
        OntologyCommands::Simplify(_) => ontology.simplify(&ids),
    };

    let rows: Vec<serde_json::Value> = terms
        .iter()
        .map(|id| {
            serde_json::json!({
                "id": id,
                "label": ontology.label(id.as_str()),
            })
        })
        .collect();

    match global.format {
        OutputFormat::Json | OutputFormat::Phenopacket => print_json(&serde_json::json!({
            "query": name,
            "input": ids,
            "depth": query.depth,
            "terms": rows,
        })),
        OutputFormat::Jsonl => {
            for row in &rows {
                println!("{}", row);
            }
        }
        OutputFormat::Summary => {
            for id in &terms {
                println!("{}\t{}", id, ontology.label(id.as_str()).unwrap_or(""));
            }
        }
    }
    ExitCode::Clean
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "rc_core_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json => print_json(&version_info),
        _ => {
            println!("rc-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("failed to serialize output: {}", e),
    }
}

/// Print a fatal error and map it to an exit code.
fn report_error(global: &GlobalOpts, err: &Error) -> ExitCode {
    let code = ExitCode::from_error(err);
    tracing::error!(code = err.code(), exit = %code, error = %err, "command failed");
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            println!("{}", StructuredError::from(err).to_json());
        }
        _ => {}
    }
    eprintln!("{}", format_error_human(err, std::io::stderr().is_terminal()));
    code
}
