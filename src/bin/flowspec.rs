use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flowspec::{
    journeys::build_journeys,
    json_output::doctor_to_json,
    lint::{Severity, diagnose_spec, diagnose_step_flows},
    loader::load_spec_from_path,
    registry::RouteIndex,
};
use std::{
    ffi::OsStr,
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process,
};

#[derive(Parser, Debug)]
#[command(name = "flowspec", about = "Flow spec validation helpers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate flow specs and report structural issues.
    Doctor(DoctorArgs),
    /// Export overlays as journey fixtures for end-to-end tooling.
    Journeys(JourneysArgs),
}

#[derive(Args, Debug)]
struct DoctorArgs {
    /// Optional route registry JSON used for route-sync checks.
    #[arg(long)]
    routes: Option<PathBuf>,
    /// Emit a machine-readable JSON payload for a single spec.
    #[arg(long)]
    json: bool,
    /// Read spec JSON from stdin (requires --json).
    #[arg(long)]
    stdin: bool,
    /// Spec files or directories to check.
    #[arg(required_unless_present = "stdin")]
    targets: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct JourneysArgs {
    /// Flow spec to export journeys from.
    #[arg(long = "spec")]
    spec_path: PathBuf,
    /// Where to write the journey fixtures; stdout when omitted.
    #[arg(long = "out")]
    out_path: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Doctor(args) => run_doctor(args),
        Commands::Journeys(args) => run_journeys(args),
    };
    if let Err(err) = result {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

fn run_doctor(args: DoctorArgs) -> Result<()> {
    let route_index = args
        .routes
        .as_deref()
        .map(RouteIndex::load_from_file)
        .transpose()?;

    if args.stdin {
        anyhow::ensure!(args.json, "--stdin requires --json");
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("reading spec from stdin")?;
        return emit_json(&text, route_index.as_ref());
    }

    if args.json {
        anyhow::ensure!(
            args.targets.len() == 1,
            "--json expects exactly one spec file"
        );
        let path = &args.targets[0];
        let text = fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        return emit_json(&text, route_index.as_ref());
    }

    let mut failures = 0usize;
    for target in &args.targets {
        doctor_path(target, route_index.as_ref(), &mut failures)?;
    }
    if failures == 0 {
        println!("All specs valid");
        Ok(())
    } else {
        anyhow::bail!("{failures} spec(s) failed validation")
    }
}

fn emit_json(text: &str, route_index: Option<&RouteIndex>) -> Result<()> {
    let output = doctor_to_json(text, route_index);
    let ok = output.ok;
    println!("{}", output.into_string());
    if !ok {
        process::exit(1);
    }
    Ok(())
}

fn doctor_path(path: &Path, route_index: Option<&RouteIndex>, failures: &mut usize) -> Result<()> {
    if path.is_dir() {
        let entries = fs::read_dir(path)
            .with_context(|| format!("failed to read directory {}", path.display()))?;
        for entry in entries {
            let entry = entry.context("failed to read directory entry")?;
            doctor_path(&entry.path(), route_index, failures)?;
        }
        return Ok(());
    }
    if path.extension() != Some(OsStr::new("json")) {
        return Ok(());
    }

    match load_spec_from_path(path) {
        Ok(normalized) => {
            let mut issues = diagnose_spec(&normalized.spec, route_index);
            issues.extend(diagnose_step_flows(
                &normalized.spec.nodes,
                &normalized.spec.edges,
            ));
            println!(
                "OK  {} ({} nodes, {} issues)",
                path.display(),
                normalized.spec.nodes.len(),
                issues.len()
            );
            for warning in &normalized.warnings {
                println!("    warn: {warning}");
            }
            for issue in &issues {
                let severity = match issue.severity {
                    Severity::Info => "info",
                    Severity::Warning => "warn",
                };
                println!("    {severity}: {}", issue.message);
            }
        }
        Err(err) => {
            *failures += 1;
            eprintln!("ERR {}: {err}", path.display());
        }
    }
    Ok(())
}

fn run_journeys(args: JourneysArgs) -> Result<()> {
    let normalized = load_spec_from_path(&args.spec_path)?;
    for warning in &normalized.warnings {
        eprintln!("warn: {warning}");
    }
    let (journeys, errors) = build_journeys(&normalized.spec.overlays);
    let json = serde_json::to_string_pretty(&journeys).context("journey serialization")?;
    match &args.out_path {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("unable to write {}", path.display()))?;
            println!("Wrote {} journey(s) to {}", journeys.len(), path.display());
        }
        None => println!("{json}"),
    }
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("ERR {error}");
        }
        anyhow::bail!("{} journey contract error(s)", errors.len());
    }
    Ok(())
}
