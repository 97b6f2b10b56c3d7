use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use cinema2tonic::{
    CinemaManifest, ConversionStatus, ConvertOptions, HandoffCommand, MergePolicy, RetryPolicy,
};

#[derive(Parser, Debug)]
#[command(name = "cinema2tonic", version, about = "Convert Cinema Spec-B stores to Tonic datasets")]
struct Cli {
    /// Log debug events (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a Cinema store into a Tonic dataset.
    Convert(ConvertArgs),
    /// Print the composite structure and directory mapping without touching the filesystem.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Cinema store directory (holding `info.json`).
    cinema_dir: PathBuf,

    /// Destination dataset directory.
    dest: PathBuf,

    /// Copy directories on a worker pool.
    #[arg(long)]
    parallel: bool,

    /// Worker threads (implies `--parallel`).
    #[arg(long)]
    threads: Option<usize>,

    /// Merge colorBy lists of repeated layer identities instead of keeping the first.
    #[arg(long)]
    merge_layers: bool,

    /// Render size recorded in the manifest.
    #[arg(long, num_args = 2, value_names = ["W", "H"])]
    dimensions: Option<Vec<u32>>,

    /// Attempts per filesystem call on transient errors.
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Program (and leading arguments) run on the finished dataset. Takes every following
    /// argument, so it goes last.
    #[arg(long, num_args = 1.., value_name = "PROGRAM", allow_hyphen_values = true)]
    handoff: Option<Vec<String>>,

    /// Wait for the handoff program to exit.
    #[arg(long, requires = "handoff")]
    wait: bool,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Cinema store directory (holding `info.json`).
    cinema_dir: PathBuf,

    /// Merge colorBy lists of repeated layer identities instead of keeping the first.
    #[arg(long)]
    merge_layers: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Plan(args) => {
            return match cmd_plan(args) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {e:#}");
                    ExitCode::from(2)
                }
            };
        }
    };
    match result {
        Ok(status) => {
            println!("{status}");
            match status {
                ConversionStatus::Converted => ExitCode::SUCCESS,
                ConversionStatus::ConvertedWithFailures { .. } => ExitCode::from(1),
                ConversionStatus::Aborted { .. } => ExitCode::from(2),
            }
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "cinema2tonic=debug" } else { "cinema2tonic=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn merge_policy(merge: bool) -> MergePolicy {
    if merge {
        MergePolicy::Merge
    } else {
        MergePolicy::FirstWins
    }
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<ConversionStatus> {
    let mut opts = ConvertOptions {
        merge_policy: merge_policy(args.merge_layers),
        parallel: args.parallel || args.threads.is_some(),
        threads: args.threads,
        retry: RetryPolicy {
            attempts: args.retries,
            backoff: Duration::from_millis(10),
        },
        ..ConvertOptions::default()
    };
    if let Some(dims) = &args.dimensions {
        opts.dimensions = [dims[0], dims[1]];
    }
    if let Some(parts) = &args.handoff
        && let Some((program, rest)) = parts.split_first()
    {
        opts.handoff = Some(
            rest.iter()
                .fold(HandoffCommand::new(program), |cmd, a| cmd.arg(a)),
        );
    }

    let result = cinema2tonic::convert_store(&args.cinema_dir, &args.dest, &opts);
    let status = ConversionStatus::from_result(&result);
    let Ok(mut report) = result else {
        return Ok(status);
    };

    for failure in &report.failures {
        eprintln!("{failure}");
    }
    println!(
        "{} directories, {} files copied, {} skipped -> {}",
        report.directories,
        report.copied,
        report.skipped,
        report.dest.display()
    );
    if args.wait
        && let Some(child) = report.handoff.as_mut()
    {
        let exit = child.wait().context("wait for handoff program")?;
        if !exit.success() {
            eprintln!("handoff exited with {exit}");
        }
    }
    Ok(status)
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let cinema = CinemaManifest::from_store(&args.cinema_dir)
        .with_context(|| format!("load Cinema store '{}'", args.cinema_dir.display()))?;
    let opts = ConvertOptions {
        merge_policy: merge_policy(args.merge_layers),
        ..ConvertOptions::default()
    };
    let plan =
        cinema2tonic::plan_conversion(&cinema, &args.cinema_dir, Path::new("<dest>"), &opts)?;

    println!("arguments_order: {:?}", plan.manifest.arguments_order);
    for (code, name) in plan.composite.fields().codes() {
        println!("field {code}: {name}");
    }
    for layer in plan.composite.layers() {
        let fields: Vec<&str> = plan.composite.color_fields(layer).collect();
        println!(
            "layer {} ({}): {} colorBy {:?}",
            layer.index, layer.code, layer.name, fields
        );
    }
    for mapping in &plan.mappings {
        println!("{} -> {}", mapping.src.display(), mapping.dest.display());
    }
    Ok(())
}
