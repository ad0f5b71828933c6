use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "placereplay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize raw source files into users, placements and mods artifacts.
    Ingest(IngestArgs),
    /// Replay a canonical placements file into PNG frames.
    Render(RenderArgs),
    /// Ingest, then render the resulting placements.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct IngestArgs {
    /// Dataset epoch (2017, 2022 or 2023).
    #[arg(long)]
    epoch: placereplay::Epoch,

    /// Output directory for the canonical artifacts.
    #[arg(long)]
    out: PathBuf,

    /// Reader threads (overrides the config file).
    #[arg(long)]
    threads: Option<usize>,

    /// Optional JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source files, read in the given order. `.gz` files are decompressed.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Dataset epoch (2017, 2022 or 2023); selects canvas ladder and palette.
    #[arg(long)]
    epoch: placereplay::Epoch,

    /// Canonical placements file.
    #[arg(long)]
    placements: PathBuf,

    /// Output directory for frames.
    #[arg(long)]
    out: PathBuf,

    /// Frame interval in milliseconds (overrides the config file).
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Optional JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Dataset epoch (2017, 2022 or 2023).
    #[arg(long)]
    epoch: placereplay::Epoch,

    /// Directory for the canonical artifacts.
    #[arg(long)]
    work: PathBuf,

    /// Output directory for frames.
    #[arg(long)]
    frames: PathBuf,

    /// Reader threads (overrides the config file).
    #[arg(long)]
    threads: Option<usize>,

    /// Frame interval in milliseconds (overrides the config file).
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Optional JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source files, read in the given order.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Ingest(args) => cmd_ingest(args),
        Command::Render(args) => cmd_render(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<placereplay::Config> {
    match path {
        Some(path) => placereplay::Config::from_path(path)
            .with_context(|| format!("load config '{}'", path.display())),
        None => Ok(placereplay::Config::default()),
    }
}

fn ingest(
    epoch: placereplay::Epoch,
    files: Vec<PathBuf>,
    out: &Path,
    opts: &placereplay::IngestOpts,
) -> anyhow::Result<placereplay::IngestStats> {
    let ingest = placereplay::Ingest::new(epoch, files, out, opts)
        .with_context(|| format!("prepare ingestion into '{}'", out.display()))?;
    let stats = ingest
        .run()
        .with_context(|| format!("ingest {epoch} sources into '{}'", out.display()))?;
    tracing::info!(
        users = stats.users,
        placements = stats.placements,
        anomalies = stats.anomalies,
        dropped = stats.dropped,
        resumed = stats.placements_resumed,
        "ingest done"
    );
    Ok(stats)
}

fn render(
    epoch: placereplay::Epoch,
    placements: &Path,
    out: &Path,
    opts: &placereplay::RenderOpts,
) -> anyhow::Result<()> {
    let stats = placereplay::render_canonical_log(epoch, placements, out, opts)
        .with_context(|| format!("render '{}'", placements.display()))?;
    tracing::info!(
        placements = stats.placements,
        snapshots = stats.snapshots,
        written = stats.encode.written,
        failed = stats.encode.failed,
        pending = stats.encode.pending,
        epoch = stats.final_epoch,
        "render done"
    );
    if stats.encode.failed > 0 || stats.encode.pending > 0 {
        anyhow::bail!(
            "{} frame(s) failed and {} still pending",
            stats.encode.failed,
            stats.encode.pending
        );
    }
    Ok(())
}

fn cmd_ingest(args: IngestArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(threads) = args.threads {
        cfg.ingest.threads = threads;
    }
    ingest(args.epoch, args.files, &args.out, &cfg.ingest)?;
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(ms) = args.interval_ms {
        cfg.render.frame_interval_ms = ms;
    }
    render(args.epoch, &args.placements, &args.out, &cfg.render)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(threads) = args.threads {
        cfg.ingest.threads = threads;
    }
    if let Some(ms) = args.interval_ms {
        cfg.render.frame_interval_ms = ms;
    }
    ingest(args.epoch, args.files, &args.work, &cfg.ingest)?;
    let placements = placereplay::CanonicalPaths::in_dir(&args.work).placements;
    render(args.epoch, &placements, &args.frames, &cfg.render)
}
