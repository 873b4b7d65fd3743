use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use oxibarrel_sync::{Config, Lifecycle, SyncResult};
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oxibarrel")]
#[command(about = "Keeps a generated barrel module and its consumers' imports in sync", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Regenerate the aggregator module and rewrite consumer imports
    Sync(Config),
    /// Run as a build lifecycle hook
    Hook(HookArgs),
}

#[derive(Debug, Args)]
struct HookArgs {
    /// Lifecycle stage that triggered the run
    #[arg(value_enum)]
    stage: Lifecycle,

    #[command(flatten)]
    config: Config,
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();
    let num_threads = rayon::current_num_threads();

    let result = match cli.command {
        Commands::Sync(cfg) => {
            info!("Running sync (using {} threads)", num_threads);
            let settings = cfg.load()?;
            oxibarrel_sync::run_sync(&settings)?
        }
        Commands::Hook(HookArgs { stage, config }) => {
            info!("Running {:?} hook (using {} threads)", stage, num_threads);
            let settings = config.load()?;
            oxibarrel_sync::run_lifecycle(stage, &settings)?
        }
    };
    debug!("Wrote {} files", result.written().count());

    let elapsed_ms = start.elapsed().as_millis();
    oxibarrel_sync::print_summary(&mut stdout, &result)?;
    print_finished(&mut stdout, &result, elapsed_ms, num_threads)?;
    stdout.flush()?;

    if result.has_stale() {
        // Non-zero exit to fail CI
        std::process::exit(1);
    }
    Ok(())
}

fn print_finished<W: Write>(
    writer: &mut W,
    result: &SyncResult,
    elapsed_ms: u128,
    num_threads: usize,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "\n{} Finished in {}ms on {} files (using {} threads).",
        "●".bright_blue(),
        elapsed_ms.to_string().cyan(),
        (result.files_scanned + result.consumers.len()).to_string().cyan(),
        num_threads.to_string().cyan()
    )
}
