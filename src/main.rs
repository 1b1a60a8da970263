//! rwdump - Command-line inspector for RW binary stream files.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rwbs::prelude::*;

/// rwdump - RW binary stream inspection tool
#[derive(Parser)]
#[command(name = "rwdump")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the chunk tree outline
    Tree {
        #[command(flatten)]
        decode: DecodeArgs,

        /// Only print chunks up to this depth
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Decode a file and list every diagnostic
    Check {
        #[command(flatten)]
        decode: DecodeArgs,
    },
}

#[derive(Args)]
struct DecodeArgs {
    /// Input file (.dff, .bsp, .txd, .anm)
    #[arg(short, long, env = "RWBS_INPUT")]
    input: PathBuf,

    /// Keep decoding past sections that overrun their payload
    #[arg(long)]
    isolate: bool,

    /// Maximum list nesting before chunks are kept as raw data
    #[arg(long, default_value_t = DecodeOptions::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl DecodeArgs {
    fn decoder(&self) -> Decoder {
        let policy = if self.isolate {
            OverrunPolicy::Isolate
        } else {
            OverrunPolicy::Abort
        };
        Decoder::new().with_options(DecodeOptions::default().overrun(policy).max_depth(self.max_depth))
    }
}

/// Forwards to `tracing` and keeps a copy of every diagnostic.
#[derive(Default)]
struct Recorder {
    collected: CollectingSink,
}

impl DiagnosticSink for Recorder {
    fn log(&self, level: Level, message: fmt::Arguments<'_>) {
        TracingSink.log(level, message);
        self.collected.log(level, message);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Tree { decode, depth } => {
            cmd_tree(&decode, depth)?;
        }
        Commands::Check { decode } => {
            cmd_check(&decode)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

fn decode(args: &DecodeArgs, sink: &dyn DiagnosticSink) -> Result<Chunk> {
    let data = read_input(&args.input)?;
    let start = Instant::now();
    let root = args
        .decoder()
        .decode_with_sink(&data, sink)
        .with_context(|| format!("Failed to decode {}", args.input.display()))?;
    tracing::info!(elapsed = ?start.elapsed(), size = data.len(), "decoded");
    Ok(root)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn cmd_tree(args: &DecodeArgs, max_depth: Option<usize>) -> Result<()> {
    let recorder = Recorder::default();
    let root = decode(args, &recorder)?;

    for (depth, chunk) in root.walk() {
        if max_depth.is_some_and(|max| depth > max) {
            continue;
        }
        println!("{:indent$}{}", "", outline(chunk), indent = depth * 2);
    }

    println!("\n{} warnings", recorder.collected.count(Level::Warn));
    Ok(())
}

fn cmd_check(args: &DecodeArgs) -> Result<()> {
    let recorder = Recorder::default();
    let root = decode(args, &recorder)?;

    let diagnostics = recorder.collected.take();
    for diagnostic in &diagnostics {
        println!("{diagnostic}");
    }

    println!(
        "\n{}: {} chunks, {} warnings, {} errors",
        args.input.display(),
        root.walk().count(),
        diagnostics.iter().filter(|d| d.level == Level::Warn).count(),
        diagnostics.iter().filter(|d| d.level == Level::Error).count()
    );
    Ok(())
}

fn outline(chunk: &Chunk) -> String {
    let shape = if chunk.is_list() {
        format!("{} children", chunk.child_count())
    } else {
        format!("{} bytes", chunk.payload().map_or(0, <[u8]>::len))
    };
    format!(
        "{} (0x{:x}) v{}: {}",
        chunk.name(),
        chunk.kind().raw(),
        chunk.version(),
        shape
    )
}
