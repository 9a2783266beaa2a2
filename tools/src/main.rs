use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use realmwire_tools::{
    bit_layout, inspect_capture, pack_guid, parse_guid, parse_hex, parse_limits,
    split_bit_fields, unpack_guid,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wire::{Direction, Limits};

#[derive(Parser)]
#[command(
    name = "realmwire-tools",
    version,
    about = "realmwire inspection and decoding tools"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pack or unpack 64-bit identifiers.
    Guid {
        #[command(subcommand)]
        action: GuidAction,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
        format: OutputFormat,
    },
    /// Split a capture of back-to-back frames.
    Frames {
        /// Path to a capture file, or a directory of captures.
        capture: PathBuf,
        /// Which side produced the capture.
        #[arg(long, value_enum)]
        direction: DirectionArg,
        /// Limits JSON; missing keys take their defaults.
        #[arg(long)]
        limits: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
    },
    /// Print the MSB-first bit layout of hex bytes.
    Bits {
        /// Hex bytes (whitespace allowed).
        #[arg(required = true, num_args = 1..)]
        bytes: Vec<String>,
        /// Split the leading bits into fields of these widths.
        #[arg(long, value_delimiter = ',')]
        widths: Vec<u8>,
    },
}

#[derive(Subcommand)]
enum GuidAction {
    /// Encode a hex identifier in packed form.
    Pack { value: String },
    /// Decode packed hex bytes.
    Unpack {
        #[arg(required = true, num_args = 1..)]
        bytes: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    /// Server to client.
    S2c,
    /// Client to server.
    C2s,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::S2c => Self::ServerToClient,
            DirectionArg::C2s => Self::ClientToServer,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Guid { action, format } => {
            let report = match action {
                GuidAction::Pack { value } => pack_guid(parse_guid(&value)?),
                GuidAction::Unpack { bytes } => unpack_guid(&parse_hex(&bytes.join(" "))?)?,
            };
            emit(&report, format)?;
        }
        Command::Frames {
            capture,
            direction,
            limits,
            format,
            glob,
        } => {
            let limits = limits
                .as_deref()
                .map(load_limits)
                .transpose()
                .context("load limits")?
                .unwrap_or_default();
            let direction = Direction::from(direction);
            if capture.is_dir() {
                for path in collect_capture_paths(&capture, glob.as_deref())? {
                    let bytes = fs::read(&path)
                        .with_context(|| format!("read capture {}", path.display()))?;
                    if matches!(format, OutputFormat::Pretty) {
                        println!("== {} ({} bytes) ==", path.display(), bytes.len());
                    }
                    emit(&inspect_capture(&bytes, direction, &limits), format)?;
                }
            } else {
                let bytes = fs::read(&capture)
                    .with_context(|| format!("read capture {}", capture.display()))?;
                emit(&inspect_capture(&bytes, direction, &limits), format)?;
            }
        }
        Command::Bits { bytes, widths } => {
            let bytes = parse_hex(&bytes.join(" "))?;
            println!("{}", bit_layout(&bytes));
            if !widths.is_empty() {
                println!("fields:");
                for field in split_bit_fields(&bytes, &widths)? {
                    println!(
                        "  bit {:>4} width {:>2}: {} (0x{:X})",
                        field.bit_offset, field.bits, field.value, field.value
                    );
                }
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn emit<T: Serialize + std::fmt::Display>(report: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => println!("{report}"),
    }
    Ok(())
}

fn load_limits(path: &Path) -> Result<Limits> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read limits {}", path.display()))?;
    let limits = parse_limits(&contents)?;
    info!(?limits, path = %path.display(), "loaded limits");
    Ok(limits)
}

fn collect_capture_paths(dir: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}
