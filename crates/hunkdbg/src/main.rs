use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use hunkdbg_core::source::{PathConfig, PathReplacement};
use hunkdbg_core::DebugInfo;
use hunkdbg_utils::{debug, init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingGuard};

/// Source-level debug information for Amiga hunk executables.
#[derive(Parser, Debug)]
#[command(name = "hunkdbg")]
#[command(version)]
#[command(about = "Source-level debug information for Amiga hunk executables", long_about = None)]
struct Cli
{
    /// Rewrite recorded source paths (FROM=TO, first match wins)
    #[arg(long = "replace", value_name = "FROM=TO", global = true)]
    replacements: Vec<PathReplacement>,

    /// Project root used to find sources (default: current directory)
    #[arg(long = "workspace-root", value_name = "DIR", global = true)]
    workspace_roots: Vec<PathBuf>,

    /// Extra directory probed for sources not found otherwise
    #[arg(long = "source-root", value_name = "DIR", global = true)]
    source_roots: Vec<PathBuf>,

    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// List hunks with their symbols and source files
    Dump
    {
        /// Hunk executable to inspect
        program: PathBuf,
    },
    /// List symbols, optionally only those of hunks built from a file
    Symbols
    {
        /// Hunk executable to inspect
        program: PathBuf,
        /// Only hunks whose line tables reference this source file
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Source line for an address
    Lookup
    {
        /// Hunk executable to inspect
        program: PathBuf,
        /// Segment (hunk index)
        segment: usize,
        /// Offset within the segment (hex format: 0x24 or decimal)
        #[arg(value_parser = parse_offset)]
        offset: u32,
    },
    /// First address generated for a source line
    Address
    {
        /// Hunk executable to inspect
        program: PathBuf,
        /// Source file as recorded or as found in the workspace
        file: String,
        /// 1-based line number
        line: u32,
    },
    /// Segments containing code from a source file
    Segments
    {
        /// Hunk executable to inspect
        program: PathBuf,
        /// Source file as recorded or as found in the workspace
        file: String,
    },
}

impl Commands
{
    fn program(&self) -> &Path
    {
        match self {
            Commands::Dump { program }
            | Commands::Symbols { program, .. }
            | Commands::Lookup { program, .. }
            | Commands::Address { program, .. }
            | Commands::Segments { program, .. } => program,
        }
    }
}

fn main()
{
    let cli = Cli::parse();

    let _guard = match setup_logging(cli.log_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn setup_logging(level: Option<LogLevel>) -> Result<LoggingGuard, hunkdbg_utils::LoggingError>
{
    match level {
        Some(level) => init_logging_with_level(level, LogFormat::Pretty),
        None => init_logging(),
    }
}

fn path_config(cli: &Cli) -> Result<PathConfig, Box<dyn std::error::Error>>
{
    let workspace_roots = if cli.workspace_roots.is_empty() {
        vec![std::env::current_dir()?]
    } else {
        cli.workspace_roots.clone()
    };

    Ok(PathConfig {
        replacements: cli.replacements.clone(),
        workspace_roots,
        source_roots: cli.source_roots.clone(),
    })
}

fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>>
{
    let config = path_config(&cli)?;
    debug!(?config, "path configuration");

    let program = cli.command.program();
    let mut info = DebugInfo::new(config);
    if !info.load_info(program)? {
        return Err(format!("Program not found: {}", program.display()).into());
    }

    match &cli.command {
        Commands::Dump { .. } => print_dump(&info),
        Commands::Symbols { file, .. } => {
            for entry in info.symbols(file.as_deref()) {
                println!("{:>3}  0x{:08x}  {}", entry.segment_id, entry.symbol.offset, entry.symbol.name);
            }
        }
        Commands::Lookup { segment, offset, .. } => match info.resolve_file_line(*segment, *offset) {
            Some(location) => println!("{location}"),
            None => return Err(format!("No line information for {segment}:0x{offset:08x}").into()),
        },
        Commands::Address { file, line, .. } => match info.address_seg(file, *line) {
            Some(address) => println!("{address}"),
            None => return Err(format!("No code generated for {file}:{line}").into()),
        },
        Commands::Segments { file, .. } => {
            for segment in info.all_segment_ids(file) {
                println!("{segment}");
            }
        }
    }

    Ok(())
}

fn print_dump(info: &DebugInfo)
{
    println!("Hunks: {}", info.hunks().len());
    for hunk in info.hunks() {
        println!("\n{hunk}");
        if let Some(code) = &hunk.code_data {
            println!("  Code: {} bytes", code.len());
        }
        for symbol in hunk.symbols() {
            println!("  {symbol}");
        }
        for file in hunk.source_files() {
            println!(
                "  Source: {} -> {} ({} lines)",
                file.name,
                info.resolve_file_name(&file.name),
                file.lines.len()
            );
        }
    }
}

/// Parse `0x`-prefixed hex or decimal.
fn parse_offset(value: &str) -> Result<u32, String>
{
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("Invalid offset {value}: {e}"))
}
