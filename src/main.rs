//! Sheet Layout CLI
//!
//! Usage:
//!   sheet-layout [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>    Stack configuration (TOML format)
//!   -s, --sizes <FILE>     Measured widget sizes (JSON object of id -> {width, height})
//!   --attach <A> <B>       Attach two widgets (repeatable)
//!   --detach <ID>          Detach a widget from its group (repeatable)
//!   --stack                Run auto-stack after attaching and detaching
//!   --lint                 Report invariant violations and overlaps on stderr
//!   -h, --help             Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use indexmap::IndexMap;
use tracing_subscriber::EnvFilter;

use sheet_layout::layout::Size;
use sheet_layout::{Sheet, StackConfig, WidgetId};

#[derive(Parser)]
#[command(name = "sheet-layout")]
#[command(about = "Attach and auto-stack widgets on a sheet")]
struct Cli {
    /// Sheet JSON file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Stack configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Measured widget sizes (JSON object keyed by widget id)
    #[arg(short, long)]
    sizes: Option<PathBuf>,

    /// Attach two widgets; may be repeated
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    attach: Vec<String>,

    /// Detach a widget from its group; may be repeated
    #[arg(long, value_name = "ID")]
    detach: Vec<String>,

    /// Run auto-stack after attaching and detaching
    #[arg(long)]
    stack: bool,

    /// Report invariant violations and overlaps on stderr
    #[arg(long)]
    lint: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => match StackConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => exit_with(&format!("Error loading config '{}'", path.display()), e),
        },
        None => StackConfig::default(),
    };

    // Load measured sizes
    let sizes: IndexMap<WidgetId, Size> = match &cli.sizes {
        Some(path) => match load_sizes(path) {
            Ok(s) => s,
            Err(e) => exit_with(&format!("Error loading sizes '{}'", path.display()), e),
        },
        None => IndexMap::new(),
    };

    // Read input
    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => exit_with(&format!("Error reading file '{}'", path.display()), e),
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => exit_with("Error reading from stdin", e),
            }
        }
    };

    let mut sheet = match Sheet::from_json(&source, config) {
        Ok(sheet) => sheet,
        Err(e) => exit_with("Error loading sheet", e),
    };

    for pair in cli.attach.chunks(2) {
        if let [a, b] = pair {
            if let Err(e) = sheet.attach(&WidgetId::new(a.as_str()), &WidgetId::new(b.as_str())) {
                eprintln!("Warning: attach {} {} ignored: {}", a, b, e);
            }
        }
    }

    for id in &cli.detach {
        if let Err(e) = sheet.detach(&WidgetId::new(id.as_str())) {
            eprintln!("Warning: detach {} ignored: {}", id, e);
        }
    }

    if cli.stack {
        sheet.auto_stack(&sizes);
    }

    if cli.lint {
        for warning in sheet.lint(&sizes) {
            eprintln!("{}", warning);
        }
    }

    match sheet.to_json() {
        Ok(json) => {
            println!("{}", json);
        }
        Err(e) => exit_with("Error", e),
    }
}

fn load_sizes(path: &Path) -> Result<IndexMap<WidgetId, Size>, sheet_layout::SheetError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn exit_with(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, error);
    std::process::exit(1);
}
