//! weft CLI
//!
//! Usage:
//!   weft [OPTIONS] [FILE]
//!
//! Composes component invocations in a markup document against fragment
//! templates on disk and prints the merged markup to stdout.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use weft::{compose, ComponentRegistry, Composer, EvaluationContext, FileFragmentLoader};

#[derive(Parser)]
#[command(name = "weft")]
#[command(about = "Slot-based component composition for markup templates")]
struct Cli {
    /// Input document (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Component manifest (TOML, default: weft.toml when present)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Root directory for fragment templates
    #[arg(short, long, default_value = "templates")]
    templates: PathBuf,

    /// Context binding, repeatable
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,

    /// Bound on nested component expansion depth
    #[arg(long, default_value_t = weft::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log composition steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("weft=debug")),
            )
            .with_writer(io::stderr)
            .init();
    }

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let manifest = match &cli.manifest {
        Some(path) => Some(path.clone()),
        None => {
            let default = PathBuf::from("weft.toml");
            default.exists().then_some(default)
        }
    };
    let registry = match manifest {
        Some(path) => match ComponentRegistry::from_manifest_file(&path) {
            Ok(registry) => registry,
            Err(e) => {
                eprintln!("Error loading manifest '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        // No manifest: nothing to expand, but directives still apply.
        None => ComponentRegistry::builder()
            .build()
            .expect("empty registry is always valid"),
    };

    let mut context = EvaluationContext::new();
    for var in &cli.vars {
        match var.split_once('=') {
            Some((name, value)) => context.bind(name, value),
            None => {
                eprintln!("Error: --var expects NAME=VALUE, got '{}'", var);
                process::exit(1);
            }
        }
    }

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    let loader = FileFragmentLoader::new(&cli.templates);
    let composer = Composer::new(registry, Box::new(loader)).with_max_depth(cli.max_depth);

    match compose(&source, &composer, &context) {
        Ok(markup) => {
            println!("{}", markup);
        }
        Err(weft::Error::Parse(error)) => {
            eprintln!("{}", error.format(&source, &filename));
            process::exit(1);
        }
        Err(error) => {
            eprintln!("Error: {}", error);
            process::exit(1);
        }
    }
}

fn print_intro() {
    println!(
        r#"weft - slot-based component composition for markup templates

USAGE:
    weft [OPTIONS] [FILE]
    echo '<markup>' | weft

OPTIONS:
    -m, --manifest   Component manifest in TOML format (default: weft.toml)
    -t, --templates  Root directory for fragment templates (default: templates)
    --var NAME=VALUE Context binding for attribute expressions (repeatable)
    --max-depth N    Bound on nested component expansion depth
    -v, --verbose    Log composition steps to stderr
    -h, --help       Print help

QUICK START:
    echo '<pl:alert pl:level="info">Disk almost full</pl:alert>' | weft > out.html

The manifest lists the known components:

    prefix = "pl"
    components = ["alert", "collapsible"]

    [templates]
    button = "shared/button"

Each component expands against `<templates-root>/<path>.html`; the fragment
marks its entry region with a `pl:fragment` attribute and declares injection
points with `<pl:slot pl:name="...">fallback</pl:slot>`."#
    );
}
