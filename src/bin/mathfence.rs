//! Mathfence CLI - math notation normalizer for chat transcripts

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};

#[cfg(feature = "cli")]
use mathfence::{CliDiagnostic, EngineError, EngineResult, NormalizeOptions, Normalizer};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mathfence")]
#[command(version)]
#[command(about = "Wrap bare LaTeX math in renderer delimiters", long_about = None)]
struct Cli {
    /// Input file path (reads from stdin if not provided)
    input_file: Option<String>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Check mode - report diagnostics without writing output
    #[arg(long)]
    check: bool,

    /// Emit the result and diagnostics as a JSON report
    #[arg(long)]
    json: bool,

    /// Use colored output for diagnostics
    #[arg(long, default_value_t = true)]
    color: bool,

    /// Do not wrap bare math environments in $$...$$
    #[arg(long)]
    no_environments: bool,

    /// Extra command names to accept (repeatable), without the backslash
    #[arg(long = "command")]
    extra_commands: Vec<String>,
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> EngineResult<()> {
    let input = read_input(cli.input_file.as_deref())?;

    let mut options = NormalizeOptions::default();
    options.wrap_environments = !cli.no_environments;
    options.extra_commands = cli.extra_commands.clone();

    let result = Normalizer::with_options(options).normalize_with_diagnostics(&input);

    if cli.json {
        let report = serde_json::to_string_pretty(&result)
            .map_err(|e| EngineError::invalid(e.to_string()))?;
        return write_output(cli.output.as_deref(), &report);
    }

    for warning in &result.warnings {
        let diag = CliDiagnostic::from(warning.clone());
        if cli.color {
            eprintln!("{}{}\x1b[0m", diag.color_code(), diag);
        } else {
            eprintln!("{}", diag);
        }
    }

    if cli.check {
        if result.has_warnings() {
            std::process::exit(2);
        }
        return Ok(());
    }

    write_output(cli.output.as_deref(), &result.output)
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&str>) -> EngineResult<String> {
    match path {
        Some(p) => Ok(fs::read_to_string(p)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

#[cfg(feature = "cli")]
fn write_output(path: Option<&str>, content: &str) -> EngineResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            Ok(())
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                handle.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("mathfence was built without the 'cli' feature");
    std::process::exit(1);
}
