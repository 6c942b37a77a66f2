//! tyre: check a constraint workspace and print the inferred types.
//!
//! Usage:
//!   tyre [options] <FILE>
//!
//! FILE is a JSON workspace (environment plus constraint units).

use clap::Parser as ClapParser;
use std::process;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tyre_core::NameTable;
use tyre_diagnostics::Diagnostic;
use tyre_driver::{DriverError, UnitReport, Workspace};

#[derive(ClapParser, Debug)]
#[command(name = "tyre", about = "tyre - constraint-based type inference for workspace files", version)]
struct Cli {
    /// Workspace file to check.
    #[arg(value_name = "FILE")]
    file: String,

    /// Checker configuration; replaces the workspace's own `config`.
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Search steps allowed per unit.
    #[arg(long = "max-steps")]
    max_steps: Option<u64>,

    /// Prune alternatives whose penalty exceeds this.
    #[arg(long = "max-penalty")]
    max_penalty: Option<u32>,

    /// Default unconstrained literals to their default type.
    #[arg(long = "literal-defaulting")]
    literal_defaulting: bool,

    /// Check units one at a time on the main thread.
    #[arg(long)]
    sequential: bool,

    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output.
    #[arg(long = "no-color")]
    no_color: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(report) => {
            eprintln!("{:?}", report);
            process::exit(2);
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> miette::Result<i32> {
    let start = Instant::now();
    let mut workspace = tyre_driver::load_workspace_file(&cli.file)?;
    apply_overrides(cli, &mut workspace)?;

    if workspace.units().is_empty() {
        print_error("workspace has no units");
        return Ok(1);
    }

    let reports = workspace.check()?;
    let use_color = !cli.no_color && atty_is_terminal();
    let names = workspace.names();

    let mut failed = 0;
    for report in &reports {
        if !report.is_success() {
            failed += 1;
        }
        print_report(report, names, use_color);
    }

    let elapsed = start.elapsed();
    let total = reports.len();
    if failed > 0 {
        let summary = format!(
            "{} of {} unit{} failed.",
            failed,
            total,
            if total == 1 { "" } else { "s" }
        );
        if use_color {
            eprintln!("\n{}{}{}", RED, summary, RESET);
        } else {
            eprintln!("\n{}", summary);
        }
        return Ok(1);
    }

    if use_color {
        eprintln!(
            "{}Checked {} unit{} in {:.2}s.{}",
            GRAY,
            total,
            if total == 1 { "" } else { "s" },
            elapsed.as_secs_f64(),
            RESET
        );
    }
    Ok(0)
}

/// Command-line settings win over the config file, which wins over the workspace.
fn apply_overrides(cli: &Cli, workspace: &mut Workspace) -> Result<(), DriverError> {
    if let Some(ref path) = cli.config {
        *workspace.config_mut() = tyre_options::parse_config_file(path)?;
    }
    let config = workspace.config_mut();
    if let Some(max_steps) = cli.max_steps {
        config.solver.max_steps = max_steps;
    }
    if cli.max_penalty.is_some() {
        config.solver.max_penalty = cli.max_penalty;
    }
    if cli.literal_defaulting {
        config.solver.literal_defaulting = true;
    }
    if cli.sequential {
        config.parallel = false;
    }
    config.validate()?;
    debug!(config = ?workspace.config(), "effective configuration");
    Ok(())
}

fn print_report(report: &UnitReport, names: &NameTable, use_color: bool) {
    let status = if report.is_success() { "ok" } else { "failed" };
    if use_color {
        let color = if report.is_success() { GREEN } else { RED };
        println!("{}{}{}{}: {}{}{}", BOLD, report.name, RESET, GRAY, color, status, RESET);
    } else {
        println!("{}: {}", report.name, status);
    }

    if let Some(solution) = report.solution() {
        for (var, ty) in solution.bindings() {
            println!("  {} = {}", var, ty.to_string_with(names));
        }
        for (site, decl) in solution.references() {
            println!("  {} -> {}", site, decl);
        }
    }

    for diag in report.diagnostics(names).diagnostics() {
        print_diagnostic(diag, names, use_color, 1);
    }
}

fn print_diagnostic(diag: &Diagnostic, names: &NameTable, use_color: bool, indent: usize) {
    let pad = "  ".repeat(indent);
    let category = diag.category.to_string();
    if use_color {
        let color = if diag.is_error() { RED } else if diag.is_warning() { YELLOW } else { GRAY };
        eprint!("{}", pad);
        if let Some(ref locator) = diag.locator {
            eprint!("{}{}{}: ", CYAN, locator.display(names), RESET);
        }
        eprintln!(
            "{}{}{}{} {}E{}{}: {}",
            BOLD, color, category, RESET, CYAN, diag.code, RESET, diag.message_text
        );
    } else {
        match diag.locator {
            Some(ref locator) => eprintln!(
                "{}{}: {} E{}: {}",
                pad,
                locator.display(names),
                category,
                diag.code,
                diag.message_text
            ),
            None => eprintln!("{}{}", pad, diag),
        }
    }
    for related in &diag.related_information {
        print_diagnostic(related, names, use_color, indent + 1);
    }
}

fn print_error(msg: &str) {
    if atty_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn atty_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        true
    }
}
