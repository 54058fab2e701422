//! Link Debug Tools
//!
//! Host-side companion for the HDMI transmitter link state machine: inspect
//! the transition table, validate it, and replay event traces captured from
//! (or written for) a transmitter driver.
//!
//! # Usage
//!
//! ```bash
//! # Print the transition table, or one state's row
//! link-debug table
//! link-debug table --state HdcpWaitRx
//!
//! # Validate table invariants
//! link-debug check
//!
//! # Built-in scenarios
//! link-debug scenarios list
//! link-debug scenarios show repeater-auth
//! link-debug scenarios run standby-resume
//!
//! # Replay a trace file
//! link-debug replay capture.toml
//!
//! # Export a scenario as an editable trace
//! link-debug generate trace --scenario retry-storm -o retry.toml
//! ```

mod check;
mod scenarios;
mod supervisor;
mod table;
mod trace;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use hdmi_tx_link::LinkState;
use std::path::PathBuf;

use check::TableValidator;
use scenarios::{get_scenario, scenario_names, Scenario};
use trace::{replay, ReplayConfig, Trace};

/// Link Debug Tools
///
/// Transition table inspection and trace replay for the HDMI link state machine
#[derive(Parser)]
#[command(name = "link-debug")]
#[command(version = "0.1.0")]
#[command(about = "Inspect and replay the HDMI transmitter link/HDCP state machine")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (logs every transition)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the transition table
    Table {
        /// Only show transitions leaving this state
        #[arg(short, long)]
        state: Option<String>,
    },

    /// Validate transition table invariants
    Check,

    /// Built-in scenario operations
    #[command(subcommand)]
    Scenarios(ScenarioCommands),

    /// Replay a trace file and check its expectations
    Replay {
        /// Path to trace file (TOML)
        path: PathBuf,

        /// Disable timestamps
        #[arg(long)]
        no_timestamps: bool,
    },

    /// Generate trace files
    #[command(subcommand)]
    Generate(GenerateCommands),
}

#[derive(Subcommand)]
enum ScenarioCommands {
    /// List built-in scenarios
    List,

    /// Show the steps of a scenario
    Show {
        /// Scenario name (e.g., plain-auth, repeater-auth)
        name: String,
    },

    /// Run a scenario through the state machine
    Run {
        /// Scenario name
        name: String,

        /// Disable timestamps
        #[arg(long)]
        no_timestamps: bool,
    },
}

#[derive(Subcommand)]
enum GenerateCommands {
    /// Export a built-in scenario as a trace file
    Trace {
        /// Scenario to export
        #[arg(short, long, default_value = "plain-auth")]
        scenario: String,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match cli.command {
        Commands::Table { state } => handle_table(state),
        Commands::Check => handle_check(),
        Commands::Scenarios(cmd) => handle_scenarios(cmd),
        Commands::Replay {
            path,
            no_timestamps,
        } => handle_replay(path, no_timestamps),
        Commands::Generate(cmd) => handle_generate(cmd),
    }
}

fn lookup_scenario(name: &str) -> Result<&'static Scenario> {
    get_scenario(name).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown scenario: {}. Use 'link-debug scenarios list' to see available scenarios.",
            name
        )
    })
}

fn handle_table(state: Option<String>) -> Result<()> {
    let state = match state {
        Some(name) => Some(
            name.parse::<LinkState>()
                .map_err(|_| anyhow::anyhow!("Unknown state: {}", name))?,
        ),
        None => None,
    };
    table::print_table(state);
    Ok(())
}

fn handle_check() -> Result<()> {
    let result = TableValidator::new().validate();
    TableValidator::print_report(&result);

    if !result.passed {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_scenarios(cmd: ScenarioCommands) -> Result<()> {
    match cmd {
        ScenarioCommands::List => {
            println!("{}", "=".repeat(60));
            println!("{}", "Built-in Scenarios".cyan().bold());
            println!("{}", "=".repeat(60));

            for name in scenario_names() {
                if let Some(scenario) = get_scenario(name) {
                    println!("\n  {}: {}", name.white().bold(), scenario.name);
                    println!("    {}", scenario.description);
                    println!(
                        "    Steps: {}, ends in {}",
                        scenario.steps.len(),
                        scenario.expect_state()
                    );
                }
            }

            println!("\n{}", "=".repeat(60));
            println!(
                "Use {} to see the steps of a scenario",
                "link-debug scenarios show <name>".cyan()
            );
        }

        ScenarioCommands::Show { name } => {
            let scenario = lookup_scenario(&name)?;
            print_scenario(scenario);
        }

        ScenarioCommands::Run {
            name,
            no_timestamps,
        } => {
            let scenario = lookup_scenario(&name)?;
            let report = replay(&scenario.to_trace());
            report.print(&ReplayConfig {
                show_timestamps: !no_timestamps,
            });
            if !report.passed() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_scenario(scenario: &Scenario) {
    println!("{}", "=".repeat(70));
    println!("{}", format!("Scenario: {}", scenario.name).cyan().bold());
    println!("{}", "=".repeat(70));

    println!("  ID: {}", scenario.id);
    println!("  Description: {}", scenario.description);

    println!("\n{}", "Steps:".white().bold());
    for (i, (stimulus, state)) in scenario.steps.iter().enumerate() {
        println!("  {:>2}. {:<22} -> {}", i + 1, stimulus.to_string(), state);
    }

    println!("\n{}", "Expected outcome:".white().bold());
    println!("  Final state:    {}", scenario.expect_state());
    println!("  Ignored events: {}", scenario.expect_ignored);
}

fn handle_replay(path: PathBuf, no_timestamps: bool) -> Result<()> {
    let trace = Trace::load(&path)
        .with_context(|| format!("Failed to load trace {}", path.display()))?;
    log::info!(
        "Replaying {} ({} steps)",
        trace.name,
        trace.steps.len()
    );

    let report = replay(&trace);
    report.print(&ReplayConfig {
        show_timestamps: !no_timestamps,
    });

    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_generate(cmd: GenerateCommands) -> Result<()> {
    match cmd {
        GenerateCommands::Trace { scenario, output } => {
            let scenario = lookup_scenario(&scenario)?;
            let content = scenario
                .to_trace()
                .to_toml()
                .context("Failed to encode trace")?;

            if let Some(path) = output {
                std::fs::write(&path, &content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "{} Trace '{}' written to {}",
                    "[OK]".green().bold(),
                    scenario.id,
                    path.display()
                );
            } else {
                println!("{}", content);
            }
        }
    }

    Ok(())
}
