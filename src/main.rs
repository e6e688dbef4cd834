//! switchboard CLI — operator-facing self-check and status commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use switchboard::adapters;
use switchboard::config::PlatformConfig;
use switchboard::selfcheck::registry::{HealthCheckResult, RegistryReport};
use switchboard::Switchboard;

#[derive(Parser)]
#[command(name = "switchboard", version, about = "Provider resilience layer")]
struct Cli {
    /// Path to the config file.
    #[arg(long, env = "SWITCHBOARD_CONFIG", default_value = "switchboard.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every provider of every capability and print the results.
    Doctor {
        /// Emit the raw report as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print the current monitoring report as JSON.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = PlatformConfig::load(Some(&cli.config))?;
    let switchboard = Switchboard::new(config);

    // Materialize one chain per capability so the sweep covers everything
    // the platform can talk to.
    switchboard
        .llm_client("content_generation", None, false, false)
        .await?;
    switchboard.email_client().await?;
    switchboard.social_client().await?;
    switchboard.crm_client().await?;

    match cli.command {
        Commands::Doctor { json } => {
            let report = switchboard.self_check().run_full_check(None).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_doctor_report(&switchboard, &report).await;
            }
        }
        Commands::Status => {
            let report = switchboard.registry().status_report().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

// ─── Output ───────────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Print a formatted table of probe results and recommendations to stdout.
async fn print_doctor_report(switchboard: &Switchboard, report: &RegistryReport) {
    println!();
    println!("{BOLD}switchboard doctor — provider self-check{RESET}");
    println!("{}", "─".repeat(64));

    let mut failed = 0usize;
    for chain in all_probed(switchboard).await {
        for result in chain {
            let (symbol, color) = if result.success {
                ("✓", GREEN)
            } else {
                failed += 1;
                ("✗", RED)
            };
            let label = format!("{} ({})", result.provider_name, result.capability);
            let detail = result
                .error_message
                .clone()
                .unwrap_or_else(|| "ok".to_string());
            println!("  {color}{symbol}{RESET}  {label:<32}  {detail}");
        }
    }

    println!("{}", "─".repeat(64));
    println!(
        "checks: {}   success rate: {:.0}%",
        report.total_checks,
        report.success_rate * 100.0
    );

    if report.recommendations.is_empty() {
        if failed == 0 {
            println!("{GREEN}All providers healthy.{RESET}");
        }
    } else {
        println!();
        println!("{BOLD}recommendations{RESET}");
        for rec in &report.recommendations {
            println!(
                "  {YELLOW}[{:?}]{RESET} {} — {}",
                rec.severity, rec.provider_name, rec.suggested_action
            );
        }
    }
    println!();
}

/// Collect each provider's latest probe result, grouped by capability.
async fn all_probed(switchboard: &Switchboard) -> Vec<Vec<HealthCheckResult>> {
    let registry = switchboard.registry();
    let mut grouped = Vec::new();
    for capability in ["llm", "email_sending", "social_posting", "crm"] {
        let mut results = Vec::new();
        for provider in adapters::providers_for_capability(capability) {
            let mut history = registry
                .get_health_history(provider, Some(capability), Some(1))
                .await;
            results.append(&mut history);
        }
        grouped.push(results);
    }
    grouped
}
