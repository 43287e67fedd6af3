//! Rollback webhook control - operator CLI for the rollback daemon.
//!
//! Drives the same HTTP API the alerting system calls, for manual
//! remediation and for checking what the last automated rollback did.

mod client;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use client::WebhookClient;
use owo_colors::OwoColorize;
use rollback_common::{RollbackRequest, RollbackResponse, RollbackStatus, ServiceName};

#[derive(Parser)]
#[command(name = "rollbackctl")]
#[command(about = "Operator CLI for the rollback webhook service", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the webhook daemon
    #[arg(
        long,
        env = "ROLLBACK_WEBHOOK_URL",
        default_value = "http://127.0.0.1:9000"
    )]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the last rollback and the success total
    Status,

    /// Daemon health, including the orchestrator CLI probe
    Health,

    /// Readiness checks (docker, env file, compose file)
    Ready,

    /// Trigger a rollback
    Trigger {
        /// Service to roll back (order-service, inventory-service, payment-service)
        #[arg(long)]
        service: String,

        /// Version to pin, e.g. v1.0
        #[arg(long)]
        target_version: String,

        /// Why the rollback is needed
        #[arg(long)]
        reason: String,

        /// Alert rule id to record with the rollback
        #[arg(long, default_value = "manual-rollbackctl")]
        alert_id: String,

        /// Human-readable alert name
        #[arg(long)]
        alert_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = WebhookClient::new(&cli.url);

    match cli.command {
        Commands::Status => {
            let status = client.status().await?;
            println!(
                "uptime: {:.0}s  successful rollbacks: {}",
                status.service_uptime_seconds, status.total_rollbacks
            );
            match status.last_rollback {
                Some(record) => print_record(&record),
                None => println!("no rollbacks yet"),
            }
        }
        Commands::Health => {
            let health = client.health().await?;
            println!(
                "{} v{} ({})",
                health.status, health.version, health.environment
            );
            print_check("docker", health.docker_available);
        }
        Commands::Ready => {
            let ready = client.ready().await?;
            print_check("docker", ready.checks.docker);
            print_check("env file", ready.checks.env_file);
            print_check("compose file", ready.checks.compose_file);
            if !ready.ready {
                std::process::exit(1);
            }
        }
        Commands::Trigger {
            service,
            target_version,
            reason,
            alert_id,
            alert_name,
        } => {
            let service: ServiceName = service.parse()?;
            let request = RollbackRequest {
                service,
                target_version,
                alert_id,
                alert_name,
                reason,
                triggered_at: Some(Utc::now()),
                additional_context: None,
            };

            let record = client.trigger(&request).await?;
            print_record(&record);
            if record.status == RollbackStatus::Failed {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_record(record: &RollbackResponse) {
    let status = match record.status {
        RollbackStatus::Completed => "COMPLETED".green().to_string(),
        RollbackStatus::Failed => "FAILED".red().to_string(),
        RollbackStatus::Initiated | RollbackStatus::InProgress => {
            "IN PROGRESS".yellow().to_string()
        }
    };

    println!("{}  {}  {}", record.rollback_id, record.service, status);
    println!(
        "  {} -> {}",
        record.previous_version.as_deref().unwrap_or("unknown"),
        record.target_version
    );
    println!("  {}", record.message);
    if let Some(error) = &record.error {
        println!("  {} {}", "error:".red(), error);
    }
    if let Some(trace_id) = &record.trace_id {
        println!("  trace: {trace_id}");
    }
}

fn print_check(name: &str, ok: bool) {
    if ok {
        println!("  {:14} {}", name, "OK".green());
    } else {
        println!("  {:14} {}", name, "FAIL".red());
    }
}
