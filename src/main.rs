//! Harvestgate CLI
//!
//! Energy-harvesting duty-cycle simulator for wearable sensor streams.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use harvestgate::{
    config::SimConfig,
    core::{sparsify_data, Policy},
    harvester::KineticHarvester,
    loader::{load_window_from_csv, synthetic_window},
    report::RunReport,
    VERSION,
};

#[derive(Parser)]
#[command(name = "harvestgate")]
#[command(version = VERSION)]
#[command(about = "Energy-harvesting duty-cycle simulator for wearable sensor streams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate energy-gated sampling over a dense window
    Run {
        /// Input CSV (time + 3 axis columns per body part); omit for synthetic motion
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Comma-separated body part labels matching the CSV column groups
        #[arg(long, default_value = "arm")]
        body_parts: String,

        /// Samples per packet
        #[arg(long)]
        packet_size: Option<usize>,

        /// Passive leakage rate in Watts
        #[arg(long)]
        leakage: Option<f64>,

        /// Dispatch policy: opportunistic, dense, or conservative_<fraction>
        #[arg(long)]
        policy: Option<String>,

        /// Synthetic window length in samples (when no input file is given)
        #[arg(long, default_value = "2000")]
        samples: usize,

        /// Synthetic sample rate in Hz
        #[arg(long, default_value = "25.0")]
        rate_hz: f64,

        /// Include final energy traces and thresholds in the report export
        #[arg(long)]
        diagnostics: bool,

        /// Output path for the JSON run report (defaults to the export dir)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List the recognized dispatch policies
    Policies,

    /// Show configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            body_parts,
            packet_size,
            leakage,
            policy,
            samples,
            rate_hz,
            diagnostics,
            output,
        } => cmd_run(
            input,
            &body_parts,
            packet_size,
            leakage,
            policy,
            samples,
            rate_hz,
            diagnostics,
            output,
        ),
        Commands::Policies => {
            cmd_policies();
            Ok(())
        }
        Commands::Config => {
            cmd_config();
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    input: Option<PathBuf>,
    body_parts: &str,
    packet_size: Option<usize>,
    leakage: Option<f64>,
    policy: Option<String>,
    samples: usize,
    rate_hz: f64,
    diagnostics: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = SimConfig::load().unwrap_or_default();
    let packet_size = packet_size.unwrap_or(config.packet_size);
    let leakage = leakage.unwrap_or(config.leakage);
    let policy_label = policy.unwrap_or_else(|| config.policy.clone());
    let policy: Policy = policy_label
        .parse()
        .with_context(|| format!("policy {policy_label:?}"))?;

    let labels: Vec<String> = body_parts
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let window = match input {
        Some(path) => load_window_from_csv(&path, labels)?,
        None => synthetic_window(labels, samples, rate_hz),
    };

    println!("harvestgate v{VERSION}");
    println!("  Policy: {policy}");
    println!("  Packet size: {packet_size} samples");
    println!("  Leakage: {leakage:e} W");
    println!(
        "  Window: {} samples x {} body parts",
        window.len(),
        window.body_parts().len()
    );
    println!();

    let harvester = KineticHarvester::default();
    let streams = sparsify_data(&window, packet_size, leakage, &harvester, policy, diagnostics)?;

    for stream in &streams {
        let captured = stream.packets.sample_count();
        println!(
            "  {:<12} {} packets, {}/{} samples captured",
            stream.body_part,
            stream.packets.len(),
            captured,
            window.len()
        );
    }

    let report = RunReport::new(&window, &streams, policy, packet_size, leakage);

    let export_path = match output {
        Some(path) => path,
        None => {
            if let Err(e) = config.ensure_directories() {
                eprintln!("Warning: could not create export directory: {e}");
            }
            config
                .export_path
                .join(format!("run_{}.json", Utc::now().format("%Y%m%d_%H%M%S")))
        }
    };

    if let Some(parent) = export_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let json = serde_json::to_string_pretty(&report).context("serializing run report")?;
    std::fs::write(&export_path, json)
        .with_context(|| format!("writing report to {export_path:?}"))?;

    println!();
    println!("Run {} exported to {:?}", report.run_id, export_path);
    Ok(())
}

fn cmd_policies() {
    println!("Recognized dispatch policies:");
    println!("  opportunistic            transmit as soon as the threshold is reached");
    println!("  dense                    transmit aggressively, charging only leakage");
    println!("  conservative_<fraction>  hold out for <fraction> x threshold, fraction in [1.0, 2.0]");
}

fn cmd_config() {
    let config = SimConfig::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", SimConfig::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}
