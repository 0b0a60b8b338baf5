//! fraudlens-runner: headless batch runner for FraudLens.
//!
//! Usage:
//!   fraudlens-runner --input transactions.csv --seed 12345
//!   fraudlens-runner --input transactions.csv --no-noise --export scored.csv
//!   fraudlens-runner --sample 500 --seed 42 --json

use anyhow::Result;
use fraudlens_core::{
    config::NoiseMode,
    ingest,
    report,
    rng::{RngBank, StreamSlot},
    sample::SampleGenerator,
    summary::{self, BatchSummary, GroupRisk},
    AnalysisResult, DetectionConfig, FraudAnalyzer, FraudInsight, ScanError,
};
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::exit;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RunOutput<'a> {
    summary: BatchSummary,
    riskiest_payment_type: Option<GroupRisk>,
    riskiest_store: Option<GroupRisk>,
    insights: &'a [FraudInsight],
    scored: &'a [fraudlens_core::ScoredTransaction],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let input = string_arg(&args, "--input");
    let sample_size = parse_arg(&args, "--sample", 0usize);
    let config_path = string_arg(&args, "--config");
    let export_path = string_arg(&args, "--export");
    let json_mode = args.iter().any(|a| a == "--json");
    let no_noise = args.iter().any(|a| a == "--no-noise");
    let seed = args
        .windows(2)
        .find(|w| w[0] == "--seed")
        .and_then(|w| w[1].parse::<u64>().ok());

    if input.is_none() && sample_size == 0 {
        eprintln!("Usage: fraudlens-runner (--input <file.csv> | --sample <n>) [--seed N | --no-noise]");
        eprintln!("                        [--config <config.json>] [--export <scored.csv>] [--json]");
        exit(2);
    }

    let mut config = match config_path {
        Some(path) => DetectionConfig::load(path)?,
        None => DetectionConfig::default(),
    };
    if no_noise {
        config = config.with_noise_mode(NoiseMode::Disabled);
    } else if let Some(seed) = seed {
        config = config.with_noise_mode(NoiseMode::Seeded { seed });
    }

    let analyzer = FraudAnalyzer::try_new(config)?;
    let rng_bank = analyzer.rng_bank().clone();

    if !json_mode {
        println!("FraudLens — batch runner");
        println!("  source:    {}", input.unwrap_or("(sample data)"));
        println!("  seed:      {}", describe_seed(&rng_bank));
        println!("  rules:     {}", analyzer.scorer().rules().len());
        println!();
    }

    let records = match input {
        Some(path) => {
            let mut rng = rng_bank.for_stream(StreamSlot::Ingest);
            match ingest::load_csv_file(Path::new(path), &analyzer.config().ingest, &mut rng) {
                Ok(records) => records,
                Err(ScanError::Validation { errors }) => {
                    eprintln!("Input rejected — processing did not start:");
                    for error in &errors {
                        eprintln!("  {error}");
                    }
                    exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        None => {
            let mut rng = rng_bank.for_stream(StreamSlot::Sample);
            SampleGenerator::generate(sample_size, &mut rng)
        }
    };

    let result = analyzer.analyze(&records);

    if let Some(path) = export_path {
        let file = File::create(path)?;
        report::write_scored_csv(BufWriter::new(file), &result.scored)?;
        log::info!("exported {} scored transactions to {path}", result.scored.len());
    }

    if json_mode {
        print_json(&result)?;
    } else {
        print_summary(&result);
    }

    Ok(())
}

fn print_json(result: &AnalysisResult) -> Result<()> {
    let output = RunOutput {
        summary: BatchSummary::from_scored(&result.scored),
        riskiest_payment_type: summary::riskiest_payment_type(&result.scored),
        riskiest_store: summary::riskiest_store(&result.scored),
        insights: &result.insights,
        scored: &result.scored,
    };
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &output)?;
    writeln!(stdout)?;
    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    let batch = BatchSummary::from_scored(&result.scored);

    println!("=== BATCH SUMMARY ===");
    println!("  transactions:     {}", batch.total);
    println!("  high risk:        {}", batch.high_risk);
    println!("  medium risk:      {}", batch.medium_risk);
    println!("  low risk:         {}", batch.low_risk);
    println!("  high-risk amount: ${:.2}", batch.high_risk_amount);
    println!("  fraud rate:       {:.1}%", batch.fraud_rate_pct);

    if let Some(payment) = summary::riskiest_payment_type(&result.scored) {
        println!(
            "  riskiest payment: {} ({:.1}% of {})",
            payment.key, payment.rate_pct, payment.total
        );
    }
    if let Some(store) = summary::riskiest_store(&result.scored) {
        println!(
            "  riskiest store:   {} ({:.1}% of {})",
            store.key, store.rate_pct, store.total
        );
    }

    println!();
    println!("=== INSIGHTS ===");
    if result.insights.is_empty() {
        println!("  (No findings for this batch)");
    }
    for insight in &result.insights {
        println!("  [{:?}] {}", insight.priority, insight.insight_type);
        println!("      {}", insight.description);
        println!("      impact:         {}", insight.impact);
        println!("      recommendation: {}", insight.recommendation);
    }
}

fn describe_seed(bank: &RngBank) -> String {
    if bank.noise_enabled() {
        bank.master_seed().to_string()
    } else {
        "none (noise disabled)".to_string()
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
