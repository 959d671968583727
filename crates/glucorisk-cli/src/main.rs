//! GlucoRisk CLI
//!
//! Renders the questionnaire schema, checks a model artifact, and evaluates
//! answer files against the configured model.

use anyhow::{Context, Result};
use clap::Parser;
use glucorisk_core::{FeatureSchema, Locale};
use glucorisk_evaluator::{disclaimer, Assessment, EvaluatorConfig, RawInputs, RiskEvaluator};
use glucorisk_model::{
    install_global, teardown_global, ModelProvider, Predictor, XgbModelProvider,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    glucorisk_evaluator::describe_metrics();

    let config = EvaluatorConfig::from_file(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    match cli.command {
        Commands::Schema { locale } => print_schema(&config, locale.unwrap_or(config.locale)),
        Commands::CheckModel { model } => check_model(with_model(config, model)),
        Commands::Evaluate {
            answers,
            model,
            json,
        } => evaluate(with_model(config, model), &answers, json),
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("glucorisk=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("glucorisk=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn with_model(mut config: EvaluatorConfig, model: Option<PathBuf>) -> EvaluatorConfig {
    if let Some(path) = model {
        config.model.path = path;
    }
    config
}

fn print_schema(config: &EvaluatorConfig, locale: Locale) -> Result<()> {
    let schema = config.schema()?;

    println!("{:>3}  {:<24} {:<16} {:<8} QUESTION", "#", "NAME", "DOMAIN", "DEFAULT");
    for (index, slot) in schema.slots().iter().enumerate() {
        let default = slot
            .default_value()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let question = if slot.is_derived() {
            derivation_note(&schema)
        } else {
            slot.prompt(locale).to_string()
        };
        println!(
            "{:>3}  {:<24} {:<16} {:<8} {}",
            index,
            slot.name(),
            slot.kind().to_string(),
            default,
            question
        );
    }
    Ok(())
}

fn derivation_note(schema: &FeatureSchema) -> String {
    if schema.derivation().requires_bmi() {
        "GenHlth x BMI (BMI is an auxiliary input)".to_string()
    } else {
        "GenHlth".to_string()
    }
}

fn check_model(config: EvaluatorConfig) -> Result<()> {
    let provider = XgbModelProvider::new(config.model.clone(), config.schema()?);
    let booster = provider
        .load_booster()
        .with_context(|| format!("Failed to load model from {}", provider.source()))?;

    println!("Model loaded successfully: {}", provider.source());
    println!("  trees:     {}", booster.ensemble().num_trees());
    println!("  transform: {:?}", booster.ensemble().transform());
    println!("  features:");
    for (index, name) in booster.feature_names().unwrap_or_default().iter().enumerate() {
        println!("    {:>2}. {}", index, name);
    }
    Ok(())
}

fn evaluate(config: EvaluatorConfig, answers: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(answers)
        .with_context(|| format!("Failed to read answers from {}", answers.display()))?;
    let raw: RawInputs = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON object of numeric answers", answers.display()))?;

    let provider = XgbModelProvider::new(config.model.clone(), config.schema()?);
    let slot = install_global(Arc::new(provider))?;
    let evaluator = RiskEvaluator::from_slot(&config, slot).context("Failed to load model")?;
    info!(
        predictor = %evaluator.predictor_name(),
        policy = evaluator.policy().name(),
        "Evaluator ready"
    );

    let assessment = evaluator.evaluate(&raw)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print_assessment(&assessment, evaluator.locale());
    }

    teardown_global();
    Ok(())
}

fn print_assessment(assessment: &Assessment, locale: Locale) {
    println!(
        "Risk: {} ({:.1}% probability)",
        assessment.tier,
        assessment.percent()
    );
    println!("Health risk index: {:.1}", assessment.composite_index);
    println!();
    println!("{}", assessment.guidance.text());

    if !assessment.risk_factors.is_empty() {
        println!();
        for factor in &assessment.risk_factors {
            println!("  * {}", factor.label(locale));
        }
    }

    println!();
    println!("{}", disclaimer(locale));
}
