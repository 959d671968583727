use clap::{Parser, Subcommand};
use glucorisk_core::Locale;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "glucorisk")]
#[command(author, version, about = "Diabetes-risk assessment from health questionnaire answers")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Evaluator configuration file (defaults are used if it does not exist)
    #[arg(short, long, global = true, default_value = "glucorisk.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the ordered feature schema with question text
    Schema {
        /// Language for question text (overrides the config file)
        #[arg(short, long, value_parser = parse_locale)]
        locale: Option<Locale>,
    },

    /// Load the model artifact and report what it contains
    CheckModel {
        /// Model path (overrides the config file)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Assess risk for a JSON object of answers
    Evaluate {
        /// JSON file mapping input names to values
        #[arg(short, long)]
        answers: PathBuf,

        /// Model path (overrides the config file)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_locale(s: &str) -> Result<Locale, String> {
    s.parse()
}
