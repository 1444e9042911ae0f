use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod cli_output;

use cli_output::{format_score, OutputMode, OutputWriter};
use sentigate::gibberish::GibberishSignals;
use sentigate::inference::{HttpEmotionClassifier, HttpSentimentClassifier, InferenceClient};
use sentigate::validator::symbol_ratio;
use sentigate::{
    ConfidenceGate, Emotion, EmotionAnalyzer, EmotionResult, GateConfig, InputValidator,
    LanguageIdentifier, ReportBuilder, RoutedIdentifier, SentimentAnalyzer, SentimentResult,
};

#[derive(Parser)]
#[command(name = "sentigate")]
#[command(about = "Validate text and gate sentiment/emotion predictions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default: <config dir>/sentigate/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the input checks only and show the measurements behind the verdict
    Check {
        /// Text to check (read from stdin when omitted)
        text: Option<String>,
    },

    /// Classify sentiment
    Sentiment {
        /// Text to analyze (read from stdin when omitted)
        text: Option<String>,
    },

    /// Classify emotions
    Emotion {
        /// Text to analyze (read from stdin when omitted)
        text: Option<String>,
    },

    /// Sentiment and emotion together; rejected if either is rejected
    Analyze {
        /// Text to analyze (read from stdin when omitted)
        text: Option<String>,
    },

    /// Analyze every line of a file in parallel, one JSON record per line
    Batch {
        /// Input file, one text per line
        file: PathBuf,

        #[arg(short, long, value_enum, default_value = "analyze")]
        mode: BatchMode,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BatchMode {
    Sentiment,
    Emotion,
    Analyze,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file path
    Path,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    valid: bool,
    reason: Option<&'a str>,
    symbol_ratio: f64,
    gibberish: &'a GibberishSignals,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_error: Option<String>,
}

#[derive(Serialize)]
struct BatchRecord<T: Serialize> {
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stderr keeps stdout clean for JSON
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(GateConfig::config_file_path);
    let out = OutputWriter::new(OutputMode::detect(cli.json));

    match cli.command {
        Commands::Config { action } => run_config(action, &config_path, &out),

        Commands::Check { text } => {
            let config = load_config(&config_path)?;
            let text = read_text(text)?;
            run_check(&config, &text, &out)
        }

        Commands::Sentiment { text } => {
            let builder = build_pipeline(&load_config(&config_path)?)?;
            let text = read_text(text)?;
            let result = builder.sentiment().analyze(Some(&text))?;
            print_sentiment(&result, &out)
        }

        Commands::Emotion { text } => {
            let builder = build_pipeline(&load_config(&config_path)?)?;
            let text = read_text(text)?;
            let result = builder.emotion().analyze(Some(&text))?;
            print_emotion(&result, &out)
        }

        Commands::Analyze { text } => {
            let builder = build_pipeline(&load_config(&config_path)?)?;
            let text = read_text(text)?;
            let report = builder.build(Some(&text))?;
            if out.is_json() {
                out.emit_json(&report, true)?;
            } else {
                println!("{}", report.render());
            }
            Ok(())
        }

        Commands::Batch { file, mode } => {
            let builder = build_pipeline(&load_config(&config_path)?)?;
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            run_batch(&builder, &content, mode, &out)
        }
    }
}

fn load_config(path: &Path) -> Result<GateConfig> {
    GateConfig::load_from(path).with_context(|| format!("Failed to load config {}", path.display()))
}

fn read_text(text: Option<String>) -> Result<String> {
    match text {
        Some(t) => Ok(t),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            Ok(buf.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

fn build_validator(config: &GateConfig) -> (InputValidator, Arc<RoutedIdentifier>) {
    let identifier = Arc::new(RoutedIdentifier::new(&config.language));
    let validator = InputValidator::new(
        config.validation.clone(),
        config.gibberish.clone(),
        identifier.clone(),
    );
    (validator, identifier)
}

/// Collaborators are built once here and shared by every analysis.
fn build_pipeline(config: &GateConfig) -> Result<ReportBuilder> {
    let (validator, _) = build_validator(config);
    let client = Arc::new(
        InferenceClient::new(&config.inference).context("Failed to create inference client")?,
    );
    let gate = ConfidenceGate::from(&config.confidence);

    let sentiment = SentimentAnalyzer::new(
        validator.clone(),
        Arc::new(HttpSentimentClassifier::new(
            client.clone(),
            config.inference.sentiment_model.as_str(),
        )),
        gate,
    );
    let emotion = EmotionAnalyzer::new(
        validator,
        Arc::new(HttpEmotionClassifier::new(
            client,
            config.inference.emotion_model.as_str(),
        )),
        gate,
    );

    info!(
        endpoint = %config.inference.endpoint,
        threshold = gate.threshold(),
        "pipeline ready"
    );
    Ok(ReportBuilder::new(sentiment, emotion))
}

fn run_check(config: &GateConfig, text: &str, out: &OutputWriter) -> Result<()> {
    let (validator, identifier) = build_validator(config);
    let verdict = validator.validate(Some(text));
    let signals = validator.gibberish_detector().inspect(text);
    let (language, language_error) = match identifier.identify(text) {
        Ok(code) => (Some(code), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let report = CheckReport {
        valid: verdict.is_valid(),
        reason: verdict.reason().map(|r| r.as_str()),
        symbol_ratio: symbol_ratio(text),
        gibberish: &signals,
        language,
        language_error,
    };

    if out.is_json() {
        out.emit_json(&report, true)?;
        return Ok(());
    }

    out.section("Input check");
    match report.reason {
        None => out.success("valid"),
        Some(reason) => out.rejected(reason),
    }
    out.table(&[
        ("entropy", format!("{:.4} bits/char", signals.entropy)),
        ("vowel ratio", format_score(signals.vowel_ratio)),
        ("longest word run", signals.longest_letter_run.to_string()),
        ("symbol ratio", format!("{:.4}", report.symbol_ratio)),
        (
            "gibberish trigger",
            signals
                .trigger
                .map(|t| format!("{:?}", t))
                .unwrap_or_else(|| "none".to_string()),
        ),
        (
            "language",
            report
                .language
                .clone()
                .or_else(|| report.language_error.clone())
                .unwrap_or_default(),
        ),
    ]);
    Ok(())
}

fn print_sentiment(result: &SentimentResult, out: &OutputWriter) -> Result<()> {
    if out.is_json() {
        out.emit_json(result, true)?;
        return Ok(());
    }

    out.section("Sentiment");
    match (&result.label, &result.error) {
        (Some(label), None) => {
            out.success(label);
            out.table(&[("score", format_score(result.score))]);
        }
        (_, error) => out.rejected(error.as_deref().unwrap_or("rejected")),
    }
    Ok(())
}

fn print_emotion(result: &EmotionResult, out: &OutputWriter) -> Result<()> {
    if out.is_json() {
        out.emit_json(result, true)?;
        return Ok(());
    }

    out.section("Emotion");
    for emotion in Emotion::ALL {
        if let Some(score) = result.score(emotion) {
            out.score_bar(
                emotion.name(),
                score,
                30,
                result.dominant_emotion == Some(emotion),
            );
        }
    }
    match (result.dominant_emotion, &result.error) {
        (Some(dominant), None) => out.success(&format!("dominant emotion: {}", dominant)),
        (_, error) => out.rejected(error.as_deref().unwrap_or("rejected")),
    }
    Ok(())
}

fn run_batch(
    builder: &ReportBuilder,
    content: &str,
    mode: BatchMode,
    out: &OutputWriter,
) -> Result<()> {
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .collect();
    info!(lines = lines.len(), "starting batch");

    // Each line is an independent analysis; output keeps input order
    let records: Vec<(String, bool)> = lines
        .par_iter()
        .map(|&(line, text)| match mode {
            BatchMode::Sentiment => batch_record(line, builder.sentiment().analyze(Some(text))),
            BatchMode::Emotion => batch_record(line, builder.emotion().analyze(Some(text))),
            BatchMode::Analyze => batch_record(line, builder.build(Some(text))),
        })
        .collect::<Result<Vec<_>>>()?;

    let mut failures = 0usize;
    for (record, failed) in &records {
        if *failed {
            failures += 1;
        }
        println!("{}", record);
    }

    if failures > 0 {
        out.warning(&format!(
            "{} of {} lines failed to classify",
            failures,
            records.len()
        ));
    }
    info!(lines = records.len(), failures, "batch finished");
    Ok(())
}

/// Serialized record plus whether the classifier failed on this line
fn batch_record<T: Serialize>(
    line: usize,
    outcome: std::result::Result<T, sentigate::ClassifierError>,
) -> Result<(String, bool)> {
    let record = match outcome {
        Ok(result) => BatchRecord {
            line,
            result: Some(result),
            failure: None,
        },
        Err(e) => BatchRecord {
            line,
            result: None,
            failure: Some(e.to_string()),
        },
    };
    let failed = record.failure.is_some();
    Ok((serde_json::to_string(&record)?, failed))
}

fn run_config(action: ConfigAction, path: &Path, out: &OutputWriter) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = load_config(path)?;
            out.emit_json(&config, true)?;
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                );
            }
            GateConfig::default()
                .save_to(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            out.success(&format!("Wrote default config to {}", path.display()));
        }
    }
    Ok(())
}
