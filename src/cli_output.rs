// Mode-aware CLI output: colored for terminals, plain for pipes, JSON for agents
use colored::Colorize;
use serde::Serialize;
use std::io::{self, IsTerminal};

/// Output mode for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Colored output for an interactive terminal
    Human,
    /// Machine-readable JSON
    Json,
    /// Plain text without colors (for pipes/logs)
    Plain,
}

impl OutputMode {
    /// Pick a mode from the `--json` flag and the environment
    pub fn detect(json: bool) -> Self {
        Self::resolve(
            json,
            std::env::var_os("SENTIGATE_JSON").is_some(),
            io::stdout().is_terminal(),
        )
    }

    fn resolve(json_flag: bool, json_env: bool, terminal: bool) -> Self {
        if json_flag || json_env {
            Self::Json
        } else if !terminal {
            Self::Plain
        } else {
            Self::Human
        }
    }
}

pub struct OutputWriter {
    mode: OutputMode,
}

impl OutputWriter {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.mode, OutputMode::Json)
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        match self.mode {
            OutputMode::Human => {
                println!();
                println!("{}", title.cyan().bold());
                println!("{}", "═".repeat(title.chars().count()).cyan());
            }
            OutputMode::Plain => {
                println!();
                println!("{}", title);
                println!("{}", "=".repeat(title.chars().count()));
            }
            OutputMode::Json => {}
        }
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => println!("  {} {}", "✓".green(), message),
            OutputMode::Plain => println!("  [OK] {}", message),
            OutputMode::Json => {}
        }
    }

    /// Rejections go to stdout: they are a normal outcome, not a failure
    pub fn rejected(&self, message: &str) {
        match self.mode {
            OutputMode::Human => println!("  {} {}", "✗".red(), message),
            OutputMode::Plain => println!("  [REJECTED] {}", message),
            OutputMode::Json => {}
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Human => eprintln!("  {} {}", "⚠".yellow(), message),
            OutputMode::Plain => eprintln!("  [WARN] {}", message),
            OutputMode::Json => {}
        }
    }

    /// Print a key-value table
    pub fn table(&self, rows: &[(&str, String)]) {
        let max_key_len = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        match self.mode {
            OutputMode::Human => {
                for (key, value) in rows {
                    println!("  {:width$} │ {}", key.yellow(), value, width = max_key_len);
                }
            }
            OutputMode::Plain => {
                for (key, value) in rows {
                    println!("  {:width$} : {}", key, value, width = max_key_len);
                }
            }
            OutputMode::Json => {}
        }
    }

    /// Horizontal bar for a score in [0, 1]
    pub fn score_bar(&self, label: &str, score: f64, width: usize, highlight: bool) {
        let filled = ((score.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
        match self.mode {
            OutputMode::Human => {
                let bar = "█".repeat(filled);
                let bar = if highlight { bar.green() } else { bar.cyan() };
                println!(
                    "  {:>8} │{}{} {:.4}",
                    label,
                    bar,
                    "░".repeat(width - filled),
                    score
                );
            }
            OutputMode::Plain => {
                println!(
                    "  {:>8} |{}{} {:.4}",
                    label,
                    "#".repeat(filled),
                    "-".repeat(width - filled),
                    score
                );
            }
            OutputMode::Json => {}
        }
    }

    /// Emit a value as JSON; `pretty` for single records, compact for line streams
    pub fn emit_json<T: Serialize>(&self, value: &T, pretty: bool) -> serde_json::Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{}", json);
        Ok(())
    }
}

/// Format an optional score for display
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.4}", s),
        None => "—".to_string(),
    }
}
