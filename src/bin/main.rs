use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use crossterm::{cursor::MoveTo, execute, terminal::{Clear, ClearType}};
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use triage_core::core::engine::Provenance;
use triage_core::{Level, TriageConfig, TriageEngine};

#[derive(Parser)]
#[command(name = "triage_engine", version, about = "IT support ticket triage")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact path (overrides config and TRIAGE_MODEL_PATH)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Never train; fail if the artifact is missing
    #[arg(long, global = true)]
    no_train: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retrain from the built-in corpus and overwrite the artifact
    Train,
    /// Classify one ticket
    Classify {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what the current artifact contains
    Info,
    /// Interactive classification loop
    Repl,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = TriageConfig::load(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        config.model_path = model;
    }
    if cli.no_train {
        config.train_if_missing = false;
    }

    match cli.command {
        Command::Train => train(&config),
        Command::Classify { title, description, json } => {
            let engine = TriageEngine::load_or_train(&config);
            let result = engine.classify(&title, &description)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Category:   {}", result.category);
                println!("Priority:   {}", result.priority);
                println!("Confidence: {}", result.confidence);
            }
            Ok(())
        }
        Command::Info => info(&config),
        Command::Repl => repl(&TriageEngine::load_or_train(&config)),
    }
}

fn train(config: &TriageConfig) -> Result<()> {
    let engine = TriageEngine::train_and_save(config)?;
    let model = engine.model().context("training produced no model")?;
    let summary = model.summary();

    println!(
        "Trained on {} examples ({} held out), {} features, {:?} solver.",
        summary.train_samples,
        summary.test_samples,
        model.vectorizer().n_features(),
        summary.fit.solver
    );
    if let Some(report) = &summary.evaluation {
        println!("\nModel Performance:\n{report}\n");
    }
    match engine.provenance() {
        Some(Provenance::Trained { persisted: true }) => {
            println!("Model saved to '{}'", config.model_path.display());
            Ok(())
        }
        _ => bail!("model could not be saved to '{}'", config.model_path.display()),
    }
}

fn info(config: &TriageConfig) -> Result<()> {
    let engine = TriageEngine::load_or_train(config);
    let Some(model) = engine.model() else {
        bail!("{}", engine.unavailable_reason().unwrap_or("model unavailable"));
    };
    let summary = model.summary();
    println!("Artifact:   {}", config.model_path.display());
    println!("Source:     {:?}", engine.provenance());
    println!("Features:   {}", model.vectorizer().n_features());
    println!("Classes:    {:?}", model.classifier().classes());
    println!("Solver:     {:?} (converged: {})", summary.fit.solver, summary.fit.converged);
    println!("Samples:    {} train / {} test", summary.train_samples, summary.test_samples);
    if let Some(report) = &summary.evaluation {
        println!("Accuracy:   {:.3}", report.accuracy);
    }
    Ok(())
}

fn repl(engine: &TriageEngine) -> Result<()> {
    if !engine.is_ready() {
        bail!("{}", engine.unavailable_reason().unwrap_or("model unavailable"));
    }

    let mut last: Option<(String, String)> = None;
    loop {
        print_ui(engine, last.as_ref())?;

        let title = prompt("Title")?;
        if title == "exit" {
            break;
        }
        let description = prompt("Description")?;
        last = Some((title, description));
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}> ");
    stdout().flush()?;
    let mut input = String::new();
    if stdin().read_line(&mut input)? == 0 {
        return Ok("exit".to_string());
    }
    Ok(input.trim().to_string())
}

fn print_ui(engine: &TriageEngine, last: Option<&(String, String)>) -> Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("Ticket Triage (interactive)");
    println!("---------------------------------------------------------------");
    println!("Enter a title and a description. Type 'exit' as the title to quit.\n");

    if let Some((title, description)) = last {
        let result = engine.classify(title, description)?;
        let scores = engine.scores(&format!("{title} {description}"))?;
        println!("Ticket: [{title}] {description}");
        println!("  Category:   {}", result.category.to_string().bold());
        println!("  Priority:   {}", paint(result.priority));
        println!("  Confidence: {}", paint(result.confidence));
        println!("\nDecision scores:");
        for (category, score) in &scores.0 {
            println!("  {:>16}: {:+.3}", category.label(), score);
        }
        println!();
    }
    Ok(())
}

fn paint(level: Level) -> String {
    match level {
        Level::High => level.as_str().red().bold().to_string(),
        Level::Medium => level.as_str().yellow().to_string(),
        Level::Low => level.as_str().green().to_string(),
    }
}
