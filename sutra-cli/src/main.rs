use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use sutra_core::config::Config;
use sutra_core::{document, ChatManager, RagEngine};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sutra")]
#[command(about = "Chat with a single reference document", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[arg(short, long, help = "Document to load instead of the configured one")]
    document: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Interactive question-and-answer session")]
    Chat,

    #[command(about = "Ask a single question")]
    Ask {
        #[arg(required = true, num_args = 1.., help = "The question to ask")]
        question: Vec<String>,
    },

    #[command(about = "Show the pages retrieved for a query, without asking the model")]
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        #[arg(short = 'n', long, help = "Number of pages to show (defaults to retrieval.top_n)")]
        top_n: Option<usize>,
    },

    #[command(about = "Show current configuration")]
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials usually live in a local .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sutra_core=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config, cli.document.as_deref())?;

    match cli.command {
        Commands::Chat => chat(config).await,
        Commands::Ask { question } => ask(config, &question.join(" ")).await,
        Commands::Search { query, top_n } => search(&config, &query.join(" "), top_n),
        Commands::Show => show_config(&config),
    }
}

fn load_config(path: &Path, document: Option<&Path>) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load(path).with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Config::default()
    };

    if let Some(document) = document {
        config.document.path = document.display().to_string();
    }

    Ok(config)
}

fn open_session(config: Config) -> Result<ChatManager> {
    let path = config.document.path.clone();
    println!("{} Loading {}...", "→".blue(), path);

    let manager = ChatManager::open(config).context("Cannot start a session")?;
    println!(
        "{} Indexed {} pages ({} terms)",
        "✓".green().bold(),
        manager.engine().count(),
        manager.engine().vector_space().dimensions()
    );
    println!();
    Ok(manager)
}

/// Prints the part of `partial` not yet shown.
fn print_new_text(partial: &str, printed: &mut usize) {
    if let Some(new_text) = partial.get(*printed..) {
        print!("{new_text}");
        let _ = io::stdout().flush();
    }
    *printed = partial.len();
}

async fn answer(manager: &mut ChatManager, question: &str) -> Result<()> {
    let label = manager.config().persona.name.clone();
    print!("{} ", format!("{label}:").bold().cyan());
    let _ = io::stdout().flush();

    let mut printed = 0;
    let outcome = manager
        .query_stream(question, |partial| print_new_text(partial, &mut printed))
        .await;
    println!();

    outcome.map(|_| ()).map_err(Into::into)
}

async fn chat(config: Config) -> Result<()> {
    let mut manager = open_session(config)?;
    println!(
        "Ask your question. Type {} or {} to leave.",
        "exit".bold(),
        "quit".bold()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\n{} ", "You:".bold().green());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;
        let question = line.trim();

        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }

        if let Err(e) = answer(&mut manager, question).await {
            println!("{} {:#}", "❌ Error:".red().bold(), e);
        }
    }

    if !manager.conversation().is_empty() {
        println!();
        println!("{}", "Transcript:".bold().green());
        for turn in manager.history() {
            println!("{turn}");
        }
    }

    Ok(())
}

async fn ask(config: Config, question: &str) -> Result<()> {
    let mut manager = open_session(config)?;
    answer(&mut manager, question).await
}

fn search(config: &Config, query: &str, top_n: Option<usize>) -> Result<()> {
    let document = document::load(&config.document.path).context("Failed to load document")?;
    let engine = RagEngine::new(document).context("Failed to index document")?;

    let top_n = top_n.unwrap_or(config.retrieval.top_n);
    let retrieval = engine.retrieve(query, top_n);

    println!("{}", format!("Top {} pages for: {query}", retrieval.len()).bold().green());
    println!();
    for (rank, result) in retrieval.results.iter().enumerate() {
        let text = engine.page(result.page_index).map(|p| p.text()).unwrap_or_default();
        println!(
            "  {} page {} (score {:.4})",
            format!("[{}]", rank + 1).cyan(),
            result.page_index.to_string().bold(),
            result.score
        );
        println!("      {}", preview(text, 100).dimmed());
    }

    if retrieval.results.iter().all(|r| r.score == 0.0) {
        println!();
        println!("{}", "No page shares a term with the query.".yellow());
    }

    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", "Current Configuration:".bold().green());
    println!();
    println!("{}", "LLM:".bold());
    println!("  Model:          {}", config.llm.model.cyan());
    println!("  Base URL:       {}", config.llm.base_url);
    println!("  Temperature:    {}", config.llm.temperature);
    println!("  Max Tokens:     {}", config.llm.max_tokens);
    println!("  Top P:          {}", config.llm.top_p);
    let key_state = if config.api_key().is_some() {
        "set".green()
    } else {
        "missing".red()
    };
    println!("  API Key ({}): {}", config.llm.api_key_env, key_state);
    println!();
    println!("{}", "Document:".bold());
    println!("  Path:           {}", config.document.path.cyan());
    println!("  Top N:          {}", config.retrieval.top_n);
    println!();
    println!("{}", "Persona:".bold());
    println!("  Name:           {}", config.persona.name);
    println!("  Source Title:   {}", config.persona.source_title);
    println!();
    println!("{}", "As YAML:".bold());
    print!("{}", serde_yaml::to_string(config).context("Failed to serialize config")?);

    Ok(())
}

/// First `max` characters of `text` on one line.
fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{cut}…")
}
