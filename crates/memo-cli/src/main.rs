// ============================================================================
// memo — command line front end for the agent memory stores
// ============================================================================
// Usage:
//   memo remember "text" [--meta key=value]...   Save to semantic memory
//   memo search "query" [-n 5]                   Search semantic memory
//   memo forget --id ID | --query TEXT           Forget a semantic memory
//   memo checkpoint-semantic                     Snapshot the Qdrant collection
//   memo note write|read|list|forget ...         Markdown note memory
//   memo fact remember|recall|forget|list|checkpoint ...   Key/value facts
// ============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use memo_core::memory::{Embedder, EmbeddingService, QdrantIndex, SemanticMemory};
use memo_core::{FactStore, MemoConfig, NoteStore, Payload};
use tracing::debug;

/// Agent memory: semantic search, exact facts and markdown notes
#[derive(Parser)]
#[command(name = "memo", version, about = "Semantic, fact and note memory for agents")]
struct Cli {
    /// Embed in process with all-MiniLM-L6-v2 instead of calling EMBED_API_URL
    #[arg(long, global = true)]
    local: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save text to semantic memory for later contextual search
    Remember {
        /// The text content to remember
        text: String,

        /// Metadata as key=value (value parsed as JSON when possible)
        #[arg(long = "meta", value_parser = parse_meta)]
        meta: Vec<(String, serde_json::Value)>,
    },

    /// Search semantic memory for information relevant to a query
    Search {
        query: String,

        /// Number of results to return
        #[arg(short = 'n', long = "results", default_value = "5", value_parser = clap::value_parser!(u64).range(1..=20))]
        results: u64,
    },

    /// Delete a memory by ID or by the most similar match to a query
    Forget(ForgetArgs),

    /// Trigger a manual snapshot of the semantic memory (Qdrant)
    CheckpointSemantic,

    /// Check that Qdrant is reachable
    Health,

    /// Markdown note memory
    #[command(subcommand)]
    Note(NoteCommands),

    /// Key/value fact memory
    #[command(subcommand)]
    Fact(FactCommands),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ForgetArgs {
    /// The specific ID of the memory to forget
    #[arg(long)]
    id: Option<String>,

    /// A query to find and forget the most similar memory
    #[arg(long)]
    query: Option<String>,
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Write a note (stored as <folder>/<name>.md)
    Write {
        folder: String,
        name: String,
        content: String,
    },
    /// Read a note
    Read { folder: String, name: String },
    /// List notes in a folder
    List { folder: String },
    /// Delete a note
    Forget { folder: String, name: String },
}

#[derive(Subcommand)]
enum FactCommands {
    /// Save a fact as a key-value pair for exact recall
    Remember { key: String, value: String },
    /// Retrieve a fact by its key
    Recall { key: String },
    /// Delete a fact
    Forget { key: String },
    /// List all known facts
    List,
    /// Write a JSON backup of all facts
    Checkpoint,
}

fn parse_meta(raw: &str) -> std::result::Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err("metadata key must not be empty".to_string());
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn init_logging(config: &MemoConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn embedder(config: &MemoConfig, local: bool) -> Result<Arc<dyn Embedder>> {
    if local {
        #[cfg(feature = "local-embeddings")]
        {
            return Ok(Arc::new(memo_core::memory::LocalEmbedder::new()));
        }
        #[cfg(not(feature = "local-embeddings"))]
        anyhow::bail!("--local requires memo to be built with the `local-embeddings` feature");
    }
    Ok(Arc::new(EmbeddingService::from_config(config)))
}

fn semantic(config: &MemoConfig, local: bool) -> Result<SemanticMemory> {
    let index = QdrantIndex::from_config(config)?;
    Ok(SemanticMemory::new(
        embedder(config, local)?,
        Arc::new(index),
        config.collection.clone(),
    ))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match MemoConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    init_logging(&config);
    debug!("Loaded configuration: {:?}", config);

    if let Err(e) = run(cli, &config).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &MemoConfig) -> Result<()> {
    match cli.command {
        Commands::Remember { text, meta } => cmd_remember(config, cli.local, text, meta).await,
        Commands::Search { query, results } => cmd_search(config, cli.local, &query, results).await,
        Commands::Forget(args) => cmd_forget(config, cli.local, args).await,
        Commands::CheckpointSemantic => cmd_checkpoint_semantic(config).await,
        Commands::Health => cmd_health(config).await,
        Commands::Note(command) => cmd_note(config, command).await,
        Commands::Fact(command) => cmd_fact(config, command),
    }
}

async fn cmd_remember(
    config: &MemoConfig,
    local: bool,
    text: String,
    meta: Vec<(String, serde_json::Value)>,
) -> Result<()> {
    let metadata: Payload = meta.into_iter().collect();
    let memory = semantic(config, local)?;
    let id = memory
        .remember(&text, metadata)
        .await
        .context("Error saving to semantic memory")?;

    debug!("Semantic memory added: {}", text.chars().take(50).collect::<String>());
    println!("Successfully saved to semantic memory. (id: {})", id);
    Ok(())
}

async fn cmd_search(config: &MemoConfig, local: bool, query: &str, results: u64) -> Result<()> {
    let memory = semantic(config, local)?;
    let result = memory
        .search(query, results)
        .await
        .context("Error searching memory")?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_forget(config: &MemoConfig, local: bool, args: ForgetArgs) -> Result<()> {
    let memory = semantic(config, local)?;
    match (args.id, args.query) {
        (Some(id), _) => {
            memory
                .forget(&id)
                .await
                .context("Error forgetting memory")?;
            println!("Successfully forgot memory with ID {}", id);
        }
        (None, Some(query)) => {
            let count = memory
                .forget_by_query(&query)
                .await
                .context("Error forgetting memory")?;
            if count > 0 {
                println!("Successfully forgot memory similar to: {}", query);
            } else {
                println!("No similar memory found to forget.");
            }
        }
        (None, None) => anyhow::bail!("Please provide either an 'id' or a 'query'."),
    }
    Ok(())
}

async fn cmd_checkpoint_semantic(config: &MemoConfig) -> Result<()> {
    // Snapshots never embed, so the provider choice is irrelevant
    let memory = semantic(config, false)?;
    let name = memory
        .create_snapshot()
        .await
        .context("Error creating semantic snapshot")?;
    println!("Semantic snapshot created: {}", name);
    Ok(())
}

async fn cmd_health(config: &MemoConfig) -> Result<()> {
    let index = QdrantIndex::from_config(config)?;
    if index.health_check().await {
        println!("Qdrant at {} is healthy", config.qdrant_url);
        Ok(())
    } else {
        anyhow::bail!("Qdrant at {} is unreachable", config.qdrant_url)
    }
}

async fn cmd_note(config: &MemoConfig, command: NoteCommands) -> Result<()> {
    let notes = NoteStore::new(&config.notes_dir);
    match command {
        NoteCommands::Write {
            folder,
            name,
            content,
        } => {
            notes
                .write(&folder, &name, &content)
                .await
                .context("Error saving note")?;
            println!("Successfully saved note to {}/{}.md", folder, name);
        }
        NoteCommands::Read { folder, name } => {
            match notes.read(&folder, &name).await.context("Error reading note")? {
                Some(text) => println!("{}", text),
                None => anyhow::bail!("Note '{}' not found in folder '{}'.", name, folder),
            }
        }
        NoteCommands::List { folder } => {
            let names = notes.list(&folder).await.context("Error listing notes")?;
            if names.is_empty() {
                println!("No notes found in folder '{}'.", folder);
            } else {
                println!("Notes in '{}':\n- {}", folder, names.join("\n- "));
            }
        }
        NoteCommands::Forget { folder, name } => {
            notes
                .delete(&folder, &name)
                .await
                .context("Error deleting note")?;
            println!("Successfully deleted note {}/{}.md", folder, name);
        }
    }
    Ok(())
}

fn cmd_fact(config: &MemoConfig, command: FactCommands) -> Result<()> {
    let path = config.resolve_facts_db_path()?;
    let facts = FactStore::open(&path).context("Error opening fact database")?;

    match command {
        FactCommands::Remember { key, value } => {
            facts.remember(&key, &value).context("Error saving fact")?;
            println!("Successfully saved fact: {}", key);
        }
        FactCommands::Recall { key } => {
            match facts.recall(&key).context("Error recalling fact")? {
                Some(fact) => println!(
                    "Fact \"{}\": {}\nLast updated: {}",
                    key, fact.value, fact.updated_at
                ),
                None => anyhow::bail!("Fact \"{}\" not found.", key),
            }
        }
        FactCommands::Forget { key } => {
            facts.forget(&key).context("Error forgetting fact")?;
            println!("Successfully forgot fact: {}", key);
        }
        FactCommands::List => {
            let all = facts.list().context("Error listing facts")?;
            if all.is_empty() {
                println!("No facts found in the store.");
            } else {
                let keys: Vec<&str> = all.keys().map(String::as_str).collect();
                println!("Stored facts:\n- {}", keys.join("\n- "));
            }
        }
        FactCommands::Checkpoint => {
            let file = facts.checkpoint().context("Error triggering checkpoint")?;
            println!("Manual checkpoint written to {}", file.display());
        }
    }
    Ok(())
}
