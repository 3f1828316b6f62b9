use anyhow::{bail, Result};
use biblio_core::fixtures::load_documents;
use biblio_core::project::project;
use biblio_core::{compile, MemoryStore, SearchRequest, StoredDocument};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "biblio-explain")]
#[command(about = "Inspect compiled search pipelines and projected records offline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the count and result pipelines for a set of query parameters
    Compile {
        /// Query parameter as key=value, repeatable
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Print the API form of stored records
    Project {
        /// Input path (file or directory)
        #[arg(long)]
        input: PathBuf,
    },
    /// Run a search over stored records held in memory
    Search {
        /// Input path (file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Query parameter as key=value, repeatable
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Compile { params } => {
            let request = SearchRequest::from_params(&parse_params(&params)?)?;
            let compiled = compile(&request);
            json!({ "count": compiled.count.to_documents(), "results": compiled.results.to_documents() })
        }
        Commands::Project { input } => {
            let projected: Vec<_> = collect_documents(&input)?.into_iter().map(project).collect();
            serde_json::to_value(projected)?
        }
        Commands::Search { input, params } => {
            let store = MemoryStore::new(collect_documents(&input)?);
            let page = futures::executor::block_on(biblio_core::search(&store, &parse_params(&params)?))?;
            serde_json::to_value(page)?
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_params(raw: &[String]) -> Result<HashMap<String, String>> {
    let mut params = HashMap::new();
    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("parameter {pair:?} is not KEY=VALUE");
        };
        params.insert(key.trim().to_string(), value.to_string());
    }
    Ok(params)
}

/// Reads every `.json`/`.jsonl` file under `input`, in path order.
fn collect_documents(input: &Path) -> Result<Vec<StoredDocument>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("{} does not exist", input.display());
    }

    let mut documents = Vec::new();
    for file in &files {
        let loaded = load_documents(file)?;
        tracing::debug!(path = %file.display(), documents = loaded.len(), "loaded records");
        documents.extend(loaded);
    }
    tracing::info!(files = files.len(), documents = documents.len(), "ingested records");
    Ok(documents)
}
