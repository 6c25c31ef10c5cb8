//! Ruleflow CLI - trace how a rule tree is scoped and interpreted

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ruleflow::{
    walk, Context, ContextConfig, JsonFileStore, MemoryStore, Node, ResultStore, Variable,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ruleflow")]
#[command(about = "Trace rule tree interpretation: scopes, statements and execution records", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a JSON syntax tree and report each interpreted node
    Trace {
        /// Path to the tree document
        path: PathBuf,

        /// Re-read children on every access
        #[arg(long)]
        no_cache: bool,

        /// Do not attach the trace logger
        #[arg(short, long)]
        quiet: bool,

        /// Directory to store execution records in
        #[arg(long)]
        records: Option<PathBuf>,

        /// Run argument as name=json (plain text is taken as a string)
        #[arg(long = "arg", value_name = "NAME=VALUE")]
        args: Vec<String>,
    },

    /// List stored execution records
    Records {
        /// Record directory
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Trace {
            path,
            no_cache,
            quiet,
            records,
            args,
        } => {
            let config = ContextConfig::from_env()
                .with_logging(!quiet)
                .with_cache(!no_cache);
            let arguments = args
                .iter()
                .map(|raw| parse_argument(raw))
                .collect::<Result<Vec<_>>>()?;
            let tree = Node::from_file(&path)?;
            let program = path.file_stem().map(|s| s.to_string_lossy().into_owned());

            match records {
                Some(dir) => trace(JsonFileStore::new(dir)?, config, program, &tree, arguments),
                None => trace(MemoryStore::new(), config, program, &tree, arguments),
            }
        }

        Commands::Records { dir } => {
            let store = JsonFileStore::new(&dir)?;
            let records = store.list()?;
            if records.is_empty() {
                println!("{}", "No execution records".yellow());
            }
            for record in records {
                let status = if record.is_finished() {
                    "finished".green()
                } else {
                    "in progress".yellow()
                };
                println!(
                    "{}  {}  {}  {}",
                    record.id.to_string().bold(),
                    record.start_time.to_rfc3339(),
                    record.program.as_deref().unwrap_or("-"),
                    status
                );
            }
            Ok(())
        }
    }
}

fn trace<S: ResultStore + 'static>(
    store: S,
    config: ContextConfig,
    program: Option<String>,
    tree: &Node,
    arguments: Vec<(String, Variable)>,
) -> Result<()> {
    let mut ctx: Context<Node> = Context::for_program(config, store, program)?;
    ctx.bind_arguments(arguments)?;

    let mut visited = 0usize;
    walk(&mut ctx, tree, &mut |_: &mut Context<Node>, _: &Node| {
        visited += 1;
        Ok(())
    })?;

    let metrics = ctx.cache_metrics();
    let record = ctx.finish()?;

    eprintln!(
        "{} {} statements in {} nodes (cache: {} hits, {} misses)",
        "✓ Traced".green().bold(),
        visited,
        tree.count(),
        metrics.hits,
        metrics.misses
    );
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Parse `name=value`, reading the value as JSON when possible
fn parse_argument(raw: &str) -> Result<(String, Variable)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("Argument must be NAME=VALUE: {}", raw))?;
    let value = match serde_json::from_str::<serde_json::Value>(value) {
        Ok(json) => Variable::from(json),
        Err(_) => Variable::String(value.to_string()),
    };
    Ok((name.to_string(), value))
}
