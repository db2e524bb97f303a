use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wowdb_core::models::{LootSource, ResolvedLootItem};
use wowdb_core::{
    BrowserConfig, DROPPED_BY_LIMIT, Database, LootResolver, LootSort, SetBonusResolver,
    TooltipComposer, dropped_by, sort_loot,
};

const DEFAULT_LOG_FILE: &str = "/tmp/wowdb.log";

#[derive(Parser)]
#[command(
    name = "wowdb",
    version = "0.1.0",
    about = "Browse World of Warcraft loot tables, items, item sets and spells",
    long_about = None
)]
struct Cli {
    /// Path to SQLite database file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to log file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Verbosity level (repeat for more verbose output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the loot dropped by a creature, object or container item
    Loot {
        /// creature, object or item
        #[arg(long)]
        source: LootSource,
        /// Entity entry id
        #[arg(long)]
        entry: i32,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
        /// chance, quality or name (defaults to the configured order)
        #[arg(long)]
        sort: Option<LootSort>,
    },

    /// Resolve a primary loot table by its table id
    LootTable {
        #[arg(long)]
        source: LootSource,
        #[arg(long)]
        table: i32,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
        #[arg(long)]
        sort: Option<LootSort>,
    },

    /// Resolve loot for several entities in parallel
    BatchLoot {
        #[arg(long)]
        source: LootSource,
        /// Comma-separated entry ids
        #[arg(long, value_delimiter = ',')]
        entries: Vec<i32>,
    },

    /// List creatures whose loot table drops an item
    DroppedBy {
        #[arg(long)]
        item: i32,
        #[arg(long, default_value_t = DROPPED_BY_LIMIT)]
        limit: usize,
    },

    /// Show an item tooltip
    Item {
        #[arg(long)]
        id: i32,
        /// Print tooltip lines instead of JSON
        #[arg(long, default_value_t = false)]
        text: bool,
    },

    /// Show an item set with its bonuses
    ItemSet {
        #[arg(long)]
        id: i32,
    },

    /// Show a spell tooltip
    Spell {
        #[arg(long)]
        id: i32,
    },

    /// Search items by name
    Search {
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn setup_logging(verbose: u8, log_file: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let filter_level = match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(filter_level.into());

    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or(Path::new(".")),
        log_file.file_name().unwrap_or(std::ffi::OsStr::new("wowdb.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::Layer::new().with_writer(std::io::stderr).with_ansi(true))
        .with(fmt::Layer::new().with_writer(non_blocking).with_ansi(false));

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

fn print_loot(loot: &[ResolvedLootItem], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(loot)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for item in loot {
                writer.serialize(item)?;
            }
            writer.flush()?;
        }
        OutputFormat::Text => {
            for item in loot {
                let count = if item.min_count == item.max_count {
                    format!("x{}", item.min_count)
                } else {
                    format!("x{}-{}", item.min_count, item.max_count)
                };
                println!("{:>9.4}%  {} ({}) [{}]", item.chance, item.item_name, count, item.item_id);
            }
        }
    }
    Ok(())
}

/// Applies the requested ordering and the configured row limit.
fn finish_loot(mut loot: Vec<ResolvedLootItem>, sort: LootSort, limit: Option<usize>) -> Vec<ResolvedLootItem> {
    sort_loot(&mut loot, sort);
    if let Some(limit) = limit {
        loot.truncate(limit);
    }
    loot
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BrowserConfig::from_file(path)?,
        None => BrowserConfig::default(),
    };

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.log_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let _guard = setup_logging(cli.verbose, &log_file)?;

    info!("Starting wowdb CLI");

    let db_path = config.database_path(cli.database.clone());
    if !db_path.exists() {
        anyhow::bail!("Database not found at {:?}", db_path);
    }
    let db = Database::new(&db_path)?;
    info!("Using database {:?}", db_path);

    match cli.command {
        Commands::Loot { source, entry, format, sort } => {
            let sort = match sort {
                Some(sort) => sort,
                None => config.loot.sort_order()?,
            };
            let loot = LootResolver::new(&db, source).resolve_entity(entry)?;
            info!("Resolved {} items for {:?} {}", loot.len(), source, entry);
            print_loot(&finish_loot(loot, sort, config.loot.limit), format)?;
        }
        Commands::LootTable { source, table, format, sort } => {
            let sort = match sort {
                Some(sort) => sort,
                None => config.loot.sort_order()?,
            };
            let loot = LootResolver::new(&db, source).resolve(table)?;
            info!("Resolved {} items from {} {}", loot.len(), source.table_name(), table);
            print_loot(&finish_loot(loot, sort, config.loot.limit), format)?;
        }
        Commands::BatchLoot { source, entries } => {
            let sort = config.loot.sort_order()?;

            let results: BTreeMap<i32, Vec<ResolvedLootItem>> = entries
                .par_iter()
                .filter_map(|&entry| {
                    match LootResolver::new(&db, source).resolve_entity(entry) {
                        Ok(loot) => Some((entry, finish_loot(loot, sort, config.loot.limit))),
                        Err(e) => {
                            tracing::warn!("Failed to resolve loot for {}: {}", entry, e);
                            None
                        }
                    }
                })
                .collect();

            info!("Resolved loot for {} of {} entries", results.len(), entries.len());
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::DroppedBy { item, limit } => {
            let drops = dropped_by(&db, item, limit)?;
            info!("Item {} is dropped by {} creatures", item, drops.len());
            println!("{}", serde_json::to_string_pretty(&drops)?);
        }
        Commands::Item { id, text } => {
            let Some(tooltip) = TooltipComposer::new(&db).compose_by_id(id)? else {
                anyhow::bail!("Item {} not found", id);
            };
            if text {
                for line in tooltip.lines() {
                    println!("{}", line);
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&tooltip)?);
            }
        }
        Commands::ItemSet { id } => {
            let Some(set) = SetBonusResolver::new(&db).resolve(id)? else {
                anyhow::bail!("Item set {} not found", id);
            };
            println!("{}", serde_json::to_string_pretty(&set)?);
        }
        Commands::Spell { id } => {
            let Some(spell) = TooltipComposer::new(&db).compose_spell(id)? else {
                anyhow::bail!("Spell {} not found", id);
            };
            println!("{}", serde_json::to_string_pretty(&spell)?);
        }
        Commands::Search { query, limit } => {
            let items = db.search_items(&query, limit)?;
            info!("Found {} items matching {:?}", items.len(), query);
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }

    Ok(())
}
