// src/main.rs
use clap::{Args, Parser, Subcommand};
use halftime_exports::extractors::{ConsensusOdds, SectionedCsvParser, TableBlock};
use halftime_exports::pipeline;
use halftime_exports::storage::StorageManager;
use halftime_exports::supabase::{DocumentSource, ExportQuery, ExportSummary, MemorySource, SupabaseClient, SupabaseConfig};
use halftime_exports::utils::{self, AppError};
use std::path::PathBuf;

// Key a local file is stored under in the in-memory source
const LOCAL_DOCUMENT_ID: &str = "local";

/// Command Line Interface for halftime export documents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Supabase project URL (falls back to the demo project)
    #[arg(long, env = "SUPABASE_URL", global = true)]
    url: Option<String>,

    /// Supabase API key (falls back to the demo anon key)
    #[arg(long, env = "SUPABASE_KEY", global = true, hide_env_values = true)]
    key: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List exported games
    List(FilterArgs),
    /// Show the Game Metadata section of one export
    Metadata(DocumentArgs),
    /// Show consensus and sportsbook odds of one export
    Odds(DocumentArgs),
    /// Show the play-by-play table of one export
    Plays {
        #[command(flatten)]
        document: DocumentArgs,

        /// Number of plays to print
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Save play-by-play CSV and parsed metadata JSON for matching games
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output directory for extracted content
        #[arg(short, long, default_value = "./output")]
        output_dir: String,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Only this game
    #[arg(long)]
    game_id: Option<String>,

    #[arg(long)]
    year: Option<i32>,

    #[arg(long)]
    week: Option<i32>,

    /// Substring of either team name
    #[arg(long)]
    team: Option<String>,

    /// Only successfully emailed exports
    #[arg(long)]
    successful: bool,
}

impl FilterArgs {
    fn to_query(&self) -> ExportQuery {
        let mut query = ExportQuery::new();
        if let Some(game_id) = &self.game_id {
            query = query.game_id(game_id);
        }
        if let Some(year) = self.year {
            query = query.year(year);
        }
        if let Some(week) = self.week {
            query = query.week(week);
        }
        if let Some(team) = &self.team {
            query = query.team(team);
        }
        if self.successful {
            query = query.successful_only();
        }
        query
    }
}

#[derive(Args, Debug)]
struct DocumentArgs {
    /// Game to fetch from the exports table
    #[arg(long, required_unless_present = "file", conflicts_with = "file")]
    game_id: Option<String>,

    /// Parse a local export file instead
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
enum View {
    Metadata,
    Odds,
    Plays { limit: usize },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(if cli.verbose { "debug" } else { "info" });
    tracing::debug!("Parsed arguments: {:?}", cli.command);

    let parser = SectionedCsvParser::new();

    match &cli.command {
        Command::List(filters) => {
            let client = connect(&cli)?;
            list(&client, filters).await
        }
        Command::Metadata(args) => run_view(&cli, &parser, args, View::Metadata).await,
        Command::Odds(args) => run_view(&cli, &parser, args, View::Odds).await,
        Command::Plays { document, limit } => {
            run_view(&cli, &parser, document, View::Plays { limit: *limit }).await
        }
        Command::Export { filters, output_dir } => {
            let client = connect(&cli)?;
            export(&client, &parser, filters, output_dir).await
        }
    }
}

fn connect(cli: &Cli) -> Result<SupabaseClient, AppError> {
    let config = SupabaseConfig::resolve(cli.url.clone(), cli.key.clone())?;
    tracing::debug!("Using {:?}", config);
    Ok(SupabaseClient::new(config)?)
}

async fn list(client: &SupabaseClient, filters: &FilterArgs) -> Result<(), AppError> {
    let rows = client.list_exports(&filters.to_query()).await?;
    println!("Found {} games", rows.len());
    for row in &rows {
        let summary = ExportSummary::from(row);
        println!("  - {}  ({}, game {})", summary, summary.csv_filename, summary.game_id);
    }
    Ok(())
}

async fn run_view(cli: &Cli, parser: &SectionedCsvParser, args: &DocumentArgs, view: View) -> Result<(), AppError> {
    if let Some(path) = &args.file {
        let text = std::fs::read_to_string(path)?;
        tracing::info!("Read {} bytes from {}", text.len(), path.display());
        let source = MemorySource::new().with_document(LOCAL_DOCUMENT_ID, text);
        return show(&source, parser, LOCAL_DOCUMENT_ID, view).await;
    }

    let game_id = args
        .game_id
        .as_deref()
        .ok_or_else(|| AppError::Config("either --game-id or --file is required".to_string()))?;
    let client = connect(cli)?;
    show(&client, parser, game_id, view).await
}

async fn show<S: DocumentSource>(source: &S, parser: &SectionedCsvParser, game_id: &str, view: View) -> Result<(), AppError> {
    if let View::Plays { limit } = view {
        let Some(table) = pipeline::load_play_by_play(source, parser, game_id).await? else {
            println!("Could not find 'Play-by-Play Data' section");
            return Ok(());
        };
        println!("Loaded {} plays", table.len());
        println!("Columns: {}", table.columns.join(", "));
        for record in table.records.iter().take(limit) {
            println!("  {}", record.join(" | "));
        }
        return Ok(());
    }

    let Some(document) = pipeline::fetch_parsed(source, parser, game_id).await? else {
        println!("No CSV content found for game_id: {}", game_id);
        return Ok(());
    };

    match view {
        View::Metadata => match &document.metadata {
            Some(pairs) => {
                for (field, value) in pairs {
                    println!("  {}: {}", field, value);
                }
            }
            None => println!("No 'Game Metadata' section found"),
        },
        View::Odds => match &document.betting_odds {
            Some(odds) if !odds.is_empty() => {
                print_consensus("Consensus", odds.consensus.as_ref());
                print_block("Sportsbooks (Full Game)", odds.sportsbooks.as_ref());
                print_consensus("Second Half Consensus", odds.second_half_consensus.as_ref());
                print_block("Sportsbooks (Second Half)", odds.second_half_sportsbooks.as_ref());
            }
            Some(_) => println!("'Betting Odds' section has no odds"),
            None => println!("No 'Betting Odds' section found"),
        },
        View::Plays { .. } => {}
    }
    Ok(())
}

fn print_consensus(title: &str, consensus: Option<&ConsensusOdds>) {
    let Some(consensus) = consensus else { return };
    println!("{}", title);
    for (key, value) in consensus.iter() {
        println!("  {}: {}", key, value);
    }
}

fn print_block(title: &str, block: Option<&TableBlock>) {
    let Some(block) = block else { return };
    println!("{} ({} rows)", title, block.rows.len());
    println!("  {}", block.header);
    for row in &block.rows {
        println!("  {}", row);
    }
}

async fn export(
    client: &SupabaseClient,
    parser: &SectionedCsvParser,
    filters: &FilterArgs,
    output_dir: &str,
) -> Result<(), AppError> {
    let storage = StorageManager::new(output_dir)?;
    let rows = client.list_exports(&filters.to_query()).await?;
    tracing::info!("Found {} exports to process", rows.len());

    let mut success_count = 0;
    let mut failure_count = 0;

    for row in &rows {
        let summary = ExportSummary::from(row);
        let Some(text) = row.csv_content.as_deref() else {
            tracing::warn!("Skipping {}: no CSV content ({})", summary.game_id, row.error_message.as_deref().unwrap_or("no error recorded"));
            failure_count += 1;
            continue;
        };

        let document = parser.parse_document(text);
        match &document.play_by_play {
            Some(block) => match storage.save_play_by_play(&summary, block) {
                Ok(path) => tracing::info!("Saved plays for {} to {}", summary, path.display()),
                Err(e) => {
                    tracing::error!("Failed to save plays for {}: {}", summary.game_id, e);
                    failure_count += 1;
                    continue;
                }
            },
            None => tracing::warn!("No play-by-play section for {}", summary.game_id),
        }

        match storage.save_document_metadata(&summary, &document) {
            Ok(path) => {
                tracing::info!("Saved metadata to: {}", path.display());
                success_count += 1;
            }
            Err(e) => {
                tracing::error!("Failed to save metadata for {}: {}", summary.game_id, e);
                failure_count += 1;
            }
        }
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);
    println!("Exported {} games to {} ({} skipped or failed)", success_count, output_dir, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!("Failed to export any of {} games", failure_count)));
    }
    Ok(())
}
