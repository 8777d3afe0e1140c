mod history_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use qhist::history::export::ExportFormat;
use qhist::history::{HistoryConfig, HistoryStore};
use qhist::logging;

#[derive(Parser)]
#[command(
    name = "qhist",
    version,
    about = "Inspect and maintain the local translation history"
)]
struct Cli {
    /// Log store activity to stderr (overrides QHIST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// History database file (default: platform data dir)
    #[arg(long, global = true, env = "QHIST_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recent history entries, newest first
    List {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        /// Number of newest entries to skip
        #[arg(short, long, default_value_t = 0)]
        offset: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show details of a specific history entry
    Show {
        /// Entry ID to show
        id: i64,
        /// Print only the stored service payload
        #[arg(long)]
        raw: bool,
    },
    /// Record one service result
    Add {
        /// Translation service key (e.g. "deepl")
        #[arg(long)]
        service: String,
        /// Source language code
        #[arg(long)]
        from: String,
        /// Target language code
        #[arg(long)]
        to: String,
        /// Original query text
        #[arg(long)]
        query: String,
        /// Translation produced by the service
        #[arg(long, default_value = "")]
        translated: String,
        /// Full service result, stored verbatim
        #[arg(long, default_value = "{}")]
        raw_json: String,
        /// Seconds since the Unix epoch (default: now)
        #[arg(long)]
        created_at: Option<f64>,
    },
    /// Delete one history entry
    Delete {
        /// Entry ID to delete
        id: i64,
    },
    /// Delete every history entry
    Clear,
    /// Print the number of stored entries
    Count,
    /// Export the whole history
    Export {
        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Write to this file (or into this directory) instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the history database path
    Path,
}

fn open_store(db: Option<PathBuf>) -> Option<HistoryStore> {
    if let Some(path) = db {
        return Some(HistoryStore::new(path, HistoryConfig::load()));
    }
    match HistoryStore::from_env() {
        Ok(store) => Some(store),
        Err(e) => {
            eprintln!("[qhist] error: {}", e.summary());
            None
        }
    }
}

fn or_exit(r: anyhow::Result<i32>) -> i32 {
    r.unwrap_or_else(|e| {
        eprintln!("[qhist] error: {e:#}");
        1
    })
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(store) = open_store(cli.db) else {
        std::process::exit(1);
    };

    let exit_code = match &cli.command {
        Commands::List {
            limit,
            offset,
            json,
        } => history_cmd::cmd_history_list(&store, *limit, *offset, *json),
        Commands::Show { id, raw } => history_cmd::cmd_history_show(&store, *id, *raw),
        Commands::Add {
            service,
            from,
            to,
            query,
            translated,
            raw_json,
            created_at,
        } => or_exit(history_cmd::cmd_history_add(
            &store,
            &history_cmd::AddArgs {
                service,
                from,
                to,
                query,
                translated,
                raw_json,
                created_at: *created_at,
            },
        )),
        Commands::Delete { id } => history_cmd::cmd_history_delete(&store, *id),
        Commands::Clear => history_cmd::cmd_history_clear(&store),
        Commands::Count => history_cmd::cmd_history_count(&store),
        Commands::Export { format, output } => or_exit(history_cmd::cmd_history_export(
            &store,
            *format,
            output.as_deref(),
        )),
        Commands::Path => history_cmd::cmd_path(&store),
    };
    std::process::exit(exit_code);
}
