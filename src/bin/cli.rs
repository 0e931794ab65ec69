//! filerecstore CLI
//!
//! Command-line access to file-backed record stores.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use filerecstore::store::StoreMeta;
use filerecstore::{Config, ErrorKind, FileRecordStore, RecordStore, Result, SequenceMode, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// filerecstore CLI
#[derive(Parser, Debug)]
#[command(name = "filerecstore")]
#[command(about = "Manage file-backed record stores")]
#[command(version)]
struct Args {
    /// Directory holding the stores
    #[arg(short, long, default_value = "./filerecstore_data")]
    root: PathBuf,

    /// fsync every record write
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new, empty store
    Create {
        /// Store name
        store: String,

        /// Store description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Insert a new record
    Insert {
        store: String,
        key: String,

        /// Record contents given inline
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        value: Option<String>,

        /// Read record contents from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print a record, or write it to a file
    Read {
        store: String,
        key: String,

        /// Write contents here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Overwrite an existing record
    Replace {
        store: String,
        key: String,

        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        value: Option<String>,

        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Remove a record
    Remove { store: String, key: String },

    /// Print the byte length of a record
    Length { store: String, key: String },

    /// List every record with its length
    List { store: String },

    /// Show store name, description, count and space used
    Info { store: String },

    /// Delete a whole store
    Destroy { store: String },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,filerecstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let sync_strategy = if args.sync {
        SyncStrategy::EveryWrite
    } else {
        SyncStrategy::OnClose
    };
    let config = Config::builder()
        .root_dir(&args.root)
        .sync_strategy(sync_strategy)
        .build();

    if let Err(e) = run(&config, args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Create { store, description } => {
            FileRecordStore::create(config, &store, &description)?;
            tracing::info!("Created store {} in {}", store, config.root_dir.display());
        }
        Commands::Insert { store, key, value, file } => {
            let data = contents(value, file)?;
            FileRecordStore::open(config, &store)?.insert(&key, &data)?;
        }
        Commands::Read { store, key, out } => {
            let data = FileRecordStore::open(config, &store)?.read(&key)?;
            match out {
                Some(path) => filerecstore::fs::atomic_replace(&path, &data, false)?,
                None => println!("{}", String::from_utf8_lossy(&data)),
            }
        }
        Commands::Replace { store, key, value, file } => {
            let data = contents(value, file)?;
            FileRecordStore::open(config, &store)?.replace(&key, &data)?;
        }
        Commands::Remove { store, key } => {
            FileRecordStore::open(config, &store)?.remove(&key)?;
        }
        Commands::Length { store, key } => {
            let len = FileRecordStore::open(config, &store)?.length(&key)?;
            println!("{}", len);
        }
        Commands::List { store } => {
            let mut store = FileRecordStore::open(config, &store)?;
            let mut mode = SequenceMode::Start;
            loop {
                match store.sequence(mode) {
                    Ok((key, data)) => println!("{}\t{}", key, data.len()),
                    Err(e) if e.kind() == ErrorKind::NotFound => break,
                    Err(e) => return Err(e),
                }
                mode = SequenceMode::Next;
            }
        }
        Commands::Info { store } => {
            let store = FileRecordStore::open(config, &store)?;
            println!("name:        {}", store.name());
            println!("description: {}", store.description());
            println!("records:     {}", store.count());
            println!("space used:  {}", store.space_used()?);
        }
        Commands::Destroy { store } => {
            StoreMeta::remove_store(&config.root_dir, &store)?;
            tracing::info!("Destroyed store {}", store);
        }
    }

    Ok(())
}

/// Record contents from an inline value or a file
fn contents(value: Option<String>, file: Option<PathBuf>) -> Result<Vec<u8>> {
    match (value, file) {
        (Some(value), _) => Ok(value.into_bytes()),
        (None, Some(path)) => {
            let len = filerecstore::fs::size(&path)?;
            filerecstore::fs::read_exact_file(&path, len)
        }
        (None, None) => Err(filerecstore::RecordStoreError::Strategy(
            "No record contents given".to_string(),
        )),
    }
}
