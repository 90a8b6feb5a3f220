//! Developer CLI over a ClientNotes database.
//!
//! # Responsibility
//! - Drive the same note session the mobile app uses, for manual testing.
//! - Import/export the raw snapshot document.

use clap::{Parser, Subcommand};
use clientnotes_core::{
    decode_snapshot, default_log_level, encode_snapshot, init_logging, Note, NoteForm,
    NoteSession, SessionConfig, SqliteKvStore,
};
use std::error::Error;
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "clientnotes.sqlite3";

/// ClientNotes command line arguments.
#[derive(Parser, Debug)]
#[command(name = "clientnotes")]
#[command(about = "Inspect and edit a ClientNotes database")]
#[command(version)]
struct Cli {
    /// Database file (defaults to $CLIENTNOTES_DB_PATH, then the temp dir)
    #[arg(long, value_name = "PATH", env = "CLIENTNOTES_DB_PATH")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when omitted
    #[arg(long, value_name = "DIR")]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List notes in display order
    List,
    /// Print one note
    Show { id: String },
    /// Create a note
    Add {
        #[arg(long)]
        client: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
    },
    /// Edit a note; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Remove a note (unknown ids are ignored)
    Remove { id: String },
    /// Print the stored snapshot document
    Export,
    /// Replace all notes with a snapshot document read from FILE
    Import { file: PathBuf },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let db_path = cli
        .db
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
    let kv = SqliteKvStore::open(&db_path)?;
    let mut session = NoteSession::open(kv, SessionConfig::default())?;

    match cli.command {
        Command::List => {
            let items = session.list_items();
            if items.is_empty() {
                println!("No Notes");
            }
            for item in items {
                println!(
                    "{}\t[{} / {}]\t{}\t{}",
                    item.id, item.client, item.category, item.title, item.preview
                );
            }
        }
        Command::Show { id } => match session.get_note(&id) {
            Some(note) => print_note(note),
            None => return Err(format!("note not found: {id}").into()),
        },
        Command::Add {
            client,
            category,
            title,
            body,
        } => {
            let form = NoteForm {
                client,
                category,
                title,
                body,
            };
            let note = session.submit_form(None, form)?;
            println!("{}", note.id);
        }
        Command::Edit {
            id,
            client,
            category,
            title,
            body,
        } => {
            let existing = session
                .get_note(&id)
                .cloned()
                .ok_or_else(|| format!("note not found: {id}"))?;
            let mut form = NoteForm::from(&existing);
            if let Some(value) = client {
                form.client = value;
            }
            if let Some(value) = category {
                form.category = value;
            }
            if let Some(value) = title {
                form.title = value;
            }
            if let Some(value) = body {
                form.body = value;
            }
            let note = session.submit_form(Some(&existing), form)?;
            print_note(&note);
        }
        Command::Remove { id } => {
            session.remove_note(&Note::with_id(id, "", "", "", ""))?;
        }
        Command::Export => {
            println!("{}", encode_snapshot(session.state())?);
        }
        Command::Import { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let state = decode_snapshot(&raw)?;
            let count = state.len();
            session.restore_state(state)?;
            println!("imported {count} note(s)");
        }
    }

    Ok(())
}

fn print_note(note: &Note) {
    println!("id:       {}", note.id);
    println!("client:   {}", note.client);
    println!("category: {}", note.category);
    println!("title:    {}", note.title);
    println!();
    println!("{}", note.body);
}
