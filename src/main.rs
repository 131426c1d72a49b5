use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use recall::cli::{contacts, notes, permission, stats};
use recall::config::Config;
use recall::contacts::{ContactDirectory, ContactSource, JsonFileSource, MemorySource, PermissionStatus};
use recall::detail::Aggregator;
use recall::logging;
use recall::store::NoteStore;

#[derive(Parser)]
#[command(name = "recall")]
#[command(about = "Attach notes to the people in your address book")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "recall.yaml")]
    config: String,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the address book
    Contacts {
        #[command(subcommand)]
        command: ContactCommands,
    },

    /// Edit the note attached to a contact
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },

    /// List all notes, most recently updated first
    Notes {
        /// Only notes containing this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Address book access
    Permission {
        #[command(subcommand)]
        command: PermissionCommands,
    },

    /// Show statistics
    Stats,
}

#[derive(Subcommand)]
enum ContactCommands {
    /// List all contacts, sorted by first name
    List,
    /// Find contacts by name
    Search {
        /// Text to look for in the name, first name or last name
        query: String,
    },
    /// Show a contact together with its note
    Show {
        /// Contact ID
        id: String,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Create or replace a note. Blank text deletes the note.
    Set {
        /// Contact ID
        contact_id: String,
        /// Note text
        #[arg(num_args = 0.., trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Delete a note
    Delete {
        /// Contact ID
        contact_id: String,
    },
}

#[derive(Subcommand)]
enum PermissionCommands {
    /// Show whether the address book can be read
    Status,
    /// Ask for address book access
    Request,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let (config, config_error) = Config::load_or_default(&cli.config);
    logging::init(&config.logging);
    if let Some(e) = config_error {
        tracing::warn!(config = %cli.config, error = %e, "failed to load config, using defaults");
    }

    // Initialize store
    let store = NoteStore::open(&config.database_path()).context("Failed to open notes database")?;

    // Initialize contact directory
    let source: Box<dyn ContactSource> = if config.contacts.enabled {
        Box::new(JsonFileSource::new(config.contacts_path()))
    } else {
        Box::new(MemorySource::new(vec![]).with_permission(PermissionStatus::Denied))
    };
    let directory = ContactDirectory::new(source);
    let aggregator = Aggregator::new(&directory, &store);

    match cli.command {
        Commands::Contacts { command } => match command {
            ContactCommands::List => {
                contacts::list(&directory, None, cli.json)?;
            }
            ContactCommands::Search { query } => {
                contacts::list(&directory, Some(&query), cli.json)?;
            }
            ContactCommands::Show { id } => {
                contacts::show(&aggregator, &id, cli.json)?;
            }
        },
        Commands::Note { command } => match command {
            NoteCommands::Set { contact_id, text } => {
                notes::set(&store, &directory, &contact_id, &text.join(" "))?;
            }
            NoteCommands::Delete { contact_id } => {
                notes::delete(&store, &contact_id)?;
            }
        },
        Commands::Notes { search } => {
            notes::feed(&aggregator, search.as_deref(), cli.json)?;
        }
        Commands::Permission { command } => match command {
            PermissionCommands::Status => {
                permission::status(&directory)?;
            }
            PermissionCommands::Request => {
                permission::request(&directory)?;
            }
        },
        Commands::Stats => {
            stats::run(&store, &directory)?;
        }
    }

    Ok(())
}
