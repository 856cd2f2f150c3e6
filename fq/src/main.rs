//! fq: Filter Query - CLI for querying tagged feed records.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "fq")]
#[command(about = "Filter Query - run boolean tag queries over feed records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long = "force")]
        force: bool,
    },

    /// Print records matching a tag query
    #[command(visible_aliases = ["f", "q"])]
    Filter {
        /// Tag query (e.g., "dev & !linux", "(news | blog) emacs")
        query: String,

        /// JSON file with records (reads stdin if not provided)
        file: Option<String>,

        /// Record field holding the tags (overrides config)
        #[arg(short = 't', long = "field")]
        field: Option<String>,

        /// Output format: table, json, oneline (overrides config)
        #[arg(short = 'f', long = "format")]
        format: Option<String>,
    },

    /// List every tag used by the records
    Tags {
        /// JSON file with records (reads stdin if not provided)
        file: Option<String>,

        /// Record field holding the tags (overrides config)
        #[arg(short = 't', long = "field")]
        field: Option<String>,
    },

    /// Replace the tags of one feed in a feeds file
    Tag {
        /// URL of the feed to retag
        url: String,

        /// Space-separated tags (e.g., "dev emacs"); empty clears them
        tags: String,

        /// JSON feeds file, rewritten in place
        file: String,
    },

    /// Show how a query is tokenized and parsed
    Explain {
        /// Tag query to explain
        query: String,

        /// Output format: text, json
        #[arg(short = 'f', long = "format", default_value = "text")]
        format: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("FEEDTAG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { force } => commands::init(force),
        Commands::Filter { query, file, field, format } => {
            commands::filter(&query, file.as_deref(), field.as_deref(), format.as_deref())
        }
        Commands::Tags { file, field } => commands::tags(file.as_deref(), field.as_deref()),
        Commands::Tag { url, tags, file } => commands::tag(&url, &tags, &file),
        Commands::Explain { query, format } => commands::explain(&query, &format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
