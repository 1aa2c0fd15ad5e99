use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

mod commands;

/// bundlekit - descriptor resolution for versioned bundles
#[derive(Parser)]
#[command(name = "bundlekit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a descriptor URI and show what it points at
    Resolve {
        /// Descriptor URI (e.g. bkit:descriptor:store?name=maps-panel&version=v1.2.3)
        uri: String,
    },

    /// Fetch a bundle into the local cache
    Fetch {
        /// Descriptor URI
        uri: String,
    },

    /// Show a bundle's manifest
    Info {
        /// Descriptor URI
        uri: String,
    },

    /// Resolve the latest version the bundle's source knows
    Latest {
        /// Descriptor URI
        uri: String,

        /// Constraint pattern (e.g. v1.x.x); without it the source's own
        /// notion of most recent is used
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// List the cache paths probed for a descriptor, in order
    Paths {
        /// Descriptor URI
        uri: String,
    },

    /// Manage the local bundle store
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Initialize the store directory structure
    Init,

    /// Publish a bundle directory to the store
    Add {
        /// Path to the bundle directory (must contain bundle.yml)
        path: String,

        /// Bundle name
        name: String,

        /// Version tag (e.g. v1.2.3)
        version: String,
    },

    /// List bundles in the store
    List,

    /// Mark a published release as deprecated
    Deprecate {
        /// Bundle name
        name: String,

        /// Version tag
        version: String,

        /// Deprecation note shown to resolvers
        #[arg(short, long)]
        message: Option<String>,

        /// Clear an existing deprecation instead
        #[arg(long, conflicts_with = "message")]
        clear: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve { uri } => commands::resolve::run(uri),
        Commands::Fetch { uri } => commands::fetch::run(uri),
        Commands::Info { uri } => commands::info::run(uri),
        Commands::Latest { uri, pattern } => commands::latest::run(uri, pattern),
        Commands::Paths { uri } => commands::paths::run(uri),
        Commands::Store { action } => commands::store::run(&action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "bundlekit", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
