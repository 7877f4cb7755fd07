//! CLI entry point for achando-oferta

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use achando_oferta::{commands, AchandoOferta};

#[derive(Parser)]
#[command(name = "achando-oferta")]
#[command(version = "0.1.0")]
#[command(about = "Affiliate product blog: markup renderer, slug allocator and site server", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Keep posts in memory instead of using the configured backend
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the blog server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Render a post file and print its blocks
    Render {
        /// File to render
        file: PathBuf,

        /// Print HTML instead of blocks
        #[arg(long)]
        html: bool,
    },

    /// Print the slug a post with this title would get
    Slug {
        /// Post title
        title: String,
    },

    /// Publish a post from a markdown file with front-matter
    New {
        /// Markdown file
        file: PathBuf,
    },

    /// List posts
    List,

    /// Search posts by title, excerpt and content
    Search {
        /// Search query
        query: String,
    },

    /// Manage backups of posts and categories
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
enum BackupAction {
    /// Write a new backup to the backup bucket
    Create,
    /// List backups, newest first
    List,
    /// Replace all posts and categories with a backup
    Restore {
        /// Backup file name
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "achando_oferta=debug,info"
    } else {
        "achando_oferta=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let offline = cli.offline;
    let load = || AchandoOferta::new(&base_dir, offline);

    match cli.command {
        Commands::Server { port, ip } => {
            let app = load()?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            achando_oferta::server::start(&app, &ip, port).await?;
        }

        Commands::Render { file, html } => {
            commands::render::run(&file, html)?;
        }

        Commands::Slug { title } => {
            commands::slug::run(&load()?, &title).await?;
        }

        Commands::New { file } => {
            let app = load()?;
            let path = if file.is_absolute() {
                file
            } else {
                base_dir.join(file)
            };
            tracing::info!("Creating post from {:?}", path);
            commands::new::create_post(&app, &path).await?;
        }

        Commands::List => {
            commands::list::run(&load()?).await?;
        }

        Commands::Search { query } => {
            commands::search::run(&load()?, &query).await?;
        }

        Commands::Backup { action } => {
            let app = load()?;
            match action {
                BackupAction::Create => commands::backup::create(&app).await?,
                BackupAction::List => commands::backup::list(&app).await?,
                BackupAction::Restore { file } => commands::backup::restore(&app, &file).await?,
            }
        }

        Commands::Version => {
            println!("achando-oferta version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
