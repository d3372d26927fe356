//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use folio::content::ContentKind;
use folio::Folio;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Blog and newsletter content engine with an MDX-style renderer", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the site, reading content on every request
    #[command(alias = "s")]
    Serve {
        /// IP address to bind to (defaults to server.ip in _config.yml)
        #[arg(short, long)]
        ip: Option<String>,

        /// Port to listen on (defaults to server.port in _config.yml)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List site content
    List {
        /// Type of content to list (post, edition, tag, topic)
        #[arg(default_value = "post")]
        r#type: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate every record and render every published body
    Check,

    /// Render one record to HTML
    Render {
        /// Content kind (post or edition)
        kind: ContentKind,

        /// Record slug
        slug: String,

        /// Print only the rendered body, not the full page
        #[arg(long)]
        body_only: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-render a document whenever it changes
    Preview {
        /// Document to watch
        file: PathBuf,

        /// Write each render to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve { ip, port } => {
            let folio = Folio::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| folio.config.server.ip.clone());
            let port = port.unwrap_or(folio.config.server.port);
            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&folio, &ip, port).await?;
        }

        Commands::List { r#type, json } => {
            let folio = Folio::new(&base_dir)?;
            folio::commands::list::run(&folio, &r#type, json)?;
        }

        Commands::Check => {
            let folio = Folio::new(&base_dir)?;
            folio::commands::check::run(&folio)?;
        }

        Commands::Render {
            kind,
            slug,
            body_only,
            output,
        } => {
            let folio = Folio::new(&base_dir)?;
            folio::commands::render::run(&folio, kind, &slug, body_only, output.as_deref())?;
        }

        Commands::Preview { file, output } => {
            let folio = Folio::new(&base_dir)?;
            let file = if file.is_absolute() {
                file
            } else {
                base_dir.join(file)
            };
            folio::commands::preview::run(&folio, &file, output).await?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
