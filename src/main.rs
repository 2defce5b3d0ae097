//! # Folio CLI
//!
//! Command-line interface for building and exporting documents.
//!
//! ## Usage
//!
//! ```bash
//! # Export a document JSON file as a single-page A4 PDF
//! folio export invoice.json
//!
//! # Render the preview as PNG instead
//! folio preview invoice.json --output preview.png
//!
//! # Send the same artifact to the print spool
//! folio print invoice.json
//!
//! # Run the HTTP server
//! folio serve --listen 0.0.0.0:8080
//!
//! # Saved-invoice history (needs FOLIO_STORE_URL / FOLIO_STORE_KEY)
//! folio list
//! folio show <id>
//! folio delete <id>
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use folio::actions;
use folio::document::number::RpcNumbering;
use folio::document::{Document, DraftStore};
use folio::error::FolioError;
use folio::export::PrintSpool;
use folio::notify::LogNotifier;
use folio::preview::{self, style, Theme};
use folio::render::{self, letterhead};
use folio::server::{self, AppState, ServerConfig};
use folio::session::EditorSession;
use folio::storage::{DocumentStore, RestStore, StoreConfig};

/// Folio - invoice, purchase order and delivery order builder
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a document JSON file as a single-page A4 PDF
    Export {
        /// Path to the document JSON file
        input: PathBuf,

        /// Output file (defaults to the artifact name, e.g. Invoice-<number>.pdf)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Letterhead image (file path or URL)
        #[arg(long)]
        letterhead: Option<String>,
    },

    /// Render a document's preview as a PNG image
    Preview {
        /// Path to the document JSON file
        input: PathBuf,

        /// Output PNG file
        #[arg(long, value_name = "FILE", default_value = "preview.png")]
        output: PathBuf,

        /// Letterhead image (file path or URL)
        #[arg(long)]
        letterhead: Option<String>,
    },

    /// Export a document and submit it to the print spool
    Print {
        /// Path to the document JSON file
        input: PathBuf,

        /// Letterhead image (file path or URL)
        #[arg(long)]
        letterhead: Option<String>,

        /// Spool directory (defaults to FOLIO_SPOOL_DIR or .folio/spool)
        #[arg(long, value_name = "DIR")]
        spool: Option<PathBuf>,
    },

    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Letterhead image (file path or URL)
        #[arg(long)]
        letterhead: Option<String>,
    },

    /// List saved invoices, newest first
    List,

    /// Show one saved invoice as JSON
    Show {
        /// Invoice id
        id: Uuid,
    },

    /// Delete a saved invoice
    Delete {
        /// Invoice id
        id: Uuid,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), FolioError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            output,
            letterhead,
        } => {
            let document = read_document(&input)?;
            let letterhead = load_letterhead(letterhead.as_deref()).await?;
            let mut session = EditorSession::with_document(document);
            let artifact = actions::download_pdf(
                &mut session,
                &Theme::default(),
                letterhead.as_ref(),
                &mut LogNotifier,
            )?;
            let path = output.unwrap_or_else(|| PathBuf::from(&artifact.file_name));
            std::fs::write(&path, &artifact.bytes)?;
            println!("Wrote {}", path.display());
        }

        Commands::Preview {
            input,
            output,
            letterhead,
        } => {
            let document = read_document(&input)?;
            let letterhead = load_letterhead(letterhead.as_deref()).await?;
            let tree = preview::build(&document);
            let resolved = style::resolve(&tree, &Theme::default());
            let raster = render::render_preview(&resolved, letterhead.as_ref());
            std::fs::write(&output, render::to_png(&raster)?)?;
            println!("Wrote {}", output.display());
        }

        Commands::Print {
            input,
            letterhead,
            spool,
        } => {
            let document = read_document(&input)?;
            let letterhead = load_letterhead(letterhead.as_deref()).await?;
            let spool = spool.map(PrintSpool::new).unwrap_or_else(PrintSpool::from_env);
            let mut session = EditorSession::with_document(document);
            actions::print_document(
                &mut session,
                &Theme::default(),
                letterhead.as_ref(),
                &spool,
                &mut LogNotifier,
            )?;
            println!("Spooled to {}", spool.target().display());
        }

        Commands::Serve { listen, letterhead } => {
            let config = StoreConfig::from_env()?;
            let store: Arc<dyn DocumentStore> = Arc::new(RestStore::new(config.clone()));
            let numbering = Arc::new(RpcNumbering::new(&config));
            let state = AppState::new(
                store,
                numbering,
                DraftStore::from_env(),
                PrintSpool::from_env(),
                letterhead.clone(),
            );
            server::serve(
                ServerConfig {
                    listen_addr: listen,
                    letterhead,
                },
                state,
            )
            .await?;
        }

        Commands::List => {
            let store = rest_store()?;
            let summaries = store.list().await?;
            if summaries.is_empty() {
                println!("No saved invoices.");
            }
            for summary in summaries {
                println!(
                    "{}  {}  {}  {} {}",
                    summary.id,
                    summary.invoice_number,
                    summary.invoice_date,
                    summary.currency,
                    folio::document::totals::format_amount(summary.grand_total),
                );
            }
        }

        Commands::Show { id } => {
            let store = rest_store()?;
            let record = store.fetch(id).await?;
            let json = serde_json::to_string_pretty(&record)
                .map_err(|e| FolioError::Storage(format!("failed to serialize record: {e}")))?;
            println!("{json}");
        }

        Commands::Delete { id } => {
            let store = rest_store()?;
            store.delete(id).await?;
            println!("Deleted {id}");
        }
    }

    Ok(())
}

fn read_document(path: &PathBuf) -> Result<Document, FolioError> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json)
        .map_err(|e| FolioError::InvalidInput(format!("invalid document JSON: {e}")))
}

async fn load_letterhead(
    source: Option<&str>,
) -> Result<Option<image::RgbImage>, FolioError> {
    match source {
        Some(source) => Ok(Some(letterhead::load(source).await?)),
        None => Ok(None),
    }
}

fn rest_store() -> Result<RestStore, FolioError> {
    Ok(RestStore::new(StoreConfig::from_env()?))
}
