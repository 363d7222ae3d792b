use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use digiteye_board::Board;
use digiteye_canvas::StrokeFile;
use digiteye_canvas::surface::grid_image;
use digiteye_client::PredictionClient;
use digiteye_core::config::{Config, LoggingConfig};
use digiteye_core::{NewDrawing, Page};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "digiteye",
    about = "Draw a digit, send it to the classifier, manage stored drawings",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API base URL (overrides config and DIGITEYE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a stroke file, classify it and print the prediction
    Predict {
        /// Stroke file (JSON)
        file: PathBuf,

        /// Write the full-resolution drawing as PNG
        #[arg(long)]
        png: Option<PathBuf>,

        /// Write the 28x28 grid as PNG
        #[arg(long)]
        grid_png: Option<PathBuf>,

        /// Print the 28x28 grid as text
        #[arg(long)]
        ascii: bool,
    },

    /// Replay a stroke file offline and print the captured grid
    Render {
        /// Stroke file (JSON)
        file: PathBuf,

        /// Write the full-resolution drawing as PNG
        #[arg(long)]
        png: Option<PathBuf>,

        /// Write the 28x28 grid as PNG
        #[arg(long)]
        grid_png: Option<PathBuf>,
    },

    /// Stored drawings
    Drawings {
        #[command(subcommand)]
        action: DrawingsAction,
    },

    /// Check that the service is up
    Health,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum DrawingsAction {
    /// List stored drawings
    List {
        /// Page size (default: drawings.page_size)
        #[arg(long)]
        limit: Option<u32>,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show one drawing
    Get { id: i64 },
    /// Delete a drawing
    Delete { id: i64 },
    /// Upload a labelled drawing from a stroke file
    Upload {
        file: PathBuf,

        /// The digit actually drawn (0-9)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=9))]
        label: u8,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Report configuration problems
    Validate,
}

fn init_logging(verbose: bool, logging: Option<&LoggingConfig>) {
    let level = if verbose {
        "debug".to_string()
    } else {
        logging
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| "info".into())
    };

    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    for directive in logging.map(|l| l.filters.as_slice()).unwrap_or_default() {
        match directive.parse() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("Ignoring invalid log filter '{directive}': {e}"),
        }
    }

    let json = logging.is_some_and(|l| l.format == "json");
    let stdout = logging.is_some_and(|l| l.output == "stdout");

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match (json, stdout) {
        (true, true) => builder.json().with_writer(std::io::stdout).init(),
        (true, false) => builder.json().with_writer(std::io::stderr).init(),
        (false, true) => builder.with_writer(std::io::stdout).init(),
        (false, false) => builder.with_writer(std::io::stderr).init(),
    }
}

/// API base in effect: `--api-url`, then `DIGITEYE_API_URL`, then the config file.
fn effective_api_base(config: &Config, api_url: Option<&str>) -> String {
    match api_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => config.api_base(),
    }
}

fn client(config: &Config, api_url: Option<&str>) -> anyhow::Result<PredictionClient> {
    let client = PredictionClient::with_timeout(
        &effective_api_base(config, api_url),
        config.request_timeout(),
    )?;
    tracing::debug!(base_url = client.base_url(), "Using classification service");
    Ok(client)
}

/// Replay a stroke file onto a fresh board and write any requested images.
fn load_board(
    config: &Config,
    file: &Path,
    png: Option<&Path>,
    grid_png: Option<&Path>,
) -> anyhow::Result<Board> {
    let strokes = StrokeFile::load(file)?;
    if strokes.is_empty() {
        anyhow::bail!("{} contains no strokes", file.display());
    }

    let mut board = Board::from_config(config);
    strokes.apply(board.canvas_mut());

    if let Some(path) = png {
        board
            .canvas()
            .surface()
            .save_png(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Drawing saved");
    }
    if let Some(path) = grid_png {
        grid_image(&board.capture_pixel_grid())
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Grid saved");
    }
    Ok(board)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::config_path);
    let config = Config::load(&config_path)?;

    init_logging(cli.verbose, config.logging.as_ref());

    let api_url = cli.api_url.as_deref();

    match cli.command {
        Commands::Predict {
            file,
            png,
            grid_png,
            ascii,
        } => {
            let mut board = load_board(&config, &file, png.as_deref(), grid_png.as_deref())?;
            if ascii {
                print!("{}", board.capture_pixel_grid().to_ascii());
            }

            let client = client(&config, api_url)?;
            let display = board.classify(&client).await?;
            if let Some(error) = &display.error {
                anyhow::bail!("{error}");
            }
            println!("{}", display.render());
        }
        Commands::Render {
            file,
            png,
            grid_png,
        } => {
            let board = load_board(&config, &file, png.as_deref(), grid_png.as_deref())?;
            let grid = board.capture_pixel_grid();
            print!("{}", grid.to_ascii());
            println!("{} of 784 cells inked", grid.lit_cells().count());
        }
        Commands::Drawings { action } => {
            let client = client(&config, api_url)?;
            match action {
                DrawingsAction::List { limit, offset } => {
                    let page = Page::new(limit.unwrap_or_else(|| config.page_size()), offset);
                    let drawings = client.list_drawings(page).await?;
                    if drawings.is_empty() {
                        println!("No drawings");
                    }
                    for d in drawings {
                        let confidence = d
                            .confidence
                            .map(|c| format!("{:.1}%", c * 100.0))
                            .unwrap_or_else(|| "-".into());
                        println!(
                            "{:>6}  {}  {:>6}  {}",
                            d.id,
                            d.predicted_digit,
                            confidence,
                            d.created_at.format("%Y-%m-%d %H:%M:%S")
                        );
                    }
                }
                DrawingsAction::Get { id } => {
                    let drawing = client.get_drawing(id).await?;
                    println!("{}", serde_json::to_string_pretty(&drawing)?);
                }
                DrawingsAction::Delete { id } => {
                    let ack = client.delete_drawing(id).await?;
                    println!("{}", ack.message.as_deref().unwrap_or("Deleted"));
                }
                DrawingsAction::Upload { file, label } => {
                    let board = load_board(&config, &file, None, None)?;
                    let drawing = NewDrawing::new(board.capture_pixel_grid(), label)?;
                    let record = client.create_drawing(&drawing).await?;
                    println!("Uploaded drawing {} labelled {}", record.id, label);
                }
            }
        }
        Commands::Health => {
            let client = client(&config, api_url)?;
            let health = client.health().await?;
            println!("{}: {}", client.base_url(), health.status);
            if !health.is_ok() {
                anyhow::bail!("service reports status '{}'", health.status);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
                println!("# config file: {}", config_path.display());
                println!("# api base: {}", effective_api_base(&config, api_url));
            }
            ConfigAction::Validate => {
                let (warnings, errors) = config.validate();
                for w in &warnings {
                    println!("warning: {w}");
                }
                for e in &errors {
                    println!("error: {e}");
                }
                if !errors.is_empty() {
                    anyhow::bail!("{} configuration error(s)", errors.len());
                }
                if warnings.is_empty() {
                    println!("Configuration OK");
                }
            }
        },
    }

    Ok(())
}
