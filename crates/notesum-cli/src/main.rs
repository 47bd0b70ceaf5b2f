//! notesum: command-line client for the notesum summarization service.
//!
//! Environment variables:
//!   NOTESUM_*   - client settings, see `ClientConfig::from_env`
//!   LOG_FORMAT  - "json" or "text" (default: "text")
//!   LOG_FILE    - path to log file (optional, enables file logging)
//!   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
//!   RUST_LOG    - standard env filter (default: "notesum=info,notesum_client=warn")

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notesum_client::{ClientConfig, Notesum};
use notesum_core::{
    CreateNoteRequest, Error, JobProgress, ListNotesQuery, SummaryResult, SummaryStyle,
    SummaryType, UserSettings,
};

#[derive(Parser)]
#[command(name = "notesum")]
#[command(author, version, about = "Summarize notes with the notesum service")]
#[command(propagate_version = true)]
struct Cli {
    /// Service base URL (overrides NOTESUM_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the identity this installation acts as
    Whoami,

    /// Forget the local identity; a new guest is created on next use
    ResetIdentity,

    /// Manage notes
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },

    /// Summarize a note
    Summarize {
        note_id: i64,

        /// Number of lines (1-200); omit to let the service decide
        #[arg(short, long)]
        lines: Option<u32>,

        /// best_fit, technical, or casual
        #[arg(short, long)]
        style: Option<SummaryStyle>,

        /// summary, key_points, or flashcards
        #[arg(short = 't', long = "type")]
        summary_type: Option<SummaryType>,

        /// Ignore any cached summary
        #[arg(short, long)]
        force: bool,

        /// Wait on a single request instead of polling a job
        #[arg(long)]
        sync: bool,
    },

    /// List the summaries of a note, newest first
    Summaries { note_id: i64 },

    /// Show or change summarization defaults
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Check that the service is reachable
    Health,
}

#[derive(Subcommand)]
enum NotesCommand {
    /// List your notes (falls back to the local cache when offline)
    List {
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, default_value_t = 0)]
        skip: u32,

        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Print one note
    Show { note_id: i64 },

    /// Create a text note
    Create {
        #[arg(short, long)]
        title: String,

        /// Note text; use --file to read it from disk instead
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        content: Option<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a note and its summaries
    Delete { note_id: i64 },

    /// Upload a PDF as a new note
    Upload {
        path: PathBuf,

        #[arg(short, long)]
        title: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the saved defaults
    Show,

    /// Change saved defaults; unspecified values are kept
    Set {
        #[arg(short, long, conflicts_with = "auto_lines")]
        lines: Option<u32>,

        /// Let the service decide the line count
        #[arg(long)]
        auto_lines: bool,

        #[arg(short, long)]
        style: Option<SummaryStyle>,

        #[arg(short = 't', long = "type")]
        summary_type: Option<SummaryType>,
    },

    /// Restore the built-in defaults
    Reset,
}

fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notesum=info,notesum_client=warn".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("notesum.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // stdout carries command output, so logs go to stderr
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _log_guard = init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if matches!(e.downcast_ref::<Error>(), Some(err) if err.is_timeout()) {
                eprintln!("The job may still finish; try again later.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url);
    }
    debug!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "Loaded config");

    let client = Notesum::open(&config)
        .await
        .context("Failed to open local store")?;

    match cli.command {
        Commands::Whoami => cmd_whoami(&client).await,
        Commands::ResetIdentity => {
            client.identity.clear_identity().await?;
            client.listing.cache().clear().await?;
            println!("Local identity cleared.");
            Ok(())
        }
        Commands::Notes { command } => cmd_notes(&client, command).await,
        Commands::Summarize {
            note_id,
            lines,
            style,
            summary_type,
            force,
            sync,
        } => {
            let mut request = client.settings.load().await.request_for(note_id);
            if let Some(lines) = lines {
                request = request.with_line_count(lines);
            }
            if let Some(style) = style {
                request = request.with_style(style);
            }
            if let Some(summary_type) = summary_type {
                request = request.with_type(summary_type);
            }
            request = request.with_force_regenerate(force);

            let result = if sync {
                client.summaries.summarize(&request).await?
            } else {
                run_job(&client, &request).await?
            };
            print_summary(&result);
            Ok(())
        }
        Commands::Summaries { note_id } => {
            let summaries = client.summaries.list_for_note(note_id).await?;
            if summaries.is_empty() {
                println!("No summaries for note {}.", note_id);
            }
            for summary in &summaries {
                println!(
                    "#{}  {}  {} lines={} style={}  {}/{}",
                    summary.id,
                    summary.created_at.format("%Y-%m-%d %H:%M"),
                    summary.summary_type,
                    summary.length,
                    summary.style.as_deref().unwrap_or("-"),
                    summary.provider,
                    summary.model
                );
            }
            Ok(())
        }
        Commands::Settings { command } => cmd_settings(&client, command).await,
        Commands::Health => {
            let health = client.api.health().await?;
            println!(
                "{} {} ({})",
                health.app_name.as_deref().unwrap_or("service"),
                health.version.as_deref().unwrap_or("?"),
                health.status
            );
            if !health.is_healthy() {
                bail!("service reports status {}", health.status);
            }
            Ok(())
        }
    }
}

async fn cmd_whoami(client: &Notesum) -> anyhow::Result<()> {
    let identity = client.identity.initialize_identity().await?;
    println!("User #{}: {}", identity.id, identity.display_name_or_default());
    if identity.is_guest {
        println!(
            "Guest token: {}",
            identity.guest_token.as_deref().unwrap_or("-")
        );
    }
    if let Some(ref email) = identity.email {
        println!("Email: {}", email);
    }
    println!("Since: {}", identity.created_at.format("%Y-%m-%d %H:%M UTC"));
    Ok(())
}

async fn cmd_notes(client: &Notesum, command: NotesCommand) -> anyhow::Result<()> {
    match command {
        NotesCommand::List {
            search,
            skip,
            limit,
        } => {
            let identity = client.identity.initialize_identity().await?;
            let query = ListNotesQuery {
                search,
                skip,
                limit,
                ..ListNotesQuery::for_user(identity.id)
            };
            let listing = client.listing.refresh(&query).await?;
            if let notesum_client::ListingSource::Cache { ref error } = listing.source {
                eprintln!("Service unavailable ({}); showing cached notes.", error);
            }
            if listing.items.is_empty() {
                println!("No notes.");
            }
            for note in &listing.items {
                println!(
                    "#{:<5} {:<40} {:>7} chars  {} summaries",
                    note.id, note.title, note.char_count, note.summary_count
                );
            }
            Ok(())
        }
        NotesCommand::Show { note_id } => {
            let note = client.notes.get(note_id).await?;
            println!("# {}", note.title);
            println!(
                "({} chars, created {})\n",
                note.char_count,
                note.created_at.format("%Y-%m-%d %H:%M")
            );
            println!("{}", note.content);
            Ok(())
        }
        NotesCommand::Create {
            title,
            content,
            file,
        } => {
            let content = match (content, file) {
                (Some(content), _) => content,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => bail!("either --content or --file is required"),
            };
            let identity = client.identity.initialize_identity().await?;
            let note = client
                .notes
                .create(&CreateNoteRequest::text(title, content), Some(identity.id))
                .await?;
            println!("Created note #{}", note.id);
            Ok(())
        }
        NotesCommand::Delete { note_id } => {
            client.notes.delete(note_id).await?;
            println!("Deleted note #{}", note_id);
            Ok(())
        }
        NotesCommand::Upload { path, title } => {
            let identity = client.identity.initialize_identity().await?;
            let note = client
                .notes
                .upload_pdf_file(&path, title.as_deref(), Some(identity.id))
                .await?;
            println!("Created note #{} ({} chars)", note.id, note.char_count);
            Ok(())
        }
    }
}

async fn cmd_settings(client: &Notesum, command: SettingsCommand) -> anyhow::Result<()> {
    match command {
        SettingsCommand::Show => {
            print_settings(&client.settings.load().await);
            Ok(())
        }
        SettingsCommand::Set {
            lines,
            auto_lines,
            style,
            summary_type,
        } => {
            let mut settings = client.settings.load().await;
            if auto_lines {
                settings.default_line_count = None;
            } else if lines.is_some() {
                settings.default_line_count = lines;
            }
            if let Some(style) = style {
                settings.default_style = style;
            }
            if let Some(summary_type) = summary_type {
                settings.default_type = summary_type;
            }
            client.settings.save(&settings).await?;
            print_settings(&settings);
            Ok(())
        }
        SettingsCommand::Reset => {
            client.settings.reset().await?;
            print_settings(&UserSettings::default());
            Ok(())
        }
    }
}

/// Submit a job and print progress to stderr until it finishes.
async fn run_job(
    client: &Notesum,
    request: &notesum_core::SummarizationRequest,
) -> notesum_core::Result<SummaryResult> {
    let (tx, mut rx) = mpsc::unbounded_channel::<JobProgress>();
    let printer = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            eprintln!("[{:>3.0}%] {}", progress.percent, progress.message);
        }
    });

    let result = client.jobs.run_summarization(request, &tx).await;
    drop(tx);
    let _ = printer.await;

    if let Ok(ref summary) = result {
        info!(
            note_id = summary.note_id,
            summary_id = summary.id,
            generation_time_ms = summary.generation_time_ms,
            "Summary ready"
        );
    }
    result
}

fn print_summary(summary: &SummaryResult) {
    println!("{}\n", summary.content);
    println!(
        "-- {} via {}/{} | {} lines | {} tokens | {} ms | ratio {:.2}",
        summary.summary_type,
        summary.provider,
        summary.model,
        summary.length,
        summary.token_count,
        summary.generation_time_ms,
        summary.compression_ratio
    );
}

fn print_settings(settings: &UserSettings) {
    println!(
        "lines: {}",
        settings
            .default_line_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "auto".to_string())
    );
    println!("style: {}", settings.default_style.as_str());
    println!("type:  {}", settings.default_type.as_str());
}
