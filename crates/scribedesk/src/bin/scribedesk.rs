//! # scribedesk
//!
//! Command-line client: upload recordings and follow their jobs, browse the
//! history, and print annotated transcripts.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use secrecy::SecretString;
use tokio::sync::broadcast::error::RecvError;

use scribedesk::api::{UploadOptions, UploadPayload};
use scribedesk::config::load_config_or_default;
use scribedesk::history::{HistoryFilter, HistoryRow, HistoryScope, HistoryView};
use scribedesk::transcript::format_timestamp;
use scribedesk::{
    init_logging, EngineConfig, HttpTranscriptionApi, JobEvent, JobRegistry, Result,
    TextAnnotator, TranscriptView, TranscriptionApi, UploadTask,
};

#[derive(Parser, Debug)]
#[command(name = "scribedesk", version, about = "Audio transcription dashboard client")]
struct Cli {
    /// Config file (JSON or YAML). Defaults to the platform config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `server.base_url`.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, env = "SCRIBEDESK_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload recordings and follow them until they finish.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Request `[MM:SS]` markers.
        #[arg(long)]
        timestamps: bool,
        /// Request speaker separation.
        #[arg(long)]
        diarize: bool,
    },
    /// List finished transcriptions.
    History {
        /// Every user's records (privileged).
        #[arg(long)]
        all: bool,
        #[arg(long)]
        file: Option<String>,
        /// `failed` or an analysis status.
        #[arg(long)]
        status: Option<String>,
        /// Completion date prefix, e.g. 2024-03-01.
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Print an annotated transcript.
    Transcript {
        id: String,
        /// Mark the line playing at this many seconds.
        #[arg(long)]
        at: Option<f64>,
    },
}

fn build_api(cli: &Cli, config: &EngineConfig) -> Result<Arc<HttpTranscriptionApi>> {
    let mut api = HttpTranscriptionApi::new(&config.server)?;
    if let Some(token) = &cli.token {
        api = api.with_token(SecretString::from(token.clone()));
    }
    Ok(Arc::new(api))
}

async fn upload(
    api: Arc<HttpTranscriptionApi>,
    config: &EngineConfig,
    files: &[PathBuf],
    options: UploadOptions,
) -> Result<bool> {
    let registry = JobRegistry::from_config(api, config);
    let mut events = registry.subscribe();

    let mut tasks = Vec::new();
    for path in files {
        let payload = UploadPayload::from_path(path)?;
        let (task, mut progress) = UploadTask::new(payload, options);
        let name = task.filename().to_string();
        tokio::spawn(async move {
            while let Some(fraction) = progress.recv().await {
                log::info!("{}: uploaded {:.0}%", name, fraction * 100.0);
            }
        });
        tasks.push(task);
    }

    let results = join_all(tasks.into_iter().map(|task| registry.submit(task))).await;
    let mut all_ok = true;
    for result in &results {
        if let Err(e) = result {
            eprintln!("upload failed: {}", e);
            all_ok = false;
        }
    }

    loop {
        let counts = registry.counts();
        if counts.queued + counts.processing + counts.completed == 0 {
            break;
        }
        match events.recv().await {
            Ok(JobEvent::Completed { job, .. }) => println!("{}  completed  {}", job.id, job.filename),
            Ok(JobEvent::Failed { job, .. }) => {
                all_ok = false;
                println!(
                    "{}  {}  {}: {}",
                    job.id,
                    job.status,
                    job.filename,
                    job.error.as_deref().unwrap_or_default()
                );
            }
            Ok(JobEvent::Updated { job, .. }) => {
                log::info!("{}: {} {}%", job.filename, job.status, job.progress)
            }
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => break,
        }
    }

    Ok(all_ok)
}

fn print_row(row: &HistoryRow) {
    match row {
        HistoryRow::Active(job) => println!("{}  {}  {}", job.id, job.status, job.filename),
        HistoryRow::Record(record) => println!(
            "{}  {:?}  {}  {}  {}",
            record.task_id,
            record.status,
            record.completed_at.as_deref().unwrap_or("-"),
            record.analysis_status,
            record.filename
        ),
    }
}

async fn history(api: &dyn TranscriptionApi, all: bool, filter: HistoryFilter) -> Result<()> {
    let mut view = HistoryView::new(all);
    if all {
        view.set_scope(HistoryScope::All);
    }
    view.set_filter(filter);

    let records = api.fetch_history(view.scope()).await?;
    for row in view.render(&[], &records) {
        print_row(&row);
    }
    Ok(())
}

async fn transcript(api: &dyn TranscriptionApi, id: &str, at: Option<f64>) -> Result<()> {
    let keywords = match api.fetch_keywords().await {
        Ok(keywords) => keywords,
        Err(e) => {
            log::warn!("Keyword lists unavailable, printing without highlights: {}", e);
            Default::default()
        }
    };
    let annotator = TextAnnotator::new(keywords);
    let view = TranscriptView::open(api, id, &annotator).await?;

    println!("{}", view.filename);
    if let Some(duration) = view.formatted_duration() {
        println!("duration: {}", duration);
    }
    if let Some(summary) = &view.summary {
        println!("summary: {}", summary);
    }
    if !view.topics.is_empty() {
        println!("topics: {}", view.topics.join(", "));
    }
    println!();

    let active = at.and_then(|secs| view.synchronizer().on_time_update(secs));
    for (index, line) in view.lines.iter().enumerate() {
        let marker = if active == Some(index) { ">" } else { " " };
        let time = line
            .time_seconds
            .map(|t| format!("[{}] ", format_timestamp(t)))
            .unwrap_or_default();
        let speaker = line
            .speaker
            .as_deref()
            .map(|s| format!("{}: ", s))
            .unwrap_or_default();
        let body: String = line
            .segments
            .iter()
            .map(|segment| match segment.category {
                Some(category) => format!("*{}*({})", segment.text, category),
                None => segment.text.clone(),
            })
            .collect();
        println!("{} {}{}{}", marker, time, speaker, body);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<bool> {
    let mut config = load_config_or_default(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
    }
    init_logging(&config.logging)?;

    let api = build_api(&cli, &config)?;
    match &cli.command {
        Command::Upload {
            files,
            timestamps,
            diarize,
        } => {
            let options = UploadOptions {
                timestamps: *timestamps,
                diarization: *diarize,
            };
            upload(api, &config, files, options).await
        }
        Command::History {
            all,
            file,
            status,
            date,
            owner,
        } => {
            let filter = HistoryFilter {
                filename: file.clone(),
                date: date.clone(),
                status: status.clone(),
                owner: owner.clone(),
            };
            history(api.as_ref(), *all, filter).await?;
            Ok(true)
        }
        Command::Transcript { id, at } => {
            transcript(api.as_ref(), id, *at).await?;
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
