// src/main.rs
mod extractors;
mod output;
mod prompt;
mod storage;
mod stream;
mod utils;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use extractors::{Manuscript, ManuscriptExtractor, StreamPhase};
use prompt::GenerationConfig;
use storage::StorageManager;
use stream::{run_session, source, GenerationSession};
use utils::AppError;

/// Extracts title, story and author's note from streamed manuscript markdown
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory for saved manuscripts
    #[arg(short, long, global = true, env = "MANUSCRIPT_OUTPUT_DIR", default_value = "./output")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a manuscript file once
    Parse {
        /// Markdown file to read
        file: PathBuf,

        /// Treat the file as a partial stream (enables the whole-text body fallback)
        #[arg(long)]
        streaming: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Save markdown and metadata under the output directory
        #[arg(long)]
        save: bool,

        /// Write a line-by-line classification dump to this path
        #[arg(long)]
        dump_segments: Option<PathBuf>,
    },

    /// Follow a generation as it streams in (stdin by default)
    Watch {
        /// Replay a saved markdown file instead of reading stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Characters per replayed chunk
        #[arg(long, env = "MANUSCRIPT_CHUNK_SIZE", default_value = "24")]
        chunk_size: usize,

        /// Pause between replayed chunks in milliseconds
        #[arg(long, env = "MANUSCRIPT_DELAY_MS", default_value = "40")]
        delay_ms: u64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Save markdown and metadata under the output directory
        #[arg(long)]
        save: bool,
    },

    /// Print the system and user prompts for a generation config
    Prompt {
        /// JSON generation config
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn print_manuscript(manuscript: &Manuscript, json: bool) -> Result<(), AppError> {
    if json {
        let rendered = output::render_json(manuscript)
            .map_err(|e| AppError::Processing(format!("Could not serialize manuscript: {}", e)))?;
        println!("{}", rendered);
    } else {
        print!("{}", output::render_text(manuscript));
    }
    Ok(())
}

fn save(output_dir: &Path, manuscript: &Manuscript, markdown: &str) -> Result<(), AppError> {
    let storage = StorageManager::new(output_dir)?;
    storage.save_manuscript(manuscript, markdown)?;
    storage.save_metadata(manuscript)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting with args: {:?}", args);

    match args.command {
        Command::Parse { file, streaming, json, save: should_save, dump_segments } => {
            let raw = tokio::fs::read_to_string(&file).await?;
            tracing::info!("Read {} ({} bytes)", file.display(), raw.len());

            if let Some(path) = dump_segments {
                utils::segment_debug::write_segment_dump(&raw, &path)?;
            }

            let phase = if streaming { StreamPhase::Streaming } else { StreamPhase::Complete };
            let manuscript = ManuscriptExtractor::new()
                .extract(&raw, phase)
                .ok_or_else(|| AppError::Processing(format!("{} is empty", file.display())))?;

            print_manuscript(&manuscript, json)?;
            if should_save {
                save(&args.output_dir, &manuscript, &raw)?;
            }
        }

        Command::Watch { input, chunk_size, delay_ms, json, save: should_save } => {
            if chunk_size == 0 {
                return Err(AppError::Config("--chunk-size must be greater than 0".to_string()));
            }

            // 3. Open the text source
            let rx = match &input {
                Some(path) => source::open_replay(path, chunk_size, Duration::from_millis(delay_ms)).await?,
                None => source::spawn_stdin(),
            };

            // 4. Re-extract on every chunk
            let mut session = GenerationSession::new();
            let mut last_title: Option<String> = None;
            let result = run_session(&mut session, rx, |manuscript| {
                let title = manuscript.title.value().map(str::to_string);
                if title.is_some() && title != last_title {
                    tracing::info!("Title: {}", manuscript.display_title());
                    last_title = title;
                }
                tracing::debug!(
                    "Body {} chars ({:?}), note ready: {}",
                    manuscript.body.chars().count(),
                    manuscript.body_source,
                    manuscript.is_metadata_ready()
                );
            })
            .await;

            // 5. Final render (partial text is still shown if the source broke off)
            let finished = match result {
                Ok(finished) => finished,
                Err(e) => {
                    if let Some(partial) = session.current() {
                        tracing::warn!("Showing partial manuscript, session is {:?}", session.state());
                        print_manuscript(&partial, json)?;
                    }
                    return Err(e.into());
                }
            };
            tracing::info!("Stream closed after {} chunks", session.chunk_count());
            let manuscript = finished.ok_or_else(|| {
                AppError::Processing("Text source ended without producing any text".to_string())
            })?;
            print_manuscript(&manuscript, json)?;
            if should_save {
                save(&args.output_dir, &manuscript, session.markdown())?;
            }
        }

        Command::Prompt { config } => {
            let config = GenerationConfig::load(&config).await?;
            println!("{}", prompt::system_prompt());
            println!("{}", prompt::build_user_prompt(&config));
        }
    }

    tracing::info!("Processing finished.");
    Ok(())
}
