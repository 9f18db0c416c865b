use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use study::config::Config;
use study::error::AppError;
use study::session::{Command, Session};
use study::store::StudyStore;
use study_core::config::EmbedConfig;
use study_core::import::import_study;
use study_core::model::StudyFile;
use study_core::{notation, rules};

#[derive(Parser)]
#[command(name = "study", about = "Annotated chess studies with variations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a study, optionally from a PGN file or a FEN
    New {
        #[arg(long, conflicts_with = "fen")]
        pgn: Option<PathBuf>,
        #[arg(long)]
        fen: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Print the board and move list of a study
    Show { id: String },
    /// Show the study referenced by an embed block
    Embed { file: PathBuf },
    /// Edit a study interactively from stdin
    Session { id: String },
    /// Print a study as PGN
    Export { id: String },
}

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let store = StudyStore::new(&config.storage_path);

    if let Err(e) = run(cli.command, &config, &store).await {
        eprintln!("{}", e.notice());
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &Config, store: &StudyStore) -> Result<(), AppError> {
    match command {
        Commands::New { pgn, fen, title } => {
            let mut study = match (pgn, fen) {
                (Some(path), _) => {
                    let text = tokio::fs::read_to_string(&path)
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Cannot read {}: {e}", path.display())))?;
                    import_study(&text)?
                }
                (None, Some(fen)) => StudyFile::new(None, rules::LivePosition::from_fen(&fen)?.fen()),
                (None, None) => StudyFile::default(),
            };
            if title.is_some() {
                study.header.title = title;
            }
            let id = store.save(&study, None).await?;
            tracing::info!("Created study {} in {}", id, store.root().display());
            println!("{id}");
        }
        Commands::Show { id } => {
            let session = Session::open(store, &id, config.settings).await?;
            println!("{}", session.board_text());
            println!(
                "{}",
                notation::move_list_text(
                    &session.state().study,
                    session.state().current_move.as_ref(),
                    config.settings.view_comments,
                )?
            );
        }
        Commands::Embed { file } => {
            let source = tokio::fs::read_to_string(&file)
                .await
                .map_err(|e| AppError::BadRequest(format!("Cannot read {}: {e}", file.display())))?;
            let embed = EmbedConfig::parse(config.settings, &source)?;
            let session = Session::open(store, &embed.study_id, embed.settings).await?;
            println!("{}", session.board_text());
            let state = session.state();
            println!(
                "{}",
                notation::move_list_text(&state.study, state.current_move.as_ref(), embed.settings.view_comments)?
            );
        }
        Commands::Session { id } => {
            let mut session = Session::open(store, &id, config.settings).await?;
            interact(&mut session, store).await?;
        }
        Commands::Export { id } => {
            let study = store.load(&id).await?;
            print!("{}", notation::to_pgn(&study));
        }
    }
    Ok(())
}

async fn interact(session: &mut Session, store: &StudyStore) -> Result<(), AppError> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", session.board_text());
    loop {
        stdout.write_all(b"> ").await.map_err(anyhow::Error::from)?;
        stdout.flush().await.map_err(anyhow::Error::from)?;

        let Some(line) = lines.next_line().await.map_err(anyhow::Error::from)? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit" | "q") {
            break;
        }

        let result = match Command::parse(line) {
            Ok(command) => session.run(command, store).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(output) => println!("{output}"),
            Err(e) => println!("{}", e.notice()),
        }
    }

    tracing::info!("Closed study {}", session.id());
    Ok(())
}
