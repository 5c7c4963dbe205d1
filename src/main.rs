use anyhow::{Context, Result};
use chatstash::cli::{Cli, Commands};
use chatstash::storage::filesystem::FileSystemStorage;
use chatstash::{utils, ChatStorage, GeminiClient, Settings, TextGenerator};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // `--help` and argument errors exit here, before any configuration is read.
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let mut settings = Settings::new().context("Failed to load configuration")?;
    init_tracing(&settings.logging.level);

    let result = match cli.command {
        Commands::Serve { host, port, storage_dir } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            override_storage(&mut settings, storage_dir);
            handle_serve(settings).await
        }
        Commands::List { latest, storage_dir } => {
            override_storage(&mut settings, storage_dir);
            handle_list(&settings, latest).await
        }
        Commands::Show { id, storage_dir } => {
            override_storage(&mut settings, storage_dir);
            handle_show(&settings, &id).await
        }
        Commands::Generate { prompt, model } => handle_generate(&settings, prompt, model).await,
    };

    if let Err(e) = result {
        utils::print_error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn override_storage(settings: &mut Settings, storage_dir: Option<String>) {
    if let Some(dir) = storage_dir {
        settings.storage.root_path = PathBuf::from(dir);
    }
}

async fn handle_serve(settings: Settings) -> Result<()> {
    // Startup refuses to run without credentials for the generation API.
    let api_key = Settings::api_key()?;
    chatstash::serve(settings, api_key).await
}

async fn handle_list(settings: &Settings, latest: bool) -> Result<()> {
    let storage = FileSystemStorage::from_config(&settings.storage).await?;

    let chats = if latest {
        storage.list_latest(chatstash::api::LATEST_CHATS_LIMIT).await?
    } else {
        storage.list_all().await?
    };

    utils::print_header(&format!("Chats in {}", storage.root_path().display()));
    utils::print_summaries(&chats);
    Ok(())
}

async fn handle_show(settings: &Settings, id: &str) -> Result<()> {
    let storage = FileSystemStorage::from_config(&settings.storage).await?;
    let chat = storage.load(id).await?;
    utils::print_chat(&chat);
    Ok(())
}

async fn handle_generate(settings: &Settings, prompt: String, model: Option<String>) -> Result<()> {
    let api_key = Settings::api_key()?;
    let client = GeminiClient::new(api_key, &settings.llm)?;
    let model = model.unwrap_or_else(|| settings.llm.model.clone());

    utils::print_info(&format!("Sending request to {}...", model));
    let response = client.generate(&prompt, &model).await?;

    println!("\n{}", response);
    Ok(())
}
