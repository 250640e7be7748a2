use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use card_core::{
    register_print_card, CardRegistry, HomeAssistantClient, PdfFile, PrintCard, SubmitOutcome,
};
use clap::{Parser, Subcommand};
use shared::domain::CardConfig;
use tracing::info;

mod config;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides the host URL from settings.
    #[arg(long)]
    hass_url: Option<String>,
    /// Overrides the access token from settings.
    #[arg(long)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a PDF and send it to the configured printer entity.
    Print {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        entity: Option<String>,
    },
    /// Run the card editor against the configured entity and print the resulting event.
    SetEntity { entity: String },
    /// List the cards offered to the host's card picker.
    Cards,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(url) = cli.hass_url {
        settings.hass_url = url;
    }
    if let Some(token) = cli.token {
        settings.access_token = token;
    }

    match cli.command {
        Command::Print { file, entity } => print(&settings, file, entity).await,
        Command::SetEntity { entity } => set_entity(&settings, &entity),
        Command::Cards => {
            let mut registry = CardRegistry::new();
            register_print_card(&mut registry);
            for card in registry.cards() {
                println!("{}\t{}\t{}", card.card_type, card.name, card.description);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn print(settings: &Settings, path: PathBuf, entity: Option<String>) -> Result<ExitCode> {
    let client = HomeAssistantClient::new(&settings.hass_url)?;
    let card = PrintCard::new(Arc::new(client.clone()));

    let entity = entity.or_else(|| settings.entity.clone()).unwrap_or_default();
    card.set_config(CardConfig::new(entity))?;
    card.set_context(client.connection_context(settings.access_token.clone()));

    let file = PdfFile::read(&path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    info!(file = %file.name, size = file.bytes.len(), host = %client.base_url(), "submitting document");
    card.select_file(file).await;

    let mut statuses = card.controller().subscribe();
    let (outcome, ()) = tokio::join!(card.print(), async {
        while let Ok(status) = statuses.recv().await {
            println!("{}", status.text());
            if status.is_terminal() {
                break;
            }
        }
    });

    Ok(match outcome {
        SubmitOutcome::Sent { .. } => ExitCode::SUCCESS,
        SubmitOutcome::Failed(_) | SubmitOutcome::Busy => ExitCode::FAILURE,
    })
}

fn set_entity(settings: &Settings, entity: &str) -> Result<ExitCode> {
    let client = HomeAssistantClient::new(&settings.hass_url)?;
    let current = settings
        .entity
        .clone()
        .map(CardConfig::new)
        .unwrap_or_else(PrintCard::stub_config);

    let mut editor = PrintCard::config_element();
    editor.mount();
    editor.set_config(current);
    editor.set_context(client.connection_context(settings.access_token.clone()));

    match editor.on_value_changed(entity) {
        Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
        None => println!("entity unchanged; no {} event", shared::protocol::CONFIG_CHANGED_EVENT),
    }
    Ok(ExitCode::SUCCESS)
}
