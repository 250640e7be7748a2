use std::sync::Arc;

use card_core::{
    register_print_card, CardRegistry, HomeAssistantClient, JobStatus, PdfFile, PrintCard,
    SubmitError, SubmitOutcome,
};
use dev_host::{build_router, AppState, Settings};
use shared::{domain::CardConfig, protocol::JobRecordStatus};
use tempfile::TempDir;
use tokio::net::TcpListener;

const TOKEN: &str = "flow-token";

async fn start_host() -> (String, AppState, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = AppState::new(Settings {
        upload_dir: dir.path().to_path_buf(),
        access_token: TOKEN.to_string(),
        entities: vec!["sensor.office_printer".to_string()],
        ..Settings::default()
    });
    let app = build_router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), state, dir)
}

fn card_for(client: &HomeAssistantClient, entity: &str, token: &str) -> PrintCard {
    let card = PrintCard::new(Arc::new(client.clone()));
    card.set_config(CardConfig::new(entity)).expect("config");
    card.set_context(client.connection_context(token));
    card
}

#[tokio::test]
async fn card_prints_through_the_development_host() {
    let (base, state, _dir) = start_host().await;
    let client = HomeAssistantClient::new(&base).expect("client");
    let card = card_for(&client, "sensor.office_printer", TOKEN);

    card.select_file(PdfFile::new("doc.pdf", b"%PDF-1.7 flow".to_vec()))
        .await;
    let outcome = card.print().await;

    assert!(matches!(outcome, SubmitOutcome::Sent { .. }));
    assert_eq!(
        card.controller().status_text().await,
        "Print job sent successfully!"
    );
    let job = state.last_job().await.expect("job");
    assert_eq!(job.entity_id.as_str(), "sensor.office_printer");
    assert_eq!(job.status, JobRecordStatus::Simulated);

    let again = card.print().await;
    assert_eq!(again, SubmitOutcome::Failed(SubmitError::NoFileSelected));
}

#[tokio::test]
async fn bad_credential_fails_at_upload() {
    let (base, state, _dir) = start_host().await;
    let client = HomeAssistantClient::new(&base).expect("client");
    let card = card_for(&client, "sensor.office_printer", "stale");

    card.select_file(PdfFile::new("doc.pdf", b"%PDF".to_vec()))
        .await;
    card.print().await;

    assert_eq!(
        card.controller().status().await,
        JobStatus::Failed("401: Unauthorized".to_string())
    );
    assert!(card.controller().selected_file_name().await.is_some());
    assert!(state.last_job().await.is_none());

    card.set_context(client.connection_context(TOKEN));
    let retry = card.print().await;
    assert!(matches!(retry, SubmitOutcome::Sent { .. }));
}

#[tokio::test]
async fn multi_megabyte_document_is_uploaded_and_printed() {
    let (base, state, _dir) = start_host().await;
    let client = HomeAssistantClient::new(&base).expect("client");
    let card = card_for(&client, "sensor.office_printer", TOKEN);

    let mut bytes = b"%PDF-1.7\n".to_vec();
    bytes.resize(5 * 1024 * 1024, b'0');
    card.select_file(PdfFile::new("scan.pdf", bytes)).await;
    let outcome = card.print().await;

    assert!(matches!(outcome, SubmitOutcome::Sent { .. }), "{outcome:?}");
    let job = state.last_job().await.expect("job");
    assert_eq!(job.entity_id.as_str(), "sensor.office_printer");
}

#[tokio::test]
async fn unknown_entity_surfaces_the_action_error() {
    let (base, _state, _dir) = start_host().await;
    let client = HomeAssistantClient::new(&base).expect("client");
    let card = card_for(&client, "sensor.basement", TOKEN);

    card.select_file(PdfFile::new("doc.pdf", b"%PDF".to_vec()))
        .await;
    let outcome = card.print().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(SubmitError::PrintInvocation(
            "Entity not found: sensor.basement".to_string()
        ))
    );
}

#[tokio::test]
async fn editor_edit_round_trips_into_the_card() {
    let (base, _state, _dir) = start_host().await;
    let client = HomeAssistantClient::new(&base).expect("client");
    let mut registry = CardRegistry::new();
    assert!(register_print_card(&mut registry).changed());

    let mut editor = PrintCard::config_element();
    editor.mount();
    editor.set_config(PrintCard::stub_config());
    editor.set_context(client.connection_context(TOKEN));

    let event = editor
        .on_value_changed("sensor.office_printer")
        .expect("event");
    let card = PrintCard::new(Arc::new(client.clone()));
    card.set_config(event.config).expect("persisted config");
    card.set_context(client.connection_context(TOKEN));
    card.select_file(PdfFile::new("doc.pdf", b"%PDF".to_vec()))
        .await;

    assert!(matches!(card.print().await, SubmitOutcome::Sent { .. }));
}
