use std::time::Instant;

use chronicle::api::create_router;
use chronicle::client::{ChronicleClient, ClientError};
use chronicle::db::Database;
use chronicle::draft::{CountryField, DraftEdit, DraftModel};
use chronicle::session::{EditingSession, SaveError, DEFAULT_AUTOSAVE_IDLE};
use chronicle::store::{CountryStore, StoreError};
use uuid::Uuid;

/// Serve a fresh in-memory database on an ephemeral port.
async fn spawn_server() -> ChronicleClient {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    ChronicleClient::new(format!("http://{}/api/v1", addr), None)
}

fn session_named(name: &str) -> EditingSession {
    let now = Instant::now();
    let mut session = EditingSession::new(DraftModel::empty(), DEFAULT_AUTOSAVE_IDLE);
    for field in [
        CountryField::Code(name.to_string()),
        CountryField::Name(name.to_string()),
        CountryField::Start("1815-06-09".to_string()),
    ] {
        session
            .apply_edit(DraftEdit::Country(field), now)
            .expect("Country edits always apply");
    }
    session
}

#[tokio::test]
async fn sessions_save_through_the_api() {
    let client = spawn_server().await;
    let mut session = session_named("Grand Fenwick");

    let created = session.save(&client).await.expect("Save failed");
    assert_eq!(created.code, "grand-fenwick");

    session
        .apply_edit(
            DraftEdit::Country(CountryField::End(Some("1959-12-31".into()))),
            Instant::now(),
        )
        .expect("Country edits always apply");
    let updated = session.save(&client).await.expect("Save failed");

    assert_eq!(updated.id, created.id);
    let loaded = client.load(created.id).await.expect("Load failed");
    assert_eq!(loaded, updated);
    assert_eq!(client.list_countries().await.expect("List failed").len(), 1);
}

#[tokio::test]
async fn conflicts_surface_as_store_errors() {
    let client = spawn_server().await;
    session_named("Genovia")
        .save(&client)
        .await
        .expect("Save failed");

    let mut duplicate = session_named("Genovia");
    let err = duplicate.save(&client).await.unwrap_err();

    assert!(matches!(err, SaveError::Store(StoreError::Conflict(_))));
    assert!(duplicate.message().is_some());
    assert!(duplicate.is_dirty());
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let client = spawn_server().await;
    let id = Uuid::new_v4();

    let err = client.load(id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(missing) if missing == id));

    let err = client.delete_country(id).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn holders_are_resolved_by_the_server() {
    let client = spawn_server().await;
    let country = session_named("Genovia")
        .save(&client)
        .await
        .expect("Save failed");

    let holders = client
        .holders_at(country.id, "1900-01-01")
        .await
        .expect("Query failed");
    assert_eq!(holders.president, None);
    assert_eq!(holders.monarch, None);

    let err = client
        .holders_at(country.id, "yesterday")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::BadRequest(_)));
}

#[tokio::test]
async fn unreachable_servers_are_backend_errors() {
    let client = ChronicleClient::new("http://127.0.0.1:9/api/v1", None);
    let err = client.load(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
}
