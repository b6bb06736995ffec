//! Persistence gateway contract tests: remote path, fallback path, sync

use chrono::Utc;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cadastro_moradores::config::ClientOptions;
use cadastro_moradores::error::Error;
use cadastro_moradores::model::{Housing, Resident, ResidentDraft, ResidentPatch};
use cadastro_moradores::store::PersistMode;
use cadastro_moradores::Cadastro;

/// A backend address that refuses connections
const DEAD_BACKEND: &str = "http://127.0.0.1:9";

fn draft(name: &str, cpf: &str) -> ResidentDraft {
    ResidentDraft {
        name: name.into(),
        cpf: cpf.into(),
        rg: "12.345.678-9".into(),
        phone: "(24) 99999-0000".into(),
        email: "teste@example.com".into(),
        address: "Rua A, 1".into(),
        housing: Housing::Owned,
        residents: 2,
        ..Default::default()
    }
}

fn client(url: &str, data_dir: &std::path::Path) -> Cadastro {
    let options = ClientOptions::default().with_data_dir(data_dir);
    Cadastro::new_with_options(url, "anon-key", options)
}

#[tokio::test]
async fn create_assigns_identity_and_creation_stamp() {
    let dir = tempfile::tempdir().unwrap();
    let store = client(DEAD_BACKEND, dir.path()).store();

    let first = store.create(draft("Maria", "111")).await.unwrap();
    let second = store.create(draft("João", "222")).await.unwrap();

    assert_ne!(first.value.id, second.value.id);
    assert!(first.value.updated_at.is_none());
    assert!(second.value.updated_at.is_none());
}

#[tokio::test]
async fn create_falls_back_to_local_mirror_when_remote_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let store = client(DEAD_BACKEND, dir.path()).store();

    let stored = store.create(draft("Maria", "123.456.789-00")).await.unwrap();
    assert_eq!(stored.mode, PersistMode::LocalOnly);

    // a subsequent list reflects the new record from the mirror
    let listed = store.list().await.unwrap();
    assert_eq!(listed.mode, PersistMode::LocalOnly);
    assert!(listed.value.iter().any(|r| r.id == stored.value.id));
}

#[tokio::test]
async fn create_round_trips_through_the_remote_store() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let confirmed = draft("Maria", "123.456.789-00").into_resident(Uuid::new_v4(), Utc::now());
    Mock::given(method("POST"))
        .and(path("/rest/v1/residents"))
        .respond_with(ResponseTemplate::new(201).set_body_json(vec![confirmed.clone()]))
        .mount(&server)
        .await;

    let store = client(&server.uri(), dir.path()).store();
    let stored = store.create(draft("Maria", "123.456.789-00")).await.unwrap();

    assert_eq!(stored.mode, PersistMode::RemoteConfirmed);
    assert_eq!(stored.value.id, confirmed.id);

    // the mirror is kept in sync with the confirmed row
    let mirrored = store.mirror().read().unwrap();
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored[0].id, confirmed.id);
}

#[tokio::test]
async fn list_orders_newest_first_and_syncs_the_mirror() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let now = Utc::now();
    let older = draft("Velha", "111").into_resident(Uuid::new_v4(), now - chrono::Duration::days(1));
    let newer = draft("Nova", "222").into_resident(Uuid::new_v4(), now);
    Mock::given(method("GET"))
        .and(path("/rest/v1/residents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![older.clone(), newer.clone()]))
        .mount(&server)
        .await;

    let store = client(&server.uri(), dir.path()).store();
    let listed = store.list().await.unwrap();

    assert_eq!(listed.mode, PersistMode::RemoteConfirmed);
    assert_eq!(listed.value[0].id, newer.id);
    assert_eq!(listed.value[1].id, older.id);
    assert_eq!(store.mirror().read().unwrap().len(), 2);
}

#[tokio::test]
async fn update_preserves_absent_fields_and_stamps_updated_at() {
    let dir = tempfile::tempdir().unwrap();
    let store = client(DEAD_BACKEND, dir.path()).store();

    let created = store
        .create(draft("Maria", "123.456.789-00"))
        .await
        .unwrap()
        .into_value();

    let patch = ResidentPatch {
        phone: Some("(24) 98888-1111".into()),
        ..Default::default()
    };
    let updated = store.update(created.id, patch).await.unwrap().into_value();

    assert_eq!(updated.phone, "(24) 98888-1111");
    assert_eq!(updated.name, "Maria");
    assert_eq!(updated.cpf, "123.456.789-00");
    assert_eq!(updated.created_at, created.created_at);
    let first_update = updated.updated_at.unwrap();
    assert!(first_update >= created.created_at);

    // a second update never moves the stamp backwards
    let patch = ResidentPatch {
        address: Some("Rua B, 2".into()),
        ..Default::default()
    };
    let again = store.update(created.id, patch).await.unwrap().into_value();
    assert!(again.updated_at.unwrap() >= first_update);
    assert_eq!(again.phone, "(24) 98888-1111");
}

#[tokio::test]
async fn update_round_trips_through_the_remote_store() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let current = draft("Maria", "111").into_resident(Uuid::new_v4(), Utc::now());
    let mut confirmed = current.clone();
    confirmed.phone = "(24) 90000-9999".into();
    confirmed.updated_at = Some(Utc::now());

    Mock::given(method("GET"))
        .and(path("/rest/v1/residents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![current.clone()]))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/residents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![confirmed.clone()]))
        .mount(&server)
        .await;

    let store = client(&server.uri(), dir.path()).store();
    let patch = ResidentPatch {
        phone: Some("(24) 90000-9999".into()),
        ..Default::default()
    };
    let stored = store.update(current.id, patch).await.unwrap();

    assert_eq!(stored.mode, PersistMode::RemoteConfirmed);
    assert_eq!(stored.value.phone, "(24) 90000-9999");
    assert_eq!(store.mirror().read().unwrap()[0].phone, "(24) 90000-9999");
}

#[tokio::test]
async fn update_rejects_a_patch_inconsistent_with_the_stored_record() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let mut current = draft("Maria", "111").into_resident(Uuid::new_v4(), Utc::now());
    current.elderly = true;
    current.elderly_age = Some(65);

    Mock::given(method("GET"))
        .and(path("/rest/v1/residents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![current.clone()]))
        .mount(&server)
        .await;
    // the patch is self-consistent but breaks the merged record, so it
    // must be rejected before anything reaches the table
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/residents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![current.clone()]))
        .expect(0)
        .mount(&server)
        .await;

    let store = client(&server.uri(), dir.path()).store();
    let patch = ResidentPatch {
        elderly_age: Some(Some(30)),
        ..Default::default()
    };
    let err = store.update(current.id, patch).await.unwrap_err();
    match err {
        Error::Validation(violations) => {
            assert!(violations.iter().any(|v| v.field == "elderlyAge"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn delete_of_nonexistent_id_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = client(DEAD_BACKEND, dir.path()).store();

    store.create(draft("Maria", "111")).await.unwrap();
    let before = store.list().await.unwrap().into_value();

    store.delete(Uuid::new_v4()).await.unwrap();

    let after = store.list().await.unwrap().into_value();
    assert_eq!(before.len(), after.len());
}

#[tokio::test]
async fn delete_removes_from_both_media() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/residents"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store = client(&server.uri(), dir.path()).store();
    let resident = draft("Maria", "111").into_resident(Uuid::new_v4(), Utc::now());
    store.mirror().upsert(&resident).unwrap();

    let stored = store.delete(resident.id).await.unwrap();
    assert_eq!(stored.mode, PersistMode::RemoteConfirmed);
    assert!(store.mirror().read().unwrap().is_empty());
}

#[tokio::test]
async fn gateway_rejects_invalid_drafts_before_persisting() {
    let dir = tempfile::tempdir().unwrap();
    let store = client(DEAD_BACKEND, dir.path()).store();

    let mut invalid = draft("Maria", "111");
    invalid.has_disability = true; // missing cid and description

    let err = store.create(invalid).await.unwrap_err();
    match err {
        Error::Validation(violations) => {
            assert!(violations.iter().any(|v| v.field == "cid"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }

    // nothing reached the mirror
    assert!(store.mirror().read().unwrap().is_empty());
}

#[tokio::test]
async fn store_events_fire_after_successful_mutations() {
    use cadastro_moradores::store::StoreEvent;

    let dir = tempfile::tempdir().unwrap();
    let store = client(DEAD_BACKEND, dir.path()).store();
    let mut events = store.subscribe();

    let created = store.create(draft("Maria", "111")).await.unwrap().into_value();
    assert_eq!(events.recv().await.unwrap(), StoreEvent::Created(created.id));

    store.delete(created.id).await.unwrap();
    assert_eq!(events.recv().await.unwrap(), StoreEvent::Deleted(created.id));
}

#[tokio::test]
async fn remote_list_failure_reads_mirror_written_earlier() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let resident = draft("Maria", "111").into_resident(Uuid::new_v4(), Utc::now());
    Mock::given(method("GET"))
        .and(path("/rest/v1/residents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![resident.clone()]))
        .expect(1)
        .mount(&server)
        .await;

    let store = client(&server.uri(), dir.path()).store();
    assert_eq!(store.list().await.unwrap().mode, PersistMode::RemoteConfirmed);

    // same data directory, dead backend: the mirror still serves the records
    let offline = client(DEAD_BACKEND, dir.path()).store();
    let listed = offline.list().await.unwrap();
    assert_eq!(listed.mode, PersistMode::LocalOnly);
    assert_eq!(listed.value.len(), 1);
    assert_eq!(listed.value[0].id, resident.id);
}
