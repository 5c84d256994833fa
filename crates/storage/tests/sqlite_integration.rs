use storage::repository::{ClientStateRepository, StateKey, Storage};
use storage::sqlite::SqliteClientStore;

#[tokio::test]
async fn sqlite_persists_and_overwrites_values() {
    let repo = SqliteClientStore::connect("sqlite:file:memdb_client_state?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.set(StateKey::Token, "first").await.unwrap();
    repo.set(StateKey::Token, "second").await.unwrap();
    repo.set(StateKey::SelectedLanguage, "de").await.unwrap();

    assert_eq!(repo.get(StateKey::Token).await.unwrap().as_deref(), Some("second"));
    assert_eq!(
        repo.get(StateKey::SelectedLanguage).await.unwrap().as_deref(),
        Some("de")
    );
    assert_eq!(repo.get(StateKey::Role).await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_remove_is_idempotent() {
    let repo = SqliteClientStore::connect("sqlite:file:memdb_remove?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.set(StateKey::Username, "ana").await.unwrap();
    repo.remove(StateKey::Username).await.unwrap();
    repo.remove(StateKey::Username).await.unwrap();
    assert_eq!(repo.get(StateKey::Username).await.unwrap(), None);
}

#[tokio::test]
async fn migrations_can_run_twice() {
    let repo = SqliteClientStore::connect("sqlite:file:memdb_migrate_twice?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_builds_client_state() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage
        .client_state
        .set(StateKey::Theme, "dark")
        .await
        .unwrap();
    assert_eq!(
        storage.client_state.get(StateKey::Theme).await.unwrap().as_deref(),
        Some("dark")
    );
}
