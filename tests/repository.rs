use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use restbase::{
    Error, Filter, FilterOperator, MemoryTableStore, Query, Repository, Row, StoreError,
    TableStore,
};

/// Store that fails every call, for exercising the error funnel.
struct UnreachableStore;

#[async_trait]
impl TableStore for UnreachableStore {
    async fn execute(&self, _query: &Query) -> Result<Vec<Row>, StoreError> {
        Err(StoreError::Transport("network unreachable".to_string()))
    }
}

async fn seeded_users() -> (Arc<MemoryTableStore>, Repository) {
    let store = Arc::new(MemoryTableStore::new());
    let repo = Repository::new("users", "id", store.clone());

    for user in [
        json!({"id": "42", "name": "Alice", "age": 30, "active": true}),
        json!({"id": "43", "name": "Bob", "age": 17, "active": true}),
        json!({"id": "44", "name": "Carol", "age": 25, "active": false}),
    ] {
        repo.create(user).await.unwrap();
    }

    (store, repo)
}

#[tokio::test]
async fn create_returns_inserted_representation() {
    let store = Arc::new(MemoryTableStore::new());
    let repo = Repository::new("users", "id", store);

    let rows = repo
        .create(json!({"id": "1", "name": "Alice"}))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("Alice"));
}

#[tokio::test]
async fn read_filters_on_primary_key_by_default() {
    let (_, repo) = seeded_users().await;

    let rows = repo.read(json!("42"), None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("Alice"));

    let none = repo.read(json!("99"), None).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn read_filters_on_explicit_column() {
    let (_, repo) = seeded_users().await;

    let rows = repo.read(json!("Bob"), Some("name")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!("43"));
}

#[tokio::test]
async fn update_defaults_to_primary_key_and_returns_updated_rows() {
    let (store, repo) = seeded_users().await;

    let rows = repo
        .update(json!("42"), json!({"age": 31}), None)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["age"], json!(31));
    assert_eq!(rows[0]["name"], json!("Alice"));

    let stored = store.snapshot("users");
    let alice = stored.iter().find(|r| r["id"] == json!("42")).unwrap();
    assert_eq!(alice["age"], json!(31));
}

#[tokio::test]
async fn update_on_explicit_column_touches_all_matches() {
    let (_, repo) = seeded_users().await;

    let rows = repo
        .update(json!(true), json!({"active": false}), Some("active"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["active"] == json!(false)));
}

#[tokio::test]
async fn delete_returns_deleted_rows_and_removes_them() {
    let (store, repo) = seeded_users().await;

    let rows = repo.delete(json!("42"), None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("Alice"));

    assert_eq!(store.snapshot("users").len(), 2);
    assert!(repo.read(json!("42"), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn filter_applies_greater_than_predicate() {
    let (_, repo) = seeded_users().await;

    let rows = repo
        .filter(
            vec![Filter::new("age", FilterOperator::Gt, json!(18))],
            None,
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["age"].as_i64().unwrap() > 18));
}

#[tokio::test]
async fn filter_ands_multiple_predicates() {
    let (_, repo) = seeded_users().await;

    let rows = repo
        .filter(
            vec![
                Filter::new("age", FilterOperator::Gt, json!(18)),
                Filter::new("active", FilterOperator::Eq, json!(true)),
            ],
            None,
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("Alice"));
}

#[tokio::test]
async fn filter_narrows_selected_columns() {
    let (_, repo) = seeded_users().await;

    let rows = repo
        .filter(
            vec![Filter::new("id", FilterOperator::Eq, json!("42"))],
            Some("id,name"),
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains_key("name"));
    assert!(!rows[0].contains_key("age"));
}

#[test]
fn invalid_operator_fails_before_any_remote_call() {
    // どのストア呼び出しよりも前に検証エラーになる
    let err = Filter::from_parts("age", "between", json!(18)).unwrap_err();
    assert!(matches!(err, Error::InvalidFilter(_)));
    assert!(err.to_string().contains("between"));
}

#[tokio::test]
async fn remote_failure_surfaces_domain_error_with_context() {
    let repo = Repository::new("users", "id", Arc::new(UnreachableStore));

    let err = repo.delete(json!("42"), None).await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("Failed to delete record: network unreachable"));
    assert!(text.contains("users"));

    let err = repo.read(json!("42"), None).await.unwrap_err();
    assert!(err.to_string().contains("Failed to read record:"));

    let err = repo.create(json!({"id": "1"})).await.unwrap_err();
    assert!(err.to_string().contains("Failed to create record:"));

    let err = repo.filter(vec![], None).await.unwrap_err();
    assert!(err.to_string().contains("Failed to filter record:"));
}

#[tokio::test]
async fn repositories_share_one_store_without_coordination() {
    let store = Arc::new(MemoryTableStore::new());
    let users = Repository::new("users", "id", store.clone());
    let posts = Repository::new("posts", "id", store.clone());

    users.create(json!({"id": "1"})).await.unwrap();
    posts.create(json!({"id": "p1", "author": "1"})).await.unwrap();

    assert_eq!(store.snapshot("users").len(), 1);
    assert_eq!(store.snapshot("posts").len(), 1);
}
