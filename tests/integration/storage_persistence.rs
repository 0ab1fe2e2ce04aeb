//! Integration tests for the registry over the SQLite store
//!
//! These tests verify that:
//! - Records survive reopening the database
//! - The unique index on `name` holds under concurrent creates
//! - Partial updates and deletes behave as against the in-memory store

use std::sync::Arc;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rmon::{
    Registry, RegistryError, TargetFields,
    storage::{NewTarget, StorageError, TargetStore, sqlite::SqliteBackend},
};
use tempfile::tempdir;

use super::helpers::fields;

async fn sqlite_registry(path: &std::path::Path) -> (Registry, Arc<SqliteBackend>) {
    let backend = Arc::new(SqliteBackend::new(path).await.unwrap());
    (Registry::new(backend.clone()), backend)
}

#[tokio::test]
async fn test_create_and_reload() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("rmon.db");

    let created = {
        let (registry, backend) = sqlite_registry(&db_path).await;
        let created = registry
            .create(TargetFields {
                description: Some("primary cache".to_string()),
                password: Some("pw".to_string()),
                ..fields("cache-1", "10.0.0.5")
            })
            .await
            .unwrap();
        backend.close().await.unwrap();
        created
    };

    assert_eq!(created.port, 6379);
    assert_eq!(created.created_at, created.updated_at);

    let (registry, _backend) = sqlite_registry(&db_path).await;
    let reloaded = registry.get(created.id).await.unwrap();

    assert_eq!(reloaded, created);
    assert_eq!(reloaded.password.as_deref(), Some("pw"));
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    let temp_dir = tempdir().unwrap();
    let (registry, _backend) = sqlite_registry(&temp_dir.path().join("rmon.db")).await;

    registry.create(fields("cache-1", "10.0.0.5")).await.unwrap();
    let result = registry.create(fields("cache-1", "10.0.0.6")).await;

    assert_matches!(result, Err(RegistryError::Validation(e)) if e.field == "name");
    assert_eq!(registry.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_store_enforces_unique_name() {
    let temp_dir = tempdir().unwrap();
    let backend = SqliteBackend::new(temp_dir.path().join("rmon.db"))
        .await
        .unwrap();

    let new_target = NewTarget {
        name: "cache-1".to_string(),
        description: None,
        host: "10.0.0.5".to_string(),
        port: 6379,
        password: None,
        created_at: chrono::Utc::now(),
    };

    backend.insert(new_target.clone()).await.unwrap();
    let result = backend.insert(new_target).await;

    assert_matches!(result, Err(StorageError::UniqueViolation(name)) if name == "cache-1");
}

#[tokio::test]
async fn test_concurrent_creates_with_same_name() {
    let temp_dir = tempdir().unwrap();
    let (registry, _backend) = sqlite_registry(&temp_dir.path().join("rmon.db")).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            registry
                .create(fields("contended", &format!("10.0.0.{i}")))
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(RegistryError::Validation(e)) => assert_eq!(e.field, "name"),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(registry.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_partial_update_roundtrip() {
    let temp_dir = tempdir().unwrap();
    let (registry, _backend) = sqlite_registry(&temp_dir.path().join("rmon.db")).await;

    let created = registry
        .create(TargetFields {
            port: Some(7000),
            ..fields("cache-1", "10.0.0.5")
        })
        .await
        .unwrap();

    let updated = registry
        .update(
            created.id,
            TargetFields {
                description: Some("primary cache".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.port, 7000);
    assert_eq!(updated.host, "10.0.0.5");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(registry.get(created.id).await.unwrap(), updated);
}

#[tokio::test]
async fn test_rename_onto_other_record_keeps_name() {
    let temp_dir = tempdir().unwrap();
    let (registry, _backend) = sqlite_registry(&temp_dir.path().join("rmon.db")).await;

    let a = registry.create(fields("cache-a", "10.0.0.5")).await.unwrap();
    registry.create(fields("cache-b", "10.0.0.6")).await.unwrap();

    let result = registry
        .update(
            a.id,
            TargetFields {
                name: Some("cache-b".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert_matches!(result, Err(RegistryError::Validation(e)) if e.field == "name");
    assert_eq!(registry.get(a.id).await.unwrap().name, "cache-a");
}

#[tokio::test]
async fn test_delete_and_list_order() {
    let temp_dir = tempdir().unwrap();
    let (registry, _backend) = sqlite_registry(&temp_dir.path().join("rmon.db")).await;

    let a = registry.create(fields("cache-a", "10.0.0.5")).await.unwrap();
    let b = registry.create(fields("cache-b", "10.0.0.6")).await.unwrap();
    let c = registry.create(fields("cache-c", "10.0.0.7")).await.unwrap();

    registry.delete(b.id).await.unwrap();

    let ids: Vec<_> = registry
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![a.id, c.id]);

    assert_matches!(registry.delete(b.id).await, Err(RegistryError::NotFound(_)));
}
