//! Engine + store integration tests against the in-memory adapter.

use std::sync::Arc;

use userhub_auth::{password, CredentialStore, PermissionSource};
use userhub_core::{GroupId, ServiceError};
use userhub_directory::{AccountDraft, AccountPatch, DirectoryEngine};

use crate::in_memory::InMemoryAccountStore;

fn draft(username: &str) -> AccountDraft {
    AccountDraft {
        username: username.into(),
        password: "pw".into(),
        first_name: Some("Alice".into()),
        second_name: Some("Liddell".into()),
        patronymic: None,
        birth: None,
        email: Some("alice@example.com".into()),
        phone: None,
    }
}

fn setup() -> (Arc<InMemoryAccountStore>, DirectoryEngine<Arc<InMemoryAccountStore>>, GroupId) {
    let store = Arc::new(InMemoryAccountStore::new());
    let group = store.add_group("staff", &["READ_USER"]);
    let engine = DirectoryEngine::new(store.clone(), 10);
    (store, engine, group)
}

#[tokio::test]
async fn create_then_get_returns_record_with_groups() {
    let (_store, engine, group) = setup();

    let created = engine.create(draft("alice"), vec![group]).await.unwrap();
    assert!(created.account.is_active);
    assert_eq!(created.groups.len(), 1);
    assert_eq!(created.groups[0].name, "staff");

    let fetched = engine.get_by_id(created.account.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn password_is_stored_hashed_and_never_projected() {
    let (store, engine, group) = setup();
    engine.create(draft("alice"), vec![group]).await.unwrap();

    let creds = store.credentials_by_username("alice").await.unwrap().unwrap();
    assert_ne!(creds.password_hash, "pw");
    assert!(password::verify("pw", &creds.password_hash));

    // The outward record has no password-shaped field at all; serialize and
    // look for the plaintext to be sure.
    let fetched = engine.get_by_id(creds.account_id).await.unwrap();
    let json = serde_json::to_string(&fetched).unwrap();
    assert!(!json.contains("pw\""));
    assert!(!json.contains("password"));
}

#[tokio::test]
async fn duplicate_username_conflicts_even_when_inactive() {
    let (_store, engine, group) = setup();
    let created = engine.create(draft("alice"), vec![group]).await.unwrap();

    let err = engine.create(draft("alice"), vec![group]).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // Usernames stay reserved through deactivation.
    engine.deactivate(created.account.id).await.unwrap();
    let err = engine.create(draft("alice"), vec![group]).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn concurrent_creates_with_same_username_yield_exactly_one_success() {
    let (_store, engine, group) = setup();
    let engine = Arc::new(engine);

    let a = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.create(draft("alice"), vec![group]).await })
    };
    let b = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.create(draft("alice"), vec![group]).await })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let failure = if a.is_err() { a } else { b };
    assert!(matches!(failure.unwrap_err(), ServiceError::Conflict(_)));
}

#[tokio::test]
async fn empty_patch_is_an_idempotent_noop() {
    let (_store, engine, group) = setup();
    let created = engine.create(draft("alice"), vec![group]).await.unwrap();

    let updated = engine
        .update(created.account.id, AccountPatch::default())
        .await
        .unwrap();
    assert_eq!(updated, created);
}

#[tokio::test]
async fn patch_touches_only_present_fields() {
    let (_store, engine, group) = setup();
    let created = engine.create(draft("alice"), vec![group]).await.unwrap();

    let patch = AccountPatch {
        first_name: Some("Alicia".into()),
        ..Default::default()
    };
    let updated = engine.update(created.account.id, patch).await.unwrap();

    assert_eq!(updated.account.first_name.as_deref(), Some("Alicia"));
    assert_eq!(updated.account.second_name, created.account.second_name);
    assert_eq!(updated.account.email, created.account.email);
    assert_eq!(updated.groups, created.groups);
}

#[tokio::test]
async fn group_patch_replaces_the_entire_set() {
    let (store, engine, staff) = setup();
    let admins = store.add_group("admins", &["READ_USER", "DELETE_USER"]);
    let audit = store.add_group("audit", &[]);

    let created = engine.create(draft("alice"), vec![staff]).await.unwrap();

    let patch = AccountPatch {
        groups: Some(vec![admins, audit]),
        ..Default::default()
    };
    let updated = engine.update(created.account.id, patch).await.unwrap();

    let mut names: Vec<&str> = updated.groups.iter().map(|g| g.name.as_str()).collect();
    names.sort();
    // Exactly the supplied set: the old membership is gone, nothing extra.
    assert_eq!(names, vec!["admins", "audit"]);

    let fetched = engine.get_by_id(created.account.id).await.unwrap();
    assert_eq!(fetched.groups, updated.groups);
}

#[tokio::test]
async fn empty_group_list_clears_memberships() {
    let (_store, engine, staff) = setup();
    let created = engine.create(draft("alice"), vec![staff]).await.unwrap();

    let patch = AccountPatch {
        groups: Some(vec![]),
        ..Default::default()
    };
    let updated = engine.update(created.account.id, patch).await.unwrap();
    assert!(updated.groups.is_empty());
}

#[tokio::test]
async fn username_change_conflicts_with_a_different_account_only() {
    let (_store, engine, group) = setup();
    let alice = engine.create(draft("alice"), vec![group]).await.unwrap();
    engine.create(draft("bob"), vec![group]).await.unwrap();

    let err = engine
        .update(
            alice.account.id,
            AccountPatch {
                username: Some("bob".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // Re-asserting one's own username is not a conflict.
    let same = engine
        .update(
            alice.account.id,
            AccountPatch {
                username: Some("alice".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.account.username, "alice");
}

#[tokio::test]
async fn password_patch_rehashes() {
    let (store, engine, group) = setup();
    let created = engine.create(draft("alice"), vec![group]).await.unwrap();

    engine
        .update(
            created.account.id,
            AccountPatch {
                password: Some("new-pw".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let creds = store.credentials_by_username("alice").await.unwrap().unwrap();
    assert!(password::verify("new-pw", &creds.password_hash));
    assert!(!password::verify("pw", &creds.password_hash));
}

#[tokio::test]
async fn update_of_missing_or_inactive_account_is_not_found() {
    let (_store, engine, group) = setup();
    let created = engine.create(draft("alice"), vec![group]).await.unwrap();

    let missing = userhub_core::AccountId::new();
    assert_eq!(
        engine.update(missing, AccountPatch::default()).await.unwrap_err(),
        ServiceError::NotFoundOrInactive
    );

    engine.deactivate(created.account.id).await.unwrap();
    assert_eq!(
        engine
            .update(created.account.id, AccountPatch::default())
            .await
            .unwrap_err(),
        ServiceError::NotFoundOrInactive
    );
}

#[tokio::test]
async fn activation_toggles_are_conditional_transitions() {
    let (_store, engine, group) = setup();
    let created = engine.create(draft("alice"), vec![group]).await.unwrap();
    let id = created.account.id;

    engine.deactivate(id).await.unwrap();
    assert_eq!(
        engine.deactivate(id).await.unwrap_err(),
        ServiceError::NotFoundOrInactive
    );
    assert_eq!(
        engine.get_by_id(id).await.unwrap_err(),
        ServiceError::NotFoundOrInactive
    );

    engine.reactivate(id).await.unwrap();
    assert!(engine.get_by_id(id).await.is_ok());
    assert_eq!(
        engine.reactivate(id).await.unwrap_err(),
        ServiceError::NotFoundOrInactive
    );
}

#[tokio::test]
async fn paged_listing_is_brief_active_only_and_restartable() {
    let (_store, engine, group) = setup();
    for name in ["a", "b", "c", "d", "e"] {
        engine.create(draft(name), vec![group]).await.unwrap();
    }
    let engine_small = {
        let (store, _, g2) = setup();
        // Rebuild with page_size 2 over the same store shape.
        let engine = DirectoryEngine::new(store.clone(), 2);
        for name in ["a", "b", "c", "d", "e"] {
            engine.create(draft(name), vec![g2]).await.unwrap();
        }
        engine
    };

    let p0 = engine_small.list_page(0).await.unwrap();
    let p1 = engine_small.list_page(1).await.unwrap();
    let p2 = engine_small.list_page(2).await.unwrap();
    let p3 = engine_small.list_page(3).await.unwrap();

    assert_eq!(p0.len(), 2);
    assert_eq!(p1.len(), 2);
    assert_eq!(p2.len(), 1);
    assert!(p3.is_empty());

    // Restartable: re-reading a page yields the same slice.
    assert_eq!(engine_small.list_page(0).await.unwrap(), p0);

    let all = engine.list_page(0).await.unwrap();
    assert_eq!(all.len(), 5);
    assert!(engine.list_page(-1).await.is_err());
}

#[tokio::test]
async fn absurdly_large_page_index_reads_as_empty() {
    let (_store, engine, group) = setup();
    engine.create(draft("alice"), vec![group]).await.unwrap();

    // Large enough that offset arithmetic cannot represent it.
    assert!(engine.list_page(i64::MAX).await.unwrap().is_empty());
    assert!(engine.list_page(i64::MAX / 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_group_ids_collapse_to_one_membership() {
    let (_store, engine, group) = setup();

    let created = engine
        .create(draft("alice"), vec![group, group, group])
        .await
        .unwrap();
    assert_eq!(created.groups.len(), 1);

    let patch = AccountPatch {
        groups: Some(vec![group, group]),
        ..Default::default()
    };
    let updated = engine.update(created.account.id, patch).await.unwrap();
    assert_eq!(updated.groups.len(), 1);
}

#[tokio::test]
async fn deactivated_subject_holds_no_permissions() {
    let (store, engine, group) = setup();
    let created = engine.create(draft("alice"), vec![group]).await.unwrap();

    let before = store.permissions_for(created.account.id).await.unwrap();
    assert_eq!(before.len(), 1);

    engine.deactivate(created.account.id).await.unwrap();
    let after = store.permissions_for(created.account.id).await.unwrap();
    assert!(after.is_empty());
}
