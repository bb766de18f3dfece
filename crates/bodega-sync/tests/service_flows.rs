/// Reconciliation behavior of the sync service against a scripted identity
/// service double and a real in-memory store.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::params;

use bodega_db::UserStore;
use bodega_remote::{IdentityApi, RemoteError};
use bodega_sync::UserSyncService;
use bodega_types::api::{LoginSession, RemoteProfile};
use bodega_types::models::{RegistrationInput, UserRecord};

/// Scripted provider double. An unset reply means "unavailable" — the
/// service treats any error identically, so a 503 stands in for all of
/// them.
#[derive(Default)]
struct FakeApi {
    /// `Some(None)` scripts the accepted-but-empty-body reply.
    register_reply: Option<Option<RemoteProfile>>,
    login_reply: Option<LoginSession>,
    list_reply: Option<Vec<RemoteProfile>>,
    delete_ok: bool,
    deleted: Arc<Mutex<Vec<i64>>>,
}

#[async_trait]
impl IdentityApi for FakeApi {
    async fn register(
        &self,
        _input: &RegistrationInput,
    ) -> Result<Option<RemoteProfile>, RemoteError> {
        self.register_reply.clone().ok_or(RemoteError::Status(503))
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<LoginSession, RemoteError> {
        self.login_reply.clone().ok_or(RemoteError::Status(503))
    }

    async fn list_all(&self, _token: &str) -> Result<Vec<RemoteProfile>, RemoteError> {
        self.list_reply.clone().ok_or(RemoteError::Status(503))
    }

    async fn delete_account(&self, remote_id: i64) -> Result<(), RemoteError> {
        if self.delete_ok {
            self.deleted.lock().unwrap().push(remote_id);
            Ok(())
        } else {
            Err(RemoteError::Status(503))
        }
    }
}

fn profile(id: i64, email: &str, name: &str) -> RemoteProfile {
    RemoteProfile {
        id,
        name: name.into(),
        last_name: "Lovelace".into(),
        email: email.into(),
        region: "North".into(),
        registered_at: "2026-01-10T09:00:00Z".into(),
    }
}

fn input(email: &str) -> RegistrationInput {
    RegistrationInput {
        name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: email.into(),
        password: "pw".into(),
        region: "North".into(),
        registered_at: "2026-01-10T09:00:00Z".into(),
    }
}

fn session(profile: Option<RemoteProfile>) -> LoginSession {
    LoginSession {
        token: "tok-123".into(),
        profile,
    }
}

fn service(api: FakeApi) -> UserSyncService<FakeApi> {
    UserSyncService::new(api, UserStore::in_memory().unwrap())
}

/// Seed a record under a fixed local id, as if it survived from an earlier
/// install.
async fn seed(service: &UserSyncService<FakeApi>, local_id: i64, email: &str) -> UserRecord {
    service
        .store()
        .database()
        .with_conn(|conn| {
            conn.execute(
                "INSERT INTO users
                     (local_id, remote_id, name, last_name, email, region, registered_at, active)
                 VALUES (?1, NULL, 'Ada', 'Lovelace', ?2, 'North', '2026-01-10T09:00:00Z', 0)",
                params![local_id, email],
            )?;
            Ok(())
        })
        .unwrap();
    service.store().find_by_id(local_id).await.unwrap().unwrap()
}

async fn active_records(service: &UserSyncService<FakeApi>) -> Vec<UserRecord> {
    service
        .store()
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.active)
        .collect()
}

// -- register --

#[tokio::test]
async fn register_online_opens_an_active_session() {
    let service = service(FakeApi {
        register_reply: Some(Some(profile(41, "a@b.com", "Ada"))),
        ..Default::default()
    });

    assert!(service.register(input("a@b.com")).await);

    let users = service.store().list().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].remote_id, Some(41));
    assert!(users[0].active);
}

#[tokio::test]
async fn register_with_an_empty_provider_reply_stays_pending() {
    let service = service(FakeApi {
        register_reply: Some(None),
        ..Default::default()
    });

    assert!(service.register(input("a@b.com")).await);

    let users = service.store().list().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].remote_id, None);
    assert!(!users[0].active);
}

#[tokio::test]
async fn register_survives_a_provider_outage() {
    // register_reply unset → every remote call errors
    let service = service(FakeApi::default());

    assert!(service.register(input("new@c.com")).await);

    let users = service.store().list().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "new@c.com");
    assert_eq!(users[0].remote_id, None);
    assert!(!users[0].active);
}

#[tokio::test]
async fn register_fails_only_when_the_store_does() {
    let service = service(FakeApi {
        register_reply: Some(Some(profile(41, "a@b.com", "Ada"))),
        ..Default::default()
    });
    service
        .store()
        .database()
        .with_conn(|conn| {
            conn.execute_batch("DROP TABLE users")?;
            Ok(())
        })
        .unwrap();

    assert!(!service.register(input("a@b.com")).await);
}

// -- login, online --

#[tokio::test]
async fn login_prefers_the_listed_profile() {
    let service = service(FakeApi {
        login_reply: Some(session(Some(profile(41, "a@b.com", "Thin")))),
        list_reply: Some(vec![
            profile(40, "other@b.com", "Other"),
            profile(41, "a@b.com", "Full"),
        ]),
        ..Default::default()
    });

    assert!(service.login("a@b.com", "pw").await);

    let active = active_records(&service).await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "Full");
    assert_eq!(active[0].remote_id, Some(41));
}

#[tokio::test]
async fn login_falls_back_to_the_login_body_when_the_listing_fails() {
    let service = service(FakeApi {
        login_reply: Some(session(Some(profile(41, "a@b.com", "Thin")))),
        list_reply: None,
        ..Default::default()
    });

    assert!(service.login("a@b.com", "pw").await);
    assert_eq!(active_records(&service).await[0].name, "Thin");
}

#[tokio::test]
async fn login_falls_back_to_the_login_body_when_nothing_matches() {
    let service = service(FakeApi {
        login_reply: Some(session(Some(profile(41, "a@b.com", "Thin")))),
        list_reply: Some(vec![profile(40, "other@b.com", "Other")]),
        ..Default::default()
    });

    assert!(service.login("a@b.com", "pw").await);
    assert_eq!(active_records(&service).await[0].name, "Thin");
}

#[tokio::test]
async fn login_preserves_the_local_id_of_a_known_account() {
    let service = service(FakeApi {
        login_reply: Some(session(None)),
        list_reply: Some(vec![profile(41, "a@b.com", "Full")]),
        ..Default::default()
    });
    seed(&service, 5, "a@b.com").await;

    assert!(service.login("a@b.com", "pw").await);

    let active = active_records(&service).await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].local_id, Some(5));
    assert_eq!(active[0].remote_id, Some(41));
    assert_eq!(service.store().list().await.unwrap().len(), 1);
}

// -- login, offline fallback --

#[tokio::test]
async fn offline_login_reactivates_the_cached_account() {
    let service = service(FakeApi::default());
    let before = seed(&service, 5, "a@b.com").await;

    assert!(service.login("a@b.com", "pw").await);

    let after = service.store().find_by_id(5).await.unwrap().unwrap();
    assert!(after.active);
    assert_eq!(
        UserRecord {
            active: false,
            ..after
        },
        before
    );
}

#[tokio::test]
async fn offline_login_without_a_cached_account_fails_cleanly() {
    let service = service(FakeApi::default());

    assert!(!service.login("x@y.com", "pw").await);
    assert!(service.store().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn offline_login_matches_email_case_sensitively() {
    let service = service(FakeApi::default());
    seed(&service, 5, "Ada@b.com").await;

    assert!(!service.login("ada@b.com", "pw").await);
    assert!(active_records(&service).await.is_empty());
}

// -- session invariants --

#[tokio::test]
async fn at_most_one_record_is_ever_active() {
    let service = service(FakeApi {
        register_reply: Some(Some(profile(41, "a@b.com", "Ada"))),
        ..Default::default()
    });

    assert!(service.register(input("a@b.com")).await);
    assert_eq!(active_records(&service).await.len(), 1);

    seed(&service, 50, "b@b.com").await;
    assert!(service.login("b@b.com", "pw").await);

    let active = active_records(&service).await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].email, "b@b.com");

    assert!(service.login("a@b.com", "pw").await);
    let active = active_records(&service).await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].email, "a@b.com");
}

#[tokio::test]
async fn logout_is_idempotent() {
    let service = service(FakeApi::default());

    // Nothing active yet — a plain no-op.
    service.logout().await.unwrap();

    seed(&service, 5, "a@b.com").await;
    assert!(service.login("a@b.com", "pw").await);

    service.logout().await.unwrap();
    assert!(active_records(&service).await.is_empty());

    service.logout().await.unwrap();
    assert!(active_records(&service).await.is_empty());
    assert_eq!(service.store().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn the_session_channel_follows_login_and_logout() {
    let service = service(FakeApi::default());
    seed(&service, 5, "a@b.com").await;

    let mut rx = service.active_user();
    assert!(rx.borrow().is_none());

    assert!(service.login("a@b.com", "pw").await);
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().as_ref().unwrap().email, "a@b.com");

    service.logout().await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow().is_none());
}

// -- photo and deletion --

#[tokio::test]
async fn update_photo_sets_and_clears_without_touching_the_session() {
    let service = service(FakeApi::default());
    seed(&service, 5, "a@b.com").await;
    assert!(service.login("a@b.com", "pw").await);

    service
        .update_photo(5, Some("file:///photos/ada.png".into()))
        .await
        .unwrap();
    let record = service.store().find_by_id(5).await.unwrap().unwrap();
    assert_eq!(record.photo_uri.as_deref(), Some("file:///photos/ada.png"));
    assert!(record.active);

    service.update_photo(5, None).await.unwrap();
    let record = service.store().find_by_id(5).await.unwrap().unwrap();
    assert_eq!(record.photo_uri, None);
}

#[tokio::test]
async fn update_photo_on_an_unknown_id_is_a_no_op() {
    let service = service(FakeApi::default());

    service
        .update_photo(999, Some("file:///x.png".into()))
        .await
        .unwrap();
    assert!(service.store().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn the_two_deletion_halves_are_independent() {
    let deleted = Arc::new(Mutex::new(Vec::new()));
    let service = service(FakeApi {
        delete_ok: true,
        deleted: deleted.clone(),
        ..Default::default()
    });
    seed(&service, 5, "a@b.com").await;

    service.delete_account_remote(41).await.unwrap();
    assert_eq!(*deleted.lock().unwrap(), vec![41]);
    // Remote deletion did not touch the local record.
    assert!(service.store().find_by_id(5).await.unwrap().is_some());

    service.delete_account_local(5).await.unwrap();
    assert!(service.store().find_by_id(5).await.unwrap().is_none());
}

#[tokio::test]
async fn remote_deletion_failures_are_reported_not_absorbed() {
    let service = service(FakeApi::default());

    let err = service.delete_account_remote(41).await.unwrap_err();
    assert!(matches!(err, RemoteError::Status(503)));
}
