use tokio::sync::watch;
use tracing::{debug, warn};

use bodega_db::{StoreError, UserStore};
use bodega_remote::{IdentityApi, RemoteError};
use bodega_types::api::LoginSession;
use bodega_types::models::{RegistrationInput, UserRecord};

use crate::merge::merge_profiles;

/// Reconciles the device's account cache with the remote identity service.
///
/// Exactly one record is kept `active`, favoring remote truth when the
/// network cooperates and degrading to the local cache when it does not.
/// Remote failures never escape `register` or `login`; store failures do,
/// as an overall `false`.
pub struct UserSyncService<A> {
    api: A,
    store: UserStore,
}

impl<A: IdentityApi> UserSyncService<A> {
    pub fn new(api: A, store: UserStore) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// Reactive view of the current session for the UI layer.
    pub fn active_user(&self) -> watch::Receiver<Option<UserRecord>> {
        self.store.active_user()
    }

    /// Register a new account. Input is assumed field-validated upstream.
    ///
    /// Always persists exactly one record: a reachable provider yields an
    /// active session, an unreachable one (or an empty acceptance body)
    /// yields an inactive record pending sync. `false` only when the local
    /// write fails.
    pub async fn register(&self, input: RegistrationInput) -> bool {
        let record = match self.api.register(&input).await {
            Ok(Some(profile)) => UserRecord {
                local_id: None,
                remote_id: Some(profile.id),
                name: profile.name,
                last_name: profile.last_name,
                email: profile.email,
                region: profile.region,
                registered_at: profile.registered_at,
                active: true,
                photo_uri: None,
            },
            Ok(None) => {
                debug!("register: provider accepted {} without a profile", input.email);
                local_only_record(&input)
            }
            Err(e) => {
                warn!("register: provider unavailable for {}: {}", input.email, e);
                local_only_record(&input)
            }
        };

        match self.store.upsert(record).await {
            Ok(_) => true,
            Err(e) => {
                warn!("register: local persist failed for {}: {}", input.email, e);
                false
            }
        }
    }

    /// Open a session for `email` — online when possible, from the local
    /// cache when the provider is unreachable. `false` when neither side
    /// knows the account, or when the local write fails.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        match self.api.login(email, password).await {
            Ok(session) => self.login_online(email, session).await,
            Err(e) => {
                warn!("login: provider unavailable for {}: {}", email, e);
                self.login_offline(email).await
            }
        }
    }

    /// Online path: resolve the richest profile the provider will give us,
    /// then activate the matching local record under its existing id.
    async fn login_online(&self, email: &str, session: LoginSession) -> bool {
        // Second step of the two-call protocol: the login body may carry a
        // thin profile, the user listing carries the full one. Each step
        // fails independently.
        let listed = match self.api.list_all(&session.token).await {
            Ok(profiles) => profiles.into_iter().find(|p| p.email == email),
            Err(e) => {
                debug!("login: user listing unavailable, using login body: {}", e);
                None
            }
        };
        let resolved = listed.or(session.profile);

        let local = match self.store.find_by_email(email).await {
            Ok(local) => local,
            Err(e) => {
                warn!("login: local lookup failed for {}: {}", email, e);
                return false;
            }
        };

        let mut record = merge_profiles(
            &local.unwrap_or_else(|| UserRecord::with_email(email)),
            resolved.as_ref(),
        );
        record.active = true;

        match self.store.upsert(record).await {
            Ok(_) => true,
            Err(e) => {
                warn!("login: local persist failed for {}: {}", email, e);
                false
            }
        }
    }

    /// Offline fallback: reactivate a cached account if one matches,
    /// touching nothing else.
    async fn login_offline(&self, email: &str) -> bool {
        let found = match self.store.find_by_email(email).await {
            Ok(found) => found,
            Err(e) => {
                warn!("login: local lookup failed for {}: {}", email, e);
                return false;
            }
        };

        let Some(mut record) = found else {
            return false;
        };
        record.active = true;

        match self.store.upsert(record).await {
            Ok(_) => true,
            Err(e) => {
                warn!("login: local persist failed for {}: {}", email, e);
                false
            }
        }
    }

    /// Close the current session, if any. Idempotent.
    pub async fn logout(&self) -> Result<(), StoreError> {
        let current = self.store.active_user().borrow().clone();
        if let Some(mut record) = current {
            record.active = false;
            self.store.upsert(record).await?;
        }
        Ok(())
    }

    /// Point `local_id` at a new profile photo, or clear it with `None`.
    /// Unknown ids are ignored.
    pub async fn update_photo(&self, local_id: i64, uri: Option<String>) -> Result<(), StoreError> {
        let Some(mut record) = self.store.find_by_id(local_id).await? else {
            return Ok(());
        };
        record.photo_uri = uri;
        self.store.upsert(record).await?;
        Ok(())
    }

    /// Remote half of account deletion. Callers pair this with
    /// [`Self::delete_account_local`]; neither implies the other, and a
    /// remote failure is reported rather than absorbed.
    pub async fn delete_account_remote(&self, remote_id: i64) -> Result<(), RemoteError> {
        self.api.delete_account(remote_id).await
    }

    /// Local half of account deletion. Unknown ids are a no-op.
    pub async fn delete_account_local(&self, local_id: i64) -> Result<(), StoreError> {
        self.store.delete_by_id(local_id).await
    }
}

fn local_only_record(input: &RegistrationInput) -> UserRecord {
    UserRecord {
        local_id: None,
        remote_id: None,
        name: input.name.clone(),
        last_name: input.last_name.clone(),
        email: input.email.clone(),
        region: input.region.clone(),
        registered_at: input.registered_at.clone(),
        active: false,
        photo_uri: None,
    }
}
