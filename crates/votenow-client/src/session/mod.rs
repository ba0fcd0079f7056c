//! Credential store.
//!
//! Holds the access/refresh token pair and the cached user snapshot for one
//! client instance. The [`Session`] is an explicitly owned object handed to
//! the dispatcher; nothing reaches the tokens through ambient global state.
//!
//! - [`Session`]: in-memory view plus write-through persistence
//! - [`SessionStorage`]: durable key-value backend ([`MemoryStorage`], [`FileStorage`])
//! - [`SessionEvent`]: broadcast notifications (login, refresh, login required)

mod events;
mod storage;
mod types;

pub use events::SessionEvent;
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StoredSession};
pub use types::{CachedUser, Credential};

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::models::Role;

/// Broadcast channel capacity for session events.
const SESSION_EVENT_CAPACITY: usize = 16;

/// The authenticated identity of one client instance.
///
/// Every mutation writes a complete snapshot through the storage backend
/// while holding the write lock, so readers never observe a half-updated
/// session (e.g. tokens cleared but user still cached).
pub struct Session {
    storage: Arc<dyn SessionStorage>,
    state: RwLock<StoredSession>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Session")
            .field("has_access_token", &state.access_token.is_some())
            .field("has_refresh_token", &state.refresh_token.is_some())
            .field("has_user", &state.user.is_some())
            .finish()
    }
}

impl Session {
    /// Load the session persisted in `storage`.
    pub fn load(storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let snapshot = storage.load()?;
        debug!(
            authenticated = snapshot.access_token.is_some(),
            "Loaded session from storage"
        );
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Ok(Self {
            storage,
            state: RwLock::new(snapshot),
            events,
        })
    }

    /// An empty session that lives only in memory.
    pub fn in_memory() -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self {
            storage: Arc::new(MemoryStorage::new()),
            state: RwLock::new(StoredSession::default()),
            events,
        }
    }

    /// Persist both tokens, overwriting any existing values.
    ///
    /// The pair may belong to a different subject, so the cached user is
    /// dropped with the old credential.
    pub fn save(&self, access: impl Into<String>, refresh: impl Into<String>) -> Result<()> {
        let access = access.into();
        let refresh = refresh.into();
        self.update(|s| {
            s.access_token = Some(access);
            s.refresh_token = Some(refresh);
            s.user = None;
        })
    }

    /// Replace both tokens for the current subject after a rotating refresh.
    pub fn rotate(&self, access: impl Into<String>, refresh: impl Into<String>) -> Result<()> {
        let access = access.into();
        let refresh = refresh.into();
        self.update(|s| {
            s.access_token = Some(access);
            s.refresh_token = Some(refresh);
        })
    }

    /// Replace the access token after a refresh; the refresh token is kept.
    pub fn set_access_token(&self, access: impl Into<String>) -> Result<()> {
        let access = access.into();
        self.update(|s| s.access_token = Some(access))
    }

    /// Store a freshly issued credential together with its subject.
    pub fn establish(&self, credential: Credential, user: &CachedUser) -> Result<()> {
        let user = encode_user(user)?;
        self.update(|s| {
            s.access_token = Some(credential.access_token);
            s.refresh_token = Some(credential.refresh_token);
            s.user = Some(user);
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.read().refresh_token.clone()
    }

    /// Both tokens, if a complete credential is stored.
    pub fn credential(&self) -> Option<Credential> {
        let state = self.state.read();
        match (&state.access_token, &state.refresh_token) {
            (Some(access), Some(refresh)) => Some(Credential::new(access, refresh)),
            _ => None,
        }
    }

    pub fn cache_user(&self, user: &CachedUser) -> Result<()> {
        let user = encode_user(user)?;
        self.update(|s| s.user = Some(user))
    }

    /// The cached identity snapshot. A corrupt entry reads as absent.
    pub fn cached_user(&self) -> Option<CachedUser> {
        let raw = self.state.read().user.clone()?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cached user");
                None
            }
        }
    }

    /// Remove tokens and cached user in one write. Safe to call repeatedly.
    ///
    /// The in-memory session is emptied even when the backend write fails;
    /// the storage error is still returned.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.state.write();
        if state.is_empty() {
            return Ok(());
        }
        *state = StoredSession::default();
        self.storage.persist(&state)
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().access_token.is_some()
    }

    /// UI affordance only; the backend re-checks the role on every call.
    pub fn is_admin(&self) -> bool {
        self.cached_user().is_some_and(|u| u.role == Role::Admin)
    }

    pub fn is_regular_user(&self) -> bool {
        self.cached_user().is_some_and(|u| u.role == Role::User)
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn notify(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn update(&self, mutate: impl FnOnce(&mut StoredSession)) -> Result<()> {
        let mut state = self.state.write();
        let mut next = state.clone();
        mutate(&mut next);
        if next == *state {
            return Ok(());
        }
        self.storage.persist(&next)?;
        *state = next;
        Ok(())
    }
}

fn encode_user(user: &CachedUser) -> Result<String> {
    serde_json::to_string(user)
        .map_err(|e| ClientError::storage(format!("failed to encode cached user: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    /// Storage whose writes always fail.
    struct BrokenStorage(StoredSession);

    impl SessionStorage for BrokenStorage {
        fn load(&self) -> Result<StoredSession> {
            Ok(self.0.clone())
        }

        fn persist(&self, _snapshot: &StoredSession) -> Result<()> {
            Err(ClientError::storage("disk full"))
        }
    }

    fn signed_in() -> StoredSession {
        StoredSession {
            access_token: Some("a".into()),
            refresh_token: Some("r".into()),
            user: Some(r#"{"id":7,"username":"alice","email":"alice@example.com","role":"user"}"#.into()),
        }
    }

    fn alice(role: Role) -> User {
        User {
            id: 7,
            username: "alice".into(),
            email: "alice@example.com".into(),
            role,
        }
    }

    #[test]
    fn test_save_and_read_tokens() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());
        assert_eq!(session.credential(), None);

        session.save("acc", "ref").unwrap();
        assert_eq!(session.access_token().as_deref(), Some("acc"));
        assert_eq!(session.refresh_token().as_deref(), Some("ref"));
        assert_eq!(session.credential(), Some(Credential::new("acc", "ref")));

        session.save("acc2", "ref2").unwrap();
        assert_eq!(session.access_token().as_deref(), Some("acc2"));
        assert_eq!(session.refresh_token().as_deref(), Some("ref2"));
    }

    #[test]
    fn test_set_access_token_keeps_refresh_token() {
        let session = Session::in_memory();
        session.save("old", "ref").unwrap();
        session.set_access_token("new").unwrap();
        assert_eq!(session.access_token().as_deref(), Some("new"));
        assert_eq!(session.refresh_token().as_deref(), Some("ref"));
    }

    #[test]
    fn test_establish_caches_user_with_tokens() {
        let session = Session::in_memory();
        session
            .establish(Credential::new("a", "r"), &alice(Role::Admin))
            .unwrap();

        assert_eq!(session.cached_user(), Some(alice(Role::Admin)));
        assert!(session.is_admin());
        assert!(!session.is_regular_user());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let session = Session::load(storage.clone()).unwrap();
        session
            .establish(Credential::new("a", "r"), &alice(Role::User))
            .unwrap();

        session.clear().unwrap();
        let once = storage.load().unwrap();
        session.clear().unwrap();
        let twice = storage.load().unwrap();

        assert_eq!(once, StoredSession::default());
        assert_eq!(once, twice);
        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
        assert_eq!(session.cached_user(), None);
        assert!(!session.is_admin());
    }

    #[test]
    fn test_clear_empties_memory_when_storage_fails() {
        let session = Session::load(Arc::new(BrokenStorage(signed_in()))).unwrap();
        assert!(session.is_authenticated());

        assert!(session.clear().is_err());
        assert!(!session.is_authenticated());
        assert_eq!(session.credential(), None);
        assert_eq!(session.cached_user(), None);

        // Nothing left to write.
        session.clear().unwrap();
    }

    #[test]
    fn test_failed_write_leaves_session_unchanged() {
        let session = Session::load(Arc::new(BrokenStorage(signed_in()))).unwrap();
        assert!(session.set_access_token("b").is_err());
        assert_eq!(session.access_token().as_deref(), Some("a"));
    }

    #[test]
    fn test_save_drops_cached_user_but_rotate_keeps_it() {
        let session = Session::in_memory();
        session
            .establish(Credential::new("a", "r"), &alice(Role::Admin))
            .unwrap();

        session.rotate("a2", "r2").unwrap();
        assert_eq!(session.cached_user(), Some(alice(Role::Admin)));
        assert_eq!(session.refresh_token().as_deref(), Some("r2"));

        session.save("b", "s").unwrap();
        assert_eq!(session.credential(), Some(Credential::new("b", "s")));
        assert_eq!(session.cached_user(), None);
        assert!(!session.is_admin());
    }

    #[test]
    fn test_corrupt_cached_user_reads_as_absent() {
        let storage = Arc::new(MemoryStorage::with_snapshot(StoredSession {
            access_token: Some("a".into()),
            refresh_token: Some("r".into()),
            user: Some("{not json".into()),
        }));
        let session = Session::load(storage).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.cached_user(), None);
    }

    #[test]
    fn test_load_restores_persisted_snapshot() {
        let storage = Arc::new(MemoryStorage::new());
        Session::load(storage.clone())
            .unwrap()
            .save("persisted", "ref")
            .unwrap();

        let reloaded = Session::load(storage).unwrap();
        assert_eq!(reloaded.access_token().as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let session = Session::in_memory();
        let mut rx = session.subscribe();
        session.notify(SessionEvent::LoggedOut);
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::LoggedOut);
    }
}
