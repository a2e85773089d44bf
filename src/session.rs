//! Session lifecycle and identity management.
//!
//! A visitor id is minted once and survives across sessions; a session id
//! rotates whenever the idle window lapses. Both live in [`Storage`] so a
//! persistent backend carries them across process restarts, mirroring how
//! the expiry itself is only ever persisted, never cached.

use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use crate::clock::Clock;
use crate::storage::{Storage, SESSION_EXPIRATION_KEY, SESSION_ID_KEY, VISITOR_ID_KEY};

/// Default idle window, in seconds, before the session rotates.
pub const DEFAULT_AFK_SECONDS: u64 = 300; // 5 minutes

/// Options accepted by [`SessionManager::register`].
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// Idle window override in seconds. When absent the current value is
    /// kept (300 s until something sets it).
    pub afk_seconds: Option<u64>,
}

/// Snapshot of the identity fields stamped onto outgoing events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub application_id: Option<String>,
    pub session_id: Option<String>,
    pub visitor_id: Option<String>,
    pub label_service: Option<String>,
}

#[derive(Debug)]
struct SessionState {
    application_id: Option<String>,
    label_service: Option<String>,
    session_id: Option<String>,
    visitor_id: Option<String>,
    afk_seconds: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            application_id: None,
            label_service: None,
            session_id: None,
            visitor_id: None,
            afk_seconds: DEFAULT_AFK_SECONDS,
        }
    }
}

/// Tracks who the user is and which session they are in.
pub struct SessionManager {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Bind the tracker to an application and label service.
    ///
    /// Reads the durable visitor id from storage, minting and persisting one
    /// when absent. Registering again overwrites the in-memory identity but
    /// never re-rolls a stored visitor id. Finishes with one activity signal
    /// so a session exists (and its expiry is in the future) before the
    /// first event is dispatched; returns whether that signal started a
    /// fresh session rather than adopting a live one from storage.
    pub fn register(
        &self,
        application_id: &str,
        label_service: &str,
        options: RegisterOptions,
    ) -> Result<bool, SessionError> {
        if application_id.is_empty() {
            return Err(SessionError::MissingApplicationId);
        }
        if label_service.is_empty() {
            return Err(SessionError::MissingLabelService);
        }

        {
            let mut state = self.state.lock().expect("session state poisoned");
            state.application_id = Some(application_id.to_string());
            state.label_service = Some(label_service.to_string());
            if let Some(afk) = options.afk_seconds {
                state.afk_seconds = afk;
            }

            let visitor_id = match self.storage.get(VISITOR_ID_KEY).filter(|v| !v.is_empty()) {
                Some(existing) => existing,
                None => {
                    let fresh = Uuid::new_v4().to_string();
                    self.storage.set(VISITOR_ID_KEY, &fresh);
                    fresh
                }
            };
            state.visitor_id = Some(visitor_id);
        }

        let rotated = self.record_activity();

        let mut state = self.state.lock().expect("session state poisoned");
        state.session_id = self.storage.get(SESSION_ID_KEY).filter(|s| !s.is_empty());
        debug!(
            application_id,
            visitor_id = ?state.visitor_id,
            session_id = ?state.session_id,
            "identity resolved"
        );

        Ok(rotated)
    }

    /// Mark the user as active, rotating the session when the idle window
    /// has lapsed.
    ///
    /// The persisted expiry is the only authority on staleness: missing or
    /// unparseable reads count as lapsed, as does a missing stored session
    /// id (a future expiry over a hole in the store would otherwise hand
    /// out events with no session). Every call pushes the expiry out to
    /// `now + afk`, so a continuously active user keeps one session
    /// indefinitely. Returns whether a fresh session was started.
    pub fn record_activity(&self) -> bool {
        let mut state = self.state.lock().expect("session state poisoned");

        let now = self.clock.now_millis();
        let expiration = self
            .storage
            .get(SESSION_EXPIRATION_KEY)
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(0);
        let stored_session = self.storage.get(SESSION_ID_KEY).filter(|s| !s.is_empty());

        let rotated = expiration < now || stored_session.is_none();
        if rotated {
            self.storage.set(SESSION_ID_KEY, &Uuid::new_v4().to_string());
            // Read back rather than trusting the write, so a best-effort
            // backend that dropped it leaves us consistent with storage.
            state.session_id = self.storage.get(SESSION_ID_KEY);
            debug!(session_id = ?state.session_id, "session rotated");
        } else if state.session_id.is_none() {
            state.session_id = stored_session;
        }

        let expires_at = now + state.afk_seconds as i64 * 1000;
        self.storage.set(SESSION_EXPIRATION_KEY, &expires_at.to_string());

        rotated
    }

    /// The registered application id.
    pub fn application_id(&self) -> Result<String, SessionError> {
        self.state
            .lock()
            .expect("session state poisoned")
            .application_id
            .clone()
            .ok_or(SessionError::NotRegistered)
    }

    /// The current session id, if a session has been started.
    pub fn session_id(&self) -> Option<String> {
        self.state
            .lock()
            .expect("session state poisoned")
            .session_id
            .clone()
    }

    /// The durable visitor id, once registration has resolved it.
    pub fn visitor_id(&self) -> Option<String> {
        self.state
            .lock()
            .expect("session state poisoned")
            .visitor_id
            .clone()
    }

    /// The registered label service.
    pub fn label_service(&self) -> Option<String> {
        self.state
            .lock()
            .expect("session state poisoned")
            .label_service
            .clone()
    }

    /// The idle window currently in force, in seconds.
    pub fn afk_seconds(&self) -> u64 {
        self.state.lock().expect("session state poisoned").afk_seconds
    }

    /// Snapshot of the identity fields for stamping outgoing events.
    ///
    /// All fields may be unset before registration; stamping tolerates that.
    pub fn identity(&self) -> Identity {
        let state = self.state.lock().expect("session state poisoned");
        Identity {
            application_id: state.application_id.clone(),
            session_id: state.session_id.clone(),
            visitor_id: state.visitor_id.clone(),
            label_service: state.label_service.clone(),
        }
    }
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    MissingApplicationId,
    MissingLabelService,
    NotRegistered,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::MissingApplicationId => write!(f, "application id is required"),
            SessionError::MissingLabelService => write!(f, "label service is required"),
            SessionError::NotRegistered => write!(f, "tracker is not registered"),
        }
    }
}

impl std::error::Error for SessionError {}
