//! Registry of live execution sessions.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{ClientFactory, ExecutionSession, JobHandle, SessionConfig, WorkUnit};
use crate::error::{Result, VexprError};

/// Thread-safe owner of execution sessions, keyed by session id.
///
/// The map lock is held only for lookups; each session has its own lock, so
/// submissions on different sessions do not serialize each other.
pub struct SessionManager {
    factory: Arc<dyn ClientFactory>,
    sessions: Mutex<HashMap<String, Arc<Mutex<ExecutionSession>>>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("active_sessions", &self.active_sessions())
            .finish()
    }
}

impl SessionManager {
    /// Creates a manager whose sessions acquire clients from `factory`.
    #[must_use]
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Opens a new session and returns its id.
    ///
    /// # Errors
    ///
    /// Propagates errors from opening the session.
    pub fn open_session(&self, config: SessionConfig) -> Result<String> {
        let mut session = ExecutionSession::new(Arc::clone(&self.factory));
        session.open(config)?;
        let id = session.id().to_string();
        self.sessions
            .lock()
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        debug!(session_id = %id, "registered session");
        Ok(id)
    }

    fn get(&self, session_id: &str) -> Result<Arc<Mutex<ExecutionSession>>> {
        self.sessions
            .lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| VexprError::IllegalState(format!("unknown session {session_id}")))
    }

    /// Submits a work unit on the given session.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` for an unknown session id, otherwise propagates
    /// errors from the session.
    pub fn submit(&self, session_id: &str, work: &WorkUnit) -> Result<JobHandle> {
        let session = self.get(session_id)?;
        let mut session = session.lock();
        session.submit(work)
    }

    /// Returns true if the session exists and is open.
    #[must_use]
    pub fn is_open(&self, session_id: &str) -> bool {
        self.get(session_id)
            .map(|s| s.lock().is_open())
            .unwrap_or(false)
    }

    /// Closes and forgets a session.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` for an unknown session id.
    pub fn close_session(&self, session_id: &str) -> Result<()> {
        let session = self
            .sessions
            .lock()
            .remove(session_id)
            .ok_or_else(|| VexprError::IllegalState(format!("unknown session {session_id}")))?;
        session.lock().close();
        Ok(())
    }

    /// Returns the number of registered sessions.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Closes every registered session.
    pub fn shutdown(&self) {
        let drained: Vec<_> = self.sessions.lock().drain().collect();
        debug!(count = drained.len(), "shutting down sessions");
        for (_, session) in drained {
            session.lock().close();
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
