//! Execution sessions around a remote compute client.
//!
//! A session moves `Closed -> Open -> Closed`. While open it submits compiled
//! work units through a client obtained from a [`ClientFactory`]. Sessions are
//! not internally synchronized; callers serialize access to one session, or go
//! through the [`SessionManager`].

mod manager;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{Result, VexprError};

pub use manager::SessionManager;

/// How a session obtains its remote client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClientPolicy {
    /// Acquire a fresh client on every submission, releasing the previous one.
    #[default]
    AcquirePerSubmit,
    /// Acquire a client on first submission and reuse it until close.
    CacheAndReuse,
}

/// Configuration a session is opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Address of the remote compute master.
    pub master: String,
    /// Application name reported to the remote side.
    pub app_name: String,
    /// Client acquisition policy.
    pub client_policy: ClientPolicy,
    /// Free-form properties passed through to the client factory.
    pub properties: BTreeMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            master: "local".to_string(),
            app_name: "vexpr".to_string(),
            client_policy: ClientPolicy::default(),
            properties: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    /// Creates a new session configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the master address.
    #[must_use]
    pub fn with_master(mut self, master: impl Into<String>) -> Self {
        self.master = master.into();
        self
    }

    /// Sets the application name.
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Sets the client acquisition policy.
    #[must_use]
    pub fn with_client_policy(mut self, policy: ClientPolicy) -> Self {
        self.client_policy = policy;
        self
    }

    /// Adds a pass-through property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A compiled unit of batch-processing work, produced upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkUnit {
    /// Name of the unit, used in logs and job handles.
    pub name: String,
    /// Ordered stage descriptors, opaque to the session.
    pub stages: Vec<String>,
}

impl WorkUnit {
    /// Creates a work unit with no stages.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Appends a stage descriptor.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stages.push(stage.into());
        self
    }
}

/// Reference to a submitted unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    /// Identifier assigned by the remote side.
    pub job_id: String,
    /// Name of the submitted work unit.
    pub work_name: String,
}

/// Connection to the remote compute system.
pub trait RemoteClient: Send {
    /// Submits a work unit and returns a handle to it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the remote side rejects the work.
    fn execute(&mut self, work: &WorkUnit) -> Result<JobHandle>;

    /// Releases the connection.
    ///
    /// # Errors
    ///
    /// Returns `ResourceReleaseFailure` if the release fails.
    fn close(&mut self) -> Result<()>;
}

/// Creates remote clients for sessions.
pub trait ClientFactory: Send + Sync {
    /// Establishes a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if no client can be established.
    fn create_client(&self, config: &SessionConfig) -> Result<Box<dyn RemoteClient>>;
}

/// A single execution session.
pub struct ExecutionSession {
    id: String,
    open: bool,
    config: Option<SessionConfig>,
    factory: Arc<dyn ClientFactory>,
    client: Option<Box<dyn RemoteClient>>,
}

impl fmt::Debug for ExecutionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionSession")
            .field("id", &self.id)
            .field("open", &self.open)
            .field("config", &self.config)
            .field("has_client", &self.client.is_some())
            .finish()
    }
}

impl ExecutionSession {
    /// Creates a closed session with a fresh random identifier.
    #[must_use]
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            open: false,
            config: None,
            factory,
            client: None,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns true if the session is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns the configuration the session was last opened with.
    #[must_use]
    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    /// Opens the session with `config`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` if the session is already open.
    pub fn open(&mut self, config: SessionConfig) -> Result<()> {
        if self.open {
            return Err(VexprError::IllegalState(format!(
                "session {} is already open",
                self.id
            )));
        }
        debug!(session_id = %self.id, master = %config.master, "opening session");
        self.config = Some(config);
        self.open = true;
        Ok(())
    }

    /// Submits a work unit through a remote client.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` if the session is not open, or `ClientError` if
    /// the client cannot be acquired or rejects the work.
    pub fn submit(&mut self, work: &WorkUnit) -> Result<JobHandle> {
        let config = match (&self.config, self.open) {
            (Some(config), true) => config,
            _ => {
                return Err(VexprError::IllegalState(format!(
                    "session {} is not open, can't submit jobs",
                    self.id
                )))
            }
        };

        let reuse = config.client_policy == ClientPolicy::CacheAndReuse && self.client.is_some();
        if !reuse {
            let client = self.factory.create_client(config)?;
            if let Some(previous) = self.client.replace(client) {
                release(&self.id, previous);
            }
        }

        let Some(client) = self.client.as_mut() else {
            unreachable!("client acquired above");
        };
        let handle = client.execute(work)?;
        debug!(
            session_id = %self.id,
            work = %work.name,
            job_id = %handle.job_id,
            "submitted work unit"
        );
        Ok(handle)
    }

    /// Closes the session, releasing its client.
    ///
    /// Release failures are logged and swallowed; the session always ends up
    /// closed.
    pub fn close(&mut self) {
        if self.open {
            debug!(session_id = %self.id, "closing session");
        }
        self.open = false;
        if let Some(client) = self.client.take() {
            release(&self.id, client);
        }
    }
}

impl Drop for ExecutionSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn release(session_id: &str, mut client: Box<dyn RemoteClient>) {
    if let Err(e) = client.close() {
        error!(session_id, error = %e, "failed to close remote client");
    }
}
