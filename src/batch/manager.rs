use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use super::session::{BatchSession, BatchVerdict, SessionOptions};
use crate::config::GatewayConfig;
use crate::error::BatchError;
use crate::utils::sync;
use crate::utils::Identifier;
use crate::validation::ValidationResult;

#[derive(Debug, Clone, Copy)]
struct Expiry {
    grace_period: Duration,
    idle_timeout: Option<Duration>,
}

struct SessionEntry {
    session: BatchSession,
    /// Set when the session reaches a terminal state
    terminal_since: Option<Instant>,
    last_activity: Instant,
}

impl SessionEntry {
    fn new(session: BatchSession) -> Self {
        Self {
            session,
            terminal_since: None,
            last_activity: Instant::now(),
        }
    }

    /// Terminal sessions expire after the grace period, active ones after the idle timeout
    fn is_expired(&self, expiry: Expiry) -> bool {
        match self.terminal_since {
            Some(since) => since.elapsed() >= expiry.grace_period,
            None => expiry
                .idle_timeout
                .map_or(false, |idle| self.last_activity.elapsed() >= idle),
        }
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

type SessionMap = HashMap<String, Arc<Mutex<SessionEntry>>>;

/// Owns every batch session of a gateway.
///
/// The map lock is held only to find, insert or remove a session handle; counters
/// are updated under the session's own mutex. Lock order is always map, then session.
pub struct BatchSessionManager {
    sessions: Arc<RwLock<SessionMap>>,
    expiry: Expiry,
    max_sessions: usize,
    max_batch_id_length: usize,
}

impl BatchSessionManager {
    pub fn new() -> Self {
        Self::with_config(&GatewayConfig::default())
    }

    pub fn with_config(config: &GatewayConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            expiry: Expiry {
                grace_period: config.cleanup_grace_period(),
                idle_timeout: config.idle_timeout(),
            },
            max_sessions: config.max_active_sessions,
            max_batch_id_length: config.max_batch_id_length,
        }
    }

    pub fn grace_period(&self) -> Duration {
        self.expiry.grace_period
    }

    /// How long an active session may go without records before it is reclaimed
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.expiry.idle_timeout
    }

    pub fn start_session(&self, options: SessionOptions) -> Result<BatchSession, BatchError> {
        if let Some(threshold) = options.threshold {
            if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
                return Err(BatchError::InvalidThreshold(threshold));
            }
        }

        let batch_id = match options.batch_id {
            Some(id) => {
                Identifier::validate(&id, self.max_batch_id_length)
                    .map_err(|reason| BatchError::InvalidBatchId(id.clone(), reason))?;
                id
            }
            None => Identifier::generate(),
        };

        let mut sessions = sync::write(&self.sessions);

        if let Some(existing) = sessions.get(&batch_id) {
            if !sync::lock(existing).is_expired(self.expiry) {
                return Err(BatchError::AlreadyExists(batch_id));
            }
            sessions.remove(&batch_id);
        }

        if sessions.len() >= self.max_sessions {
            let expiry = self.expiry;
            sessions.retain(|_, entry| !sync::lock(entry).is_expired(expiry));
            if sessions.len() >= self.max_sessions {
                warn!("Rejected batch session '{}': {} sessions held", batch_id, sessions.len());
                return Err(BatchError::CapacityExceeded { max: self.max_sessions });
            }
        }

        let session = BatchSession::new(batch_id.clone(), options.model_type, options.threshold);
        sessions.insert(batch_id, Arc::new(Mutex::new(SessionEntry::new(session.clone()))));

        info!(
            "Started batch session '{}' (model type: {}, threshold: {})",
            session.batch_id,
            session.model_type.as_deref().unwrap_or("any"),
            session
                .threshold
                .map_or_else(|| "none".to_string(), |t| format!("{}%", t))
        );
        Ok(session)
    }

    /// Fold counts into a session and return the updated snapshot
    pub fn accumulate(
        &self,
        batch_id: &str,
        valid: u64,
        invalid: u64,
        warnings: u64,
    ) -> Result<BatchSession, BatchError> {
        let handle = self.lookup(batch_id)?;
        let mut entry = sync::lock(&handle);
        self.ensure_active(batch_id, &entry)?;

        entry.session.record(valid, invalid, warnings);
        entry.touch();
        Ok(entry.session.clone())
    }

    /// Fold a single validation outcome into a session.
    ///
    /// A session started for a specific model type only accepts results of that type.
    pub fn record_outcome(
        &self,
        batch_id: &str,
        model_type: &str,
        result: &ValidationResult,
    ) -> Result<BatchSession, BatchError> {
        let handle = self.lookup(batch_id)?;
        let mut entry = sync::lock(&handle);
        self.ensure_active(batch_id, &entry)?;

        if let Some(expected) = entry.session.model_type.as_deref() {
            if expected != model_type {
                return Err(BatchError::ModelTypeMismatch {
                    batch_id: batch_id.to_string(),
                    expected: expected.to_string(),
                    actual: model_type.to_string(),
                });
            }
        }

        let (valid, invalid) = if result.is_valid { (1, 0) } else { (0, 1) };
        entry.session.record(valid, invalid, result.warnings.len() as u64);
        entry.touch();
        Ok(entry.session.clone())
    }

    pub fn get_session(&self, batch_id: &str) -> Result<BatchSession, BatchError> {
        let handle = self.lookup(batch_id)?;
        let entry = sync::lock(&handle);
        if entry.is_expired(self.expiry) {
            return Err(BatchError::NotFound(batch_id.to_string()));
        }
        Ok(entry.session.clone())
    }

    /// Resolve a session to its verdict. The session stays queryable for the
    /// grace period and is removed afterwards.
    pub fn complete(&self, batch_id: &str) -> Result<BatchVerdict, BatchError> {
        let handle = self.lookup(batch_id)?;

        let verdict = {
            let mut entry = sync::lock(&handle);
            self.ensure_active(batch_id, &entry)?;
            let verdict = entry.session.finalize();
            entry.terminal_since = Some(Instant::now());
            verdict
        };

        info!(
            "Batch session '{}' {}: {}/{} valid ({:.2}%)",
            verdict.batch_id, verdict.status, verdict.valid_records, verdict.total_records, verdict.success_rate
        );

        self.schedule_removal(batch_id.to_string(), handle);
        Ok(verdict)
    }

    /// Remove every terminal session whose grace period has elapsed, and every
    /// active session idle past the idle timeout
    pub fn sweep_expired(&self) -> usize {
        let expiry = self.expiry;
        let mut sessions = sync::write(&self.sessions);
        let before = sessions.len();
        sessions.retain(|_, entry| !sync::lock(entry).is_expired(expiry));
        let removed = before - sessions.len();
        if removed > 0 {
            debug!("Swept {} expired batch sessions", removed);
        }
        removed
    }

    /// Sessions still accepting records
    pub fn active_count(&self) -> usize {
        let expiry = self.expiry;
        sync::read(&self.sessions)
            .values()
            .filter(|entry| {
                let entry = sync::lock(entry);
                !entry.session.is_terminal() && !entry.is_expired(expiry)
            })
            .count()
    }

    /// Sessions that are still queryable
    pub fn len(&self) -> usize {
        let expiry = self.expiry;
        sync::read(&self.sessions)
            .values()
            .filter(|entry| !sync::lock(entry).is_expired(expiry))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, batch_id: &str) -> Result<Arc<Mutex<SessionEntry>>, BatchError> {
        sync::read(&self.sessions)
            .get(batch_id)
            .cloned()
            .ok_or_else(|| BatchError::NotFound(batch_id.to_string()))
    }

    fn ensure_active(&self, batch_id: &str, entry: &SessionEntry) -> Result<(), BatchError> {
        if entry.is_expired(self.expiry) {
            return Err(BatchError::NotFound(batch_id.to_string()));
        }
        if entry.session.is_terminal() {
            return Err(BatchError::AlreadyCompleted {
                batch_id: batch_id.to_string(),
                status: entry.session.status,
            });
        }
        Ok(())
    }

    fn schedule_removal(&self, batch_id: String, handle: Arc<Mutex<SessionEntry>>) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime; batch session '{}' is removed by sweep_expired", batch_id);
            return;
        };

        let sessions = Arc::clone(&self.sessions);
        let grace = self.expiry.grace_period;

        runtime.spawn(async move {
            tokio::time::sleep(grace).await;

            let mut sessions = sync::write(&sessions);
            let same_entry = sessions
                .get(&batch_id)
                .map_or(false, |current| Arc::ptr_eq(current, &handle));
            if same_entry {
                sessions.remove(&batch_id);
                debug!("Removed batch session '{}' after {:?}", batch_id, grace);
            }
        });
    }
}

impl Default for BatchSessionManager {
    fn default() -> Self {
        Self::new()
    }
}
