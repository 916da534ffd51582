// src/application/autosave.rs
use crate::application::editor_session::{EditorSession, SaveStatus};
use crate::domain::EditorError;
use crate::infrastructure::markdown::MarkdownConverter;
use crate::infrastructure::storage::KeyValueStore;
use std::time::{Duration, Instant};
use tracing::debug;

/// Periodic save of a session that has unsaved edits.
#[derive(Debug, Clone)]
pub struct AutoSaver {
    interval: Duration,
    last_run: Option<Instant>,
}

impl AutoSaver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.last_run
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval)
    }

    /// Save if the interval has elapsed and the session is unsaved. Returns
    /// whether a save happened.
    pub fn tick<C, S>(
        &mut self,
        session: &mut EditorSession<C, S>,
        now: Instant,
    ) -> Result<bool, EditorError>
    where
        C: MarkdownConverter,
        S: KeyValueStore,
    {
        if !self.is_due(now) {
            return Ok(false);
        }
        self.last_run = Some(now);

        if session.status() != SaveStatus::Unsaved {
            return Ok(false);
        }
        debug!("Auto-saving draft");
        session.save()?;
        Ok(true)
    }
}
