use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::OverlayConfig;
use crate::decode::is_new_record;
use crate::host::{DocumentReadiness, Sleeper};
use crate::storage::KeyValueStore;

/// Interval between document readiness checks while waiting for load.
pub const READINESS_CHECK_INTERVAL: Duration = Duration::from_millis(16);

/// Stops a running watcher. Cloned handles share one flag.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Rc<Cell<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Remembers the last raw record seen and reports only new ones.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last_seen: Option<String>,
}

impl ChangeDetector {
    pub fn observe(&mut self, current: Option<String>) -> Option<String> {
        if !is_new_record(self.last_seen.as_deref(), current.as_deref()) {
            return None;
        }
        self.last_seen.clone_from(&current);
        current
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Changed(String),
    /// The first poll after the load gate found no record.
    NothingStored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSchedule {
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub readiness_check_interval: Duration,
}

impl WatchSchedule {
    #[must_use]
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            settle_delay: config.settle_delay(),
            readiness_check_interval: READINESS_CHECK_INTERVAL,
        }
    }
}

/// Polls one storage key and reports changed raw records.
pub struct StorageWatcher<S, T> {
    store: S,
    key: String,
    sleeper: T,
    schedule: WatchSchedule,
}

impl<S: KeyValueStore, T: Sleeper> StorageWatcher<S, T> {
    pub fn new(store: S, key: impl Into<String>, sleeper: T, schedule: WatchSchedule) -> Self {
        Self {
            store,
            key: key.into(),
            sleeper,
            schedule,
        }
    }

    /// Waits for the document load, applies the settle delay, then polls
    /// until `cancel` fires. Handler errors are logged and polling goes on.
    pub async fn run<R, F, E>(self, readiness: &R, cancel: CancelHandle, mut on_event: F)
    where
        R: DocumentReadiness + ?Sized,
        F: FnMut(WatchEvent) -> Result<(), E>,
        E: fmt::Display,
    {
        while !readiness.is_fully_loaded() {
            if cancel.is_cancelled() {
                return;
            }
            self.sleeper
                .sleep(self.schedule.readiness_check_interval)
                .await;
        }
        self.sleeper.sleep(self.schedule.settle_delay).await;
        debug!(key = %self.key, "storage watcher started");

        let mut detector = ChangeDetector::default();
        let mut first_tick = true;
        while !cancel.is_cancelled() {
            let event = match detector.observe(self.read()) {
                Some(raw) => Some(WatchEvent::Changed(raw)),
                None if first_tick => Some(WatchEvent::NothingStored),
                None => None,
            };
            first_tick = false;

            if let Some(event) = event {
                if let Err(error) = on_event(event) {
                    warn!(%error, "storage change handler failed");
                }
            }
            self.sleeper.sleep(self.schedule.poll_interval).await;
        }
        debug!(key = %self.key, "storage watcher stopped");
    }

    fn read(&self) -> Option<String> {
        match self.store.get_item(&self.key) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, "failed to read watched record");
                None
            }
        }
    }
}
