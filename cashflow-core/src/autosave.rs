//! Draft autosave as an explicit state machine.
//!
//! ```text
//!            change                 debounce elapsed / flush
//!   Idle ───────────▶ Dirty ─────────────────────────────────▶ Saving
//!    ▲                 ▲  ▲                                      │
//!    │                 │  └──── change arrived during save ◀─────┤ ok
//!    │                 │                                         │
//!  Saved ◀─────────────┼─────────────────────────────────────────┘ ok
//!                      │
//!  Failed ─────────────┘ change / retry          Saving ──▶ Failed on error
//! ```
//!
//! The tracker owns no timers and performs no I/O. Callers pass the current
//! time in, perform the write themselves when [`AutosaveTracker::poll`] or
//! [`AutosaveTracker::flush`] hands out a [`SaveTicket`], and report back
//! with [`AutosaveTracker::complete`]. A payload is identified by a
//! fingerprint (typically its serialized form); re-recording the payload
//! that was last saved does not dirty the tracker.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

/// Default quiet period between the last change and the save.
pub const DEFAULT_DEBOUNCE: TimeDelta = TimeDelta::milliseconds(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveState {
    /// Nothing to save and nothing saved yet.
    Idle,
    /// Unsaved changes; `last_change` restarts the debounce window.
    Dirty { last_change: DateTime<Utc> },
    /// A write is in flight.
    Saving { ticket: u64 },
    /// The last write succeeded and nothing changed since.
    Saved { at: DateTime<Utc> },
    /// The last write failed; waiting for a change or an explicit retry.
    Failed { message: String },
}

/// Permission to perform one write of the payload identified by `fingerprint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub id: u64,
    pub fingerprint: String,
}

#[derive(Debug, Clone)]
pub struct AutosaveTracker {
    state: AutosaveState,
    debounce: TimeDelta,
    pending: Option<String>,
    in_flight: Option<SaveTicket>,
    last_sent: Option<String>,
    last_saved_at: Option<DateTime<Utc>>,
    next_ticket: u64,
}

impl Default for AutosaveTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl AutosaveTracker {
    pub fn new(debounce: TimeDelta) -> Self {
        Self {
            state: AutosaveState::Idle,
            debounce,
            pending: None,
            in_flight: None,
            last_sent: None,
            last_saved_at: None,
            next_ticket: 1,
        }
    }

    /// Tracker for a draft already persisted with payload `fingerprint`.
    pub fn resume(
        debounce: TimeDelta,
        fingerprint: String,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            state: AutosaveState::Saved { at: saved_at },
            last_sent: Some(fingerprint),
            last_saved_at: Some(saved_at),
            ..Self::new(debounce)
        }
    }

    pub fn state(&self) -> &AutosaveState {
        &self.state
    }

    /// True when there are changes that have not been handed out for saving.
    pub fn has_unsaved_changes(&self) -> bool {
        self.pending.is_some()
    }

    /// Records the form's current payload.
    pub fn record_change(
        &mut self,
        fingerprint: String,
        now: DateTime<Utc>,
    ) {
        let already_saved = self.last_sent.as_deref() == Some(fingerprint.as_str());
        let in_flight = self
            .in_flight
            .as_ref()
            .is_some_and(|t| t.fingerprint == fingerprint);

        if let AutosaveState::Saving { .. } = self.state {
            // The write in flight decides what is saved; only remember
            // whether another write will be needed afterwards.
            self.pending = (!in_flight).then_some(fingerprint);
            return;
        }

        if already_saved && !matches!(self.state, AutosaveState::Failed { .. }) {
            if self.pending.take().is_some() {
                debug!("change reverted to last saved payload");
                self.state = match self.last_saved_at {
                    Some(at) => AutosaveState::Saved { at },
                    None => AutosaveState::Idle,
                };
            }
            return;
        }

        self.pending = Some(fingerprint);
        self.state = AutosaveState::Dirty { last_change: now };
    }

    /// Hands out a save once the debounce window has passed without changes.
    pub fn poll(
        &mut self,
        now: DateTime<Utc>,
    ) -> Option<SaveTicket> {
        match self.state {
            AutosaveState::Dirty { last_change } if now - last_change >= self.debounce => {
                self.issue_ticket()
            }
            _ => None,
        }
    }

    /// Hands out a save immediately if there are unsaved changes, ignoring
    /// the debounce window (e.g. when leaving a wizard step).
    pub fn flush(&mut self) -> Option<SaveTicket> {
        match self.state {
            AutosaveState::Dirty { .. } => self.issue_ticket(),
            _ => None,
        }
    }

    /// Re-arms a failed save so the next [`poll`](Self::poll) retries it.
    pub fn retry(
        &mut self,
        now: DateTime<Utc>,
    ) {
        if let AutosaveState::Failed { .. } = self.state {
            if self.pending.is_some() {
                self.state = AutosaveState::Dirty { last_change: now };
            }
        }
    }

    /// Reports the outcome of the write for `ticket`. Returns false when the
    /// ticket is not the one in flight (a stale completion), which is ignored.
    pub fn complete(
        &mut self,
        ticket: &SaveTicket,
        result: Result<(), String>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.in_flight.as_ref() != Some(ticket) {
            warn!(ticket = ticket.id, "ignoring completion for a save that is not in flight");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(()) => {
                self.last_sent = Some(ticket.fingerprint.clone());
                let superseded = self
                    .pending
                    .as_ref()
                    .is_some_and(|p| Some(p) != self.last_sent.as_ref());
                if superseded {
                    self.state = AutosaveState::Dirty { last_change: now };
                } else {
                    self.pending = None;
                    self.last_saved_at = Some(now);
                    self.state = AutosaveState::Saved { at: now };
                }
            }
            Err(message) => {
                warn!(ticket = ticket.id, error = %message, "autosave failed");
                if self.pending.is_none() {
                    self.pending = Some(ticket.fingerprint.clone());
                }
                self.state = AutosaveState::Failed { message };
            }
        }
        true
    }

    fn issue_ticket(&mut self) -> Option<SaveTicket> {
        let fingerprint = self.pending.take()?;
        let ticket = SaveTicket {
            id: self.next_ticket,
            fingerprint,
        };
        self.next_ticket += 1;
        self.in_flight = Some(ticket.clone());
        self.state = AutosaveState::Saving { ticket: ticket.id };
        debug!(ticket = ticket.id, "autosave started");
        Some(ticket)
    }
}
