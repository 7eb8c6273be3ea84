//! Reminder scheduling engine.
//!
//! The engine is wall-clock driven and has no thread or timer of its own.
//! The host calls [`ReminderEngine::check_and_fire`] periodically, roughly
//! once a minute while running and once at process start, and everything
//! is re-derived from `now` plus stored state. No pending timer survives a
//! restart because none exists in the first place.
//!
//! A reminder fires when three things line up: today is an eligible day
//! for its repeat policy, `now` is exactly its minute, and the delivery
//! log has no record for it today. The exact-minute match keeps a
//! once-a-minute caller from re-firing on every later minute, and the
//! delivery log alone carries the at-most-once-per-day guarantee, so
//! calling more often than once a minute is always safe.

use chrono::NaiveDateTime;
use log::error;
use serde::{Deserialize, Serialize};

use crate::notify::Notifier;
use crate::reminders::{DeliveryLog, Reminder, ReminderRegistry, Repeat};
use crate::storage::SettingsStore;

/// Why a reminder did not fire this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Today is not an eligible day for the repeat policy.
    NotDueToday,
    /// Eligible today, but `now` is not the reminder's minute.
    OutsideWindow,
    /// Already delivered today.
    AlreadyDelivered,
    /// Notification permission is not granted. The delivery log is left
    /// untouched so a grant later in the same minute can still deliver.
    PermissionDenied,
}

/// Delivery status for one reminder in one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Notification displayed and recorded.
    Delivered,
    /// Displayed, but a follow-up store write failed
    Failed {
        /// Human-readable reason for the failure
        reason: String,
    },
    /// Nothing to do
    Skipped { reason: SkipReason },
}

/// Outcome of evaluating one enabled reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub id: String,
    pub status: DeliveryStatus,
}

/// What one `check_and_fire` invocation did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// The clock reading the invocation evaluated against.
    pub checked_at: NaiveDateTime,
    /// One entry per enabled reminder. Disabled reminders are never
    /// evaluated and do not appear.
    pub outcomes: Vec<CheckOutcome>,
}

impl CheckReport {
    /// Number of reminders that delivered.
    pub fn delivered_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DeliveryStatus::Delivered))
            .count()
    }

    /// Number of reminders whose delivery hit a store write failure.
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DeliveryStatus::Failed { .. }))
            .count()
    }

    /// Number of reminders that had nothing to do.
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DeliveryStatus::Skipped { .. }))
            .count()
    }
}

/// One row of [`ReminderEngine::status`] output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderStatus {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub due_today: bool,
    pub delivered_today: bool,
}

/// Evaluates reminders against the wall clock and fires the due ones.
///
/// Both collaborators are injected: a [`SettingsStore`] holding reminder
/// configuration and the delivery log, and a [`Notifier`] for the host's
/// permission state and display capability. Registry and log state is
/// read fresh from the store on every invocation, so configuration
/// changes between calls are always picked up.
pub struct ReminderEngine<S, N> {
    store: S,
    notifier: N,
}

impl<S: SettingsStore, N: Notifier> ReminderEngine<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Evaluate every enabled reminder against `now`, firing the due ones.
    ///
    /// Safe to call at any time and at any frequency. Not reentrant:
    /// delivery records are read-modify-write against the store, so the
    /// host must not overlap two invocations.
    ///
    /// Never fails as a whole. Store write failures after a delivery are
    /// reported in that reminder's outcome and do not roll the delivery
    /// back or touch the other reminders.
    pub fn check_and_fire(&self, now: NaiveDateTime) -> CheckReport {
        let registry = ReminderRegistry::new(&self.store);
        let mut log = DeliveryLog::load(&self.store);

        let mut outcomes = Vec::new();
        for reminder in registry.list() {
            if !reminder.enabled {
                continue;
            }
            let status = self.evaluate(&registry, &mut log, &reminder, now);
            outcomes.push(CheckOutcome {
                id: reminder.id,
                status,
            });
        }
        CheckReport {
            checked_at: now,
            outcomes,
        }
    }

    fn evaluate(
        &self,
        registry: &ReminderRegistry<'_, S>,
        log: &mut DeliveryLog,
        reminder: &Reminder,
        now: NaiveDateTime,
    ) -> DeliveryStatus {
        let today = now.date();
        if !reminder.is_due_on(today) {
            return DeliveryStatus::Skipped {
                reason: SkipReason::NotDueToday,
            };
        }
        if !reminder.time.matches_minute(now.time()) {
            return DeliveryStatus::Skipped {
                reason: SkipReason::OutsideWindow,
            };
        }
        if log.already_delivered(&reminder.id, today) {
            return DeliveryStatus::Skipped {
                reason: SkipReason::AlreadyDelivered,
            };
        }
        if !self.notifier.permission_granted() {
            return DeliveryStatus::Skipped {
                reason: SkipReason::PermissionDenied,
            };
        }

        self.notifier.display(&reminder.payload);

        // The notification is on screen; from here, write failures are
        // reported rather than rolled back.
        let mut write_errors = Vec::new();
        if let Err(e) = log.mark_delivered(&self.store, &reminder.id, today) {
            error!("reminder '{}' delivered but not recorded: {e}", reminder.id);
            write_errors.push(format!("recording delivery failed: {e}"));
        }
        if matches!(reminder.repeat, Repeat::Once) {
            if let Err(e) = registry.disable(&reminder.id) {
                error!(
                    "one-shot reminder '{}' could not be disabled: {e}",
                    reminder.id
                );
                write_errors.push(format!("disabling one-shot failed: {e}"));
            }
        }
        if write_errors.is_empty() {
            DeliveryStatus::Delivered
        } else {
            DeliveryStatus::Failed {
                reason: write_errors.join("; "),
            }
        }
    }

    /// Read-only snapshot of every reminder, enabled or not, with its
    /// eligibility and delivery state for the current day. Fires nothing.
    pub fn status(&self, now: NaiveDateTime) -> Vec<ReminderStatus> {
        let registry = ReminderRegistry::new(&self.store);
        let log = DeliveryLog::load(&self.store);
        let today = now.date();
        registry
            .list()
            .into_iter()
            .map(|reminder| ReminderStatus {
                due_today: reminder.enabled && reminder.is_due_on(today),
                delivered_today: log.already_delivered(&reminder.id, today),
                reminder,
            })
            .collect()
    }
}
