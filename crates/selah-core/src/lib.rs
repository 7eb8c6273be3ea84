//! # Selah Core Library
//!
//! Core business logic for Selah, a devotional journaling app. The heart
//! of the library is the reminder engine: a wall-clock check function
//! that fires recurring and one-shot reminders at most once per calendar
//! day, no matter how often or how irregularly the host invokes it. All
//! operations are available through a standalone CLI binary; GUI hosts
//! are thin layers over the same library.
//!
//! ## Architecture
//!
//! - **Reminders**: descriptor types, recurrence evaluation, the per-day
//!   delivery log, and the engine that ties them together. The engine has
//!   no background timer; the host calls `check_and_fire()` periodically
//! - **Storage**: a `SettingsStore` key-value seam with a SQLite
//!   implementation, plus TOML-based host configuration
//! - **Notify**: the host notification capability behind a trait, so the
//!   engine is testable without a desktop environment
//!
//! ## Key Components
//!
//! - [`ReminderEngine`]: the idempotent check-and-fire entry point
//! - [`ReminderRegistry`]: fixed categories and per-note reminders
//! - [`DeliveryLog`]: at-most-once-per-day delivery guard
//! - [`Database`]: SQLite-backed settings store
//! - [`Config`]: application configuration management

pub mod error;
pub mod notify;
pub mod reminders;
pub mod storage;

pub use error::{ConfigError, CoreError, StoreError};
pub use notify::{Notifier, TerminalNotifier};
pub use reminders::{
    Category, CheckOutcome, CheckReport, DeliveryLog, DeliveryStatus, Payload, Reminder,
    ReminderEngine, ReminderRegistry, ReminderStatus, Repeat, SkipReason, TimeOfDay, WeekdaySet,
};
pub use storage::{Config, Database, MemoryStore, SettingsStore};
