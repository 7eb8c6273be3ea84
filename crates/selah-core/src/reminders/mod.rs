mod delivery_log;
mod engine;
mod registry;
mod reminder;

pub use delivery_log::DeliveryLog;
pub use engine::{
    CheckOutcome, CheckReport, DeliveryStatus, ReminderEngine, ReminderStatus, SkipReason,
};
pub use registry::ReminderRegistry;
pub use reminder::{
    Category, ParseTimeOfDayError, Payload, Reminder, Repeat, TimeOfDay, WeekdaySet,
};
