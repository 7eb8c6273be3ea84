//! Reminder descriptor types and recurrence evaluation.
//!
//! Fixed category reminders and per-note reminders both normalize into
//! [`Reminder`]; the engine never needs to know which kind it is looking
//! at. Eligibility is a pure function of the descriptor and a calendar
//! date, so it is testable without any clock or store.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wall-clock local time a reminder should fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    /// Construct a valid time of day, or `None` if out of range.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Exact-minute match against a clock reading. Seconds are ignored.
    pub fn matches_minute(self, time: NaiveTime) -> bool {
        u32::from(self.hour) == time.hour() && u32::from(self.minute) == time.minute()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Error parsing a `HH:MM` string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected HH:MM in 24-hour time")]
pub struct ParseTimeOfDayError;

impl FromStr for TimeOfDay {
    type Err = ParseTimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s.split_once(':').ok_or(ParseTimeOfDayError)?;
        let hour: u8 = h.parse().map_err(|_| ParseTimeOfDayError)?;
        let minute: u8 = m.parse().map_err(|_| ParseTimeOfDayError)?;
        Self::new(hour, minute).ok_or(ParseTimeOfDayError)
    }
}

/// Set of weekdays, indexed 0 = Sunday through 6 = Saturday.
///
/// Serialized as a list of indices. Indices outside 0..=6 are dropped on
/// decode; an empty set makes the reminder permanently ineligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    pub fn from_indices(days: &[u8]) -> Self {
        let mut set = Self::EMPTY;
        for &day in days {
            set.insert(day);
        }
        set
    }

    pub fn insert(&mut self, day: u8) {
        if day < 7 {
            self.0 |= 1 << day;
        }
    }

    pub fn contains(self, day: u8) -> bool {
        day < 7 && self.0 & (1 << day) != 0
    }

    /// Membership test for the weekday of `date`.
    pub fn contains_date(self, date: NaiveDate) -> bool {
        self.contains(date.weekday().num_days_from_sunday() as u8)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Sorted member indices.
    pub fn indices(self) -> Vec<u8> {
        (0..7).filter(|&day| self.contains(day)).collect()
    }
}

impl From<Vec<u8>> for WeekdaySet {
    fn from(days: Vec<u8>) -> Self {
        Self::from_indices(&days)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.indices()
    }
}

/// When a reminder is eligible to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Repeat {
    /// Fires only on the reminder's creation date, then disables itself.
    Once,
    /// Fires every day. The fallback when a stored policy is missing.
    #[default]
    Daily,
    /// Fires on the given weekdays.
    Weekdays { days: WeekdaySet },
}

/// Notification text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// One reminder as the engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    /// Category slug for fixed reminders, note id for per-note reminders.
    pub id: String,
    pub enabled: bool,
    pub time: TimeOfDay,
    pub repeat: Repeat,
    /// Date the reminder was created. Only consulted by [`Repeat::Once`];
    /// fixed categories leave it unset. A one-shot without it never fires.
    pub created_on: Option<NaiveDate>,
    pub payload: Payload,
}

impl Reminder {
    /// Whether `date` is an eligible delivery day for this reminder.
    ///
    /// Pure calendar eligibility. The `enabled` flag and the delivery log
    /// are checked by the engine, not here.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        match self.repeat {
            Repeat::Once => self.created_on == Some(date),
            Repeat::Daily => true,
            Repeat::Weekdays { days } => days.contains_date(date),
        }
    }
}

/// The application's built-in daily reminder slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    QuietTime,
    Prayer,
    Gratitude,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::QuietTime, Category::Prayer, Category::Gratitude];

    /// Stable identifier, doubles as the descriptor id and the store key
    /// suffix.
    pub fn slug(self) -> &'static str {
        match self {
            Category::QuietTime => "quiet_time",
            Category::Prayer => "prayer",
            Category::Gratitude => "gratitude",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.slug() == slug)
    }

    /// Delivery time used until the user picks one.
    pub fn default_time(self) -> TimeOfDay {
        match self {
            Category::QuietTime => TimeOfDay { hour: 8, minute: 0 },
            Category::Prayer => TimeOfDay { hour: 12, minute: 0 },
            Category::Gratitude => TimeOfDay { hour: 21, minute: 0 },
        }
    }

    pub fn payload(self) -> Payload {
        let (title, body) = match self {
            Category::QuietTime => (
                "Quiet time",
                "Be still. Today's passage is waiting for you.",
            ),
            Category::Prayer => ("Prayer", "Take a moment to pray."),
            Category::Gratitude => (
                "Gratitude",
                "Write down one thing you're thankful for today.",
            ),
        };
        Payload {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base(repeat: Repeat) -> Reminder {
        Reminder {
            id: "r".into(),
            enabled: true,
            time: TimeOfDay { hour: 9, minute: 0 },
            repeat,
            created_on: Some(date(2024, 1, 1)),
            payload: Payload {
                title: "t".into(),
                body: String::new(),
            },
        }
    }

    #[test]
    fn daily_is_due_every_day() {
        let r = base(Repeat::Daily);
        assert!(r.is_due_on(date(2024, 1, 1)));
        assert!(r.is_due_on(date(2024, 6, 15)));
    }

    #[test]
    fn once_is_due_only_on_creation_date() {
        let r = base(Repeat::Once);
        assert!(r.is_due_on(date(2024, 1, 1)));
        assert!(!r.is_due_on(date(2024, 1, 2)));
        assert!(!r.is_due_on(date(2023, 12, 31)));
    }

    #[test]
    fn once_without_creation_date_is_never_due() {
        let mut r = base(Repeat::Once);
        r.created_on = None;
        assert!(!r.is_due_on(date(2024, 1, 1)));
    }

    #[test]
    fn weekdays_follow_sunday_zero_numbering() {
        // 2024-01-01 was a Monday, 2024-01-07 a Sunday.
        let r = base(Repeat::Weekdays {
            days: WeekdaySet::from_indices(&[1, 3, 5]),
        });
        assert!(r.is_due_on(date(2024, 1, 1))); // Monday = 1
        assert!(!r.is_due_on(date(2024, 1, 2))); // Tuesday = 2
        assert!(r.is_due_on(date(2024, 1, 3))); // Wednesday = 3
        assert!(!r.is_due_on(date(2024, 1, 7))); // Sunday = 0
    }

    #[test]
    fn empty_weekday_set_is_never_due() {
        let r = base(Repeat::Weekdays {
            days: WeekdaySet::EMPTY,
        });
        for day in 1..=7 {
            assert!(!r.is_due_on(date(2024, 1, day)));
        }
    }

    #[test]
    fn weekday_set_drops_out_of_range_indices() {
        let set = WeekdaySet::from(vec![1, 9, 200, 3]);
        assert_eq!(set.indices(), vec![1, 3]);
    }

    #[test]
    fn repeat_defaults_to_daily() {
        assert_eq!(Repeat::default(), Repeat::Daily);
    }

    #[test]
    fn repeat_serde_shape() {
        let repeat = Repeat::Weekdays {
            days: WeekdaySet::from_indices(&[0, 6]),
        };
        let json = serde_json::to_string(&repeat).unwrap();
        assert_eq!(json, r#"{"kind":"weekdays","days":[0,6]}"#);

        let parsed: Repeat = serde_json::from_str(r#"{"kind":"once"}"#).unwrap();
        assert_eq!(parsed, Repeat::Once);
    }

    #[test]
    fn time_of_day_parses_and_displays() {
        let t: TimeOfDay = "07:05".parse().unwrap();
        assert_eq!(t, TimeOfDay { hour: 7, minute: 5 });
        assert_eq!(t.to_string(), "07:05");
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("9".parse::<TimeOfDay>().is_err());
        assert!("nine:thirty".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn time_of_day_matches_ignore_seconds() {
        let t = TimeOfDay { hour: 9, minute: 0 };
        assert!(t.matches_minute(NaiveTime::from_hms_opt(9, 0, 59).unwrap()));
        assert!(!t.matches_minute(NaiveTime::from_hms_opt(9, 1, 0).unwrap()));
    }

    #[test]
    fn category_slugs_roundtrip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_slug(cat.slug()), Some(cat));
        }
        assert_eq!(Category::from_slug("naps"), None);
    }

    proptest! {
        #[test]
        fn weekday_set_roundtrip_keeps_valid_indices(days in proptest::collection::vec(0u8..20, 0..12)) {
            let set = WeekdaySet::from_indices(&days);
            let encoded: Vec<u8> = set.into();
            prop_assert!(encoded.iter().all(|&d| d < 7));
            prop_assert_eq!(WeekdaySet::from_indices(&encoded), set);
            for day in 0..7u8 {
                prop_assert_eq!(set.contains(day), days.contains(&day));
            }
        }
    }
}
