use chrono::Local;
use clap::{Subcommand, ValueEnum};

use selah_core::{
    Database, Payload, Reminder, ReminderRegistry, Repeat, TimeOfDay, WeekdaySet,
};

#[derive(Clone, Copy, PartialEq, ValueEnum)]
pub enum RepeatArg {
    Once,
    Daily,
    Weekdays,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum WeekdayArg {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl WeekdayArg {
    fn index(self) -> u8 {
        self as u8
    }
}

#[derive(Subcommand)]
pub enum NoteAction {
    /// List per-note reminders
    List,
    /// Attach a reminder to a note, replacing any existing one
    Set {
        /// Note identifier
        note_id: String,
        /// Delivery time as HH:MM
        #[arg(long)]
        time: TimeOfDay,
        /// Repeat policy
        #[arg(long, value_enum, default_value_t = RepeatArg::Daily)]
        repeat: RepeatArg,
        /// Weekdays for --repeat weekdays, e.g. --days mon,wed,fri
        #[arg(long, value_delimiter = ',')]
        days: Vec<WeekdayArg>,
        /// Notification title
        #[arg(long, default_value = "Journal reminder")]
        title: String,
        /// Notification body
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Disable a note's reminder without removing it
    Disable {
        note_id: String,
    },
    /// Remove a note's reminder
    Remove {
        note_id: String,
    },
}

pub fn run(action: NoteAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let registry = ReminderRegistry::new(&db);

    match action {
        NoteAction::List => {
            let notes = registry.note_reminders();
            println!("{}", serde_json::to_string_pretty(&notes)?);
        }
        NoteAction::Set {
            note_id,
            time,
            repeat,
            days,
            title,
            body,
        } => {
            if !days.is_empty() && repeat != RepeatArg::Weekdays {
                return Err("--days only applies with --repeat weekdays".into());
            }
            let repeat = match repeat {
                RepeatArg::Once => Repeat::Once,
                RepeatArg::Daily => Repeat::Daily,
                RepeatArg::Weekdays => {
                    if days.is_empty() {
                        return Err(
                            "at least one --days value is required with --repeat weekdays".into(),
                        );
                    }
                    let indices: Vec<u8> = days.iter().map(|d| d.index()).collect();
                    Repeat::Weekdays {
                        days: WeekdaySet::from_indices(&indices),
                    }
                }
            };
            registry.upsert_note_reminder(&Reminder {
                id: note_id,
                enabled: true,
                time,
                repeat,
                created_on: Some(Local::now().date_naive()),
                payload: Payload { title, body },
            })?;
            println!("ok");
        }
        NoteAction::Disable { note_id } => {
            registry.disable(&note_id)?;
            println!("ok");
        }
        NoteAction::Remove { note_id } => {
            if registry.remove_note_reminder(&note_id)? {
                println!("ok");
            } else {
                eprintln!("no reminder for note: {note_id}");
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
