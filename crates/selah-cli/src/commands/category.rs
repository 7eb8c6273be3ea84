use clap::{Subcommand, ValueEnum};

use selah_core::{Category, Database, ReminderRegistry, TimeOfDay};

#[derive(Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    QuietTime,
    Prayer,
    Gratitude,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::QuietTime => Category::QuietTime,
            CategoryArg::Prayer => Category::Prayer,
            CategoryArg::Gratitude => Category::Gratitude,
        }
    }
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List the fixed category reminders
    List,
    /// Enable a category reminder
    Enable {
        category: CategoryArg,
    },
    /// Disable a category reminder
    Disable {
        category: CategoryArg,
    },
    /// Change a category's delivery time
    Set {
        category: CategoryArg,
        /// Delivery time as HH:MM
        #[arg(long)]
        time: TimeOfDay,
    },
}

pub fn run(action: CategoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let registry = ReminderRegistry::new(&db);

    match action {
        CategoryAction::List => {
            let categories: Vec<_> = Category::ALL
                .into_iter()
                .map(|c| registry.category(c))
                .collect();
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
        CategoryAction::Enable { category } => {
            registry.set_category_enabled(category.into(), true)?;
            println!("ok");
        }
        CategoryAction::Disable { category } => {
            registry.set_category_enabled(category.into(), false)?;
            println!("ok");
        }
        CategoryAction::Set { category, time } => {
            registry.set_category_time(category.into(), time)?;
            println!("ok");
        }
    }
    Ok(())
}
