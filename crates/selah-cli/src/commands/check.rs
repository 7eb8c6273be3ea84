use chrono::Local;
use log::{info, warn};
use tokio::time::{self, Duration};

use selah_core::{Config, Database, DeliveryStatus, ReminderEngine, TerminalNotifier};

fn build_engine(
    config: &Config,
) -> Result<ReminderEngine<Database, TerminalNotifier>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let notifier = TerminalNotifier::new(config.notifications.enabled);
    Ok(ReminderEngine::new(db, notifier))
}

/// One check against the current minute, report printed as JSON.
pub fn run_check() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let engine = build_engine(&config)?;
    let report = engine.check_and_fire(Local::now().naive_local());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Snapshot of every reminder's state for today, printed as JSON.
pub fn run_status() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let engine = build_engine(&config)?;
    let rows = engine.status(Local::now().naive_local());
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

/// Foreground loop: check once immediately, then on every interval tick
/// until the process is interrupted. The engine is idempotent per minute,
/// so an interval shorter than a minute is safe; one longer than a minute
/// can skip reminder windows.
pub fn run_watch(interval_secs: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let interval_secs = interval_secs.unwrap_or(config.watch.interval_secs).max(1);
    let engine = build_engine(&config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    info!("watching reminders every {interval_secs}s");

    runtime.block_on(async {
        let mut interval = time::interval(Duration::from_secs(interval_secs));
        loop {
            // First tick completes immediately: one check at startup.
            interval.tick().await;
            let report = engine.check_and_fire(Local::now().naive_local());
            for outcome in &report.outcomes {
                if let DeliveryStatus::Failed { reason } = &outcome.status {
                    warn!("reminder '{}': {reason}", outcome.id);
                }
            }
            if report.delivered_count() > 0 {
                info!("delivered {} reminder(s)", report.delivered_count());
            }
        }
    })
}
