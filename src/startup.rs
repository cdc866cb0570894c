use crate::components::google_calendar::{self, CalendarRouter};
use crate::components::work_log::{StdConsole, WorkLog};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use crate::utils::time::SystemClock;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        // stdout belongs to the prompts
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config, reporting what is missing
pub fn load_config() -> miette::Result<Config> {
    println!(" * Checking for application keys...");
    Ok(Config::load()?)
}

pub fn print_banner() {
    println!();
    println!("-- vestige {} ----------------------------", env!("CARGO_PKG_VERSION"));
}

/// Authorize, then run the work-item loop until input ends or the user interrupts
pub async fn start_session(config: Config) -> miette::Result<()> {
    println!(" * Authenticating to Google...");
    let client = google_calendar::connect(&config).await?;
    println!(" * Authentication finished.");

    let router = CalendarRouter::from_settings(&config.settings, &client).await?;
    if config.settings.categories {
        println!(" * Category calendars enabled.");
    }
    println!(" * Ready.");

    let mut work_log = WorkLog::new(client, SystemClock, router);
    let mut console = StdConsole::new();

    tokio::select! {
        result = work_log.run(&mut console) => {
            info!("Session ended");
            result.map_err(Into::into)
        }
        _ = shutdown::wait_for_signal() => {
            println!();
            println!(" * Bye.");
            // The pending stdin read would otherwise hold the runtime open
            std::process::exit(0)
        }
    }
}
