use tracing::info;
use vestige::startup;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    startup::print_banner();
    info!("Starting vestige");

    // Missing keys end the program here, before any authorization
    let config = startup::load_config()?;

    // Run the work-item loop
    startup::start_session(config).await
}
