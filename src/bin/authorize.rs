use vestige::components::google_calendar::{OAuthClient, TokenManager};
use vestige::config::Config;
use vestige::error::VestigeResult;

/// Run the consent flow again and overwrite the cached token
#[tokio::main]
async fn main() -> miette::Result<()> {
    run().await?;
    Ok(())
}

async fn run() -> VestigeResult<()> {
    let config = Config::load()?;
    let token_file = config.settings.token_file.clone();

    println!("Opening browser for Google Calendar authorization...");
    let tokens = TokenManager::authorize(token_file, OAuthClient::from_config(&config)).await?;

    println!("Token successfully saved to {}!", tokens.path().display());
    Ok(())
}
