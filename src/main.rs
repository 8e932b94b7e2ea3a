use log::info;

use persona_chat::{AppConfig, AppState, ChatClient, PersonaPrompt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>
{   dotenvy::dotenv().ok();
    env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = AppConfig::from_env()?;
    let persona = PersonaPrompt::load(&config.persona)?;
    let client = ChatClient::from_config(&config, persona)?;

    info!(
      "persona-chat {} starting ({} provider tier(s))",
      env!("CARGO_PKG_VERSION"),
      client.chain().enabled_tiers().len()
    );

    persona_chat::server::run(&config.server, AppState::new(client))
      .await?;
    Ok(())
}
