// Entry point for `cargo run -p web-server`: serves the API against PostgreSQL
// with the settings from `config.toml` and the environment.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_path = configuration::load_dotenv();
    let settings = configuration::load_settings()?;
    let _guard = configuration::init_tracing(&settings.logging)?;
    if let Some(path) = &dotenv_path {
        tracing::debug!(path = %path.display(), "Loaded environment from .env file.");
    }

    let store = web_server::connect_store(&settings).await?;
    web_server::run_server(&settings, store).await
}
