use anyhow::Result;
use gamegems_node::api::start_api_server;
use gamegems_node::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    start_api_server(config).await
}
