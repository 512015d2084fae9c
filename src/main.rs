use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use falai_leads::config::Config;
use falai_leads::{app, AppState};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Arc::new(Config::from_env());
    if config.webhook_legado.is_some() {
        info!("modo legado ativo: encaminhando leads sem assinatura");
    }

    //cliente compartilhado entre as invocacoes, com timeout explicito
    let http_client = reqwest::Client::builder()
        .timeout(config.timeout_upstream)
        .build()
        .context("erro ao criar cliente http")?;

    let estado = AppState {
        config,
        http_client,
    };

    let porta = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([127, 0, 0, 1], porta));

    let listener = TcpListener::bind(&addr)
        .await
        .context("erro ao criar listener")?;
    info!("Listening on {}", addr);

    axum::serve(listener, app(estado))
        .await
        .context("erro ao iniciar o servidor")?;
    Ok(())
}
