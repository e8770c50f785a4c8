use std::sync::Arc;

use faq_chat::{
    config::{self, Config},
    routes,
    services::faq_store::FaqStore,
    state::AppState,
};
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = Config::from_env();
    config::init_tracing(&cfg.log_level);

    let faq = FaqStore::connect(&cfg.database_url).await?;
    if cfg.seed_fixtures {
        faq.seed_defaults().await?;
    }
    if let Some(path) = &cfg.extra_fixture {
        let script = tokio::fs::read_to_string(path).await?;
        faq.run_script(&script).await?;
        info!(fixture = %path.display(), "applied extra fixture");
    }
    let records = faq.count().await?;
    info!(database_url = %cfg.database_url, records, "faq store ready");

    let state = Arc::new(AppState::new(faq, cfg.stream_delay));
    let cors = CorsLayer::very_permissive();

    let app = routes::create_router()
        .route("/", axum::routing::get(|| async { "faq-chat: POST /chat to ask a question" }))
        .with_state(state)
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_address).await?;
    info!(address = %cfg.bind_address, "faq chat server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
