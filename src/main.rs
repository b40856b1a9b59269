use dotenvy::dotenv;
use tracing::info;

use storefront_api::infra::{
    app::create_app, recheck::run_domain_recheck_loop, setup::init_app_state,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let app_state = init_app_state().await?;

    let bind_addr = app_state.config.bind_addr;

    let app = create_app(app_state.clone());

    // Spawn the domain recheck background task (after tracing is initialized)
    let use_cases = app_state.custom_domain_use_cases.clone();
    let config = app_state.config.clone();
    tokio::spawn(async move {
        run_domain_recheck_loop(use_cases, config).await;
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
