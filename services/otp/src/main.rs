use tracing::info;

use passgate_otp::config::OtpConfig;
use passgate_otp::router::build_router;
use passgate_otp::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = OtpConfig::from_env();
    let addr = format!("0.0.0.0:{}", config.otp_port);

    let state = AppState::new(config);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("otp service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
