use agora_api::app::build_app;
use agora_api::config::AppConfig;

#[tokio::main]
async fn main() {
    agora_observability::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration, refusing to start");
            std::process::exit(1);
        }
    };

    let app = build_app(&config);
    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr = %config.bind_addr, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %config.bind_addr, "listening");

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server terminated");
        std::process::exit(1);
    }
}
