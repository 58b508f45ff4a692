mod api;
mod middleware;
#[cfg(test)]
mod test_support;
mod web;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use instasent_scraper::{HttpImageFetcher, InstagramClient};
use instasent_sentiment::{Analyzer, Scorers};

use crate::{
    api::{build_app, AppState, PostCountLimits},
    middleware::AnalysisThrottle,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = instasent_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    let session = InstagramClient::connect(&config).await?;
    let images =
        HttpImageFetcher::new(config.scraper_request_timeout_secs, &config.scraper_user_agent)?;
    let scorers = Scorers::from_app_config(&config)?;
    let analyzer = Analyzer::new(Arc::new(session), Arc::new(images), scorers);

    let state = AppState {
        analyzer,
        posts: PostCountLimits {
            default: config.default_post_count,
            max: config.max_post_count,
        },
    };
    let app = build_app(state, AnalysisThrottle::per_minute(config.rate_limit_per_minute));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "instasent server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
