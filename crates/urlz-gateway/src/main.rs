use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use urlz_core::{Repository, ShortCode};
use urlz_gateway::cli::{Cli, StorageBackendArg};
use urlz_gateway::{router, server, telemetry, AppState};
use urlz_generator::RandomGenerator;
use urlz_shortener::{Shortener, ShortenerService};
use urlz_storage::{InMemoryRepository, RedisRepository};

const HEALTH_CHECK_KEY: &str = "health_check";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format)?;

    let config = cli.gateway_config().context("invalid gateway settings")?;
    urlz_ratelimit::quota_for(config.rate_limit_per_second, config.rate_limit_burst)
        .context("invalid rate limit settings")?;
    let generator = RandomGenerator::new(cli.id_length).context("invalid id length")?;

    info!(
        listen_addr = %cli.listen_addr,
        base_path = %config.base_path,
        storage_backend = %cli.storage,
        id_length = cli.id_length,
        rate_limit_per_second = config.rate_limit_per_second,
        rate_limit_burst = config.rate_limit_burst,
        trusted_proxies = ?config.trusted_proxies,
        "starting urlz"
    );

    let shutdown = CancellationToken::new();
    let shortener = match cli.storage {
        StorageBackendArg::InMemory => {
            build_shortener(InMemoryRepository::new(), generator, shutdown.clone()).await?
        }
        StorageBackendArg::Redis => {
            let redis_url = cli
                .redis_url
                .as_deref()
                .context("redis url is required when storage backend is redis")?;
            let repository = RedisRepository::connect(redis_url)
                .await
                .context("failed to connect to redis")?;
            build_shortener(repository, generator, shutdown.clone()).await?
        }
    };

    let listener = tokio::net::TcpListener::bind(cli.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen_addr))?;

    server::serve(listener, router(AppState::new(shortener, config)), shutdown).await?;
    Ok(())
}

/// Checks that the store answers, then wraps it in the shortener service.
async fn build_shortener<R: Repository>(
    repository: R,
    generator: RandomGenerator,
    shutdown: CancellationToken,
) -> anyhow::Result<Arc<dyn Shortener>> {
    repository
        .exists(&ShortCode::new_unchecked(HEALTH_CHECK_KEY))
        .await
        .context("storage health check failed")?;
    info!("storage is reachable");

    Ok(Arc::new(ShortenerService::new(
        Arc::new(repository),
        generator,
        shutdown,
    )))
}
