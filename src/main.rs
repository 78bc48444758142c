use std::error::Error;

use tracing::Level;
use tracing_subscriber::{Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; the process environment is used as-is.
    dotenvy::dotenv().ok();

    let filter = ai_llm_service::telemetry::env_filter_with_level("info", Level::INFO);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(true)
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    !meta.target().starts_with(ai_llm_service::telemetry::TARGET_PREFIX)
                })),
        )
        .with(ai_llm_service::telemetry::layer())
        .try_init()?;

    api::start().await?;

    Ok(())
}
