use burrow_server::start_burrow_server;
use burrow_utils::BurrowError;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> Result<(), BurrowError> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  tracing_subscriber::fmt().with_env_filter(filter).init();

  start_burrow_server().await
}
