pub mod api_routes;

use actix_web::{middleware, web::Data, App, HttpServer};
use anyhow::anyhow;
use burrow_api::BurrowContext;
use burrow_db::{build_db_pool, get_database_url_from_env, DbPool};
use burrow_utils::{settings::Settings, BurrowError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub async fn start_burrow_server() -> Result<(), BurrowError> {
  let settings = Settings::get();

  let db_url = get_database_url_from_env().unwrap_or_else(|_| settings.get_database_url());
  let pool = build_db_pool(&db_url, settings.database.pool_size)?;

  run_migrations(&pool)?;

  let context = BurrowContext::create(pool);

  info!(
    "Starting http server at {}:{}",
    settings.bind, settings.port
  );
  HttpServer::new(move || {
    App::new()
      .wrap(middleware::Logger::default())
      .app_data(Data::new(context.clone()))
      .configure(api_routes::config)
  })
  .bind((settings.bind, settings.port))?
  .run()
  .await?;

  Ok(())
}

fn run_migrations(pool: &DbPool) -> Result<(), BurrowError> {
  let mut conn = pool.get()?;
  info!("Running database migrations (if any)");
  conn
    .run_pending_migrations(MIGRATIONS)
    .map_err(|e| anyhow!("Couldnt run DB migrations: {}", e))?;
  Ok(())
}
