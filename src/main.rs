use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardbox::db::LogOnError;
use cardbox::state::AppState;
use cardbox::{config, db, handlers};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cardbox=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_path = config::load_database_path();
  let pool = db::init_db(&db_path).expect("Failed to initialize database");

  {
    let conn = pool.lock().expect("Database lock failed during startup");
    db::seed_demo_set(&conn).log_warn_default("Failed to seed demo study set");
  }

  let state = AppState::new(pool);

  // Periodic sweep of expired study sessions
  let sessions = state.sessions.clone();
  tokio::spawn(async move {
    let mut tick = tokio::time::interval(std::time::Duration::from_secs(
      config::SESSION_SWEEP_INTERVAL_SECS,
    ));
    loop {
      tick.tick().await;
      let removed = sessions.sweep();
      if removed > 0 {
        tracing::debug!(removed, "swept expired study sessions");
      }
    }
  });

  let app = handlers::app(state);

  let bind_addr = config::server_bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config::SERVER_PORT);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
