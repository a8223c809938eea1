use gatehouse::application::users::seed_admin::SeedAdminUseCase;
use gatehouse::infrastructure;
use gatehouse::infrastructure::config::AppConfig;
use gatehouse::infrastructure::email::{EmailDispatcher, EmailProvider};
use gatehouse::infrastructure::state::AppState;
use gatehouse::presentation::router::{self, HttpSettings};

use dotenvy::dotenv;
use std::env;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_with_signal().await
}

async fn run_with_signal() -> anyhow::Result<()> {
    run(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run<F>(shutdown_signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    dotenv().ok();

    // Ignore the error: tests may initialise tracing more than once
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "gatehouse=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    let config = AppConfig::from_env()?;

    let (listener, app, email_worker) = bootstrap(&config).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    email_worker.abort();
    Ok(())
}

async fn bootstrap(
    config: &AppConfig,
) -> anyhow::Result<(
    tokio::net::TcpListener,
    axum::Router,
    tokio::task::JoinHandle<()>,
)> {
    let pool = infrastructure::db::create_pool(&config.database).await?;

    // Run migrations
    sqlx::migrate!().run(&pool).await?;

    let sender = EmailProvider::from_config(&config.email)?;
    let (dispatcher, email_worker) = EmailDispatcher::start(Arc::new(sender));

    let state = AppState::new(pool, config, Arc::new(dispatcher))?;

    if let Some(admin) = &config.admin {
        let seeded = SeedAdminUseCase::new(state.users.clone(), state.password_service.clone())
            .execute(&admin.email, &admin.password)
            .await?;
        if let Some(user) = seeded {
            tracing::info!(user_id = user.id, "Admin account created");
        }
    }

    let app = router::app(state, &HttpSettings::from(config))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::debug!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    Ok((listener, app, email_worker))
}
