//! Backend entry-point: wires the REST endpoints, persistence adapters, and
//! OpenAPI docs.

use std::env;
use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::{web, App, HttpServer};
use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::domain::{ReportService, UserService};
use backend::inbound::http::health::{live, ready, HealthState};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::{reports, summaries, users, verifications};
use backend::outbound::auth::Argon2CredentialHasher;
use backend::outbound::object_storage::FsObjectStorage;
use backend::outbound::persistence::{
    DbPool, DieselReportRepository, DieselSummaryQuery, DieselUserRepository,
    DieselVerificationRepository, PoolConfig,
};
#[cfg(debug_assertions)]
use backend::ApiDoc;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|e| std::io::Error::other(format!("failed to connect for migrations: {e}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| std::io::Error::other(format!("failed to run migrations: {e}")))?;
    info!(count = applied.len(), "migrations applied");
    Ok(())
}

fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| std::io::Error::other("DATABASE_URL must be set"))?;
    run_migrations(&database_url)?;

    let key = load_session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let media_root = env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into());

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("failed to build pool: {e}")))?;

    let user_repo = Arc::new(DieselUserRepository::new(pool.clone()));
    let report_repo = Arc::new(DieselReportRepository::new(pool.clone()));
    let verification_repo = Arc::new(DieselVerificationRepository::new(pool.clone()));
    let summary_query = Arc::new(DieselSummaryQuery::new(pool));
    let storage = Arc::new(FsObjectStorage::new(media_root, "/media"));

    let state = HttpState::new(
        Arc::new(UserService::new(user_repo, Arc::new(Argon2CredentialHasher))),
        Arc::new(ReportService::new(report_repo, verification_repo)),
        summary_query,
        storage,
    );
    let state = web::Data::new(state);

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays reachable.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();

        // Literal report paths are registered before the `{id}` matcher.
        let api = web::scope("/api/v1")
            .wrap(session)
            .service(users::register)
            .service(users::staff_register)
            .service(users::login)
            .service(users::logout)
            .service(users::profile)
            .service(users::delete_profile)
            .service(users::award_credits)
            .service(reports::create_report)
            .service(reports::list_my_reports)
            .service(reports::list_public_reports)
            .service(reports::list_pending_reports)
            .service(reports::list_nearby_reports)
            .service(reports::list_all_reports)
            .service(verifications::verify_report)
            .service(verifications::list_verifications)
            .service(reports::get_report)
            .service(reports::update_report_status)
            .service(reports::upload_image)
            .service(summaries::user_summaries)
            .service(summaries::report_analytics);

        let app = App::new()
            .app_data(state.clone())
            .app_data(server_health_state.clone())
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app = app
            .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(("0.0.0.0", 8080))?;

    health_state.mark_ready();
    server.run().await
}
