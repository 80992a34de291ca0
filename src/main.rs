use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};
use projecthire_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware, routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_api = Router::new()
        .route("/api/jobs", get(routes::job::list_public_jobs))
        .route("/api/jobs/:id", get(routes::job::get_public_job))
        .route("/api/discovery", get(routes::job::discover_jobs))
        .route("/api/webhooks/stripe", post(routes::webhook::stripe_webhook))
        .route(
            "/api/webhooks/lemonsqueezy",
            post(routes::webhook::lemonsqueezy_webhook),
        )
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.public_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let account_api = Router::new()
        .route(
            "/api/users/me",
            get(routes::user::me).put(routes::user::update_me),
        )
        .route("/api/users/register", post(routes::user::register))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_session_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.authenticated_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let employer_api = Router::new()
        .route("/api/jobs", post(routes::job::create_job))
        .route(
            "/api/jobs/:id",
            put(routes::job::update_job).delete(routes::job::delete_job),
        )
        .route("/api/employer/jobs", get(routes::job::list_employer_jobs))
        .route(
            "/api/employer/jobs/:id/applications",
            get(routes::application::list_job_applications),
        )
        .route("/api/employer/stats", get(routes::job::employer_stats))
        .route(
            "/api/applications/:id",
            patch(routes::application::update_application_status),
        )
        .route(
            "/api/payments/create-checkout-session",
            post(routes::payment::create_checkout_session),
        )
        .route("/api/uploads/logo", post(routes::upload::upload_logo))
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::require_employer,
        ))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_session_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.authenticated_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let candidate_api = Router::new()
        .route("/api/jobs/:id/apply", post(routes::application::apply_to_job))
        .route(
            "/api/candidate/applications",
            get(routes::application::list_my_applications),
        )
        .route("/api/uploads/resume", post(routes::upload::upload_resume))
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::require_candidate,
        ))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_session_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.authenticated_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(public_api)
        .merge(account_api)
        .merge(employer_api)
        .merge(candidate_api)
        .with_state(app_state)
        .layer(axum::middleware::from_fn(
            middleware::access_control::access_control,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
