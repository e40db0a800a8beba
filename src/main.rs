use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

use casamercato::config::AppConfig;
use casamercato::error::AppError;
use casamercato::identity::{CurrentUser, UserId};
use casamercato::media::{media_router, MediaService, MemoryBlobStore};
use casamercato::store::MemoryStore;
use casamercato::telemetry;
use casamercato::workflows::directory::{
    directory_router, AccountStatus, DirectoryRepository, DirectoryService, UserProfile, UserRole,
};
use casamercato::workflows::favorites::{favorite_router, FavoriteService};
use casamercato::workflows::listings::{
    demo_draft, listing_router, ListingFilters, ListingService, SubmissionMode,
};
use casamercato::workflows::roles::{role_request_router, RoleRequestService};
use casamercato::workflows::settings::{settings_router, SettingsService};
use casamercato::workflows::WorkflowError;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "CasaMercato",
    about = "Moderated real-estate classifieds marketplace",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk the moderation lifecycle against an in-memory store and print
    /// each step
    Demo,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo => run_demo(),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let store = Arc::new(MemoryStore::new());
    let admin = seed_admin(&store)?;
    info!(admin_id = %admin.id, "seeded bootstrap admin account");

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = ops_router(state)
        .merge(marketplace_router(&store, &config.media.public_base_url))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "casamercato marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Liveness, readiness, and metrics endpoints for the process itself.
fn ops_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_endpoint))
        .route("/readyz", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

/// Every workflow router wired to the shared store.
fn marketplace_router(store: &Arc<MemoryStore>, media_base_url: &str) -> Router {
    let directory = Arc::new(DirectoryService::new(store.clone()));
    let listings = Arc::new(ListingService::new(store.clone(), store.clone()));
    let roles = Arc::new(RoleRequestService::new(store.clone(), store.clone()));
    let favorites = Arc::new(FavoriteService::new(store.clone(), store.clone()));
    let settings = Arc::new(SettingsService::new(store.clone(), store.clone()));
    let blobs = Arc::new(MemoryBlobStore::new(media_base_url));
    let media = Arc::new(MediaService::new(blobs, store.clone()));

    Router::new()
        .merge(directory_router(directory))
        .merge(listing_router(listings))
        .merge(role_request_router(roles))
        .merge(favorite_router(favorites))
        .merge(settings_router(settings))
        .merge(media_router(media))
}

/// The moderation endpoints are useless without at least one admin, so the
/// binary plants one at startup. Identity headers with this id act as the
/// bootstrap admin.
fn seed_admin(store: &Arc<MemoryStore>) -> Result<UserProfile, AppError> {
    let now = Utc::now();
    let admin = UserProfile {
        id: UserId::from("usr-admin"),
        email: "admin@casamercato.local".to_string(),
        full_name: Some("Amministratore".to_string()),
        phone: None,
        role: UserRole::Admin,
        status: AccountStatus::Attivo,
        created_at: now,
        updated_at: now,
    };
    let stored =
        DirectoryRepository::insert(store.as_ref(), admin).map_err(WorkflowError::from)?;
    Ok(stored)
}

fn run_demo() -> Result<(), AppError> {
    let store = Arc::new(MemoryStore::new());
    let directory = DirectoryService::new(store.clone());
    let listings = ListingService::new(store.clone(), store.clone());
    let roles = RoleRequestService::new(store.clone(), store.clone());
    let favorites = FavoriteService::new(store.clone(), store.clone());

    let admin_profile = seed_admin(&store)?;
    let admin = CurrentUser::new("usr-admin", "admin@casamercato.local");
    println!("CasaMercato moderation walkthrough");
    println!(
        "Seeded admin {} ({})",
        admin_profile.id, admin_profile.email
    );

    let anna = CurrentUser::new("usr-anna", "anna@example.it");
    directory.register(Some(&anna), Some("Anna Colombo".to_string()))?;
    let request = roles.submit(
        Some(&anna),
        "Gestisco tre appartamenti di famiglia a Milano".to_string(),
    )?;
    println!("\nRole request {} submitted by {}", request.id, anna.email);

    let approved = roles.approve(Some(&admin), &request.id)?;
    let anna_profile = directory.profile(Some(&anna))?;
    println!(
        "Request {} is now {}; {} holds the {} role",
        approved.id,
        approved.status.label(),
        anna_profile.email,
        anna_profile.role.label()
    );

    let submitted = listings.create(
        Some(&anna),
        demo_draft("Trilocale con balcone", "Milano", "Milano", 250_000.0),
        SubmissionMode::InAttesa,
    )?;
    println!(
        "\nListing {} submitted for review ({})",
        submitted.id,
        submitted.status.label()
    );
    let queue = listings.moderation_queue(Some(&admin))?;
    println!("Moderation queue holds {} listing(s)", queue.len());

    let published = listings.approve(Some(&admin), &submitted.id)?;
    if let (Some(from), Some(until)) = (published.published_at, published.expires_at) {
        println!("Listing {} published {} until {}", published.id, from, until);
    }

    let marco = CurrentUser::new("usr-marco", "marco@example.it");
    directory.register(Some(&marco), Some("Marco Ferri".to_string()))?;
    let catalogue = listings.search(&ListingFilters {
        city: Some("Milano".to_string()),
        ..ListingFilters::default()
    })?;
    println!(
        "\nPublic search for Milano returns {} result(s)",
        catalogue.len()
    );
    let saved = favorites.toggle(Some(&marco), &published.id)?;
    println!("{} saved listing {}: {}", marco.email, published.id, saved);

    let second = listings.create(
        Some(&anna),
        demo_draft("Monolocale da ristrutturare", "Roma", "Roma", 80_000.0),
        SubmissionMode::InAttesa,
    )?;
    let rejected = listings.reject(
        Some(&admin),
        &second.id,
        Some("Mancano le foto degli interni".to_string()),
    )?;
    println!(
        "\nListing {} rejected: {}",
        rejected.id,
        rejected.moderation_note.unwrap_or_default()
    );

    if let Some(expiry) = published.expires_at {
        let swept = listings.expire_overdue(Some(&admin), expiry)?;
        println!("\nExpiry sweep at {expiry}: {swept} listing(s) moved to Scaduto");
    }
    let counts = listings.overview(Some(&admin))?;
    println!(
        "Catalogue totals: {} listing(s), {} published, {} expired, {} rejected",
        counts.total(),
        counts.pubblicato,
        counts.scaduto,
        counts.rifiutato
    );

    Ok(())
}

async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
