//! DepositCore Server
//!
//! Production server for the investment platform REST APIs:
//! - User APIs: orders, KYC, notifications, queries, feedback, plans
//! - Admin APIs: order review, KYC review, users, plans, bank details,
//!   analytics, audit logs
//! - Health and readiness probes
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DC_API_PORT` | `8080` | HTTP API port |
//! | `DC_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `DC_MONGO_DB` | `depositcore` | MongoDB database name |
//! | `DC_JWT_PRIVATE_KEY_PATH` | - | Path to RSA private key PEM |
//! | `DC_JWT_PUBLIC_KEY_PATH` | - | Path to RSA public key PEM |
//! | `DC_JWT_SECRET` | - | HS256 secret (development fallback) |
//! | `DC_JWT_ISSUER` | `depositcore` | JWT issuer claim |
//! | `DC_JWT_AUDIENCE` | `depositcore` | JWT audience claim |
//! | `DC_BLOB_ROOT` | `./blobs` | Local filesystem blob root |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use axum::Router;
use utoipa_axum::router::OpenApiRouter;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use anyhow::Result;
use tracing::{info, warn};
use tokio::{signal, net::TcpListener};
use utoipa_swagger_ui::SwaggerUi;
use object_store::local::LocalFileSystem;

use dc_platform::{
    AuthService, AuthConfig, AuthorizationService, AuditService,
    NotificationEmitter, BlobStorage, CollectionWatcher,
    Order, Notification,
    UserRepository, OrderRepository, KycRepository, PlanRepository,
    BankDetailRepository, NotificationRepository, QueryRepository,
    FeedbackRepository, RoleRepository, AuditLogRepository,
    MongoUnitOfWork,
};
use dc_platform::shared::middleware::{AppState, AuthLayer};
use dc_platform::shared::health_api::{health_router, HealthState};
use dc_platform::shared::indexes::initialize_indexes;
use dc_platform::role::entity::roles;
use dc_platform::order::api::{orders_router, admin_orders_router, OrdersState};
use dc_platform::order::operations::{
    CreateOrderUseCase, SubmitPaymentUseCase, DecideOrderUseCase,
    MarkProcessingUseCase, AttachCertificateUseCase,
};
use dc_platform::kyc::api::{kyc_router, admin_kyc_router, KycState};
use dc_platform::kyc::operations::{SubmitKycUseCase, ReviewKycUseCase, AdminEditKycUseCase};
use dc_platform::query::api::{queries_router, admin_queries_router, QueriesState};
use dc_platform::query::operations::{SubmitQueryUseCase, ReplyQueryUseCase, ResolveQueryUseCase};
use dc_platform::user::api::{user_status_router, admin_users_router, UsersState};
use dc_platform::plan::api::{plans_router, admin_plans_router, PlansState};
use dc_platform::bank_detail::api::{bank_details_router, admin_bank_details_router, BankDetailsState};
use dc_platform::notification::api::{notifications_router, NotificationsState};
use dc_platform::feedback::api::{feedback_router, admin_feedback_router, FeedbackState};
use dc_platform::analytics::api::{admin_analytics_router, AnalyticsState};
use dc_platform::audit::api::audit_logs_router;
use dc_platform::audit::api::AuditLogsState;
use dc_platform::storage::api::{upload_router, StorageState};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    dc_common::logging::init_logging("dc-server");

    info!("Starting DepositCore Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("DC_API_PORT", 8080);
    let mongo_url = env_or("DC_MONGO_URL", "mongodb://localhost:27017");
    let mongo_db = env_or("DC_MONGO_DB", "depositcore");
    let jwt_issuer = env_or("DC_JWT_ISSUER", "depositcore");
    let jwt_audience = env_or("DC_JWT_AUDIENCE", "depositcore");
    let blob_root = env_or("DC_BLOB_ROOT", "./blobs");

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", mongo_url, mongo_db);
    let mongo_client = mongodb::Client::with_uri_str(&mongo_url).await?;
    let db = mongo_client.database(&mongo_db);

    if let Err(e) = initialize_indexes(&db).await {
        warn!("Index initialization failed: {}", e);
    }

    // Initialize repositories
    let user_repo = Arc::new(UserRepository::new(&db));
    let order_repo = Arc::new(OrderRepository::new(&db));
    let kyc_repo = Arc::new(KycRepository::new(&db));
    let plan_repo = Arc::new(PlanRepository::new(&db));
    let bank_detail_repo = Arc::new(BankDetailRepository::new(mongo_client.clone(), &db));
    let notification_repo = Arc::new(NotificationRepository::new(&db));
    let query_repo = Arc::new(QueryRepository::new(&db));
    let feedback_repo = Arc::new(FeedbackRepository::new(&db));
    let role_repo = Arc::new(RoleRepository::new(&db));
    let audit_log_repo = Arc::new(AuditLogRepository::new(&db));
    info!("Repositories initialized");

    // Sync code-defined roles to database
    if let Err(e) = role_repo.sync_builtin(&roles::all()).await {
        warn!("Role sync failed: {}", e);
    }

    // Initialize auth
    let private_key_path = std::env::var("DC_JWT_PRIVATE_KEY_PATH").ok();
    let public_key_path = std::env::var("DC_JWT_PUBLIC_KEY_PATH").ok();
    let (private_key, public_key) = AuthConfig::load_rsa_keys(
        private_key_path.as_deref(),
        public_key_path.as_deref(),
    );

    let auth_config = AuthConfig {
        rsa_private_key: private_key,
        rsa_public_key: public_key,
        secret_key: env_or("DC_JWT_SECRET", ""),
        issuer: jwt_issuer,
        audience: jwt_audience,
        ..AuthConfig::default()
    };
    let auth_service = Arc::new(AuthService::new(auth_config));
    let authz_service = Arc::new(AuthorizationService::new(role_repo.clone(), user_repo.clone()));
    info!("Auth services initialized");

    let app_state = AppState {
        auth_service: auth_service.clone(),
        authz_service,
    };

    // Cross-cutting services
    let audit_service = Arc::new(AuditService::new(audit_log_repo.clone()));
    let notification_emitter = Arc::new(NotificationEmitter::new(notification_repo.clone()));

    std::fs::create_dir_all(&blob_root)?;
    let blob_store = Arc::new(LocalFileSystem::new_with_prefix(&blob_root)?);
    let blob_storage = Arc::new(BlobStorage::new(blob_store, "/api/blob"));

    // Change-stream watchers backing the SSE feeds
    let orders_watcher = Arc::new(CollectionWatcher::<Order>::new(
        mongo_client.clone(),
        mongo_db.clone(),
        "orders",
    ));
    let notifications_watcher = Arc::new(CollectionWatcher::<Notification>::new(
        mongo_client.clone(),
        mongo_db.clone(),
        "notifications",
    ));
    {
        let watcher = orders_watcher.clone();
        tokio::spawn(async move { watcher.run().await });
    }
    {
        let watcher = notifications_watcher.clone();
        tokio::spawn(async move { watcher.run().await });
    }

    // Create UnitOfWork for atomic commits with events and audit logs
    let unit_of_work = Arc::new(MongoUnitOfWork::new(mongo_client.clone(), db.clone()));

    // Order use cases
    let create_order_use_case = Arc::new(CreateOrderUseCase::new(
        plan_repo.clone(),
        bank_detail_repo.clone(),
        user_repo.clone(),
        unit_of_work.clone(),
    ));
    let submit_payment_use_case = Arc::new(SubmitPaymentUseCase::new(
        order_repo.clone(),
        unit_of_work.clone(),
    ));
    let decide_order_use_case = Arc::new(DecideOrderUseCase::new(
        order_repo.clone(),
        unit_of_work.clone(),
    ));
    let mark_processing_use_case = Arc::new(MarkProcessingUseCase::new(
        order_repo.clone(),
        unit_of_work.clone(),
    ));
    let attach_certificate_use_case = Arc::new(AttachCertificateUseCase::new(
        order_repo.clone(),
        unit_of_work.clone(),
    ));

    // KYC use cases
    let submit_kyc_use_case = Arc::new(SubmitKycUseCase::new(
        kyc_repo.clone(),
        user_repo.clone(),
        unit_of_work.clone(),
    ));
    let review_kyc_use_case = Arc::new(ReviewKycUseCase::new(
        kyc_repo.clone(),
        user_repo.clone(),
        unit_of_work.clone(),
    ));
    let admin_edit_kyc_use_case = Arc::new(AdminEditKycUseCase::new(
        kyc_repo.clone(),
        user_repo.clone(),
        unit_of_work.clone(),
    ));

    // Support query use cases
    let submit_query_use_case = Arc::new(SubmitQueryUseCase::new(unit_of_work.clone()));
    let reply_query_use_case = Arc::new(ReplyQueryUseCase::new(
        query_repo.clone(),
        unit_of_work.clone(),
    ));
    let resolve_query_use_case = Arc::new(ResolveQueryUseCase::new(
        query_repo.clone(),
        unit_of_work.clone(),
    ));

    // Build API states
    let orders_state = OrdersState {
        order_repo: order_repo.clone(),
        create_use_case: create_order_use_case,
        submit_payment_use_case,
        decide_use_case: decide_order_use_case,
        mark_processing_use_case,
        attach_certificate_use_case,
        notification_emitter: notification_emitter.clone(),
        watcher: orders_watcher,
    };
    let kyc_state = KycState {
        kyc_repo: kyc_repo.clone(),
        submit_use_case: submit_kyc_use_case,
        review_use_case: review_kyc_use_case,
        admin_edit_use_case: admin_edit_kyc_use_case,
        notification_emitter: notification_emitter.clone(),
    };
    let queries_state = QueriesState {
        query_repo,
        submit_use_case: submit_query_use_case,
        reply_use_case: reply_query_use_case,
        resolve_use_case: resolve_query_use_case,
        notification_emitter: notification_emitter.clone(),
    };
    let users_state = UsersState {
        user_repo: user_repo.clone(),
        audit_service: audit_service.clone(),
    };
    let plans_state = PlansState {
        plan_repo,
        audit_service: audit_service.clone(),
    };
    let bank_details_state = BankDetailsState {
        bank_detail_repo,
        audit_service: audit_service.clone(),
    };
    let notifications_state = NotificationsState {
        notification_repo,
        watcher: notifications_watcher,
    };
    let feedback_state = FeedbackState {
        feedback_repo,
        audit_service,
    };
    let analytics_state = AnalyticsState {
        order_repo,
        user_repo,
        kyc_repo,
    };
    let audit_logs_state = AuditLogsState { audit_log_repo };
    let storage_state = StorageState {
        blob_storage,
    };

    let health_state = HealthState::new(
        Some(db.clone()),
        Some(env!("CARGO_PKG_VERSION").to_string()),
    );

    // Build API router using OpenApiRouter for auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/user", user_status_router(users_state.clone()))
        .nest("/api/user/notifications", notifications_router(notifications_state))
        .nest("/api/plans", plans_router(plans_state.clone()))
        .nest("/api/bank-details", bank_details_router(bank_details_state.clone()))
        .nest("/api/feedback", feedback_router(feedback_state.clone()))
        .nest("/api/upload", upload_router(storage_state))
        .nest("/api/admin/plans", admin_plans_router(plans_state))
        .nest("/api/admin/bank-details", admin_bank_details_router(bank_details_state))
        .nest("/api/admin/feedback", admin_feedback_router(feedback_state))
        .nest("/api/admin/users", admin_users_router(users_state))
        .nest("/api/admin/analytics", admin_analytics_router(analytics_state))
        .nest("/api/admin/audit-logs", audit_logs_router(audit_logs_state))
        .split_for_parts();

    // Add schemas referenced through #[serde(flatten)] that the router macro
    // does not auto-collect
    use utoipa::openapi::{ObjectBuilder, schema::Type};
    if let Some(components) = openapi.components.as_mut() {
        components.schemas.insert(
            "PaginationParams".to_string(),
            ObjectBuilder::new()
                .property("page", ObjectBuilder::new().schema_type(Type::Integer))
                .property("size", ObjectBuilder::new().schema_type(Type::Integer))
                .into(),
        );
    }

    openapi.info.title = "DepositCore Platform API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description =
        Some("REST APIs for fixed-deposit orders, KYC, and administration".to_string());

    // Routes that return regular Router (generic over the unit of work, so
    // not collected in OpenAPI)
    let app = Router::new()
        .merge(router)
        .nest("/api/orders", orders_router(orders_state.clone()))
        .nest("/api/admin/orders", admin_orders_router(orders_state))
        .nest("/api/kyc", kyc_router(kyc_state.clone()))
        .nest("/api/admin/kyc", admin_kyc_router(kyc_state))
        .nest("/api/queries", queries_router(queries_state.clone()))
        .nest("/api/admin/queries", admin_queries_router(queries_state))
        .nest("/q/health", health_router(health_state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    // Start API server
    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let api_listener = TcpListener::bind(&api_addr).await?;
    health_state.set_ready();

    let api_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(api_listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    info!("DepositCore Server started");
    info!("Press Ctrl+C to shutdown");

    shutdown_signal().await;
    info!("Shutdown signal received...");

    api_task.abort();

    info!("DepositCore Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
