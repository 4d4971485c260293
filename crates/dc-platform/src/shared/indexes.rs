//! MongoDB Index Initialization
//!
//! Creates indexes for all collections on application startup.

use mongodb::{Database, IndexModel, bson::doc, options::IndexOptions};
use tracing::info;

/// TTL for the event store: 90 days
const TTL_90_DAYS_SECONDS: u64 = 90 * 24 * 60 * 60;

/// Initialize all MongoDB indexes
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_user_indexes(db).await?;
    create_order_indexes(db).await?;
    create_kyc_indexes(db).await?;
    create_notification_indexes(db).await?;
    create_query_indexes(db).await?;
    create_bank_detail_indexes(db).await?;
    create_plan_indexes(db).await?;
    create_feedback_indexes(db).await?;
    create_role_indexes(db).await?;
    create_event_indexes(db).await?;
    create_audit_log_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

async fn create_user_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let users = db.collection::<mongodb::bson::Document>("users");

    // Email lookup (unique)
    users.create_index(
        IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .background(true)
                .build())
            .build(),
    ).await?;

    // Registration time series for analytics
    users.create_index(
        IndexModel::builder()
            .keys(doc! { "createdAt": 1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    info!("Created indexes on users");
    Ok(())
}

async fn create_order_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let orders = db.collection::<mongodb::bson::Document>("orders");

    // Per-user listing, newest first
    orders.create_index(
        IndexModel::builder()
            .keys(doc! { "userId": 1, "createdAt": -1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    // Admin status filtering
    orders.create_index(
        IndexModel::builder()
            .keys(doc! { "status": 1, "createdAt": -1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    info!("Created indexes on orders");
    Ok(())
}

async fn create_kyc_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Keyed by user id (_id = user id), so no separate user index
    let kyc = db.collection::<mongodb::bson::Document>("kyc");

    // Admin status filtering
    kyc.create_index(
        IndexModel::builder()
            .keys(doc! { "status": 1, "submittedAt": -1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    info!("Created indexes on kyc");
    Ok(())
}

async fn create_notification_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let notifications = db.collection::<mongodb::bson::Document>("notifications");

    // Per-user listing, newest first
    notifications.create_index(
        IndexModel::builder()
            .keys(doc! { "userId": 1, "createdAt": -1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    // Badge count (unread within window)
    notifications.create_index(
        IndexModel::builder()
            .keys(doc! { "userId": 1, "read": 1, "createdAt": -1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    info!("Created indexes on notifications");
    Ok(())
}

async fn create_query_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let queries = db.collection::<mongodb::bson::Document>("queries");

    // Per-user listing
    queries.create_index(
        IndexModel::builder()
            .keys(doc! { "userId": 1, "createdAt": -1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    // Admin status filtering
    queries.create_index(
        IndexModel::builder()
            .keys(doc! { "status": 1, "createdAt": -1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    info!("Created indexes on queries");
    Ok(())
}

async fn create_bank_detail_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let bank_details = db.collection::<mongodb::bson::Document>("bank_details");

    // Default account lookup (at most one document has isDefault true)
    bank_details.create_index(
        IndexModel::builder()
            .keys(doc! { "isDefault": 1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    info!("Created indexes on bank_details");
    Ok(())
}

async fn create_plan_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let plans = db.collection::<mongodb::bson::Document>("investment_plans");

    // Name lookup (unique)
    plans.create_index(
        IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .background(true)
                .build())
            .build(),
    ).await?;

    // Active filtering
    plans.create_index(
        IndexModel::builder()
            .keys(doc! { "isActive": 1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    info!("Created indexes on investment_plans");
    Ok(())
}

async fn create_feedback_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let feedback = db.collection::<mongodb::bson::Document>("feedback");

    feedback.create_index(
        IndexModel::builder()
            .keys(doc! { "userId": 1, "createdAt": -1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    info!("Created indexes on feedback");
    Ok(())
}

async fn create_role_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let roles = db.collection::<mongodb::bson::Document>("roles");

    // Code lookup (unique)
    roles.create_index(
        IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .background(true)
                .build())
            .build(),
    ).await?;

    info!("Created indexes on roles");
    Ok(())
}

async fn create_event_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let events = db.collection::<mongodb::bson::Document>("events");

    // Idempotency - essential for deduplication
    events.create_index(
        IndexModel::builder()
            .keys(doc! { "deduplicationId": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .sparse(true)
                .background(true)
                .build())
            .build(),
    ).await?;

    // TTL index - auto-delete events after 90 days
    events.create_index(
        IndexModel::builder()
            .keys(doc! { "time": 1 })
            .options(IndexOptions::builder()
                .expire_after(std::time::Duration::from_secs(TTL_90_DAYS_SECONDS))
                .background(true)
                .build())
            .build(),
    ).await?;

    info!("Created minimal indexes on events (write-optimized)");
    Ok(())
}

async fn create_audit_log_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let audit_logs = db.collection::<mongodb::bson::Document>("audit_logs");

    // Entity lookup
    audit_logs.create_index(
        IndexModel::builder()
            .keys(doc! { "entityType": 1, "entityId": 1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    // Principal lookup
    audit_logs.create_index(
        IndexModel::builder()
            .keys(doc! { "principalId": 1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    // Time-ordered listing
    audit_logs.create_index(
        IndexModel::builder()
            .keys(doc! { "performedAt": -1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    info!("Created indexes on audit_logs");
    Ok(())
}
