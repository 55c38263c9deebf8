use std::sync::Arc;

use josm_api::{
    db::DbPool,
    events::{Event, EventSender},
    handlers::AppServices,
    migrator::Migrator,
};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use tokio::sync::mpsc;

/// Test harness backed by an in-memory SQLite database with the full
/// schema applied. The event receiver is kept so tests can assert on
/// emitted events (and so sends never hit a closed channel).
pub struct TestApp {
    #[allow(dead_code)]
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub events: mpsc::Receiver<Event>,
}

impl TestApp {
    pub async fn new() -> Self {
        // A single pooled connection keeps every query on the same
        // in-memory database.
        let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(opt).await.expect("sqlite connect");
        Migrator::up(&db, None).await.expect("migrations");
        let db = Arc::new(db);

        let (tx, rx) = mpsc::channel(256);
        let services = AppServices::new(db.clone(), EventSender::new(tx));

        Self {
            db,
            services,
            events: rx,
        }
    }

    /// Drains and returns all events emitted so far.
    #[allow(dead_code)]
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
