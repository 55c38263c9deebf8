pub mod boards;
pub mod customer_goods;
pub mod health;
pub mod job_cards;
pub mod material_requests;
pub mod materials;
pub mod tools;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub materials: Arc<crate::services::materials::MaterialService>,
    pub tools: Arc<crate::services::tools::ToolService>,
    pub boards: Arc<crate::services::boards::BoardService>,
    pub job_cards: Arc<crate::services::job_cards::JobCardService>,
    pub material_requests: Arc<crate::services::material_requests::MaterialRequestService>,
    pub customer_goods: Arc<crate::services::customer_goods::CustomerGoodsService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        let materials = Arc::new(crate::services::materials::MaterialService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let tools = Arc::new(crate::services::tools::ToolService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let boards = Arc::new(crate::services::boards::BoardService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let job_cards = Arc::new(crate::services::job_cards::JobCardService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let material_requests = Arc::new(
            crate::services::material_requests::MaterialRequestService::new(
                db_pool.clone(),
                materials.clone(),
                event_sender.clone(),
            ),
        );
        let customer_goods = Arc::new(crate::services::customer_goods::CustomerGoodsService::new(
            db_pool,
            event_sender,
        ));

        Self {
            materials,
            tools,
            boards,
            job_cards,
            material_requests,
            customer_goods,
        }
    }
}
