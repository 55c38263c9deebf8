use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entities::job_card::{JobStage, StageStatus};

/// Events emitted by the domain services. Delivery is fire-and-forget:
/// consumers (toasts, dashboards, alerting) must never affect the
/// correctness of the operation that emitted the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Material events
    MaterialCreated {
        material_id: i64,
    },
    MaterialReceived {
        material_id: i64,
        quantity: i32,
    },
    MaterialIssued {
        material_id: i64,
        quantity: i32,
        reference: Option<String>,
    },

    // Material request events
    MaterialRequestSubmitted {
        request_id: i64,
        material_id: i64,
        quantity: i32,
    },
    MaterialRequestApproved {
        request_id: i64,
        material_id: i64,
        quantity: i32,
    },
    MaterialRequestRejected {
        request_id: i64,
    },

    // Board events
    BoardCreated {
        board_id: i64,
        board_type: String,
        color: String,
    },
    BoardManufactured {
        board_id: i64,
        quantity: i32,
        reference: Option<String>,
    },
    BoardSold {
        board_id: i64,
        quantity: i32,
    },

    // Tool events
    ToolIssued {
        tool_id: i64,
        quantity: i32,
    },
    ToolReturned {
        tool_id: i64,
        quantity: i32,
    },

    // Job card events
    JobCardCreated {
        job_card_id: i64,
        job_card_number: String,
    },
    JobStageAdvanced {
        job_card_id: i64,
        stage: JobStage,
        status: StageStatus,
    },
    JobCardCompleted {
        job_card_id: i64,
        job_card_number: String,
    },

    // Customer goods events
    CustomerGoodsReceived {
        customer_good_id: i64,
    },
    CustomerGoodsReturned {
        customer_good_id: i64,
    },

    // Stock alerting
    LowStockDetected {
        item: String,
        quantity: i32,
        min_threshold: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging on failure instead of propagating. Used on
    /// paths where notification delivery must not fail the operation.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            warn!(?event, "event delivery failed: {}", e);
        }
    }
}

/// Drains the event channel and logs each event. The notification
/// collaborator (toasts, dashboards) would subscribe here.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::LowStockDetected {
                item,
                quantity,
                min_threshold,
            } => {
                warn!(
                    item = %item,
                    quantity = quantity,
                    min_threshold = min_threshold,
                    "stock at or below minimum threshold"
                );
            }
            other => info!(event = ?other, "domain event"),
        }
    }
    info!("event channel closed; processor exiting");
}
