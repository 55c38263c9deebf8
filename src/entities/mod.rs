pub mod board;
pub mod board_transaction;
pub mod customer_good;
pub mod job_card;
pub mod job_card_material;
pub mod material;
pub mod material_request;
pub mod material_transaction;
pub mod tool;
pub mod tool_transaction;
