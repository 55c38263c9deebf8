pub mod boards;
pub mod customer_goods;
pub mod job_cards;
pub mod material_requests;
pub mod materials;
pub mod tools;
