// handlers/mod.rs - Route handlers
//
// /save-data  POST    store a batch of scans
//             OPTIONS CORS preflight
// /health     GET     database connectivity probe

pub mod health;
pub mod save_data;

pub use health::health;
pub use save_data::{save_data_options, save_data_post};
