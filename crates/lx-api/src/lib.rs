pub mod client_id;
pub mod cors;
pub mod error;
pub mod rest;
pub mod router;
pub mod state;
pub mod webhook;

pub use router::build_router;
pub use state::AppState;
