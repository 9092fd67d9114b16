//! API layer - HTTP endpoints

pub mod error;
pub mod health;
pub mod router;
pub mod state;
pub mod v1;

pub use router::create_router;
pub use state::AppState;
