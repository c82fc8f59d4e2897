//! HTTP surface of the voice agent
//!
//! - GET /ws - duplex interview connection (binary audio in, JSON events out)
//! - GET /voice/sample - unauthenticated voice preview clip
//! - GET /health - health check

mod handlers;
mod routes;
mod state;
mod ws;

pub use routes::create_router;
pub use state::AppState;
