//! Locally served endpoints

pub mod docs;
pub mod health;

pub use docs::{docs_router, openapi_document};
pub use health::health_router;
