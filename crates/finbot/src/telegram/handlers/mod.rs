//! Dispatcher schema and the shared handler context

pub mod schema;
pub mod types;

pub use schema::schema;
pub use types::{sender_id, HandlerDeps, HandlerError};
