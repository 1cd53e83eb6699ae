//! HTTP layer for the relay: `POST /api/chat` and `GET /health`.

pub mod error;
pub mod handlers;
pub mod router;
