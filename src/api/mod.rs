//! API Module
//!
//! HTTP handlers and routing for the directory REST facade.
//!
//! # Endpoints
//! - `GET /api/sites` - Cached directory listing with filters
//! - `POST /api/sites` - Create a directory entry
//! - `PUT /api/sites/:id` - Update a directory entry
//! - `DELETE /api/sites/:id` - Delete a directory entry
//! - `GET /api/cache/stats` - Cache dashboard numbers
//! - `DELETE /api/cache` - Invalidate keys by pattern
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
