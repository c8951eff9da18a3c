//! HTTP REST API interfaces
//!
//! - `common`: response envelope, error mapping and extractors
//! - `middleware`: bearer token verification and role gates
//! - `modules`: per-resource DTOs and handlers
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiState};
