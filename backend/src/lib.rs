//! Donations backend library modules.
//!
//! Layout follows ports and adapters: `domain` holds entities, the match
//! status workflow and services; `inbound` exposes them over HTTP;
//! `outbound` provides Diesel and in-memory repositories.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
