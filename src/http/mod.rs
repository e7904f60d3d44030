//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → proxy.rs when the path is under a proxy prefix
//!         → remote origin → streamed back
//!     → otherwise routing::RouteTable::resolve
//!         → pages.rs (redirect / page shell / 404)
//!     → Send to client
//! ```

pub mod pages;
pub mod proxy;
pub mod request;
pub mod server;

pub use proxy::{ProxyError, ProxyRoute, ProxyTable};
pub use request::{MakeRequestUuidV4, RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, DevServer};
