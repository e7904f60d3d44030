//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation request (path, optional query/fragment)
//!     → router.rs (ordered route lookup)
//!     → matcher.rs (segment-by-segment pattern match, param extraction)
//!     → Return: Matched / Redirect / NotFound
//!
//! Route Compilation (at startup):
//!     RouteEntry[] (routes.rs)
//!     → Parse patterns
//!     → Check route name uniqueness
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Table built once by the composition root, immutable at runtime
//! - No regex: patterns are split into static and `:param` segments
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)
//! - Explicit NotFound rather than a silent catch-all

pub mod matcher;
pub mod router;
pub mod routes;

pub use matcher::{PathPattern, PatternError, Segment};
pub use router::{
    MatchResult, Navigation, Params, Resolution, RouteEntry, RouteError, RouteTable, RouteTarget,
    View,
};
pub use routes::{product_listing, PRODUCTS_PATH, PRODUCT_LIST_ROUTE, PRODUCTS_ROUTE};
