//! Product listing page: route table, display formatting and dev server.

pub mod config;
pub mod format;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::DevConfig;
pub use format::{format_price, handle_image_error};
pub use http::DevServer;
pub use lifecycle::Shutdown;
pub use routing::{product_listing, RouteTable};
