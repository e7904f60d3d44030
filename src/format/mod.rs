//! Display helpers for the listing.
//!
//! - price.rs: locale-aware number formatting (Persian by default)
//! - image.rs: fallback source for images that failed to load
//!
//! Everything here is pure or touches only the value handed in.

pub mod image;
pub mod price;

pub use image::{handle_image_error, ImageElement, ImageErrorEvent, ImageSource};
pub use price::{format_price, NumberFormat, Symbols, EN_US, FA_IR};
