//! Markdown outline extraction.
//!
//! This module handles:
//! - Parsing markdown with comrak
//! - Extracting the heading outline with byte ranges and line numbers
//! - Allocating deduplicated URL-safe anchors

mod extract;
mod slug;
mod types;

pub use extract::extract;
pub use slug::SlugAllocator;
pub use types::{HeadingItem, LineIndex, heading_id};
