//! Markdown post-processing for agent reports
//!
//! - Normalize: make every image URL absolute HTTPS
//! - Render: markdown to HTML, with a plain-text fallback

pub mod normalize;
pub mod render;

pub use normalize::normalize_image_urls;
pub use render::{escape_html, render_markdown, render_or_plain};
