//! Human-facing renderings of a scan: badges, Markdown and the console line.

pub mod badge;
pub mod markdown;
pub mod render;

pub use badge::{badge_json, badge_label, badge_url};
pub use markdown::render_report;
pub use render::render_summary;
