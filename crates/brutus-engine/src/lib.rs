// Engine module - pure structure generation and rendering
// Nothing in this crate performs I/O; the console and CLI call these as plain functions.

pub mod generator;
pub mod render;

pub use generator::{generate, mock_hierarchy};
pub use render::{
    NO_STRUCTURE_PLACEHOLDER, TRUNCATION_MARKER, display_width, fit_to_width, render_column,
    render_side_by_side, render_tree, render_truncated,
};
