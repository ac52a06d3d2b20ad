//! Export of aggregated trees: paginated draw instructions, plain-text
//! pages and CSV

pub mod csv;
pub mod layout;
pub mod text;

pub use layout::{wrap_text, ExportBlock, ExportError, ExportFormatter, ExportSource, LayoutConfig};
pub use text::{render_document, render_pages};
