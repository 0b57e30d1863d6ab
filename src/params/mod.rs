//! Parameter definitions with units and documented defaults.
//!
//! Every tunable number of the viewer lives here rather than inline.

mod analysis;
mod render;
mod view;

// Re-export all types
pub use analysis::AnalysisParams;
pub use render::RenderConfig;
pub use view::ViewParams;
