//! Command-line drivers that run the engine without a UI.

pub mod headless;

pub use headless::{HeadlessController, HeadlessError, RenderSummary};
