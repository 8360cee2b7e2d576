//! Document transforms.

pub mod html;

pub use html::{DocumentRewriter, Outcome};
