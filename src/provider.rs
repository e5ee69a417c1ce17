//! Provider-facing site metadata.
//!
//! `site` selects the single base host (staging, production, or a custom deployment) and
//! derives every endpoint URL from it by path concatenation. `endpoint` names the fixed
//! directory paths and the labels used in errors and spans.

pub mod endpoint;
pub mod site;

pub use endpoint::*;
pub use site::*;
