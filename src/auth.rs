//! Auth-domain identifiers, token secrets, token responses, and user profiles.

pub mod id;
pub mod profile;
pub mod token;

pub use id::*;
pub use profile::*;
pub use token::{response::*, secret::*};
