//! Token material scoped to a single callback transaction.

pub mod response;
pub mod secret;
