//! Auth-domain scopes and token models.

pub mod record;
pub mod scope;

pub use record::*;
pub use scope::*;
