pub mod source;
pub mod store;
pub mod types;

pub use source::{FetchError, HttpPolicySource, PolicySource};
pub use store::PolicyStore;
pub use types::*;
