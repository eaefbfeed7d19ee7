pub mod deeplink;
pub mod engine;
pub mod types;

pub use deeplink::classify_external;
pub use engine::NavigationGuard;
pub use types::*;
