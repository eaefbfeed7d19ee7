pub mod scripts;
pub mod sync;
pub mod types;

pub use scripts::{escape_for_template_literal, hydration_script, SYNC_STORAGE_SCRIPT};
pub use sync::{parse_sync_message, SessionContinuity};
pub use types::SessionSnapshot;
