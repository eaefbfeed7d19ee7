pub mod clock;
pub mod types;
pub mod window;

pub use clock::{day_key, day_key_of, AnchoredClock, Clock, DayBoundary, SystemClock};
pub use types::*;
pub use window::OverrideWindow;
