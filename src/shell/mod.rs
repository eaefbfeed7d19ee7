pub mod controller;
pub mod events;
pub mod protocol;
pub mod runtime;
pub mod state;

pub use controller::ShellController;
pub use events::{BlockedNotice, Effect, Presentation, ShellCommand, ShellEvent};
pub use runtime::{BootMessage, CommandSink, ShellRuntime};
pub use state::ShellState;
