//! Interactive console: state machine, background tasks and the driver that
//! connects them.

pub mod dispatcher;
pub mod driver;
pub mod state;
pub mod task;

pub use dispatcher::{TokioDispatcher, run_task};
pub use driver::Console;
pub use state::{AuthStatus, ConsoleMessage, ConsoleState, KeyAction, Screen};
pub use task::{Task, TaskDispatcher, TaskHandle, TaskKind, TaskOutcome};
