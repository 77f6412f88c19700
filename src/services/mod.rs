// src/services/mod.rs
pub mod call_registry;
pub mod clock;
pub mod duration_watchdog;
pub mod history_export;

pub use call_registry::CallSessionRegistry;
pub use clock::{Clock, SystemClock};
pub use duration_watchdog::{DurationWatchdog, TIMEOUT_OUTCOME};
pub use history_export::{export_csv, export_filename, read_history, write_history, HistoryRecord};
