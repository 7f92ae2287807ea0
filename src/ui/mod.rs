pub mod icons;
pub mod output;
pub mod progress;
pub mod progress_message;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    artifact, cycle, error, format_cycle, header, info, muted, phase, section, status, success,
    timing, warn,
};
pub use progress::ProgressManager;
pub use progress_message::{ProgressMessage, ProgressPhase};
pub use table::{collisions_table, failures_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
