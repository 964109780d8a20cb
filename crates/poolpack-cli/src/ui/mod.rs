//! Terminal output helpers.
//!
//! Status lines go to stderr so that stdout stays free for command output
//! such as the task listing.

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size, print_artifact_summary};
pub use messages::{error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if color output should be enabled.
///
/// Respects `NO_COLOR` and `FORCE_COLOR`, falling back to terminal detection.
pub fn should_use_color() -> bool {
    crate::logger::should_use_colors()
}

/// Decide once whether status lines are colored.
///
/// Call early in `main`; `--no-color` always wins.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
