//! Watch mode.
//!
//! [`FileWatcher`] forwards filesystem events for the project root into a
//! channel. [`RebuildLoop`] consumes that channel, drops events the
//! [`WatchFilter`] rejects (generated artifacts in particular), and reruns
//! the pipeline through the [`Rebuild`] trait. Runs never overlap: events
//! that arrive while a run is active are folded into a single follow-up run.

mod filter;
mod rebuild;
mod watcher;

pub use filter::WatchFilter;
pub use rebuild::{Rebuild, RebuildLoop};
pub use watcher::{FileChange, FileWatcher};
