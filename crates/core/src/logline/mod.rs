//! Network log lines: classification, zone changes and live tailing.

/// First-match event classification of chat lines.
pub mod classifier;
/// Live log file follower.
pub mod tail;
/// Zone change records.
pub mod zone;

pub use classifier::{classify, LogEvent, SPECTRAL_MARKER};
pub use tail::{latest_log_file, LogFeed, LogTail, TailError};
pub use zone::parse_zone_change;
