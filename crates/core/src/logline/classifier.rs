use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Game events recognised in the chat log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogEvent {
    /// The boat moved on to its next fishing area.
    AreaChange,
    /// A regular cast.
    Cast,
    /// Cast into the spectral current.
    SpectralCast,
    /// Recast using the fish still on the line.
    Mooch,
    /// The cast ended without a catch.
    Miss,
    /// Fishing stopped.
    Quit,
    /// A fish took the bait.
    Bite,
}

/// Substring marking a cast into the spectral current.
pub const SPECTRAL_MARKER: &str = "spectral current";

/// Classification table, tested top to bottom; the first match wins.
///
/// Every pattern is anchored to a `00|<timestamp>|<code>|<actor>|<message>|`
/// chat record. The area change is announced by a named NPC; every other
/// event is a system message with an empty actor field.
static PATTERNS: Lazy<Vec<(Regex, LogEvent)>> = Lazy::new(|| {
    vec![
        (
            pattern(r"^00\|[^|]*\|[^|]*\|Foerzagyl\|Weigh the anchors! Shove off!\|"),
            LogEvent::AreaChange,
        ),
        (
            pattern(r"^00\|[^|]*\|[^|]*\|\|You cast your line"),
            LogEvent::Cast,
        ),
        (
            pattern(
                r"^00\|[^|]*\|[^|]*\|\|(Nothing bites\.|You reel in your line|You lose your bait|The fish gets away|You lose your |You cannot carry any more)",
            ),
            LogEvent::Miss,
        ),
        (
            pattern(r"^00\|[^|]*\|[^|]*\|\|You recast your line with the fish still hooked\."),
            LogEvent::Mooch,
        ),
        (
            pattern(r"^00\|[^|]*\|[^|]*\|\|(You put away your rod|Fishing canceled)"),
            LogEvent::Quit,
        ),
        (
            pattern(r"^00\|[^|]*\|[^|]*\|\|Something bites"),
            LogEvent::Bite,
        ),
    ]
});

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("invalid log line pattern")
}

/// Classify a raw log line.
///
/// Returns `None` for the vast majority of lines, which carry nothing the
/// session cares about. A cast whose message mentions the spectral current
/// is reported as [`LogEvent::SpectralCast`].
pub fn classify(line: &str) -> Option<LogEvent> {
    let event = PATTERNS
        .iter()
        .find(|(regex, _)| regex.is_match(line))
        .map(|(_, event)| *event)?;

    if event == LogEvent::Cast && line.contains(SPECTRAL_MARKER) {
        return Some(LogEvent::SpectralCast);
    }
    Some(event)
}
