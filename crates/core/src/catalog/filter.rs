use crate::models::{BaitSet, FishEntry, RouteInfo, RouteSlot, TimeOfDay};

/// Select the fish worth targeting at `location` during `time`.
///
/// A fish qualifies when it is recommended, its time-of-day requirement (if
/// any) matches, and it can actually be hooked on the spectral bait: either
/// it is mooched, it has no bait requirement, or the bait it requires is the
/// spectral bait for this time of day. Targets are ordered by earliest bite;
/// fish sharing a `min_time` keep their catalog order.
pub fn fish_targets(
    location: &str,
    time: TimeOfDay,
    fish: &[FishEntry],
    baits: &BaitSet,
) -> RouteInfo {
    let spectral_bait = baits.spectral(time);

    let mut targets: Vec<FishEntry> = fish
        .iter()
        .filter(|entry| entry.recommended)
        .filter(|entry| entry.time.map_or(true, |required| required == time))
        .filter(|entry| {
            entry.mooch
                || !entry.bait_required
                || entry.bait.as_deref() == Some(spectral_bait)
        })
        .cloned()
        .collect();
    targets.sort_by(|a, b| a.min_time.total_cmp(&b.min_time));

    RouteInfo {
        name: RouteSlot {
            location: location.to_string(),
            time,
        }
        .display_name(),
        bait: baits.default.clone(),
        spectral_bait: spectral_bait.to_string(),
        targets,
    }
}
