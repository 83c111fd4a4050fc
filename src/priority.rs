//! Channel/location priority filtering.
//!
//! Within each `(network, station)` group, channels are grouped by
//! `location`, then `channel_priorities` is applied as a first-match-wins
//! glob list over the channel code. `location_priorities` is then applied
//! across the surviving channels, keeping only the channels at the
//! highest-priority location code present for that station. Both filters
//! are skipped when the corresponding literal filter is present in
//! `Restrictions`.

use glob::Pattern;
use std::collections::HashMap;

/// Reduce `channels` to the highest-priority channel code in each location
/// group, using `priorities` as an ordered, first-match-wins glob list.
///
/// `key_of` extracts `(location, channel)` from an item; the returned
/// vector preserves the relative order of the surviving items.
pub fn filter_channel_priority<T>(
    items: Vec<T>,
    priorities: &[String],
    key_of: impl Fn(&T) -> (String, String),
) -> Vec<T> {
    if priorities.is_empty() {
        return items;
    }

    let patterns: Vec<Pattern> = priorities
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();

    let mut by_location: HashMap<String, Vec<(usize, T)>> = HashMap::new();
    for (idx, item) in items.into_iter().enumerate() {
        let (location, _channel) = key_of(&item);
        by_location.entry(location).or_default().push((idx, item));
    }

    let mut kept: Vec<(usize, T)> = Vec::new();
    for (_location, group) in by_location {
        if let Some(best_rank) = group
            .iter()
            .filter_map(|(_, item)| {
                let (_, channel) = key_of(item);
                patterns.iter().position(|p| p.matches(&channel))
            })
            .min()
        {
            for (idx, item) in group {
                let (_, channel) = key_of(&item);
                if patterns
                    .get(best_rank)
                    .is_some_and(|p| p.matches(&channel))
                {
                    kept.push((idx, item));
                }
            }
        }
        // Items matching no pattern in the priority list are dropped entirely.
    }

    kept.sort_by_key(|(idx, _)| *idx);
    kept.into_iter().map(|(_, item)| item).collect()
}

/// Keep only the items whose location equals the highest-priority location
/// code present among `items`.
pub fn filter_location_priority<T>(
    items: Vec<T>,
    priorities: &[String],
    location_of: impl Fn(&T) -> String,
) -> Vec<T> {
    if priorities.is_empty() {
        return items;
    }

    let best = priorities
        .iter()
        .find(|candidate| items.iter().any(|item| &location_of(item) == *candidate))
        .cloned();

    match best {
        Some(best_location) => items
            .into_iter()
            .filter(|item| location_of(item) == best_location)
            .collect(),
        None => items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins_channel_priority() {
        // Station offers HHZ, BHZ, LHZ at location ""; HH[ZNE] ranks first.
        let channels = vec![
            ("".to_string(), "HHZ".to_string()),
            ("".to_string(), "BHZ".to_string()),
            ("".to_string(), "LHZ".to_string()),
        ];
        let priorities = vec![
            "HH[ZNE]".to_string(),
            "BH[ZNE]".to_string(),
            "LH[ZNE]".to_string(),
        ];
        let kept = filter_channel_priority(channels, &priorities, |c| c.clone());
        assert_eq!(kept, vec![("".to_string(), "HHZ".to_string())]);
    }

    #[test]
    fn no_priorities_returns_input_unchanged() {
        let channels = vec![("".to_string(), "HHZ".to_string())];
        let kept = filter_channel_priority(channels.clone(), &[], |c| c.clone());
        assert_eq!(kept, channels);
    }

    #[test]
    fn channels_matching_no_pattern_are_dropped() {
        let channels = vec![
            ("".to_string(), "HHZ".to_string()),
            ("".to_string(), "XXX".to_string()),
        ];
        let priorities = vec!["HH[ZNE]".to_string()];
        let kept = filter_channel_priority(channels, &priorities, |c| c.clone());
        assert_eq!(kept, vec![("".to_string(), "HHZ".to_string())]);
    }

    #[test]
    fn filter_is_idempotent() {
        let channels = vec![
            ("00".to_string(), "HHZ".to_string()),
            ("10".to_string(), "BHZ".to_string()),
        ];
        let priorities = vec!["HH[ZNE]".to_string(), "BH[ZNE]".to_string()];
        let once = filter_channel_priority(channels.clone(), &priorities, |c| c.clone());
        let twice = filter_channel_priority(once.clone(), &priorities, |c| c.clone());
        assert_eq!(once, twice, "applying the filter twice must equal applying it once");
    }

    #[test]
    fn location_priority_keeps_only_highest_priority_location() {
        let channels = vec![
            ("00".to_string(), "HHZ".to_string()),
            ("10".to_string(), "HHZ".to_string()),
        ];
        let priorities = vec!["10".to_string(), "00".to_string()];
        let kept = filter_location_priority(channels, &priorities, |(loc, _)| loc.clone());
        assert_eq!(kept, vec![("10".to_string(), "HHZ".to_string())]);
    }

    #[test]
    fn location_priority_with_no_matching_location_returns_unchanged() {
        let channels = vec![("00".to_string(), "HHZ".to_string())];
        let priorities = vec!["99".to_string()];
        let kept = filter_location_priority(channels.clone(), &priorities, |(loc, _)| loc.clone());
        assert_eq!(kept, channels);
    }
}
