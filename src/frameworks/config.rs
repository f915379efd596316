use std::{env, path::PathBuf, time::Duration};

// Runtime constants and environment lookups (not gameplay tuning).

/// Optional JSON match setup file; takes precedence over `MATCH_MAP`/`TEAM_SIZES`.
pub fn match_config_path() -> Option<PathBuf> {
    env::var("MATCH_CONFIG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

pub fn map_id() -> String {
    env::var("MATCH_MAP").unwrap_or_else(|_| crate::domain::tuning::maps::DEFAULT_MAP_ID.to_string())
}

/// Team sizes as a comma separated list, e.g. `2,1`.
pub fn team_sizes() -> Vec<usize> {
    env::var("TEAM_SIZES")
        .ok()
        .and_then(|v| parse_team_sizes(&v))
        .unwrap_or_else(|| vec![1, 1])
}

pub fn parse_team_sizes(raw: &str) -> Option<Vec<usize>> {
    let sizes: Option<Vec<usize>> = raw
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect();
    sizes.filter(|s| !s.is_empty())
}

pub fn tick_interval() -> Duration {
    let millis = env::var("TICK_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|&ms| ms > 0)
        .unwrap_or(DEFAULT_TICK_MILLIS);
    Duration::from_millis(millis)
}

pub const DEFAULT_TICK_MILLIS: u64 = 16;
pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const UPDATE_BROADCAST_CAPACITY: usize = 128;
pub const ERROR_CHANNEL_CAPACITY: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_sizes_parse_from_comma_list() {
        assert_eq!(parse_team_sizes("2, 1"), Some(vec![2, 1]));
        assert_eq!(parse_team_sizes("3,x"), None);
        assert_eq!(parse_team_sizes(""), None);
    }
}
