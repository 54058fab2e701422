//! Built-in link scenarios
//!
//! Named stimulus streams covering the common link lifecycles. Each can be
//! run directly or exported as a trace file for editing.

pub mod hdcp;
pub mod link;
pub mod scenario;

pub use hdcp::{PLAIN_AUTH, REPEATER_AUTH, RETRY_STORM, SINK_LOSS};
pub use link::{EARLY_SINK_ON, STANDBY_RESUME, STRAY_TIMEOUT};
pub use scenario::Scenario;

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Registry of built-in scenarios
pub static SCENARIOS: Lazy<HashMap<&'static str, &'static Scenario>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("plain-auth", &*PLAIN_AUTH);
    m.insert("default", &*PLAIN_AUTH);
    m.insert("sink-loss", &*SINK_LOSS);
    m.insert("repeater-auth", &*REPEATER_AUTH);
    m.insert("repeater", &*REPEATER_AUTH);
    m.insert("retry-storm", &*RETRY_STORM);
    m.insert("early-sink-on", &*EARLY_SINK_ON);
    m.insert("stray-timeout", &*STRAY_TIMEOUT);
    m.insert("standby-resume", &*STANDBY_RESUME);
    m.insert("standby", &*STANDBY_RESUME);
    m
});

/// Get a scenario by name
pub fn get_scenario(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.get(name.to_lowercase().as_str()).copied()
}

/// Scenario names only (deduplicated)
pub fn scenario_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = vec![
        "plain-auth",
        "sink-loss",
        "repeater-auth",
        "retry-storm",
        "early-sink-on",
        "stray-timeout",
        "standby-resume",
    ];
    names.sort();
    names
}
