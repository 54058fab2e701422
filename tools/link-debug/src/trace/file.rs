//! Trace file loader
//!
//! A trace is a TOML document listing the stimuli to feed a fresh link
//! state machine, with optional per-step and final expectations:
//!
//! ```toml
//! name = "hdcp-repeater"
//!
//! [[steps]]
//! event = "PluggedIn"
//! expect = "AwaitEdid"
//!
//! [expect]
//! state = "AwaitEdid"
//! ignored = 0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use hdmi_tx_link::LinkState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::supervisor::Stimulus;

/// Errors raised while loading or writing a trace
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed trace: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to encode trace: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("step {step}: unknown event '{name}'")]
    UnknownEvent { step: usize, name: String },

    #[error("{field}: unknown state '{name}'")]
    UnknownState { field: String, name: String },

    #[error("trace has no steps")]
    Empty,
}

// ============================================================================
// ON-DISK FORMAT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TraceDoc {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    steps: Vec<StepDoc>,
    #[serde(default, skip_serializing_if = "ExpectDoc::is_empty")]
    expect: ExpectDoc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StepDoc {
    event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expect: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ExpectDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ignored: Option<u32>,
}

impl ExpectDoc {
    fn is_empty(&self) -> bool {
        self.state.is_none() && self.ignored.is_none()
    }
}

// ============================================================================
// VALIDATED TRACE
// ============================================================================

/// One validated trace step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    pub stimulus: Stimulus,
    /// State the machine must be in after this step
    pub expect: Option<LinkState>,
}

/// Final expectations for a trace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expectation {
    pub state: Option<LinkState>,
    pub ignored: Option<u32>,
}

/// Validated trace, ready to replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<TraceStep>,
    pub expect: Expectation,
}

fn parse_state(field: String, name: &str) -> Result<LinkState, TraceError> {
    name.parse::<LinkState>().map_err(|_| TraceError::UnknownState {
        field,
        name: name.to_string(),
    })
}

impl Trace {
    /// Load and validate a trace file
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let content = fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate trace content
    pub fn parse(content: &str) -> Result<Self, TraceError> {
        let doc: TraceDoc = toml::from_str(content)?;

        if doc.steps.is_empty() {
            return Err(TraceError::Empty);
        }

        let mut steps = Vec::with_capacity(doc.steps.len());
        for (i, step) in doc.steps.iter().enumerate() {
            let stimulus = step
                .event
                .parse::<Stimulus>()
                .map_err(|_| TraceError::UnknownEvent {
                    step: i + 1,
                    name: step.event.clone(),
                })?;
            let expect = match &step.expect {
                Some(name) => Some(parse_state(format!("step {}", i + 1), name)?),
                None => None,
            };
            steps.push(TraceStep { stimulus, expect });
        }

        let state = match &doc.expect.state {
            Some(name) => Some(parse_state("expect.state".to_string(), name)?),
            None => None,
        };

        Ok(Self {
            name: doc.name,
            description: doc.description,
            steps,
            expect: Expectation {
                state,
                ignored: doc.expect.ignored,
            },
        })
    }

    /// Encode back to the on-disk TOML form
    pub fn to_toml(&self) -> Result<String, TraceError> {
        let doc = TraceDoc {
            name: self.name.clone(),
            description: self.description.clone(),
            steps: self
                .steps
                .iter()
                .map(|s| StepDoc {
                    event: s.stimulus.to_string(),
                    expect: s.expect.map(|state| state.to_string()),
                })
                .collect(),
            expect: ExpectDoc {
                state: self.expect.state.map(|state| state.to_string()),
                ignored: self.expect.ignored,
            },
        };
        Ok(toml::to_string_pretty(&doc)?)
    }

    pub fn stimuli(&self) -> impl Iterator<Item = Stimulus> + '_ {
        self.steps.iter().map(|s| s.stimulus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdmi_tx_link::LinkEvent;
    use std::io::Write;

    const EDID_TRACE: &str = r#"
name = "edid-read"
description = "Plug and read EDID"

[[steps]]
event = "PluggedIn"
expect = "AwaitEdid"

[[steps]]
event = "getblockdata"

[[steps]]
event = "Resume"

[expect]
state = "AwaitRxSense"
ignored = 0
"#;

    #[test]
    fn test_parse_trace() {
        let trace = Trace::parse(EDID_TRACE).unwrap();
        assert_eq!(trace.name, "edid-read");
        assert_eq!(trace.description.as_deref(), Some("Plug and read EDID"));
        assert_eq!(trace.steps.len(), 3);
        assert_eq!(
            trace.steps[0],
            TraceStep {
                stimulus: Stimulus::Event(LinkEvent::PluggedIn),
                expect: Some(LinkState::AwaitEdid),
            }
        );
        assert_eq!(
            trace.steps[1].stimulus,
            Stimulus::Event(LinkEvent::GetBlockData)
        );
        assert_eq!(trace.steps[2].stimulus, Stimulus::Resume);
        assert_eq!(trace.expect.state, Some(LinkState::AwaitRxSense));
        assert_eq!(trace.expect.ignored, Some(0));
    }

    #[test]
    fn test_unknown_event_reports_step() {
        let err = Trace::parse(
            r#"
name = "bad"
[[steps]]
event = "PluggedIn"
[[steps]]
event = "Reboot"
"#,
        )
        .unwrap_err();
        match err {
            TraceError::UnknownEvent { step, name } => {
                assert_eq!(step, 2);
                assert_eq!(name, "Reboot");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_expected_state() {
        let err = Trace::parse(
            r#"
name = "bad"
[[steps]]
event = "PluggedIn"
[expect]
state = "Connected"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, TraceError::UnknownState { .. }));
        assert_eq!(err.to_string(), "expect.state: unknown state 'Connected'");
    }

    #[test]
    fn test_empty_and_malformed() {
        assert!(matches!(
            Trace::parse("name = \"empty\"\n"),
            Err(TraceError::Empty)
        ));
        assert!(matches!(
            Trace::parse("name = [\n"),
            Err(TraceError::Parse(_))
        ));
    }

    #[test]
    fn test_toml_output_reloads() {
        let trace = Trace::parse(EDID_TRACE).unwrap();
        let encoded = trace.to_toml().unwrap();
        assert!(encoded.contains("event = \"GetBlockData\""));
        assert_eq!(Trace::parse(&encoded).unwrap(), trace);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EDID_TRACE.as_bytes()).unwrap();

        let trace = Trace::load(file.path()).unwrap();
        assert_eq!(trace.steps.len(), 3);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            Trace::load(&missing),
            Err(TraceError::Io { .. })
        ));
    }
}
