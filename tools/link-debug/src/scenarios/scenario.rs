//! Scenario definition
//!
//! A scenario is a named stimulus stream with the outcome the link state
//! machine must reach from a fresh context.

use hdmi_tx_link::{LinkEvent, LinkState};

use crate::supervisor::Stimulus;
use crate::trace::{Expectation, Trace, TraceStep};

/// Scenario step: deliver `event`, expect `state` afterwards
pub fn step(event: LinkEvent, state: LinkState) -> (Stimulus, LinkState) {
    (Stimulus::Event(event), state)
}

/// Built-in link scenario
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Short identifier (e.g., "plain-auth")
    pub id: String,
    /// Display name
    pub name: String,
    pub description: String,
    /// Stimuli in delivery order, with the state expected after each
    pub steps: Vec<(Stimulus, LinkState)>,
    /// Ignored-event count expected at the end
    pub expect_ignored: u32,
}

impl Scenario {
    /// State the scenario must end in
    pub fn expect_state(&self) -> LinkState {
        self.steps
            .last()
            .map(|(_, state)| *state)
            .unwrap_or(LinkState::Uninitialized)
    }

    /// Express the scenario as a replayable trace
    pub fn to_trace(&self) -> Trace {
        Trace {
            name: self.id.clone(),
            description: Some(self.description.clone()),
            steps: self
                .steps
                .iter()
                .map(|(stimulus, state)| TraceStep {
                    stimulus: *stimulus,
                    expect: Some(*state),
                })
                .collect(),
            expect: Expectation {
                state: Some(self.expect_state()),
                ignored: Some(self.expect_ignored),
            },
        }
    }
}
