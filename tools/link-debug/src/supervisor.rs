//! Owning driver for one link state machine
//!
//! Holds the device context together with the standby depth memory and
//! feeds stimuli to the machine strictly in arrival order.

use std::fmt;
use std::str::FromStr;

use hdmi_tx_link::{DeviceContext, LinkEvent, LinkState, StandbyMemory, UnknownName};
use log::{debug, warn};

/// One input to the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stimulus {
    /// Deliver this event as is
    Event(LinkEvent),
    /// Leave standby using the remembered connection depth
    Resume,
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stimulus::Event(event) => write!(f, "{}", event),
            Stimulus::Resume => f.write_str("Resume"),
        }
    }
}

impl FromStr for Stimulus {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("resume") {
            return Ok(Stimulus::Resume);
        }
        s.parse::<LinkEvent>().map(Stimulus::Event)
    }
}

impl From<LinkEvent> for Stimulus {
    fn from(event: LinkEvent) -> Self {
        Stimulus::Event(event)
    }
}

/// What happened to one stimulus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Zero-based position in the stimulus stream
    pub index: usize,
    pub stimulus: Stimulus,
    /// Event actually handed to the machine; `None` for an unresolved resume
    pub delivered: Option<LinkEvent>,
    pub from: LinkState,
    pub to: LinkState,
    pub accepted: bool,
    /// Ignored-event count after this step
    pub ignored_events: u32,
}

impl StepRecord {
    pub fn is_unresolved(&self) -> bool {
        self.delivered.is_none()
    }
}

/// Single owner of a device context
#[derive(Debug, Default)]
pub struct Supervisor {
    ctx: DeviceContext,
    memory: StandbyMemory,
    steps: usize,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &DeviceContext {
        &self.ctx
    }

    pub fn state(&self) -> LinkState {
        self.ctx.state()
    }

    pub fn memory(&self) -> &StandbyMemory {
        &self.memory
    }

    /// Number of stimuli delivered so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Deliver one stimulus
    pub fn deliver(&mut self, stimulus: Stimulus) -> StepRecord {
        let index = self.steps;
        self.steps += 1;

        let event = match stimulus {
            Stimulus::Event(event) => event,
            Stimulus::Resume => match self.memory.resume_event() {
                Some(event) => event,
                None => {
                    warn!(
                        "step {}: resume in {} with no remembered connection depth",
                        index,
                        self.ctx.state()
                    );
                    return StepRecord {
                        index,
                        stimulus,
                        delivered: None,
                        from: self.ctx.state(),
                        to: self.ctx.state(),
                        accepted: false,
                        ignored_events: self.ctx.ignored_events(),
                    };
                }
            },
        };

        if event == LinkEvent::Standby {
            self.memory.record(self.ctx.state());
        }

        let t = self.ctx.apply(event);

        if t.accepted {
            if event == LinkEvent::Deinit || event.is_resume() {
                self.memory.clear();
            }
            debug!("step {}: {} --{}--> {}", index, t.from, event, t.to);
        } else {
            warn!(
                "step {}: ignored {} in {} ({} ignored so far)",
                index,
                event,
                t.from,
                self.ctx.ignored_events()
            );
        }

        StepRecord {
            index,
            stimulus,
            delivered: Some(event),
            from: t.from,
            to: t.to,
            accepted: t.accepted,
            ignored_events: self.ctx.ignored_events(),
        }
    }

    /// Deliver a sequence of stimuli in order
    pub fn run<I>(&mut self, stimuli: I) -> Vec<StepRecord>
    where
        I: IntoIterator<Item = Stimulus>,
    {
        stimuli.into_iter().map(|s| self.deliver(s)).collect()
    }
}
