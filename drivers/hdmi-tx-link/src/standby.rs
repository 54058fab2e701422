//! Standby depth memory for the power-management supervisor.
//!
//! The machine collapses every pre-standby state into a single `Standby`
//! state. To resume, the supervisor must pick one of three resume events
//! based on how far the link had come. `StandbyMemory` keeps that coarse
//! depth beside the context; the transition table never sees it.

use crate::event::LinkEvent;
use crate::state::LinkState;

/// How far the physical link had progressed when standby was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionDepth {
    /// No sink attached
    Unplugged,
    /// Sink attached, EDID not read
    AwaitEdid,
    /// Sink attached and EDID read (authentication progress is dropped)
    PluggedIn,
}

impl ConnectionDepth {
    /// Depth of a state, if it has one.
    ///
    /// `Uninitialized` and `Standby` have no depth.
    pub const fn of(state: LinkState) -> Option<Self> {
        match state {
            LinkState::Uninitialized | LinkState::Standby => None,
            LinkState::Disconnected => Some(ConnectionDepth::Unplugged),
            LinkState::AwaitEdid => Some(ConnectionDepth::AwaitEdid),
            LinkState::AwaitRxSense
            | LinkState::SinkConnected
            | LinkState::VideoNoHdcp
            | LinkState::HdcpWaitRx
            | LinkState::HdcpWaitBstatus
            | LinkState::HdcpWaitSha1
            | LinkState::HdcpAuthenticated => Some(ConnectionDepth::PluggedIn),
        }
    }

    /// Event that resumes from standby to this depth
    pub const fn resume_event(self) -> LinkEvent {
        match self {
            ConnectionDepth::Unplugged => LinkEvent::ResumeToUnplugged,
            ConnectionDepth::AwaitEdid => LinkEvent::ResumeToAwaitEdid,
            ConnectionDepth::PluggedIn => LinkEvent::ResumeToPluggedIn,
        }
    }
}

/// Remembered connection depth across one standby period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandbyMemory {
    depth: Option<ConnectionDepth>,
}

impl StandbyMemory {
    pub const fn new() -> Self {
        Self { depth: None }
    }

    /// Record the depth of `state` just before `Standby` is delivered.
    ///
    /// Returns false, leaving any earlier record in place, when `state` has
    /// no depth.
    pub fn record(&mut self, state: LinkState) -> bool {
        match ConnectionDepth::of(state) {
            Some(depth) => {
                self.depth = Some(depth);
                true
            }
            None => false,
        }
    }

    pub const fn depth(&self) -> Option<ConnectionDepth> {
        self.depth
    }

    /// Resume event for the remembered depth
    pub fn resume_event(&self) -> Option<LinkEvent> {
        self.depth.map(ConnectionDepth::resume_event)
    }

    /// Resume event for the remembered depth; the memory is cleared.
    pub fn take_resume_event(&mut self) -> Option<LinkEvent> {
        self.depth.take().map(ConnectionDepth::resume_event)
    }

    pub fn clear(&mut self) {
        self.depth = None;
    }
}
