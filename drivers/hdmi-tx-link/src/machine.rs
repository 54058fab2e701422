//! # Link/HDCP Transition Table
//!
//! The whole table is one `match` over `(LinkState, LinkEvent)`: one arm per
//! defined transition plus a single catch-all for ignored events. Any pair
//! without an arm leaves the state alone and bumps the ignored-event counter.
//!
//! ## Properties
//!
//! - **Totality**: every (state, event) pair has an outcome; `apply` cannot fail
//! - **Escape paths**: `Deinit` resets every initialized state; `Unplugged`
//!   and `Standby` are valid from every active state
//! - **Standby amnesia**: only `Deinit` and the three resume events leave `Standby`
//! - **HDCP retries**: `HdcpBksvInsecure` and `HdcpTimeout0` loop back to
//!   `HdcpWaitRx` instead of failing

use crate::event::LinkEvent;
use crate::state::LinkState;

// ============================================================================
// TRANSITION
// ============================================================================

/// Outcome of looking up one (state, event) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: LinkState,
    pub event: LinkEvent,
    pub to: LinkState,
    /// False when the event has no entry for `from`
    pub accepted: bool,
}

impl Transition {
    /// Accepted and the state changed
    pub fn is_state_change(&self) -> bool {
        self.accepted && self.from != self.to
    }
}

/// Pure table lookup. Never fails; an undefined pair yields
/// `accepted == false` with `to == from`.
pub const fn transition(from: LinkState, event: LinkEvent) -> Transition {
    use LinkEvent as E;
    use LinkState as S;

    let next = match (from, event) {
        (S::Uninitialized, E::Unplugged) => Some(S::Disconnected),
        (S::Uninitialized, E::PluggedIn) => Some(S::AwaitEdid),

        // Leaving standby: the supervisor picks the resume target
        (S::Standby, E::ResumeToUnplugged) => Some(S::Disconnected),
        (S::Standby, E::ResumeToPluggedIn) => Some(S::AwaitRxSense),
        (S::Standby, E::ResumeToAwaitEdid) => Some(S::AwaitEdid),

        // Escape paths
        (S::Uninitialized, E::Deinit) => None,
        (_, E::Deinit) => Some(S::Uninitialized),
        (S::Disconnected | S::Standby, E::Unplugged) => None,
        (_, E::Unplugged) if from.is_active() => Some(S::Disconnected),
        (_, E::Standby) if from.is_active() => Some(S::Standby),

        // Link discovery
        (S::Disconnected, E::PluggedIn) => Some(S::AwaitEdid),
        (S::AwaitEdid, E::GetBlockData) => Some(S::AwaitRxSense),
        (S::AwaitRxSense, E::SinkOn) => Some(S::SinkConnected),

        // Video path
        (S::SinkConnected, E::SetInOut) => Some(S::VideoNoHdcp),
        (S::VideoNoHdcp, E::OutDisable) => Some(S::SinkConnected),
        (S::VideoNoHdcp, E::HdcpRun) => Some(S::HdcpWaitRx),

        // HDCP handshake
        (S::HdcpWaitRx, E::HdcpBksvNonRepeater) => Some(S::HdcpAuthenticated),
        (S::HdcpWaitRx, E::HdcpBksvRepeater) => Some(S::HdcpWaitBstatus),
        (S::HdcpWaitRx, E::HdcpBksvInsecure) => Some(S::HdcpWaitRx),
        (S::HdcpWaitBstatus, E::HdcpBstatusGood) => Some(S::HdcpWaitSha1),
        (S::HdcpWaitSha1, E::HdcpKsvSecure) => Some(S::HdcpAuthenticated),
        (
            S::HdcpWaitRx | S::HdcpWaitBstatus | S::HdcpWaitSha1 | S::HdcpAuthenticated,
            E::HdcpTimeout0,
        ) => Some(S::HdcpWaitRx),
        (
            S::HdcpWaitRx | S::HdcpWaitBstatus | S::HdcpWaitSha1 | S::HdcpAuthenticated,
            E::HdcpStop,
        ) => Some(S::VideoNoHdcp),

        // Receiver sense lost: drop back to discovery, discarding any
        // authentication progress
        (
            S::SinkConnected
            | S::VideoNoHdcp
            | S::HdcpWaitRx
            | S::HdcpWaitBstatus
            | S::HdcpWaitSha1
            | S::HdcpAuthenticated,
            E::SinkOff,
        ) => Some(S::AwaitRxSense),

        _ => None,
    };

    match next {
        Some(to) => Transition {
            from,
            event,
            to,
            accepted: true,
        },
        None => Transition {
            from,
            event,
            to: from,
            accepted: false,
        },
    }
}

// ============================================================================
// DEVICE CONTEXT
// ============================================================================

/// Per-device link state, owned by the driver instance.
///
/// All mutation goes through [`DeviceContext::apply`]; callers poll
/// [`state`](DeviceContext::state) afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceContext {
    state: LinkState,
    ignored_events: u32,
}

impl DeviceContext {
    /// Fresh context: `Uninitialized`, no ignored events
    pub const fn new() -> Self {
        Self {
            state: LinkState::Uninitialized,
            ignored_events: 0,
        }
    }

    pub const fn state(&self) -> LinkState {
        self.state
    }

    /// Events absorbed because they had no entry for the state they hit.
    ///
    /// Monotonic; saturates instead of wrapping.
    pub const fn ignored_events(&self) -> u32 {
        self.ignored_events
    }

    /// Feed one event to the machine.
    ///
    /// Returns the looked-up transition so the owner can log or react to it.
    pub fn apply(&mut self, event: LinkEvent) -> Transition {
        let t = transition(self.state, event);
        if t.accepted {
            self.state = t.to;
        } else {
            self.ignored_events = self.ignored_events.saturating_add(1);
        }
        t
    }

    /// Back to the freshly created value
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for DeviceContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Free-function form of [`DeviceContext::apply`]
pub fn apply(ctx: &mut DeviceContext, event: LinkEvent) {
    ctx.apply(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_in(state: LinkState) -> DeviceContext {
        DeviceContext {
            state,
            ignored_events: 0,
        }
    }

    /// Number of defined transitions per state, counted from the table
    /// documentation row by row.
    fn expected_row_len(state: LinkState) -> usize {
        match state {
            LinkState::Uninitialized => 2,
            LinkState::Disconnected => 3,
            LinkState::AwaitEdid | LinkState::AwaitRxSense => 4,
            LinkState::SinkConnected => 5,
            LinkState::VideoNoHdcp => 6,
            LinkState::HdcpWaitRx => 9,
            LinkState::HdcpWaitBstatus | LinkState::HdcpWaitSha1 => 7,
            LinkState::HdcpAuthenticated => 6,
            LinkState::Standby => 4,
        }
    }

    #[test]
    fn test_new_context() {
        let ctx = DeviceContext::new();
        assert_eq!(ctx.state(), LinkState::Uninitialized);
        assert_eq!(ctx.ignored_events(), 0);
        assert_eq!(ctx, DeviceContext::default());
    }

    #[test]
    fn test_totality_and_row_sizes() {
        for state in LinkState::ALL {
            let mut accepted = 0;
            for event in LinkEvent::ALL {
                let t = transition(state, event);
                assert_eq!(t.from, state);
                assert_eq!(t.event, event);
                if t.accepted {
                    accepted += 1;
                } else {
                    assert_eq!(t.to, state);
                }
            }
            assert_eq!(accepted, expected_row_len(state), "row {}", state);
        }
    }

    #[test]
    fn test_ignored_event_increments_by_one() {
        for state in LinkState::ALL {
            for event in LinkEvent::ALL {
                let mut ctx = ctx_in(state);
                let t = ctx.apply(event);
                if t.accepted {
                    assert_eq!(ctx.ignored_events(), 0);
                    assert_eq!(ctx.state(), t.to);
                } else {
                    assert_eq!(ctx.ignored_events(), 1);
                    assert_eq!(ctx.state(), state);
                }
            }
        }
    }

    #[test]
    fn test_ignored_counter_saturates() {
        let mut ctx = DeviceContext {
            state: LinkState::Standby,
            ignored_events: u32::MAX,
        };
        ctx.apply(LinkEvent::HdcpRun);
        assert_eq!(ctx.ignored_events(), u32::MAX);
        assert_eq!(ctx.state(), LinkState::Standby);
    }

    #[test]
    fn test_deinit_resets_every_initialized_state() {
        for state in LinkState::ALL {
            let t = transition(state, LinkEvent::Deinit);
            if state == LinkState::Uninitialized {
                assert!(!t.accepted);
            } else {
                assert!(t.accepted, "Deinit from {}", state);
                assert_eq!(t.to, LinkState::Uninitialized);
            }
        }
    }

    #[test]
    fn test_unplug_and_standby_from_active_states() {
        for state in LinkState::ALL.into_iter().filter(|s| s.is_active()) {
            let standby = transition(state, LinkEvent::Standby);
            assert!(standby.accepted, "Standby from {}", state);
            assert_eq!(standby.to, LinkState::Standby);

            let unplug = transition(state, LinkEvent::Unplugged);
            if state == LinkState::Disconnected {
                // Already unplugged
                assert!(!unplug.accepted);
            } else {
                assert!(unplug.accepted, "Unplugged from {}", state);
                assert_eq!(unplug.to, LinkState::Disconnected);
            }
        }
    }

    #[test]
    fn test_uninitialized_only_leaves_on_plug_events() {
        assert_eq!(
            transition(LinkState::Uninitialized, LinkEvent::Unplugged).to,
            LinkState::Disconnected
        );
        assert_eq!(
            transition(LinkState::Uninitialized, LinkEvent::PluggedIn).to,
            LinkState::AwaitEdid
        );
        assert!(!transition(LinkState::Uninitialized, LinkEvent::Standby).accepted);
        assert!(!transition(LinkState::Uninitialized, LinkEvent::ResumeToPluggedIn).accepted);
    }

    #[test]
    fn test_standby_amnesia() {
        for event in LinkEvent::ALL {
            let t = transition(LinkState::Standby, event);
            let expected = match event {
                LinkEvent::Deinit => Some(LinkState::Uninitialized),
                LinkEvent::ResumeToUnplugged => Some(LinkState::Disconnected),
                LinkEvent::ResumeToPluggedIn => Some(LinkState::AwaitRxSense),
                LinkEvent::ResumeToAwaitEdid => Some(LinkState::AwaitEdid),
                _ => None,
            };
            match expected {
                Some(to) => {
                    assert!(t.accepted);
                    assert_eq!(t.to, to);
                }
                None => assert!(!t.accepted, "{} in Standby", event),
            }
        }
    }

    #[test]
    fn test_resume_events_only_valid_in_standby() {
        for state in LinkState::ALL {
            if state == LinkState::Standby {
                continue;
            }
            for event in LinkEvent::ALL.into_iter().filter(|e| e.is_resume()) {
                assert!(!transition(state, event).accepted);
            }
        }
    }

    #[test]
    fn test_hdcp_retry_self_loop() {
        let mut ctx = ctx_in(LinkState::HdcpWaitRx);
        for i in 0..16 {
            let event = if i % 2 == 0 {
                LinkEvent::HdcpBksvInsecure
            } else {
                LinkEvent::HdcpTimeout0
            };
            let t = ctx.apply(event);
            assert!(t.accepted);
            assert!(!t.is_state_change());
            assert_eq!(ctx.state(), LinkState::HdcpWaitRx);
        }
        assert_eq!(ctx.ignored_events(), 0);
    }

    #[test]
    fn test_timeout_restarts_handshake() {
        for state in [
            LinkState::HdcpWaitBstatus,
            LinkState::HdcpWaitSha1,
            LinkState::HdcpAuthenticated,
        ] {
            assert_eq!(
                transition(state, LinkEvent::HdcpTimeout0).to,
                LinkState::HdcpWaitRx
            );
            assert_eq!(transition(state, LinkEvent::HdcpStop).to, LinkState::VideoNoHdcp);
        }
        assert!(!transition(LinkState::HdcpWaitBstatus, LinkEvent::HdcpBksvInsecure).accepted);
    }

    #[test]
    fn test_plug_to_authenticated() {
        let mut ctx = DeviceContext::new();
        let steps = [
            (LinkEvent::PluggedIn, LinkState::AwaitEdid),
            (LinkEvent::GetBlockData, LinkState::AwaitRxSense),
            (LinkEvent::SinkOn, LinkState::SinkConnected),
            (LinkEvent::SetInOut, LinkState::VideoNoHdcp),
            (LinkEvent::HdcpRun, LinkState::HdcpWaitRx),
            (LinkEvent::HdcpBksvNonRepeater, LinkState::HdcpAuthenticated),
        ];
        for (event, expected) in steps {
            ctx.apply(event);
            assert_eq!(ctx.state(), expected);
            assert_eq!(ctx.ignored_events(), 0);
        }
    }

    #[test]
    fn test_sink_off_discards_authentication() {
        let mut ctx = ctx_in(LinkState::HdcpAuthenticated);
        apply(&mut ctx, LinkEvent::SinkOff);
        assert_eq!(ctx.state(), LinkState::AwaitRxSense);
        assert_eq!(ctx.ignored_events(), 0);
    }

    #[test]
    fn test_sink_on_while_awaiting_edid_is_ignored() {
        let mut ctx = ctx_in(LinkState::AwaitEdid);
        let t = ctx.apply(LinkEvent::SinkOn);
        assert!(!t.accepted);
        assert_eq!(ctx.state(), LinkState::AwaitEdid);
        assert_eq!(ctx.ignored_events(), 1);
    }

    #[test]
    fn test_repeater_authentication() {
        let mut ctx = ctx_in(LinkState::HdcpWaitBstatus);
        ctx.apply(LinkEvent::HdcpBstatusGood);
        assert_eq!(ctx.state(), LinkState::HdcpWaitSha1);
        ctx.apply(LinkEvent::HdcpKsvSecure);
        assert_eq!(ctx.state(), LinkState::HdcpAuthenticated);
    }

    #[test]
    fn test_out_of_order_bstatus_is_ignored() {
        // BSTATUS before the repeater BKSV is counted, not acted on
        let mut ctx = ctx_in(LinkState::HdcpWaitRx);
        ctx.apply(LinkEvent::HdcpBstatusGood);
        assert_eq!(ctx.state(), LinkState::HdcpWaitRx);
        assert_eq!(ctx.ignored_events(), 1);
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut a = DeviceContext::new();
        let mut b = DeviceContext::new();
        a.apply(LinkEvent::PluggedIn);
        b.apply(LinkEvent::SinkOn);
        assert_eq!(a.state(), LinkState::AwaitEdid);
        assert_eq!(a.ignored_events(), 0);
        assert_eq!(b.state(), LinkState::Uninitialized);
        assert_eq!(b.ignored_events(), 1);

        a.reset();
        assert_eq!(a, DeviceContext::new());
    }
}
