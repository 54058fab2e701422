//! HDCP handshake scenarios

use hdmi_tx_link::{LinkEvent, LinkState};
use once_cell::sync::Lazy;

use super::scenario::{step, Scenario};
use crate::supervisor::Stimulus;

/// Plug in, read EDID, enable video: the common prefix of every HDCP run
pub(super) fn video_up() -> Vec<(Stimulus, LinkState)> {
    vec![
        step(LinkEvent::PluggedIn, LinkState::AwaitEdid),
        step(LinkEvent::GetBlockData, LinkState::AwaitRxSense),
        step(LinkEvent::SinkOn, LinkState::SinkConnected),
        step(LinkEvent::SetInOut, LinkState::VideoNoHdcp),
    ]
}

/// Non-repeater sink authenticated on the first attempt
pub static PLAIN_AUTH: Lazy<Scenario> = Lazy::new(|| {
    let mut steps = video_up();
    steps.extend([
        step(LinkEvent::HdcpRun, LinkState::HdcpWaitRx),
        step(LinkEvent::HdcpBksvNonRepeater, LinkState::HdcpAuthenticated),
    ]);
    Scenario {
        id: "plain-auth".to_string(),
        name: "Plain authentication".to_string(),
        description: "Plug, EDID, receiver sense, video, HDCP with a non-repeater sink".to_string(),
        steps,
        expect_ignored: 0,
    }
});

/// Receiver sense dropped on an authenticated link
pub static SINK_LOSS: Lazy<Scenario> = Lazy::new(|| {
    let mut steps = PLAIN_AUTH.steps.clone();
    steps.push(step(LinkEvent::SinkOff, LinkState::AwaitRxSense));
    Scenario {
        id: "sink-loss".to_string(),
        name: "Sink lost after authentication".to_string(),
        description: "Receiver sense drops; authentication is discarded without error".to_string(),
        steps,
        expect_ignored: 0,
    }
});

/// Repeater downstream: BSTATUS and KSV list check before authentication
pub static REPEATER_AUTH: Lazy<Scenario> = Lazy::new(|| {
    let mut steps = video_up();
    steps.extend([
        step(LinkEvent::HdcpRun, LinkState::HdcpWaitRx),
        step(LinkEvent::HdcpBksvRepeater, LinkState::HdcpWaitBstatus),
        step(LinkEvent::HdcpBstatusGood, LinkState::HdcpWaitSha1),
        step(LinkEvent::HdcpKsvSecure, LinkState::HdcpAuthenticated),
    ]);
    Scenario {
        id: "repeater-auth".to_string(),
        name: "Repeater authentication".to_string(),
        description: "HDCP through a repeater: BKSV, BSTATUS, then KSV list SHA-1".to_string(),
        steps,
        expect_ignored: 0,
    }
});

/// Insecure BKSVs and T0 timeouts before a good answer
pub static RETRY_STORM: Lazy<Scenario> = Lazy::new(|| {
    let mut steps = video_up();
    steps.push(step(LinkEvent::HdcpRun, LinkState::HdcpWaitRx));
    for _ in 0..3 {
        steps.push(step(LinkEvent::HdcpBksvInsecure, LinkState::HdcpWaitRx));
        steps.push(step(LinkEvent::HdcpTimeout0, LinkState::HdcpWaitRx));
    }
    steps.extend([
        step(LinkEvent::HdcpBksvRepeater, LinkState::HdcpWaitBstatus),
        // T0 expiry mid-handshake restarts from the BKSV wait
        step(LinkEvent::HdcpTimeout0, LinkState::HdcpWaitRx),
        step(LinkEvent::HdcpBksvNonRepeater, LinkState::HdcpAuthenticated),
    ]);
    Scenario {
        id: "retry-storm".to_string(),
        name: "HDCP retry storm".to_string(),
        description: "Repeated insecure BKSVs and T0 timeouts are retried, never counted".to_string(),
        steps,
        expect_ignored: 0,
    }
});
