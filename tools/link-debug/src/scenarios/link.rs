//! Link discovery and power scenarios

use hdmi_tx_link::{LinkEvent, LinkState};
use once_cell::sync::Lazy;

use super::hdcp::video_up;
use super::scenario::{step, Scenario};
use crate::supervisor::Stimulus;

/// Receiver sense reported before the EDID was read
pub static EARLY_SINK_ON: Lazy<Scenario> = Lazy::new(|| Scenario {
    id: "early-sink-on".to_string(),
    name: "Receiver sense before EDID".to_string(),
    description: "SinkOn while awaiting EDID is absorbed and counted".to_string(),
    steps: vec![
        step(LinkEvent::PluggedIn, LinkState::AwaitEdid),
        step(LinkEvent::SinkOn, LinkState::AwaitEdid),
    ],
    expect_ignored: 1,
});

/// HDCP noise on a disconnected link, then teardown
pub static STRAY_TIMEOUT: Lazy<Scenario> = Lazy::new(|| Scenario {
    id: "stray-timeout".to_string(),
    name: "Stray HDCP timeout".to_string(),
    description: "A late T0 expiry after unplug is a counted no-op".to_string(),
    steps: vec![
        step(LinkEvent::Unplugged, LinkState::Disconnected),
        step(LinkEvent::HdcpTimeout0, LinkState::Disconnected),
        step(LinkEvent::Deinit, LinkState::Uninitialized),
    ],
    expect_ignored: 1,
});

/// Standby mid-handshake, resumed at the remembered depth
pub static STANDBY_RESUME: Lazy<Scenario> = Lazy::new(|| {
    let mut steps = video_up();
    steps.extend([
        step(LinkEvent::HdcpRun, LinkState::HdcpWaitRx),
        step(LinkEvent::Standby, LinkState::Standby),
        // Nothing but a resume or deinit leaves standby
        step(LinkEvent::HdcpBksvNonRepeater, LinkState::Standby),
        (Stimulus::Resume, LinkState::AwaitRxSense),
        step(LinkEvent::SinkOn, LinkState::SinkConnected),
    ]);
    Scenario {
        id: "standby-resume".to_string(),
        name: "Standby round trip".to_string(),
        description: "Standby forgets HDCP progress but resumes with the sink still attached"
            .to_string(),
        steps,
        expect_ignored: 1,
    }
});
