//! # HDMI Transmitter Link/HDCP Lifecycle
//!
//! Event-driven state machine that tracks the connection state of a
//! downstream HDMI sink and, once video is running, the HDCP authentication
//! handshake nested inside it.
//!
//! The machine owns no hardware. Bus/interrupt handling, EDID reads, the
//! HDCP key exchange and power management live in collaborators that raise
//! [`LinkEvent`]s; video-path logic and the application read the resulting
//! [`LinkState`] after every step.
//!
//! ## Lifecycle
//!
//! ```text
//!                 PluggedIn          GetBlockData          SinkOn
//! Uninitialized ----------> AwaitEdid ----------> AwaitRxSense ------> SinkConnected
//!       |                       ^                      ^  SinkOff          |  ^
//!       | Unplugged             | PluggedIn            |                   |  | OutDisable
//!       v                       |                      |          SetInOut v  |
//! Disconnected -----------------+                      +----------- VideoNoHdcp
//!                                                                        |  ^
//!                                                                HdcpRun v  | HdcpStop
//!   HdcpWaitRx --BKSV repeater--> HdcpWaitBstatus --BSTATUS good--> HdcpWaitSha1
//!        |                                                               |
//!        +--BKSV non-repeater--> HdcpAuthenticated <--KSV list secure----+
//! ```
//!
//! `Deinit`, `Unplugged` and `Standby` are valid from every active state.
//! Leaving `Standby` takes one of three resume events; [`StandbyMemory`]
//! picks the right one for a power-management supervisor.
//!
//! ## Usage
//!
//! ```rust
//! use hdmi_tx_link::{DeviceContext, LinkEvent, LinkState};
//!
//! let mut ctx = DeviceContext::new();
//! ctx.apply(LinkEvent::PluggedIn);
//! ctx.apply(LinkEvent::GetBlockData);
//! ctx.apply(LinkEvent::SinkOn);
//! assert_eq!(ctx.state(), LinkState::SinkConnected);
//!
//! // Not valid while a sink is connected: absorbed and counted.
//! ctx.apply(LinkEvent::HdcpKsvSecure);
//! assert_eq!(ctx.state(), LinkState::SinkConnected);
//! assert_eq!(ctx.ignored_events(), 1);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod event;
pub mod machine;
pub mod standby;
pub mod state;

// Re-exports
pub use event::*;
pub use machine::*;
pub use standby::*;
pub use state::*;
