//! Link states and their classification.
//!
//! States are grouped into phases that downstream consumers care about:
//!
//! | Phase          | States                                                  |
//! |----------------|---------------------------------------------------------|
//! | Inactive       | Uninitialized                                           |
//! | Discovery      | Disconnected, AwaitEdid, AwaitRxSense                   |
//! | VideoPath      | SinkConnected, VideoNoHdcp                              |
//! | Authentication | HdcpWaitRx, HdcpWaitBstatus, HdcpWaitSha1, HdcpAuthenticated |
//! | Quiescent      | Standby                                                 |

use core::fmt;
use core::str::FromStr;

// ============================================================================
// LINK STATE
// ============================================================================

/// Number of link states
pub const STATE_COUNT: usize = 11;

/// Link/authentication lifecycle state.
///
/// Discriminants are the one-byte codes exchanged with collaborators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum LinkState {
    /// Driver instance not initialized
    #[default]
    Uninitialized = 0,
    /// No sink attached
    Disconnected = 1,
    /// Hot plug detected, sink capability data not read yet
    AwaitEdid = 2,
    /// EDID read, waiting for receiver sense
    AwaitRxSense = 3,
    /// Receiver sense asserted, output disabled
    SinkConnected = 4,
    /// Video running without content protection
    VideoNoHdcp = 5,
    /// HDCP started, waiting for the receiver's BKSV
    HdcpWaitRx = 6,
    /// Repeater downstream, waiting for BSTATUS
    HdcpWaitBstatus = 7,
    /// Waiting for the KSV list SHA-1 check
    HdcpWaitSha1 = 8,
    /// Link authenticated
    HdcpAuthenticated = 9,
    /// Low power; coarse connection depth is remembered outside the machine
    Standby = 10,
}

/// Coarse grouping of link states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkPhase {
    Inactive,
    Discovery,
    VideoPath,
    Authentication,
    Quiescent,
}

impl LinkState {
    /// Every state, in code order
    pub const ALL: [LinkState; STATE_COUNT] = [
        LinkState::Uninitialized,
        LinkState::Disconnected,
        LinkState::AwaitEdid,
        LinkState::AwaitRxSense,
        LinkState::SinkConnected,
        LinkState::VideoNoHdcp,
        LinkState::HdcpWaitRx,
        LinkState::HdcpWaitBstatus,
        LinkState::HdcpWaitSha1,
        LinkState::HdcpAuthenticated,
        LinkState::Standby,
    ];

    /// One-byte code for this state
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Identifier name, as accepted by `FromStr`
    pub const fn name(self) -> &'static str {
        match self {
            LinkState::Uninitialized => "Uninitialized",
            LinkState::Disconnected => "Disconnected",
            LinkState::AwaitEdid => "AwaitEdid",
            LinkState::AwaitRxSense => "AwaitRxSense",
            LinkState::SinkConnected => "SinkConnected",
            LinkState::VideoNoHdcp => "VideoNoHdcp",
            LinkState::HdcpWaitRx => "HdcpWaitRx",
            LinkState::HdcpWaitBstatus => "HdcpWaitBstatus",
            LinkState::HdcpWaitSha1 => "HdcpWaitSha1",
            LinkState::HdcpAuthenticated => "HdcpAuthenticated",
            LinkState::Standby => "Standby",
        }
    }

    /// Phase this state belongs to
    pub const fn phase(self) -> LinkPhase {
        match self {
            LinkState::Uninitialized => LinkPhase::Inactive,
            LinkState::Disconnected | LinkState::AwaitEdid | LinkState::AwaitRxSense => {
                LinkPhase::Discovery
            }
            LinkState::SinkConnected | LinkState::VideoNoHdcp => LinkPhase::VideoPath,
            LinkState::HdcpWaitRx
            | LinkState::HdcpWaitBstatus
            | LinkState::HdcpWaitSha1
            | LinkState::HdcpAuthenticated => LinkPhase::Authentication,
            LinkState::Standby => LinkPhase::Quiescent,
        }
    }

    /// Active states accept the escape events (`Unplugged`, `Standby`).
    pub const fn is_active(self) -> bool {
        !matches!(self, LinkState::Uninitialized | LinkState::Standby)
    }

    /// Whether the video output is enabled in this state
    pub const fn video_enabled(self) -> bool {
        matches!(
            self,
            LinkState::VideoNoHdcp
                | LinkState::HdcpWaitRx
                | LinkState::HdcpWaitBstatus
                | LinkState::HdcpWaitSha1
                | LinkState::HdcpAuthenticated
        )
    }

    /// Whether an HDCP handshake is running but not finished
    pub const fn hdcp_in_progress(self) -> bool {
        matches!(
            self,
            LinkState::HdcpWaitRx | LinkState::HdcpWaitBstatus | LinkState::HdcpWaitSha1
        )
    }

    pub const fn is_authenticated(self) -> bool {
        matches!(self, LinkState::HdcpAuthenticated)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected one-byte state code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidStateCode(pub u8);

impl fmt::Display for InvalidStateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid link state code {:#04x}", self.0)
    }
}

impl TryFrom<u8> for LinkState {
    type Error = InvalidStateCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        LinkState::ALL
            .get(code as usize)
            .copied()
            .ok_or(InvalidStateCode(code))
    }
}

/// Unrecognized state or event name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownName;

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown name")
    }
}

impl FromStr for LinkState {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LinkState::ALL
            .iter()
            .copied()
            .find(|state| state.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownName)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_table_order() {
        for (i, state) in LinkState::ALL.iter().enumerate() {
            assert_eq!(state.code() as usize, i);
            assert_eq!(LinkState::try_from(i as u8), Ok(*state));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(LinkState::try_from(11), Err(InvalidStateCode(11)));
        assert_eq!(LinkState::try_from(0xFF), Err(InvalidStateCode(0xFF)));
    }

    #[test]
    fn test_default_is_uninitialized() {
        assert_eq!(LinkState::default(), LinkState::Uninitialized);
        assert_eq!(LinkState::default().code(), 0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("HdcpWaitSha1".parse(), Ok(LinkState::HdcpWaitSha1));
        assert_eq!(" standby ".parse(), Ok(LinkState::Standby));
        assert_eq!("AWAITEDID".parse(), Ok(LinkState::AwaitEdid));
        assert_eq!("Connected".parse::<LinkState>(), Err(UnknownName));
    }

    #[test]
    fn test_phases() {
        assert_eq!(LinkState::Uninitialized.phase(), LinkPhase::Inactive);
        assert_eq!(LinkState::AwaitRxSense.phase(), LinkPhase::Discovery);
        assert_eq!(LinkState::VideoNoHdcp.phase(), LinkPhase::VideoPath);
        assert_eq!(LinkState::HdcpAuthenticated.phase(), LinkPhase::Authentication);
        assert_eq!(LinkState::Standby.phase(), LinkPhase::Quiescent);
    }

    #[test]
    fn test_consumer_predicates() {
        assert!(!LinkState::SinkConnected.video_enabled());
        assert!(LinkState::VideoNoHdcp.video_enabled());
        assert!(LinkState::HdcpAuthenticated.video_enabled());

        assert!(LinkState::HdcpWaitBstatus.hdcp_in_progress());
        assert!(!LinkState::HdcpAuthenticated.hdcp_in_progress());
        assert!(LinkState::HdcpAuthenticated.is_authenticated());

        let active = LinkState::ALL.iter().filter(|s| s.is_active()).count();
        assert_eq!(active, STATE_COUNT - 2);
    }
}
