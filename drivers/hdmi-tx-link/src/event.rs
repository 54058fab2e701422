//! Link events and the collaborators that raise them.

use core::fmt;
use core::str::FromStr;

use crate::state::UnknownName;

// ============================================================================
// LINK EVENT
// ============================================================================

/// Number of link events
pub const EVENT_COUNT: usize = 20;

/// Externally observed occurrence fed to the state machine.
///
/// Events carry no payload. Discriminants are the one-byte codes exchanged
/// with collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum LinkEvent {
    /// Hot plug detect deasserted
    Unplugged = 0,
    /// Hot plug detect asserted
    PluggedIn = 1,
    /// Driver instance torn down
    Deinit = 2,
    /// Sink capability data (EDID) read
    GetBlockData = 3,
    /// Receiver sense asserted
    SinkOn = 4,
    /// Receiver sense deasserted
    SinkOff = 5,
    /// Input/output video path configured
    SetInOut = 6,
    /// Video output disabled
    OutDisable = 7,
    /// HDCP authentication requested
    HdcpRun = 8,
    /// HDCP authentication stopped
    HdcpStop = 9,
    /// BKSV received from a non-repeater sink
    HdcpBksvNonRepeater = 10,
    /// BKSV received from a repeater
    HdcpBksvRepeater = 11,
    /// BKSV failed the validity check (revoked or malformed)
    HdcpBksvInsecure = 12,
    /// HDCP T0 timer expired
    HdcpTimeout0 = 13,
    /// Repeater BSTATUS read and acceptable
    HdcpBstatusGood = 14,
    /// KSV list SHA-1 verified
    HdcpKsvSecure = 15,
    /// Enter low-power mode
    Standby = 16,
    /// Leave standby with no sink attached
    ResumeToUnplugged = 17,
    /// Leave standby with a sink attached and EDID already known
    ResumeToPluggedIn = 18,
    /// Leave standby with a sink attached but EDID still to be read
    ResumeToAwaitEdid = 19,
}

/// Collaborator class that raises an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// Bus / interrupt layer (hot plug, receiver sense)
    Bus,
    /// EDID reader
    Edid,
    /// Video path configuration
    VideoPath,
    /// HDCP authentication engine and its timers
    Hdcp,
    /// Power management
    Power,
    /// Application / init API
    Application,
}

impl LinkEvent {
    /// Every event, in code order
    pub const ALL: [LinkEvent; EVENT_COUNT] = [
        LinkEvent::Unplugged,
        LinkEvent::PluggedIn,
        LinkEvent::Deinit,
        LinkEvent::GetBlockData,
        LinkEvent::SinkOn,
        LinkEvent::SinkOff,
        LinkEvent::SetInOut,
        LinkEvent::OutDisable,
        LinkEvent::HdcpRun,
        LinkEvent::HdcpStop,
        LinkEvent::HdcpBksvNonRepeater,
        LinkEvent::HdcpBksvRepeater,
        LinkEvent::HdcpBksvInsecure,
        LinkEvent::HdcpTimeout0,
        LinkEvent::HdcpBstatusGood,
        LinkEvent::HdcpKsvSecure,
        LinkEvent::Standby,
        LinkEvent::ResumeToUnplugged,
        LinkEvent::ResumeToPluggedIn,
        LinkEvent::ResumeToAwaitEdid,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Identifier name, as accepted by `FromStr`
    pub const fn name(self) -> &'static str {
        match self {
            LinkEvent::Unplugged => "Unplugged",
            LinkEvent::PluggedIn => "PluggedIn",
            LinkEvent::Deinit => "Deinit",
            LinkEvent::GetBlockData => "GetBlockData",
            LinkEvent::SinkOn => "SinkOn",
            LinkEvent::SinkOff => "SinkOff",
            LinkEvent::SetInOut => "SetInOut",
            LinkEvent::OutDisable => "OutDisable",
            LinkEvent::HdcpRun => "HdcpRun",
            LinkEvent::HdcpStop => "HdcpStop",
            LinkEvent::HdcpBksvNonRepeater => "HdcpBksvNonRepeater",
            LinkEvent::HdcpBksvRepeater => "HdcpBksvRepeater",
            LinkEvent::HdcpBksvInsecure => "HdcpBksvInsecure",
            LinkEvent::HdcpTimeout0 => "HdcpTimeout0",
            LinkEvent::HdcpBstatusGood => "HdcpBstatusGood",
            LinkEvent::HdcpKsvSecure => "HdcpKsvSecure",
            LinkEvent::Standby => "Standby",
            LinkEvent::ResumeToUnplugged => "ResumeToUnplugged",
            LinkEvent::ResumeToPluggedIn => "ResumeToPluggedIn",
            LinkEvent::ResumeToAwaitEdid => "ResumeToAwaitEdid",
        }
    }

    /// Collaborator class that raises this event
    pub const fn source(self) -> EventSource {
        match self {
            LinkEvent::Unplugged | LinkEvent::PluggedIn | LinkEvent::SinkOn | LinkEvent::SinkOff => {
                EventSource::Bus
            }
            LinkEvent::GetBlockData => EventSource::Edid,
            LinkEvent::SetInOut | LinkEvent::OutDisable => EventSource::VideoPath,
            LinkEvent::HdcpRun
            | LinkEvent::HdcpStop
            | LinkEvent::HdcpBksvNonRepeater
            | LinkEvent::HdcpBksvRepeater
            | LinkEvent::HdcpBksvInsecure
            | LinkEvent::HdcpTimeout0
            | LinkEvent::HdcpBstatusGood
            | LinkEvent::HdcpKsvSecure => EventSource::Hdcp,
            LinkEvent::Standby
            | LinkEvent::ResumeToUnplugged
            | LinkEvent::ResumeToPluggedIn
            | LinkEvent::ResumeToAwaitEdid => EventSource::Power,
            LinkEvent::Deinit => EventSource::Application,
        }
    }

    /// Events the surrounding driver relies on to force a reset or standby.
    pub const fn is_escape(self) -> bool {
        matches!(self, LinkEvent::Unplugged | LinkEvent::Deinit | LinkEvent::Standby)
    }

    pub const fn is_resume(self) -> bool {
        matches!(
            self,
            LinkEvent::ResumeToUnplugged | LinkEvent::ResumeToPluggedIn | LinkEvent::ResumeToAwaitEdid
        )
    }
}

impl fmt::Display for LinkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected one-byte event code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidEventCode(pub u8);

impl fmt::Display for InvalidEventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid link event code {:#04x}", self.0)
    }
}

impl TryFrom<u8> for LinkEvent {
    type Error = InvalidEventCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        LinkEvent::ALL
            .get(code as usize)
            .copied()
            .ok_or(InvalidEventCode(code))
    }
}

impl FromStr for LinkEvent {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LinkEvent::ALL
            .iter()
            .copied()
            .find(|event| event.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownName)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_table() {
        for (i, event) in LinkEvent::ALL.iter().enumerate() {
            assert_eq!(event.code() as usize, i);
            assert_eq!(LinkEvent::try_from(event.code()), Ok(*event));
        }
        assert_eq!(LinkEvent::try_from(20), Err(InvalidEventCode(20)));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("HdcpTimeout0".parse(), Ok(LinkEvent::HdcpTimeout0));
        assert_eq!("resumetoawaitedid".parse(), Ok(LinkEvent::ResumeToAwaitEdid));
        assert_eq!("Timeout".parse::<LinkEvent>(), Err(UnknownName));
    }

    #[test]
    fn test_sources() {
        assert_eq!(LinkEvent::SinkOff.source(), EventSource::Bus);
        assert_eq!(LinkEvent::GetBlockData.source(), EventSource::Edid);
        assert_eq!(LinkEvent::OutDisable.source(), EventSource::VideoPath);
        assert_eq!(LinkEvent::HdcpTimeout0.source(), EventSource::Hdcp);
        assert_eq!(LinkEvent::ResumeToPluggedIn.source(), EventSource::Power);
        assert_eq!(LinkEvent::Deinit.source(), EventSource::Application);
    }

    #[test]
    fn test_escape_and_resume_sets() {
        let escapes = LinkEvent::ALL.iter().filter(|e| e.is_escape()).count();
        let resumes = LinkEvent::ALL.iter().filter(|e| e.is_resume()).count();
        assert_eq!(escapes, 3);
        assert_eq!(resumes, 3);
        assert!(!LinkEvent::Standby.is_resume());
    }
}
