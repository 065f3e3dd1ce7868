//! Outbound device commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use kiosk_core::constants::{
    CMD_ARM, CMD_DISARM, CMD_DOOR_CLOSE, CMD_DOOR_OPEN, CMD_HEARTBEAT, LINE_TERMINATOR,
};

/// A fire-and-forget command written to the microcontroller.
///
/// Commands are stateless and unacknowledged. `Disarm` and `LogoutSignal`
/// share the `l` byte on the wire: the firmware treats "session over" and
/// "stop accepting money" as the same instruction.
///
/// # Examples
///
/// ```
/// use kiosk_protocol::DeviceCommand;
///
/// assert_eq!(DeviceCommand::Arm.to_line(), *b"a\n");
/// assert_eq!(DeviceCommand::Heartbeat.as_byte(), b'h');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCommand {
    /// Arm the acceptor after a successful login.
    Arm,

    /// Disarm the acceptor (authentication failure, stray deposits).
    Disarm,

    /// Liveness signal; the acceptor refuses money when these stop.
    Heartbeat,

    /// Session finished.
    LogoutSignal,

    /// Open the money door (admin only, legacy firmware).
    OpenMoneyDoor,

    /// Close the money door (legacy firmware).
    CloseMoneyDoor,
}

impl DeviceCommand {
    /// Wire byte for this command.
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Arm => CMD_ARM,
            Self::Disarm | Self::LogoutSignal => CMD_DISARM,
            Self::Heartbeat => CMD_HEARTBEAT,
            Self::OpenMoneyDoor => CMD_DOOR_OPEN,
            Self::CloseMoneyDoor => CMD_DOOR_CLOSE,
        }
    }

    /// Full newline-terminated line for this command.
    pub fn to_line(&self) -> [u8; 2] {
        [self.as_byte(), LINE_TERMINATOR]
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Arm => "Arm",
            Self::Disarm => "Disarm",
            Self::Heartbeat => "Heartbeat",
            Self::LogoutSignal => "LogoutSignal",
            Self::OpenMoneyDoor => "OpenMoneyDoor",
            Self::CloseMoneyDoor => "CloseMoneyDoor",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DeviceCommand::Arm, b'a')]
    #[case(DeviceCommand::Disarm, b'l')]
    #[case(DeviceCommand::LogoutSignal, b'l')]
    #[case(DeviceCommand::Heartbeat, b'h')]
    #[case(DeviceCommand::OpenMoneyDoor, b'O')]
    #[case(DeviceCommand::CloseMoneyDoor, b'C')]
    fn test_command_bytes(#[case] command: DeviceCommand, #[case] expected: u8) {
        assert_eq!(command.as_byte(), expected);
        assert_eq!(command.to_line(), [expected, b'\n']);
    }

    #[test]
    fn test_command_display() {
        assert_eq!(DeviceCommand::LogoutSignal.to_string(), "LogoutSignal");
    }

    #[test]
    fn test_command_serialization() {
        let json = serde_json::to_string(&DeviceCommand::OpenMoneyDoor).unwrap();
        assert_eq!(json, r#""open_money_door""#);
    }
}
