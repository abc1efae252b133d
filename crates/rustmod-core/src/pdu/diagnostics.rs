/// Sub-function codes carried by function 8 (Diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticSubfunction {
    ReturnQueryData,
    RestartCommunicationsOption,
    ReturnDiagnosticRegister,
    ChangeAsciiInputDelimiter,
    ForceListenOnlyMode,
    ClearCountersAndDiagnosticRegister,
    ReturnBusMessageCount,
    ReturnBusCommunicationErrorCount,
    ReturnBusExceptionErrorCount,
    ReturnServerMessageCount,
    ReturnServerNoResponseCount,
    ReturnServerNakCount,
    ReturnServerBusyCount,
    ReturnBusCharacterOverrunCount,
    ClearOverrunCounterAndFlag,
}

impl DiagnosticSubfunction {
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x00 => Some(Self::ReturnQueryData),
            0x01 => Some(Self::RestartCommunicationsOption),
            0x02 => Some(Self::ReturnDiagnosticRegister),
            0x03 => Some(Self::ChangeAsciiInputDelimiter),
            0x04 => Some(Self::ForceListenOnlyMode),
            0x0A => Some(Self::ClearCountersAndDiagnosticRegister),
            0x0B => Some(Self::ReturnBusMessageCount),
            0x0C => Some(Self::ReturnBusCommunicationErrorCount),
            0x0D => Some(Self::ReturnBusExceptionErrorCount),
            0x0E => Some(Self::ReturnServerMessageCount),
            0x0F => Some(Self::ReturnServerNoResponseCount),
            0x10 => Some(Self::ReturnServerNakCount),
            0x11 => Some(Self::ReturnServerBusyCount),
            0x12 => Some(Self::ReturnBusCharacterOverrunCount),
            0x14 => Some(Self::ClearOverrunCounterAndFlag),
            _ => None,
        }
    }

    pub const fn as_u16(self) -> u16 {
        match self {
            Self::ReturnQueryData => 0x00,
            Self::RestartCommunicationsOption => 0x01,
            Self::ReturnDiagnosticRegister => 0x02,
            Self::ChangeAsciiInputDelimiter => 0x03,
            Self::ForceListenOnlyMode => 0x04,
            Self::ClearCountersAndDiagnosticRegister => 0x0A,
            Self::ReturnBusMessageCount => 0x0B,
            Self::ReturnBusCommunicationErrorCount => 0x0C,
            Self::ReturnBusExceptionErrorCount => 0x0D,
            Self::ReturnServerMessageCount => 0x0E,
            Self::ReturnServerNoResponseCount => 0x0F,
            Self::ReturnServerNakCount => 0x10,
            Self::ReturnServerBusyCount => 0x11,
            Self::ReturnBusCharacterOverrunCount => 0x12,
            Self::ClearOverrunCounterAndFlag => 0x14,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::ReturnQueryData => "Return Query Data",
            Self::RestartCommunicationsOption => "Restart Communications Option",
            Self::ReturnDiagnosticRegister => "Return Diagnostic Register",
            Self::ChangeAsciiInputDelimiter => "Change ASCII Input Delimiter",
            Self::ForceListenOnlyMode => "Force Listen Only Mode",
            Self::ClearCountersAndDiagnosticRegister => "Clear Counters and Diagnostic Register",
            Self::ReturnBusMessageCount => "Return Bus Message Count",
            Self::ReturnBusCommunicationErrorCount => "Return Bus Communication Error Count",
            Self::ReturnBusExceptionErrorCount => "Return Bus Exception Error Count",
            Self::ReturnServerMessageCount => "Return Slave Message Count",
            Self::ReturnServerNoResponseCount => "Return Slave No Response Count",
            Self::ReturnServerNakCount => "Return Slave NAK Count",
            Self::ReturnServerBusyCount => "Return Slave Busy Count",
            Self::ReturnBusCharacterOverrunCount => "Return Bus Character Overrun Count",
            Self::ClearOverrunCounterAndFlag => "Clear Overrun Counter and Flag",
        }
    }
}
