use core::fmt;

/// Logical direction of a frame. Each role is shown on its own row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// Client to server.
    Request,
    /// Server to client.
    Response,
}

impl Role {
    pub const fn row(self) -> &'static str {
        match self {
            Self::Request => "client->server",
            Self::Response => "server->client",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    ServerId,
    Function,
    Address,
    Data,
    Length,
    Crc,
    Error,
    /// Whole-frame marker, only produced when enabled in the config.
    ErrorIndication,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServerId => "server-id",
            Self::Function => "function",
            Self::Address => "address",
            Self::Data => "data",
            Self::Length => "length",
            Self::Crc => "crc",
            Self::Error => "error",
            Self::ErrorIndication => "error-indication",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded span of the byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    pub role: Role,
    pub category: Category,
    pub start: u64,
    pub end: u64,
    pub text: String,
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}] {} {}: {}",
            self.start,
            self.end,
            self.role.row(),
            self.category,
            self.text
        )
    }
}
