//! Identity and messaging capabilities shared by channels and users.

use std::fmt;

use crate::command::Command;

/// Opaque handle identifying the connection that owns an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(id: u64) -> Self {
        ConnectionId(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Something addressable on a particular connection.
pub trait HasIdentity {
    /// The name used as a message target.
    fn name(&self) -> &str;

    /// The connection this entity belongs to.
    fn owner(&self) -> ConnectionId;
}

/// Something that can be messaged. The returned commands are sent by the caller.
pub trait CanSend: HasIdentity {
    fn privmsg(&self, text: &str) -> Command {
        Command::PRIVMSG(self.name().to_string(), text.to_string())
    }

    fn notice(&self, text: &str) -> Command {
        Command::NOTICE(self.name().to_string(), text.to_string())
    }
}
