//! Per-connection channel registry.
//!
//! The registry is the only place channels are created. It keys channels by
//! canonical name (STATUSMSG symbols stripped), remembers which connection
//! owns each one, and routes inbound MODE-related lines to the right channel.

use std::collections::hash_map::{Entry, HashMap};

use chrono::{TimeZone, Utc};
use tracing::{debug, trace, warn};

use crate::capability::CapabilityTable;
use crate::channel::Channel;
use crate::context::{ConnectionId, HasIdentity};
use crate::error::{ChanStateError, Result};
use crate::message::MessageRef;
use crate::user::UserDirectory;

/// Channels known to one connection, plus the capability table used to
/// decode their modes.
#[derive(Clone, Debug, Default)]
pub struct ChannelRegistry {
    caps: CapabilityTable,
    channels: HashMap<String, Channel>,
}

impl ChannelRegistry {
    pub fn new(caps: CapabilityTable) -> Self {
        ChannelRegistry {
            caps,
            channels: HashMap::new(),
        }
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.caps
    }

    /// Replace the capability table, e.g. after a late RPL_ISUPPORT.
    /// Existing channel state is kept as is.
    pub fn set_capabilities(&mut self, caps: CapabilityTable) {
        self.caps = caps;
    }

    /// Look up a channel by name. `@#chat` finds `#chat`.
    pub fn get(&self, name: &str) -> Result<&Channel> {
        let name = self.caps.canonical_name(name);
        self.channels
            .get(name)
            .ok_or_else(|| ChanStateError::NotFound(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Channel> {
        let name = self.caps.canonical_name(name);
        self.channels
            .get_mut(name)
            .ok_or_else(|| ChanStateError::NotFound(name.to_string()))
    }

    /// Get or create the channel for `owner`.
    ///
    /// Adding a channel the same connection already has returns the existing
    /// object.
    ///
    /// # Errors
    ///
    /// [`ChanStateError::OwnershipConflict`] if another connection owns it.
    pub fn add(&mut self, name: &str, owner: ConnectionId) -> Result<&mut Channel> {
        let name = self.caps.canonical_name(name);
        match self.channels.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let existing = entry.get().owner();
                if existing != owner {
                    warn!(channel = name, %owner, %existing, "channel owned by another connection");
                    return Err(ChanStateError::OwnershipConflict {
                        channel: name.to_string(),
                    });
                }
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                debug!(channel = name, %owner, "tracking new channel");
                Ok(entry.insert(Channel::new(name, owner)))
            }
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.channels.contains_key(self.caps.canonical_name(name))
    }

    /// Stop tracking a channel. Status letters its members held are not
    /// revoked; call [`Channel::clear`] first for that.
    pub fn remove(&mut self, name: &str) -> Option<Channel> {
        let name = self.caps.canonical_name(name);
        let removed = self.channels.remove(name);
        if removed.is_some() {
            debug!(channel = name, "stopped tracking channel");
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Mutable access to a channel on behalf of `owner`. This is the only
    /// way to mutate a channel that already exists.
    ///
    /// # Errors
    ///
    /// [`ChanStateError::NotFound`] if the channel is unknown and
    /// [`ChanStateError::OwnershipConflict`] if `owner` does not own it.
    pub fn channel_for(&mut self, owner: ConnectionId, name: &str) -> Result<&mut Channel> {
        let channel = self.get_mut(name)?;
        if channel.owner() != owner {
            return Err(ChanStateError::OwnershipConflict {
                channel: channel.name().to_string(),
            });
        }
        Ok(channel)
    }

    /// Feed one inbound line to the registry.
    ///
    /// Handles `MODE <channel> ...`, `324` (RPL_CHANNELMODEIS) and `329`
    /// (RPL_CREATIONTIME) for channels this registry tracks. Returns
    /// `Ok(false)` for anything else, including user mode changes and
    /// channels that were never added.
    ///
    /// # Errors
    ///
    /// [`ChanStateError::ProtocolDesync`] if the mode string cannot be
    /// decoded, and [`ChanStateError::OwnershipConflict`] if the channel
    /// belongs to another connection.
    pub fn handle_message<U>(
        &mut self,
        owner: ConnectionId,
        msg: &MessageRef<'_>,
        users: &mut U,
    ) -> Result<bool>
    where
        U: UserDirectory + ?Sized,
    {
        let sender = msg.prefix.unwrap_or("");

        let (name, modes, targets) = if msg.is_command("MODE") {
            match (msg.arg(0), msg.arg(1)) {
                (Some(name), Some(modes)) => (name, modes, msg.params.get(2..).unwrap_or(&[])),
                _ => return Ok(false),
            }
        } else if msg.command == "324" {
            match (msg.arg(1), msg.arg(2)) {
                (Some(name), Some(modes)) => (name, modes, msg.params.get(3..).unwrap_or(&[])),
                _ => return Ok(false),
            }
        } else if msg.command == "329" {
            return self.handle_creation_time(owner, msg);
        } else {
            return Ok(false);
        };

        let caps = &self.caps;
        let Some(channel) = self.channels.get_mut(caps.canonical_name(name)) else {
            trace!(channel = name, command = msg.command, "mode line for untracked target");
            return Ok(false);
        };
        if channel.owner() != owner {
            return Err(ChanStateError::OwnershipConflict {
                channel: channel.name().to_string(),
            });
        }

        channel.apply_modes(caps, users, sender, modes, targets)?;
        Ok(true)
    }

    /// Parse `line` and pass it to [`handle_message`](Self::handle_message).
    pub fn handle_line<U>(&mut self, owner: ConnectionId, line: &str, users: &mut U) -> Result<bool>
    where
        U: UserDirectory + ?Sized,
    {
        let msg = MessageRef::parse(line).map_err(|cause| ChanStateError::InvalidMessage {
            string: line.to_string(),
            cause,
        })?;
        self.handle_message(owner, &msg, users)
    }

    fn handle_creation_time(&mut self, owner: ConnectionId, msg: &MessageRef<'_>) -> Result<bool> {
        let (Some(name), Some(stamp)) = (msg.arg(1), msg.arg(2)) else {
            return Ok(false);
        };
        let Some(created) = stamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        else {
            debug!(channel = name, stamp, "unparseable channel creation time");
            return Ok(false);
        };

        match self.channel_for(owner, name) {
            Ok(channel) => {
                channel.set_server_timestamp(created);
                Ok(true)
            }
            Err(ChanStateError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
