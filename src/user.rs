//! The per-user side of channel status tracking.
//!
//! Channels own their status sets (who holds `o` in `#chat`); user objects own
//! their own view (which statuses `alice` holds in each channel). The decoder
//! updates both sides in one step through [`UserDirectory`], so neither side
//! ever walks the other's state.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::context::{CanSend, ConnectionId, HasIdentity};

/// Non-owning reference to a user, keyed by nickname.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserRef(String);

impl UserRef {
    pub fn new(nick: impl Into<String>) -> Self {
        UserRef(nick.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserRef {
    fn from(nick: &str) -> Self {
        UserRef(nick.to_string())
    }
}

impl Borrow<str> for UserRef {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user as seen from one connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    nick: UserRef,
    owner: ConnectionId,
}

impl User {
    pub fn new(nick: impl Into<String>, owner: ConnectionId) -> Self {
        User {
            nick: UserRef::new(nick),
            owner,
        }
    }

    pub fn user_ref(&self) -> &UserRef {
        &self.nick
    }
}

impl HasIdentity for User {
    fn name(&self) -> &str {
        self.nick.as_str()
    }

    fn owner(&self) -> ConnectionId {
        self.owner
    }
}

impl CanSend for User {}

/// The user-object collaborator consulted while decoding status modes.
pub trait UserDirectory {
    /// Map a nickname from a MODE line to a user reference. `None` means the
    /// user is unknown, which the decoder reports as a desync.
    fn resolve(&mut self, nick: &str) -> Option<UserRef>;

    /// Record that `user` now holds status `mode` in `channel`.
    fn add_status(&mut self, user: &UserRef, channel: &str, mode: char);

    /// Record that `user` no longer holds status `mode` in `channel`.
    fn remove_status(&mut self, user: &UserRef, channel: &str, mode: char);
}

/// In-memory [`UserDirectory`] that accepts every nickname.
#[derive(Clone, Debug, Default)]
pub struct UserStatusMap {
    users: HashMap<UserRef, BTreeMap<String, BTreeSet<char>>>,
}

impl UserStatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status letters `nick` holds in `channel`.
    pub fn statuses(&self, nick: &str, channel: &str) -> Option<&BTreeSet<char>> {
        self.users.get(nick)?.get(channel)
    }

    pub fn has_status(&self, nick: &str, channel: &str, mode: char) -> bool {
        self.statuses(nick, channel)
            .is_some_and(|modes| modes.contains(&mode))
    }

    /// Channels in which `nick` holds at least one status.
    pub fn channels_of<'a>(&'a self, nick: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.users
            .get(nick)
            .into_iter()
            .flat_map(|channels| channels.keys().map(String::as_str))
    }

    /// Whether `nick` holds a status in any channel.
    pub fn contains(&self, nick: &str) -> bool {
        self.users.contains_key(nick)
    }
}

impl UserDirectory for UserStatusMap {
    fn resolve(&mut self, nick: &str) -> Option<UserRef> {
        Some(UserRef::from(nick))
    }

    fn add_status(&mut self, user: &UserRef, channel: &str, mode: char) {
        self.users
            .entry(user.clone())
            .or_default()
            .entry(channel.to_string())
            .or_default()
            .insert(mode);
    }

    fn remove_status(&mut self, user: &UserRef, channel: &str, mode: char) {
        let Some(channels) = self.users.get_mut(user) else {
            return;
        };
        if let Some(modes) = channels.get_mut(channel) {
            modes.remove(&mode);
            if modes.is_empty() {
                channels.remove(channel);
            }
        }
        if channels.is_empty() {
            self.users.remove(user);
        }
    }
}
