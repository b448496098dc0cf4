//! Client-side view of one IRC channel.
//!
//! A [`Channel`] tracks its lifecycle state, its members and its modes. It is
//! sans-IO: requests such as [`join`](Channel::join) or [`mode`](Channel::mode)
//! return the [`Command`]s to send, and local state only changes when the
//! server's answer is fed back in through
//! [`apply_modes`](Channel::apply_modes) or the `mark_*` confirmations.

mod decode;
mod encode;
mod lifecycle;

pub use self::encode::batch_mode_changes;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};

use crate::capability::CapabilityTable;
use crate::command::Command;
use crate::context::{CanSend, ConnectionId, HasIdentity};
use crate::user::{UserDirectory, UserRef};

/// Lifecycle of a channel object.
///
/// The numeric codes are stable and usable for logging or persistence by
/// callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ChannelState {
    #[default]
    NotJoined = 0,
    PendingJoin = 1,
    Joined = 2,
    PendingLeave = 3,
    Left = 4,
    /// Reserved; never entered by this crate.
    Inactive = 5,
    Quit = 6,
    Deleted = 7,
    Cleared = 8,
}

impl ChannelState {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => ChannelState::NotJoined,
            1 => ChannelState::PendingJoin,
            2 => ChannelState::Joined,
            3 => ChannelState::PendingLeave,
            4 => ChannelState::Left,
            5 => ChannelState::Inactive,
            6 => ChannelState::Quit,
            7 => ChannelState::Deleted,
            8 => ChannelState::Cleared,
            _ => return None,
        })
    }

    pub fn description(self) -> &'static str {
        match self {
            ChannelState::NotJoined => "not yet joined",
            ChannelState::PendingJoin => "pending join",
            ChannelState::Joined => "joined",
            ChannelState::PendingLeave => "pending leave",
            ChannelState::Left => "left channel",
            ChannelState::Inactive => "",
            ChannelState::Quit => "quit",
            ChannelState::Deleted => "deleted",
            ChannelState::Cleared => "cleared",
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// The value carried by a parameterized non-list mode.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeParam {
    Text(String),
    /// Set-only-parameter values made entirely of digits (`+l 50`).
    Number(u64),
}

impl fmt::Display for ModeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeParam::Text(text) => f.write_str(text),
            ModeParam::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Who set a list entry, and when.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListEntry {
    pub setter: String,
    pub set_at: DateTime<Utc>,
}

/// Current state of one mode letter on a channel.
///
/// Status sets and lists are never stored empty; the mode is absent instead.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeState {
    /// Members holding a status mode.
    Status(BTreeSet<UserRef>),
    /// Entries of a list mode keyed by mask.
    List(BTreeMap<String, ListEntry>),
    /// A set flag (`None`) or its parameter.
    Value(Option<ModeParam>),
}

/// One channel as tracked by one connection.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    name: String,
    owner: ConnectionId,
    state: ChannelState,
    members: BTreeSet<UserRef>,
    modes: BTreeMap<char, ModeState>,
    created_at: DateTime<Utc>,
    server_created: Option<DateTime<Utc>>,
}

impl Channel {
    /// A fresh channel in [`ChannelState::NotJoined`]. `name` should already be
    /// canonical; [`ChannelRegistry::add`](crate::ChannelRegistry::add) takes
    /// care of that.
    pub fn new(name: impl Into<String>, owner: ConnectionId) -> Self {
        Channel {
            name: name.into(),
            owner,
            state: ChannelState::NotJoined,
            members: BTreeSet::new(),
            modes: BTreeMap::new(),
            created_at: Utc::now(),
            server_created: None,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// When this object was created, not when the channel was joined.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Channel creation time reported by the server (RPL_CREATIONTIME).
    pub fn server_created(&self) -> Option<DateTime<Utc>> {
        self.server_created
    }

    pub fn set_server_timestamp(&mut self, created: DateTime<Utc>) {
        self.server_created = Some(created);
    }

    pub fn members(&self) -> impl Iterator<Item = &UserRef> {
        self.members.iter()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn has_member(&self, nick: &str) -> bool {
        self.members.contains(nick)
    }

    /// Returns `false` if the user was already a member.
    pub fn add_member(&mut self, user: UserRef) -> bool {
        self.members.insert(user)
    }

    /// Remove a member and every status it held here, mirroring the status
    /// removals to `users`. Returns the status letters that were dropped.
    pub fn remove_member<U>(&mut self, user: &UserRef, users: &mut U) -> Vec<char>
    where
        U: UserDirectory + ?Sized,
    {
        self.members.remove(user);

        let mut dropped = Vec::new();
        self.modes.retain(|mode, state| match state {
            ModeState::Status(holders) => {
                if holders.remove(user) {
                    dropped.push(*mode);
                }
                !holders.is_empty()
            }
            _ => true,
        });

        for mode in &dropped {
            users.remove_status(user, &self.name, *mode);
        }
        dropped
    }

    pub fn modes(&self) -> &BTreeMap<char, ModeState> {
        &self.modes
    }

    pub fn mode_state(&self, mode: char) -> Option<&ModeState> {
        self.modes.get(&mode)
    }

    pub fn has_mode(&self, mode: char) -> bool {
        self.modes.contains_key(&mode)
    }

    /// Entries of a list mode, if any are set.
    pub fn list_entries(&self, mode: char) -> Option<&BTreeMap<String, ListEntry>> {
        match self.modes.get(&mode)? {
            ModeState::List(entries) => Some(entries),
            _ => None,
        }
    }

    /// Status letters `nick` holds here, highest rank first.
    pub fn statuses_of(&self, caps: &CapabilityTable, nick: &str) -> Vec<char> {
        caps.prefixes()
            .iter()
            .map(|(mode, _)| *mode)
            .filter(|mode| match self.modes.get(mode) {
                Some(ModeState::Status(holders)) => holders.contains(nick),
                _ => false,
            })
            .collect()
    }

    /// The display symbol of the highest status `nick` holds (`@` for an op).
    pub fn member_prefix(&self, caps: &CapabilityTable, nick: &str) -> Option<char> {
        self.statuses_of(caps, nick)
            .first()
            .and_then(|mode| caps.prefix_for(*mode))
    }

    /// A message routed only to members holding the status behind `symbol`
    /// (`PRIVMSG @#chat`). `None` if the server does not allow that symbol.
    pub fn privmsg_status(&self, caps: &CapabilityTable, symbol: char, text: &str) -> Option<Command> {
        if !caps.is_statusmsg(symbol) {
            return None;
        }
        Some(Command::PRIVMSG(format!("{}{}", symbol, self.name), text.to_string()))
    }
}

impl HasIdentity for Channel {
    fn name(&self) -> &str {
        &self.name
    }

    fn owner(&self) -> ConnectionId {
        self.owner
    }
}

impl CanSend for Channel {}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Channel: {} ({})", self.name, self.state)
    }
}
