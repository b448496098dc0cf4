//! Join/part/kick requests and their confirmations.
//!
//! Requests made from a state where they make no sense return `None` instead
//! of failing: they are usually the result of racing the server's own
//! confirmation and are safe to drop.

use tracing::debug;

use super::{Channel, ChannelState};
use crate::command::Command;
use crate::user::UserDirectory;

impl Channel {
    /// Request to join. Legal from `NotJoined` and `Left`; moves to `PendingJoin`.
    ///
    /// `None` sends `JOIN #chan` with no trailing parameter; pass `Some("")`
    /// for the literal `JOIN #chan :` form.
    pub fn join(&mut self, key: Option<&str>) -> Option<Command> {
        match self.state {
            ChannelState::NotJoined | ChannelState::Left => {
                self.state = ChannelState::PendingJoin;
                Some(Command::JOIN(self.name.clone(), key.map(str::to_string)))
            }
            state => {
                debug!(channel = %self.name, %state, "ignoring join request");
                None
            }
        }
    }

    /// Request to leave. Legal from `Joined`; moves to `PendingLeave`.
    /// As with [`join`](Self::join), `Some("")` keeps an empty trailing `:`.
    pub fn part(&mut self, message: Option<&str>) -> Option<Command> {
        if self.state != ChannelState::Joined {
            debug!(channel = %self.name, state = %self.state, "ignoring part request");
            return None;
        }
        self.state = ChannelState::PendingLeave;
        Some(Command::PART(self.name.clone(), message.map(str::to_string)))
    }

    /// Request a kick. Legal from `Joined`; local state only changes once the
    /// server echoes the KICK back.
    pub fn kick(&self, target: &str, message: Option<&str>) -> Option<Command> {
        if self.state != ChannelState::Joined {
            debug!(channel = %self.name, state = %self.state, "ignoring kick request");
            return None;
        }
        Some(Command::KICK(
            self.name.clone(),
            target.to_string(),
            message.map(str::to_string),
        ))
    }

    /// The server confirmed our JOIN. Also accepts joins we never asked for
    /// (forced joins), so any state other than `Joined` moves to `Joined`.
    pub fn mark_joined(&mut self) -> bool {
        if self.state == ChannelState::Joined {
            return false;
        }
        self.state = ChannelState::Joined;
        true
    }

    /// We are no longer in the channel. `state` must be `Left`, `Quit` or
    /// `Deleted`; anything else is ignored and `false` returned.
    pub fn mark_left(&mut self, state: ChannelState) -> bool {
        match state {
            ChannelState::Left | ChannelState::Quit | ChannelState::Deleted => {
                self.state = state;
                true
            }
            _ => {
                debug!(channel = %self.name, %state, "not a leave state");
                false
            }
        }
    }

    /// Forget members and modes and enter `Cleared`. Status letters held by
    /// members are removed from `users` as well.
    pub fn clear<U>(&mut self, users: &mut U)
    where
        U: UserDirectory + ?Sized,
    {
        let modes = std::mem::take(&mut self.modes);
        for (mode, state) in modes {
            if let super::ModeState::Status(holders) = state {
                for user in &holders {
                    users.remove_status(user, &self.name, mode);
                }
            }
        }
        self.members.clear();
        self.state = ChannelState::Cleared;
    }
}
