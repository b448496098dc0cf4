//! Outgoing IRC commands produced by channel operations.
//!
//! Channels never write to a transport; they return [`Command`] values and the
//! caller sends their [`Display`](std::fmt::Display) form followed by CRLF.

use std::fmt::{self, Write};

/// A command this crate emits.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Command {
    /// `JOIN channel [:key]`
    JOIN(String, Option<String>),
    /// `PART channel [:message]`
    PART(String, Option<String>),
    /// `KICK channel target [:message]`
    KICK(String, String, Option<String>),
    /// `MODE channel` with no arguments, asking the server for current modes.
    ModeQuery(String),
    /// `MODE channel modeletters [target ...]`
    ChannelMODE(String, String, Vec<String>),
    /// `PRIVMSG target :text`
    PRIVMSG(String, String),
    /// `NOTICE target :text`
    NOTICE(String, String),
}

impl Command {
    /// The command verb as sent on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Command::JOIN(..) => "JOIN",
            Command::PART(..) => "PART",
            Command::KICK(..) => "KICK",
            Command::ModeQuery(_) | Command::ChannelMODE(..) => "MODE",
            Command::PRIVMSG(..) => "PRIVMSG",
            Command::NOTICE(..) => "NOTICE",
        }
    }
}

/// Write a command whose arguments never get a trailing `:`.
fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    for arg in args {
        f.write_char(' ')?;
        f.write_str(arg)?;
    }
    Ok(())
}

/// Write a command with a freeform (always colon-prefixed) trailing argument.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    match args.split_last() {
        Some((suffix, middle)) => {
            write_cmd(f, cmd, middle)?;
            f.write_str(" :")?;
            f.write_str(suffix)
        }
        None => f.write_str(cmd),
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::JOIN(c, Some(k)) => write_cmd_freeform(f, "JOIN", &[c, k]),
            Command::JOIN(c, None) => write_cmd(f, "JOIN", &[c]),
            Command::PART(c, Some(m)) => write_cmd_freeform(f, "PART", &[c, m]),
            Command::PART(c, None) => write_cmd(f, "PART", &[c]),
            Command::KICK(c, n, Some(r)) => write_cmd_freeform(f, "KICK", &[c, n, r]),
            Command::KICK(c, n, None) => write_cmd(f, "KICK", &[c, n]),
            Command::ModeQuery(c) => write_cmd(f, "MODE", &[c]),
            Command::ChannelMODE(c, modes, targets) => {
                write_cmd(f, "MODE", &[c, modes])?;
                for target in targets {
                    f.write_char(' ')?;
                    f.write_str(target)?;
                }
                Ok(())
            }
            Command::PRIVMSG(t, m) => write_cmd_freeform(f, "PRIVMSG", &[t, m]),
            Command::NOTICE(t, m) => write_cmd_freeform(f, "NOTICE", &[t, m]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_serialization() {
        let cmd = Command::JOIN("#chat".to_string(), None);
        assert_eq!(cmd.to_string(), "JOIN #chat");

        let cmd = Command::JOIN("#chat".to_string(), Some("sekrit".to_string()));
        assert_eq!(cmd.to_string(), "JOIN #chat :sekrit");
    }

    #[test]
    fn test_part_and_kick_serialization() {
        let cmd = Command::PART("#chat".to_string(), Some("bye all".to_string()));
        assert_eq!(cmd.to_string(), "PART #chat :bye all");

        let cmd = Command::KICK("#chat".to_string(), "troll".to_string(), None);
        assert_eq!(cmd.to_string(), "KICK #chat troll");

        let cmd = Command::KICK(
            "#chat".to_string(),
            "troll".to_string(),
            Some("out".to_string()),
        );
        assert_eq!(cmd.to_string(), "KICK #chat troll :out");
    }

    #[test]
    fn test_mode_serialization() {
        let cmd = Command::ModeQuery("#chat".to_string());
        assert_eq!(cmd.to_string(), "MODE #chat");
        assert_eq!(cmd.name(), "MODE");

        let cmd = Command::ChannelMODE(
            "#chat".to_string(),
            "+ov-b".to_string(),
            vec!["alice".to_string(), "bob".to_string(), "*!*@spam".to_string()],
        );
        assert_eq!(cmd.to_string(), "MODE #chat +ov-b alice bob *!*@spam");
    }

    #[test]
    fn test_privmsg_serialization() {
        let cmd = Command::PRIVMSG("@#chat".to_string(), "ops only".to_string());
        assert_eq!(cmd.to_string(), "PRIVMSG @#chat :ops only");

        let cmd = Command::NOTICE("alice".to_string(), String::new());
        assert_eq!(cmd.to_string(), "NOTICE alice :");
    }
}
