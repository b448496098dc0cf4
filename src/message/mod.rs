//! Borrowed inbound IRC lines.

mod nom_parser;

use crate::error::MessageParseError;

use self::nom_parser::ParsedLine;

/// An inbound IRC line, borrowing from the raw input.
///
/// Only the structure is parsed; command-specific meaning is left to the
/// consumer (see [`ChannelRegistry::handle_message`](crate::ChannelRegistry::handle_message)
/// and [`Isupport::from_message_ref`](crate::Isupport::from_message_ref)).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MessageRef<'a> {
    /// Raw IRCv3 tags without the leading `@`.
    pub tags: Option<&'a str>,
    /// Raw source without the leading `:`.
    pub prefix: Option<&'a str>,
    /// Command name or three-digit numeric.
    pub command: &'a str,
    /// Parameters, with the trailing parameter last.
    pub params: Vec<&'a str>,
    /// Whether the last parameter was given in `:trailing` form.
    pub has_trailing: bool,
    /// The line as given, terminator included.
    pub raw: &'a str,
}

impl<'a> MessageRef<'a> {
    /// Parse one IRC line. A trailing CR/LF is ignored.
    pub fn parse(s: &'a str) -> Result<MessageRef<'a>, MessageParseError> {
        let trimmed = s.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let parsed = ParsedLine::parse(trimmed)?;

        Ok(MessageRef {
            tags: parsed.tags,
            prefix: parsed.prefix,
            command: parsed.command,
            params: parsed.params,
            has_trailing: parsed.has_trailing,
            raw: s,
        })
    }

    /// The parameter at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.params.get(index).copied()
    }

    /// The `:`-prefixed final parameter, if the line had one.
    pub fn trailing(&self) -> Option<&'a str> {
        if self.has_trailing {
            self.params.last().copied()
        } else {
            None
        }
    }

    /// Parameters before the trailing one.
    pub fn middle_params(&self) -> &[&'a str] {
        match (self.has_trailing, self.params.split_last()) {
            (true, Some((_, middle))) => middle,
            _ => &self.params,
        }
    }

    /// Case-insensitive command comparison.
    pub fn is_command(&self, name: &str) -> bool {
        self.command.eq_ignore_ascii_case(name)
    }

    /// The nickname portion of the source (`nick` in `nick!user@host`).
    pub fn source_nick(&self) -> Option<&'a str> {
        self.prefix
            .map(|p| p.split_once('!').map_or(p, |(nick, _)| nick))
            .map(|p| p.split_once('@').map_or(p, |(nick, _)| nick))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_terminator() {
        let msg = MessageRef::parse(":srv 324 me #chat +nt\r\n").unwrap();
        assert_eq!(msg.command, "324");
        assert_eq!(msg.params, vec!["me", "#chat", "+nt"]);
        assert_eq!(msg.raw, ":srv 324 me #chat +nt\r\n");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(MessageRef::parse(""), Err(MessageParseError::EmptyMessage));
        assert_eq!(MessageRef::parse("\r\n"), Err(MessageParseError::EmptyMessage));
    }

    #[test]
    fn test_trailing_detection() {
        let msg = MessageRef::parse(":srv 005 me MODES=4 :supported").unwrap();
        assert_eq!(msg.trailing(), Some("supported"));
        assert_eq!(msg.middle_params(), &["me", "MODES=4"]);

        let msg = MessageRef::parse(":srv MODE #chat +o alice").unwrap();
        assert_eq!(msg.trailing(), None);
        assert_eq!(msg.middle_params(), &["#chat", "+o", "alice"]);

        let msg = MessageRef::parse("PART #chat :").unwrap();
        assert_eq!(msg.trailing(), Some(""));
    }

    #[test]
    fn test_source_nick() {
        let msg = MessageRef::parse(":alice!a@example.com MODE #chat +v bob").unwrap();
        assert_eq!(msg.source_nick(), Some("alice"));
        assert!(msg.is_command("mode"));
        assert_eq!(msg.arg(2), Some("bob"));
        assert_eq!(msg.arg(3), None);

        let msg = MessageRef::parse(":irc.example.net MODE #chat +n").unwrap();
        assert_eq!(msg.source_nick(), Some("irc.example.net"));

        let msg = MessageRef::parse("MODE #chat +n").unwrap();
        assert_eq!(msg.source_nick(), None);
    }
}
