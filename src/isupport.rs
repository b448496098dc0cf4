//! RPL_ISUPPORT (005) token parsing.
//!
//! Only the structure of the reply is handled here. Turning the four tokens
//! this crate depends on into a usable table is done by
//! [`CapabilityTable`](crate::CapabilityTable).

use crate::error::CapabilityParseError;
use crate::message::MessageRef;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsupportEntry<'a> {
    pub key: &'a str,
    pub value: Option<&'a str>,
}

/// The tokens of one or more RPL_ISUPPORT parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport<'a> {
    entries: Vec<IsupportEntry<'a>>,
}

impl<'a> Isupport<'a> {
    pub fn parse_params(params: &[&'a str]) -> Self {
        let mut entries = Vec::with_capacity(params.len());
        for &p in params {
            if p.starts_with(':') {
                break;
            }
            if p.is_empty() {
                continue;
            }
            let (key, value) = match p.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (p, None),
            };
            entries.push(IsupportEntry { key, value });
        }
        Isupport { entries }
    }

    /// Build from the middle arguments of a 005 reply, i.e. without the
    /// human-readable trailing text. The leading client nick is skipped.
    pub fn from_response_args(args: &[&'a str]) -> Option<Self> {
        let (_nick, tokens) = args.split_first()?;
        Some(Self::parse_params(tokens))
    }

    /// Build from a parsed 005 line. The trailing parameter is never treated
    /// as a token, however many words it has.
    pub fn from_message_ref(msg: &MessageRef<'a>) -> Option<Self> {
        if msg.command == "005" {
            Self::from_response_args(msg.middle_params())
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &IsupportEntry<'a>> {
        self.entries.iter()
    }

    /// `None` if the token is absent, `Some(None)` if present without a value.
    pub fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.entries
            .iter()
            .rfind(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value)
    }

    pub fn prefix(&self) -> Option<&'a str> {
        self.get("PREFIX").flatten()
    }

    pub fn chanmodes(&self) -> Option<&'a str> {
        self.get("CHANMODES").flatten()
    }

    /// Raw MODES token. `Some(None)` means the server advertised no limit.
    pub fn modes(&self) -> Option<Option<&'a str>> {
        self.get("MODES")
    }

    pub fn statusmsg(&self) -> Option<&'a str> {
        self.get("STATUSMSG").flatten()
    }
}

/// `PREFIX=(letters)symbols`, split into its two equal-length runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixSpec<'a> {
    pub modes: &'a str,
    pub prefixes: &'a str,
}

impl<'a> PrefixSpec<'a> {
    pub fn parse(s: &'a str) -> Result<Self, CapabilityParseError> {
        if s.is_empty() {
            return Ok(PrefixSpec {
                modes: "",
                prefixes: "",
            });
        }

        let inner = s.strip_prefix('(').ok_or(CapabilityParseError::MissingParens)?;
        let (modes, prefixes) = inner
            .split_once(')')
            .ok_or(CapabilityParseError::MissingParens)?;

        let letters = modes.chars().count();
        let symbols = prefixes.chars().count();
        if letters != symbols {
            return Err(CapabilityParseError::PrefixLengthMismatch { letters, symbols });
        }

        Ok(PrefixSpec { modes, prefixes })
    }

    /// `(mode letter, display symbol)` pairs, highest rank first.
    pub fn pairs(&self) -> impl Iterator<Item = (char, char)> + 'a {
        self.modes.chars().zip(self.prefixes.chars())
    }
}

/// `CHANMODES=A,B,C,D`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChanModes<'a> {
    /// Type A: list modes.
    pub a: &'a str,
    /// Type B: parameter on set and unset.
    pub b: &'a str,
    /// Type C: parameter on set only.
    pub c: &'a str,
    /// Type D: never a parameter.
    pub d: &'a str,
}

impl<'a> ChanModes<'a> {
    pub fn parse(s: &'a str) -> Result<Self, CapabilityParseError> {
        let groups: Vec<&'a str> = s.split(',').collect();
        match groups[..] {
            [a, b, c, d] => Ok(ChanModes { a, b, c, d }),
            _ => Err(CapabilityParseError::WrongGroupCount(groups.len())),
        }
    }
}
