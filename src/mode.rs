//! Channel mode vocabulary shared by the encoder and decoder.

use std::fmt;
use std::str::FromStr;

use crate::error::ModeParseError;

/// Whether a mode is being set or unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sign {
    /// `+`
    Plus,
    /// `-`
    Minus,
}

impl Sign {
    pub fn from_char(c: char) -> Option<Sign> {
        match c {
            '+' => Some(Sign::Plus),
            '-' => Some(Sign::Minus),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// How a mode letter behaves, as declared by PREFIX and CHANMODES.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeClass {
    /// A PREFIX mode granting rank to a member (`o`, `v`).
    Status,
    /// CHANMODES type A: a list of masks (`b`, `e`, `I`).
    List,
    /// CHANMODES type B: parameter on set and unset (`k`).
    AlwaysParam,
    /// CHANMODES type C: parameter on set only (`l`).
    SetOnlyParam,
    /// CHANMODES type D: never a parameter (`i`, `n`, `t`).
    NoParam,
}

impl ModeClass {
    /// Whether a change with this sign consumes one parameter.
    pub fn takes_param(self, sign: Sign) -> bool {
        match self {
            ModeClass::Status | ModeClass::List | ModeClass::AlwaysParam => true,
            ModeClass::SetOnlyParam => sign == Sign::Plus,
            ModeClass::NoParam => false,
        }
    }
}

/// One requested mode change, the input to
/// [`Channel::mode`](crate::Channel::mode).
///
/// A change without a sign is emitted as a bare letter and inherits whatever
/// sign precedes it in the batch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeChange {
    pub sign: Option<Sign>,
    pub mode: char,
    pub target: Option<String>,
}

impl ModeChange {
    pub fn new(sign: Sign, mode: char) -> Self {
        ModeChange {
            sign: Some(sign),
            mode,
            target: None,
        }
    }

    pub fn plus(mode: char) -> Self {
        Self::new(Sign::Plus, mode)
    }

    pub fn minus(mode: char) -> Self {
        Self::new(Sign::Minus, mode)
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

impl FromStr for ModeChange {
    type Err = ModeParseError;

    /// Parse a single mode token: `+o`, `-b` or a bare `t`.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut chars = token.chars();
        let (sign, mode) = match (chars.next(), chars.next(), chars.next()) {
            (Some(s), Some(m), None) if Sign::from_char(m).is_none() => match Sign::from_char(s) {
                Some(sign) => (Some(sign), m),
                None => return Err(ModeParseError::InvalidToken(token.to_string())),
            },
            (Some(m), None, None) if Sign::from_char(m).is_none() => (None, m),
            _ => return Err(ModeParseError::InvalidToken(token.to_string())),
        };

        Ok(ModeChange {
            sign,
            mode,
            target: None,
        })
    }
}

impl fmt::Display for ModeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sign) = self.sign {
            write!(f, "{}", sign)?;
        }
        write!(f, "{}", self.mode)?;
        if let Some(target) = &self.target {
            write!(f, " {}", target)?;
        }
        Ok(())
    }
}
