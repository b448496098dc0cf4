//! Nom-based IRC line parser.
//!
//! Produces borrowed slices into the input; nothing is allocated except the
//! parameter vector.

use nom::{
    bytes::complete::{take_till1, take_while1},
    character::complete::char,
    combinator::{opt, rest, verify},
    error::{context, VerboseError, VerboseErrorKind},
    multi::many0,
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::MessageParseError;

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

fn spaces(input: &str) -> ParseResult<'_, &str> {
    take_while1(|c: char| c == ' ')(input)
}

/// IRCv3 tags: everything after `@` up to the first space.
fn tags(input: &str) -> ParseResult<'_, &str> {
    context(
        "parsing IRCv3 message tags",
        preceded(char('@'), take_till1(|c: char| c == ' ')),
    )(input)
}

/// Message source: everything after `:` up to the first space.
fn source(input: &str) -> ParseResult<'_, &str> {
    context(
        "parsing message prefix",
        preceded(char(':'), take_till1(|c: char| c == ' ')),
    )(input)
}

fn command(input: &str) -> ParseResult<'_, &str> {
    context(
        "parsing IRC command",
        take_while1(|c: char| c.is_ascii_alphanumeric()),
    )(input)
}

/// A space-led parameter that does not start with `:`.
fn middle(input: &str) -> ParseResult<'_, &str> {
    preceded(
        spaces,
        verify(take_till1(|c: char| c == ' '), |s: &str| !s.starts_with(':')),
    )(input)
}

/// The `:`-led final parameter, which may contain spaces or be empty.
fn trailing(input: &str) -> ParseResult<'_, &str> {
    preceded(spaces, preceded(char(':'), rest))(input)
}

fn line(input: &str) -> ParseResult<'_, ParsedLine<'_>> {
    let (input, tags) = opt(terminated(tags, spaces))(input)?;
    let (input, prefix) = opt(terminated(source, spaces))(input)?;
    let (input, command) = command(input)?;
    let (input, mut params) = many0(middle)(input)?;
    let (input, last) = opt(trailing)(input)?;
    let (input, _) = opt(spaces)(input)?;
    let has_trailing = last.is_some();
    params.extend(last);

    Ok((
        input,
        ParsedLine {
            tags,
            prefix,
            command,
            params,
            has_trailing,
        },
    ))
}

/// The components of one IRC line, borrowed from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedLine<'a> {
    pub tags: Option<&'a str>,
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    pub params: Vec<&'a str>,
    pub has_trailing: bool,
}

impl<'a> ParsedLine<'a> {
    /// Parse a line with its CR/LF terminator already removed.
    pub(crate) fn parse(input: &'a str) -> Result<Self, MessageParseError> {
        match line(input) {
            Ok(("", parsed)) => Ok(parsed),
            Ok((remaining, _)) => Err(MessageParseError::ParseContext {
                position: input.len() - remaining.len(),
                context: "unexpected characters after parameters".to_string(),
            }),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(describe(input, &e)),
            Err(nom::Err::Incomplete(_)) => Err(MessageParseError::ParseContext {
                position: input.len(),
                context: "incomplete input".to_string(),
            }),
        }
    }
}

fn describe(input: &str, err: &VerboseError<&str>) -> MessageParseError {
    let position = err
        .errors
        .first()
        .map_or(input.len(), |(remaining, _)| input.len() - remaining.len());
    let context = err
        .errors
        .iter()
        .find_map(|(_, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some(*ctx),
            _ => None,
        })
        .unwrap_or("parsing IRC line");

    MessageParseError::ParseContext {
        position,
        context: context.to_string(),
    }
}
