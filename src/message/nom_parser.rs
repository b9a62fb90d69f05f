//! Nom-based IRC line tokenizer.

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    error::{context, VerboseError, VerboseErrorKind},
    sequence::preceded,
    IResult,
};

use crate::error::MessageParseError;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Parse IRCv3 message tags (the part after `@` and before the first space).
fn parse_tags(input: &str) -> ParseResult<&str, &str> {
    context("parsing IRCv3 message tags", preceded(char('@'), take_until(" ")))(input)
}

/// Parse the message source (the part after `:` and before the first space).
fn parse_source(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message source",
        preceded(char(':'), take_while1(|c| c != ' ')),
    )(input)
}

/// Parse the command name (alphanumeric characters).
fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing IRC command",
        take_while1(|c: char| c.is_ascii_alphanumeric()),
    )(input)
}

/// Split the parameter section. A `:` parameter swallows the rest of the line
/// and is reported through the returned flag.
fn split_params(mut rest: &str) -> (Vec<&str>, bool) {
    let mut params = Vec::new();

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }
        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing);
            return (params, true);
        }
        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    (params, false)
}

fn parse_message(input: &str) -> ParseResult<&str, ParsedMessage<'_>> {
    let (input, tags) = context("parsing optional tags", opt(parse_tags))(input)?;
    let (input, _) = space0(input)?;

    let (input, source) = context("parsing optional source", opt(parse_source))(input)?;
    let (input, _) = space0(input)?;

    let (input, command) = context("parsing required command", parse_command)(input)?;
    if !input.is_empty() && !input.starts_with(' ') {
        return Err(nom::Err::Error(VerboseError {
            errors: vec![(input, VerboseErrorKind::Context("parsing IRC command"))],
        }));
    }

    let (params, trailing) = split_params(input);
    Ok((
        "",
        ParsedMessage {
            tags,
            source,
            command,
            params,
            trailing,
        },
    ))
}

/// A tokenized IRC line holding slices of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage<'a> {
    /// Raw tags string (without the leading `@`), if present.
    pub tags: Option<&'a str>,
    /// Raw source string (without the leading `:`), if present.
    pub source: Option<&'a str>,
    /// The command name or three-digit numeric.
    pub command: &'a str,
    /// Command parameters, including trailing.
    pub params: Vec<&'a str>,
    /// The last parameter was sent `:`-prefixed.
    pub trailing: bool,
}

impl<'a> ParsedMessage<'a> {
    /// Tokenize one line. The line terminator must already be stripped.
    pub fn parse(input: &'a str) -> Result<Self, MessageParseError> {
        match parse_message(input) {
            Ok((_, msg)) => Ok(msg),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                // The outermost context is the most descriptive.
                let (position, context) = e
                    .errors
                    .iter()
                    .rev()
                    .find_map(|(rest, kind)| match kind {
                        VerboseErrorKind::Context(ctx) => Some((input.len() - rest.len(), *ctx)),
                        _ => None,
                    })
                    .unwrap_or((0, "parsing message"));
                Err(MessageParseError::ParseContext {
                    position,
                    context: context.to_string(),
                })
            }
            Err(nom::Err::Incomplete(_)) => Err(MessageParseError::ParseContext {
                position: input.len(),
                context: "incomplete input".to_string(),
            }),
        }
    }
}
