use crate::error::MessageParseError;

use super::nom_parser::ParsedMessage;

/// A borrowed, tokenized IRC line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MessageRef<'a> {
    pub tags: Option<&'a str>,
    pub source: Option<&'a str>,
    pub command: &'a str,
    pub params: Vec<&'a str>,
    /// The last parameter was sent `:`-prefixed.
    pub trailing: bool,
    pub raw: &'a str,
}

impl<'a> MessageRef<'a> {
    pub fn parse(s: &'a str) -> Result<MessageRef<'a>, MessageParseError> {
        let trimmed = s.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let parsed = ParsedMessage::parse(trimmed)?;

        Ok(MessageRef {
            tags: parsed.tags,
            source: parsed.source,
            command: parsed.command,
            params: parsed.params,
            trailing: parsed.trailing,
            raw: s,
        })
    }

    /// Build from already-tokenized parts, for hosts with their own parser.
    ///
    /// `trailing` says whether the last parameter was `:`-prefixed.
    pub fn from_parts(
        source: Option<&'a str>,
        command: &'a str,
        params: Vec<&'a str>,
        trailing: bool,
    ) -> Self {
        MessageRef {
            tags: None,
            source,
            command,
            params,
            trailing,
            raw: "",
        }
    }

    /// The `n`th parameter, if present.
    pub fn arg(&self, n: usize) -> Option<&'a str> {
        self.params.get(n).copied()
    }

    /// Nickname part of the source: everything before `!` or `@`.
    pub fn source_nick(&self) -> Option<&'a str> {
        self.source
            .map(|s| s.split(['!', '@']).next().unwrap_or(s))
            .filter(|nick| !nick.is_empty())
    }
}
