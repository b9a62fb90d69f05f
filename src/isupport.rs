//! ISUPPORT (`RPL_ISUPPORT`, numeric 005) tracking.
//!
//! [`Isupport`] splits one reply's tokens without allocating;
//! [`CapabilityTable`] keeps the accumulated values for the session and
//! rebuilds the derived tables (mode classes, channel types, prefixes,
//! case mapping) whenever the token that feeds them changes.
//!
//! # Reference
//! - <https://tools.ietf.org/html/draft-brocklesby-irc-isupport-03>

mod tokens;

pub use self::tokens::IsupportBuilder;

use std::collections::HashMap;

use nom::{
    bytes::complete::take_till1,
    character::complete::char,
    combinator::rest,
    sequence::{delimited, pair},
    IResult,
};
use tracing::{trace, warn};

use crate::casemap::CaseMapping;
use crate::error::IsupportError;
use crate::mode::ModeClassifier;
use crate::prefix::PrefixTable;

/// Values assumed for tokens the server has not (yet) advertised.
///
/// Keys with an empty value are known to exist but carry no useful
/// default. There is no `CHANMODES` entry, so mode classes start empty.
pub const ISUPPORT_DEFAULTS: &[(&str, &str)] = &[
    ("CASEMAPPING", "rfc1459"),
    ("CHANNELLEN", "200"),
    ("CHANTYPES", "#&"),
    ("EXCEPTS", ""),
    ("IDCHAN", ""),
    ("INVEX", ""),
    ("MODES", "3"),
    ("NICKLEN", "9"),
    ("PREFIX", "(ov)@+"),
    ("SAFELIST", ""),
    ("STATUSMSG", ""),
    ("STD", ""),
    ("TARGMAX", ""),
];

/// One `KEY[=VALUE]` or `-KEY` token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsupportEntry<'a> {
    /// Key as sent, without any leading `-`.
    pub key: &'a str,
    /// Value after the first `=`, if any.
    pub value: Option<&'a str>,
    /// The token was `-KEY`.
    pub negated: bool,
}

/// The tokens of a single `RPL_ISUPPORT` reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport<'a> {
    entries: Vec<IsupportEntry<'a>>,
}

impl<'a> Isupport<'a> {
    /// Split tokens, stopping at a trailing `:`-prefixed parameter.
    pub fn parse_params(params: &[&'a str]) -> Self {
        Self::parse_iter(params.iter().copied())
    }

    fn parse_iter(params: impl Iterator<Item = &'a str>) -> Self {
        let mut entries = Vec::new();
        for p in params {
            if p.starts_with(':') {
                break;
            }
            if p.is_empty() {
                continue;
            }
            let (k, v) = match p.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (p, None),
            };
            let (key, negated) = match k.strip_prefix('-') {
                Some(stripped) => (stripped, true),
                None => (k, false),
            };
            if key.is_empty() {
                continue;
            }

            entries.push(IsupportEntry {
                key,
                value: v,
                negated,
            });
        }
        Isupport { entries }
    }

    /// Entries in the order the server sent them.
    pub fn iter(&self) -> impl Iterator<Item = &IsupportEntry<'a>> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the reply carried no tokens.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The four comma-separated groups of `CHANMODES`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChanModes<'a> {
    /// Type A: list modes, parameter on set and unset.
    pub a: &'a str,
    /// Type B: parameter on set and unset.
    pub b: &'a str,
    /// Type C: parameter on set only.
    pub c: &'a str,
    /// Type D: never a parameter.
    pub d: &'a str,
}

impl<'a> ChanModes<'a> {
    /// Groups beyond the fourth are ignored; missing groups are empty.
    pub fn parse(s: &'a str) -> Self {
        let mut parts = s.split(',');
        let mut next = || parts.next().unwrap_or("");
        ChanModes {
            a: next(),
            b: next(),
            c: next(),
            d: next(),
        }
    }
}

/// The two runs of a `PREFIX=(<modes>)<prefixes>` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixSpec<'a> {
    /// Mode letters inside the parentheses, e.g. `ov`.
    pub modes: &'a str,
    /// Prefix symbols after them, e.g. `@+`.
    pub prefixes: &'a str,
}

fn prefix_spec(input: &str) -> IResult<&str, (&str, &str)> {
    pair(
        delimited(char('('), take_till1(|c| c == ')'), char(')')),
        rest,
    )(input)
}

impl<'a> PrefixSpec<'a> {
    /// Parse `(ov)@+`. Both runs must be non-empty and of equal length.
    pub fn parse(s: &'a str) -> Result<Self, IsupportError> {
        let (_, (modes, prefixes)) =
            prefix_spec(s).map_err(|_| IsupportError::MalformedPrefix(s.to_string()))?;
        if prefixes.is_empty() {
            return Err(IsupportError::MalformedPrefix(s.to_string()));
        }

        let (m, p) = (modes.chars().count(), prefixes.chars().count());
        if m != p {
            return Err(IsupportError::PrefixLengthMismatch {
                modes: m,
                prefixes: p,
            });
        }

        Ok(PrefixSpec { modes, prefixes })
    }
}

/// Accumulated ISUPPORT values for one session, plus the tables derived
/// from them.
#[derive(Clone, Debug)]
pub struct CapabilityTable {
    values: HashMap<String, String>,
    casemap: CaseMapping,
    classifier: ModeClassifier,
    prefixes: PrefixTable,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityTable {
    /// A table holding only the defaults, with derived tables populated.
    pub fn new() -> Self {
        let mut table = Self {
            values: HashMap::new(),
            casemap: CaseMapping::default(),
            classifier: ModeClassifier::default(),
            prefixes: PrefixTable::default(),
        };
        table.reset();
        table
    }

    /// Forget everything advertised and re-derive from the defaults.
    ///
    /// Works by feeding a synthesized `-KEY` token per default key back
    /// through [`apply_directive`](Self::apply_directive).
    pub fn reset(&mut self) {
        self.values.clear();
        self.casemap = CaseMapping::default();
        self.classifier = ModeClassifier::default();
        self.prefixes = PrefixTable::default();

        let tokens = IsupportBuilder::new()
            .reset_all(ISUPPORT_DEFAULTS.iter().map(|(k, _)| *k))
            .into_tokens();
        self.apply_directive(&tokens);
    }

    /// Resolve `key`: advertised value, else default, else `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = self.casemap.normalize(key);
        self.values
            .get(&key)
            .map(String::as_str)
            .or_else(|| self.default_for(&key))
    }

    fn default_for(&self, normalized: &str) -> Option<&'static str> {
        ISUPPORT_DEFAULTS
            .iter()
            .find(|(k, _)| self.casemap.normalize(k) == normalized)
            .map(|(_, v)| *v)
    }

    /// Apply the tokens of one `RPL_ISUPPORT` reply, in order.
    ///
    /// `tokens` excludes the leading nickname and the trailing
    /// human-readable text.
    pub fn apply_directive<S: AsRef<str>>(&mut self, tokens: &[S]) {
        let parsed = Isupport::parse_iter(tokens.iter().map(|t| t.as_ref()));
        for entry in parsed.iter() {
            let key = self.casemap.normalize(entry.key);
            if entry.negated {
                trace!(key = %key, "ISUPPORT reset to default");
                self.values.remove(&key);
            } else {
                let value = entry.value.unwrap_or("");
                trace!(key = %key, value = %value, "ISUPPORT set");
                self.values.insert(key.clone(), value.to_string());
            }

            self.refresh_derived(&key);
        }
    }

    fn refresh_derived(&mut self, key: &str) {
        let resolved = self.get(key).map(str::to_string);
        match key {
            "chanmodes" => self
                .classifier
                .set_chanmodes(ChanModes::parse(resolved.as_deref().unwrap_or(""))),
            "chantypes" => self
                .classifier
                .set_chantypes(resolved.as_deref().unwrap_or("")),
            "prefix" => match resolved.as_deref() {
                None | Some("") => self.prefixes = PrefixTable::default(),
                Some(value) => match PrefixTable::parse(value) {
                    Ok(table) => self.prefixes = table,
                    Err(e) => warn!(value = %value, error = %e, "keeping previous PREFIX"),
                },
            },
            "casemapping" => self.casemap = CaseMapping::from_value(resolved.as_deref()),
            _ => {}
        }
    }

    /// Iterate the explicitly advertised pairs (defaults not included).
    pub fn advertised(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The active case mapping.
    pub fn casemapping(&self) -> CaseMapping {
        self.casemap
    }

    /// Mode classes and channel types.
    pub fn classifier(&self) -> &ModeClassifier {
        &self.classifier
    }

    /// Prefix/mode bijection.
    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }
}
