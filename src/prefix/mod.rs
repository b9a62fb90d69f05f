//! Membership prefixes (`@`, `+`, ...) and the modes they stand for.

use std::collections::HashMap;

use crate::error::IsupportError;
use crate::isupport::PrefixSpec;

/// Bijection between prefix characters and permission modes, built from a
/// `PREFIX=(<modes>)<prefixes>` value.
///
/// Entries keep the server's order, which is highest rank first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrefixTable {
    ranked: Vec<(char, char)>,
    // @ -> o
    prefix_modes: HashMap<char, char>,
    // o -> @
    mode_prefixes: HashMap<char, char>,
}

impl PrefixTable {
    /// Parse a `PREFIX` value such as `(ov)@+`.
    pub fn parse(value: &str) -> Result<Self, IsupportError> {
        let spec = PrefixSpec::parse(value)?;
        let mut table = PrefixTable::default();

        for (mode, prefix) in spec.modes.chars().zip(spec.prefixes.chars()) {
            if table.mode_prefixes.insert(mode, prefix).is_some() {
                return Err(IsupportError::DuplicatePrefixChar(mode));
            }
            if table.prefix_modes.insert(prefix, mode).is_some() {
                return Err(IsupportError::DuplicatePrefixChar(prefix));
            }
            table.ranked.push((mode, prefix));
        }

        Ok(table)
    }

    /// Mode for a prefix symbol, e.g. `@` to `o`.
    pub fn mode_for_prefix(&self, prefix: char) -> Option<char> {
        self.prefix_modes.get(&prefix).copied()
    }

    /// Prefix symbol for a mode, e.g. `o` to `@`.
    pub fn prefix_for_mode(&self, mode: char) -> Option<char> {
        self.mode_prefixes.get(&mode).copied()
    }

    /// Is `c` a known prefix symbol?
    pub fn is_prefix(&self, c: char) -> bool {
        self.prefix_modes.contains_key(&c)
    }

    /// Is `c` a known permission mode?
    pub fn is_mode(&self, c: char) -> bool {
        self.mode_prefixes.contains_key(&c)
    }

    /// Position of `mode` in the advertised order; 0 is the highest.
    pub fn rank(&self, mode: char) -> Option<usize> {
        self.ranked.iter().position(|(m, _)| *m == mode)
    }

    /// `(mode, prefix)` pairs, highest rank first.
    pub fn iter(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.ranked.iter().copied()
    }

    /// Number of mode/prefix pairs.
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// True when no prefixes are known.
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Split a NAMES-style token into its leading prefix run and the rest.
    ///
    /// `"@+alice"` becomes `("@+", "alice")`. Only known prefixes are
    /// stripped.
    pub fn split_prefixed<'a>(&self, token: &'a str) -> (&'a str, &'a str) {
        let end = token
            .char_indices()
            .find(|(_, c)| !self.is_prefix(*c))
            .map_or(token.len(), |(i, _)| i);
        token.split_at(end)
    }

    /// Modes for every known prefix in `prefixes`; unknown characters are skipped.
    pub fn modes_for_prefixes<'a>(&'a self, prefixes: &'a str) -> impl Iterator<Item = char> + 'a {
        prefixes.chars().filter_map(|p| self.mode_for_prefix(p))
    }

    /// The prefix of the highest-ranked mode in `modes`.
    pub fn highest_prefix(&self, modes: impl IntoIterator<Item = char>) -> Option<char> {
        modes
            .into_iter()
            .filter_map(|m| self.rank(m))
            .min()
            .map(|rank| self.ranked[rank].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bijection() {
        let table = PrefixTable::parse("(qaohv)~&@%+").unwrap();
        for (mode, prefix) in table.iter() {
            assert_eq!(table.mode_for_prefix(prefix), Some(mode));
            assert_eq!(table.prefix_for_mode(mode), Some(prefix));
        }
        assert_eq!(table.len(), 5);
        assert_eq!(table.rank('q'), Some(0));
        assert_eq!(table.rank('v'), Some(4));
    }

    #[test]
    fn test_rejects_duplicates() {
        assert_eq!(
            PrefixTable::parse("(oo)@+"),
            Err(IsupportError::DuplicatePrefixChar('o'))
        );
        assert_eq!(
            PrefixTable::parse("(ov)@@"),
            Err(IsupportError::DuplicatePrefixChar('@'))
        );
    }

    #[test]
    fn test_split_prefixed() {
        let table = PrefixTable::parse("(ov)@+").unwrap();
        assert_eq!(table.split_prefixed("@+alice"), ("@+", "alice"));
        assert_eq!(table.split_prefixed("carol"), ("", "carol"));
        assert_eq!(table.split_prefixed("%dave"), ("", "%dave"));
        assert_eq!(table.split_prefixed("@"), ("@", ""));
    }

    #[test]
    fn test_highest_prefix() {
        let table = PrefixTable::parse("(ov)@+").unwrap();
        assert_eq!(table.highest_prefix(['v', 'o']), Some('@'));
        assert_eq!(table.highest_prefix(['v']), Some('+'));
        assert_eq!(table.highest_prefix(['x']), None);
    }

    #[test]
    fn test_modes_for_prefixes() {
        let table = PrefixTable::parse("(ov)@+").unwrap();
        let modes: Vec<char> = table.modes_for_prefixes("@*+").collect();
        assert_eq!(modes, vec!['o', 'v']);
    }
}
