//! ISUPPORT token synthesis.

/// Builder for `-KEY` reset directives.
///
/// Produces the same tokens a server puts in `RPL_ISUPPORT`, so a
/// synthesized reset goes through the exact code path a real one does.
#[derive(Debug, Clone, Default)]
pub struct IsupportBuilder {
    tokens: Vec<String>,
}

impl IsupportBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Add a `-KEY` token, resetting `key` to its default.
    pub fn reset(mut self, key: &str) -> Self {
        self.tokens.push(format!("-{}", key));
        self
    }

    /// Add a `-KEY` token for every key in `keys`.
    pub fn reset_all<'k>(self, keys: impl IntoIterator<Item = &'k str>) -> Self {
        keys.into_iter().fold(self, Self::reset)
    }

    /// Take the tokens as a list, one entry per token.
    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }
}
