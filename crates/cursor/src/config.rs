//! Engine configuration strings.
//!
//! The engine describes tables and cursor options with comma-separated
//! `key=value` pairs. Values may be parenthesised lists, which may contain
//! commas of their own, or double-quoted strings:
//!
//! ```text
//! key_format=u,value_format=u,columns=(k,v),app_metadata="a,b"
//! ```
//!
//! A bare key with no `=` is shorthand for `key=true`.

/// Error type for malformed configuration strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A `(` without a matching `)`, or the reverse.
    #[error("unbalanced parentheses at offset {offset}")]
    UnbalancedParens {
        /// Byte offset of the offending character or end of input.
        offset: usize,
    },

    /// A double-quoted value was never closed.
    #[error("unterminated quoted value at offset {offset}")]
    UnterminatedQuote {
        /// Byte offset of the opening quote.
        offset: usize,
    },

    /// A pair with nothing before the `=`.
    #[error("empty key at offset {offset}")]
    EmptyKey {
        /// Byte offset of the pair.
        offset: usize,
    },

    /// A value that should have been a boolean.
    #[error("invalid boolean for {key}: {value:?}")]
    InvalidBool {
        /// The key being read.
        key: String,
        /// The value found.
        value: String,
    },
}

/// A borrowed engine configuration string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigString<'a> {
    src: &'a str,
}

impl<'a> ConfigString<'a> {
    /// Wrap a configuration string. Parsing is lazy.
    pub const fn new(src: &'a str) -> Self {
        Self { src }
    }

    /// The raw string.
    pub const fn as_str(&self) -> &'a str {
        self.src
    }

    /// Iterate over the `(key, value)` pairs in order.
    ///
    /// Surrounding whitespace is trimmed, and one level of enclosing
    /// parentheses or quotes is stripped from values.
    pub const fn pairs(&self) -> ConfigPairs<'a> {
        ConfigPairs { src: self.src, pos: 0, failed: false }
    }

    /// Look up `key`. When a key repeats, the last occurrence wins.
    pub fn get(&self, key: &str) -> Result<Option<&'a str>, ConfigError> {
        let mut found = None;
        for pair in self.pairs() {
            let (k, v) = pair?;
            if k == key {
                found = Some(v);
            }
        }
        Ok(found)
    }

    /// Look up `key` as a boolean. Accepts `true`/`false` and `1`/`0`.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.get(key)?
            .map(|value| match value {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(ConfigError::InvalidBool { key: key.to_owned(), value: value.to_owned() }),
            })
            .transpose()
    }
}

impl<'a> From<&'a str> for ConfigString<'a> {
    fn from(src: &'a str) -> Self {
        Self::new(src)
    }
}

/// Iterator over the pairs of a [`ConfigString`].
///
/// Yields a single error and then stops if the string is malformed.
#[derive(Debug, Clone)]
pub struct ConfigPairs<'a> {
    src: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> ConfigPairs<'a> {
    /// Find the end of the pair starting at `start`: the next top-level
    /// comma, or the end of input.
    fn pair_end(&self, start: usize) -> Result<usize, ConfigError> {
        let bytes = self.src.as_bytes();
        let mut depth = 0usize;
        let mut quote_at = None;
        for (i, &b) in bytes.iter().enumerate().skip(start) {
            if quote_at.is_some() {
                if b == b'"' {
                    quote_at = None;
                }
                continue;
            }
            match b {
                b'"' => quote_at = Some(i),
                b'(' => depth += 1,
                b')' => {
                    depth = depth.checked_sub(1).ok_or(ConfigError::UnbalancedParens { offset: i })?
                }
                b',' if depth == 0 => return Ok(i),
                _ => {}
            }
        }
        if let Some(offset) = quote_at {
            return Err(ConfigError::UnterminatedQuote { offset });
        }
        if depth != 0 {
            return Err(ConfigError::UnbalancedParens { offset: bytes.len() });
        }
        Ok(bytes.len())
    }

    fn strip(value: &str) -> &str {
        let value = value.trim();
        let enclosed = |open: char, close: char| {
            value.len() >= 2 && value.starts_with(open) && value.ends_with(close)
        };
        if enclosed('(', ')') || enclosed('"', '"') { &value[1..value.len() - 1] } else { value }
    }
}

impl<'a> Iterator for ConfigPairs<'a> {
    type Item = Result<(&'a str, &'a str), ConfigError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed || self.pos >= self.src.len() {
                return None;
            }
            let start = self.pos;
            let end = match self.pair_end(start) {
                Ok(end) => end,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            };
            self.pos = end + 1;

            let pair = &self.src[start..end];
            if pair.trim().is_empty() {
                continue;
            }
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key.trim(), Self::strip(value)),
                None => (pair.trim(), "true"),
            };
            if key.is_empty() {
                self.failed = true;
                return Some(Err(ConfigError::EmptyKey { offset: start }));
            }
            return Some(Ok((key, value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(src: &str) -> Result<Vec<(&str, &str)>, ConfigError> {
        ConfigString::new(src).pairs().collect()
    }

    #[test]
    fn simple_pairs() {
        assert_eq!(
            collect("key_format=u,value_format=S").unwrap(),
            vec![("key_format", "u"), ("value_format", "S")]
        );
    }

    #[test]
    fn parenthesised_values_keep_commas() {
        assert_eq!(
            collect("key_format=u,columns=(k,v),value_format=u").unwrap(),
            vec![("key_format", "u"), ("columns", "k,v"), ("value_format", "u")]
        );
    }

    #[test]
    fn quoted_values_keep_commas() {
        assert_eq!(collect(r#"app_metadata="a,b",x=1"#).unwrap(), vec![
            ("app_metadata", "a,b"),
            ("x", "1")
        ]);
    }

    #[test]
    fn bare_key_is_true_and_blanks_skipped() {
        let cfg = ConfigString::new(" overwrite , ,value_format= ");
        assert_eq!(cfg.get_bool("overwrite").unwrap(), Some(true));
        assert_eq!(cfg.get("value_format").unwrap(), Some(""));
        assert_eq!(cfg.get("key_format").unwrap(), None);
    }

    #[test]
    fn last_occurrence_wins() {
        let cfg = ConfigString::new("overwrite=true,overwrite=false");
        assert_eq!(cfg.get_bool("overwrite").unwrap(), Some(false));
    }

    #[test]
    fn empty_string_has_no_pairs() {
        assert!(collect("").unwrap().is_empty());
    }

    #[test]
    fn malformed() {
        assert_eq!(collect("columns=(k,v"), Err(ConfigError::UnbalancedParens { offset: 12 }));
        assert_eq!(collect("a=1)"), Err(ConfigError::UnbalancedParens { offset: 3 }));
        assert_eq!(collect("a=\"x"), Err(ConfigError::UnterminatedQuote { offset: 2 }));
        assert_eq!(collect("a=1,=2"), Err(ConfigError::EmptyKey { offset: 4 }));
        assert!(matches!(
            ConfigString::new("overwrite=maybe").get_bool("overwrite"),
            Err(ConfigError::InvalidBool { .. })
        ));
    }

    #[test]
    fn iteration_stops_after_error() {
        let mut pairs = ConfigString::new("a=1,=2,b=3").pairs();
        assert_eq!(pairs.next(), Some(Ok(("a", "1"))));
        assert!(matches!(pairs.next(), Some(Err(_))));
        assert_eq!(pairs.next(), None);
    }
}
