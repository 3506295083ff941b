//! Key and value encodings understood by the bounded cursor.

use crate::{
    config::ConfigString,
    error::{CursorError, CursorResult},
};

/// Engine default for both `key_format` and `value_format`.
pub const DEFAULT_FORMAT: &str = "u";

/// How keys are encoded in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFormat {
    /// Raw byte strings (`u`).
    Bytes,
    /// NUL-terminated strings (`S`). The terminator is not part of the key
    /// as seen by ranges and comparisons.
    String,
}

/// How values are encoded in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueFormat {
    /// Raw byte strings (`u`).
    Bytes,
    /// No value column. Used by key-only tables such as indexes.
    None,
}

/// A table's key and value encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Schema {
    key: KeyFormat,
    value: ValueFormat,
}

impl Schema {
    /// Raw-byte keys and values.
    pub const BYTES: Self = Self { key: KeyFormat::Bytes, value: ValueFormat::Bytes };

    /// Raw-byte keys with no value.
    pub const KEY_ONLY: Self = Self { key: KeyFormat::Bytes, value: ValueFormat::None };

    /// Create a schema.
    pub const fn new(key: KeyFormat, value: ValueFormat) -> Self {
        Self { key, value }
    }

    /// Interpret the engine's format strings for the table at `uri`.
    ///
    /// Anything other than `u`/`S` keys with `u`/empty values is a
    /// [`CursorError::SchemaMismatch`].
    pub fn from_formats(uri: &str, key_format: &str, value_format: &str) -> CursorResult<Self> {
        let key = match key_format {
            "u" => Some(KeyFormat::Bytes),
            "S" => Some(KeyFormat::String),
            _ => None,
        };
        let value = match value_format {
            "u" => Some(ValueFormat::Bytes),
            "" => Some(ValueFormat::None),
            _ => None,
        };
        match (key, value) {
            (Some(key), Some(value)) => Ok(Self { key, value }),
            _ => Err(CursorError::SchemaMismatch {
                uri: uri.to_owned(),
                key_format: key_format.to_owned(),
                value_format: value_format.to_owned(),
            }),
        }
    }

    /// Read `key_format` and `value_format` from a table configuration
    /// string, applying the engine defaults for missing entries.
    pub fn from_config(uri: &str, config: &str) -> CursorResult<Self> {
        let (key_format, value_format) = formats_from_config(config)?;
        Self::from_formats(uri, key_format, value_format)
    }

    /// The key encoding.
    pub const fn key(&self) -> KeyFormat {
        self.key
    }

    /// The value encoding.
    pub const fn value(&self) -> ValueFormat {
        self.value
    }

    /// True if the table has no value column.
    pub const fn is_key_only(&self) -> bool {
        matches!(self.value, ValueFormat::None)
    }
}

/// Extract the raw `(key_format, value_format)` strings from a table
/// configuration string, defaulting each to `u`.
pub fn formats_from_config(config: &str) -> CursorResult<(&str, &str)> {
    let config = ConfigString::new(config);
    let key_format = config.get("key_format")?.unwrap_or(DEFAULT_FORMAT);
    let value_format = config.get("value_format")?.unwrap_or(DEFAULT_FORMAT);
    Ok((key_format, value_format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_formats() {
        assert_eq!(Schema::from_formats("table:a", "u", "u").unwrap(), Schema::BYTES);
        assert_eq!(Schema::from_formats("table:a", "u", "").unwrap(), Schema::KEY_ONLY);
        let s = Schema::from_formats("table:a", "S", "u").unwrap();
        assert_eq!(s.key(), KeyFormat::String);
        assert!(!s.is_key_only());
    }

    #[test]
    fn rejected_formats() {
        for (k, v) in [("r", "u"), ("u", "S"), ("Q", ""), ("u", "uu"), ("", "u")] {
            let err = Schema::from_formats("table:bad", k, v).unwrap_err();
            assert!(
                matches!(&err, CursorError::SchemaMismatch { uri, .. } if uri == "table:bad"),
                "{k}/{v}: {err}"
            );
        }
    }

    #[test]
    fn config_defaults() {
        assert_eq!(Schema::from_config("table:a", "").unwrap(), Schema::BYTES);
        assert_eq!(Schema::from_config("table:a", "value_format=").unwrap(), Schema::KEY_ONLY);
        assert_eq!(
            Schema::from_config("table:a", "key_format=S,columns=(k,v)").unwrap().key(),
            KeyFormat::String
        );
    }

    #[test]
    fn config_errors_propagate() {
        assert!(matches!(
            Schema::from_config("table:a", "key_format=(u"),
            Err(CursorError::Config(_))
        ));
    }
}
