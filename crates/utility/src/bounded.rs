use std::{fmt, ops::Deref};

use schemars::{
    gen::SchemaGenerator,
    schema::{InstanceType, Schema, SchemaObject, StringValidation},
    JsonSchema,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("{len} characters exceed the limit of {max}")]
pub struct TooLong {
    pub len: usize,
    pub max: usize,
}

/// A string of at most `MAX` characters, matching a `VARCHAR(MAX)` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoundedString<const MAX: usize>(String);

impl<const MAX: usize> BoundedString<MAX> {
    pub fn new(value: impl Into<String>) -> Result<Self, TooLong> {
        let value = value.into();
        let len = value.chars().count();
        if len > MAX {
            return Err(TooLong { len, max: MAX });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<const MAX: usize> TryFrom<String> for BoundedString<MAX> {
    type Error = TooLong;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<const MAX: usize> TryFrom<&str> for BoundedString<MAX> {
    type Error = TooLong;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<const MAX: usize> From<BoundedString<MAX>> for String {
    fn from(value: BoundedString<MAX>) -> Self {
        value.0
    }
}

impl<const MAX: usize> AsRef<str> for BoundedString<MAX> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<const MAX: usize> Deref for BoundedString<MAX> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const MAX: usize> fmt::Display for BoundedString<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const MAX: usize> JsonSchema for BoundedString<MAX> {
    fn schema_name() -> String {
        format!("BoundedString{}", MAX)
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            string: Some(Box::new(StringValidation {
                max_length: Some(MAX as u32),
                ..Default::default()
            })),
            ..Default::default()
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_counts_characters() {
        assert!(BoundedString::<3>::new("abc").is_ok());
        assert!(BoundedString::<3>::new("äöü").is_ok());
        assert!(BoundedString::<3>::new("abcd").is_err());
    }

    #[test]
    fn test_deserialize_enforces_limit() {
        let ok: BoundedString<6> = serde_json::from_str("\"100\"").unwrap();
        assert_eq!(ok.as_str(), "100");
        assert!(serde_json::from_str::<BoundedString<6>>("\"1234567\"").is_err());
    }
}
