//! Permission letters and permission sets

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single Artifactory permission letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PermissionLetter {
    /// `m`
    Manage,
    /// `d`
    Delete,
    /// `w`
    Deploy,
    /// `n`
    Annotate,
    /// `r`
    Read,
}

impl PermissionLetter {
    pub const ALL: [PermissionLetter; 5] = [
        PermissionLetter::Manage,
        PermissionLetter::Delete,
        PermissionLetter::Deploy,
        PermissionLetter::Annotate,
        PermissionLetter::Read,
    ];

    pub fn as_char(self) -> char {
        match self {
            PermissionLetter::Manage => 'm',
            PermissionLetter::Delete => 'd',
            PermissionLetter::Deploy => 'w',
            PermissionLetter::Annotate => 'n',
            PermissionLetter::Read => 'r',
        }
    }

    pub fn from_char(c: char) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|letter| letter.as_char() == c)
            .ok_or_else(|| {
                Error::config(format!(
                    "Invalid permission letter '{}': must be one of: m, d, w, n, r",
                    c
                ))
            })
    }
}

impl fmt::Display for PermissionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Ordered, duplicate-free set of permission letters granted to a principal
///
/// The empty set goes over the wire as `[""]`, which is how Artifactory is
/// told a principal holds no permission on the target.
///
/// Equality ignores letter order: `rd` and `dr` grant the same access.
#[derive(Debug, Clone, Default, Eq)]
pub struct PermissionSet(Vec<PermissionLetter>);

impl PartialEq for PermissionSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|letter| other.contains(*letter))
    }
}

impl PermissionSet {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn read_only() -> Self {
        Self(vec![PermissionLetter::Read])
    }

    pub fn from_letters(letters: impl IntoIterator<Item = PermissionLetter>) -> Self {
        let mut set = Self::empty();
        for letter in letters {
            set.insert(letter);
        }
        set
    }

    pub fn insert(&mut self, letter: PermissionLetter) {
        if !self.0.contains(&letter) {
            self.0.push(letter);
        }
    }

    pub fn contains(&self, letter: PermissionLetter) -> bool {
        self.0.contains(&letter)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn letters(&self) -> &[PermissionLetter] {
        &self.0
    }
}

impl FromStr for PermissionSet {
    type Err = Error;

    /// Parse letters such as `rd` or `r,d`
    fn from_str(s: &str) -> Result<Self> {
        let mut set = Self::empty();
        for c in s.chars().filter(|c| !c.is_whitespace() && *c != ',') {
            set.insert(PermissionLetter::from_char(c)?);
        }
        Ok(set)
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for letter in &self.0 {
            write!(f, "{}", letter)?;
        }
        Ok(())
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            let mut seq = serializer.serialize_seq(Some(1))?;
            seq.serialize_element("")?;
            return seq.end();
        }
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for letter in &self.0 {
            seq.serialize_element(&letter.as_char().to_string())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        let mut set = Self::empty();
        for entry in raw.iter().filter(|entry| !entry.is_empty()) {
            let mut chars = entry.chars();
            let letter = match (chars.next(), chars.next()) {
                (Some(c), None) => PermissionLetter::from_char(c).map_err(de::Error::custom)?,
                _ => {
                    return Err(de::Error::custom(format!(
                        "invalid permission entry '{}'",
                        entry
                    )))
                }
            };
            set.insert(letter);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_keeps_order_and_drops_duplicates() {
        let set: PermissionSet = "rdr".parse().unwrap();
        assert_eq!(
            set.letters(),
            &[PermissionLetter::Read, PermissionLetter::Delete]
        );
        assert_eq!(set.to_string(), "rd");
    }

    #[test]
    fn test_equality_ignores_order() {
        let rd: PermissionSet = "rd".parse().unwrap();
        let dr: PermissionSet = "dr".parse().unwrap();
        assert_eq!(rd, dr);
        assert_ne!(rd, "r".parse::<PermissionSet>().unwrap());
        assert_ne!(rd, "rdm".parse::<PermissionSet>().unwrap());
    }

    #[test]
    fn test_parse_accepts_commas() {
        let set: PermissionSet = "m, w".parse().unwrap();
        assert!(set.contains(PermissionLetter::Manage));
        assert!(set.contains(PermissionLetter::Deploy));
    }

    #[test]
    fn test_parse_rejects_unknown_letter() {
        let err = "rx".parse::<PermissionSet>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_empty_set_uses_blank_marker() {
        assert_eq!(serde_json::to_value(PermissionSet::empty()).unwrap(), json!([""]));
        let parsed: PermissionSet = serde_json::from_value(json!([""])).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_wire_format() {
        let set: PermissionSet = "rd".parse().unwrap();
        assert_eq!(serde_json::to_value(&set).unwrap(), json!(["r", "d"]));
    }

    #[test]
    fn test_deserialize_rejects_foreign_letters() {
        assert!(serde_json::from_value::<PermissionSet>(json!(["q"])).is_err());
        assert!(serde_json::from_value::<PermissionSet>(json!(["rd"])).is_err());
    }
}
