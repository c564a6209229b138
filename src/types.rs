//! Shared option model used across html2pdf.
//! `OptionSet` is an insertion-ordered mapping of renderer flags to `OptionValue`s and
//! backs global, cover, page and table-of-contents options alike.
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::error::{Error, Result};

/// Key of one `OptionSet` entry.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum OptionKey {
    /// A flag name such as `--zoom`, emitted verbatim.
    Named(String),
    /// A bare token inserted as a plain list element rather than name -> value.
    Positional(usize),
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKey::Named(name) => write!(f, "{}", name),
            OptionKey::Positional(index) => write!(f, "#{}", index),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum OptionValue {
    /// Valueless flag, e.g. `--quiet`.
    #[default]
    Flag,
    Single(String),
    /// Emitted as `name v1 name v2 ...`.
    List(Vec<String>),
}

impl OptionValue {
    pub fn is_flag(&self) -> bool {
        matches!(self, OptionValue::Flag)
    }

    /// All values carried by this entry, in emission order.
    pub fn values(&self) -> &[String] {
        match self {
            OptionValue::Flag => &[],
            OptionValue::Single(value) => std::slice::from_ref(value),
            OptionValue::List(values) => values,
        }
    }

    fn into_values(self) -> Vec<String> {
        match self {
            OptionValue::Flag => Vec::new(),
            OptionValue::Single(value) => vec![value],
            OptionValue::List(values) => values,
        }
    }

    /// Array-merge of two values stored under the same name.
    ///
    /// A valued side always beats a bare flag; two valued sides are concatenated into a
    /// list, scalars included, so `--x a` merged with `--x b` is emitted twice.
    fn merge(self, incoming: OptionValue) -> OptionValue {
        match (self, incoming) {
            (OptionValue::Flag, OptionValue::Flag) => OptionValue::Flag,
            (OptionValue::Flag, incoming) => incoming,
            (existing, OptionValue::Flag) => existing,
            (existing, incoming) => {
                let mut values = existing.into_values();
                values.extend(incoming.into_values());
                OptionValue::List(values)
            }
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Single(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Single(value)
    }
}

impl From<Option<&str>> for OptionValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(OptionValue::Flag, OptionValue::from)
    }
}

impl From<Option<String>> for OptionValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(OptionValue::Flag, OptionValue::Single)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(values: Vec<String>) -> Self {
        OptionValue::List(values)
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(values: Vec<&str>) -> Self {
        OptionValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OptionValue {
    fn from(values: [&str; N]) -> Self {
        OptionValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Ordered mapping from option name to value(s).
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct OptionSet {
    entries: Vec<(OptionKey, OptionValue)>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites `name`, keeping its position if it is already present.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> &mut Self {
        let key = OptionKey::Named(name.into());
        let value = value.into();
        match self.position(&key) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn set_flag(&mut self, name: impl Into<String>) -> &mut Self {
        self.set(name, OptionValue::Flag)
    }

    /// Appends a positional (unnamed) token.
    pub fn push(&mut self, value: impl Into<String>) -> &mut Self {
        let index = self.next_index();
        self.entries
            .push((OptionKey::Positional(index), OptionValue::Single(value.into())));
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>) -> Self {
        self.set_flag(name);
        self
    }

    pub fn with_positional(mut self, value: impl Into<String>) -> Self {
        self.push(value);
        self
    }

    /// Merges `other` into `self` with array-merge semantics.
    ///
    /// New names are appended, positional entries are appended and renumbered, and
    /// colliding names are combined by [`OptionValue`]'s merge rule instead of being
    /// overwritten.
    pub fn merge(&mut self, other: OptionSet) -> &mut Self {
        for (key, value) in other.entries {
            match key {
                OptionKey::Positional(_) => {
                    let index = self.next_index();
                    self.entries.push((OptionKey::Positional(index), value));
                }
                named => match self.position(&named) {
                    Some(index) => {
                        let existing = std::mem::take(&mut self.entries[index].1);
                        self.entries[index].1 = existing.merge(value);
                    }
                    None => self.entries.push((named, value)),
                },
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.iter().find_map(|(key, value)| match key {
            OptionKey::Named(n) if n == name => Some(value),
            _ => None,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OptionKey, &OptionValue)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Rejects names and values the renderer could never receive as arguments.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in &self.entries {
            match key {
                OptionKey::Named(name) => validate_entry(name, value)?,
                OptionKey::Positional(_) => {
                    for v in value.values() {
                        check_token(v, "positional option")?;
                    }
                }
            }
        }
        Ok(())
    }

    fn position(&self, key: &OptionKey) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn next_index(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|(key, _)| match key {
                OptionKey::Positional(index) => Some(index + 1),
                OptionKey::Named(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

/// Validates one named entry before it is stored.
pub(crate) fn validate_entry(name: &str, value: &OptionValue) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid("option name must not be empty"));
    }
    check_token(name, "option name")?;
    for v in value.values() {
        check_token(v, &format!("value of option {}", name))?;
    }
    Ok(())
}

/// Ensures `token` can be passed to a child process as one argument.
pub(crate) fn check_token(token: &str, what: &str) -> Result<()> {
    if token.contains('\0') {
        return Err(Error::invalid(format!("{} contains a NUL byte", what)));
    }
    Ok(())
}

impl<K, V> FromIterator<(K, V)> for OptionSet
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = OptionSet::new();
        for (name, value) in iter {
            set.set(name, value);
        }
        set
    }
}

// JSON job files: objects map to named entries in document order, arrays to positional
// entries. `null` is a bare flag, numbers are stringified.

struct ScalarString(String);

impl<'de> Deserialize<'de> for ScalarString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = ScalarString;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
                Ok(ScalarString(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

impl<'de> Deserialize<'de> for OptionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = OptionValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("null, a string, a number or a list of strings")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Flag)
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Flag)
            }

            fn visit_some<D: Deserializer<'de>>(
                self,
                deserializer: D,
            ) -> std::result::Result<Self::Value, D::Error> {
                deserializer.deserialize_any(ValueVisitor)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Single(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Single(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Single(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Single(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
                Ok(OptionValue::Single(v.to_string()))
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut values = Vec::new();
                while let Some(ScalarString(v)) = seq.next_element()? {
                    values.push(v);
                }
                Ok(OptionValue::List(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for OptionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = OptionSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of options or a list of bare tokens")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(OptionSet::new())
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut set = OptionSet::new();
                while let Some((name, value)) = map.next_entry::<String, OptionValue>()? {
                    set.set(name, value);
                }
                Ok(set)
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut set = OptionSet::new();
                while let Some(ScalarString(v)) = seq.next_element()? {
                    set.push(v);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_any(SetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_in_place() {
        let mut set = OptionSet::new();
        set.set("--a", "1").set("--b", "2").set("--a", "3");

        let keys: Vec<String> = set.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["--a", "--b"]);
        assert_eq!(set.get("--a"), Some(&OptionValue::Single("3".into())));
    }

    #[test]
    fn merge_concatenates_lists() {
        let mut set = OptionSet::new().with("--x", ["1"]);
        set.merge(OptionSet::new().with("--x", ["2"]));
        assert_eq!(set.get("--x"), Some(&OptionValue::from(["1", "2"])));
    }

    #[test]
    fn merge_of_two_scalars_becomes_list() {
        let mut set = OptionSet::new().with("--x", "1");
        set.merge(OptionSet::new().with("--x", "2"));
        assert_eq!(set.get("--x"), Some(&OptionValue::from(["1", "2"])));

        let mut set = OptionSet::new().with("--x", ["1", "2"]);
        set.merge(OptionSet::new().with("--x", "3"));
        assert_eq!(set.get("--x"), Some(&OptionValue::from(["1", "2", "3"])));
    }

    #[test]
    fn merge_prefers_values_over_flags() {
        let mut set = OptionSet::new().with_flag("--quiet").with_flag("--f");
        set.merge(
            OptionSet::new()
                .with_flag("--quiet")
                .with("--f", "v")
                .with("--new", "n"),
        );
        assert_eq!(set.get("--quiet"), Some(&OptionValue::Flag));
        assert_eq!(set.get("--f"), Some(&OptionValue::Single("v".into())));

        let mut set = OptionSet::new().with("--g", "kept");
        set.merge(OptionSet::new().with_flag("--g"));
        assert_eq!(set.get("--g"), Some(&OptionValue::Single("kept".into())));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn merge_appends_and_renumbers_positionals() {
        let mut set = OptionSet::new().with_positional("toc");
        set.merge(OptionSet::new().with_positional("a").with_positional("b"));
        let keys: Vec<&OptionKey> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                &OptionKey::Positional(0),
                &OptionKey::Positional(1),
                &OptionKey::Positional(2)
            ]
        );
    }

    #[test]
    fn deserializes_objects_in_document_order() {
        let set: OptionSet =
            serde_json::from_str(r#"{"--zoom": 1.5, "--quiet": null, "--cookie": ["a", "b"]}"#)
                .unwrap();
        let entries: Vec<(String, OptionValue)> = set
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("--zoom".to_string(), OptionValue::Single("1.5".into())),
                ("--quiet".to_string(), OptionValue::Flag),
                ("--cookie".to_string(), OptionValue::from(["a", "b"])),
            ]
        );

        let positional: OptionSet = serde_json::from_str(r#"["toc", 3]"#).unwrap();
        assert_eq!(positional, OptionSet::new().with_positional("toc").with_positional("3"));
    }

    #[test]
    fn rejects_boolean_values() {
        let err = serde_json::from_str::<OptionSet>(r#"{"--grayscale": true}"#);
        assert!(err.is_err());
    }

    #[test]
    fn validate_rejects_nul_and_empty_names() {
        assert!(OptionSet::new().with("--a", "ok").validate().is_ok());
        assert!(matches!(
            OptionSet::new().with("--a", "bad\0").validate(),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            OptionSet::new().with_flag("").validate(),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
