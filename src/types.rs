use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::num::NonZeroU64;

/// JSON key used for the "no subkey" slot of a [`Mapping`]
pub const UNKEYED_SLOT: &str = "null";

/// An element as seen by the reader: tag name plus attributes in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// First value of the named attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// One element-start event. The document root sits at depth 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementStart {
    pub depth: usize,
    pub element: Element,
}

/// A record value. Promotion from `Scalar`/`List` to `Mapping` goes through
/// [`Field::promote_to_mapping`] so the displaced value is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Scalar(String),
    List(Vec<String>),
    Mapping(Mapping),
}

impl Default for Field {
    fn default() -> Self {
        Field::Mapping(Mapping::default())
    }
}

impl Field {
    pub fn scalar(value: impl Into<String>) -> Self {
        Field::Scalar(value.into())
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Field::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Field::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Field::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Turn this field into a mapping in place. A non-mapping value moves to
    /// the unkeyed slot of the new mapping.
    pub fn promote_to_mapping(&mut self) -> &mut Mapping {
        if !matches!(self, Field::Mapping(_)) {
            let displaced = std::mem::take(self);
            let mut mapping = Mapping::default();
            mapping.insert(None, displaced);
            *self = Field::Mapping(mapping);
        }
        match self {
            Field::Mapping(mapping) => mapping,
            _ => unreachable!("field was promoted to a mapping above"),
        }
    }

    /// Turn this field into a list in place, dropping any non-list value
    pub fn reset_to_list(&mut self) -> &mut Vec<String> {
        if !matches!(self, Field::List(_)) {
            *self = Field::List(Vec::new());
        }
        match self {
            Field::List(items) => items,
            _ => unreachable!("field was reset to a list above"),
        }
    }
}

/// Ordered subkey -> value mapping. `None` is the unkeyed slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(Option<String>, Field)>,
}

impl Mapping {
    /// Insert or overwrite; an existing subkey keeps its position
    pub fn insert(&mut self, subkey: Option<String>, value: Field) {
        match self.entries.iter_mut().find(|(key, _)| *key == subkey) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((subkey, value)),
        }
    }

    pub fn get(&self, subkey: Option<&str>) -> Option<&Field> {
        self.entries
            .iter()
            .find(|(key, _)| key.as_deref() == subkey)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &Field)> {
        self.entries.iter().map(|(key, value)| (key.as_deref(), value))
    }
}

/// The output unit: one per top-level entity, keys in first-insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Field)>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Insert or overwrite; an existing key keeps its position
    pub fn insert(&mut self, key: &str, value: Field) {
        match self.position(key) {
            Some(idx) => self.fields[idx].1 = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    /// Mutable access to `key`, creating it with `init` when absent
    pub fn get_or_insert_with(&mut self, key: &str, init: impl FnOnce() -> Field) -> &mut Field {
        let idx = match self.position(key) {
            Some(idx) => idx,
            None => {
                self.fields.push((key.to_string(), init()));
                self.fields.len() - 1
            }
        };
        &mut self.fields[idx].1
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|(k, _)| k == key)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Scalar(value) => serializer.serialize_str(value),
            Field::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Field::Mapping(mapping) => mapping.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.as_deref().unwrap_or(UNKEYED_SLOT), value)?;
        }
        map.end()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Configuration for shaping entities into records
#[derive(Debug, Clone)]
pub struct ShapeConfig {
    /// Top-level tags that each produce one record
    pub entity_tags: Vec<String>,

    /// Child tag carrying a `k`/`v` pair
    pub attribute_tag: String,

    /// Child tag carrying a single `ref`
    pub reference_tag: String,

    /// Entity attributes grouped under `created`
    pub provenance_attrs: Vec<String>,

    /// Entity attributes grouped under `pos`
    pub position_attrs: Vec<String>,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        ShapeConfig {
            entity_tags: vec![String::from("node"), String::from("way")],
            attribute_tag: String::from("tag"),
            reference_tag: String::from("nd"),
            provenance_attrs: ["version", "changeset", "timestamp", "user", "uid"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            position_attrs: vec![String::from("lat"), String::from("lon")],
        }
    }
}

impl ShapeConfig {
    pub fn is_entity(&self, tag: &str) -> bool {
        self.entity_tags.iter().any(|t| t == tag)
    }
}

/// Configuration for the record sink
#[derive(Debug, Clone, Default)]
pub struct SinkConfig {
    /// Emit a progress event every N records
    pub progress_interval: Option<NonZeroU64>,
}

impl SinkConfig {
    pub fn with_progress_interval(interval: u64) -> Self {
        SinkConfig {
            progress_interval: NonZeroU64::new(interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promote_keeps_scalar_under_unkeyed_slot() {
        let mut field = Field::scalar("X");
        field.promote_to_mapping().insert(Some("city".into()), Field::scalar("Oslo"));

        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#"{"null":"X","city":"Oslo"}"#);
    }

    #[test]
    fn test_promote_mapping_is_noop() {
        let mut field = Field::Mapping(Mapping::default());
        field.promote_to_mapping().insert(Some("a".into()), Field::scalar("1"));
        let mapping = field.as_mapping().unwrap();
        assert_eq!(mapping.len(), 1);
        assert!(mapping.get(None).is_none());
    }

    #[test]
    fn test_record_overwrite_keeps_position() {
        let mut record = Record::new();
        record.insert("a", Field::scalar("1"));
        record.insert("b", Field::scalar("2"));
        record.insert("a", Field::scalar("3"));

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"a":"3","b":"2"}"#);
    }

    #[test]
    fn test_mapping_iter_in_insertion_order() {
        let mut mapping = Mapping::default();
        mapping.insert(Some("b".into()), Field::scalar("1"));
        mapping.insert(None, Field::List(vec!["x".into()]));
        mapping.insert(Some("b".into()), Field::scalar("2"));

        let entries: Vec<_> = mapping.iter().collect();
        assert_eq!(
            entries,
            vec![(Some("b"), &Field::scalar("2")), (None, &Field::List(vec!["x".into()]))]
        );
    }

    #[test]
    fn test_element_attribute_lookup() {
        let element = Element::new("tag").with_attribute("k", "name").with_attribute("v", "Oslo");
        assert_eq!(element.attribute("v"), Some("Oslo"));
        assert_eq!(element.attribute("ref"), None);
    }

    #[test]
    fn test_reset_to_list_drops_placeholder() {
        let mut field = Field::scalar("placeholder");
        field.reset_to_list().push("1".into());
        assert_eq!(field.as_list().unwrap(), ["1".to_string()]);
    }
}
