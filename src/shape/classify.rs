//! Attribute key classification

use once_cell::sync::Lazy;
use regex::Regex;

static PLAIN_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_]+$").unwrap()
});

static NAMESPACED_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_]+):([A-Za-z_]+)$").unwrap()
});

/// Where an attribute-child key belongs in a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass<'a> {
    /// Letters and underscores only
    Plain,
    /// `prefix:suffix`, each part letters and underscores only
    Namespaced { prefix: &'a str, suffix: &'a str },
    /// Anything else; quarantined under `problem_tags`
    Problematic,
}

/// Classify a key. Every key gets exactly one class.
pub fn classify_key(key: &str) -> KeyClass<'_> {
    if PLAIN_KEY_REGEX.is_match(key) {
        return KeyClass::Plain;
    }

    if let Some(caps) = NAMESPACED_KEY_REGEX.captures(key) {
        if let (Some(prefix), Some(suffix)) = (caps.get(1), caps.get(2)) {
            return KeyClass::Namespaced {
                prefix: prefix.as_str(),
                suffix: suffix.as_str(),
            };
        }
    }

    KeyClass::Problematic
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_keys() {
        assert_eq!(classify_key("name"), KeyClass::Plain);
        assert_eq!(classify_key("building_levels"), KeyClass::Plain);
        assert_eq!(classify_key("Name"), KeyClass::Plain);
    }

    #[test]
    fn test_namespaced_keys() {
        assert_eq!(
            classify_key("addr:city"),
            KeyClass::Namespaced { prefix: "addr", suffix: "city" }
        );
        assert_eq!(
            classify_key("is_in:country"),
            KeyClass::Namespaced { prefix: "is_in", suffix: "country" }
        );
    }

    #[test]
    fn test_problematic_keys() {
        for key in [
            "",
            "addr:street:name",
            "addr:",
            ":city",
            "name 1",
            "fixme?",
            "source.url",
            "ref2",
            "a=b",
            "tab\there",
        ] {
            assert_eq!(classify_key(key), KeyClass::Problematic, "key {:?}", key);
        }
    }

    proptest! {
        #[test]
        fn prop_classification_is_total_and_exclusive(key in "\\PC{0,12}") {
            let plain = PLAIN_KEY_REGEX.is_match(&key);
            let namespaced = NAMESPACED_KEY_REGEX.is_match(&key);
            prop_assert!(!(plain && namespaced));

            match classify_key(&key) {
                KeyClass::Plain => prop_assert!(plain),
                KeyClass::Namespaced { prefix, suffix } => {
                    prop_assert!(namespaced);
                    prop_assert_eq!(format!("{}:{}", prefix, suffix), key.clone());
                }
                KeyClass::Problematic => prop_assert!(!plain && !namespaced),
            }
        }

        #[test]
        fn prop_letter_keys_are_plain(key in "[a-z_]{1,16}") {
            prop_assert_eq!(classify_key(&key), KeyClass::Plain);
        }
    }
}
