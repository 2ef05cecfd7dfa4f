//! Tag and attribute tallies, for exploring an unfamiliar export before
//! shaping it. Runs over the same bounded reader as the transform.

use crate::error::Result;
use crate::reader::TreeReader;
use std::collections::BTreeMap;
use std::io::BufRead;

/// Occurrences of every element tag
pub fn count_tags<R: BufRead>(source: R) -> Result<BTreeMap<String, u64>> {
    let mut counts = BTreeMap::new();
    for event in TreeReader::new(source) {
        *counts.entry(event?.element.tag).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Occurrences of every attribute name, across all elements
pub fn count_attrs<R: BufRead>(source: R) -> Result<BTreeMap<String, u64>> {
    let mut counts = BTreeMap::new();
    for event in TreeReader::new(source) {
        for (name, _) in event?.element.attributes {
            *counts.entry(name).or_insert(0) += 1;
        }
    }
    Ok(counts)
}
