use crate::error::Result;
use crate::shape::classify::{classify_key, KeyClass};
use crate::types::{Element, ElementStart, Field, Mapping, Record, ShapeConfig};
use tracing::{debug, warn};

pub const TYPE_KEY: &str = "__type__";
pub const CREATED_KEY: &str = "created";
pub const POSITION_KEY: &str = "pos";
pub const NODES_KEY: &str = "nodes";
pub const PROBLEM_TAGS_KEY: &str = "problem_tags";

const ENTITY_DEPTH: usize = 1;
const CHILD_DEPTH: usize = ENTITY_DEPTH + 1;

/// Folds a stream of element-start events into one record per top-level entity
pub struct RecordShaper<I> {
    events: I,
    config: ShapeConfig,
    current: Option<RecordBuilder>,
    ignored_top_level: u64,
    finished: bool,
}

impl<I> RecordShaper<I>
where
    I: Iterator<Item = Result<ElementStart>>,
{
    pub fn new(events: I, config: ShapeConfig) -> Self {
        RecordShaper {
            events,
            config,
            current: None,
            ignored_top_level: 0,
            finished: false,
        }
    }

    /// Top-level elements skipped because their tag is not an entity tag
    pub fn ignored_top_level(&self) -> u64 {
        self.ignored_top_level
    }

    /// Handle one event; returns the record closed by it, if any
    fn accept(&mut self, event: ElementStart) -> Option<Record> {
        let ElementStart { depth, element } = event;

        if depth > CHILD_DEPTH {
            return None;
        }

        if depth == CHILD_DEPTH {
            if let Some(builder) = self.current.as_mut() {
                builder.fold_child(&element, &self.config);
            }
            return None;
        }

        // depth 0 or 1: whatever is open is complete
        let finished = self.current.take().map(RecordBuilder::finish);

        if depth == ENTITY_DEPTH {
            if self.config.is_entity(&element.tag) {
                self.current = Some(RecordBuilder::open(element, &self.config));
            } else {
                debug!(tag = %element.tag, "skipping top-level element");
                self.ignored_top_level += 1;
            }
        }

        finished
    }
}

impl<I> Iterator for RecordShaper<I>
where
    I: Iterator<Item = Result<ElementStart>>,
{
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.events.next() {
                Some(Ok(event)) => {
                    if let Some(record) = self.accept(event) {
                        return Some(Ok(record));
                    }
                }
                Some(Err(e)) => {
                    // the open entity is incomplete and never emitted
                    self.current = None;
                    self.finished = true;
                    return Some(Err(e));
                }
                None => {
                    self.finished = true;
                    return self.current.take().map(|builder| Ok(builder.finish()));
                }
            }
        }
    }
}

/// Accumulator for a single open entity
#[derive(Debug)]
struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    fn open(entity: Element, config: &ShapeConfig) -> Self {
        let mut record = Record::new();
        record.insert(TYPE_KEY, Field::Scalar(entity.tag));

        for (name, value) in entity.attributes {
            if config.provenance_attrs.contains(&name) {
                mapping_slot(&mut record, CREATED_KEY).insert(Some(name), Field::Scalar(value));
            } else if config.position_attrs.contains(&name) {
                mapping_slot(&mut record, POSITION_KEY).insert(Some(name), Field::Scalar(value));
            } else {
                record.insert(&name, Field::Scalar(value));
            }
        }

        RecordBuilder { record }
    }

    fn fold_child(&mut self, child: &Element, config: &ShapeConfig) {
        if child.tag == config.attribute_tag {
            match (child.attribute("k"), child.attribute("v")) {
                (Some(key), Some(value)) => self.apply_pair(key, value),
                _ => warn!(tag = %child.tag, "attribute child without k/v, ignoring"),
            }
        } else if child.tag == config.reference_tag {
            match child.attribute("ref") {
                Some(reference) => self.append_reference(reference),
                None => warn!(tag = %child.tag, "reference child without ref, ignoring"),
            }
        }
    }

    fn apply_pair(&mut self, key: &str, value: &str) {
        match classify_key(key) {
            KeyClass::Plain => {
                self.record.insert(key, Field::scalar(value));
            }
            KeyClass::Namespaced { prefix, suffix } => {
                mapping_slot(&mut self.record, prefix)
                    .insert(Some(suffix.to_string()), Field::scalar(value));
            }
            KeyClass::Problematic => {
                mapping_slot(&mut self.record, PROBLEM_TAGS_KEY)
                    .insert(Some(key.to_string()), Field::scalar(value));
            }
        }
    }

    fn append_reference(&mut self, reference: &str) {
        self.record
            .get_or_insert_with(NODES_KEY, || Field::List(Vec::new()))
            .reset_to_list()
            .push(reference.to_string());
    }

    fn finish(self) -> Record {
        self.record
    }
}

/// The mapping stored under `key`, created empty when absent and promoted
/// (keeping the old value under the unkeyed slot) when it holds anything else
fn mapping_slot<'r>(record: &'r mut Record, key: &str) -> &'r mut Mapping {
    record
        .get_or_insert_with(key, || Field::Mapping(Mapping::default()))
        .promote_to_mapping()
}
