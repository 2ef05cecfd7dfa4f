//! Record shaping - fold top-level entities into flat JSON records
//!
//! Entities arrive as a stream of element-start events from
//! [`crate::reader::TreeReader`]. Each entity's direct children are folded
//! into one [`Record`](crate::types::Record) through key classification:
//! plain keys stay flat, `prefix:suffix` keys nest under `prefix`, and
//! anything else is quarantined under `problem_tags`.

pub mod classify;
pub mod shaper;
pub mod writer;

pub use classify::{classify_key, KeyClass};
pub use shaper::RecordShaper;
pub use writer::{read_json_lines, RecordSink};
