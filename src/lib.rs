//! # osm-shaper - streaming XML map export to JSON lines
//!
//! Turns a large OpenStreetMap-style XML export into newline-delimited JSON,
//! one record per top-level entity, without holding the document in memory.
//!
//! ## Modules
//!
//! - **reader**: bounded, forward-only element-start event stream
//! - **shape**: key classification, record folding and the JSON-lines sink
//! - **audit**: tag and attribute tallies over the same event stream
//!
//! ## Quick Start
//!
//! ```rust
//! use osm_shaper::{shape_stream, ShapeConfig, SinkConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let xml = r#"<osm>
//!   <node id="1" lat="59.9" lon="10.7" user="kari">
//!     <tag k="addr:city" v="Oslo"/>
//!   </node>
//! </osm>"#;
//!
//! let mut output = Vec::new();
//! let summary = shape_stream(xml.as_bytes(), &mut output, &ShapeConfig::default(), &SinkConfig::default())?;
//!
//! assert_eq!(summary.records_written, 1);
//! // {"__type__":"node","id":"1","pos":{"lat":"59.9","lon":"10.7"},"created":{"user":"kari"},"addr":{"city":"Oslo"}}
//! # Ok(())
//! # }
//! ```

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod audit;
pub mod error;
pub mod logging;
pub mod reader;
pub mod shape;
pub mod types;

pub use error::{Result, TransformError};
pub use reader::TreeReader;
pub use shape::{classify_key, read_json_lines, KeyClass, RecordShaper, RecordSink};
pub use types::{Element, ElementStart, Field, Mapping, Record, ShapeConfig, SinkConfig};

/// Outcome of one transform run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeSummary {
    pub records_written: u64,
    pub ignored_top_level: u64,
    pub output: Option<PathBuf>,
}

/// Output location for an input file: the full input path with `.json` appended
pub fn output_path_for<P: AsRef<Path>>(input: P) -> PathBuf {
    let mut path = OsString::from(input.as_ref().as_os_str());
    path.push(".json");
    PathBuf::from(path)
}

/// Main entry point: shape an XML stream into JSON lines
pub fn shape_stream<R: BufRead, W: Write>(
    input: R,
    output: W,
    shape_config: &ShapeConfig,
    sink_config: &SinkConfig,
) -> Result<ShapeSummary> {
    let mut shaper = RecordShaper::new(TreeReader::new(input), shape_config.clone());
    let mut sink = RecordSink::new(output, sink_config.clone());

    for record in shaper.by_ref() {
        sink.write_record(&record?)?;
    }

    let records_written = sink.finish()?;
    Ok(ShapeSummary {
        records_written,
        ignored_top_level: shaper.ignored_top_level(),
        output: None,
    })
}

/// Shape the file at `input` into `<input>.json`. Both files are open only
/// for the duration of the call.
pub fn shape_file<P: AsRef<Path>>(
    input: P,
    shape_config: &ShapeConfig,
    sink_config: &SinkConfig,
) -> Result<ShapeSummary> {
    let input = input.as_ref();
    let output_path = output_path_for(input);

    let source = File::open(input).map_err(|source| TransformError::Open {
        path: input.to_path_buf(),
        source,
    })?;
    let file = File::create(&output_path).map_err(|source| TransformError::Open {
        path: output_path.clone(),
        source,
    })?;

    info!(input = %input.display(), output = %output_path.display(), "shaping");

    let summary = shape_stream(BufReader::new(source), BufWriter::new(file), shape_config, sink_config)?;

    info!(
        records = summary.records_written,
        ignored = summary.ignored_top_level,
        "entities processed"
    );

    Ok(ShapeSummary {
        output: Some(output_path),
        ..summary
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_appends_suffix() {
        assert_eq!(output_path_for("maps/oslo.osm"), PathBuf::from("maps/oslo.osm.json"));
        assert_eq!(output_path_for("export"), PathBuf::from("export.json"));
    }

    #[test]
    fn test_basic_shaping() {
        let xml = r#"<osm><node id="1"/><way id="2"><nd ref="1"/></way></osm>"#;
        let mut output = Vec::new();

        let summary =
            shape_stream(xml.as_bytes(), &mut output, &ShapeConfig::default(), &SinkConfig::default())
                .unwrap();

        assert_eq!(summary.records_written, 2);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "{\"__type__\":\"node\",\"id\":\"1\"}\n{\"__type__\":\"way\",\"id\":\"2\",\"nodes\":[\"1\"]}\n"
        );
    }
}
