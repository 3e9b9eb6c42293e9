//! Class label table.

use crate::trace::{trace_event, trace_span};
use crate::util::{SsdDecodeError, SsdDecodeResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Ordered class names indexed by class id.
///
/// Index 0 is the background class by convention and is never emitted as a
/// detection, but it still occupies a line in the resource.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelTable {
    labels: Vec<Arc<str>>,
}

impl LabelTable {
    /// Loads `label_count` labels from a newline-delimited text file.
    pub fn load<P: AsRef<Path>>(path: P, label_count: usize) -> SsdDecodeResult<Self> {
        let path = path.as_ref();
        let _span = trace_span!("load_labels", path = %path.display()).entered();
        let file = File::open(path).map_err(|err| SsdDecodeError::io(path, &err))?;
        Self::parse(BufReader::new(file), label_count, path)
    }

    /// Parses `label_count` labels from a buffered reader.
    ///
    /// Lines beyond `label_count` are ignored.
    pub fn from_reader<R: BufRead>(reader: R, label_count: usize) -> SsdDecodeResult<Self> {
        Self::parse(reader, label_count, Path::new("<reader>"))
    }

    /// Builds a table directly from label strings.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    fn parse<R: BufRead>(reader: R, label_count: usize, source: &Path) -> SsdDecodeResult<Self> {
        let mut labels = Vec::with_capacity(label_count);
        for line in reader.lines().take(label_count) {
            let line = line.map_err(|err| SsdDecodeError::io(source, &err))?;
            labels.push(Arc::from(line.as_str()));
        }
        if labels.len() < label_count {
            return Err(SsdDecodeError::MissingLabels {
                expected: label_count,
                got: labels.len(),
            });
        }
        trace_event!("labels_loaded", count = labels.len());
        Ok(Self { labels })
    }

    /// Returns the label for `class_id`.
    pub fn get(&self, class_id: usize) -> Option<&Arc<str>> {
        self.labels.get(class_id)
    }

    /// Number of labels, background included.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true when the table holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[Arc<str>] {
        &self.labels
    }

    /// Iterates labels in class-id order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| &**label)
    }
}

#[cfg(test)]
mod tests {
    use super::LabelTable;
    use crate::util::SsdDecodeError;

    #[test]
    fn keeps_empty_lines_and_strips_crlf() {
        let table = LabelTable::from_reader("???\r\nperson\r\n\r\ncar\n".as_bytes(), 4).unwrap();
        let labels: Vec<&str> = table.iter().collect();
        assert_eq!(labels, ["???", "person", "", "car"]);
    }

    #[test]
    fn ignores_lines_past_label_count() {
        let table = LabelTable::from_reader("a\nb\nc\nd\n".as_bytes(), 2).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).map(|label| &**label), Some("b"));
        assert!(table.get(2).is_none());
    }

    #[test]
    fn rejects_short_resource() {
        let err = LabelTable::from_reader("a\nb\n".as_bytes(), 3).unwrap_err();
        assert_eq!(
            err,
            SsdDecodeError::MissingLabels {
                expected: 3,
                got: 2
            }
        );
    }
}
