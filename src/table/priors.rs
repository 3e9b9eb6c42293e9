//! Anchor box-prior table.
//!
//! The resource stores one row per prior coordinate, in the order center-y,
//! center-x, height, width. Each row lists one value per anchor, separated by
//! any run of spaces or tabs.

use crate::model::BOX_DIM;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{SsdDecodeError, SsdDecodeResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reference geometry of one anchor, normalized to the model input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnchorPrior {
    pub center_y: f32,
    pub center_x: f32,
    pub height: f32,
    pub width: f32,
}

impl AnchorPrior {
    /// Creates a prior from its center and extent.
    pub fn new(center_y: f32, center_x: f32, height: f32, width: f32) -> Self {
        Self {
            center_y,
            center_x,
            height,
            width,
        }
    }
}

/// Box priors for every anchor of a network, indexed by anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct PriorTable {
    priors: Vec<AnchorPrior>,
}

impl PriorTable {
    /// Loads priors for `anchor_count` anchors from a text file.
    pub fn load<P: AsRef<Path>>(path: P, anchor_count: usize) -> SsdDecodeResult<Self> {
        let path = path.as_ref();
        let _span = trace_span!("load_priors", path = %path.display()).entered();
        let file = File::open(path).map_err(|err| SsdDecodeError::io(path, &err))?;
        Self::parse(BufReader::new(file), anchor_count, path)
    }

    /// Parses priors for `anchor_count` anchors from a buffered reader.
    pub fn from_reader<R: BufRead>(reader: R, anchor_count: usize) -> SsdDecodeResult<Self> {
        Self::parse(reader, anchor_count, Path::new("<reader>"))
    }

    /// Builds a table from already decoded priors.
    pub fn from_priors(priors: Vec<AnchorPrior>) -> Self {
        Self { priors }
    }

    fn parse<R: BufRead>(reader: R, anchor_count: usize, source: &Path) -> SsdDecodeResult<Self> {
        let mut rows: Vec<Vec<f32>> = Vec::with_capacity(BOX_DIM);
        let mut row_count = 0usize;
        for line in reader.lines() {
            let line = line.map_err(|err| SsdDecodeError::io(source, &err))?;
            if line.trim().is_empty() {
                continue;
            }
            let row = row_count;
            row_count += 1;
            if row >= BOX_DIM {
                // Keep counting so the error reports the real row total.
                continue;
            }
            rows.push(parse_row(&line, row, anchor_count)?);
        }
        if row_count != BOX_DIM {
            return Err(SsdDecodeError::PriorRowCount {
                expected: BOX_DIM,
                got: row_count,
            });
        }

        let priors = (0..anchor_count)
            .map(|anchor| {
                AnchorPrior::new(
                    rows[0][anchor],
                    rows[1][anchor],
                    rows[2][anchor],
                    rows[3][anchor],
                )
            })
            .collect();
        trace_event!("priors_loaded", anchors = anchor_count);
        Ok(Self { priors })
    }

    /// Returns the prior for `anchor`.
    pub fn get(&self, anchor: usize) -> Option<&AnchorPrior> {
        self.priors.get(anchor)
    }

    /// Number of anchors in the table.
    pub fn len(&self) -> usize {
        self.priors.len()
    }

    /// Returns true when the table holds no anchors.
    pub fn is_empty(&self) -> bool {
        self.priors.is_empty()
    }

    /// All priors in anchor order.
    pub fn as_slice(&self) -> &[AnchorPrior] {
        &self.priors
    }
}

fn parse_row(line: &str, row: usize, anchor_count: usize) -> SsdDecodeResult<Vec<f32>> {
    let mut values = Vec::with_capacity(anchor_count);
    let mut extra = 0usize;
    for (column, token) in line.split_whitespace().enumerate() {
        if column >= anchor_count {
            extra += 1;
            continue;
        }
        let value = token
            .parse::<f32>()
            .map_err(|_| SsdDecodeError::InvalidPriorValue {
                row,
                column,
                token: token.to_owned(),
            })?;
        values.push(value);
    }
    if values.len() < anchor_count {
        return Err(SsdDecodeError::ShortPriorRow {
            row,
            expected: anchor_count,
            got: values.len(),
        });
    }
    if extra > 0 {
        trace_warn!("prior_values_ignored", row = row, extra = extra);
    }
    Ok(values)
}
