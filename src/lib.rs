#[macro_use]
extern crate log;

pub mod adjust;
pub mod naming;
pub mod range;
pub mod render;

use std::convert::TryFrom;

use thiserror::Error;

pub use adjust::{adjust_range, adjust_range_f32, adjust_range_for_log, almost_equal};
pub use naming::sanitize_name;
pub use range::{ScalarRange, Scale};

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("field has no samples")]
    Empty,
    #[error("line {line}: '{token}' is not a number")]
    InvalidNumber { line: usize, token: String },
    #[error("line {line}: expected {expected} samples, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("{width}x{height} field has {found} samples")]
    SampleCount {
        width: usize,
        height: usize,
        found: usize,
    },
    #[error("{width}x{height} field is too large to render")]
    TooLarge { width: usize, height: usize },
}

/// A row-major grid of scalar samples. Both dimensions fit in a `u32`, which
/// is what images are addressed with.
#[derive(Debug, Clone)]
pub struct Field {
    width: u32,
    height: u32,

    samples: Vec<f64>,
}

impl Field {
    pub fn from_samples(
        width: usize,
        height: usize,
        samples: Vec<f64>,
    ) -> Result<Self, FieldError> {
        let too_large = || FieldError::TooLarge { width, height };
        let w = u32::try_from(width).map_err(|_| too_large())?;
        let h = u32::try_from(height).map_err(|_| too_large())?;
        let len = width.checked_mul(height).ok_or_else(too_large)?;

        if len == 0 && samples.is_empty() {
            return Err(FieldError::Empty);
        }

        if samples.len() != len {
            return Err(FieldError::SampleCount {
                width,
                height,
                found: samples.len(),
            });
        }

        Ok(Field {
            width: w,
            height: h,
            samples,
        })
    }

    /// Parses whitespace separated samples, one row per line. Blank lines are
    /// skipped and every row must have the same length.
    pub fn parse(text: &str) -> Result<Self, FieldError> {
        let mut width = 0;
        let mut height = 0;
        let mut samples = vec![];

        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            if line.trim().is_empty() {
                continue;
            }

            let row = line
                .split_whitespace()
                .map(|token| {
                    token.parse::<f64>().map_err(|_| FieldError::InvalidNumber {
                        line: line_no,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            if height == 0 {
                width = row.len();
            } else if row.len() != width {
                return Err(FieldError::Ragged {
                    line: line_no,
                    expected: width,
                    found: row.len(),
                });
            }

            samples.extend(row);
            height += 1;
        }

        debug!("parsed {}x{} field", width, height);

        Self::from_samples(width, height, samples)
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, (x, y): (usize, usize)) -> f64 {
        self.samples[y * self.width() + x]
    }

    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        let width = self.width();
        self.samples.iter().enumerate().map(move |(i, v)| {
            let x = i % width;
            let y = i / width;

            ((x, y), *v)
        })
    }

    /// Range of the finite samples.
    pub fn range(&self) -> ScalarRange {
        ScalarRange::from_values(self.samples.iter().copied())
    }
}
