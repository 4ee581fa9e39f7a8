//! Fixed-shape feature matrix carried by every DOM node.

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Number of stacked channels in a [`FeatureMatrix`].
pub const CHANNELS: usize = 5;

/// Named rows of a [`FeatureMatrix`], in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Embedding of the tag name.
    Tag = 0,
    /// Embedding of the element's own text (plus its tag name).
    Text = 1,
    /// Sum of `embed(tag) * embed(value)` over all attributes.
    Attributes = 2,
    /// Constant row holding the normalized document-order position.
    Position = 3,
    /// Embedding of the de-indexed structural path.
    Path = 4,
}

impl Channel {
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Tag => "tag",
            Self::Text => "text",
            Self::Attributes => "attributes",
            Self::Position => "position",
            Self::Path => "path",
        };
        write!(f, "{s}")
    }
}

/// A `(CHANNELS, width)` array of `f32`, stored row-major.
///
/// The shape is fixed at construction. Every mutating operation checks the
/// width of its operand and reports [`CoreError::ShapeMismatch`] instead of
/// coercing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "MatrixRepr", try_from = "MatrixRepr")]
pub struct FeatureMatrix {
    width: usize,
    data: Vec<f32>,
}

impl FeatureMatrix {
    /// An all-zero matrix of the given channel width.
    #[must_use]
    pub fn zeros(width: usize) -> Self {
        Self {
            width,
            data: vec![0.0; CHANNELS * width],
        }
    }

    /// Stack five rows into a matrix.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShapeMismatch`] if any row differs in width from
    /// the first.
    pub fn from_channels(rows: [Vec<f32>; CHANNELS]) -> Result<Self, CoreError> {
        let width = rows[0].len();
        let mut data = Vec::with_capacity(CHANNELS * width);
        for row in rows {
            if row.len() != width {
                return Err(CoreError::ShapeMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self { width, data })
    }

    /// `(channels, width)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (CHANNELS, self.width)
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Borrow one channel row.
    #[must_use]
    pub fn channel(&self, channel: Channel) -> &[f32] {
        let start = channel.index() * self.width;
        &self.data[start..start + self.width]
    }

    /// Iterate rows in channel order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // `chunks` panics on zero; a zero-width matrix has five empty rows.
        (0..CHANNELS).map(move |i| &self.data[i * self.width..(i + 1) * self.width])
    }

    /// Flat row-major view.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Element-wise `self += other`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShapeMismatch`] if the widths differ.
    pub fn add_assign(&mut self, other: &Self) -> Result<(), CoreError> {
        if other.width != self.width {
            return Err(CoreError::ShapeMismatch {
                expected: self.width,
                actual: other.width,
            });
        }
        for (lhs, rhs) in self.data.iter_mut().zip(&other.data) {
            *lhs += rhs;
        }
        Ok(())
    }

    /// Frobenius norm over all channels.
    #[must_use]
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }
}

/// Serialized form: one nested array per channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MatrixRepr {
    width: usize,
    channels: Vec<Vec<f32>>,
}

impl From<FeatureMatrix> for MatrixRepr {
    fn from(matrix: FeatureMatrix) -> Self {
        Self {
            width: matrix.width,
            channels: matrix.rows().map(<[f32]>::to_vec).collect(),
        }
    }
}

impl TryFrom<MatrixRepr> for FeatureMatrix {
    type Error = CoreError;

    fn try_from(repr: MatrixRepr) -> Result<Self, Self::Error> {
        let rows: [Vec<f32>; CHANNELS] =
            repr.channels
                .try_into()
                .map_err(|rows: Vec<Vec<f32>>| CoreError::ShapeMismatch {
                    expected: CHANNELS,
                    actual: rows.len(),
                })?;
        let matrix = Self::from_channels(rows)?;
        if matrix.width != repr.width {
            return Err(CoreError::ShapeMismatch {
                expected: repr.width,
                actual: matrix.width,
            });
        }
        Ok(matrix)
    }
}
