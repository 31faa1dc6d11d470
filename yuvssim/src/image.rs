//! Plane buffer types for yuvssim.
//!
//! A [`Plane`] stores one 8-bit channel with an explicit row stride, so
//! planes borrowed from decoders with padded rows can be compared without
//! copying. All sample access is bounds-checked.

use std::ops::Index;

use imgref::{Img, ImgRef};

use crate::SsimError;

/// Single-channel 8-bit image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    data: Vec<u8>,
    width: usize,
    height: usize,
    stride: usize, // samples per row (may be > width)
}

impl Plane {
    /// Creates a plane filled with a constant value.
    #[must_use]
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
            stride: width,
        }
    }

    /// Creates a plane from tightly packed rows (`stride == width`).
    ///
    /// # Errors
    /// Returns [`SsimError::InvalidBufferSize`] if `data.len() != width * height`.
    pub fn from_vec(data: Vec<u8>, width: usize, height: usize) -> Result<Self, SsimError> {
        Self::from_vec_stride(data, width, height, width)
    }

    /// Creates a plane whose rows are `stride` samples apart.
    ///
    /// The last row may be short: only `width` samples of it are required.
    ///
    /// # Errors
    /// - [`SsimError::InvalidStride`] if `stride < width`
    /// - [`SsimError::InvalidBufferSize`] if `data` cannot hold `height` rows
    pub fn from_vec_stride(
        data: Vec<u8>,
        width: usize,
        height: usize,
        stride: usize,
    ) -> Result<Self, SsimError> {
        if stride < width {
            return Err(SsimError::InvalidStride { width, stride });
        }
        let expected = required_len(width, height, stride).unwrap_or(usize::MAX);
        if data.len() < expected {
            return Err(SsimError::InvalidBufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Plane width in samples.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Plane height in samples.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance between the starts of consecutive rows.
    #[inline]
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the visible samples of a row.
    ///
    /// # Panics
    /// Panics if `y >= height`.
    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Gets a sample, or `None` outside the visible area.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.stride + x])
        } else {
            None
        }
    }

    /// Iterates over the visible rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Borrows the plane as an `imgref` view (stride preserved).
    #[must_use]
    pub fn as_imgref(&self) -> ImgRef<'_, u8> {
        let len = required_len(self.width, self.height, self.stride).unwrap_or(self.data.len());
        Img::new_stride(&self.data[..len], self.width, self.height, self.stride.max(1))
    }

    /// Checks if two planes have the same dimensions.
    #[must_use]
    pub fn same_size(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Returns `true` if the plane has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Index<(usize, usize)> for Plane {
    type Output = u8;

    /// # Panics
    /// Panics if `(x, y)` lies outside the visible area, padding included.
    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        assert!(
            x < self.width && y < self.height,
            "sample ({x}, {y}) out of bounds ({}x{})",
            self.width,
            self.height
        );
        &self.data[y * self.stride + x]
    }
}

/// Bytes needed for `height` rows of `stride` with a final row of `width`,
/// or `None` if that overflows.
fn required_len(width: usize, height: usize, stride: usize) -> Option<usize> {
    if height == 0 {
        return Some(0);
    }
    (height - 1).checked_mul(stride)?.checked_add(width)
}

/// One of the three planes of a [`PlaneTriple`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Luma.
    Y,
    /// Blue-difference chroma.
    U,
    /// Red-difference chroma.
    V,
}

impl Channel {
    /// All channels in storage order.
    pub const ALL: [Channel; 3] = [Channel::Y, Channel::U, Channel::V];

    #[inline]
    fn index(self) -> usize {
        match self {
            Channel::Y => 0,
            Channel::U => 1,
            Channel::V => 2,
        }
    }
}

/// Full-resolution (4:4:4) Y, U and V planes of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneTriple {
    planes: [Plane; 3],
}

impl PlaneTriple {
    /// Creates from three separate planes.
    ///
    /// # Errors
    /// Returns [`SsimError::DimensionMismatch`] if the planes differ in size.
    pub fn from_planes(y: Plane, u: Plane, v: Plane) -> Result<Self, SsimError> {
        for other in [&u, &v] {
            if !y.same_size(other) {
                return Err(SsimError::DimensionMismatch {
                    w1: y.width(),
                    h1: y.height(),
                    w2: other.width(),
                    h2: other.height(),
                });
            }
        }
        Ok(Self { planes: [y, u, v] })
    }

    /// Image width.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.planes[0].width()
    }

    /// Image height.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.planes[0].height()
    }

    /// Returns one plane.
    #[inline]
    #[must_use]
    pub fn plane(&self, channel: Channel) -> &Plane {
        &self.planes[channel.index()]
    }

    /// Luma plane.
    #[inline]
    #[must_use]
    pub fn y(&self) -> &Plane {
        &self.planes[0]
    }

    /// Blue-difference chroma plane.
    #[inline]
    #[must_use]
    pub fn u(&self) -> &Plane {
        &self.planes[1]
    }

    /// Red-difference chroma plane.
    #[inline]
    #[must_use]
    pub fn v(&self) -> &Plane {
        &self.planes[2]
    }

    /// Splits into the Y, U and V planes.
    #[must_use]
    pub fn into_planes(self) -> [Plane; 3] {
        self.planes
    }
}

impl Index<Channel> for PlaneTriple {
    type Output = Plane;

    fn index(&self, channel: Channel) -> &Self::Output {
        self.plane(channel)
    }
}
