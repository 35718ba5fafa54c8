use std::ops::{Index, IndexMut};

/// Read-only view of a row-major matrix.
#[derive(Copy, Clone, Debug)]
pub struct Span2D<'a, T> {
    data: &'a [T],
    height: usize,
    width: usize,
}

impl<'a, T> Span2D<'a, T> {
    /// Create a span over `data`, which must have `height * width` elements.
    pub fn new(data: &'a [T], height: usize, width: usize) -> Option<Self> {
        (height.checked_mul(width) == Some(data.len())).then_some(Span2D {
            data,
            height,
            width,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    pub fn row(&self, row: usize) -> &'a [T] {
        assert!(row < self.height, "row {} out of bounds", row);
        &self.data[row * self.width..(row + 1) * self.width]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&'a T> {
        (row < self.height && col < self.width).then(|| &self.data[row * self.width + col])
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> std::slice::ChunksExact<'a, T> {
        // `chunks_exact` rejects a chunk size of zero.
        self.data.chunks_exact(self.width.max(1))
    }
}

impl<T> Index<[usize; 2]> for Span2D<'_, T> {
    type Output = T;

    fn index(&self, [row, col]: [usize; 2]) -> &T {
        assert!(col < self.width, "column {} out of bounds", col);
        &self.row(row)[col]
    }
}

/// Mutable view of a row-major matrix.
#[derive(Debug)]
pub struct Span2DMut<'a, T> {
    data: &'a mut [T],
    height: usize,
    width: usize,
}

impl<'a, T> Span2DMut<'a, T> {
    /// Create a span over `data`, which must have `height * width` elements.
    pub fn new(data: &'a mut [T], height: usize, width: usize) -> Option<Self> {
        if height.checked_mul(width) != Some(data.len()) {
            return None;
        }
        Some(Span2DMut {
            data,
            height,
            width,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn as_slice(&self) -> &[T] {
        &*self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut *self.data
    }

    pub fn into_mut_slice(self) -> &'a mut [T] {
        self.data
    }

    pub fn as_span(&self) -> Span2D<'_, T> {
        Span2D {
            data: &*self.data,
            height: self.height,
            width: self.width,
        }
    }

    pub fn row(&self, row: usize) -> &[T] {
        assert!(row < self.height, "row {} out of bounds", row);
        &self.data[row * self.width..(row + 1) * self.width]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        assert!(row < self.height, "row {} out of bounds", row);
        &mut self.data[row * self.width..(row + 1) * self.width]
    }

    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, T> {
        self.data.chunks_exact_mut(self.width.max(1))
    }
}

impl<T> Index<[usize; 2]> for Span2DMut<'_, T> {
    type Output = T;

    fn index(&self, [row, col]: [usize; 2]) -> &T {
        assert!(col < self.width, "column {} out of bounds", col);
        &self.row(row)[col]
    }
}

impl<T> IndexMut<[usize; 2]> for Span2DMut<'_, T> {
    fn index_mut(&mut self, [row, col]: [usize; 2]) -> &mut T {
        assert!(col < self.width, "column {} out of bounds", col);
        &mut self.row_mut(row)[col]
    }
}

/// Read-only view of an image with interleaved channels, laid out as
/// (height, width, channels).
#[derive(Copy, Clone, Debug)]
pub struct Span3D<'a, T> {
    data: &'a [T],
    height: usize,
    width: usize,
    channels: usize,
}

impl<'a, T> Span3D<'a, T> {
    pub fn new(data: &'a [T], height: usize, width: usize, channels: usize) -> Option<Self> {
        let len = height.checked_mul(width)?.checked_mul(channels)?;
        (len == data.len()).then_some(Span3D {
            data,
            height,
            width,
            channels,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Return all channels of all pixels in a row.
    pub fn row(&self, row: usize) -> &'a [T] {
        assert!(row < self.height, "row {} out of bounds", row);
        let row_len = self.width * self.channels;
        &self.data[row * row_len..(row + 1) * row_len]
    }

    /// Return the channels of one pixel.
    pub fn pixel(&self, row: usize, col: usize) -> &'a [T] {
        assert!(col < self.width, "column {} out of bounds", col);
        let start = col * self.channels;
        &self.row(row)[start..start + self.channels]
    }
}

impl<T> Index<[usize; 3]> for Span3D<'_, T> {
    type Output = T;

    fn index(&self, [row, col, channel]: [usize; 3]) -> &T {
        assert!(channel < self.channels, "channel {} out of bounds", channel);
        &self.pixel(row, col)[channel]
    }
}

/// Mutable view of an image with interleaved channels, laid out as
/// (height, width, channels).
#[derive(Debug)]
pub struct Span3DMut<'a, T> {
    data: &'a mut [T],
    height: usize,
    width: usize,
    channels: usize,
}

impl<'a, T> Span3DMut<'a, T> {
    pub fn new(data: &'a mut [T], height: usize, width: usize, channels: usize) -> Option<Self> {
        let len = height.checked_mul(width)?.checked_mul(channels)?;
        if len != data.len() {
            return None;
        }
        Some(Span3DMut {
            data,
            height,
            width,
            channels,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut *self.data
    }

    pub fn as_span(&self) -> Span3D<'_, T> {
        Span3D {
            data: &*self.data,
            height: self.height,
            width: self.width,
            channels: self.channels,
        }
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        assert!(row < self.height, "row {} out of bounds", row);
        let row_len = self.width * self.channels;
        &mut self.data[row * row_len..(row + 1) * row_len]
    }

    pub fn pixel_mut(&mut self, row: usize, col: usize) -> &mut [T] {
        assert!(col < self.width, "column {} out of bounds", col);
        let channels = self.channels;
        let start = col * channels;
        &mut self.row_mut(row)[start..start + channels]
    }
}

impl<T> Index<[usize; 3]> for Span3DMut<'_, T> {
    type Output = T;

    fn index(&self, [row, col, channel]: [usize; 3]) -> &T {
        assert!(row < self.height, "row {} out of bounds", row);
        assert!(col < self.width, "column {} out of bounds", col);
        assert!(channel < self.channels, "channel {} out of bounds", channel);
        &self.data[(row * self.width + col) * self.channels + channel]
    }
}

impl<T> IndexMut<[usize; 3]> for Span3DMut<'_, T> {
    fn index_mut(&mut self, [row, col, channel]: [usize; 3]) -> &mut T {
        assert!(channel < self.channels, "channel {} out of bounds", channel);
        &mut self.pixel_mut(row, col)[channel]
    }
}

/// Read-only view of an image with separate channel planes, laid out as
/// (channels, height, width).
#[derive(Copy, Clone, Debug)]
pub struct PlanarSpan3D<'a, T> {
    data: &'a [T],
    channels: usize,
    height: usize,
    width: usize,
}

impl<'a, T> PlanarSpan3D<'a, T> {
    pub fn new(data: &'a [T], channels: usize, height: usize, width: usize) -> Option<Self> {
        let len = channels.checked_mul(height)?.checked_mul(width)?;
        (len == data.len()).then_some(PlanarSpan3D {
            data,
            channels,
            height,
            width,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Return one channel as a matrix.
    pub fn plane(&self, channel: usize) -> Span2D<'a, T> {
        assert!(channel < self.channels, "channel {} out of bounds", channel);
        let plane_len = self.height * self.width;
        Span2D {
            data: &self.data[channel * plane_len..(channel + 1) * plane_len],
            height: self.height,
            width: self.width,
        }
    }
}

impl<T> Index<[usize; 3]> for PlanarSpan3D<'_, T> {
    type Output = T;

    fn index(&self, [channel, row, col]: [usize; 3]) -> &T {
        let plane = self.plane(channel);
        assert!(col < plane.width, "column {} out of bounds", col);
        &plane.row(row)[col]
    }
}

/// Mutable view of an image with separate channel planes, laid out as
/// (channels, height, width).
#[derive(Debug)]
pub struct PlanarSpan3DMut<'a, T> {
    data: &'a mut [T],
    channels: usize,
    height: usize,
    width: usize,
}

impl<'a, T> PlanarSpan3DMut<'a, T> {
    pub fn new(data: &'a mut [T], channels: usize, height: usize, width: usize) -> Option<Self> {
        let len = channels.checked_mul(height)?.checked_mul(width)?;
        if len != data.len() {
            return None;
        }
        Some(PlanarSpan3DMut {
            data,
            channels,
            height,
            width,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut *self.data
    }

    pub fn as_span(&self) -> PlanarSpan3D<'_, T> {
        PlanarSpan3D {
            data: &*self.data,
            channels: self.channels,
            height: self.height,
            width: self.width,
        }
    }

    pub fn plane_mut(&mut self, channel: usize) -> Span2DMut<'_, T> {
        assert!(channel < self.channels, "channel {} out of bounds", channel);
        let plane_len = self.height * self.width;
        Span2DMut {
            data: &mut self.data[channel * plane_len..(channel + 1) * plane_len],
            height: self.height,
            width: self.width,
        }
    }

    /// Iterate over channel planes.
    pub fn planes_mut(&mut self) -> impl Iterator<Item = Span2DMut<'_, T>> {
        let (height, width) = (self.height, self.width);
        self.data
            .chunks_exact_mut((height * width).max(1))
            .take(self.channels)
            .map(move |data| Span2DMut {
                data,
                height,
                width,
            })
    }
}

impl<T> Index<[usize; 3]> for PlanarSpan3DMut<'_, T> {
    type Output = T;

    fn index(&self, [channel, row, col]: [usize; 3]) -> &T {
        assert!(channel < self.channels, "channel {} out of bounds", channel);
        assert!(row < self.height, "row {} out of bounds", row);
        assert!(col < self.width, "column {} out of bounds", col);
        &self.data[(channel * self.height + row) * self.width + col]
    }
}

impl<T> IndexMut<[usize; 3]> for PlanarSpan3DMut<'_, T> {
    fn index_mut(&mut self, [channel, row, col]: [usize; 3]) -> &mut T {
        assert!(channel < self.channels, "channel {} out of bounds", channel);
        assert!(row < self.height, "row {} out of bounds", row);
        assert!(col < self.width, "column {} out of bounds", col);
        &mut self.data[(channel * self.height + row) * self.width + col]
    }
}
