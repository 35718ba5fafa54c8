use std::ops::{Index, IndexMut};

use super::layout_fits;

/// Read-only strided view of a vector.
#[derive(Copy, Clone, Debug)]
pub struct Accessor1D<'a, T> {
    data: &'a [T],
    len: usize,
    stride: usize,
}

impl<'a, T> Accessor1D<'a, T> {
    /// Create an accessor where element `i` is `data[i * stride]`.
    ///
    /// Returns `None` if some element is outside of `data`.
    pub fn new(data: &'a [T], len: usize, stride: usize) -> Option<Self> {
        layout_fits(data.len(), &[len], &[stride]).then_some(Accessor1D { data, len, stride })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn get(&self, index: usize) -> Option<&'a T> {
        (index < self.len).then(|| &self.data[index * self.stride])
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &'a T> + 'a {
        let (data, stride) = (self.data, self.stride);
        (0..self.len).map(move |i| &data[i * stride])
    }
}

impl<T> Index<usize> for Accessor1D<'_, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        assert!(index < self.len, "index {} out of bounds", index);
        &self.data[index * self.stride]
    }
}

/// Read-only strided view of a matrix.
#[derive(Copy, Clone, Debug)]
pub struct Accessor2D<'a, T> {
    data: &'a [T],
    shape: [usize; 2],
    stride: [usize; 2],
}

impl<'a, T> Accessor2D<'a, T> {
    /// Create an accessor where element `[r, c]` is
    /// `data[r * stride[0] + c * stride[1]]`.
    ///
    /// Returns `None` if some element is outside of `data`.
    pub fn new(data: &'a [T], shape: [usize; 2], stride: [usize; 2]) -> Option<Self> {
        layout_fits(data.len(), &shape, &stride).then_some(Accessor2D {
            data,
            shape,
            stride,
        })
    }

    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    pub fn stride(&self) -> [usize; 2] {
        self.stride
    }

    pub fn row(&self, row: usize) -> Accessor1D<'a, T> {
        assert!(row < self.shape[0], "row {} out of bounds", row);
        Accessor1D {
            data: self.data.get(row * self.stride[0]..).unwrap_or(&[]),
            len: self.shape[1],
            stride: self.stride[1],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&'a T> {
        (row < self.shape[0] && col < self.shape[1])
            .then(|| &self.data[row * self.stride[0] + col * self.stride[1]])
    }
}

impl<T> Index<[usize; 2]> for Accessor2D<'_, T> {
    type Output = T;

    fn index(&self, [row, col]: [usize; 2]) -> &T {
        assert!(
            row < self.shape[0] && col < self.shape[1],
            "index [{}, {}] out of bounds",
            row,
            col
        );
        &self.data[row * self.stride[0] + col * self.stride[1]]
    }
}

/// Read-only strided view of a 3D array.
#[derive(Copy, Clone, Debug)]
pub struct Accessor3D<'a, T> {
    data: &'a [T],
    shape: [usize; 3],
    stride: [usize; 3],
}

impl<'a, T> Accessor3D<'a, T> {
    /// Create an accessor where element `[i, j, k]` is
    /// `data[i * stride[0] + j * stride[1] + k * stride[2]]`.
    ///
    /// Returns `None` if some element is outside of `data`.
    pub fn new(data: &'a [T], shape: [usize; 3], stride: [usize; 3]) -> Option<Self> {
        layout_fits(data.len(), &shape, &stride).then_some(Accessor3D {
            data,
            shape,
            stride,
        })
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn stride(&self) -> [usize; 3] {
        self.stride
    }

    /// Return the matrix at index `index` of the first axis.
    pub fn plane(&self, index: usize) -> Accessor2D<'a, T> {
        assert!(index < self.shape[0], "plane {} out of bounds", index);
        Accessor2D {
            data: self.data.get(index * self.stride[0]..).unwrap_or(&[]),
            shape: [self.shape[1], self.shape[2]],
            stride: [self.stride[1], self.stride[2]],
        }
    }
}

impl<T> Index<[usize; 3]> for Accessor3D<'_, T> {
    type Output = T;

    fn index(&self, [i, j, k]: [usize; 3]) -> &T {
        assert!(
            i < self.shape[0] && j < self.shape[1] && k < self.shape[2],
            "index [{}, {}, {}] out of bounds",
            i,
            j,
            k
        );
        &self.data[i * self.stride[0] + j * self.stride[1] + k * self.stride[2]]
    }
}

/// Mutable strided view of a vector.
#[derive(Debug)]
pub struct Accessor1DMut<'a, T> {
    data: &'a mut [T],
    len: usize,
    stride: usize,
}

impl<'a, T> Accessor1DMut<'a, T> {
    /// Mutable variant of [`Accessor1D::new`].
    pub fn new(data: &'a mut [T], len: usize, stride: usize) -> Option<Self> {
        if !layout_fits(data.len(), &[len], &[stride]) {
            return None;
        }
        Some(Accessor1DMut { data, len, stride })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_const(&self) -> Accessor1D<'_, T> {
        Accessor1D {
            data: &*self.data,
            len: self.len,
            stride: self.stride,
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            Some(&mut self.data[index * self.stride])
        } else {
            None
        }
    }
}

impl<T> Index<usize> for Accessor1DMut<'_, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        assert!(index < self.len, "index {} out of bounds", index);
        &self.data[index * self.stride]
    }
}

impl<T> IndexMut<usize> for Accessor1DMut<'_, T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert!(index < self.len, "index {} out of bounds", index);
        &mut self.data[index * self.stride]
    }
}

/// Mutable strided view of a matrix.
#[derive(Debug)]
pub struct Accessor2DMut<'a, T> {
    data: &'a mut [T],
    shape: [usize; 2],
    stride: [usize; 2],
}

impl<'a, T> Accessor2DMut<'a, T> {
    /// Mutable variant of [`Accessor2D::new`].
    pub fn new(data: &'a mut [T], shape: [usize; 2], stride: [usize; 2]) -> Option<Self> {
        if !layout_fits(data.len(), &shape, &stride) {
            return None;
        }
        Some(Accessor2DMut {
            data,
            shape,
            stride,
        })
    }

    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    pub fn as_const(&self) -> Accessor2D<'_, T> {
        Accessor2D {
            data: &*self.data,
            shape: self.shape,
            stride: self.stride,
        }
    }

    pub fn row_mut(&mut self, row: usize) -> Accessor1DMut<'_, T> {
        assert!(row < self.shape[0], "row {} out of bounds", row);
        Accessor1DMut {
            data: self.data.get_mut(row * self.stride[0]..).unwrap_or(&mut []),
            len: self.shape[1],
            stride: self.stride[1],
        }
    }
}

impl<T> Index<[usize; 2]> for Accessor2DMut<'_, T> {
    type Output = T;

    fn index(&self, [row, col]: [usize; 2]) -> &T {
        assert!(
            row < self.shape[0] && col < self.shape[1],
            "index [{}, {}] out of bounds",
            row,
            col
        );
        &self.data[row * self.stride[0] + col * self.stride[1]]
    }
}

impl<T> IndexMut<[usize; 2]> for Accessor2DMut<'_, T> {
    fn index_mut(&mut self, [row, col]: [usize; 2]) -> &mut T {
        assert!(
            row < self.shape[0] && col < self.shape[1],
            "index [{}, {}] out of bounds",
            row,
            col
        );
        &mut self.data[row * self.stride[0] + col * self.stride[1]]
    }
}

/// Mutable strided view of a 3D array.
#[derive(Debug)]
pub struct Accessor3DMut<'a, T> {
    data: &'a mut [T],
    shape: [usize; 3],
    stride: [usize; 3],
}

impl<'a, T> Accessor3DMut<'a, T> {
    /// Mutable variant of [`Accessor3D::new`].
    pub fn new(data: &'a mut [T], shape: [usize; 3], stride: [usize; 3]) -> Option<Self> {
        if !layout_fits(data.len(), &shape, &stride) {
            return None;
        }
        Some(Accessor3DMut {
            data,
            shape,
            stride,
        })
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn as_const(&self) -> Accessor3D<'_, T> {
        Accessor3D {
            data: &*self.data,
            shape: self.shape,
            stride: self.stride,
        }
    }

    pub fn plane_mut(&mut self, index: usize) -> Accessor2DMut<'_, T> {
        assert!(index < self.shape[0], "plane {} out of bounds", index);
        Accessor2DMut {
            data: self.data.get_mut(index * self.stride[0]..).unwrap_or(&mut []),
            shape: [self.shape[1], self.shape[2]],
            stride: [self.stride[1], self.stride[2]],
        }
    }
}

impl<T> Index<[usize; 3]> for Accessor3DMut<'_, T> {
    type Output = T;

    fn index(&self, [i, j, k]: [usize; 3]) -> &T {
        assert!(
            i < self.shape[0] && j < self.shape[1] && k < self.shape[2],
            "index [{}, {}, {}] out of bounds",
            i,
            j,
            k
        );
        &self.data[i * self.stride[0] + j * self.stride[1] + k * self.stride[2]]
    }
}

impl<T> IndexMut<[usize; 3]> for Accessor3DMut<'_, T> {
    fn index_mut(&mut self, [i, j, k]: [usize; 3]) -> &mut T {
        assert!(
            i < self.shape[0] && j < self.shape[1] && k < self.shape[2],
            "index [{}, {}, {}] out of bounds",
            i,
            j,
            k
        );
        &mut self.data[i * self.stride[0] + j * self.stride[1] + k * self.stride[2]]
    }
}

#[cfg(test)]
mod tests {
    use super::{Accessor1D, Accessor2D, Accessor2DMut, Accessor3D, Accessor3DMut};

    #[test]
    fn test_accessor1d() {
        let data = [0, 1, 2, 3, 4, 5, 6];
        let acc = Accessor1D::new(&data, 3, 3).unwrap();
        assert_eq!(acc.len(), 3);
        assert_eq!(acc[2], 6);
        assert_eq!(acc.get(3), None);
        assert_eq!(acc.iter().copied().collect::<Vec<_>>(), [0, 3, 6]);
        assert!(Accessor1D::new(&data, 3, 4).is_none());
        assert!(Accessor1D::new(&data, 0, 100).is_some());
    }

    #[test]
    fn test_accessor2d_transposed() {
        // 2x3 matrix stored column-major.
        let data = [1, 4, 2, 5, 3, 6];
        let acc = Accessor2D::new(&data, [2, 3], [1, 2]).unwrap();
        assert_eq!(acc[[0, 1]], 2);
        assert_eq!(acc[[1, 2]], 6);
        assert_eq!(acc.row(1).iter().copied().collect::<Vec<_>>(), [4, 5, 6]);
        assert_eq!(acc.get(2, 0), None);
    }

    #[test]
    #[should_panic(expected = "index [0, 3] out of bounds")]
    fn test_accessor2d_out_of_bounds() {
        let data = [0; 12];
        let acc = Accessor2D::new(&data, [3, 3], [4, 1]).unwrap();
        // Would alias element [1, 0] without the column check.
        let _ = acc[[0, 3]];
    }

    #[test]
    fn test_accessor_mut() {
        let mut data = [0; 8];
        let mut acc = Accessor2DMut::new(&mut data, [2, 2], [4, 2]).unwrap();
        acc[[1, 1]] = 3;
        acc.row_mut(0)[1] = 7;
        assert_eq!(acc.as_const()[[0, 1]], 7);
        assert_eq!(data, [0, 0, 7, 0, 0, 0, 3, 0]);

        let mut data = [0; 8];
        let mut acc = Accessor3DMut::new(&mut data, [2, 2, 2], [1, 2, 4]).unwrap();
        acc[[1, 0, 1]] = 9;
        acc.plane_mut(0)[[1, 1]] = 8;
        assert_eq!(data, [0, 0, 0, 0, 0, 9, 8, 0]);
    }

    #[test]
    fn test_accessor3d() {
        let data: Vec<i32> = (0..24).collect();
        let acc = Accessor3D::new(&data, [2, 3, 4], [12, 4, 1]).unwrap();
        assert_eq!(acc[[1, 2, 3]], 23);
        assert_eq!(acc.plane(1)[[0, 0]], 12);
        assert_eq!(acc.shape(), [2, 3, 4]);
    }
}
