//! Rectangular views over flat row-major buffers.

/// A `width` x `height` window into a flat buffer, starting at `offset`, with rows
/// `stride` elements apart.
///
/// A view does not borrow the buffer, it only holds the index arithmetic. Every accessor
/// takes the buffer it indexes into, so the same view can address the input image and a
/// scratch copy alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub offset: usize,
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}

impl Rect {
    /// A view over a whole `width` x `height` buffer.
    pub const fn full(width: usize, height: usize) -> Self {
        Self {
            offset: 0,
            width,
            height,
            stride: width,
        }
    }

    /// A sub-view whose top left corner is at `(x, y)` in this view.
    pub fn block(&self, x: usize, y: usize, width: usize, height: usize) -> Self {
        debug_assert!(x + width <= self.width && y + height <= self.height);
        Self {
            offset: self.offset + y * self.stride + x,
            width,
            height,
            stride: self.stride,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub fn index(&self, x: usize, y: usize) -> usize {
        self.offset + y * self.stride + x
    }

    /// Copies row `y` into `out`, which must hold `width` elements.
    pub fn read_row<T: Copy>(&self, buffer: &[T], y: usize, out: &mut [T]) {
        let start = self.index(0, y);
        out.copy_from_slice(&buffer[start..start + self.width]);
    }

    pub fn write_row<T: Copy>(&self, buffer: &mut [T], y: usize, row: &[T]) {
        let start = self.index(0, y);
        buffer[start..start + self.width].copy_from_slice(row);
    }

    /// Copies column `x` into `out`, which must hold `height` elements.
    pub fn read_col<T: Copy>(&self, buffer: &[T], x: usize, out: &mut [T]) {
        for (y, value) in out.iter_mut().enumerate() {
            *value = buffer[self.index(x, y)];
        }
    }

    pub fn write_col<T: Copy>(&self, buffer: &mut [T], x: usize, col: &[T]) {
        for (y, &value) in col.iter().enumerate() {
            buffer[self.index(x, y)] = value;
        }
    }

    /// Iterates over the elements of the view, row by row.
    pub fn iter<'a, T: Copy>(&self, buffer: &'a [T]) -> impl Iterator<Item = T> + 'a {
        let view = *self;
        (0..view.height).flat_map(move |y| {
            let start = view.index(0, y);
            buffer[start..start + view.width].iter().copied()
        })
    }

    /// Appends the elements of the view, row by row, converted by `f`.
    pub fn extend_into<T: Copy, U>(&self, buffer: &[T], out: &mut Vec<U>, f: impl Fn(T) -> U) {
        out.extend(self.iter(buffer).map(f));
    }

    /// Fills the view, row by row, from `values`. Returns how many values were consumed.
    pub fn fill_from<T, U: Copy>(
        &self,
        buffer: &mut [T],
        values: &[U],
        f: impl Fn(U) -> T,
    ) -> usize {
        let mut values = values.iter();
        for y in 0..self.height {
            let start = self.index(0, y);
            for (slot, &value) in buffer[start..start + self.width].iter_mut().zip(&mut values) {
                *slot = f(value);
            }
        }
        self.len()
    }
}
