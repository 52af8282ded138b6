//! Two dimensional decomposition: columns then rows, repeated on the approximation quadrant.
//!
//! After one level over a `w` x `h` block, the block holds
//!
//! ```text
//! +-------------------+-----------------+
//! | approximation     | horizontal      |
//! | ceil(w/2) x       | w/2 x ceil(h/2) |
//! | ceil(h/2)         |                 |
//! +-------------------+-----------------+
//! | vertical          | diagonal        |
//! | ceil(w/2) x h/2   | w/2 x h/2       |
//! +-------------------+-----------------+
//! ```
//!
//! The coefficient stream lists, level after level, the diagonal, horizontal and vertical
//! bands row by row, and finally the last approximation quadrant.

use crate::view::Rect;

use super::lifting::{LiftingScheme, Sample};

/// Sizes of the blocks decomposed at each level, outermost first.
///
/// Decomposition stops once the block is a single sample or after `iterations` levels.
pub fn levels(
    width: usize,
    height: usize,
    iterations: Option<usize>,
) -> impl Iterator<Item = (usize, usize)> {
    let mut remaining = iterations;
    let mut size = (width, height);

    std::iter::from_fn(move || {
        let (w, h) = size;
        if (w <= 1 && h <= 1) || remaining == Some(0) {
            return None;
        }
        remaining = remaining.map(|n| n - 1);
        size = (w.div_ceil(2), h.div_ceil(2));
        Some((w, h))
    })
}

/// Size of the approximation left after all levels.
pub fn final_approximation(
    width: usize,
    height: usize,
    iterations: Option<usize>,
) -> (usize, usize) {
    levels(width, height, iterations)
        .last()
        .map(|(w, h)| (w.div_ceil(2), h.div_ceil(2)))
        .unwrap_or((width, height))
}

/// The three detail bands of a `w` x `h` block, in stream order.
pub fn detail_bands(block: Rect) -> [Rect; 3] {
    let (w, h) = (block.width, block.height);
    let (half_w, half_h) = (w.div_ceil(2), h.div_ceil(2));

    [
        block.block(half_w, half_h, w / 2, h / 2),
        block.block(half_w, 0, w / 2, half_h),
        block.block(0, half_h, half_w, h / 2),
    ]
}

/// Forward two dimensional driver. Scratch buffers are kept between calls.
#[derive(Debug, Default)]
pub struct Transform2d<T> {
    image: Vec<T>,
    line: Vec<T>,
    approx: Vec<T>,
    detail: Vec<T>,
}

impl<T: Sample> Transform2d<T> {
    pub fn new() -> Self {
        Self {
            image: Vec::new(),
            line: Vec::new(),
            approx: Vec::new(),
            detail: Vec::new(),
        }
    }

    /// Decomposes the row-major `width` x `height` `input` and appends the coefficient
    /// stream, `width * height` values, to `output`.
    pub fn forward(
        &mut self,
        input: &[T],
        width: usize,
        height: usize,
        scheme: &LiftingScheme<T>,
        iterations: Option<usize>,
        output: &mut Vec<T>,
    ) {
        debug_assert_eq!(input.len(), width * height);

        self.image.clear();
        self.image.extend_from_slice(input);
        let full = Rect::full(width, height);

        for (w, h) in levels(width, height, iterations) {
            let block = full.block(0, 0, w, h);

            if h > 1 {
                self.line.resize(h, T::default());
                for x in 0..w {
                    block.read_col(&self.image, x, &mut self.line);
                    self.lift(scheme);
                    block.write_col(&mut self.image, x, &self.line);
                }
            }

            if w > 1 {
                self.line.resize(w, T::default());
                for y in 0..h {
                    block.read_row(&self.image, y, &mut self.line);
                    self.lift(scheme);
                    block.write_row(&mut self.image, y, &self.line);
                }
            }

            for band in detail_bands(block) {
                output.extend(band.iter(&self.image));
            }
        }

        let (w, h) = final_approximation(width, height, iterations);
        output.extend(full.block(0, 0, w, h).iter(&self.image));
    }

    /// Transforms `line` in place: approximations first, details after.
    fn lift(&mut self, scheme: &LiftingScheme<T>) {
        scheme.forward(&self.line, &mut self.approx, &mut self.detail);
        let split = self.approx.len();
        self.line[..split].copy_from_slice(&self.approx);
        self.line[split..].copy_from_slice(&self.detail);
    }
}

/// Inverse two dimensional driver, the mirror of [Transform2d].
#[derive(Debug, Default)]
pub struct Inverse2d<T> {
    line: Vec<T>,
    approx: Vec<T>,
    detail: Vec<T>,
}

impl<T: Sample> Inverse2d<T> {
    pub fn new() -> Self {
        Self {
            line: Vec::new(),
            approx: Vec::new(),
            detail: Vec::new(),
        }
    }

    /// Rebuilds a row-major `width` x `height` signal into `output` from a coefficient
    /// stream produced by [Transform2d::forward] with the same scheme and iterations.
    pub fn inverse(
        &mut self,
        input: &[T],
        width: usize,
        height: usize,
        scheme: &LiftingScheme<T>,
        iterations: Option<usize>,
        output: &mut Vec<T>,
    ) {
        debug_assert_eq!(input.len(), width * height);

        output.clear();
        output.resize(width * height, T::default());
        let full = Rect::full(width, height);

        // Put every band back in place, outermost level first, as in the stream.
        let mut position = 0;
        for (w, h) in levels(width, height, iterations) {
            for band in detail_bands(full.block(0, 0, w, h)) {
                position += band.fill_from(
                    &mut output[..],
                    &input[position..],
                    |value| value,
                );
            }
        }
        let (w, h) = final_approximation(width, height, iterations);
        full.block(0, 0, w, h)
            .fill_from(&mut output[..], &input[position..], |value| value);

        // Then undo the levels, innermost first.
        let sizes: Vec<_> = levels(width, height, iterations).collect();
        for &(w, h) in sizes.iter().rev() {
            let block = full.block(0, 0, w, h);

            if w > 1 {
                self.line.resize(w, T::default());
                for y in 0..h {
                    block.read_row(&output[..], y, &mut self.line);
                    self.unlift(scheme);
                    block.write_row(&mut output[..], y, &self.line);
                }
            }

            if h > 1 {
                self.line.resize(h, T::default());
                for x in 0..w {
                    block.read_col(&output[..], x, &mut self.line);
                    self.unlift(scheme);
                    block.write_col(&mut output[..], x, &self.line);
                }
            }
        }
    }

    fn unlift(&mut self, scheme: &LiftingScheme<T>) {
        let split = self.line.len().div_ceil(2);
        self.approx.clear();
        self.approx.extend_from_slice(&self.line[..split]);
        self.detail.clear();
        self.detail.extend_from_slice(&self.line[split..]);
        scheme.inverse(&mut self.approx, &mut self.detail, &mut self.line);
    }
}
