//! Band quantization of a wavelet coefficient stream.
//!
//! Each decomposition level has its own factor `f`: the diagonal band is divided by `2f`,
//! the horizontal and vertical bands by `f`. The factor shrinks from one level to the next,
//! so deeper, lower frequency bands keep more precision.
//!
//! Quantized values are stored in signed bytes. Haar coefficients of 8 bit samples always fit
//! once divided by the factors, but the bands of other schemes grow with every pass. From the
//! filters of the scheme, each band gets the smallest divisor that keeps all its possible
//! values within a byte, and uses it when the factor alone would not. The final
//! approximation is shifted to start at zero, divided by the same rule when its range is wider
//! than a byte, then re-centred around zero.

use std::collections::HashMap;

use crate::{
    transform::{
        recursive::{detail_bands, final_approximation, levels},
        Cascade, LiftingScheme, LinearScheme, Mass, Sample,
    },
    view::Rect,
};

/// Samples are re-centred by this much before being stored in a signed byte.
pub const BIAS: i64 = 128;
/// Smallest factor any level can use.
pub const MIN_FACTOR: i64 = 2;

const PIXEL_MAX: f64 = 255.0;

/// One band of a coefficient stream and how its values map to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Stored as `value / divisor`, truncated.
    Detail { len: usize, divisor: i64 },
    /// Stored as `(value - low) / divisor`, rounded, minus [BIAS].
    Approximation { len: usize, divisor: i64, low: i64 },
}

impl Band {
    fn detail(len: usize, factor: i64, columns: Mass, rows: Mass) -> Self {
        let (low, high) = Mass::outer_range(columns, rows, PIXEL_MAX);
        let reach = high.max(-low);
        // |value| < 128 * divisor once truncated fits in -127..=127.
        let fits = (reach / 128.0).floor() as i64 + 1;
        Band::Detail {
            len,
            divisor: factor.max(fits),
        }
    }

    fn approximation(len: usize, columns: Mass, rows: Mass) -> Self {
        let (low, high) = Mass::outer_range(columns, rows, PIXEL_MAX);
        let (low, high) = (low.floor() as i64, high.ceil() as i64);
        let range = high - low;
        let divisor = if range <= 255 { 1 } else { range / 255 + 1 };
        Band::Approximation { len, divisor, low }
    }

    pub fn len(&self) -> usize {
        match *self {
            Band::Detail { len, .. } | Band::Approximation { len, .. } => len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn divisor(&self) -> i64 {
        match *self {
            Band::Detail { divisor, .. } | Band::Approximation { divisor, .. } => divisor,
        }
    }

    #[inline]
    fn quantize(&self, value: i64) -> u8 {
        match *self {
            Band::Detail { divisor, .. } => saturate(value / divisor),
            Band::Approximation { divisor, low, .. } => {
                let shifted = value.saturating_sub(low).saturating_add(divisor / 2);
                saturate(shifted.div_euclid(divisor) - BIAS)
            }
        }
    }

    #[inline]
    fn dequantize(&self, byte: u8) -> i64 {
        match *self {
            Band::Detail { divisor, .. } => signed(byte) * divisor,
            Band::Approximation { divisor, low, .. } => (signed(byte) + BIAS) * divisor + low,
        }
    }
}

/// Per level factors for a stream, outermost level first, and the band ranges of the scheme
/// that produced it.
#[derive(Debug, Clone)]
pub struct Quantizer {
    pub factor: i64,
    pub alpha: i64,
    pub beta: i64,
    pub iterations: Option<usize>,
    scheme: LinearScheme,
    /// Band ranges for each line length seen so far.
    cascades: HashMap<usize, Cascade>,
}

impl Quantizer {
    pub fn new<T: Sample>(
        scheme: &LiftingScheme<T>,
        factor: i16,
        alpha: i16,
        beta: i16,
        iterations: Option<usize>,
    ) -> Self {
        Self {
            factor: factor.into(),
            alpha: alpha.into(),
            beta: beta.into(),
            iterations,
            scheme: LinearScheme::new(scheme),
            cascades: HashMap::new(),
        }
    }

    /// Factor used at each level of a `width` x `height` decomposition.
    pub fn factors(&self, width: usize, height: usize) -> impl Iterator<Item = i64> {
        let alpha = self.alpha.max(1);
        let beta = self.beta;
        let mut factor = self.factor.max(MIN_FACTOR);

        levels(width, height, self.iterations).map(move |_| {
            let current = factor;
            factor = (ceil_div(current, alpha) - beta).max(MIN_FACTOR);
            current
        })
    }

    /// The bands of a `width` x `height` stream, in stream order: three detail bands per
    /// level, then the final approximation.
    pub fn bands(&mut self, width: usize, height: usize) -> Vec<Band> {
        let columns = self.cascade(height);
        let rows = self.cascade(width);
        let factors: Vec<_> = self.factors(width, height).collect();
        let mut bands = Vec::with_capacity(3 * factors.len() + 1);
        let (mut column_passes, mut row_passes) = (0, 0);

        for ((w, h), factor) in levels(width, height, self.iterations).zip(factors) {
            let [diagonal, horizontal, vertical] = detail_bands(Rect::full(w, h));
            let (column_approx, column_detail) = halves(&columns, column_passes, h > 1);
            let (row_approx, row_detail) = halves(&rows, row_passes, w > 1);

            bands.push(Band::detail(
                diagonal.len(),
                2 * factor,
                column_detail,
                row_detail,
            ));
            bands.push(Band::detail(
                horizontal.len(),
                factor,
                column_approx,
                row_detail,
            ));
            bands.push(Band::detail(
                vertical.len(),
                factor,
                column_detail,
                row_approx,
            ));

            column_passes += usize::from(h > 1);
            row_passes += usize::from(w > 1);
        }

        let (w, h) = final_approximation(width, height, self.iterations);
        bands.push(Band::approximation(
            w * h,
            columns.approx(column_passes),
            rows.approx(row_passes),
        ));
        bands
    }

    fn cascade(&mut self, len: usize) -> Cascade {
        let scheme = &self.scheme;
        self.cascades
            .entry(len)
            .or_insert_with(|| Cascade::new(scheme, len))
            .clone()
    }

    /// Quantizes the `width * height` coefficients produced by the 2D transform, appending
    /// one byte per coefficient to `output`.
    pub fn quantize<T: Sample>(
        &mut self,
        coefficients: &[T],
        width: usize,
        height: usize,
        output: &mut Vec<u8>,
    ) {
        debug_assert_eq!(coefficients.len(), width * height);

        let mut position = 0;
        for band in self.bands(width, height) {
            let values = &coefficients[position..position + band.len()];
            output.extend(values.iter().map(|&value| band.quantize(value.to_i64())));
            position += band.len();
        }
    }

    /// Scales quantized bytes back to coefficients, replacing the contents of `output`.
    pub fn dequantize<T: Sample>(
        &mut self,
        bytes: &[u8],
        width: usize,
        height: usize,
        output: &mut Vec<T>,
    ) {
        debug_assert_eq!(bytes.len(), width * height);

        output.clear();
        let mut position = 0;
        for band in self.bands(width, height) {
            let values = &bytes[position..position + band.len()];
            output.extend(values.iter().map(|&byte| T::from_i64(band.dequantize(byte))));
            position += band.len();
        }
    }
}

/// Masses of both halves of a line after `passes` passes and one more, if it happens.
fn halves(cascade: &Cascade, passes: usize, happens: bool) -> (Mass, Mass) {
    if happens {
        (cascade.approx(passes + 1), cascade.detail(passes + 1))
    } else {
        (cascade.approx(passes), Mass::default())
    }
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    let quotient = value / divisor;
    if value % divisor > 0 {
        quotient + 1
    } else {
        quotient
    }
}

#[inline]
fn saturate(value: i64) -> u8 {
    value.clamp(i8::MIN.into(), i8::MAX.into()) as i8 as u8
}

#[inline]
fn signed(byte: u8) -> i64 {
    (byte as i8).into()
}

/// Clamps a reconstructed sample into the pixel range.
#[inline]
pub fn to_pixel<T: Sample>(value: T) -> u8 {
    value.to_i64().clamp(0, 255) as u8
}
