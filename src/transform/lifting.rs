//! One dimensional wavelet transforms built from lifting steps.
//!
//! A scheme splits a signal into its even samples (the approximation band) and its odd
//! samples (the detail band), then alternates predict steps, which remove from each detail
//! what the neighboring approximations predict, and update steps, which feed details back
//! into the approximations. Every step is undone by running it again with the opposite
//! sign, so any step function gives an exactly invertible transform on integers.
//!
//! Boundaries wrap around: the neighbor after the last sample is the first one.

use std::fmt::{self, Debug};

/// Longest support of a step function.
pub const MAX_ORDER: usize = 4;

const SQRT_2: f64 = std::f64::consts::SQRT_2;
const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Numeric types a transform can run on.
///
/// Integer arithmetic wraps instead of overflowing: a lifting step only needs its own
/// result to be subtracted back, which wrapping arithmetic guarantees even past the range.
pub trait Sample: Copy + Default + PartialEq + Debug {
    /// Truncating conversion, saturating at the bounds of integer types.
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
    /// Saturating conversion.
    fn from_i64(value: i64) -> Self;
    /// Rounds floating point samples.
    fn to_i64(self) -> i64;
    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_mul(self, rhs: Self) -> Self;
    fn wrapping_div(self, rhs: Self) -> Self;
    fn wrapping_neg(self) -> Self;
}

macro_rules! impl_integer_sample {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline(always)]
            fn from_i64(value: i64) -> Self {
                value.clamp(<$t>::MIN as i64, <$t>::MAX as i64) as $t
            }

            #[inline(always)]
            fn to_i64(self) -> i64 {
                self as i64
            }

            #[inline(always)]
            fn wrapping_add(self, rhs: Self) -> Self {
                <$t>::wrapping_add(self, rhs)
            }

            #[inline(always)]
            fn wrapping_sub(self, rhs: Self) -> Self {
                <$t>::wrapping_sub(self, rhs)
            }

            #[inline(always)]
            fn wrapping_mul(self, rhs: Self) -> Self {
                <$t>::wrapping_mul(self, rhs)
            }

            #[inline(always)]
            fn wrapping_div(self, rhs: Self) -> Self {
                <$t>::wrapping_div(self, rhs)
            }

            #[inline(always)]
            fn wrapping_neg(self) -> Self {
                <$t>::wrapping_neg(self)
            }
        }
    )*};
}

macro_rules! impl_float_sample {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline(always)]
            fn from_i64(value: i64) -> Self {
                value as $t
            }

            #[inline(always)]
            fn to_i64(self) -> i64 {
                self.round() as i64
            }

            #[inline(always)]
            fn wrapping_add(self, rhs: Self) -> Self {
                self + rhs
            }

            #[inline(always)]
            fn wrapping_sub(self, rhs: Self) -> Self {
                self - rhs
            }

            #[inline(always)]
            fn wrapping_mul(self, rhs: Self) -> Self {
                self * rhs
            }

            #[inline(always)]
            fn wrapping_div(self, rhs: Self) -> Self {
                self / rhs
            }

            #[inline(always)]
            fn wrapping_neg(self) -> Self {
                -self
            }
        }
    )*};
}

impl_integer_sample!(i16, i64);
impl_float_sample!(f32, f64);

/// A step function, called with `order` consecutive samples of the other band.
pub type StepFn<T> = fn(&[T]) -> T;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// `detail[i] -= f(approx[i], approx[i - 1], ..)`
    Predict,
    /// `approx[i] += f(detail[i], detail[i + 1], ..)`
    Update,
}

#[derive(Clone, Copy)]
pub struct LiftingStep<T> {
    pub kind: StepKind,
    pub func: StepFn<T>,
}

impl<T> Debug for LiftingStep<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiftingStep").field("kind", &self.kind).finish()
    }
}

/// An ordered list of alternating predict and update steps, starting with a predict step,
/// plus optional band normalisers.
///
/// The builder keeps the alternation: adding two steps of the same kind in a row inserts a
/// step of the other kind that does nothing in between.
#[derive(Clone)]
pub struct LiftingScheme<T> {
    order: usize,
    steps: Vec<LiftingStep<T>>,
    approx_norm: Option<T>,
    detail_norm: Option<T>,
}

impl<T: Debug> Debug for LiftingScheme<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiftingScheme")
            .field("order", &self.order)
            .field("steps", &self.steps)
            .field("approx_norm", &self.approx_norm)
            .field("detail_norm", &self.detail_norm)
            .finish()
    }
}

fn zero<T: Sample>(_: &[T]) -> T {
    T::default()
}

#[inline(always)]
pub(super) fn wrap(index: isize, len: usize) -> usize {
    index.rem_euclid(len as isize) as usize
}

impl<T: Sample> LiftingScheme<T> {
    /// An empty scheme whose steps see `order` samples, between 1 and [MAX_ORDER].
    pub(crate) fn new(order: usize) -> Self {
        debug_assert!(
            (1..=MAX_ORDER).contains(&order),
            "lifting order must be between 1 and {MAX_ORDER}, was {order}"
        );
        Self {
            order,
            steps: Vec::new(),
            approx_norm: None,
            detail_norm: None,
        }
    }

    pub fn predict(mut self, func: StepFn<T>) -> Self {
        if self.steps.len() % 2 == 1 {
            self.push(StepKind::Update, zero);
        }
        self.push(StepKind::Predict, func);
        self
    }

    pub fn update(mut self, func: StepFn<T>) -> Self {
        if self.steps.len() % 2 == 0 {
            self.push(StepKind::Predict, zero);
        }
        self.push(StepKind::Update, func);
        self
    }

    /// Forward transforms multiply the approximation band by `norm`, inverse ones divide it.
    pub fn normalize_approx(mut self, norm: T) -> Self {
        self.approx_norm = Some(norm);
        self
    }

    /// Forward transforms multiply the detail band by `norm`, inverse ones divide it.
    pub fn normalize_detail(mut self, norm: T) -> Self {
        self.detail_norm = Some(norm);
        self
    }

    fn push(&mut self, kind: StepKind, func: StepFn<T>) {
        self.steps.push(LiftingStep { kind, func });
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn steps(&self) -> &[LiftingStep<T>] {
        &self.steps
    }

    pub fn approx_norm(&self) -> Option<T> {
        self.approx_norm
    }

    pub fn detail_norm(&self) -> Option<T> {
        self.detail_norm
    }

    /// Splits `input` into its approximation and detail bands, then lifts them.
    ///
    /// `approx` receives `ceil(n / 2)` samples and `detail` `floor(n / 2)`. A signal of
    /// length one is left untouched.
    pub fn forward(&self, input: &[T], approx: &mut Vec<T>, detail: &mut Vec<T>) {
        approx.clear();
        detail.clear();
        approx.extend(input.iter().step_by(2).copied());
        detail.extend(input.iter().skip(1).step_by(2).copied());

        if detail.is_empty() {
            return;
        }

        let mut taps = [T::default(); MAX_ORDER];
        let taps = &mut taps[..self.order];

        for step in &self.steps {
            match step.kind {
                StepKind::Predict => predict_pass(step.func, approx, detail, taps, false),
                StepKind::Update => update_pass(step.func, detail, approx, taps, false),
            }
        }

        scale(approx, self.approx_norm, T::wrapping_mul);
        scale(detail, self.detail_norm, T::wrapping_mul);
    }

    /// Undoes [forward](LiftingScheme::forward): `output` receives the interleaved signal,
    /// its length must be the sum of both band lengths. Both bands are used as scratch.
    pub fn inverse(&self, approx: &mut [T], detail: &mut [T], output: &mut [T]) {
        debug_assert_eq!(output.len(), approx.len() + detail.len());

        if !detail.is_empty() {
            scale(approx, self.approx_norm, T::wrapping_div);
            scale(detail, self.detail_norm, T::wrapping_div);

            let mut taps = [T::default(); MAX_ORDER];
            let taps = &mut taps[..self.order];

            for step in self.steps.iter().rev() {
                match step.kind {
                    StepKind::Predict => predict_pass(step.func, approx, detail, taps, true),
                    StepKind::Update => update_pass(step.func, detail, approx, taps, true),
                }
            }
        }

        for (i, &value) in approx.iter().enumerate() {
            output[2 * i] = value;
        }
        for (i, &value) in detail.iter().enumerate() {
            output[2 * i + 1] = value;
        }
    }

    /// Integer Haar: `d -= a`, then `a += d / 2`.
    pub fn haar() -> Self {
        Self::new(1).predict(first).update(half_first)
    }

    /// Haar with orthonormal scaling, for floating point samples.
    pub fn haar_normalized() -> Self {
        Self::haar()
            .normalize_approx(T::from_f64(SQRT_2))
            .normalize_detail(T::from_f64(SQRT_2 / 2.0))
    }

    /// Daubechies 4 with √3 derived coefficients. Integer samples truncate every step.
    pub fn db4() -> Self {
        Self::new(2)
            .update(db4_first_update)
            .predict(db4_predict)
            .update(db4_second_update)
    }

    /// Daubechies 4 with orthonormal scaling, for floating point samples.
    pub fn db4_normalized() -> Self {
        Self::db4()
            .normalize_approx(T::from_f64((SQRT_3 + 1.0) / SQRT_2))
            .normalize_detail(T::from_f64((SQRT_3 - 1.0) / SQRT_2))
    }

    /// Integer biorthogonal 2,2.
    pub fn bior_2_2() -> Self {
        Self::new(2).update(bior_update).predict(bior_predict)
    }
}

fn predict_pass<T: Sample>(
    func: StepFn<T>,
    approx: &[T],
    detail: &mut [T],
    taps: &mut [T],
    undo: bool,
) {
    for (i, value) in detail.iter_mut().enumerate() {
        for (offset, tap) in taps.iter_mut().enumerate() {
            *tap = approx[wrap(i as isize - offset as isize, approx.len())];
        }
        let prediction = func(taps);
        *value = if undo {
            value.wrapping_add(prediction)
        } else {
            value.wrapping_sub(prediction)
        };
    }
}

fn update_pass<T: Sample>(
    func: StepFn<T>,
    detail: &[T],
    approx: &mut [T],
    taps: &mut [T],
    undo: bool,
) {
    for (i, value) in approx.iter_mut().enumerate() {
        for (offset, tap) in taps.iter_mut().enumerate() {
            *tap = detail[wrap((i + offset) as isize, detail.len())];
        }
        let update = func(taps);
        *value = if undo {
            value.wrapping_sub(update)
        } else {
            value.wrapping_add(update)
        };
    }
}

fn scale<T: Sample>(band: &mut [T], norm: Option<T>, op: fn(T, T) -> T) {
    if let Some(norm) = norm {
        for value in band.iter_mut() {
            *value = op(*value, norm);
        }
    }
}

fn first<T: Sample>(taps: &[T]) -> T {
    taps[0]
}

fn half_first<T: Sample>(taps: &[T]) -> T {
    taps[0].wrapping_div(T::from_i64(2))
}

fn db4_first_update<T: Sample>(taps: &[T]) -> T {
    T::from_f64(taps[0].to_f64() * SQRT_3)
}

fn db4_predict<T: Sample>(taps: &[T]) -> T {
    const C0: f64 = SQRT_3 / 4.0;
    const C1: f64 = (SQRT_3 - 2.0) / 4.0;
    T::from_f64(taps[0].to_f64() * C0 + taps[1].to_f64() * C1)
}

fn db4_second_update<T: Sample>(taps: &[T]) -> T {
    taps[1].wrapping_neg()
}

fn bior_update<T: Sample>(taps: &[T]) -> T {
    let two = T::from_i64(2);
    taps[0].wrapping_div(two).wrapping_add(taps[1].wrapping_div(two))
}

fn bior_predict<T: Sample>(taps: &[T]) -> T {
    let four = T::from_i64(4);
    taps[0].wrapping_div(four).wrapping_add(taps[1].wrapping_div(four))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: Sample>(scheme: &LiftingScheme<T>, input: &[T]) -> Vec<T> {
        let (mut approx, mut detail) = (vec![], vec![]);
        scheme.forward(input, &mut approx, &mut detail);
        assert_eq!(approx.len(), input.len().div_ceil(2));
        assert_eq!(detail.len(), input.len() / 2);

        let mut output = vec![T::default(); input.len()];
        scheme.inverse(&mut approx, &mut detail, &mut output);
        output
    }

    fn signal(len: usize) -> Vec<i64> {
        (0..len as i64).map(|i| (i * 37 + i * i * 11) % 256).collect()
    }

    #[test]
    fn builder_keeps_alternation() {
        let db4 = LiftingScheme::<i64>::db4();
        let kinds: Vec<_> = db4.steps().iter().map(|step| step.kind).collect();

        assert_eq!(
            kinds,
            [
                StepKind::Predict,
                StepKind::Update,
                StepKind::Predict,
                StepKind::Update
            ]
        );
        assert_eq!(db4.order(), 2);

        let predicts = LiftingScheme::<i16>::new(1).predict(first).predict(first);
        assert_eq!(predicts.steps().len(), 3);
        assert_eq!(predicts.steps()[1].kind, StepKind::Update);
    }

    #[test]
    fn haar_forward_values() {
        let (mut approx, mut detail) = (vec![], vec![]);
        LiftingScheme::<i16>::haar().forward(&[10, 14, 7, 3, 5], &mut approx, &mut detail);

        assert_eq!(detail, [4, -4]);
        assert_eq!(approx, [12, 5, 5 + (4 / 2)]);
    }

    #[test]
    fn length_one_is_identity() {
        let (mut approx, mut detail) = (vec![], vec![]);
        LiftingScheme::<i64>::db4().forward(&[42], &mut approx, &mut detail);

        assert_eq!(approx, [42]);
        assert!(detail.is_empty());
        assert_eq!(round_trip(&LiftingScheme::<i64>::bior_2_2(), &[42]), [42]);
    }

    #[test]
    fn integer_schemes_are_lossless() {
        for len in [2, 3, 4, 7, 16, 33] {
            let input = signal(len);
            assert_eq!(round_trip(&LiftingScheme::haar(), &input), input);
            assert_eq!(round_trip(&LiftingScheme::db4(), &input), input);
            assert_eq!(round_trip(&LiftingScheme::bior_2_2(), &input), input);

            let narrow: Vec<i16> = input.iter().map(|&v| v as i16).collect();
            assert_eq!(round_trip(&LiftingScheme::haar(), &narrow), narrow);
        }
    }

    #[test]
    fn wrapping_keeps_extremes_lossless() {
        let input = [i16::MAX, i16::MIN, i16::MIN, i16::MAX, 0, -1];

        assert_eq!(round_trip(&LiftingScheme::haar(), &input), input);
    }

    #[test]
    fn float_schemes_round_trip() {
        for len in [2, 5, 8, 13] {
            let input: Vec<f64> = signal(len).into_iter().map(|v| v as f64).collect();

            for scheme in [
                LiftingScheme::<f64>::haar_normalized(),
                LiftingScheme::<f64>::db4_normalized(),
            ] {
                let output = round_trip(&scheme, &input);
                for (a, b) in input.iter().zip(&output) {
                    assert!((a - b).abs() < 1e-9, "{a} != {b}");
                }
            }
        }
    }

    #[test]
    fn normalized_haar_preserves_energy() {
        let input = [3.0f32, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let (mut approx, mut detail) = (vec![], vec![]);
        LiftingScheme::<f32>::haar_normalized().forward(&input, &mut approx, &mut detail);

        let energy = |values: &[f32]| values.iter().map(|v| v * v).sum::<f32>();
        let transformed = energy(&approx) + energy(&detail);

        assert!((energy(&input) - transformed).abs() < 1e-3);
    }

    #[test]
    fn constant_signal_has_no_detail() {
        let input = vec![77i64; 10];
        let (mut approx, mut detail) = (vec![], vec![]);
        LiftingScheme::haar().forward(&input, &mut approx, &mut detail);

        assert!(detail.iter().all(|&d| d == 0));
        assert!(approx.iter().all(|&a| a == 77));
    }

    #[test]
    fn sample_conversions() {
        assert_eq!(i16::from_i64(100_000), i16::MAX);
        assert_eq!(i16::from_i64(-100_000), i16::MIN);
        assert_eq!(i64::from_f64(-2.7), -2);
        assert_eq!(2.5f64.to_i64(), 3);
    }
}
