//! Linear filters equivalent to a lifting scheme, used to bound the coefficients it produces.
//!
//! Every lifting step adds a weighted sum of samples from the other band, so each coefficient
//! of a decomposition is a weighted sum of input samples. Running the steps on filters
//! instead of samples gives those weights for every position of a line, wrap-around
//! included, and from the weights the smallest and largest coefficient 8 bit samples can
//! produce.

use super::lifting::{wrap, LiftingScheme, Sample, StepKind};

/// Step functions are evaluated on this value to recover their weights.
const UNIT: i64 = 1 << 14;

/// Weights of consecutive input samples, the first one applying to sample `start`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    start: isize,
    weights: Vec<f64>,
}

impl Filter {
    /// Picks sample `at` unchanged.
    pub fn impulse(at: isize) -> Self {
        Self {
            start: at,
            weights: vec![1.0],
        }
    }

    pub fn start(&self) -> isize {
        self.start
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn end(&self) -> isize {
        self.start + self.weights.len() as isize
    }

    /// Adds `factor` times `other`.
    fn add(&mut self, other: &Filter, factor: f64) {
        if factor == 0.0 || other.weights.is_empty() {
            return;
        }
        if self.weights.is_empty() {
            self.start = other.start;
        }

        if other.start < self.start {
            let mut weights = vec![0.0; (self.start - other.start) as usize];
            weights.append(&mut self.weights);
            self.weights = weights;
            self.start = other.start;
        }
        let end = self.end().max(other.end());
        self.weights.resize((end - self.start) as usize, 0.0);

        let offset = (other.start - self.start) as usize;
        for (slot, weight) in self.weights[offset..].iter_mut().zip(&other.weights) {
            *slot += factor * weight;
        }
    }

    fn scale(&mut self, factor: f64) {
        for weight in self.weights.iter_mut() {
            *weight *= factor;
        }
    }

    pub fn mass(&self) -> Mass {
        self.weights.iter().fold(Mass::default(), |mass, &weight| Mass {
            positive: mass.positive + weight.max(0.0),
            negative: mass.negative + (-weight).max(0.0),
        })
    }
}

/// Sums of the positive weights and of the magnitudes of the negative weights of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mass {
    pub positive: f64,
    pub negative: f64,
}

impl Mass {
    /// Largest positive and largest negative mass among `filters`, not necessarily the same.
    pub fn widest<'a>(filters: impl IntoIterator<Item = &'a Filter>) -> Mass {
        filters.into_iter().fold(Mass::default(), |widest, filter| {
            let mass = filter.mass();
            Mass {
                positive: widest.positive.max(mass.positive),
                negative: widest.negative.max(mass.negative),
            }
        })
    }

    /// Smallest and largest coefficient the separable `columns` x `rows` filter gives on
    /// samples between 0 and `max`.
    pub fn outer_range(columns: Mass, rows: Mass, max: f64) -> (f64, f64) {
        let positive = columns.positive * rows.positive + columns.negative * rows.negative;
        let negative = columns.positive * rows.negative + columns.negative * rows.positive;
        (-negative * max, positive * max)
    }
}

/// A lifting scheme reduced to the weight of every tap of every step.
///
/// Step functions of integer schemes round, weights are read with a precision of 1/16384.
#[derive(Debug, Clone)]
pub struct LinearScheme {
    steps: Vec<(StepKind, Vec<f64>)>,
    approx_norm: Option<f64>,
    detail_norm: Option<f64>,
}

impl LinearScheme {
    pub fn new<T: Sample>(scheme: &LiftingScheme<T>) -> Self {
        let mut taps = vec![T::default(); scheme.order()];
        let steps = scheme
            .steps()
            .iter()
            .map(|step| {
                let weights = (0..taps.len())
                    .map(|t| {
                        taps.fill(T::default());
                        taps[t] = T::from_i64(UNIT);
                        (step.func)(&taps).to_f64() / UNIT as f64
                    })
                    .collect();
                (step.kind, weights)
            })
            .collect();

        Self {
            steps,
            approx_norm: scheme.approx_norm().map(T::to_f64),
            detail_norm: scheme.detail_norm().map(T::to_f64),
        }
    }

    /// The forward pass of the scheme over a line of filters, with the same split and the
    /// same wrap-around as [LiftingScheme::forward].
    pub fn forward(&self, line: &[Filter]) -> (Vec<Filter>, Vec<Filter>) {
        let mut approx: Vec<_> = line.iter().step_by(2).cloned().collect();
        let mut detail: Vec<_> = line.iter().skip(1).step_by(2).cloned().collect();
        if detail.is_empty() {
            return (approx, detail);
        }

        for (kind, weights) in &self.steps {
            match kind {
                StepKind::Predict => {
                    for (i, value) in detail.iter_mut().enumerate() {
                        for (t, &weight) in weights.iter().enumerate() {
                            let source = &approx[wrap(i as isize - t as isize, approx.len())];
                            value.add(source, -weight);
                        }
                    }
                }
                StepKind::Update => {
                    for (i, value) in approx.iter_mut().enumerate() {
                        for (t, &weight) in weights.iter().enumerate() {
                            let source = &detail[wrap((i + t) as isize, detail.len())];
                            value.add(source, weight);
                        }
                    }
                }
            }
        }

        if let Some(norm) = self.approx_norm {
            approx.iter_mut().for_each(|filter| filter.scale(norm));
        }
        if let Some(norm) = self.detail_norm {
            detail.iter_mut().for_each(|filter| filter.scale(norm));
        }
        (approx, detail)
    }
}

/// Widest masses of the bands produced by repeated forward passes over a line of `len`
/// samples, until a single approximation sample is left.
#[derive(Debug, Clone)]
pub struct Cascade {
    approx: Vec<Mass>,
    detail: Vec<Mass>,
}

impl Cascade {
    pub fn new(scheme: &LinearScheme, len: usize) -> Self {
        let mut line: Vec<_> = (0..len as isize).map(Filter::impulse).collect();
        let mut approx = vec![Mass::widest(&line)];
        let mut detail = vec![Mass::default()];

        while line.len() > 1 {
            let (next, details) = scheme.forward(&line);
            approx.push(Mass::widest(&next));
            detail.push(Mass::widest(&details));
            line = next;
        }

        Self { approx, detail }
    }

    /// Mass of the approximation band after `passes` passes. Passes over a single sample
    /// change nothing.
    pub fn approx(&self, passes: usize) -> Mass {
        self.approx[passes.min(self.approx.len() - 1)]
    }

    /// Mass of the detail band produced by pass number `pass`, counting from 1.
    pub fn detail(&self, pass: usize) -> Mass {
        self.detail.get(pass).copied().unwrap_or_default()
    }
}
