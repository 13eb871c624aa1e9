use std::{fmt, num::NonZeroUsize};

use indexmap::IndexSet;

use crate::error::InputValidationError;

/// Tolerance used when comparing mirrored matrix entries.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Position of a trip inside its [`TripSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TripId(pub usize);

/// Uniquely labelled trips, kept in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripSet {
    labels: IndexSet<String>,
}

impl TripSet {
    pub fn try_new<I, S>(labels: I) -> Result<Self, InputValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = IndexSet::new();
        for (position, label) in labels.into_iter().enumerate() {
            let label = label.as_ref().trim();
            if label.is_empty() {
                return Err(InputValidationError::EmptyLabel { position });
            }
            if !set.insert(label.to_owned()) {
                return Err(InputValidationError::DuplicateTrip(label.to_owned()));
            }
        }
        if set.is_empty() {
            return Err(InputValidationError::EmptyTripSet);
        }
        Ok(Self { labels: set })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, id: TripId) -> Option<&str> {
        self.labels.get_index(id.0).map(String::as_str)
    }

    pub fn id_of(&self, label: &str) -> Option<TripId> {
        self.labels.get_index_of(label).map(TripId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TripId, &str)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (TripId(idx), label.as_str()))
    }
}

/// Square, symmetric benefit table with a zero diagonal.
#[derive(Clone, Debug, PartialEq)]
pub struct BenefitMatrix {
    size: usize,
    values: Vec<f64>,
}

impl BenefitMatrix {
    pub fn try_from_rows(rows: Vec<Vec<f64>>) -> Result<Self, InputValidationError> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != size {
                return Err(InputValidationError::NonSquareMatrix {
                    row,
                    expected: size,
                    found: cells.len(),
                });
            }
            for (column, value) in cells.iter().copied().enumerate() {
                if !value.is_finite() {
                    return Err(InputValidationError::NonFiniteBenefit { row, column });
                }
                if value < 0.0 {
                    return Err(InputValidationError::NegativeBenefit { row, column, value });
                }
                if row == column && value != 0.0 {
                    return Err(InputValidationError::SelfBenefit { index: row, value });
                }
            }
            values.extend(cells);
        }

        for row in 0..size {
            for column in (row + 1)..size {
                let forward = values[row * size + column];
                let backward = values[column * size + row];
                if (forward - backward).abs() > SYMMETRY_TOLERANCE {
                    return Err(InputValidationError::AsymmetricBenefit {
                        row,
                        column,
                        forward,
                        backward,
                    });
                }
                // Both halves must read back identically.
                values[column * size + row] = forward;
            }
        }

        Ok(Self { size, values })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, first: TripId, second: TripId) -> f64 {
        self.values[first.0 * self.size + second.0]
    }
}

/// Minimum benefit a pair needs to be eligible for pooling.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    pub fn try_new(value: f64) -> Result<Self, InputValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(InputValidationError::InvalidThreshold(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn admits(self, benefit: f64) -> bool {
        benefit >= self.0
    }
}

/// Upper bound on the number of pooled pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PoolLimit(NonZeroUsize);

impl PoolLimit {
    pub fn try_new(value: usize) -> Result<Self, InputValidationError> {
        NonZeroUsize::new(value)
            .map(Self)
            .ok_or(InputValidationError::NonPositivePoolLimit(value as f64))
    }

    /// Accepts a numeric cell, which must hold a whole number of at least one.
    pub fn try_from_f64(value: f64) -> Result<Self, InputValidationError> {
        if value.is_nan() {
            return Err(InputValidationError::FractionalPoolLimit(value));
        }
        if value < 1.0 {
            return Err(InputValidationError::NonPositivePoolLimit(value));
        }
        if value.is_infinite() || value.fract() != 0.0 {
            return Err(InputValidationError::FractionalPoolLimit(value));
        }
        Self::try_new(value as usize)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// A validated `(S, v, t, k)` tuple.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolingProblem {
    trips: TripSet,
    benefits: BenefitMatrix,
    threshold: Threshold,
    pool_limit: PoolLimit,
}

impl PoolingProblem {
    pub fn try_new(
        trips: TripSet,
        benefits: BenefitMatrix,
        threshold: Threshold,
        pool_limit: PoolLimit,
    ) -> Result<Self, InputValidationError> {
        if benefits.size() != trips.len() {
            return Err(InputValidationError::DimensionMismatch {
                rows: benefits.size(),
                trips: trips.len(),
            });
        }
        Ok(Self {
            trips,
            benefits,
            threshold,
            pool_limit,
        })
    }

    /// Validates raw labels, rows and scalars in one go.
    pub fn from_raw<S: AsRef<str>>(
        labels: &[S],
        rows: Vec<Vec<f64>>,
        threshold: f64,
        pool_limit: f64,
    ) -> Result<Self, InputValidationError> {
        let trips = TripSet::try_new(labels)?;
        let benefits = BenefitMatrix::try_from_rows(rows)?;
        let threshold = Threshold::try_new(threshold)?;
        let pool_limit = PoolLimit::try_from_f64(pool_limit)?;
        Self::try_new(trips, benefits, threshold, pool_limit)
    }

    pub fn trips(&self) -> &TripSet {
        &self.trips
    }

    pub fn benefits(&self) -> &BenefitMatrix {
        &self.benefits
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn pool_limit(&self) -> PoolLimit {
        self.pool_limit
    }

    pub fn with_threshold(&self, threshold: Threshold) -> Self {
        Self {
            threshold,
            ..self.clone()
        }
    }

    pub fn with_pool_limit(&self, pool_limit: PoolLimit) -> Self {
        Self {
            pool_limit,
            ..self.clone()
        }
    }

    pub fn benefit(&self, first: TripId, second: TripId) -> f64 {
        self.benefits.get(first, second)
    }

    /// Builds the canonical pair for two trips of this problem.
    ///
    /// Returns `None` when either id is outside the trip set.
    pub fn pooled_pair(&self, first: TripId, second: TripId) -> Option<PooledPair> {
        let first_label = self.trips.label(first)?;
        let second_label = self.trips.label(second)?;
        Some(PooledPair::new(
            first_label,
            second_label,
            self.benefit(first, second),
        ))
    }
}

/// Two trips served by one vehicle.
///
/// Members are stored in lexicographic label order so that `{A, C}` and
/// `{C, A}` have a single representation.
#[derive(Clone, Debug, PartialEq)]
pub struct PooledPair {
    first: String,
    second: String,
    benefit: f64,
}

impl PooledPair {
    pub fn new(a: &str, b: &str, benefit: f64) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_owned(),
            second: second.to_owned(),
            benefit,
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn benefit(&self) -> f64 {
        self.benefit
    }

    pub fn is(&self, a: &str, b: &str) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

impl fmt::Display for PooledPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.first, self.second)
    }
}

/// Outcome of one optimization: pooled pairs and their total benefit.
#[derive(Clone, Debug, PartialEq)]
pub struct Pooling {
    pairs: Vec<PooledPair>,
    objective: f64,
}

impl Pooling {
    /// Sorts pairs by `(first, second)` and sums their benefits in that order.
    pub fn from_pairs(mut pairs: Vec<PooledPair>) -> Self {
        pairs.sort_by(|lhs, rhs| {
            lhs.first
                .cmp(&rhs.first)
                .then_with(|| lhs.second.cmp(&rhs.second))
        });
        let objective = pairs.iter().map(PooledPair::benefit).sum();
        Self { pairs, objective }
    }

    pub fn pairs(&self) -> &[PooledPair] {
        &self.pairs
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.pairs.iter().any(|pair| pair.is(a, b))
    }
}
