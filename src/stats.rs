//! Stat aggregation over a collection of creatures.
//!
//! Every function here is pure: the caller hands in the aggregation domain
//! (usually the visible part of the catalog) and gets a freshly built result
//! back. Nothing is cached between calls.

use serde::{Deserialize, Serialize};

pub const STAT_COUNT: usize = 6;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StatError {
    #[error("expected {expected} stat values, got {actual}")]
    InvalidRecordShape { expected: usize, actual: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl StatKind {
    pub const ALL: [StatKind; STAT_COUNT] = [
        StatKind::Hp,
        StatKind::Attack,
        StatKind::Defense,
        StatKind::SpecialAttack,
        StatKind::SpecialDefense,
        StatKind::Speed,
    ];

    pub fn index(self) -> usize {
        match self {
            StatKind::Hp => 0,
            StatKind::Attack => 1,
            StatKind::Defense => 2,
            StatKind::SpecialAttack => 3,
            StatKind::SpecialDefense => 4,
            StatKind::Speed => 5,
        }
    }

    /// Name used by PokeAPI in `stats[].stat.name`.
    pub fn api_name(self) -> &'static str {
        match self {
            StatKind::Hp => "hp",
            StatKind::Attack => "attack",
            StatKind::Defense => "defense",
            StatKind::SpecialAttack => "special-attack",
            StatKind::SpecialDefense => "special-defense",
            StatKind::Speed => "speed",
        }
    }

    pub fn from_api_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.api_name() == name)
    }

    pub fn label(self) -> &'static str {
        match self {
            StatKind::Hp => "HP",
            StatKind::Attack => "Attack",
            StatKind::Defense => "Defense",
            StatKind::SpecialAttack => "Sp. Atk",
            StatKind::SpecialDefense => "Sp. Def",
            StatKind::Speed => "Speed",
        }
    }
}

/// Six base stats in fixed order: HP, Attack, Defense, Sp. Atk, Sp. Def, Speed.
///
/// The length is part of the type, so a short or missing entry can only enter
/// through [`StatVector::from_partial`] or [`StatVector::from_named`], which
/// fill the gaps with 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatVector([u32; STAT_COUNT]);

impl StatVector {
    pub const ZERO: StatVector = StatVector([0; STAT_COUNT]);

    pub const fn new(values: [u32; STAT_COUNT]) -> Self {
        Self(values)
    }

    /// Takes up to six leading values; positions past the end of `values` are 0
    /// and anything beyond the sixth value is ignored.
    pub fn from_partial(values: &[u32]) -> Self {
        let mut out = [0; STAT_COUNT];
        for (slot, value) in out.iter_mut().zip(values) {
            *slot = *value;
        }
        Self(out)
    }

    /// Strict variant of [`StatVector::from_partial`] for callers that want a
    /// malformed record reported instead of padded.
    pub fn try_from_slice(values: &[u32]) -> Result<Self, StatError> {
        if values.len() != STAT_COUNT {
            return Err(StatError::InvalidRecordShape {
                expected: STAT_COUNT,
                actual: values.len(),
            });
        }
        Ok(Self::from_partial(values))
    }

    /// Builds a vector from `(api name, value)` pairs in any order. Unknown
    /// names are skipped and stats that never appear stay 0.
    pub fn from_named<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut out = [0; STAT_COUNT];
        for (name, value) in entries {
            if let Some(kind) = StatKind::from_api_name(name) {
                out[kind.index()] = value;
            }
        }
        Self(out)
    }

    pub fn get(&self, kind: StatKind) -> u32 {
        self.0[kind.index()]
    }

    pub fn values(&self) -> &[u32; STAT_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, u32)> + '_ {
        StatKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&value| u64::from(value)).sum()
    }
}

impl From<[u32; STAT_COUNT]> for StatVector {
    fn from(values: [u32; STAT_COUNT]) -> Self {
        Self(values)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureRecord {
    pub id: u32,
    pub name: String,
    pub stats: StatVector,
}

impl CreatureRecord {
    pub fn new(id: u32, name: impl Into<String>, stats: StatVector) -> Self {
        Self {
            id,
            name: name.into(),
            stats,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub max: StatVector,
    pub average: StatVector,
}

/// Component-wise maximum. An empty domain yields [`StatVector::ZERO`].
pub fn compute_max<'a, I>(records: I) -> StatVector
where
    I: IntoIterator<Item = &'a CreatureRecord>,
{
    aggregate(records).max
}

/// Component-wise `floor(sum / count)`. An empty domain yields
/// [`StatVector::ZERO`] rather than dividing by zero.
pub fn compute_average<'a, I>(records: I) -> StatVector
where
    I: IntoIterator<Item = &'a CreatureRecord>,
{
    aggregate(records).average
}

/// Max and average in a single pass over the domain.
pub fn aggregate<'a, I>(records: I) -> AggregateResult
where
    I: IntoIterator<Item = &'a CreatureRecord>,
{
    let mut max = [0u32; STAT_COUNT];
    let mut sums = [0u64; STAT_COUNT];
    let mut count: u64 = 0;

    for record in records {
        count += 1;
        for (index, value) in record.stats.values().iter().enumerate() {
            max[index] = max[index].max(*value);
            sums[index] += u64::from(*value);
        }
    }

    if count == 0 {
        return AggregateResult::default();
    }

    let mut average = [0u32; STAT_COUNT];
    for (slot, sum) in average.iter_mut().zip(sums) {
        // floor(sum / count) never exceeds the largest u32 input
        *slot = (sum / count) as u32;
    }

    AggregateResult {
        max: StatVector(max),
        average: StatVector(average),
    }
}

/// Percentage width of a bar for `value` against `scale_max`.
///
/// A zero scale gives 0. The result is not clamped: a value above the scale
/// reports more than 100 and the renderer decides how to draw that.
pub fn scaled_bar_width(value: u32, scale_max: u32) -> f64 {
    if scale_max == 0 {
        return 0.0;
    }
    (f64::from(value) / f64::from(scale_max)) * 100.0
}

/// Common scale for all six bars of one detail view.
pub fn derive_scale(max: &StatVector) -> u32 {
    max.values().iter().copied().max().unwrap_or(0)
}
