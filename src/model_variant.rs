//! Fixed tables that describe each genotype substitution model
//!
//! The genotype alphabets, allele counts, relative rates and event relations below are model
//! constants. They are written down per model instead of being derived.

use std::convert::TryFrom;
use std::fmt;

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::ConfigurationError;
use crate::evolutionary_event::EvolutionaryEventType::{self, *};

/// Selector for one of the supported genotype substitution models
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ModelVariant {
    /// 0/0, 0/1, 1/1, 1/1'
    MutationExtended = 0,
    /// 0/0, 0/1, 1/1, 1/1', 0/-, 1/-, -
    MutationDeletion = 1,
    /// Like `MutationDeletion`, but a complete loss of the locus is not allowed
    ConstrainedMutationDeletion = 2,
}

impl ModelVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MutationExtended => "extended mutation-only",
            Self::MutationDeletion => "mutation+deletion",
            Self::ConstrainedMutationDeletion => "constrained mutation+deletion",
        }
    }

    pub(crate) fn descriptor(&self) -> &'static ModelDescriptor {
        match self {
            Self::MutationExtended => &MUTATION_EXTENDED,
            Self::MutationDeletion => &MUTATION_DELETION,
            Self::ConstrainedMutationDeletion => &CONSTRAINED_MUTATION_DELETION,
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for ModelVariant {
    type Error = ConfigurationError;
    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(Self::MutationExtended),
            1 => Ok(Self::MutationDeletion),
            2 => Ok(Self::ConstrainedMutationDeletion),
            _ => Err(ConfigurationError::new(
                "substitution model",
                format!("unknown model selector {} (expected 0, 1 or 2)", n),
            )),
        }
    }
}

/// Ternary code of the homozygous reference genotype
pub const TERNARY_HOM_REF: i8 = 0;
/// Ternary code of the heterozygous alternative genotype
pub const TERNARY_HET_ALT: i8 = 1;
/// Ternary code of the homozygous alternative genotype
pub const TERNARY_HOM_ALT: i8 = 2;
/// Ternary code of the fourth genotype 1/1', shared with missing data
pub const TERNARY_MISSING: i8 = 3;

/// Ternary codes outside of [0, 3] describe genotypes with a changed copy number
pub fn is_copy_number_change(ternary_code: i64) -> bool {
    ternary_code < i64::from(TERNARY_HOM_REF) || ternary_code > i64::from(TERNARY_MISSING)
}

/// An unnormalized entry of the rate matrix
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum RelativeRate {
    Fixed(f64),
    /// A multiple of the deletion rate
    Deletion(f64),
}

impl RelativeRate {
    pub(crate) fn value(&self, deletion_rate: f64) -> f64 {
        match self {
            RelativeRate::Fixed(v) => *v,
            RelativeRate::Deletion(factor) => factor * deletion_rate,
        }
    }
}

use RelativeRate::{Deletion as D, Fixed as F};

type Relation = (usize, usize, &'static [EvolutionaryEventType]);

pub(crate) struct ModelDescriptor {
    pub labels: &'static [&'static str],
    pub existing_alleles: &'static [u8],
    pub alt_alleles: &'static [u8],
    pub ternary_codes: &'static [i8],
    pub modeled_alleles: &'static [u8],
    /// Row-major, one row per parent genotype; the diagonal is ignored
    pub relative_rates: &'static [&'static [RelativeRate]],
    /// Every legal (parent, child) pair with `parent != child`
    pub events: &'static [Relation],
}

impl ModelDescriptor {
    pub fn nr_of_states(&self) -> usize {
        self.labels.len()
    }

    pub fn relation(&self, parent: usize, child: usize) -> Option<&'static [EvolutionaryEventType]> {
        self.events
            .iter()
            .find(|(p, c, _)| *p == parent && *c == child)
            .map(|(_, _, events)| *events)
    }
}

const MUTATION_EVENTS: [Relation; 12] = [
    (0, 1, &[SingleMutation]),
    (0, 2, &[CoinHomoDoubleMutation]),
    (0, 3, &[CoinHeteroDoubleMutation]),
    (1, 0, &[SingleBackMutation]),
    (1, 2, &[HomoSingleMutationAddition]),
    (1, 3, &[HeteroSingleMutationAddition]),
    (2, 0, &[CoinDoubleBackMutation]),
    (2, 1, &[SingleBackMutation]),
    (2, 3, &[HeteroSubstSingleMutation]),
    (3, 0, &[CoinDoubleBackMutation]),
    (3, 1, &[SingleBackMutation]),
    (3, 2, &[HomoSubstSingleMutation]),
];

static MUTATION_EXTENDED: ModelDescriptor = ModelDescriptor {
    labels: &["0/0", "0/1", "1/1", "1/2"],
    existing_alleles: &[2, 2, 2, 2],
    alt_alleles: &[0, 1, 2, 2],
    ternary_codes: &[0, 1, 2, 3],
    modeled_alleles: &[2],
    relative_rates: &[
        &[F(0.0), F(1.0), F(0.0), F(0.0)],
        &[F(1.0 / 6.0), F(0.0), F(1.0 / 6.0), F(1.0 / 3.0)],
        &[F(0.0), F(1.0 / 3.0), F(0.0), F(2.0 / 3.0)],
        &[F(0.0), F(1.0 / 3.0), F(1.0 / 3.0), F(0.0)],
    ],
    events: &MUTATION_EVENTS,
};

static MUTATION_DELETION: ModelDescriptor = ModelDescriptor {
    labels: &["0/0", "0/1", "1/1", "1/2", "0/.", "1/.", "./."],
    existing_alleles: &[2, 2, 2, 2, 1, 1, 0],
    alt_alleles: &[0, 1, 2, 2, 0, 1, 0],
    ternary_codes: &[0, 1, 2, 3, -1, -2, -3],
    modeled_alleles: &[0, 1, 2],
    relative_rates: &[
        &[F(0.0), F(1.0), F(0.0), F(0.0), D(1.0), F(0.0), F(0.0)],
        &[F(1.0 / 6.0), F(0.0), F(1.0 / 6.0), F(1.0 / 3.0), D(0.5), D(0.5), F(0.0)],
        &[F(0.0), F(1.0 / 3.0), F(0.0), F(2.0 / 3.0), F(0.0), D(1.0), F(0.0)],
        &[F(0.0), F(1.0 / 3.0), F(1.0 / 3.0), F(0.0), F(0.0), D(1.0), F(0.0)],
        &[F(0.0), F(0.0), F(0.0), F(0.0), F(0.0), F(0.5), D(0.5)],
        &[F(0.0), F(0.0), F(0.0), F(0.0), F(1.0 / 6.0), F(0.0), D(0.5)],
        &[F(0.0), F(0.0), F(0.0), F(0.0), F(0.0), F(0.0), F(0.0)],
    ],
    events: &[
        (0, 1, &[SingleMutation]),
        (0, 2, &[CoinHomoDoubleMutation]),
        (0, 3, &[CoinHeteroDoubleMutation]),
        (0, 4, &[SingleDeletionNotLoh]),
        (0, 5, &[CoinDeletionAndMutation]),
        (0, 6, &[CoinDoubleDeletion]),
        (1, 0, &[SingleBackMutation]),
        (1, 2, &[HomoSingleMutationAddition]),
        (1, 3, &[HeteroSingleMutationAddition]),
        (1, 4, &[SingleDeletionLoh]),
        (1, 5, &[SingleDeletionLoh]),
        (1, 6, &[CoinDoubleDeletion]),
        (2, 0, &[CoinDoubleBackMutation]),
        (2, 1, &[SingleBackMutation]),
        (2, 3, &[HeteroSubstSingleMutation]),
        (2, 4, &[CoinDeletionAndBackMutation]),
        (2, 5, &[SingleDeletionNotLoh]),
        (2, 6, &[CoinDoubleDeletion]),
        (3, 0, &[CoinDoubleBackMutation]),
        (3, 1, &[SingleBackMutation]),
        (3, 2, &[HomoSubstSingleMutation]),
        (3, 4, &[CoinDeletionAndBackMutation]),
        (3, 5, &[SingleDeletionLoh]),
        (3, 6, &[CoinDoubleDeletion]),
        (4, 5, &[SingleDeletionMutationAddition]),
        (4, 6, &[SingleDeletionAddition]),
        (5, 4, &[SingleDeletionBackMutationAddition]),
        (5, 6, &[SingleDeletionAddition]),
    ],
};

static CONSTRAINED_MUTATION_DELETION: ModelDescriptor = ModelDescriptor {
    labels: &["0/0", "0/1", "1/1", "1/2", "0/.", "1/."],
    existing_alleles: &[2, 2, 2, 2, 1, 1],
    alt_alleles: &[0, 1, 2, 2, 0, 1],
    ternary_codes: &[0, 1, 2, 3, -1, -2],
    modeled_alleles: &[1, 2],
    relative_rates: &[
        &[F(0.0), F(1.0), F(0.0), F(0.0), D(1.0), F(0.0)],
        &[F(1.0 / 6.0), F(0.0), F(1.0 / 6.0), F(1.0 / 3.0), D(0.5), D(0.5)],
        &[F(0.0), F(1.0 / 3.0), F(0.0), F(2.0 / 3.0), F(0.0), D(1.0)],
        &[F(0.0), F(1.0 / 3.0), F(1.0 / 3.0), F(0.0), F(0.0), D(1.0)],
        &[F(0.0), F(0.0), F(0.0), F(0.0), F(0.0), F(0.5)],
        &[F(0.0), F(0.0), F(0.0), F(0.0), F(1.0 / 6.0), F(0.0)],
    ],
    events: &[
        (0, 1, &[SingleMutation]),
        (0, 2, &[CoinHomoDoubleMutation]),
        (0, 3, &[CoinHeteroDoubleMutation]),
        (0, 4, &[SingleDeletionNotLoh]),
        (0, 5, &[CoinDeletionAndMutation]),
        (1, 0, &[SingleBackMutation]),
        (1, 2, &[HomoSingleMutationAddition]),
        (1, 3, &[HeteroSingleMutationAddition]),
        (1, 4, &[SingleDeletionLoh]),
        (1, 5, &[SingleDeletionLoh]),
        (2, 0, &[CoinDoubleBackMutation]),
        (2, 1, &[SingleBackMutation]),
        (2, 3, &[HeteroSubstSingleMutation]),
        (2, 4, &[CoinDeletionAndBackMutation]),
        (2, 5, &[SingleDeletionNotLoh]),
        (3, 0, &[CoinDoubleBackMutation]),
        (3, 1, &[SingleBackMutation]),
        (3, 2, &[HomoSubstSingleMutation]),
        (3, 4, &[CoinDeletionAndBackMutation]),
        (3, 5, &[SingleDeletionLoh]),
        (4, 5, &[SingleDeletionMutationAddition]),
        (5, 4, &[SingleDeletionBackMutationAddition]),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    const VARIANTS: [ModelVariant; 3] = [
        ModelVariant::MutationExtended,
        ModelVariant::MutationDeletion,
        ModelVariant::ConstrainedMutationDeletion,
    ];

    #[test]
    fn test_tables_are_consistent() {
        for variant in &VARIANTS {
            let d = variant.descriptor();
            let n = d.nr_of_states();
            assert_eq!(d.existing_alleles.len(), n);
            assert_eq!(d.alt_alleles.len(), n);
            assert_eq!(d.ternary_codes.len(), n);
            assert_eq!(d.relative_rates.len(), n);
            for row in d.relative_rates {
                assert_eq!(row.len(), n);
            }
            for (i, (p, c, events)) in d.events.iter().enumerate() {
                assert!(p != c);
                assert!(*p < n && *c < n);
                assert!(!events.is_empty());
                // no duplicated pairs
                assert!(d.events[i + 1..].iter().all(|(q, r, _)| (q, r) != (p, c)));
            }
        }
    }

    #[test]
    fn test_state_counts() {
        assert_eq!(ModelVariant::MutationExtended.descriptor().nr_of_states(), 4);
        assert_eq!(ModelVariant::MutationDeletion.descriptor().nr_of_states(), 7);
        assert_eq!(
            ModelVariant::ConstrainedMutationDeletion
                .descriptor()
                .nr_of_states(),
            6
        );
    }

    #[test]
    fn test_selector() {
        assert_eq!(
            ModelVariant::try_from(0u8).unwrap(),
            ModelVariant::MutationExtended
        );
        assert_eq!(
            ModelVariant::try_from(1u8).unwrap(),
            ModelVariant::MutationDeletion
        );
        assert!(ModelVariant::try_from(7u8).is_err());
    }

    #[test]
    fn test_copy_number_change() {
        assert!(!is_copy_number_change(0));
        assert!(!is_copy_number_change(3));
        assert!(is_copy_number_change(-1));
        assert!(is_copy_number_change(4));
    }
}
