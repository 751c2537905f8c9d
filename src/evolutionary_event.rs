use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::fmt;

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::ParseError;

/// The kind of change that turns the genotype of a parent into the genotype of its child
///
/// Genotypes in the comments use either the diploid notation (`0/0`, `0/1`, `1/1`, `1/1'`,
/// `0/-`, `1/-`, `-`) or the triploid one (`000`, `001`, ...).
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum EvolutionaryEventType {
    /// 0/0 -> 0/1
    SingleMutation = 0,
    /// 0/0 -> 1/1
    CoinHomoDoubleMutation = 1,
    /// 0/0 -> 1/1'
    CoinHeteroDoubleMutation = 2,
    /// 000 -> 111
    CoinHomoTripleMutation = 3,
    /// 000 -> 111'
    HybridHomoHeteroTripleMutation = 4,
    /// 000 -> 11'1''
    HeteroCoinTripleMutation = 5,
    /// 0/1 -> 0/0, 1/1 -> 0/1, 1/1' -> 0/1
    SingleBackMutation = 6,
    /// 1/1 -> 0/0, 1/1' -> 0/0
    CoinDoubleBackMutation = 7,
    /// 111 -> 000
    TripleBackMutation = 8,
    /// 111 -> 011'
    HybridHomoHeteroSingleSubstBackMutation = 9,
    /// 0/1 -> 1/1
    HomoSingleMutationAddition = 10,
    /// 001 -> 111
    HomoDoubleMutationAddition = 11,
    /// 0/1 -> 1/1'
    HeteroSingleMutationAddition = 12,
    /// 001 -> 11'1''
    HeteroDoubleMutationAddition = 13,
    /// 011 -> 111'
    HybridHomoHeteroSingleMutationAddition = 14,
    /// 001 -> 111'
    HybridHomoHeteroDoubleMutationAddition = 15,
    /// 1/1' -> 1/1
    HomoSubstSingleMutation = 16,
    /// 11'1'' -> 111
    HomoSubstDoubleMutation = 17,
    /// 1/1 -> 1/1'
    HeteroSubstSingleMutation = 18,
    /// 111 -> 11'1''
    HeteroSubstDoubleMutation = 19,
    /// 011' -> 011
    HybridHomoHeteroSubstSingleMutation = 20,
    /// 011' -> 111
    HomoSingleSubstAndMutation = 21,
    /// 011 -> 11'1''
    HeteroSingleSubstAndMutation = 22,
    /// 0/1 -> 0/- or 1/-, 1/1' -> 1/-
    SingleDeletionLoh = 23,
    /// 001 -> 0/-
    LossOfHeterozygosityDoubleDeletion = 24,
    /// 0/0 -> 0/-, 1/1 -> 1/-
    SingleDeletionNotLoh = 25,
    /// 0/0 -> 1/-
    CoinDeletionAndMutation = 26,
    /// 001 -> 1/1
    SingleDeletionAndHomoSingleMutationAddition = 27,
    /// 001 -> 1/1'
    SingleDeletionAndHeteroSingleMutationAddition = 28,
    /// 000 -> 1/1
    SingleDeletionAndHomoCoinDoubleMutation = 29,
    /// 000 -> 1/1'
    SingleDeletionAndHeteroCoinDoubleMutation = 30,
    /// 1/1 -> 0/-, 1/1' -> 0/-
    CoinDeletionAndBackMutation = 31,
    /// 111 -> 0/0
    SingleDeletionAndDoubleBackMutation = 32,
    /// 0/- -> 1/-
    SingleDeletionMutationAddition = 33,
    /// 011' -> 1/1
    SingleDeletionAndHomoSubstSingleMutation = 34,
    /// 011 -> 1/1'
    SingleDeletionAndHeteroSubstSingleMutation = 35,
    /// 1/- -> 0/-
    SingleDeletionBackMutationAddition = 36,
    /// 0/- -> -, 1/- -> -
    SingleDeletionAddition = 37,
    /// 0/0 -> -, 0/1 -> -, 1/1 -> -, 1/1' -> -
    CoinDoubleDeletion = 38,
    /// 000 -> 1/-
    DoubleDeletionAndSingleMutation = 39,
    /// 111 -> 0/-
    DoubleDeletionAndSingleBackMutation = 40,
    /// 000 -> -
    TripleDeletion = 41,
    /// 0/0 -> 000
    SingleInsertion = 42,
    /// 0/- -> 000
    DoubleInsertion = 43,
    /// 0/0 -> 001
    SingleInsertionAndMutation = 44,
    /// 0/- -> 001
    DoubleInsertionAndMutation = 45,
    /// 0/1 -> 000
    SingleInsertionAndBackMutation = 46,
    /// 1/- -> 000
    DoubleInsertionAndBackMutation = 47,
    /// 0/1 -> 111
    SingleInsertionAndMutationAddition = 48,
    /// 1/1 -> 011'
    SingleInsertionAndBackAndSubstMutation = 49,
    /// 1/- -> 011'
    DoubleInsertionAndBackAndSubstMutation = 50,
    /// 1/1 -> 111'
    SingleInsertionAndSubstMutation = 51,
    /// 1/- -> 111'
    DoubleInsertionAndSubstMutation = 52,
}

use EvolutionaryEventType::*;

static ALL_EVENT_TYPES: [EvolutionaryEventType; 53] = [
    SingleMutation,
    CoinHomoDoubleMutation,
    CoinHeteroDoubleMutation,
    CoinHomoTripleMutation,
    HybridHomoHeteroTripleMutation,
    HeteroCoinTripleMutation,
    SingleBackMutation,
    CoinDoubleBackMutation,
    TripleBackMutation,
    HybridHomoHeteroSingleSubstBackMutation,
    HomoSingleMutationAddition,
    HomoDoubleMutationAddition,
    HeteroSingleMutationAddition,
    HeteroDoubleMutationAddition,
    HybridHomoHeteroSingleMutationAddition,
    HybridHomoHeteroDoubleMutationAddition,
    HomoSubstSingleMutation,
    HomoSubstDoubleMutation,
    HeteroSubstSingleMutation,
    HeteroSubstDoubleMutation,
    HybridHomoHeteroSubstSingleMutation,
    HomoSingleSubstAndMutation,
    HeteroSingleSubstAndMutation,
    SingleDeletionLoh,
    LossOfHeterozygosityDoubleDeletion,
    SingleDeletionNotLoh,
    CoinDeletionAndMutation,
    SingleDeletionAndHomoSingleMutationAddition,
    SingleDeletionAndHeteroSingleMutationAddition,
    SingleDeletionAndHomoCoinDoubleMutation,
    SingleDeletionAndHeteroCoinDoubleMutation,
    CoinDeletionAndBackMutation,
    SingleDeletionAndDoubleBackMutation,
    SingleDeletionMutationAddition,
    SingleDeletionAndHomoSubstSingleMutation,
    SingleDeletionAndHeteroSubstSingleMutation,
    SingleDeletionBackMutationAddition,
    SingleDeletionAddition,
    CoinDoubleDeletion,
    DoubleDeletionAndSingleMutation,
    DoubleDeletionAndSingleBackMutation,
    TripleDeletion,
    SingleInsertion,
    DoubleInsertion,
    SingleInsertionAndMutation,
    DoubleInsertionAndMutation,
    SingleInsertionAndBackMutation,
    DoubleInsertionAndBackMutation,
    SingleInsertionAndMutationAddition,
    SingleInsertionAndBackAndSubstMutation,
    DoubleInsertionAndBackAndSubstMutation,
    SingleInsertionAndSubstMutation,
    DoubleInsertionAndSubstMutation,
];

impl EvolutionaryEventType {
    /// The short label that ends up in the annotated tree
    pub fn as_str(&self) -> &'static str {
        match self {
            SingleMutation => "SM",
            CoinHomoDoubleMutation => "CHoDM",
            CoinHeteroDoubleMutation => "CHeDM",
            CoinHomoTripleMutation => "CHoTM",
            HybridHomoHeteroTripleMutation => "HoHeCTM",
            HeteroCoinTripleMutation => "HeCTM",
            SingleBackMutation => "SB",
            CoinDoubleBackMutation => "CDB",
            TripleBackMutation => "TB",
            HybridHomoHeteroSingleSubstBackMutation => "HoHeSSB",
            HomoSingleMutationAddition => "HoSMA",
            HomoDoubleMutationAddition => "HoDMA",
            HeteroSingleMutationAddition => "HeSMA",
            HeteroDoubleMutationAddition => "HeDMA",
            HybridHomoHeteroSingleMutationAddition => "HoHeSMA",
            HybridHomoHeteroDoubleMutationAddition => "HoHeDMA",
            HomoSubstSingleMutation => "HoSubSM",
            HomoSubstDoubleMutation => "HoSubDM",
            HeteroSubstSingleMutation => "HeSubSM",
            HeteroSubstDoubleMutation => "HeSubDM",
            HybridHomoHeteroSubstSingleMutation => "HoHeSubSM",
            HomoSingleSubstAndMutation => "HoSSubM",
            HeteroSingleSubstAndMutation => "HeSSubM",
            SingleDeletionLoh => "SDLOH",
            LossOfHeterozygosityDoubleDeletion => "LOHDD",
            SingleDeletionNotLoh => "SDNLOH",
            CoinDeletionAndMutation => "CDM",
            SingleDeletionAndHomoSingleMutationAddition => "SDHoSMA",
            SingleDeletionAndHeteroSingleMutationAddition => "SDHeSMA",
            SingleDeletionAndHomoCoinDoubleMutation => "SDHoCDM",
            SingleDeletionAndHeteroCoinDoubleMutation => "SDHeCDM",
            CoinDeletionAndBackMutation => "CDBM",
            SingleDeletionAndDoubleBackMutation => "SDDB",
            SingleDeletionMutationAddition => "SDMA",
            SingleDeletionAndHomoSubstSingleMutation => "SDHoSubSA",
            SingleDeletionAndHeteroSubstSingleMutation => "SDHeSubSA",
            SingleDeletionBackMutationAddition => "SDBA",
            SingleDeletionAddition => "SDA",
            CoinDoubleDeletion => "CDD",
            DoubleDeletionAndSingleMutation => "DDSM",
            DoubleDeletionAndSingleBackMutation => "DDSB",
            TripleDeletion => "TD",
            SingleInsertion => "SI",
            DoubleInsertion => "DI",
            SingleInsertionAndMutation => "SIM",
            DoubleInsertionAndMutation => "DIM",
            SingleInsertionAndBackMutation => "SIB",
            DoubleInsertionAndBackMutation => "DIB",
            SingleInsertionAndMutationAddition => "SIMA",
            SingleInsertionAndBackAndSubstMutation => "SIBSubM",
            DoubleInsertionAndBackAndSubstMutation => "DIBSubM",
            SingleInsertionAndSubstMutation => "SISubM",
            DoubleInsertionAndSubstMutation => "DISubM",
        }
    }

    /// Everything but a plain single mutation breaks the infinite-sites assumption
    pub fn violates_isa(&self) -> bool {
        *self != SingleMutation
    }

    pub fn iter() -> std::iter::Copied<std::slice::Iter<'static, EvolutionaryEventType>> {
        ALL_EVENT_TYPES.iter().copied()
    }
}

impl fmt::Display for EvolutionaryEventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EvolutionaryEventType {
    type Error = ParseError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::iter()
            .find(|event| event.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::somewhere("label of evolutionary event", s.to_string()))
    }
}

/// Join the labels of an event set, e.g. `SDLOH+CDD`
pub fn join_labels(events: &BTreeSet<EvolutionaryEventType>, separator: &str) -> String {
    events
        .iter()
        .map(EvolutionaryEventType::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}
