use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{ConfigurationError, InvalidTransitionError};
use crate::evolutionary_event::EvolutionaryEventType;
use crate::model_variant::{ModelDescriptor, ModelVariant};

/// A finite-state genotype substitution model
///
/// One engine serves every `ModelVariant`; the variant only chooses the tables (alphabet, allele
/// counts, relative rates and event relation) the engine works with. The model is read-only after
/// construction and can be shared freely.
#[derive(Debug, Clone)]
pub struct SubstitutionModel {
    variant: ModelVariant,
    deletion_rate: f64,
    relative_rates: Vec<f64>,
    rate_matrix: Vec<f64>,
}

impl SubstitutionModel {
    /// Build a model and its normalized rate matrix
    ///
    /// The deletion rate is measured relative to the mutation rate. It has no effect on the
    /// mutation-only model but still has to be non-negative.
    pub fn new(variant: ModelVariant, deletion_rate: f64) -> Result<Self, ConfigurationError> {
        if !deletion_rate.is_finite() || deletion_rate < 0.0 {
            return Err(ConfigurationError::new(
                "deletion rate",
                format!(
                    "{} is out of bounds for the {} model; it must be a finite number not smaller than 0",
                    deletion_rate, variant
                ),
            ));
        }
        let n = variant.descriptor().nr_of_states();
        let mut model = Self {
            variant,
            deletion_rate,
            relative_rates: vec![0.0; n * (n - 1)],
            rate_matrix: vec![0.0; n * n],
        };
        model.setup_relative_rates();
        model.setup_rate_matrix()?;
        debug!(
            model = %variant,
            deletion_rate,
            nr_of_states = n,
            "Set up substitution model"
        );
        Ok(model)
    }

    /// The mutation-only model with 4 genotypes
    pub fn mutation_extended() -> Self {
        Self::new(ModelVariant::MutationExtended, 0.0).expect("0 is a valid deletion rate")
    }

    fn descriptor(&self) -> &'static ModelDescriptor {
        self.variant.descriptor()
    }

    /// Fill the off-diagonal relative rates, row by row, skipping the diagonal
    pub fn setup_relative_rates(&mut self) {
        let deletion_rate = self.deletion_rate;
        self.relative_rates.clear();
        for (i, row) in self.descriptor().relative_rates.iter().enumerate() {
            for (j, rate) in row.iter().enumerate() {
                if i != j {
                    self.relative_rates.push(rate.value(deletion_rate));
                }
            }
        }
    }

    /// Build the rate matrix from the relative rates
    ///
    /// Every diagonal entry is the negative sum of its row. Afterwards the whole matrix is
    /// divided by the sum of the absolute diagonal values, which makes it describe exactly one
    /// expected substitution per unit of branch length. Fails if that sum is not a positive finite
    /// number, which happens when the deletion rate is too large to add up.
    pub fn setup_rate_matrix(&mut self) -> Result<(), ConfigurationError> {
        let n = self.nr_of_states();
        for i in 0..n {
            let mut row_sum = 0.0;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let rate = self.relative_rates[i * (n - 1) + if j < i { j } else { j - 1 }];
                self.rate_matrix[i * n + j] = rate;
                row_sum += rate;
            }
            self.rate_matrix[i * n + i] = -row_sum;
        }

        let subst: f64 = (0..n).map(|i| -self.rate_matrix[i * n + i]).sum();
        if !subst.is_finite() || subst <= 0.0 {
            return Err(ConfigurationError::new(
                "deletion rate",
                format!(
                    "{} makes the total substitution rate of the {} model {}",
                    self.deletion_rate, self.variant, subst
                ),
            ));
        }
        for rate in self.rate_matrix.iter_mut() {
            *rate /= subst;
        }
        Ok(())
    }

    /// Classify how the `parent` genotype turned into the `child` genotype
    ///
    /// Returns an empty set if nothing changed, and an error if the model does not allow the
    /// transition at all.
    pub fn get_evolutionary_events(
        &self,
        parent: usize,
        child: usize,
    ) -> Result<BTreeSet<EvolutionaryEventType>, InvalidTransitionError> {
        let n = self.nr_of_states();
        let invalid = || InvalidTransitionError {
            model: self.variant,
            parent,
            child,
        };
        if parent >= n || child >= n {
            return Err(invalid());
        }
        if parent == child {
            return Ok(BTreeSet::new());
        }
        self.descriptor()
            .relation(parent, child)
            .map(|events| events.iter().copied().collect())
            .ok_or_else(invalid)
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn deletion_rate(&self) -> f64 {
        self.deletion_rate
    }

    pub fn nr_of_states(&self) -> usize {
        self.descriptor().nr_of_states()
    }

    /// Genotype of the tree root
    pub fn root_genotype(&self) -> usize {
        0
    }

    /// Genotype of a constant site
    pub fn const_genotype(&self) -> usize {
        0
    }

    pub fn is_variant(&self, genotype: usize) -> bool {
        genotype != self.root_genotype()
    }

    /// Human readable genotype, e.g. `0/1`
    pub fn genotype_label(&self, genotype: usize) -> Option<&'static str> {
        self.descriptor().labels.get(genotype).copied()
    }

    /// All genotype labels, joined by `delimiter`
    pub fn alphabet(&self, delimiter: &str) -> String {
        self.descriptor().labels.join(delimiter)
    }

    /// Number of alleles still present in a genotype
    pub fn nr_of_alleles(&self, genotype: usize) -> Option<u8> {
        self.descriptor().existing_alleles.get(genotype).copied()
    }

    pub fn nr_of_alt_alleles(&self, genotype: usize) -> Option<u8> {
        self.descriptor().alt_alleles.get(genotype).copied()
    }

    /// See the `TERNARY_*` constants in `model_variant`
    pub fn ternary_code(&self, genotype: usize) -> Option<i8> {
        self.descriptor().ternary_codes.get(genotype).copied()
    }

    /// The allele counts (copy numbers) the model covers
    pub fn modeled_alleles(&self) -> &'static [u8] {
        self.descriptor().modeled_alleles
    }

    /// Off-diagonal relative rates in row-major order
    pub fn relative_rates(&self) -> &[f64] {
        &self.relative_rates
    }

    pub fn rate(&self, from: usize, to: usize) -> f64 {
        self.rate_matrix[from * self.nr_of_states() + to]
    }

    pub fn rate_matrix(&self) -> Vec<Vec<f64>> {
        self.rate_matrix
            .chunks(self.nr_of_states())
            .map(|row| row.to_vec())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolutionary_event::EvolutionaryEventType::*;

    const EPSILON: f64 = 1e-12;

    fn all_models(deletion_rate: f64) -> Vec<SubstitutionModel> {
        vec![
            SubstitutionModel::new(ModelVariant::MutationExtended, deletion_rate).unwrap(),
            SubstitutionModel::new(ModelVariant::MutationDeletion, deletion_rate).unwrap(),
            SubstitutionModel::new(ModelVariant::ConstrainedMutationDeletion, deletion_rate)
                .unwrap(),
        ]
    }

    #[test]
    fn test_rate_matrix_is_normalized() {
        for deletion_rate in &[0.0, 0.1, 1.0, 3.5, 1000.0] {
            for model in all_models(*deletion_rate) {
                let n = model.nr_of_states();
                let subst: f64 = (0..n).map(|i| -model.rate(i, i)).sum();
                assert!((subst - 1.0).abs() < EPSILON, "{} {}", model.variant(), subst);

                for row in model.rate_matrix() {
                    let row_sum: f64 = row.iter().sum();
                    assert!(row_sum.abs() < EPSILON);
                }
            }
        }
    }

    #[test]
    fn test_extended_rate_matrix() {
        let model = SubstitutionModel::mutation_extended();
        // row sums before normalization: 1, 2/3, 1, 2/3
        let subst = 1.0 + 2.0 / 3.0 + 1.0 + 2.0 / 3.0;
        assert!((model.rate(0, 1) - 1.0 / subst).abs() < EPSILON);
        assert!((model.rate(1, 3) - (1.0 / 3.0) / subst).abs() < EPSILON);
        assert!((model.rate(2, 3) - (2.0 / 3.0) / subst).abs() < EPSILON);
        assert_eq!(model.rate(3, 0), 0.0);
        assert_eq!(model.relative_rates().len(), 12);
        assert!((model.relative_rates()[3] - 1.0 / 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_deletion_rate_scales_relative_rates() {
        let model = SubstitutionModel::new(ModelVariant::MutationDeletion, 0.4).unwrap();
        let rates = model.relative_rates();
        assert_eq!(rates.len(), 42);
        assert!((rates[3] - 0.4).abs() < EPSILON); // 0/0 -> 0/-
        assert!((rates[9] - 0.2).abs() < EPSILON); // 0/1 -> 0/-
        assert!((rates[10] - 0.2).abs() < EPSILON); // 0/1 -> 1/-
        assert!((rates[28] - 0.5).abs() < EPSILON); // 0/- -> 1/-
        assert!((rates[35] - 0.2).abs() < EPSILON); // 1/- -> -
        assert!(rates[36..].iter().all(|r| *r == 0.0)); // nothing leaves the full deletion

        let model = SubstitutionModel::new(ModelVariant::ConstrainedMutationDeletion, 0.4).unwrap();
        assert_eq!(model.relative_rates().len(), 30);
        assert!((model.relative_rates()[29] - 1.0 / 6.0).abs() < EPSILON); // 1/- -> 0/-
    }

    #[test]
    fn test_negative_deletion_rate() {
        for variant in &[
            ModelVariant::MutationExtended,
            ModelVariant::MutationDeletion,
            ModelVariant::ConstrainedMutationDeletion,
        ] {
            assert!(SubstitutionModel::new(*variant, -0.1).is_err());
            assert!(SubstitutionModel::new(*variant, f64::NAN).is_err());
            assert!(SubstitutionModel::new(*variant, f64::INFINITY).is_err());
        }
    }

    #[test]
    fn test_overflowing_deletion_rate() {
        // finite, but the row sums overflow
        assert!(SubstitutionModel::new(ModelVariant::MutationDeletion, 1e308).is_err());
        assert!(
            SubstitutionModel::new(ModelVariant::ConstrainedMutationDeletion, 1e308).is_err()
        );

        // large rates that still add up keep the matrix normalized
        let model = SubstitutionModel::new(ModelVariant::MutationDeletion, 1e300).unwrap();
        let n = model.nr_of_states();
        let subst: f64 = (0..n).map(|i| -model.rate(i, i)).sum();
        assert!((subst - 1.0).abs() < EPSILON);
        assert!(model.rate(0, 1) > 0.0);
    }

    #[test]
    fn test_no_events_without_change() {
        for model in all_models(0.2) {
            for p in 0..model.nr_of_states() {
                assert!(model.get_evolutionary_events(p, p).unwrap().is_empty());
            }
        }
    }

    #[test]
    fn test_extended_events() {
        let model = SubstitutionModel::mutation_extended();
        let single = |p, c| {
            let events = model.get_evolutionary_events(p, c).unwrap();
            assert_eq!(events.len(), 1);
            *events.iter().next().unwrap()
        };
        assert_eq!(single(0, 1), SingleMutation);
        assert_eq!(single(0, 2), CoinHomoDoubleMutation);
        assert_eq!(single(0, 3), CoinHeteroDoubleMutation);
        assert_eq!(single(1, 0), SingleBackMutation);
        assert_eq!(single(1, 2), HomoSingleMutationAddition);
        assert_eq!(single(1, 3), HeteroSingleMutationAddition);
        assert_eq!(single(2, 0), CoinDoubleBackMutation);
        assert_eq!(single(2, 1), SingleBackMutation);
        assert_eq!(single(2, 3), HeteroSubstSingleMutation);
        assert_eq!(single(3, 0), CoinDoubleBackMutation);
        assert_eq!(single(3, 1), SingleBackMutation);
        assert_eq!(single(3, 2), HomoSubstSingleMutation);

        assert_eq!(
            model.get_evolutionary_events(0, 4),
            Err(InvalidTransitionError {
                model: ModelVariant::MutationExtended,
                parent: 0,
                child: 4
            })
        );
    }

    #[test]
    fn test_deletion_events() {
        let model = SubstitutionModel::new(ModelVariant::MutationDeletion, 0.1).unwrap();
        let events = |p, c| model.get_evolutionary_events(p, c).unwrap();
        assert!(events(0, 4).contains(&SingleDeletionNotLoh));
        assert!(events(0, 5).contains(&CoinDeletionAndMutation));
        assert!(events(1, 5).contains(&SingleDeletionLoh));
        assert!(events(3, 6).contains(&CoinDoubleDeletion));
        assert!(events(4, 5).contains(&SingleDeletionMutationAddition));
        assert!(events(5, 4).contains(&SingleDeletionBackMutationAddition));
        assert!(events(5, 6).contains(&SingleDeletionAddition));

        // a lost allele does not come back
        assert!(model.get_evolutionary_events(4, 0).is_err());
        assert!(model.get_evolutionary_events(5, 2).is_err());
        // nothing leaves the full deletion
        for child in 0..6 {
            assert!(model.get_evolutionary_events(6, child).is_err());
        }
    }

    #[test]
    fn test_constrained_events() {
        let model =
            SubstitutionModel::new(ModelVariant::ConstrainedMutationDeletion, 0.1).unwrap();
        assert_eq!(model.nr_of_states(), 6);
        assert!(model.get_evolutionary_events(0, 6).is_err());
        assert!(model.get_evolutionary_events(4, 6).is_err());
        assert!(model.get_evolutionary_events(4, 1).is_err());
        assert!(model
            .get_evolutionary_events(4, 5)
            .unwrap()
            .contains(&SingleDeletionMutationAddition));
    }

    #[test]
    fn test_genotype_tables() {
        let model = SubstitutionModel::new(ModelVariant::MutationDeletion, 0.0).unwrap();
        assert_eq!(model.alphabet(","), "0/0,0/1,1/1,1/2,0/.,1/.,./.");
        assert_eq!(model.genotype_label(1), Some("0/1"));
        assert_eq!(model.genotype_label(7), None);
        assert_eq!(model.nr_of_alleles(4), Some(1));
        assert_eq!(model.nr_of_alleles(6), Some(0));
        assert_eq!(model.nr_of_alt_alleles(5), Some(1));
        assert_eq!(model.ternary_code(6), Some(-3));
        assert_eq!(model.modeled_alleles(), &[0, 1, 2]);
        assert!(!model.is_variant(model.root_genotype()));
        assert!(model.is_variant(3));
        assert_eq!(model.const_genotype(), 0);
    }
}
