pub mod annotation;
pub mod chromosome;
pub mod classifier;
pub mod config;
pub mod error;
pub mod evolutionary_event;
pub mod gene_filter;
pub mod gene_index;
pub mod input;
pub mod interval;
pub mod model_variant;
pub mod output;
pub mod substitution_model;
pub mod tree;
pub mod variant_site;

use tracing::info_span;

pub use crate::annotation::{
    normalize_gene_name, GeneEvent, NodeGeneBucket, TreeAnnotationEngine, EVENT_LABEL_SEPARATOR,
};
pub use crate::chromosome::ChromosomeLabel;
pub use crate::classifier::{classify, count_occurrences, is_isa};
pub use crate::config::AnnotatorConfig;
use crate::error::GeneAnnotatorError;
pub use crate::evolutionary_event::{join_labels, EvolutionaryEventType};
pub use crate::gene_index::GeneIntervalIndex;
pub use crate::interval::GeneInterval;
pub use crate::model_variant::{is_copy_number_change, ModelVariant};
pub use crate::output::{AnnotatedTree, BucketColumns, BucketKind, MetadataValue};
pub use crate::substitution_model::SubstitutionModel;
pub use crate::tree::{GenotypeValue, Node, Tree};
pub use crate::variant_site::VariantSite;

/// Attach gene events to every branch of `tree` and split them into ISA and FSA events
///
/// The genotypes of every node must hold one state id of `model` per entry of `sites`.
pub fn annotate_tree(
    tree: &Tree,
    sites: &[VariantSite],
    model: &SubstitutionModel,
    genes: &GeneIntervalIndex,
) -> Result<AnnotatedTree, GeneAnnotatorError> {
    let _span = info_span!("annotate_tree", model = %model.variant()).entered();
    TreeAnnotationEngine::new(model, genes, sites).annotate(tree)
}

/// Same as `annotate_tree`, with the substitution model built from `config`
pub fn annotate_with_config(
    tree: &Tree,
    sites: &[VariantSite],
    config: &AnnotatorConfig,
    genes: &GeneIntervalIndex,
) -> Result<AnnotatedTree, GeneAnnotatorError> {
    config.validate()?;
    let model = config.build_model()?;
    annotate_tree(tree, sites, &model, genes)
}
