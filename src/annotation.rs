use std::collections::BTreeSet;

use tracing::{debug, info, info_span};

use crate::classifier::classify;
use crate::error::{GeneAnnotatorError, GenotypeFormatError};
use crate::evolutionary_event::{join_labels, EvolutionaryEventType};
use crate::gene_index::GeneIntervalIndex;
use crate::output::AnnotatedTree;
use crate::substitution_model::SubstitutionModel;
use crate::tree::Tree;
use crate::variant_site::VariantSite;

/// Separator between event labels when an event set is printed
pub const EVENT_LABEL_SEPARATOR: &str = "+";

/// Gene names are stored with `;` replaced by `/`, since `;` separates list items downstream
pub fn normalize_gene_name(gene: &str) -> String {
    gene.replace(';', "/")
}

/// A genotype change at a variant site inside a gene, observed on the branch above a node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneEvent {
    pub site: VariantSite,
    pub events: BTreeSet<EvolutionaryEventType>,
    pub gene: String,
}

impl GeneEvent {
    pub fn new(site: VariantSite, events: BTreeSet<EvolutionaryEventType>, gene: &str) -> Self {
        Self {
            site,
            events,
            gene: normalize_gene_name(gene),
        }
    }

    /// `true` unless the change is exactly one plain single mutation
    pub fn violates_isa(&self) -> bool {
        self.events.len() != 1 || self.events.iter().any(|e| e.violates_isa())
    }

    pub fn event_labels(&self) -> String {
        join_labels(&self.events, EVENT_LABEL_SEPARATOR)
    }
}

/// The gene events of one node
///
/// `full` is filled while walking the tree. `isa` and `fsa` split `full` once every node has
/// been visited; every event in `full` ends up in exactly one of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeGeneBucket {
    pub node: usize,
    pub full: Vec<GeneEvent>,
    pub isa: Vec<GeneEvent>,
    pub fsa: Vec<GeneEvent>,
}

impl NodeGeneBucket {
    pub fn new(node: usize) -> Self {
        Self {
            node,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }
}

/// Walks a genotyped tree and collects the gene events on every branch
pub struct TreeAnnotationEngine<'a> {
    model: &'a SubstitutionModel,
    genes: &'a GeneIntervalIndex,
    sites: &'a [VariantSite],
}

impl<'a> TreeAnnotationEngine<'a> {
    pub fn new(
        model: &'a SubstitutionModel,
        genes: &'a GeneIntervalIndex,
        sites: &'a [VariantSite],
    ) -> Self {
        Self {
            model,
            genes,
            sites,
        }
    }

    /// Collect, classify and project the gene events of the whole tree
    pub fn annotate(&self, tree: &Tree) -> Result<AnnotatedTree, GeneAnnotatorError> {
        let mut buckets = self.collect(tree)?;
        classify(&mut buckets);
        Ok(AnnotatedTree::new(buckets))
    }

    /// First pass: fill the `full` bucket of every node
    ///
    /// All genotypes are checked before any event is collected, so a run either covers the
    /// whole tree or fails. The returned buckets are indexed by node id.
    pub fn collect(&self, tree: &Tree) -> Result<Vec<NodeGeneBucket>, GeneAnnotatorError> {
        let _span = info_span!("collect_gene_events", nodes = tree.node_count()).entered();
        let genotypes = self.decode_genotypes(tree)?;

        // the gene of a site is the same on every branch
        let site_genes: Vec<Option<&str>> = self
            .sites
            .iter()
            .map(|site| self.genes.lookup(&site.chromosome, site.position))
            .collect();
        debug!(
            sites = self.sites.len(),
            sites_in_genes = site_genes.iter().filter(|g| g.is_some()).count(),
            "Resolved variant sites to genes"
        );

        let mut buckets: Vec<NodeGeneBucket> =
            (0..tree.node_count()).map(NodeGeneBucket::new).collect();
        for id in tree.preorder() {
            let parent = match tree.node(id).parent {
                Some(parent) => parent,
                None => continue,
            };
            buckets[id].full =
                self.branch_events(&genotypes[parent], &genotypes[id], &site_genes)?;
        }

        info!(
            events = buckets.iter().map(|b| b.full.len()).sum::<usize>(),
            annotated_nodes = buckets.iter().filter(|b| !b.is_empty()).count(),
            "Collected gene events"
        );
        Ok(buckets)
    }

    /// Gene events on the branch between two genotype vectors
    fn branch_events(
        &self,
        parent: &[usize],
        child: &[usize],
        site_genes: &[Option<&str>],
    ) -> Result<Vec<GeneEvent>, GeneAnnotatorError> {
        let mut result = Vec::new();
        for (s, gene) in site_genes.iter().enumerate() {
            let gene = match gene {
                Some(gene) => gene,
                None => continue,
            };
            if parent[s] == child[s] {
                continue;
            }
            let events = self.model.get_evolutionary_events(parent[s], child[s])?;
            if !events.is_empty() {
                result.push(GeneEvent::new(self.sites[s].clone(), events, gene));
            }
        }
        Ok(result)
    }

    /// Turn the raw genotype calls of every node into state ids of the model
    ///
    /// Leaves and non-root nodes need their own genotypes, and every parent of a non-root node
    /// needs them, too. Together that is every node of the tree.
    pub fn decode_genotypes(&self, tree: &Tree) -> Result<Vec<Vec<usize>>, GenotypeFormatError> {
        let nr_of_states = self.model.nr_of_states();
        tree.nodes()
            .iter()
            .map(|node| {
                let values = node.genotypes.as_ref().ok_or_else(|| {
                    GenotypeFormatError::new(node.id, "the node carries no genotypes")
                })?;
                if values.len() != self.sites.len() {
                    return Err(GenotypeFormatError::new(
                        node.id,
                        format!(
                            "expected {} genotypes (one per variant site) but found {}",
                            self.sites.len(),
                            values.len()
                        ),
                    ));
                }
                values
                    .iter()
                    .enumerate()
                    .map(|(s, value)| match value.as_integer() {
                        Some(state) if state >= 0 && (state as usize) < nr_of_states => {
                            Ok(state as usize)
                        }
                        Some(state) => Err(GenotypeFormatError::new(
                            node.id,
                            format!(
                                "genotype {} at site {} is not a state of the {} model (0-{})",
                                state,
                                s,
                                self.model.variant(),
                                nr_of_states - 1
                            ),
                        )),
                        None => Err(GenotypeFormatError::new(
                            node.id,
                            format!("genotype {:?} at site {} is not a number", value, s),
                        )),
                    })
                    .collect()
            })
            .collect()
    }
}
