use serde::Serialize;

use crate::annotation::{GeneEvent, NodeGeneBucket};

pub const METADATA_INDEX: &str = "index";
pub const METADATA_CHR: &str = "chr";
pub const METADATA_POS: &str = "pos";
pub const METADATA_REF_NUC: &str = "ref_nuc";
pub const METADATA_ALT_NUC: &str = "alt_nuc";
pub const METADATA_EVENT_TYPE: &str = "event_type";
pub const METADATA_GENE: &str = "gene";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BucketKind {
    Full,
    Isa,
    Fsa,
}

impl BucketKind {
    /// Appended to the metadata keys of this bucket
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Full => "",
            Self::Isa => "_isa",
            Self::Fsa => "_fsa",
        }
    }

    pub fn iter() -> impl Iterator<Item = BucketKind> {
        [Self::Full, Self::Isa, Self::Fsa].iter().copied()
    }
}

/// One bucket of gene events as parallel columns
///
/// Entry `i` of every column describes the same event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BucketColumns {
    pub chromosome: Vec<String>,
    pub position: Vec<u64>,
    pub ref_nuc: Vec<String>,
    pub alt_nuc: Vec<String>,
    pub event_type: Vec<String>,
    pub gene: Vec<String>,
}

impl BucketColumns {
    pub fn from_events(events: &[GeneEvent]) -> Self {
        let mut columns = Self::default();
        for event in events {
            columns.chromosome.push(event.site.chromosome.to_string());
            columns.position.push(event.site.position);
            columns.ref_nuc.push(event.site.reference.clone());
            columns.alt_nuc.push(event.site.joined_alternatives());
            columns.event_type.push(event.event_labels());
            columns.gene.push(event.gene.clone());
        }
        columns
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Index(usize),
    Positions(Vec<u64>),
    Text(Vec<String>),
}

/// The result of annotating a tree: one bucket per node, indexed by node id
#[derive(Debug, Clone)]
pub struct AnnotatedTree {
    buckets: Vec<NodeGeneBucket>,
}

impl AnnotatedTree {
    pub(crate) fn new(buckets: Vec<NodeGeneBucket>) -> Self {
        Self { buckets }
    }

    pub fn bucket(&self, node: usize) -> Option<&NodeGeneBucket> {
        self.buckets.get(node)
    }

    pub fn buckets(&self) -> &[NodeGeneBucket] {
        &self.buckets
    }

    /// Nodes that have at least one gene event, in node id order
    pub fn annotated_nodes(&self) -> impl Iterator<Item = &NodeGeneBucket> {
        self.buckets.iter().filter(|b| !b.is_empty())
    }

    pub fn columns(&self, node: usize, kind: BucketKind) -> BucketColumns {
        match self.buckets.get(node) {
            Some(bucket) => BucketColumns::from_events(match kind {
                BucketKind::Full => &bucket.full,
                BucketKind::Isa => &bucket.isa,
                BucketKind::Fsa => &bucket.fsa,
            }),
            None => BucketColumns::default(),
        }
    }

    /// The key/value pairs to attach to a node before the tree is written out
    ///
    /// Empty for nodes without gene events. Buckets without events are left out.
    pub fn metadata(&self, node: usize) -> Vec<(String, MetadataValue)> {
        let mut result = Vec::new();
        match self.buckets.get(node) {
            Some(bucket) if !bucket.is_empty() => {
                result.push((METADATA_INDEX.to_string(), MetadataValue::Index(node)))
            }
            _ => return result,
        }
        for kind in BucketKind::iter() {
            let columns = self.columns(node, kind);
            if columns.is_empty() {
                continue;
            }
            let key = |name: &str| format!("{}{}", name, kind.suffix());
            result.push((key(METADATA_CHR), MetadataValue::Text(columns.chromosome)));
            result.push((key(METADATA_POS), MetadataValue::Positions(columns.position)));
            result.push((key(METADATA_REF_NUC), MetadataValue::Text(columns.ref_nuc)));
            result.push((key(METADATA_ALT_NUC), MetadataValue::Text(columns.alt_nuc)));
            result.push((
                key(METADATA_EVENT_TYPE),
                MetadataValue::Text(columns.event_type),
            ));
            result.push((key(METADATA_GENE), MetadataValue::Text(columns.gene)));
        }
        result
    }

    /// Number of gene events in each bucket kind over the whole tree
    pub fn totals(&self) -> (usize, usize, usize) {
        self.buckets.iter().fold((0, 0, 0), |(full, isa, fsa), b| {
            (full + b.full.len(), isa + b.isa.len(), fsa + b.fsa.len())
        })
    }
}
