use std::collections::HashMap;

use tracing::debug;

use crate::chromosome::ChromosomeLabel;
use crate::interval::GeneInterval;

/// The gene intervals of one chromosome, sorted by (start, end)
#[derive(Debug, Default)]
struct ChromosomeGenes {
    intervals: Vec<GeneInterval>,
    /// `max_end[i]` is the largest end position among `intervals[..=i]`
    max_end: Vec<u64>,
}

impl ChromosomeGenes {
    fn new(mut intervals: Vec<GeneInterval>) -> Self {
        // stable, so identical ranges keep their input order
        intervals.sort_by_key(|gene| (gene.start, gene.end));
        let max_end = intervals
            .iter()
            .scan(0, |max, gene| {
                *max = gene.end.max(*max);
                Some(*max)
            })
            .collect();
        Self { intervals, max_end }
    }

    /// The first interval in sorted order that contains `position`
    ///
    /// Intervals starting after `position` can't contain it, and neither can any interval before
    /// the first one whose running maximum end reaches `position`. The running maximum only grows
    /// at an interval whose own end is that large, so that interval is the answer if it starts
    /// early enough.
    fn lookup(&self, position: u64) -> Option<&GeneInterval> {
        let candidates = self
            .intervals
            .partition_point(|gene| gene.start <= position);
        let first = self.max_end.partition_point(|end| *end < position);
        if first < candidates {
            let gene = &self.intervals[first];
            debug_assert!(gene.contains(position));
            Some(gene)
        } else {
            None
        }
    }
}

/// Resolves genomic positions to gene names
///
/// Overlapping genes are allowed. A position covered by several of them resolves to the first
/// one in (start, end) order.
#[derive(Debug, Default)]
pub struct GeneIntervalIndex {
    chromosomes: HashMap<ChromosomeLabel, ChromosomeGenes>,
}

impl GeneIntervalIndex {
    pub fn new<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = GeneInterval>,
    {
        let mut grouped: HashMap<ChromosomeLabel, Vec<GeneInterval>> = HashMap::new();
        for interval in intervals {
            grouped
                .entry(interval.chromosome.clone())
                .or_insert_with(Vec::new)
                .push(interval);
        }
        let chromosomes: HashMap<_, _> = grouped
            .into_iter()
            .map(|(chromosome, genes)| (chromosome, ChromosomeGenes::new(genes)))
            .collect();
        debug!(
            chromosomes = chromosomes.len(),
            intervals = chromosomes.values().map(|c| c.intervals.len()).sum::<usize>(),
            "Built gene interval index"
        );
        Self { chromosomes }
    }

    /// Name of the gene that covers `position` on `chromosome`, if any
    pub fn lookup(&self, chromosome: &ChromosomeLabel, position: u64) -> Option<&str> {
        self.lookup_interval(chromosome, position)
            .map(|gene| gene.gene.as_str())
    }

    pub fn lookup_interval(
        &self,
        chromosome: &ChromosomeLabel,
        position: u64,
    ) -> Option<&GeneInterval> {
        self.chromosomes.get(chromosome)?.lookup(position)
    }

    /// The sorted intervals of one chromosome
    pub fn intervals(&self, chromosome: &ChromosomeLabel) -> &[GeneInterval] {
        self.chromosomes
            .get(chromosome)
            .map(|c| c.intervals.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.chromosomes.values().map(|c| c.intervals.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
