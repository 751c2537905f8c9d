//! Split collected gene events by the infinite-sites assumption (ISA)
//!
//! An event is ISA-consistent if its (site, event set, gene) value occurs exactly once in the
//! whole tree and the event set is exactly one single mutation. Everything else, be it a
//! recurrent change or a compound or non-mutation event, goes to the FSA side.

use std::collections::HashMap;

use tracing::info;

use crate::annotation::{GeneEvent, NodeGeneBucket};

/// How often each distinct gene event value occurs across all buckets
pub fn count_occurrences(buckets: &[NodeGeneBucket]) -> HashMap<&GeneEvent, usize> {
    let mut counts = HashMap::new();
    for event in buckets.iter().flat_map(|b| b.full.iter()) {
        *counts.entry(event).or_insert(0) += 1;
    }
    counts
}

/// Whether an event with the given occurrence count agrees with the infinite-sites assumption
pub fn is_isa(event: &GeneEvent, occurrences: usize) -> bool {
    occurrences == 1 && !event.violates_isa()
}

/// Second pass: fill the `isa` and `fsa` buckets from the `full` buckets
///
/// Must only run once the `full` bucket of every node is complete. Existing `isa`/`fsa`
/// entries are replaced.
pub fn classify(buckets: &mut [NodeGeneBucket]) {
    let decisions: Vec<Vec<bool>> = {
        let counts = count_occurrences(buckets);
        buckets
            .iter()
            .map(|b| b.full.iter().map(|e| is_isa(e, counts[e])).collect())
            .collect()
    };

    let (mut nr_isa, mut nr_fsa) = (0, 0);
    for (bucket, decisions) in buckets.iter_mut().zip(decisions) {
        bucket.isa.clear();
        bucket.fsa.clear();
        for (event, isa) in bucket.full.iter().zip(decisions) {
            if isa {
                bucket.isa.push(event.clone());
                nr_isa += 1;
            } else {
                bucket.fsa.push(event.clone());
                nr_fsa += 1;
            }
        }
    }
    info!(isa = nr_isa, fsa = nr_fsa, "Classified gene events");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolutionary_event::EvolutionaryEventType::{self, *};
    use crate::variant_site::VariantSite;
    use std::collections::BTreeSet;

    fn event(position: u64, events: &[EvolutionaryEventType]) -> GeneEvent {
        GeneEvent::new(
            VariantSite::new("chr7", position, "A", &["T"]),
            events.iter().copied().collect::<BTreeSet<_>>(),
            "EGFR",
        )
    }

    fn bucket(node: usize, full: Vec<GeneEvent>) -> NodeGeneBucket {
        NodeGeneBucket {
            node,
            full,
            ..Default::default()
        }
    }

    #[test]
    fn test_singleton_single_mutation_is_isa() {
        let mut buckets = vec![
            bucket(0, vec![]),
            bucket(1, vec![event(10, &[SingleMutation])]),
            bucket(2, vec![]),
        ];
        classify(&mut buckets);
        assert_eq!(buckets[1].isa, vec![event(10, &[SingleMutation])]);
        assert!(buckets[1].fsa.is_empty());
        assert!(buckets[2].isa.is_empty() && buckets[2].fsa.is_empty());
    }

    #[test]
    fn test_recurrent_mutation_is_fsa() {
        let mut buckets = vec![
            bucket(0, vec![]),
            bucket(1, vec![event(10, &[SingleMutation])]),
            bucket(2, vec![event(10, &[SingleMutation]), event(11, &[SingleMutation])]),
        ];
        classify(&mut buckets);
        assert!(buckets[1].isa.is_empty());
        assert_eq!(buckets[1].fsa.len(), 1);
        assert_eq!(buckets[2].fsa, vec![event(10, &[SingleMutation])]);
        assert_eq!(buckets[2].isa, vec![event(11, &[SingleMutation])]);
    }

    #[test]
    fn test_compound_event_is_fsa() {
        let mut buckets = vec![
            bucket(1, vec![event(10, &[CoinHomoDoubleMutation])]),
            bucket(2, vec![event(12, &[SingleMutation, SingleDeletionLoh])]),
        ];
        classify(&mut buckets);
        assert!(buckets.iter().all(|b| b.isa.is_empty()));
        assert_eq!(buckets[0].fsa.len(), 1);
        assert_eq!(buckets[1].fsa.len(), 1);
    }

    #[test]
    fn test_every_event_is_classified_once() {
        let mut buckets = vec![
            bucket(
                1,
                vec![
                    event(1, &[SingleMutation]),
                    event(2, &[SingleBackMutation]),
                    event(3, &[SingleMutation]),
                ],
            ),
            bucket(2, vec![event(3, &[SingleMutation]), event(4, &[SingleMutation])]),
        ];
        classify(&mut buckets);
        // running it twice doesn't change anything
        let first = buckets.clone();
        classify(&mut buckets);
        assert_eq!(first, buckets);

        for b in &buckets {
            assert_eq!(b.isa.len() + b.fsa.len(), b.full.len());
            for e in &b.full {
                assert!(b.isa.contains(e) != b.fsa.contains(e));
            }
        }
        let counts = count_occurrences(&buckets);
        assert_eq!(counts[&event(3, &[SingleMutation])], 2);
        assert_eq!(counts[&event(1, &[SingleMutation])], 1);
    }

    #[test]
    fn test_same_site_other_gene_is_distinct() {
        let mut other_gene = event(10, &[SingleMutation]);
        other_gene.gene = "EGFR-AS1".to_string();
        let mut buckets = vec![
            bucket(1, vec![event(10, &[SingleMutation])]),
            bucket(2, vec![other_gene]),
        ];
        classify(&mut buckets);
        assert_eq!(buckets[0].isa.len(), 1);
        assert_eq!(buckets[1].isa.len(), 1);
    }
}
