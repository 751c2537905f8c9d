use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chromosome::ChromosomeLabel;

/// A locus that was called as variant in at least one cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantSite {
    pub chromosome: ChromosomeLabel,
    /// 1-based
    pub position: u64,
    pub reference: String,
    pub alternatives: Vec<String>,
}

impl VariantSite {
    pub fn new<C, R>(chromosome: C, position: u64, reference: R, alternatives: &[&str]) -> Self
    where
        C: Into<ChromosomeLabel>,
        R: Into<String>,
    {
        Self {
            chromosome: chromosome.into(),
            position,
            reference: reference.into(),
            alternatives: alternatives.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// The alternative nucleotides in VCF style, e.g. `C,T`
    pub fn joined_alternatives(&self) -> String {
        self.alternatives.join(",")
    }
}

impl fmt::Display for VariantSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.chromosome,
            self.position,
            self.reference,
            self.joined_alternatives()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_site() {
        let site = VariantSite::new("chr1", 1200, "A", &["C", "T"]);
        assert_eq!(site.joined_alternatives(), "C,T");
        assert_eq!(site.to_string(), "chr1:1200 A>C,T");
        assert_eq!(site, VariantSite::new("1", 1200, "A", &["C", "T"]));
        assert_ne!(site, VariantSite::new("chr1", 1200, "A", &["C"]));
    }
}
