use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chromosome::ChromosomeLabel;
use crate::error::ParseError;
use crate::variant_site::VariantSite;

/// A gene and the genomic range it occupies
///
/// By convention, start and end are 1-based and both inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneInterval {
    pub chromosome: ChromosomeLabel,
    pub start: u64,
    pub end: u64,
    pub gene: String,
}

impl GeneInterval {
    pub fn new<C, G>(chromosome: C, start: u64, end: u64, gene: G) -> Result<Self, ParseError>
    where
        C: Into<ChromosomeLabel>,
        G: Into<String>,
    {
        if end < start {
            Err(ParseError::somewhere(
                "start <= end",
                format!("{}>{}", start, end),
            ))
        } else {
            Ok(Self {
                chromosome: chromosome.into(),
                start,
                end,
                gene: gene.into(),
            })
        }
    }

    /// Build an interval from the tokens `chrom start end gene`
    pub fn parse(tokens: &[&str]) -> Result<Self, ParseError> {
        if tokens.len() < 4 {
            return Err(ParseError::somewhere(
                "chromosome, start, end and gene name",
                tokens.join(" "),
            ));
        }
        let start = tokens[1]
            .trim()
            .parse::<u64>()
            .map_err(|_| ParseError::somewhere("start position", tokens[1].to_string()))?;
        let end = tokens[2]
            .trim()
            .parse::<u64>()
            .map_err(|_| ParseError::somewhere("end position", tokens[2].to_string()))?;
        GeneInterval::new(tokens[0], start, end, tokens[3].trim())
    }

    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn contains_site(&self, site: &VariantSite) -> bool {
        self.chromosome == site.chromosome && self.contains(site.position)
    }
}

impl fmt::Display for GeneInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{} {}",
            self.chromosome, self.start, self.end, self.gene
        )
    }
}
