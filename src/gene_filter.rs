//! Optional stages that decide which gene intervals make it into the index
//!
//! A gene interval is kept if
//!
//! * its gene is on the allow-list (when there is one), and
//! * there is no keyword filter, or its filter column matches the keywords, or it covers a
//!   variant site with a copy number change (when that stage is switched on).

use std::collections::HashSet;
use std::convert::TryFrom;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigurationError, ParseError};
use crate::interval::GeneInterval;
use crate::model_variant::is_copy_number_change;
use crate::variant_site::VariantSite;

/// A gene interval as read from a gene map, together with the cell used for keyword filtering
#[derive(Debug, Clone, PartialEq)]
pub struct GeneMapRecord {
    pub interval: GeneInterval,
    pub filter_cell: Option<String>,
}

impl From<GeneInterval> for GeneMapRecord {
    fn from(interval: GeneInterval) -> Self {
        Self {
            interval,
            filter_cell: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordMode {
    /// The cell must equal one of the keywords
    Fixed,
    /// The whole cell must match one of the patterns
    Regex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordFilterConfig {
    /// 0-based column of the gene map that is tested
    pub column: usize,
    pub mode: KeywordMode,
    pub keywords: Vec<String>,
}

impl KeywordFilterConfig {
    /// Parse the compact form `f,kw1,kw2,...` or `r,pattern1,pattern2,...`
    pub fn parse(column: usize, compact: &str) -> Result<Self, ConfigurationError> {
        let tokens: Vec<&str> = compact.split(',').map(str::trim).collect();
        if tokens.len() < 2 {
            return Err(ConfigurationError::new(
                "filter keywords",
                format!("expected a mode followed by at least one keyword: {}", compact),
            ));
        }
        let mode = match tokens[0] {
            "f" => KeywordMode::Fixed,
            "r" => KeywordMode::Regex,
            other => {
                return Err(ConfigurationError::new(
                    "filter keywords",
                    format!("the mode has to be either 'f' or 'r', not '{}'", other),
                ))
            }
        };
        Ok(Self {
            column,
            mode,
            keywords: tokens[1..].iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[derive(Debug, Clone)]
enum KeywordMatcher {
    Fixed(Vec<String>),
    Regex(Regex),
}

#[derive(Debug, Clone)]
pub struct KeywordFilter {
    column: usize,
    matcher: KeywordMatcher,
}

impl KeywordFilter {
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn matches(&self, cell: &str) -> bool {
        match &self.matcher {
            KeywordMatcher::Fixed(keywords) => keywords.iter().any(|k| k == cell),
            KeywordMatcher::Regex(regex) => regex.is_match(cell),
        }
    }
}

impl TryFrom<&KeywordFilterConfig> for KeywordFilter {
    type Error = ConfigurationError;
    fn try_from(config: &KeywordFilterConfig) -> Result<Self, Self::Error> {
        if config.keywords.is_empty() {
            return Err(ConfigurationError::new(
                "filter keywords",
                "at least one keyword is needed",
            ));
        }
        let matcher = match config.mode {
            KeywordMode::Fixed => KeywordMatcher::Fixed(config.keywords.clone()),
            KeywordMode::Regex => {
                let pattern = format!("^(?:{})$", config.keywords.join("|"));
                let regex = Regex::new(&pattern)
                    .map_err(|e| ConfigurationError::new("filter keywords", e.to_string()))?;
                KeywordMatcher::Regex(regex)
            }
        };
        Ok(Self {
            column: config.column,
            matcher,
        })
    }
}

/// Sites where at least one cell has a genotype with a changed copy number
///
/// `ternary` has one row per variant site, in the order of `sites`.
pub fn sites_with_copy_number_changes(
    ternary: &[Vec<i64>],
    sites: &[VariantSite],
) -> Result<Vec<VariantSite>, ParseError> {
    if ternary.len() != sites.len() {
        return Err(ParseError::somewhere(
            "one row of ternary genotypes per variant site",
            format!("{} rows for {} sites", ternary.len(), sites.len()),
        ));
    }
    Ok(ternary
        .iter()
        .zip(sites)
        .filter(|(codes, _)| codes.iter().any(|c| is_copy_number_change(*c)))
        .map(|(_, site)| site.clone())
        .collect())
}

#[derive(Debug, Clone, Default)]
pub struct GeneMapFilter {
    allowed_genes: Option<HashSet<String>>,
    keywords: Option<KeywordFilter>,
    copy_number_sites: Option<Vec<VariantSite>>,
}

impl GeneMapFilter {
    /// A filter that keeps everything
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allowed_genes<I, S>(mut self, genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_genes = Some(genes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordFilter) -> Self {
        self.keywords = Some(keywords);
        self
    }

    /// Rescue intervals that fail the keyword filter but cover one of these sites
    pub fn with_copy_number_sites(mut self, sites: Vec<VariantSite>) -> Self {
        self.copy_number_sites = Some(sites);
        self
    }

    pub fn keyword_column(&self) -> Option<usize> {
        self.keywords.as_ref().map(KeywordFilter::column)
    }

    pub fn keep(&self, record: &GeneMapRecord) -> bool {
        if let Some(allowed) = &self.allowed_genes {
            if !allowed.contains(&record.interval.gene) {
                return false;
            }
        }
        let keywords = match &self.keywords {
            Some(keywords) => keywords,
            None => return true,
        };
        if let Some(cell) = &record.filter_cell {
            if keywords.matches(cell) {
                return true;
            }
        }
        match &self.copy_number_sites {
            Some(sites) => sites.iter().any(|s| record.interval.contains_site(s)),
            None => false,
        }
    }

    pub fn apply<I>(&self, records: I) -> Vec<GeneInterval>
    where
        I: IntoIterator<Item = GeneMapRecord>,
    {
        let mut total = 0;
        let kept: Vec<GeneInterval> = records
            .into_iter()
            .inspect(|_| total += 1)
            .filter(|record| self.keep(record))
            .map(|record| record.interval)
            .collect();
        debug!(total, kept = kept.len(), "Filtered gene map");
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: u64, end: u64, gene: &str, cell: Option<&str>) -> GeneMapRecord {
        GeneMapRecord {
            interval: GeneInterval::new("chr1", start, end, gene).unwrap(),
            filter_cell: cell.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_compact_keywords() {
        let config = KeywordFilterConfig::parse(5, "f,exonic,splicing").unwrap();
        assert_eq!(config.mode, KeywordMode::Fixed);
        assert_eq!(config.keywords, vec!["exonic", "splicing"]);
        assert_eq!(config.column, 5);
        assert_eq!(
            KeywordFilterConfig::parse(5, "r,exon.*").unwrap().mode,
            KeywordMode::Regex
        );
        assert!(KeywordFilterConfig::parse(5, "f").is_err());
        assert!(KeywordFilterConfig::parse(5, "x,exonic").is_err());
    }

    #[test]
    fn test_keyword_matching() {
        let fixed =
            KeywordFilter::try_from(&KeywordFilterConfig::parse(0, "f,exonic").unwrap()).unwrap();
        assert!(fixed.matches("exonic"));
        assert!(!fixed.matches("exonic;splicing"));

        let regex =
            KeywordFilter::try_from(&KeywordFilterConfig::parse(0, "r,exon.*,splic.*").unwrap())
                .unwrap();
        assert!(regex.matches("exonic"));
        assert!(regex.matches("splicing"));
        // the whole cell has to match
        assert!(!regex.matches("ncRNA_exonic"));

        let broken = KeywordFilterConfig::parse(0, "r,(unclosed").unwrap();
        assert!(KeywordFilter::try_from(&broken).is_err());
    }

    #[test]
    fn test_allow_list() {
        let filter = GeneMapFilter::new().with_allowed_genes(vec!["TP53"]);
        assert!(filter.keep(&record(1, 10, "TP53", None)));
        assert!(!filter.keep(&record(1, 10, "KRAS", None)));
        assert!(GeneMapFilter::new().keep(&record(1, 10, "KRAS", None)));
    }

    #[test]
    fn test_copy_number_rescue() {
        let keywords =
            KeywordFilter::try_from(&KeywordFilterConfig::parse(5, "f,exonic").unwrap()).unwrap();
        let sites = vec![
            VariantSite::new("chr1", 5, "A", &["C"]),
            VariantSite::new("chr1", 50, "A", &["C"]),
        ];
        let ternary = vec![vec![0, 1, 2], vec![0, -1, 1]];
        let cna_sites = sites_with_copy_number_changes(&ternary, &sites).unwrap();
        assert_eq!(cna_sites, vec![sites[1].clone()]);

        let without_rescue = GeneMapFilter::new().with_keywords(keywords.clone());
        let with_rescue = GeneMapFilter::new()
            .with_keywords(keywords)
            .with_copy_number_sites(cna_sites);

        let exonic = record(1, 10, "A", Some("exonic"));
        let intronic_cna = record(40, 60, "B", Some("intronic"));
        let intronic = record(1, 10, "C", Some("intronic"));
        assert!(without_rescue.keep(&exonic));
        assert!(!without_rescue.keep(&intronic_cna));
        assert!(with_rescue.keep(&intronic_cna));
        assert!(!with_rescue.keep(&intronic));

        let kept = with_rescue.apply(vec![exonic, intronic_cna, intronic]);
        let names: Vec<&str> = kept.iter().map(|g| g.gene.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_ternary_rows_must_match_sites() {
        let sites = vec![VariantSite::new("chr1", 5, "A", &["C"])];
        assert!(sites_with_copy_number_changes(&[], &sites).is_err());
    }
}
