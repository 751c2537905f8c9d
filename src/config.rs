//! Settings of one annotation run, as read from a JSON document

use std::convert::TryFrom;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConfigurationError, FileError, GeneAnnotatorError};
use crate::gene_filter::{
    sites_with_copy_number_changes, GeneMapFilter, KeywordFilter, KeywordFilterConfig,
};
use crate::gene_index::GeneIntervalIndex;
use crate::input::{
    read_annovar_gene_intervals_from_file, read_gene_intervals_from_file, ColumnSeparator,
};
use crate::model_variant::ModelVariant;
use crate::substitution_model::SubstitutionModel;
use crate::variant_site::VariantSite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "format")]
pub enum GeneMapFormat {
    /// `chrom start end gene`, separated by whitespace
    Plain,
    /// A table written by Annovar, with a header line
    Annovar { separator: ColumnSeparator },
}

impl Default for GeneMapFormat {
    fn default() -> Self {
        GeneMapFormat::Plain
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneFilterConfig {
    /// Only these genes make it into the index
    #[serde(default)]
    pub genes: Option<Vec<String>>,
    #[serde(default)]
    pub keywords: Option<KeywordFilterConfig>,
    /// Keep genes that fail the keyword filter if they cover a site with a copy number change
    #[serde(default)]
    pub keep_copy_number_sites: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    pub model: ModelVariant,
    #[serde(default)]
    pub deletion_rate: f64,
    #[serde(default)]
    pub gene_map: GeneMapFormat,
    #[serde(default)]
    pub gene_filter: GeneFilterConfig,
}

impl AnnotatorConfig {
    pub fn new(model: ModelVariant, deletion_rate: f64) -> Self {
        Self {
            model,
            deletion_rate,
            gene_map: GeneMapFormat::default(),
            gene_filter: GeneFilterConfig::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigurationError::new("configuration", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, GeneAnnotatorError> {
        let json = std::fs::read_to_string(&path).map_err(|e| FileError::io(Some(&path), e))?;
        Ok(Self::from_json_str(&json)?)
    }

    /// Check the settings that don't depend on any input data
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.deletion_rate.is_finite() || self.deletion_rate < 0.0 {
            return Err(ConfigurationError::new(
                "deletion rate",
                format!(
                    "{} must be a finite number not smaller than 0",
                    self.deletion_rate
                ),
            ));
        }
        if let Some(keywords) = &self.gene_filter.keywords {
            if self.gene_map == GeneMapFormat::Plain {
                return Err(ConfigurationError::new(
                    "filter keywords",
                    "keyword filtering needs a gene map in Annovar format",
                ));
            }
            KeywordFilter::try_from(keywords)?;
        }
        Ok(())
    }

    pub fn build_model(&self) -> Result<SubstitutionModel, ConfigurationError> {
        SubstitutionModel::new(self.model, self.deletion_rate)
    }

    /// Set up the gene map filter
    ///
    /// `ternary` (one row per site) is required when copy number sites are kept.
    pub fn build_gene_filter(
        &self,
        sites: &[VariantSite],
        ternary: Option<&[Vec<i64>]>,
    ) -> Result<GeneMapFilter, GeneAnnotatorError> {
        self.validate()?;
        let mut filter = GeneMapFilter::new();
        if let Some(genes) = &self.gene_filter.genes {
            filter = filter.with_allowed_genes(genes.iter().cloned());
        }
        if let Some(keywords) = &self.gene_filter.keywords {
            filter = filter.with_keywords(KeywordFilter::try_from(keywords)?);
        }
        if self.gene_filter.keep_copy_number_sites {
            if self.gene_filter.keywords.is_none() {
                warn!("Copy number sites only rescue genes dropped by a keyword filter, but there is none");
            }
            let ternary = ternary.ok_or_else(|| {
                ConfigurationError::new(
                    "keep copy number sites",
                    "ternary genotypes are needed to find copy number changes",
                )
            })?;
            let cna_sites = sites_with_copy_number_changes(ternary, sites)?;
            info!(sites = cna_sites.len(), "Found sites with copy number changes");
            filter = filter.with_copy_number_sites(cna_sites);
        }
        Ok(filter)
    }

    /// Read, filter and index the gene map at `path`
    pub fn load_gene_index<P: AsRef<Path>>(
        &self,
        path: P,
        sites: &[VariantSite],
        ternary: Option<&[Vec<i64>]>,
    ) -> Result<GeneIntervalIndex, GeneAnnotatorError> {
        let filter = self.build_gene_filter(sites, ternary)?;
        let records = match self.gene_map {
            GeneMapFormat::Plain => read_gene_intervals_from_file(path)?,
            GeneMapFormat::Annovar { separator } => {
                read_annovar_gene_intervals_from_file(path, separator, filter.keyword_column())?
            }
        };
        Ok(GeneIntervalIndex::new(filter.apply(records)))
    }
}
