//! Readers for the plain-text inputs of a run
//!
//! Tree files are not read here; they come from an external tree parser.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tabfile::{Record, Tabfile};

use crate::error::{FileError, ParseError};
use crate::gene_filter::GeneMapRecord;
use crate::interval::GeneInterval;
use crate::variant_site::VariantSite;

/// Header of the gene name column in Annovar tables
pub const GENE_NAME_HEADER: &str = "Gene.refGene";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSeparator {
    Tab,
    Comma,
    Whitespace,
}

impl ColumnSeparator {
    /// The separator tabfile splits on, `None` for runs of whitespace
    fn as_char(self) -> Option<char> {
        match self {
            Self::Tab => Some('\t'),
            Self::Comma => Some(','),
            Self::Whitespace => None,
        }
    }

    /// The cells of a record, trimmed and with surrounding quotes removed
    fn cells(self, record: &Record) -> Vec<String> {
        let fields: Vec<&str> = match self {
            Self::Whitespace => record.line().split_whitespace().collect(),
            _ => record.fields(),
        };
        fields
            .into_iter()
            .map(|cell| cell.trim().trim_matches('"').to_string())
            .collect()
    }
}

fn open<P: AsRef<Path>>(path: &P) -> Result<Tabfile, FileError> {
    Tabfile::open(path).map_err(|e| FileError::io(Some(path), e))
}

fn open_table<P: AsRef<Path>>(path: &P, separator: ColumnSeparator) -> Result<Tabfile, FileError> {
    let tabfile = open(path)?;
    Ok(match separator.as_char() {
        Some(c) => tabfile.separator(c),
        None => tabfile,
    })
}

fn parse_error<P: AsRef<Path>>(
    path: &P,
    line: usize,
    expected: &'static str,
    observed: String,
) -> FileError {
    FileError::parse(
        Some(path),
        ParseError::file(path.as_ref().to_path_buf(), line, expected, observed),
    )
}

fn not_empty<T, P: AsRef<Path>>(path: &P, result: Vec<T>) -> Result<Vec<T>, FileError> {
    if result.is_empty() {
        Err(FileError::parse(
            Some(path),
            ParseError::somewhere("at least one record", "an empty file".to_string()),
        ))
    } else {
        Ok(result)
    }
}

/// Read variant sites, one per line: `chrom pos ref alt[,alt...]`
pub fn read_variant_sites_from_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<VariantSite>, FileError> {
    let mut result = Vec::new();
    for record_result in open(&path)?.comment_character('#') {
        let record = record_result.map_err(|e| FileError::io(Some(&path), e))?;
        let tokens: Vec<&str> = record.line().split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 4 {
            return Err(parse_error(
                &path,
                record.line_number(),
                "4 columns",
                record.line().to_string(),
            ));
        }
        let position = tokens[1].parse::<u64>().map_err(|_| {
            parse_error(
                &path,
                record.line_number(),
                "a numeric position",
                tokens[1].to_string(),
            )
        })?;
        let alternatives: Vec<&str> = tokens[3].split(',').collect();
        result.push(VariantSite::new(
            tokens[0],
            position,
            tokens[2],
            &alternatives,
        ));
    }
    not_empty(&path, result)
}

/// Read a plain gene map, one gene per line: `chrom start end gene`
pub fn read_gene_intervals_from_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<GeneMapRecord>, FileError> {
    let mut result = Vec::new();
    for record_result in open(&path)?.comment_character('#') {
        let record = record_result.map_err(|e| FileError::io(Some(&path), e))?;
        let tokens: Vec<&str> = record.line().split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let interval = GeneInterval::parse(&tokens).map_err(|e| FileError::parse(Some(&path), e))?;
        result.push(interval.into());
    }
    not_empty(&path, result)
}

/// Read the table written by Annovar
///
/// The first line is a header that has to name the gene column `Gene.refGene`. Chromosome,
/// start and end are the first three columns. If `filter_column` is given, that cell of each row
/// is kept for keyword filtering.
pub fn read_annovar_gene_intervals_from_file<P: AsRef<Path>>(
    path: P,
    separator: ColumnSeparator,
    filter_column: Option<usize>,
) -> Result<Vec<GeneMapRecord>, FileError> {
    let mut result = Vec::new();
    let mut gene_column = None;
    for record_result in open_table(&path, separator)? {
        let record = record_result.map_err(|e| FileError::io(Some(&path), e))?;
        let cells = separator.cells(&record);

        let gene_idx = match gene_column {
            Some(idx) => idx,
            None => {
                // header
                let idx = cells
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(GENE_NAME_HEADER))
                    .ok_or_else(|| {
                        parse_error(
                            &path,
                            record.line_number(),
                            "a header with a Gene.refGene column",
                            record.line().to_string(),
                        )
                    })?;
                if let Some(col) = filter_column {
                    if col >= cells.len() {
                        return Err(parse_error(
                            &path,
                            record.line_number(),
                            "the filter column to be part of the table",
                            format!("column {} of {}", col, cells.len()),
                        ));
                    }
                }
                gene_column = Some(idx);
                continue;
            }
        };

        let needed = gene_idx.max(filter_column.unwrap_or(0)).max(2);
        if cells.len() <= needed {
            return Err(parse_error(
                &path,
                record.line_number(),
                "as many columns as the header",
                record.line().to_string(),
            ));
        }
        let tokens = [
            cells[0].as_str(),
            cells[1].as_str(),
            cells[2].as_str(),
            cells[gene_idx].as_str(),
        ];
        let interval = GeneInterval::parse(&tokens).map_err(|e| FileError::parse(Some(&path), e))?;
        result.push(GeneMapRecord {
            interval,
            filter_cell: filter_column.map(|col| cells[col].clone()),
        });
    }
    if gene_column.is_none() {
        return Err(FileError::parse(
            Some(&path),
            ParseError::somewhere("a header line", "an empty file".to_string()),
        ));
    }
    Ok(result)
}

/// Read the list of genes to keep from a table with a header line
///
/// Duplicates are dropped, the first occurrence decides the order.
pub fn read_filtering_genes_from_file<P: AsRef<Path>>(
    path: P,
    separator: ColumnSeparator,
    column: usize,
) -> Result<Vec<String>, FileError> {
    let mut result: Vec<String> = Vec::new();
    for record_result in open_table(&path, separator)?.skip_lines(1) {
        let record = record_result.map_err(|e| FileError::io(Some(&path), e))?;
        let mut cells = separator.cells(&record);
        if column >= cells.len() {
            return Err(parse_error(
                &path,
                record.line_number(),
                "a gene name in the configured column",
                record.line().to_string(),
            ));
        }
        let gene = cells.swap_remove(column);
        if !result.contains(&gene) {
            result.push(gene);
        }
    }
    not_empty(&path, result)
}

/// Read ternary genotype codes, one line per variant site and one column per cell
pub fn read_ternary_genotypes_from_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<Vec<i64>>, FileError> {
    let mut result = Vec::new();
    for record_result in open(&path)? {
        let record = record_result.map_err(|e| FileError::io(Some(&path), e))?;
        let codes = record
            .line()
            .split_whitespace()
            .map(|token| token.parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| {
                parse_error(
                    &path,
                    record.line_number(),
                    "integer ternary codes",
                    record.line().to_string(),
                )
            })?;
        if !codes.is_empty() {
            result.push(codes);
        }
    }
    not_empty(&path, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileErrorSource;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_variant_sites() {
        let file = file_with("chr1\t150\tA\tG\nchr2 10 G A,T\n");
        let sites = read_variant_sites_from_file(file.path()).unwrap();
        assert_eq!(
            sites,
            vec![
                VariantSite::new("chr1", 150, "A", &["G"]),
                VariantSite::new("chr2", 10, "G", &["A", "T"]),
            ]
        );

        let file = file_with("chr1\tone\tA\tG\n");
        let err = read_variant_sites_from_file(file.path()).unwrap_err();
        let source = std::error::Error::source(&err)
            .and_then(|e| e.downcast_ref::<FileErrorSource>())
            .unwrap();
        assert!(matches!(source, FileErrorSource::Parse { .. }));

        let file = file_with("");
        assert!(read_variant_sites_from_file(file.path()).is_err());
    }

    #[test]
    fn test_read_gene_intervals() {
        let file = file_with("# chrom start end gene\nchr1 100 200 TP53\nchr1\t300\t400\tA;B\n");
        let records = read_gene_intervals_from_file(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].interval.gene, "A;B");
        assert_eq!(records[1].interval.start, 300);
        assert!(records.iter().all(|r| r.filter_cell.is_none()));

        let file = file_with("chr1 100 TP53\n");
        assert!(read_gene_intervals_from_file(file.path()).is_err());
    }

    #[test]
    fn test_read_annovar() {
        let file = file_with(concat!(
            "Chr,Start,End,Ref,Alt,Func.refGene,Gene.refGene\n",
            "chr1,100,100,A,G,exonic,\"TP53\"\n",
            "chr1,200,200,C,T,intronic,KRAS\n",
        ));
        let records =
            read_annovar_gene_intervals_from_file(file.path(), ColumnSeparator::Comma, Some(5))
                .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].interval.gene, "TP53");
        assert_eq!(records[0].filter_cell.as_deref(), Some("exonic"));
        assert_eq!(records[1].filter_cell.as_deref(), Some("intronic"));

        assert!(
            read_annovar_gene_intervals_from_file(file.path(), ColumnSeparator::Comma, Some(9))
                .is_err()
        );

        let file = file_with("Chr\tStart\tEnd\tGene\nchr1\t1\t2\tX\n");
        assert!(
            read_annovar_gene_intervals_from_file(file.path(), ColumnSeparator::Tab, None).is_err()
        );
    }

    #[test]
    fn test_read_filtering_genes() {
        let file = file_with("id\tgene\n1\tTP53\n2\tKRAS\n3\tTP53\n");
        let genes = read_filtering_genes_from_file(file.path(), ColumnSeparator::Tab, 1).unwrap();
        assert_eq!(genes, vec!["TP53", "KRAS"]);
        assert!(read_filtering_genes_from_file(file.path(), ColumnSeparator::Tab, 2).is_err());
    }

    #[test]
    fn test_read_ternary_genotypes() {
        let file = file_with("0 1 2\n0 -1 3\n");
        let codes = read_ternary_genotypes_from_file(file.path()).unwrap();
        assert_eq!(codes, vec![vec![0, 1, 2], vec![0, -1, 3]]);

        let file = file_with("0 x 2\n");
        assert!(read_ternary_genotypes_from_file(file.path()).is_err());
    }

    #[test]
    fn test_quoted_cells() {
        let file = file_with("id, \"gene\"\n1, \"TP53\" \n2,KRAS\n");
        let genes = read_filtering_genes_from_file(file.path(), ColumnSeparator::Comma, 1).unwrap();
        assert_eq!(genes, vec!["TP53", "KRAS"]);

        let file = file_with("id gene\n1   TP53\n2\tKRAS\n");
        let genes =
            read_filtering_genes_from_file(file.path(), ColumnSeparator::Whitespace, 1).unwrap();
        assert_eq!(genes, vec!["TP53", "KRAS"]);
    }
}
