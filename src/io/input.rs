use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::{QuoteError, Result};

/// A source row reduced to the two fields the pipeline cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// 1-based data row number (header excluded)
    pub row: u64,
    pub quote: String,
    pub attribution: Option<String>,
}

/// Column layout of the source table
#[derive(Debug, Clone)]
pub struct SourceLayout {
    pub delimiter: u8,
    pub quote_column: String,
    pub attribution_column: String,
}

/// Parse a delimiter argument such as `,`, `;` or `\t`
pub fn parse_delimiter(value: &str) -> Result<u8> {
    let value = if value == "\\t" { "\t" } else { value };
    match value.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(QuoteError::InvalidConfig(format!(
            "delimiter must be a single ASCII character, got {:?}",
            value
        ))),
    }
}

/// Read every row of the source table at `path`
pub fn read_source_file(path: &Path, layout: &SourceLayout) -> Result<Vec<SourceRow>> {
    let file = File::open(path).map_err(|e| QuoteError::io(path, e))?;
    read_source(file, path, layout)
}

/// Read every row of a delimited source
///
/// `origin` only labels errors. Both configured columns must be present in
/// the header. A row with no quote value fails the whole read.
pub fn read_source<R: Read>(reader: R, origin: &Path, layout: &SourceLayout) -> Result<Vec<SourceRow>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(layout.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| QuoteError::csv(origin, e))?
        .clone();
    let quote_idx = column_index(&headers, &layout.quote_column)?;
    let attribution_idx = column_index(&headers, &layout.attribution_column)?;

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| QuoteError::csv(origin, e))?;
        let row = i as u64 + 1;

        let quote = match record.get(quote_idx) {
            Some(q) if !q.trim().is_empty() => q.to_string(),
            _ => {
                return Err(QuoteError::MissingQuote {
                    row,
                    column: layout.quote_column.clone(),
                });
            }
        };

        rows.push(SourceRow {
            row,
            quote,
            attribution: record.get(attribution_idx).map(str::to_string),
        });
    }

    Ok(rows)
}

fn column_index(headers: &StringRecord, column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| QuoteError::MissingColumn {
            column: column.to_string(),
            available: headers.iter().collect::<Vec<_>>().join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(delimiter: u8) -> SourceLayout {
        SourceLayout {
            delimiter,
            quote_column: "quote".to_string(),
            attribution_column: "attrib_name".to_string(),
        }
    }

    fn read(data: &str, delimiter: u8) -> Result<Vec<SourceRow>> {
        read_source(data.as_bytes(), Path::new("test.csv"), &layout(delimiter))
    }

    #[test]
    fn test_read_source_in_order() {
        let data = "id,quote,attrib_name\n\
                    1,\"Be the change.\",Gandhi\n\
                    2,\"Carpe diem.\",Horace\n\
                    3,\"Stay hungry, stay foolish.\",\n";
        let rows = read(data, b',').unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].quote, "Be the change.");
        assert_eq!(rows[1].attribution.as_deref(), Some("Horace"));
        assert_eq!(rows[2].quote, "Stay hungry, stay foolish.");
        assert_eq!(rows[2].attribution.as_deref(), Some(""));
        assert_eq!(rows[2].row, 3);
    }

    #[test]
    fn test_custom_delimiter() {
        let data = "quote;attrib_name\nCarpe diem.;Horace\n";
        let rows = read(data, b';').unwrap();
        assert_eq!(rows[0].quote, "Carpe diem.");
        assert_eq!(rows[0].attribution.as_deref(), Some("Horace"));
    }

    #[test]
    fn test_missing_column_is_configuration_error() {
        let err = read("text,attrib_name\nhello,someone\n", b',').unwrap_err();
        assert!(matches!(err, QuoteError::MissingColumn { ref column, .. } if column == "quote"));

        let err = read("quote,author\nhello,someone\n", b',').unwrap_err();
        assert!(matches!(err, QuoteError::MissingColumn { ref column, .. } if column == "attrib_name"));
    }

    #[test]
    fn test_short_row_is_data_integrity_error() {
        let data = "attrib_name,quote\nHorace,Carpe diem.\nNobody\n";
        let err = read(data, b',').unwrap_err();
        assert!(matches!(err, QuoteError::MissingQuote { row: 2, .. }));
    }

    #[test]
    fn test_blank_quote_is_data_integrity_error() {
        let data = "quote,attrib_name\n   ,Horace\n";
        let err = read(data, b',').unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_attribution_absent_on_short_row() {
        let data = "quote,attrib_name\nCarpe diem.\n";
        let rows = read(data, b',').unwrap();
        assert_eq!(rows[0].attribution, None);
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert!(parse_delimiter("::").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
