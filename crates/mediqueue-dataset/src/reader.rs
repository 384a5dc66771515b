//! Symptom CSV reader.
//!
//! Expects a `disease,symptoms` table. Quoted fields may contain commas,
//! doubled quotes and newlines.

use std::fs;
use std::path::Path;

use crate::{DatasetError, DatasetResult};

/// One labelled symptom description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomRecord {
    pub disease: String,
    pub symptoms: String,
}

impl SymptomRecord {
    pub fn new(disease: impl Into<String>, symptoms: impl Into<String>) -> Self {
        Self {
            disease: disease.into(),
            symptoms: symptoms.into(),
        }
    }
}

/// Read records from a CSV file.
pub fn read_records(path: &Path) -> DatasetResult<Vec<SymptomRecord>> {
    let text = fs::read_to_string(path)?;
    parse_records(&text)
}

/// Parse records from CSV text. The first row is always the header.
///
/// Columns are located by the names `disease` and `symptoms`
/// (case-insensitive). A header without those names is accepted only for a
/// two-column table, read as disease then symptoms. Rows with a blank
/// disease or blank symptoms are skipped.
pub fn parse_records(text: &str) -> DatasetResult<Vec<SymptomRecord>> {
    let mut rows = parse_csv(text)?.into_iter();
    let (_, header) = rows.next().ok_or(DatasetError::Empty)?;
    let (disease_col, symptoms_col) = locate_columns(&header)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line, row) in rows {
        let (Some(disease), Some(symptoms)) = (row.get(disease_col), row.get(symptoms_col)) else {
            return Err(DatasetError::Csv {
                line,
                message: format!("expected {} columns, found {}", header.len(), row.len()),
            });
        };
        if disease.trim().is_empty() || symptoms.trim().is_empty() {
            skipped += 1;
            continue;
        }
        records.push(SymptomRecord::new(disease.trim(), symptoms.trim()));
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Skipped rows with blank fields");
    }
    Ok(records)
}

fn locate_columns(header: &[String]) -> DatasetResult<(usize, usize)> {
    let find = |name: &str| {
        header
            .iter()
            .position(|column| column.trim().eq_ignore_ascii_case(name))
    };

    match (find("disease"), find("symptoms")) {
        (Some(disease), Some(symptoms)) => Ok((disease, symptoms)),
        _ if header.len() == 2 => Ok((0, 1)),
        _ => Err(DatasetError::Csv {
            line: 1,
            message: format!(
                "header must name 'disease' and 'symptoms' columns, found {:?}",
                header
            ),
        }),
    }
}

/// Split CSV text into rows of fields, each tagged with its starting line.
fn parse_csv(text: &str) -> DatasetResult<Vec<(usize, Vec<String>)>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut row_start = 1usize;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            '\n' if in_quotes => {
                line += 1;
                field.push('\n');
            }
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, row_start, std::mem::take(&mut row));
                line += 1;
                row_start = line;
            }
            other => field.push(other),
        }
    }

    if in_quotes {
        return Err(DatasetError::Csv {
            line: row_start,
            message: "unterminated quoted field".into(),
        });
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, row_start, row);
    }
    Ok(rows)
}

fn push_row(rows: &mut Vec<(usize, Vec<String>)>, line: usize, row: Vec<String>) {
    let blank = row.len() == 1 && row[0].trim().is_empty();
    if !blank {
        rows.push((line, row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_columns_any_order() {
        let records = parse_records("symptoms,Disease\nitchy skin,Psoriasis\n").unwrap();
        assert_eq!(records, vec![SymptomRecord::new("Psoriasis", "itchy skin")]);
    }

    #[test]
    fn test_positional_two_columns() {
        let records = parse_records("label,text\r\nAsthma,wheezing\r\n\r\nFlu,fever\r\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], SymptomRecord::new("Flu", "fever"));
    }

    #[test]
    fn test_quoted_fields() {
        let csv = "disease,symptoms\nMigraine,\"throbbing, one-sided \"\"pounding\"\"\nheadache\"\n";
        let records = parse_records(csv).unwrap();
        assert_eq!(
            records[0].symptoms,
            "throbbing, one-sided \"pounding\"\nheadache"
        );
    }

    #[test]
    fn test_unnamed_wide_header_rejected() {
        assert!(matches!(
            parse_records("a,b,c\n1,2,3\n"),
            Err(DatasetError::Csv { line: 1, .. })
        ));
    }

    #[test]
    fn test_short_row_reports_line() {
        let err = parse_records("disease,symptoms\nFlu,fever\nAsthma\n").unwrap_err();
        assert!(matches!(err, DatasetError::Csv { line: 3, .. }));
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(matches!(
            parse_records("disease,symptoms\nFlu,\"fever"),
            Err(DatasetError::Csv { line: 2, .. })
        ));
    }

    #[test]
    fn test_blank_fields_skipped() {
        let records = parse_records("disease,symptoms\nFlu,   \n,cough\nAsthma,cough").unwrap();
        assert_eq!(records, vec![SymptomRecord::new("Asthma", "cough")]);
    }
}
