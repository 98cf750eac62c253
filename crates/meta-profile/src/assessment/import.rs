use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use super::catalog::FactorCatalog;
use super::domain::{Assessment, ReliabilityWarning, StudentId, StudentRecord};

const STUDENT_COLUMN: &str = "student_id";
const ROUND_COLUMN: &str = "round";
const WARNINGS_COLUMN: &str = "warnings";

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(String),
    MissingStudentId { line: usize },
    InvalidRound { line: usize, value: String },
    InvalidScore {
        line: usize,
        column: String,
        value: String,
    },
    InvalidWarning { line: usize, message: String },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::MissingColumn(column) => {
                write!(f, "roster CSV is missing the '{}' column", column)
            }
            RosterImportError::MissingStudentId { line } => {
                write!(f, "line {}: student_id is empty", line)
            }
            RosterImportError::InvalidRound { line, value } => {
                write!(f, "line {}: '{}' is not a valid round number", line, value)
            }
            RosterImportError::InvalidScore {
                line,
                column,
                value,
            } => write!(f, "line {}: '{}' is not a valid score for {}", line, value, column),
            RosterImportError::InvalidWarning { line, message } => {
                write!(f, "line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads class rosters exported as CSV, one row per student and round.
pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(
        catalog: &FactorCatalog,
        path: P,
    ) -> Result<Vec<StudentRecord>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(catalog, file)
    }

    /// Rows are grouped per student in order of first appearance. Blank score
    /// cells become missing values; unknown columns are ignored.
    pub fn from_reader<R: Read>(
        catalog: &FactorCatalog,
        reader: R,
    ) -> Result<Vec<StudentRecord>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|header| header == name);

        let student_column = column(STUDENT_COLUMN)
            .ok_or_else(|| RosterImportError::MissingColumn(STUDENT_COLUMN.to_string()))?;
        let round_column = column(ROUND_COLUMN)
            .ok_or_else(|| RosterImportError::MissingColumn(ROUND_COLUMN.to_string()))?;
        let warnings_column = column(WARNINGS_COLUMN);
        let factor_columns = catalog
            .factors()
            .iter()
            .map(|factor| {
                column(factor.name)
                    .map(|position| (position, factor.name))
                    .ok_or_else(|| RosterImportError::MissingColumn(factor.name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut students: Vec<StudentRecord> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (offset, record) in csv_reader.records().enumerate() {
            let record = record?;
            // Header is line 1.
            let line = offset + 2;

            let student_id = cell(&record, student_column);
            if student_id.is_empty() {
                return Err(RosterImportError::MissingStudentId { line });
            }

            let raw_round = cell(&record, round_column);
            let round = raw_round
                .parse::<u32>()
                .map_err(|_| RosterImportError::InvalidRound {
                    line,
                    value: raw_round.to_string(),
                })?;

            let warnings = match warnings_column {
                Some(position) => parse_warnings(cell(&record, position), line)?,
                None => Vec::new(),
            };

            let t_scores = factor_columns
                .iter()
                .map(|(position, name)| parse_score(cell(&record, *position), line, name))
                .collect::<Result<Vec<_>, _>>()?;

            let assessment = Assessment {
                student_id: StudentId(student_id.to_string()),
                round,
                assessed_on: None,
                t_scores,
                warnings,
                result: None,
            };

            let position = *positions
                .entry(student_id.to_string())
                .or_insert_with(|| {
                    students.push(StudentRecord {
                        student_id: StudentId(student_id.to_string()),
                        assessments: Vec::new(),
                    });
                    students.len() - 1
                });
            students[position].assessments.push(assessment);
        }

        Ok(students)
    }
}

fn cell(record: &StringRecord, position: usize) -> &str {
    record.get(position).unwrap_or("")
}

fn parse_score(raw: &str, line: usize, column: &str) -> Result<Option<f64>, RosterImportError> {
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(Some)
        .ok_or_else(|| RosterImportError::InvalidScore {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        })
}

fn parse_warnings(raw: &str, line: usize) -> Result<Vec<ReliabilityWarning>, RosterImportError> {
    raw.split(';')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            code.parse::<ReliabilityWarning>()
                .map_err(|message| RosterImportError::InvalidWarning { line, message })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::catalog::FACTOR_COUNT;

    fn header(catalog: &FactorCatalog) -> String {
        let names: Vec<&str> = catalog.factors().iter().map(|factor| factor.name).collect();
        format!("student_id,round,warnings,{}", names.join(","))
    }

    fn row(student: &str, round: u32, warnings: &str, scores: &[String]) -> String {
        format!("{student},{round},{warnings},{}", scores.join(","))
    }

    #[test]
    fn groups_rows_by_student_in_first_seen_order() {
        let catalog = FactorCatalog::standard();
        let full: Vec<String> = (0..FACTOR_COUNT).map(|i| format!("{}", 40 + i)).collect();
        let mut partial = full.clone();
        partial[3] = String::new();

        let csv = [
            header(&catalog),
            row("s-2", 1, "", &full),
            row("s-1", 1, "careless", &partial),
            row("s-2", 2, "inconsistent;incomplete", &full),
        ]
        .join("\n");

        let students = RosterImporter::from_reader(&catalog, csv.as_bytes()).expect("roster parses");

        assert_eq!(students.len(), 2);
        assert_eq!(students[0].student_id, StudentId("s-2".to_string()));
        assert_eq!(students[0].assessments.len(), 2);
        assert_eq!(
            students[0].assessments[1].warnings,
            vec![
                ReliabilityWarning::InconsistentResponding,
                ReliabilityWarning::IncompleteResponses
            ]
        );

        let partial_assessment = &students[1].assessments[0];
        assert_eq!(partial_assessment.t_scores.len(), FACTOR_COUNT);
        assert_eq!(partial_assessment.score(3), None);
        assert_eq!(partial_assessment.score(4), Some(44.0));
        assert!(!partial_assessment.is_reliable());
    }

    #[test]
    fn rejects_missing_factor_columns() {
        let catalog = FactorCatalog::standard();
        let csv = "student_id,round,자아존중감\ns-1,1,50\n";

        match RosterImporter::from_reader(&catalog, csv.as_bytes()) {
            Err(RosterImportError::MissingColumn(column)) => assert_eq!(column, "자기효능감"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn reports_line_of_invalid_score() {
        let catalog = FactorCatalog::standard();
        let mut scores: Vec<String> = vec!["50".to_string(); FACTOR_COUNT];
        scores[0] = "high".to_string();
        let csv = [header(&catalog), row("s-1", 1, "", &scores)].join("\n");

        match RosterImporter::from_reader(&catalog, csv.as_bytes()) {
            Err(RosterImportError::InvalidScore { line, column, value }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "자아존중감");
                assert_eq!(value, "high");
            }
            other => panic!("expected invalid score, got {other:?}"),
        }
    }
}
