//! Course record store - CSV loading and lookup
//!
//! Loads the class profile dataset once at startup. The store is read-only
//! after load and can be shared across any number of concurrent readers.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Columns the loader requires before deserializing any row.
///
/// These names are contract: they match the upstream dataset export exactly.
const REQUIRED_COLUMNS: [&str; 30] = [
    "Class",
    "Section",
    "Semester",
    "Instructor",
    "Avg.GPA",
    "Enrollment.Women",
    "Enrollment.Male",
    "Enrollment.OtherGender",
    "Enrollment.InState",
    "Enrollment.OutOfState",
    "Enrollment.White",
    "Enrollment.Asian",
    "Enrollment.Hispanic",
    "Enrollment.AfricanAmerican",
    "Enrollment.International",
    "Enrollment.Other.Ethnicity",
    "FinalGrade.A",
    "FinalGrade.B",
    "FinalGrade.C",
    "FinalGrade.D",
    "FinalGrade.F",
    "FinalGrade.W",
    "Popular.Co-Requisite.Name.1",
    "Popular.Co-Requisite.Number.1",
    "Popular.Co-Requisite.Name.2",
    "Popular.Co-Requisite.Number.2",
    "Popular.Pre-Requisite.Name.1",
    "Popular.Pre-Requisite.Number.1",
    "Popular.Pre-Requisite.Name.2",
    "Popular.Pre-Requisite.Number.2",
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("failed to parse dataset row {row}: {source}")]
    Parse { row: usize, source: csv::Error },

    #[error("unknown course '{0}'")]
    NotFound(String),
}

/// One row of the class profile dataset: a single course section's
/// enrollment and outcome statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(rename = "Class")]
    pub class: String,
    #[serde(rename = "Section")]
    pub section: String,
    #[serde(rename = "Semester")]
    pub semester: String,
    #[serde(rename = "Instructor")]
    pub instructor: String,
    #[serde(rename = "Avg.GPA")]
    pub avg_gpa: f64,

    #[serde(rename = "Enrollment.Women")]
    pub women: u32,
    #[serde(rename = "Enrollment.Male")]
    pub men: u32,
    #[serde(rename = "Enrollment.OtherGender")]
    pub other_gender: u32,

    #[serde(rename = "Enrollment.InState")]
    pub in_state: u32,
    #[serde(rename = "Enrollment.OutOfState")]
    pub out_of_state: u32,

    #[serde(rename = "Enrollment.White")]
    pub white: u32,
    #[serde(rename = "Enrollment.Asian")]
    pub asian: u32,
    #[serde(rename = "Enrollment.Hispanic")]
    pub hispanic: u32,
    #[serde(rename = "Enrollment.AfricanAmerican")]
    pub african_american: u32,
    #[serde(rename = "Enrollment.International")]
    pub international: u32,
    #[serde(rename = "Enrollment.Other.Ethnicity")]
    pub other_ethnicity: u32,

    #[serde(rename = "FinalGrade.A")]
    pub grade_a: u32,
    #[serde(rename = "FinalGrade.B")]
    pub grade_b: u32,
    #[serde(rename = "FinalGrade.C")]
    pub grade_c: u32,
    #[serde(rename = "FinalGrade.D")]
    pub grade_d: u32,
    #[serde(rename = "FinalGrade.F")]
    pub grade_f: u32,
    #[serde(rename = "FinalGrade.W")]
    pub grade_w: u32,

    // Course references may be blank; an empty name cell stays an empty
    // string and an empty count cell becomes None.
    #[serde(rename = "Popular.Co-Requisite.Name.1")]
    pub co_requisite_name_1: String,
    #[serde(rename = "Popular.Co-Requisite.Number.1")]
    pub co_requisite_count_1: Option<u32>,
    #[serde(rename = "Popular.Co-Requisite.Name.2")]
    pub co_requisite_name_2: String,
    #[serde(rename = "Popular.Co-Requisite.Number.2")]
    pub co_requisite_count_2: Option<u32>,

    #[serde(rename = "Popular.Pre-Requisite.Name.1")]
    pub pre_requisite_name_1: String,
    #[serde(rename = "Popular.Pre-Requisite.Number.1")]
    pub pre_requisite_count_1: Option<u32>,
    #[serde(rename = "Popular.Pre-Requisite.Name.2")]
    pub pre_requisite_name_2: String,
    #[serde(rename = "Popular.Pre-Requisite.Number.2")]
    pub pre_requisite_count_2: Option<u32>,
}

/// Read-only course record store, built once at startup.
#[derive(Debug)]
pub struct CourseStore {
    records: Vec<CourseRecord>,
}

impl CourseStore {
    /// Load from CSV file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path_str = path.as_ref().display().to_string();
        tracing::info!("Loading class profile dataset from: {}", path_str);

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| StoreError::Read {
                path: path_str,
                source,
            })?;

        let store = Self::parse_csv(&content)?;

        tracing::info!(
            "Loaded {} course records ({} distinct classes)",
            store.records.len(),
            store.class_names().len()
        );

        Ok(store)
    }

    /// Parse CSV content
    fn parse_csv(content: &str) -> Result<Self, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|source| StoreError::Parse { row: 0, source })?
            .clone();

        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(StoreError::MissingColumn(column.to_string()));
            }
        }

        let mut records = Vec::new();
        for (idx, result) in reader.deserialize().enumerate() {
            let record: CourseRecord =
                result.map_err(|source| StoreError::Parse { row: idx + 1, source })?;
            records.push(record);
        }

        Ok(Self { records })
    }

    /// First record matching a class identifier, in dataset order.
    ///
    /// When the dataset carries several sections under the same class, only
    /// the earliest row is ever returned. Preserved upstream behavior; do not
    /// widen this to multi-section results without revisiting the renderers.
    pub fn lookup(&self, class: &str) -> Result<&CourseRecord, StoreError> {
        self.records
            .iter()
            .find(|record| record.class == class)
            .ok_or_else(|| StoreError::NotFound(class.to_string()))
    }

    /// Distinct class identifiers, in dataset order.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for record in &self.records {
            if !names.contains(&record.class.as_str()) {
                names.push(record.class.as_str());
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
Class,Section,Semester,Instructor,Avg.GPA,Enrollment.Women,Enrollment.Male,Enrollment.OtherGender,Enrollment.InState,Enrollment.OutOfState,Enrollment.White,Enrollment.Asian,Enrollment.Hispanic,Enrollment.AfricanAmerican,Enrollment.International,Enrollment.Other.Ethnicity,FinalGrade.A,FinalGrade.B,FinalGrade.C,FinalGrade.D,FinalGrade.F,FinalGrade.W,Popular.Co-Requisite.Name.1,Popular.Co-Requisite.Number.1,Popular.Co-Requisite.Name.2,Popular.Co-Requisite.Number.2,Popular.Pre-Requisite.Name.1,Popular.Pre-Requisite.Number.1,Popular.Pre-Requisite.Name.2,Popular.Pre-Requisite.Number.2
ITSC 1212,001,Fall 2024,R. Patel,3.12,50,40,10,70,30,40,20,15,10,10,5,30,25,20,10,10,5,MATH 1120,42,,,ITSC 1600,35,MATH 1241,18
ITSC 1212,002,Fall 2024,L. Gomez,2.95,45,50,5,60,40,35,25,15,10,10,5,25,30,20,10,10,5,MATH 1120,40,ITSC 1110,12,ITSC 1600,30,,
MATH 1241,001,Fall 2024,S. Chen,2.80,55,40,5,80,20,45,20,10,10,10,5,20,25,25,15,10,5,MATH 1120,50,MATH 1100,22,PHYS 1101,15,ITSC 1212,12
";

    #[test]
    fn test_load_and_lookup() {
        let store = CourseStore::parse_csv(SAMPLE_CSV).unwrap();
        assert_eq!(store.len(), 3);

        let record = store.lookup("MATH 1241").unwrap();
        assert_eq!(record.section, "001");
        assert_eq!(record.instructor, "S. Chen");
        assert_eq!(record.avg_gpa, 2.80);
        assert_eq!(record.women, 55);
        assert_eq!(record.grade_w, 5);
    }

    #[test]
    fn test_duplicate_class_resolves_to_first_row() {
        let store = CourseStore::parse_csv(SAMPLE_CSV).unwrap();

        let record = store.lookup("ITSC 1212").unwrap();
        assert_eq!(record.section, "001");
        assert_eq!(record.instructor, "R. Patel");
    }

    #[test]
    fn test_unknown_class() {
        let store = CourseStore::parse_csv(SAMPLE_CSV).unwrap();

        let err = store.lookup("CHEM 1251").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref class) if class == "CHEM 1251"));
    }

    #[test]
    fn test_class_names_are_distinct_in_dataset_order() {
        let store = CourseStore::parse_csv(SAMPLE_CSV).unwrap();

        assert_eq!(store.class_names(), vec!["ITSC 1212", "MATH 1241"]);
    }

    #[test]
    fn test_empty_reference_cells() {
        let store = CourseStore::parse_csv(SAMPLE_CSV).unwrap();

        let record = store.lookup("ITSC 1212").unwrap();
        assert_eq!(record.co_requisite_name_2, "");
        assert_eq!(record.co_requisite_count_2, None);

        let record = store.lookup("MATH 1241").unwrap();
        assert_eq!(record.co_requisite_count_2, Some(22));
    }

    #[test]
    fn test_missing_required_column() {
        let truncated = SAMPLE_CSV.replace("FinalGrade.W", "FinalGrade.X");

        let err = CourseStore::parse_csv(&truncated).unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn(ref col) if col == "FinalGrade.W"));
    }

    #[test]
    fn test_malformed_row_is_fatal() {
        let broken = SAMPLE_CSV.replace("3.12", "not-a-gpa");

        let err = CourseStore::parse_csv(&broken).unwrap_err();
        assert!(matches!(err, StoreError::Parse { row: 1, .. }));
    }
}
