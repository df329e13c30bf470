//! Channel-independent report model
//!
//! Single source of truth for both renderers. Chart ordering, label ordering
//! and color assignment are contract: the interactive view and the exported
//! document consume the same `ReportModel` instance and only differ in
//! presentation style, never in data.

use crate::store::CourseRecord;

/// Brand palette shared by every chart. Colors are assigned by category
/// index from this fixed sequence, never computed from the data.
pub const PALETTE: [&str; 6] = [
    "#005035", // dark green
    "#A49665", // tan
    "#802F2D", // maroon
    "#007377", // teal
    "#101820", // near-black
    "#899064", // olive
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
}

/// One fully-specified visualization unit, independent of rendering target.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: &'static str,
    /// Category labels, aligned 1:1 with `values` and `colors`.
    pub labels: Vec<&'static str>,
    pub values: Vec<u32>,
    pub colors: Vec<&'static str>,
    /// Value-axis caption, bar charts only.
    pub value_axis: Option<&'static str>,
    /// Category-axis caption, bar charts only.
    pub category_axis: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCategory {
    PriorTerm,
    Concurrent,
}

impl RowCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RowCategory::PriorTerm => "Prior-Term Course",
            RowCategory::Concurrent => "Concurrent Course",
        }
    }
}

/// One row of the course-reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub category: RowCategory,
    pub course: String,
    pub students: Option<u32>,
}

impl TableRow {
    /// Rows without a course name are kept in the interactive table (blanked
    /// out, preserving spacing) but dropped from the exported document.
    pub fn is_placeholder(&self) -> bool {
        self.course.is_empty()
    }
}

/// The aggregate consumed by both renderers: header fields, exactly four
/// charts (gender pie, residency pie, ethnicity bar, grade bar) and exactly
/// four table rows (co-requisite 1 and 2, pre-requisite 1 and 2).
#[derive(Debug, Clone, PartialEq)]
pub struct ReportModel {
    pub class: String,
    pub section: String,
    pub semester: String,
    pub instructor: String,
    pub avg_gpa: f64,
    pub charts: Vec<ChartSpec>,
    pub rows: Vec<TableRow>,
}

/// Build the report model for one course record.
///
/// Pure and deterministic: no I/O, no validation beyond what the store
/// already guarantees. Zero counts pass through unchanged and render as
/// zero-width slices or bars.
pub fn build_report(record: &CourseRecord) -> ReportModel {
    let gender = ChartSpec {
        kind: ChartKind::Pie,
        title: "Gender",
        labels: vec!["Female", "Male", "Other"],
        values: vec![record.women, record.men, record.other_gender],
        colors: PALETTE[..3].to_vec(),
        value_axis: None,
        category_axis: None,
    };

    // Only two categories; the palette's third entry goes unused here.
    let residency = ChartSpec {
        kind: ChartKind::Pie,
        title: "Residency",
        labels: vec!["In-State", "Out-of-State"],
        values: vec![record.in_state, record.out_of_state],
        colors: PALETTE[..2].to_vec(),
        value_axis: None,
        category_axis: None,
    };

    let ethnicity = ChartSpec {
        kind: ChartKind::Bar,
        title: "Ethnicity",
        labels: vec![
            "White",
            "Asian",
            "Hispanic",
            "African American",
            "International",
            "Other",
        ],
        values: vec![
            record.white,
            record.asian,
            record.hispanic,
            record.african_american,
            record.international,
            record.other_ethnicity,
        ],
        colors: PALETTE.to_vec(),
        value_axis: Some("Number of Students"),
        category_axis: None,
    };

    // Fixed grade order, never sorted by value.
    let grades = ChartSpec {
        kind: ChartKind::Bar,
        title: "Grade Distribution",
        labels: vec!["A", "B", "C", "D", "F", "W"],
        values: vec![
            record.grade_a,
            record.grade_b,
            record.grade_c,
            record.grade_d,
            record.grade_f,
            record.grade_w,
        ],
        colors: PALETTE.to_vec(),
        value_axis: Some("Number of Students"),
        category_axis: Some("Grade"),
    };

    let rows = vec![
        TableRow {
            category: RowCategory::PriorTerm,
            course: record.co_requisite_name_1.clone(),
            students: record.co_requisite_count_1,
        },
        TableRow {
            category: RowCategory::PriorTerm,
            course: record.co_requisite_name_2.clone(),
            students: record.co_requisite_count_2,
        },
        TableRow {
            category: RowCategory::Concurrent,
            course: record.pre_requisite_name_1.clone(),
            students: record.pre_requisite_count_1,
        },
        TableRow {
            category: RowCategory::Concurrent,
            course: record.pre_requisite_name_2.clone(),
            students: record.pre_requisite_count_2,
        },
    ];

    ReportModel {
        class: record.class.clone(),
        section: record.section.clone(),
        semester: record.semester.clone(),
        instructor: record.instructor.clone(),
        avg_gpa: record.avg_gpa,
        charts: vec![gender, residency, ethnicity, grades],
        rows,
    }
}
