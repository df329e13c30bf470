//! Interactive channel - on-screen HTML fragment
//!
//! Maps a `ReportModel` to markup for the selection page's rendering target.
//! Charts are inlined as screen-styled SVG. The output depends only on the
//! supplied model, so the fragment can be rebuilt on every selection change.

use std::fmt::Write as _;

use super::charts::{ChartStyle, chart_svg, escape_xml};
use super::model::{ChartKind, ReportModel};

/// Render the on-screen report fragment.
///
/// Placeholder table rows (empty course name) are kept so the table's row
/// count and spacing stay stable; the `row-placeholder` class carries the
/// transparent-text rule that visually hides them.
pub fn render_fragment(model: &ReportModel) -> String {
    let style = ChartStyle::screen();
    let mut html = String::with_capacity(64 * 1024);

    let _ = write!(
        html,
        "<h1>Class: {} - Section {}</h1>",
        escape_xml(&model.class),
        escape_xml(&model.section),
    );
    let _ = write!(
        html,
        "<h2>Semester: {} | Instructor: {}</h2>",
        escape_xml(&model.semester),
        escape_xml(&model.instructor),
    );
    let _ = write!(html, "<h3>Average GPA: {}</h3>", model.avg_gpa);

    html.push_str("<h3>Student Demographics</h3>");

    // The two pie charts share a flex row; bar charts get the full width.
    html.push_str(r#"<div class="chart-row">"#);
    for spec in model.charts.iter().filter(|c| c.kind == ChartKind::Pie) {
        let _ = write!(
            html,
            r#"<div class="chart-cell">{}</div>"#,
            chart_svg(spec, &style)
        );
    }
    html.push_str("</div>");

    for spec in model.charts.iter().filter(|c| c.kind == ChartKind::Bar) {
        if spec.title == "Grade Distribution" {
            html.push_str("<h3>Grade Distribution</h3>");
        }
        let _ = write!(
            html,
            r#"<div class="chart-wide">{}</div>"#,
            chart_svg(spec, &style)
        );
    }

    html.push_str("<h3>Common Concurrent &amp; Prior-Term Courses</h3>");
    html.push_str(r#"<table class="course-table"><thead><tr><th>Category</th><th>Course</th><th>Students</th></tr></thead><tbody>"#);
    for row in &model.rows {
        let class_attr = if row.is_placeholder() {
            r#" class="row-placeholder""#
        } else {
            ""
        };
        let students = row
            .students
            .map(|n| n.to_string())
            .unwrap_or_default();
        let _ = write!(
            html,
            "<tr{class_attr}><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.category.label(),
            escape_xml(&row.course),
            students,
        );
    }
    html.push_str("</tbody></table>");

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::{RowCategory, TableRow, build_report};
    use crate::store::CourseRecord;

    fn sample_model() -> ReportModel {
        build_report(&CourseRecord {
            class: "ITSC 1212".to_string(),
            section: "001".to_string(),
            semester: "Fall 2024".to_string(),
            instructor: "R. Patel".to_string(),
            avg_gpa: 3.12,
            women: 50,
            men: 40,
            other_gender: 10,
            in_state: 70,
            out_of_state: 30,
            white: 40,
            asian: 20,
            hispanic: 15,
            african_american: 10,
            international: 10,
            other_ethnicity: 5,
            grade_a: 30,
            grade_b: 25,
            grade_c: 20,
            grade_d: 10,
            grade_f: 10,
            grade_w: 5,
            co_requisite_name_1: "MATH 1120".to_string(),
            co_requisite_count_1: Some(42),
            co_requisite_name_2: String::new(),
            co_requisite_count_2: None,
            pre_requisite_name_1: "ITSC 1600".to_string(),
            pre_requisite_count_1: Some(35),
            pre_requisite_name_2: "MATH 1241".to_string(),
            pre_requisite_count_2: Some(18),
        })
    }

    #[test]
    fn test_fragment_carries_headers_and_all_charts() {
        let html = render_fragment(&sample_model());

        assert!(html.contains("<h1>Class: ITSC 1212 - Section 001</h1>"));
        assert!(html.contains("Semester: Fall 2024 | Instructor: R. Patel"));
        assert!(html.contains("Average GPA: 3.12"));
        assert_eq!(html.matches("<svg").count(), 4);
        assert_eq!(html.matches(r#"class="chart-cell""#).count(), 2);
        assert_eq!(html.matches(r#"class="chart-wide""#).count(), 2);
    }

    #[test]
    fn test_placeholder_rows_are_kept_but_marked() {
        let html = render_fragment(&sample_model());

        // All four rows present; the empty co-requisite slot is blanked, not
        // dropped.
        assert_eq!(html.matches("<tr").count(), 5); // header + 4 data rows
        assert_eq!(html.matches(r#"class="row-placeholder""#).count(), 1);
    }

    #[test]
    fn test_rows_render_in_model_order() {
        let html = render_fragment(&sample_model());

        let math = html.find("MATH 1120").unwrap();
        let itsc = html.find("ITSC 1600").unwrap();
        let math2 = html.find("MATH 1241").unwrap();
        assert!(math < itsc && itsc < math2);
    }

    #[test]
    fn test_user_content_is_escaped() {
        let mut model = sample_model();
        model.instructor = "Smith & <Jones>".to_string();
        model.rows[0] = TableRow {
            category: RowCategory::PriorTerm,
            course: "Art & Design <Studio>".to_string(),
            students: Some(7),
        };

        let html = render_fragment(&model);
        assert!(html.contains("Smith &amp; &lt;Jones&gt;"));
        assert!(html.contains("Art &amp; Design &lt;Studio&gt;"));
    }
}
