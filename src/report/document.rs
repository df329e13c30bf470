//! Document channel - static PDF export
//!
//! Re-renders the same `ReportModel` with export styling: charts rasterized
//! to PNG and embedded as data URIs, the course-reference table filtered of
//! placeholder rows, the result converted through the external backend and
//! persisted under a fixed per-course filename.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Local;

use super::charts::{ChartStyle, chart_png, escape_xml};
use super::convert::{Converter, ExportError, staging_tag};
use super::model::{ReportModel, TableRow};

/// A finished export, ready for delivery. The renderer does not know about
/// the delivery transport.
#[derive(Debug)]
pub struct RenderedDocument {
    pub filename: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

pub struct DocumentRenderer {
    converter: Converter,
    output_dir: PathBuf,
}

impl DocumentRenderer {
    pub fn new(converter: Converter, output_dir: impl AsRef<Path>) -> Self {
        Self {
            converter,
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Fixed naming convention; repeated exports for the same course
    /// overwrite the previous output.
    pub fn output_filename(class: &str) -> String {
        format!("{class}_report.pdf")
    }

    /// Produce the downloadable document for one report model.
    ///
    /// All-or-nothing: a conversion failure leaves no file behind, and the
    /// final write goes through a staged temp file so a partially written
    /// document can never be served.
    pub async fn render(&self, model: &ReportModel) -> Result<RenderedDocument, ExportError> {
        let style = ChartStyle::export();

        let mut images = Vec::with_capacity(model.charts.len());
        for spec in &model.charts {
            let png = chart_png(spec, &style)?;
            images.push(format!("data:image/png;base64,{}", BASE64.encode(png)));
        }

        let html = build_html(model, &images);
        let bytes = self.converter.html_to_pdf(html).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;

        let filename = Self::output_filename(&model.class);
        let path = self.output_dir.join(&filename);
        let staged = self.staged_path(&filename);

        tokio::fs::write(&staged, &bytes).await?;
        tokio::fs::rename(&staged, &path).await?;

        tracing::info!("Exported report to {:?} ({} bytes)", path, bytes.len());

        Ok(RenderedDocument {
            filename,
            path,
            bytes,
        })
    }

    /// Staged names carry a unique tag so concurrent exports of the same
    /// course each write privately; the rename onto the final name is the
    /// only shared step.
    fn staged_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(format!("{filename}.{}.tmp", staging_tag()))
    }
}

/// Build the standalone export document. `images` is aligned 1:1 with
/// `model.charts`: gender pie, residency pie, ethnicity bar, grade bar.
fn build_html(model: &ReportModel, images: &[String]) -> String {
    let mut html = String::with_capacity(images.iter().map(String::len).sum::<usize>() + 4096);

    html.push_str(
        "<html><head><style>\
         body { font-family: Arial, sans-serif; }\
         .chart-table { width: 100%; border-collapse: collapse; }\
         .chart-table td { width: 50%; text-align: center; }\
         .chart-table img { width: 90%; }\
         .course-table { width: 60%; text-align: left; border-collapse: collapse; }\
         .course-table th, .course-table td { border: 1px solid #444; padding: 5px; }\
         .course-table th { background-color: #f2f2f2; font-weight: bold; }\
         .footer { color: #555; font-size: 11px; margin-top: 30px; }\
         </style></head><body>",
    );

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

    // Pie charts side by side via a table; the PDF layout engine handles
    // this more predictably than flexbox.
    let _ = write!(
        html,
        r#"<table class="chart-table"><tr><td><img src="{}"/></td><td><img src="{}"/></td></tr></table>"#,
        images[0], images[1],
    );

    let _ = write!(
        html,
        r#"<img src="{}" width="600" style="padding-top: 75px;"/>"#,
        images[2],
    );
    let _ = write!(
        html,
        r#"<img src="{}" width="600" style="padding-bottom: 75px;"/>"#,
        images[3],
    );

    html.push_str("<h3>Common Concurrent &amp; Prior-Term Courses</h3>");
    html.push_str(&table_html(&model.rows));

    let _ = write!(
        html,
        r#"<p class="footer">Generated on {}</p>"#,
        Local::now().format("%B %e, %Y"),
    );

    html.push_str("</body></html>");
    html
}

/// The exported table drops placeholder rows entirely, unlike the
/// interactive channel which keeps and blanks them.
fn table_html(rows: &[TableRow]) -> String {
    let mut table = String::from(
        r#"<table class="course-table"><thead><tr><th>Category</th><th>Course</th><th>Students</th></tr></thead><tbody>"#,
    );

    for row in rows.iter().filter(|row| !row.is_placeholder()) {
        let students = row.students.map(|n| n.to_string()).unwrap_or_default();
        let _ = write!(
            table,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.category.label(),
            escape_xml(&row.course),
            students,
        );
    }

    table.push_str("</tbody></table>");
    table
}
