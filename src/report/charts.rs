//! Chart rendering shared by both channels
//!
//! A `ChartSpec` is turned into an SVG string, parameterized only by a
//! per-channel `ChartStyle`. The document channel additionally rasterizes
//! that SVG to PNG. Data, labels and colors always come from the spec, so the
//! two channels cannot drift apart.

use std::fmt::Write as _;

use super::convert::ExportError;
use super::model::{ChartKind, ChartSpec};

/// Per-channel presentation overrides. Everything the channels may
/// legitimately differ on lives here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub title_font: f32,
    pub label_font: f32,
    pub legend_font: f32,
    /// Bar charts carry a legend on screen but drop it in the exported
    /// document to save page space. Pie legends are always shown.
    pub bar_legend: bool,
}

impl ChartStyle {
    pub fn screen() -> Self {
        Self {
            width: 460,
            height: 340,
            title_font: 17.0,
            label_font: 12.0,
            legend_font: 12.0,
            bar_legend: true,
        }
    }

    pub fn export() -> Self {
        Self {
            width: 920,
            height: 680,
            title_font: 30.0,
            label_font: 25.0,
            legend_font: 25.0,
            bar_legend: false,
        }
    }
}

/// Render one chart specification as a standalone SVG document.
pub fn chart_svg(spec: &ChartSpec, style: &ChartStyle) -> String {
    let body = match spec.kind {
        ChartKind::Pie => pie_body(spec, style),
        ChartKind::Bar => bar_body(spec, style),
    };

    let mut svg = String::with_capacity(body.len() + 512);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = style.width,
        h = style.height,
    );
    let _ = write!(
        svg,
        r##"<rect width="{w}" height="{h}" fill="#ffffff"/>"##,
        w = style.width,
        h = style.height,
    );
    let _ = write!(
        svg,
        r##"<text x="14" y="{y:.1}" font-size="{size:.1}" font-weight="600" fill="#101820">{title}</text>"##,
        y = style.title_font * 1.4,
        size = style.title_font,
        title = escape_xml(spec.title),
    );
    svg.push_str(&body);
    svg.push_str("</svg>");
    svg
}

/// Rasterize one chart to PNG with the given style.
///
/// Used by the document channel, which embeds the result as a data URI.
pub fn chart_png(spec: &ChartSpec, style: &ChartStyle) -> Result<Vec<u8>, ExportError> {
    use resvg::render;
    use tiny_skia::Pixmap;
    use usvg::{Options, Transform, Tree};

    let svg = chart_svg(spec, style);

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let mut options = Options::default();
    options.font_family = "sans-serif".to_string();
    options.fontdb = std::sync::Arc::new(fontdb);

    let tree = Tree::from_str(&svg, &options)
        .map_err(|e| ExportError::Raster(format!("invalid SVG for '{}': {}", spec.title, e)))?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| ExportError::Raster(format!("zero-sized chart '{}'", spec.title)))?;

    render(&tree, Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| ExportError::Raster(format!("PNG encoding failed for '{}': {}", spec.title, e)))
}

fn pie_body(spec: &ChartSpec, style: &ChartStyle) -> String {
    let w = style.width as f32;
    let h = style.height as f32;
    let title_h = style.title_font * 2.0;

    let cx = w * 0.36;
    let cy = title_h + (h - title_h) / 2.0;
    let r = ((h - title_h) / 2.0 - 10.0).min(w * 0.30);

    let total: u64 = spec.values.iter().map(|&v| v as u64).sum();

    let mut body = String::new();

    if total == 0 {
        let _ = write!(
            body,
            r##"<text x="{cx:.1}" y="{cy:.1}" font-size="{size:.1}" fill="#555555" text-anchor="middle">No data</text>"##,
            size = style.label_font,
        );
    } else {
        // Slices start at 12 o'clock and run clockwise, in label order.
        let mut angle = -std::f32::consts::FRAC_PI_2;
        for (i, &value) in spec.values.iter().enumerate() {
            if value == 0 {
                continue;
            }
            let frac = value as f32 / total as f32;
            let sweep = frac * std::f32::consts::TAU;
            let color = spec.colors[i % spec.colors.len()];

            if frac >= 0.9999 {
                // A single category owns the whole pie; an arc would collapse.
                let _ = write!(
                    body,
                    r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r:.1}" fill="{color}"/>"#,
                );
            } else {
                let end = angle + sweep;
                let (x1, y1) = (cx + r * angle.cos(), cy + r * angle.sin());
                let (x2, y2) = (cx + r * end.cos(), cy + r * end.sin());
                let large_arc = if sweep > std::f32::consts::PI { 1 } else { 0 };
                let _ = write!(
                    body,
                    r#"<path d="M {cx:.1} {cy:.1} L {x1:.1} {y1:.1} A {r:.1} {r:.1} 0 {large_arc} 1 {x2:.1} {y2:.1} Z" fill="{color}"/>"#,
                );
            }
            // Advance even for the full-circle case so any residual sliver
            // starts where this slice ended rather than back at 12 o'clock.
            angle += sweep;

            // Percentage label inside the slice, skipped for slivers.
            if frac >= 0.05 {
                let mid = angle - sweep / 2.0;
                let lx = cx + r * 0.62 * mid.cos();
                let ly = cy + r * 0.62 * mid.sin();
                let _ = write!(
                    body,
                    r##"<text x="{lx:.1}" y="{ly:.1}" font-size="{size:.1}" fill="#ffffff" text-anchor="middle">{pct:.0}%</text>"##,
                    size = style.label_font,
                    pct = frac * 100.0,
                );
            }
        }
    }

    body.push_str(&legend_svg(
        spec,
        style,
        w * 0.70,
        title_h + style.legend_font,
    ));
    body
}

fn bar_body(spec: &ChartSpec, style: &ChartStyle) -> String {
    let w = style.width as f32;
    let h = style.height as f32;

    let margin_top = style.title_font * 2.2;
    let mut margin_left = style.label_font * 3.2;
    if spec.value_axis.is_some() {
        margin_left += style.label_font * 1.6;
    }
    let mut margin_bottom = style.label_font * 2.2;
    if spec.category_axis.is_some() {
        margin_bottom += style.label_font * 1.6;
    }
    let margin_right = if style.bar_legend {
        w * 0.26
    } else {
        style.label_font * 1.2
    };

    let plot_w = w - margin_left - margin_right;
    let plot_h = h - margin_top - margin_bottom;
    let bottom = margin_top + plot_h;

    let max = spec.values.iter().copied().max().unwrap_or(0).max(1) as f32;

    let mut body = String::new();

    // Gridlines and tick labels.
    for i in 0..=4 {
        let tick = max * i as f32 / 4.0;
        let y = bottom - plot_h * tick / max;
        let _ = write!(
            body,
            r##"<line x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="#dddddd" stroke-width="1"/>"##,
            x1 = margin_left,
            x2 = margin_left + plot_w,
        );
        let _ = write!(
            body,
            r##"<text x="{x:.1}" y="{ty:.1}" font-size="{size:.1}" fill="#444444" text-anchor="end">{tick:.0}</text>"##,
            x = margin_left - 6.0,
            ty = y + style.label_font * 0.35,
            size = style.label_font,
        );
    }

    // Axis lines.
    let _ = write!(
        body,
        r##"<line x1="{x:.1}" y1="{y1:.1}" x2="{x:.1}" y2="{y2:.1}" stroke="#444444" stroke-width="1"/>"##,
        x = margin_left,
        y1 = margin_top,
        y2 = bottom,
    );
    let _ = write!(
        body,
        r##"<line x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="#444444" stroke-width="1"/>"##,
        x1 = margin_left,
        x2 = margin_left + plot_w,
        y = bottom,
    );

    let slot = plot_w / spec.values.len().max(1) as f32;
    for (i, &value) in spec.values.iter().enumerate() {
        let color = spec.colors[i % spec.colors.len()];
        let bar_h = plot_h * value as f32 / max;
        let x = margin_left + i as f32 * slot + slot * 0.15;

        if value > 0 {
            let _ = write!(
                body,
                r#"<rect x="{x:.1}" y="{y:.1}" width="{bw:.1}" height="{bar_h:.1}" fill="{color}"/>"#,
                y = bottom - bar_h,
                bw = slot * 0.7,
            );
        }

        let _ = write!(
            body,
            r##"<text x="{cx:.1}" y="{ty:.1}" font-size="{size:.1}" fill="#101820" text-anchor="middle">{label}</text>"##,
            cx = margin_left + i as f32 * slot + slot / 2.0,
            ty = bottom + style.label_font * 1.2,
            size = style.label_font,
            label = escape_xml(spec.labels[i]),
        );
    }

    if let Some(caption) = spec.value_axis {
        let x = style.label_font * 1.2;
        let y = margin_top + plot_h / 2.0;
        let _ = write!(
            body,
            r##"<text x="{x:.1}" y="{y:.1}" font-size="{size:.1}" fill="#444444" text-anchor="middle" transform="rotate(-90 {x:.1} {y:.1})">{caption}</text>"##,
            size = style.label_font,
            caption = escape_xml(caption),
        );
    }

    if let Some(caption) = spec.category_axis {
        let _ = write!(
            body,
            r##"<text x="{x:.1}" y="{y:.1}" font-size="{size:.1}" fill="#444444" text-anchor="middle">{caption}</text>"##,
            x = margin_left + plot_w / 2.0,
            y = h - style.label_font * 0.6,
            size = style.label_font,
            caption = escape_xml(caption),
        );
    }

    if style.bar_legend {
        body.push_str(&legend_svg(
            spec,
            style,
            w - margin_right + 10.0,
            margin_top + style.legend_font,
        ));
    }

    body
}

/// Swatch-and-label legend column, one row per category.
fn legend_svg(spec: &ChartSpec, style: &ChartStyle, x: f32, y_start: f32) -> String {
    let swatch = style.legend_font;
    let step = style.legend_font * 1.7;

    let mut legend = String::from(r#"<g class="legend">"#);
    for (i, label) in spec.labels.iter().enumerate() {
        let y = y_start + i as f32 * step;
        let color = spec.colors[i % spec.colors.len()];
        let _ = write!(
            legend,
            r#"<rect x="{x:.1}" y="{ry:.1}" width="{swatch:.1}" height="{swatch:.1}" fill="{color}" rx="2"/>"#,
            ry = y - swatch * 0.8,
        );
        let _ = write!(
            legend,
            r##"<text x="{tx:.1}" y="{y:.1}" font-size="{size:.1}" fill="#101820">{label}</text>"##,
            tx = x + swatch + 8.0,
            size = style.legend_font,
            label = escape_xml(label),
        );
    }
    legend.push_str("</g>");
    legend
}

/// Escape XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::{ChartKind, ChartSpec, PALETTE};

    fn gender_spec() -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Pie,
            title: "Gender",
            labels: vec!["Female", "Male", "Other"],
            values: vec![50, 40, 10],
            colors: PALETTE[..3].to_vec(),
            value_axis: None,
            category_axis: None,
        }
    }

    fn grade_spec() -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Bar,
            title: "Grade Distribution",
            labels: vec!["A", "B", "C", "D", "F", "W"],
            values: vec![30, 25, 20, 10, 10, 5],
            colors: PALETTE.to_vec(),
            value_axis: Some("Number of Students"),
            category_axis: Some("Grade"),
        }
    }

    #[test]
    fn test_pie_contains_all_categories_and_colors() {
        let svg = chart_svg(&gender_spec(), &ChartStyle::screen());

        assert!(svg.contains("Gender"));
        for label in ["Female", "Male", "Other"] {
            assert!(svg.contains(label), "missing label {label}");
        }
        for color in &PALETTE[..3] {
            assert!(svg.contains(color), "missing color {color}");
        }
    }

    #[test]
    fn test_channels_differ_only_in_style() {
        let spec = grade_spec();
        let screen = chart_svg(&spec, &ChartStyle::screen());
        let export = chart_svg(&spec, &ChartStyle::export());

        // Same titles, labels and colors in both channels.
        for fragment in ["Grade Distribution", "Number of Students"] {
            assert!(screen.contains(fragment) && export.contains(fragment));
        }
        for label in &spec.labels {
            assert!(screen.contains(label) && export.contains(label));
        }
        for color in &spec.colors {
            assert!(screen.contains(color) && export.contains(color));
        }

        // Style overrides do differ: larger export fonts, no bar legend.
        assert!(screen.contains(r#"font-size="17.0""#));
        assert!(export.contains(r#"font-size="30.0""#));
        assert!(screen.contains(r#"class="legend""#));
        assert!(!export.contains(r#"class="legend""#));
    }

    #[test]
    fn test_pie_legend_survives_export_style() {
        let export = chart_svg(&gender_spec(), &ChartStyle::export());

        assert!(export.contains(r#"class="legend""#));
    }

    #[test]
    fn test_empty_pie_renders_placeholder() {
        let mut spec = gender_spec();
        spec.values = vec![0, 0, 0];

        let svg = chart_svg(&spec, &ChartStyle::screen());
        assert!(svg.contains("No data"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_single_category_pie_closes_the_circle() {
        let mut spec = gender_spec();
        spec.values = vec![100, 0, 0];

        let svg = chart_svg(&spec, &ChartStyle::screen());
        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_residual_sliver_follows_full_circle_slice() {
        let mut spec = gender_spec();
        spec.values = vec![9999, 1, 0];

        let svg = chart_svg(&spec, &ChartStyle::export());
        assert!(svg.contains("<circle"));

        // The sliver slice picks up where the dominant slice ended, so its
        // outer edge sits just short of 12 o'clock, not exactly on it.
        let path = svg.split(r#"<path d="M "#).nth(1).unwrap();
        let mut coords = path.split_whitespace();
        let cx: f32 = coords.next().unwrap().parse().unwrap();
        let _cy = coords.next().unwrap();
        assert_eq!(coords.next(), Some("L"));
        let x1: f32 = coords.next().unwrap().parse().unwrap();
        assert!(x1 < cx, "sliver restarted at 12 o'clock (x1 = {x1}, cx = {cx})");
    }

    #[test]
    fn test_zero_valued_bar_is_omitted_but_label_stays() {
        let mut spec = grade_spec();
        spec.values = vec![30, 25, 20, 10, 10, 0];

        let svg = chart_svg(&spec, &ChartStyle::screen());
        // five bars, one zero-height omission, six category labels
        assert_eq!(svg.matches("<rect").count() - legend_rects(&svg) - 1, 5);
        assert!(svg.contains(">W</text>"));
    }

    #[test]
    fn test_chart_png_produces_png_bytes() {
        let png = chart_png(&gender_spec(), &ChartStyle::screen()).unwrap();

        assert!(png.len() > 8);
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Art & <Design>"), "Art &amp; &lt;Design&gt;");
    }

    // Background and legend swatches are rects too; count the legend's.
    fn legend_rects(svg: &str) -> usize {
        match svg.find(r#"<g class="legend">"#) {
            Some(start) => {
                let end = svg[start..].find("</g>").map(|e| start + e).unwrap_or(svg.len());
                svg[start..end].matches("<rect").count()
            }
            None => 0,
        }
    }
}
