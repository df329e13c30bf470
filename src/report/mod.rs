//! Report model and dual-channel rendering
//!
//! One course record becomes a channel-independent `ReportModel`, consumed by
//! two renderers that must stay visually and numerically consistent:
//!
//! ## Main Components
//! - `build_report`: pure record -> model derivation (single source of truth)
//! - `charts`: ChartSpec -> SVG / PNG rendering shared by both channels
//! - `interactive`: on-screen HTML fragment (inline SVG, screen style)
//! - `document`: exported PDF (rasterized charts, filtered table)
//! - `convert`: the external HTML-to-PDF backend with typed failure modes

// ============ Channel-Independent Model ============
pub mod model;
pub use model::{ChartKind, ChartSpec, PALETTE, ReportModel, RowCategory, TableRow, build_report};

// ============ Shared Chart Rendering ============
pub mod charts;
pub use charts::{ChartStyle, chart_png, chart_svg};

// ============ Interactive Channel ============
pub mod interactive;
pub use interactive::render_fragment;

// ============ Document Channel ============
pub mod document;
pub use document::{DocumentRenderer, RenderedDocument};

// ============ Conversion Backend ============
pub mod convert;
pub use convert::{Converter, ExportError};
