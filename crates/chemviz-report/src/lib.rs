#![warn(missing_docs)]
//! # chemviz-report
//!
//! ## Purpose
//! Turns an in-memory summary and an optional chart raster into a
//! deterministic multi-page report document.
//!
//! ## Responsibilities
//! - Model the fixed page geometry and the draw-instruction vocabulary.
//! - Wrap the audit text into lines bounded by the configured wrap width.
//! - Lay out the overview page and the raw-data pages with deterministic
//!   page-break logic.
//! - Hand finished documents to a save sink named by generation timestamp.
//!
//! ## Data flow
//! [`paginate`] consumes a [`chemviz_core::Summary`] plus an optional
//! [`chemviz_chart::RasterImage`] and produces a [`ReportDocument`] that the
//! caller passes to a [`ReportSink`] exactly once.
//!
//! ## Ownership and lifetimes
//! The engine runs synchronously start-to-finish and owns the document until
//! hand-off; a document under construction is never shared.
//!
//! ## Error model
//! Geometry that cannot hold a single text line, codec failures, and sink
//! failures surface as [`ReportError`].
//!
//! ## Example
//! ```rust
//! use chemviz_core::Summary;
//! use chemviz_report::{PageGeometry, paginate};
//!
//! let mut summary = Summary::new(3);
//! summary.set_type_count("Pump", 2);
//! summary.set_type_count("Valve", 1);
//! let document = paginate(&summary, None, "2026-02-11 09:30:00 UTC", &PageGeometry::a4())
//!     .unwrap();
//! assert_eq!(document.page_count(), 2);
//! ```

use std::fs;
use std::path::PathBuf;

use chemviz_chart::RasterImage;
use chemviz_core::{CoreError, Summary, render_audit_text};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Report title drawn in the overview header band.
pub const REPORT_TITLE: &str = "CHEMICAL EQUIPMENT REPORT";
/// Section title of the overview page.
pub const OVERVIEW_SECTION_TITLE: &str = "Analysis Overview";
/// Section title repeated on every raw-data page.
pub const RAW_SECTION_TITLE: &str = "Raw Analysis Data";
/// Closing caption drawn after the final raw-data line.
pub const FOOTER_CAPTION: &str = "End of Report - System Generated JSON Export";

const HEADER_TITLE_FONT_SIZE: f32 = 22.0;
const HEADER_TIMESTAMP_FONT_SIZE: f32 = 10.0;
const SECTION_TITLE_FONT_SIZE: f32 = 16.0;
const SUMMARY_LINE_FONT_SIZE: f32 = 12.0;
const RAW_TEXT_FONT_SIZE: f32 = 9.0;
const FOOTER_FONT_SIZE: f32 = 8.0;

const HEADER_TITLE_Y: f32 = 25.0;
const HEADER_TIMESTAMP_X: f32 = 140.0;
const HEADER_TIMESTAMP_Y: f32 = 32.0;
const OVERVIEW_TITLE_Y: f32 = 55.0;
const OVERVIEW_TOTAL_Y: f32 = 65.0;
const OVERVIEW_RULE_Y: f32 = 70.0;
const RAW_TITLE_Y: f32 = 20.0;
const RAW_RULE_Y: f32 = 25.0;

/// Fixed page geometry shared by all pages of one document.
///
/// Values are document units; the defaults mirror the original A4-unit
/// template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width `W`.
    pub page_width: f32,
    /// Page height `H`.
    pub page_height: f32,
    /// Bottom margin `M`; text never starts below `H - M`.
    pub bottom_margin: f32,
    /// Left margin for text and rules.
    pub left_margin: f32,
    /// Vertical offset where raw-data text starts on each raw page.
    pub raw_top_offset: f32,
    /// Vertical advance per raw-data line `Lh`.
    pub line_height: f32,
    /// Maximum rendered width of one raw-data line `Wt`.
    pub wrap_width: f32,
    /// Deterministic per-character advance of the raw-data font.
    pub raw_char_width: f32,
    /// Gap between the final raw-data line and the footer caption.
    pub footer_gap: f32,
    /// Height of the filled overview header band.
    pub header_band_height: f32,
    /// Chart box left edge.
    pub chart_x: f32,
    /// Chart box top edge.
    pub chart_y: f32,
    /// Chart box width; the raster is scaled to this box.
    pub chart_width: f32,
    /// Chart box height; source aspect ratio is not preserved.
    pub chart_height: f32,
}

impl PageGeometry {
    /// Returns the fixed A4-unit template geometry.
    pub fn a4() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            bottom_margin: 20.0,
            left_margin: 20.0,
            raw_top_offset: 35.0,
            line_height: 5.0,
            wrap_width: 170.0,
            raw_char_width: 2.0,
            footer_gap: 10.0,
            header_band_height: 40.0,
            chart_x: 15.0,
            chart_y: 80.0,
            chart_width: 180.0,
            chart_height: 90.0,
        }
    }

    /// Returns how many raw-data lines fit on one raw page.
    ///
    /// Every raw page starts its cursor at [`Self::raw_top_offset`], so the
    /// capacity `floor((H - M - raw_top_offset) / Lh)` is uniform and the raw
    /// page count for `n` lines is `ceil(n / capacity)`.
    pub fn lines_per_raw_page(&self) -> usize {
        let usable = self.page_height - self.bottom_margin - self.raw_top_offset;
        (usable / self.line_height).floor().max(0.0) as usize
    }

    /// Returns how many characters fit inside the wrap width.
    pub fn max_chars_per_line(&self) -> usize {
        (self.wrap_width / self.raw_char_width).floor().max(0.0) as usize
    }

    /// Validates that the geometry can hold at least one line per page and
    /// one character per line.
    ///
    /// # Errors
    /// Returns [`ReportError::InvalidGeometry`] otherwise.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.line_height <= 0.0 || self.raw_char_width <= 0.0 {
            return Err(ReportError::InvalidGeometry(
                "line height and character width must be positive".to_string(),
            ));
        }
        if self.lines_per_raw_page() == 0 {
            return Err(ReportError::InvalidGeometry(
                "page cannot hold a single raw-data line".to_string(),
            ));
        }
        if self.max_chars_per_line() == 0 {
            return Err(ReportError::InvalidGeometry(
                "wrap width cannot hold a single character".to_string(),
            ));
        }

        Ok(())
    }
}

/// Text style of one draw instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextStyle {
    /// Default proportional face.
    Regular,
    /// Monospaced face used for the raw-data dump.
    Monospace,
    /// Italic face used for the closing caption.
    Italic,
}

/// One draw instruction bound to the shared page coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawOp {
    /// Filled or outlined rectangle.
    Rect {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Rectangle width.
        width: f32,
        /// Rectangle height.
        height: f32,
        /// Whether the rectangle is filled.
        filled: bool,
    },
    /// Single line of text.
    Text {
        /// Left edge of the text run.
        x: f32,
        /// Baseline position.
        y: f32,
        /// Font size in document units.
        font_size: f32,
        /// Text style.
        style: TextStyle,
        /// Text content.
        content: String,
    },
    /// Horizontal or arbitrary rule.
    Rule {
        /// Start x.
        x1: f32,
        /// Start y.
        y1: f32,
        /// End x.
        x2: f32,
        /// End y.
        y2: f32,
    },
    /// Raster image scaled to a fixed box.
    Image {
        /// Box left edge.
        x: f32,
        /// Box top edge.
        y: f32,
        /// Box width.
        width: f32,
        /// Box height.
        height: f32,
        /// Source raster, scaled to the box without preserving aspect.
        image: RasterImage,
    },
}

/// Ordered draw instructions for one page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    /// Draw instructions in paint order.
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Returns the text lines drawn on this page, in paint order.
    pub fn text_lines(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Finished multi-page report document.
///
/// Built once by [`paginate`], handed to a [`ReportSink`], never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Pages in document order; the overview page is always first.
    pub pages: Vec<Page>,
}

impl ReportDocument {
    /// Returns the number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serializes the document to JSON bytes for the save sink.
    ///
    /// # Errors
    /// Returns [`ReportError::Core`] when JSON encoding fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ReportError> {
        serde_json::to_vec(self)
            .map_err(|error| ReportError::Core(CoreError::Codec(error)))
    }

    /// Deserializes a document from JSON bytes.
    ///
    /// # Errors
    /// Returns [`ReportError::Core`] when JSON decoding fails.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, ReportError> {
        serde_json::from_slice(raw)
            .map_err(|error| ReportError::Core(CoreError::Codec(error)))
    }
}

/// Wraps one source line into segments no wider than `max_chars` characters.
///
/// # Semantics
/// Splits preferentially at the last space inside the window; the space stays
/// at the end of the leading segment, so concatenating the returned segments
/// reproduces the source line exactly. Overlong unbroken runs are split hard
/// at the window edge. A segment is never empty except for an empty source
/// line.
pub fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= max_chars {
        return vec![line.to_string()];
    }

    let mut segments = Vec::new();
    let mut start = 0;
    while chars.len() - start > max_chars {
        let window = &chars[start..start + max_chars];
        let split = window
            .iter()
            .rposition(|ch| *ch == ' ')
            .map(|index| index + 1)
            .unwrap_or(max_chars);
        segments.push(chars[start..start + split].iter().collect());
        start += split;
    }
    segments.push(chars[start..].iter().collect());
    segments
}

/// Wraps multi-line audit text into the ordered line sequence to lay out.
pub fn wrap_audit_text(text: &str, max_chars: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| wrap_line(line, max_chars))
        .collect()
}

/// Produces the report document for one summary.
///
/// # Parameters
/// - `summary`: the current analysis summary.
/// - `chart`: raster of the current chart, or `None` when no rendering
///   surface exists; a missing chart skips only the image instruction.
/// - `generated_at`: preformatted generation timestamp for the header band.
/// - `geometry`: fixed page geometry shared by all pages.
///
/// # Errors
/// Returns [`ReportError::InvalidGeometry`] for unusable geometry and
/// [`ReportError::Core`] when audit serialization fails.
pub fn paginate(
    summary: &Summary,
    chart: Option<&RasterImage>,
    generated_at: &str,
    geometry: &PageGeometry,
) -> Result<ReportDocument, ReportError> {
    geometry.validate()?;

    let mut pages = vec![overview_page(summary, chart, generated_at, geometry)];

    let audit_text = render_audit_text(summary)?;
    let lines = wrap_audit_text(&audit_text, geometry.max_chars_per_line());

    let limit = geometry.page_height - geometry.bottom_margin;
    let mut page = raw_page_header(geometry);
    let mut cursor = geometry.raw_top_offset;

    for line in lines {
        // Page break happens only at line boundaries, before the line that
        // would cross `H - M` is drawn.
        if cursor + geometry.line_height > limit {
            pages.push(std::mem::replace(&mut page, raw_page_header(geometry)));
            cursor = geometry.raw_top_offset;
        }

        page.ops.push(DrawOp::Text {
            x: geometry.left_margin,
            y: cursor,
            font_size: RAW_TEXT_FONT_SIZE,
            style: TextStyle::Monospace,
            content: line,
        });
        cursor += geometry.line_height;
    }

    // The footer never forces a page break: if it would overflow, it is
    // written anyway at the current position.
    page.ops.push(DrawOp::Text {
        x: geometry.left_margin,
        y: cursor + geometry.footer_gap,
        font_size: FOOTER_FONT_SIZE,
        style: TextStyle::Italic,
        content: FOOTER_CAPTION.to_string(),
    });
    pages.push(page);

    Ok(ReportDocument { pages })
}

fn overview_page(
    summary: &Summary,
    chart: Option<&RasterImage>,
    generated_at: &str,
    geometry: &PageGeometry,
) -> Page {
    let mut ops = vec![
        DrawOp::Rect {
            x: 0.0,
            y: 0.0,
            width: geometry.page_width,
            height: geometry.header_band_height,
            filled: true,
        },
        DrawOp::Text {
            x: geometry.left_margin,
            y: HEADER_TITLE_Y,
            font_size: HEADER_TITLE_FONT_SIZE,
            style: TextStyle::Regular,
            content: REPORT_TITLE.to_string(),
        },
        DrawOp::Text {
            x: HEADER_TIMESTAMP_X,
            y: HEADER_TIMESTAMP_Y,
            font_size: HEADER_TIMESTAMP_FONT_SIZE,
            style: TextStyle::Regular,
            content: format!("Generated: {generated_at}"),
        },
        DrawOp::Text {
            x: geometry.left_margin,
            y: OVERVIEW_TITLE_Y,
            font_size: SECTION_TITLE_FONT_SIZE,
            style: TextStyle::Regular,
            content: OVERVIEW_SECTION_TITLE.to_string(),
        },
        DrawOp::Text {
            x: geometry.left_margin,
            y: OVERVIEW_TOTAL_Y,
            font_size: SUMMARY_LINE_FONT_SIZE,
            style: TextStyle::Regular,
            content: format!("Total Equipment Items: {}", summary.total_count),
        },
        DrawOp::Rule {
            x1: geometry.left_margin,
            y1: OVERVIEW_RULE_Y,
            x2: geometry.page_width - geometry.left_margin,
            y2: OVERVIEW_RULE_Y,
        },
    ];

    if let Some(image) = chart {
        ops.push(DrawOp::Image {
            x: geometry.chart_x,
            y: geometry.chart_y,
            width: geometry.chart_width,
            height: geometry.chart_height,
            image: image.clone(),
        });
    }

    Page { ops }
}

fn raw_page_header(geometry: &PageGeometry) -> Page {
    Page {
        ops: vec![
            DrawOp::Text {
                x: geometry.left_margin,
                y: RAW_TITLE_Y,
                font_size: SECTION_TITLE_FONT_SIZE,
                style: TextStyle::Regular,
                content: RAW_SECTION_TITLE.to_string(),
            },
            DrawOp::Rule {
                x1: geometry.left_margin,
                y1: RAW_RULE_Y,
                x2: geometry.page_width - geometry.left_margin,
                y2: RAW_RULE_Y,
            },
        ],
    }
}

/// Returns the output file name for a document generated at `unix_ms`.
pub fn report_file_name(unix_ms: u64) -> String {
    format!("Chemical_Full_Report_{unix_ms}.pdf")
}

/// Save mechanism the finished document is handed to.
pub trait ReportSink: Send + Sync {
    /// Persists one finished document under the given file name.
    ///
    /// # Errors
    /// Returns [`ReportError::Sink`] when the host save mechanism fails.
    fn save(&self, file_name: &str, document: &ReportDocument) -> Result<(), ReportError>;
}

/// Sink writing serialized documents into a directory.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    directory: PathBuf,
}

impl FileReportSink {
    /// Creates a sink rooted at the given directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl ReportSink for FileReportSink {
    fn save(&self, file_name: &str, document: &ReportDocument) -> Result<(), ReportError> {
        let encoded = document.to_json_bytes()?;
        let path = self.directory.join(file_name);
        fs::write(&path, encoded)
            .map_err(|error| ReportError::Sink(format!("report write failed: {error}")))
    }
}

/// Report engine error type.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Geometry cannot hold a single line or character.
    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),
    /// Audit codec failure.
    #[error("report codec failure: {0}")]
    Core(#[from] CoreError),
    /// Save sink failure.
    #[error("report sink failure: {0}")]
    Sink(String),
}
