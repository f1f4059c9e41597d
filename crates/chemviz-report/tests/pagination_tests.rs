//! Integration tests for deterministic pagination and the audit round trip.

use chemviz_core::{Summary, parse_audit_text, render_audit_text};
use chemviz_report::{
    DrawOp, FOOTER_CAPTION, PageGeometry, RAW_SECTION_TITLE, ReportDocument, TextStyle, paginate,
    report_file_name, wrap_audit_text,
};

fn fixture_summary() -> Summary {
    let mut summary = Summary::new(3);
    summary.set_type_count("Pump", 2);
    summary.set_type_count("Valve", 1);
    summary
}

fn raw_text_lines(document: &ReportDocument) -> Vec<String> {
    document
        .pages
        .iter()
        .skip(1)
        .flat_map(|page| page.ops.iter())
        .filter_map(|op| match op {
            DrawOp::Text {
                style: TextStyle::Monospace,
                content,
                ..
            } => Some(content.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn pagination_tests_small_summary_yields_exactly_two_pages() {
    // H=297, M=20, Lh=5, top offset 35: the fixture audit text fits page 2.
    let document = paginate(
        &fixture_summary(),
        None,
        "2026-02-11 09:30:00 UTC",
        &PageGeometry::a4(),
    )
    .expect("paginate should succeed");
    assert_eq!(document.page_count(), 2);
}

#[test]
fn pagination_tests_page_count_follows_capacity_formula() {
    let geometry = PageGeometry::a4();
    let capacity = geometry.lines_per_raw_page();

    // One audit line per distribution entry plus four structural lines;
    // large enough to span several raw pages.
    let mut summary = Summary::new(400);
    for index in 0..400 {
        summary.set_type_count(format!("Type {index:03}"), 1);
    }

    let audit_text = render_audit_text(&summary).expect("render should succeed");
    let line_count = wrap_audit_text(&audit_text, geometry.max_chars_per_line()).len();
    let expected_raw_pages = line_count.div_ceil(capacity);

    let document =
        paginate(&summary, None, "now", &geometry).expect("paginate should succeed");
    assert_eq!(document.page_count(), 1 + expected_raw_pages);
}

#[test]
fn pagination_tests_no_line_starts_below_bottom_margin() {
    let geometry = PageGeometry::a4();
    let mut summary = Summary::new(500);
    for index in 0..500 {
        summary.set_type_count(format!("Type {index:03}"), 1);
    }

    let document =
        paginate(&summary, None, "now", &geometry).expect("paginate should succeed");
    let limit = geometry.page_height - geometry.bottom_margin;

    for page in document.pages.iter().skip(1) {
        for op in &page.ops {
            if let DrawOp::Text {
                y,
                style: TextStyle::Monospace,
                ..
            } = op
            {
                assert!(*y + geometry.line_height <= limit);
            }
        }
    }
}

#[test]
fn pagination_tests_every_raw_page_repeats_section_header() {
    let geometry = PageGeometry::a4();
    let mut summary = Summary::new(300);
    for index in 0..300 {
        summary.set_type_count(format!("Type {index:03}"), 1);
    }

    let document =
        paginate(&summary, None, "now", &geometry).expect("paginate should succeed");
    assert!(document.page_count() > 2);

    for page in document.pages.iter().skip(1) {
        assert_eq!(page.text_lines().first().copied(), Some(RAW_SECTION_TITLE));
    }
}

#[test]
fn pagination_tests_raw_pages_round_trip_to_original_summary() {
    // The fixture audit lines are narrower than the wrap width, so the drawn
    // lines are the serialized lines themselves.
    let summary = fixture_summary();
    let document = paginate(&summary, None, "now", &PageGeometry::a4())
        .expect("paginate should succeed");

    let recovered = raw_text_lines(&document).join("\n");
    let parsed = parse_audit_text(&recovered).expect("audit text should parse");
    assert_eq!(parsed, summary);
}

#[test]
fn pagination_tests_footer_follows_final_line_without_page_break() {
    let document = paginate(&fixture_summary(), None, "now", &PageGeometry::a4())
        .expect("paginate should succeed");

    let last_page = document.pages.last().expect("document has pages");
    let footer = last_page
        .ops
        .iter()
        .rev()
        .find_map(|op| match op {
            DrawOp::Text { style, content, .. } if *style == TextStyle::Italic => {
                Some(content.as_str())
            }
            _ => None,
        })
        .expect("footer caption expected");
    assert_eq!(footer, FOOTER_CAPTION);
}

#[test]
fn pagination_tests_document_codec_round_trips() {
    let document = paginate(&fixture_summary(), None, "now", &PageGeometry::a4())
        .expect("paginate should succeed");
    let encoded = document.to_json_bytes().expect("encoding should succeed");
    let decoded = ReportDocument::from_json_bytes(&encoded).expect("decoding should succeed");
    assert_eq!(decoded, document);
}

#[test]
fn pagination_tests_file_name_embeds_timestamp() {
    assert_eq!(
        report_file_name(1_700_000_000_000),
        "Chemical_Full_Report_1700000000000.pdf"
    );
}
