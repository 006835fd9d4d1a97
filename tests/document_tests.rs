mod common;

use common::{GeneratedPdf, TestResult, init_logging, recording, recording_document};
use folio::{
    Color, Document, DocumentConfig, Element, FolioError, PageOptions, Padding, TextAlign, TextStyle,
};

#[test]
fn export_writes_one_pdf_page_per_document_page() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("Pages.pdf");

    let mut doc = Document::builder().with_size(400.0, 300.0).build()?;
    for i in 0..3 {
        let page = doc.new_page();
        page.add_element(Element::text(format!("Page {}", i + 1), TextStyle::default()).at(40.0, 40.0));
    }
    doc.new_page_with(PageOptions::default().with_size(200.0, 100.0))?;
    doc.export(&path, false, true)?;

    let pdf = GeneratedPdf::load(&path)?;
    assert!(pdf.bytes.starts_with(b"%PDF"));
    assert_eq!(pdf.page_count(), 4);
    assert_eq!(
        pdf.page_sizes(),
        vec![(400.0, 300.0), (400.0, 300.0), (400.0, 300.0), (200.0, 100.0)]
    );
    assert_eq!(pdf.page_texts()[1], vec!["Page 2".to_string()]);
    assert!(pdf.page_texts()[3].is_empty());
    Ok(())
}

#[test]
fn default_template_numbers_every_page() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let mut doc = Document::builder()
        .with_default_template(Some("default".into()))
        .with_export_dir(dir.path())
        .build()?;
    doc.new_page();
    doc.new_page();
    let path = doc.export_default("Numbered.pdf")?;
    assert_eq!(path, dir.path().join("Numbered.pdf"));

    let pdf = GeneratedPdf::load(&path)?;
    assert_eq!(pdf.page_texts(), vec![vec!["1".to_string()], vec!["2".to_string()]]);
    Ok(())
}

#[test]
fn document_from_json_config() -> TestResult {
    let config = DocumentConfig::from_json(
        r#"{
            "width": 300, "height": 200,
            "padding": [20, 10],
            "backend": "recording",
            "template": "cover",
            "theme": { "palette": "back_to_the_city", "mood": "dark" }
        }"#,
    )?;
    let mut doc = Document::from_config(config)?;
    doc.new_page_with(PageOptions::default().with_name("Cover"))?;
    assert_eq!(doc.page(1)?.pw(), 280.0);
    assert_eq!(doc.page(1)?.padding(), Padding::new(20.0, 10.0, 20.0, 10.0));

    doc.compose()?;
    doc.build()?;
    let ctx = recording(&doc);
    assert_eq!(ctx.texts(), vec!["Cover"]);
    assert_eq!(ctx.rects()[0].width, 300.0);
    assert_eq!(doc.theme().name(), "Back to the City");
    Ok(())
}

#[test]
fn unknown_template_is_rejected() {
    let err = Document::builder()
        .with_default_template(Some("missing".into()))
        .build()
        .unwrap_err();
    assert!(matches!(err, FolioError::UnknownTemplate(_)));

    let mut doc = recording_document();
    let err = doc
        .new_page_with(PageOptions::default().with_template("missing"))
        .unwrap_err();
    assert!(matches!(err, FolioError::UnknownTemplate(_)));
    assert_eq!(doc.page_count(), 0);
}

#[test]
fn nested_elements_draw_relative_to_their_parent() -> TestResult {
    let mut doc = recording_document();
    let page = doc.new_page();
    let group = page.add_element(Element::group(100.0, 200.0));
    page.add_child(group, Element::rect(10.0, 20.0, 30.0, 40.0).with_fill(Color::black()))?;
    doc.compose()?;
    doc.build()?;

    let rects = recording(&doc).rects();
    assert_eq!(rects.len(), 1);
    assert_eq!((rects[0].x, rects[0].y), (110.0, 220.0));
    assert_eq!((rects[0].width, rects[0].height), (30.0, 40.0));
    Ok(())
}

#[test]
fn text_boxes_wrap_inside_their_width() -> TestResult {
    let mut doc = recording_document();
    let style = TextStyle::new("Courier", 10.0).with_align(TextAlign::Left);
    doc.new_page().add_element(
        Element::text_box("aaaa bbbb cccc", style, 50.0, 100.0).at(50.0, 50.0),
    );
    doc.compose()?;
    doc.build()?;
    assert_eq!(recording(&doc).texts(), vec!["aaaa", "bbbb", "cccc"]);
    Ok(())
}

#[test]
fn export_only_redraws_when_needed() -> TestResult {
    let mut doc = recording_document();
    doc.new_page();
    doc.export("first.pdf", false, true)?;
    doc.export("second.pdf", false, true)?;
    assert_eq!(recording(&doc).new_drawing_calls(), 1);
    assert_eq!(recording(&doc).save_calls(), 2);

    doc.export("third.pdf", true, true)?;
    assert_eq!(recording(&doc).new_drawing_calls(), 2);
    assert_eq!(recording(&doc).page_count(), 1);
    Ok(())
}
