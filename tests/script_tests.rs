mod common;

use common::{GeneratedPdf, TestResult, recording, recording_document};
use folio::script::{CODE_KEY, ERROR_KEY, ErrorKind};
use folio::{CodeBlock, Document, Element, ElementKind, FolioError, RunState, Value};

#[test]
fn code_blocks_share_bindings_across_pages() -> TestResult {
    let mut doc = recording_document();
    doc.new_page()
        .add_element(Element::code_block(CodeBlock::new("total = 2\nfirst = page.pn")));
    doc.new_page()
        .add_element(Element::code_block(CodeBlock::new("total = total * 21\nsecond = page.pn")));
    doc.compose()?;

    let globals = doc.globals();
    assert_eq!(globals.get_int("total"), Some(42));
    assert_eq!(globals.get_int("first"), Some(1));
    assert_eq!(globals.get_int("second"), Some(2));
    assert!(globals.contains(CODE_KEY));
    assert_eq!(globals.get(ERROR_KEY), Some(&Value::None));
    Ok(())
}

#[test]
fn scripts_build_pages_and_elements() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Scripted.pdf");
    let mut doc = Document::builder().with_size(300.0, 300.0).build()?;
    doc.new_page().add_element(Element::code_block(CodeBlock::strict(
        "p = doc.new_page(200, 100, name='Extra')\n\
         box = Element(10, 10)\n\
         box.add_element(Text('from a script', 0, 0))\n\
         p.add_element(box)\n\
         page.add_element(Rect(0, 0, 20, 20, fill='navy'))",
    )));
    doc.export(&path, false, true)?;
    assert_eq!(doc.page_count(), 2);

    let pdf = GeneratedPdf::load(&path)?;
    assert_eq!(pdf.page_count(), 2);
    assert_eq!(pdf.page_sizes()[1], (200.0, 100.0));
    assert_eq!(pdf.page_texts()[1], vec!["from a script".to_string()]);
    Ok(())
}

#[test]
fn recomposing_regenerates_script_output() -> TestResult {
    let mut doc = recording_document();
    doc.new_page().add_element(Element::code_block(CodeBlock::new(
        "page.add_element(Text('once'))\ndoc.new_page()",
    )));
    doc.export("a.pdf", true, true)?;
    doc.export("b.pdf", true, true)?;
    assert_eq!(doc.page_count(), 2);
    assert_eq!(recording(&doc).texts(), vec!["once"]);
    assert_eq!(doc.page(1)?.tree().roots().len(), 2);
    Ok(())
}

#[test]
fn guarded_blocks_record_failures_and_continue() -> TestResult {
    let mut doc = recording_document();
    let page = doc.new_page();
    let broken = page.add_element(Element::code_block(CodeBlock::new("x = undefined_name")));
    page.add_element(Element::code_block(CodeBlock::new("after = 1")));
    doc.compose()?;

    assert_eq!(doc.globals().get_int("after"), Some(1));
    assert_eq!(doc.globals().get(ERROR_KEY), Some(&Value::None));
    let node = doc.page(1)?.element(broken).ok_or("missing block")?;
    match &node.kind {
        ElementKind::CodeBlock(block) => {
            assert_eq!(block.state(), RunState::Failed(ErrorKind::UnresolvedName));
            let bindings = block.last_bindings().ok_or("block kept no bindings")?;
            assert_eq!(bindings.get_str(ERROR_KEY), Some("NameError"));
        }
        other => panic!("expected a code block, got {}", other.type_name()),
    }
    Ok(())
}

#[test]
fn strict_blocks_abort_export() {
    let mut doc = recording_document();
    doc.new_page()
        .add_element(Element::code_block(CodeBlock::strict("page.w = 'wide'")));
    let err = doc.export("never.pdf", false, true).unwrap_err();
    match err {
        FolioError::Script(e) => assert_eq!(e.kind, ErrorKind::TypeMismatch),
        other => panic!("unexpected error {}", other),
    }
    assert!(!doc.has_composed());
    assert_eq!(recording(&doc).save_calls(), 0);
}

#[test]
fn color_cells_from_scripts_show_their_recipes() -> TestResult {
    let mut doc = recording_document();
    doc.new_page().add_element(Element::code_block(CodeBlock::strict(
        "page.add_element(ColorCell(spot(300), 0, 0, 120, 80, labels=['spot', 'hex']))",
    )));
    doc.compose()?;
    doc.build()?;
    let texts = recording(&doc).texts();
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0], "Spot 300");
    assert!(texts[1].starts_with('('));
    Ok(())
}

#[test]
fn pages_appended_behind_scripted_pages_keep_unique_numbers() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Renumbered.pdf");
    let mut doc = Document::builder()
        .with_default_template(Some("default".into()))
        .build()?;
    doc.new_page()
        .add_element(Element::code_block(CodeBlock::strict("doc.new_page(name='scripted')")));
    doc.compose()?;
    assert_eq!(doc.page_count(), 2);

    doc.new_page().set_name(Some("appended".to_string()));
    doc.export(&path, true, true)?;
    assert_eq!(doc.page_count(), 3);
    for (index, page) in doc.pages().iter().enumerate() {
        assert_eq!(page.pn(), index + 1);
    }
    assert_eq!(doc.page(2)?.name(), Some("appended"));
    assert_eq!(doc.page(3)?.name(), Some("scripted"));

    let pdf = GeneratedPdf::load(&path)?;
    assert_eq!(
        pdf.page_texts(),
        vec![vec!["1".to_string()], vec!["2".to_string()], vec!["3".to_string()]]
    );
    Ok(())
}
