//! End-to-end test of the emit → reconcile chain, with the extraction
//! stage simulated by writing placeholder PNG files (keeps the test free of
//! a pdfium binding).

use pdfmd::pipeline::{cleanup, emit};
use pdfmd::{elements_from_json, reconcile, ImagePathMap};
use std::fs;
use tempfile::TempDir;

#[test]
fn emitted_document_reconciles_cleanly() {
    let root = TempDir::new().unwrap();
    let doc_id = "42";

    // Simulated extraction output: two images on page 1, one on page 3.
    let image_dir = root.path().join(doc_id);
    fs::create_dir_all(&image_dir).unwrap();
    let mut image_map = ImagePathMap::new();
    for (page, count) in [(1usize, 2usize), (2, 0), (3, 1)] {
        let mut paths = Vec::new();
        for index in 1..=count {
            let path = image_dir.join(format!("page{page}_img{index}.png"));
            fs::write(&path, b"png-bytes").unwrap();
            paths.push(path);
        }
        image_map.insert(page, paths);
    }
    // An orphan the collaborator never classified as an Image element.
    fs::write(image_dir.join("page9_img1.png"), b"png-bytes").unwrap();

    // Collaborator elements: title, text, an Image element per page with
    // images, and one surplus Image element.
    let elements = elements_from_json(
        r#"[
        {"type": "Title", "text": "Study", "metadata": {"page_number": 1}},
        {"type": "Image", "text": "", "metadata": {"page_number": 1}},
        {"type": "NarrativeText", "text": "Body text.", "metadata": {"page_number": 2}},
        {"type": "Image", "text": "", "metadata": {"page_number": 3}},
        {"type": "Image", "text": "", "metadata": {"page_number": 3}}
    ]"#,
    )
    .unwrap();

    let emitted = emit::render_elements(&elements, &image_map, doc_id);
    let markdown = cleanup::clean_markdown(&emitted.to_markdown());

    // Never more references than extracted paths, each path at most once.
    assert_eq!(emitted.images_referenced, 3);
    assert_eq!(markdown.matches("![Image](").count(), 3);
    for name in ["page1_img1.png", "page1_img2.png", "page3_img1.png"] {
        assert_eq!(markdown.matches(name).count(), 1, "{name} duplicated");
    }

    let md_path = root.path().join(format!("{doc_id}.md"));
    fs::write(&md_path, &markdown).unwrap();

    let report = reconcile(&md_path, &image_dir, doc_id, "study").unwrap();

    assert!(report.is_clean());
    assert_eq!(report.references_found, 3);
    assert_eq!(report.renamed.len(), 3);
    assert_eq!(report.pruned, vec!["page9_img1.png".to_string()]);

    let final_md = fs::read_to_string(&md_path).unwrap();
    assert_eq!(final_md.matches("![Image](./42/study_page").count(), 3);
    assert!(!final_md.contains("(./42/page"), "no unprefixed references remain");

    let files: Vec<String> = fs::read_dir(&image_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files.len(), 3);
    assert!(files.iter().all(|f| f.starts_with("study_")));
}
