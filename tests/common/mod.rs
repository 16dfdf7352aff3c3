//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use lopdf::{dictionary, Document, Object};
use std::io::{Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};
use zpl2pdf::{LabelError, LabelRenderer};

/// A PDF with one page per width; pages are told apart by MediaBox width.
pub fn pdf_with_widths(widths: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = widths
        .iter()
        .map(|w| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(*w),
                    Object::Integer(600),
                ],
            })
            .into()
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(widths.len() as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("fixture PDF");
    out
}

/// MediaBox widths of every page, in page order.
pub fn page_widths(pdf: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(pdf).expect("combined PDF parses");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_dictionary(id).expect("page dictionary");
            page.get(b"MediaBox")
                .and_then(Object::as_array)
                .expect("MediaBox")[2]
                .as_i64()
                .expect("integer width")
        })
        .collect()
}

/// A ZIP holding the given files, in the given order.
pub fn zip_of(files: &[(&str, &str)]) -> Vec<u8> {
    let mut w = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default();
    for (name, body) in files {
        w.start_file(*name, opts).expect("zip entry");
        w.write_all(body.as_bytes()).expect("zip write");
    }
    w.finish().expect("zip finish").into_inner()
}

/// Name and content of the single entry of a produced archive.
pub fn unzip_single(archive: &[u8]) -> (String, Vec<u8>) {
    let mut zip = ZipArchive::new(Cursor::new(archive)).expect("output is a zip");
    assert_eq!(zip.len(), 1, "output archive must hold one entry");
    let mut file = zip.by_index(0).expect("entry");
    let name = file.name().to_string();
    let mut data = Vec::new();
    file.read_to_end(&mut data).expect("entry data");
    (name, data)
}

/// Renders `~DGR:<n>` labels as a one-page PDF of width `n`.
///
/// Labels containing `FAIL` are rejected the way the rendering service
/// rejects malformed ZPL.
#[derive(Default)]
pub struct StubRenderer {
    pub calls: AtomicUsize,
}

impl StubRenderer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LabelRenderer for StubRenderer {
    async fn render(&self, zpl: &str) -> Result<Vec<u8>, LabelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if zpl.contains("FAIL") {
            return Err(LabelError::HttpStatus {
                status: 400,
                body: "ERROR: Invalid ZPL".into(),
            });
        }
        Ok(pdf_with_widths(&[label_width(zpl)]))
    }
}

/// The number after `~DGR:`, used as the page width.
pub fn label_width(zpl: &str) -> i64 {
    zpl.split("~DGR:")
        .nth(1)
        .map(|rest| rest.chars().take_while(|c| c.is_ascii_digit()).collect::<String>())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(1)
}
