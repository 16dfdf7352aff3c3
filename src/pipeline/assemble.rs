//! Document assembly: merge per-label PDFs into one combined PDF.
//!
//! Each payload is parsed, its objects are renumbered above everything
//! already in the combined document, and its pages are re-parented under a
//! single new page tree in payload order. Attributes a page inherited from
//! its old page tree (`MediaBox`, `Resources`, …) are copied onto the page
//! itself first, because the old tree nodes are dropped.
//!
//! Under [`AssemblyPolicy::Strict`] the first payload that is not a PDF (the
//! text placeholder left by a failed render) aborts the whole merge.

use crate::config::AssemblyPolicy;
use crate::error::ZplError;
use crate::output::ConversionResult;
use lopdf::{dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

/// Page attributes that may live on an ancestor `Pages` node.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against malformed page trees whose `Parent` links loop.
const MAX_TREE_DEPTH: usize = 64;

/// The serialised merge result.
#[derive(Debug, Clone)]
pub struct CombinedDocument {
    pub bytes: Vec<u8>,
    pub pages: usize,
    /// Payloads left out under [`AssemblyPolicy::SkipInvalid`].
    pub skipped: usize,
}

/// Merge the pages of every result, in order, into one PDF.
pub fn combine_pdfs(
    results: &[ConversionResult],
    policy: AssemblyPolicy,
) -> Result<CombinedDocument, ZplError> {
    let mut combined = Document::with_version("1.5");
    let pages_id = combined.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    let mut skipped = 0;

    for (index, result) in results.iter().enumerate() {
        let merged = Document::load_mem(&result.payload)
            .map_err(|e| e.to_string())
            .and_then(|source| append_document(&mut combined, source, pages_id));

        match merged {
            Ok(page_ids) => {
                debug!("Merged '{}': {} pages", result.output_name, page_ids.len());
                kids.extend(page_ids.into_iter().map(Object::Reference));
            }
            Err(detail) if policy == AssemblyPolicy::SkipInvalid => {
                warn!("Skipping '{}': {}", result.output_name, detail);
                skipped += 1;
            }
            Err(detail) => {
                return Err(ZplError::AssemblyFailed {
                    index,
                    output_name: result.output_name.clone(),
                    detail,
                });
            }
        }
    }

    let pages = kids.len();
    combined.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages as i64),
        }),
    );
    let catalog_id = combined.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    combined.trailer.set("Root", catalog_id);
    combined.prune_objects();
    combined.compress();

    let mut bytes = Vec::new();
    combined
        .save_to(&mut bytes)
        .map_err(|e| ZplError::PackagingFailed(format!("PDF serialisation: {e}")))?;

    Ok(CombinedDocument {
        bytes,
        pages,
        skipped,
    })
}

/// Move every object of `source` into `target`; return its pages in order.
fn append_document(
    target: &mut Document,
    mut source: Document,
    parent: ObjectId,
) -> Result<Vec<ObjectId>, String> {
    source.renumber_objects_with(target.max_id + 1);
    let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();

    for &page_id in &page_ids {
        let inherited = inherited_attributes(&source, page_id);
        let page = source
            .get_dictionary_mut(page_id)
            .map_err(|e| format!("page {page_id:?}: {e}"))?;
        for (key, value) in inherited {
            page.set(key, value);
        }
        page.set("Parent", parent);
    }

    let max_id = source.objects.keys().map(|(id, _)| *id).max().unwrap_or(0);
    for (id, object) in source.objects {
        if !is_page_tree_node(&object) {
            target.objects.insert(id, object);
        }
    }
    target.max_id = target.max_id.max(max_id);

    Ok(page_ids)
}

/// Inheritable attributes the page lacks but one of its ancestors defines.
///
/// The nearest ancestor wins.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let mut found: Vec<(&'static [u8], Object)> = Vec::new();
    let Ok(page) = doc.get_dictionary(page_id) else {
        return found;
    };

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(node_id) = parent {
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        for key in INHERITABLE {
            if page.has(key) || found.iter().any(|(k, _)| *k == key) {
                continue;
            }
            if let Ok(value) = node.get(key) {
                found.push((key, value.clone()));
            }
        }

        depth += 1;
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    found
}

fn is_page_tree_node(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|d| d.get(b"Type"))
        .and_then(Object::as_name)
        .map(|name| name == b"Catalog" || name == b"Pages")
        .unwrap_or(false)
}
