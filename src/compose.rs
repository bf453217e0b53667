//! # Page Compositor
//!
//! Stamps overlay pages onto the first page of a template PDF.
//!
//! Each stamp is imported as a Form XObject and drawn after the template's
//! own content, which is wrapped in `q … Q` first so any graphics state it
//! leaves behind can't leak into the overlay. The output always has exactly
//! one page.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::ComposeError;

/// How far up the Pages tree to look for inherited attributes.
const MAX_INHERIT_DEPTH: usize = 16;

/// Merge `overlay` (and then `grid`, if given) onto the template's first page.
pub fn compose(template: &[u8], overlay: &[u8], grid: Option<&[u8]>) -> Result<Vec<u8>, ComposeError> {
    let mut doc = Document::load_mem(template)
        .map_err(|e| ComposeError::TemplateInvalid(format!("failed to parse template: {e}")))?;

    let page_id = doc
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| ComposeError::TemplateInvalid("template has no pages".to_string()))?;

    keep_single_page(&mut doc, page_id)?;
    isolate_page_content(&mut doc, page_id)?;

    stamp(&mut doc, page_id, overlay, "Ov0")?;
    if let Some(grid) = grid {
        stamp(&mut doc, page_id, grid, "Ov1")?;
    }

    doc.prune_objects();
    doc.compress();

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| ComposeError::RenderError(format!("failed to save composed PDF: {e}")))?;
    Ok(output)
}

/// Import the single page of `stamp_pdf` as a Form XObject named `name` and
/// draw it on top of the page.
fn stamp(doc: &mut Document, page_id: ObjectId, stamp_pdf: &[u8], name: &str) -> Result<(), ComposeError> {
    let mut src = Document::load_mem(stamp_pdf)
        .map_err(|e| ComposeError::RenderError(format!("failed to parse overlay page: {e}")))?;
    src.renumber_objects_with(doc.max_id + 1);

    let src_page_id = src
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| ComposeError::RenderError("overlay has no pages".to_string()))?;

    let content = src
        .get_page_content(src_page_id)
        .map_err(|e| ComposeError::RenderError(format!("failed to read overlay content: {e}")))?;
    let src_page = src
        .get_object(src_page_id)
        .map_err(|e| ComposeError::RenderError(format!("failed to read overlay page: {e}")))?;
    let media_box = inherited(&src, src_page, b"MediaBox", MAX_INHERIT_DEPTH)
        .unwrap_or_else(|| Object::Array([0, 0, 595, 842].into_iter().map(Object::Integer).collect()));
    let resources = inherited(&src, src_page, b"Resources", MAX_INHERIT_DEPTH)
        .unwrap_or_else(|| Object::Dictionary(Dictionary::new()));

    // Bring over everything the overlay page references. Page-tree plumbing
    // and the old content streams are replaced by the form below.
    let mut skip: Vec<ObjectId> = content_ids(&src, src_page_id);
    skip.push(src_page_id);
    for (id, object) in std::mem::take(&mut src.objects) {
        if skip.contains(&id) || matches!(object.type_name(), Ok("Catalog") | Ok("Pages") | Ok("Page")) {
            continue;
        }
        doc.objects.insert(id, object);
    }
    doc.max_id = doc.max_id.max(src.max_id);

    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => media_box,
            "Resources" => resources,
        },
        content,
    );
    let form_id = doc.add_object(form);

    add_xobject_resource(doc, page_id, name, form_id)?;
    let draw = format!("q\n/{} Do\nQ\n", name);
    append_content(doc, page_id, draw.into_bytes())
}

/// Wrap the page's existing content streams in `q … Q`.
fn isolate_page_content(doc: &mut Document, page_id: ObjectId) -> Result<(), ComposeError> {
    let existing = content_ids(doc, page_id);
    let open = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let close = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

    let mut contents: Vec<Object> = Vec::with_capacity(existing.len() + 2);
    contents.push(open.into());
    contents.extend(existing.into_iter().map(Object::Reference));
    contents.push(close.into());

    page_dict_mut(doc, page_id)?.set("Contents", contents);
    Ok(())
}

fn append_content(doc: &mut Document, page_id: ObjectId, bytes: Vec<u8>) -> Result<(), ComposeError> {
    let mut contents: Vec<Object> = content_ids(doc, page_id)
        .into_iter()
        .map(Object::Reference)
        .collect();
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), bytes));
    contents.push(stream_id.into());
    page_dict_mut(doc, page_id)?.set("Contents", contents);
    Ok(())
}

/// Give the page its own Resources dictionary (resolving references and
/// inheritance) and register `name` under /XObject.
fn add_xobject_resource(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    xobject_id: ObjectId,
) -> Result<(), ComposeError> {
    let page = doc
        .get_object(page_id)
        .map_err(|e| ComposeError::TemplateInvalid(format!("failed to read template page: {e}")))?;
    let mut resources = match inherited(doc, page, b"Resources", MAX_INHERIT_DEPTH) {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };

    let mut xobjects = match resources.get(b"XObject") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .and_then(Object::as_dict)
            .cloned()
            .unwrap_or_default(),
        _ => Dictionary::new(),
    };
    xobjects.set(name.as_bytes().to_vec(), Object::Reference(xobject_id));
    resources.set("XObject", xobjects);

    page_dict_mut(doc, page_id)?.set("Resources", resources);
    Ok(())
}

/// Look up a page attribute, following the Parent chain for inheritable
/// keys and resolving a top-level indirect reference.
fn inherited(doc: &Document, node: &Object, key: &[u8], depth: usize) -> Option<Object> {
    if depth == 0 {
        return None;
    }
    let dict = node.as_dict().ok()?;
    if let Ok(value) = dict.get(key) {
        return match value {
            Object::Reference(id) => doc.get_object(*id).ok().cloned(),
            other => Some(other.clone()),
        };
    }
    let parent_id = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    let parent = doc.get_object(parent_id).ok()?;
    inherited(doc, parent, key, depth - 1)
}

/// Object IDs of a page's content streams, in drawing order.
fn content_ids(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let Ok(page) = doc.get_object(page_id).and_then(Object::as_dict) else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            // An indirect array of streams.
            Ok(Object::Array(items)) => items.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => vec![*id],
        },
        Ok(Object::Array(items)) => items.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => Vec::new(),
    }
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, ComposeError> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| ComposeError::TemplateInvalid(format!("template page is not a dictionary: {e}")))
}

/// Restructure a document so its Pages tree holds only `target_page_id`.
fn keep_single_page(doc: &mut Document, target_page_id: ObjectId) -> Result<(), ComposeError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|e| ComposeError::TemplateInvalid(format!("no Root in trailer: {e}")))?;

    let pages_id = doc
        .get_object(catalog_id)
        .and_then(Object::as_dict)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| ComposeError::TemplateInvalid(format!("catalog has no Pages reference: {e}")))?;

    // Pin inherited attributes on the page before cutting it loose from
    // intermediate page-tree nodes.
    let keys: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];
    let pinned: Vec<(&[u8], Object)> = {
        let doc_ref: &Document = doc;
        let page = doc_ref
            .get_object(target_page_id)
            .map_err(|e| ComposeError::TemplateInvalid(format!("failed to read template page: {e}")))?;
        keys.into_iter()
            .filter_map(|key| inherited(doc_ref, page, key, MAX_INHERIT_DEPTH).map(|v| (key, v)))
            .collect()
    };

    let page_dict = page_dict_mut(doc, target_page_id)?;
    for (key, value) in pinned {
        page_dict.set(key.to_vec(), value);
    }
    page_dict.set("Parent", Object::Reference(pages_id));

    let pages = doc
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| ComposeError::TemplateInvalid(format!("Pages node is not a dictionary: {e}")))?;
    pages.set("Kids", vec![Object::Reference(target_page_id)]);
    pages.set("Count", 1_i64);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};

    /// A template with `pages` pages, each drawing a filled rectangle.
    fn template(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for i in 0..pages {
            let content = Content {
                operations: vec![
                    Operation::new(
                        "re",
                        vec![
                            Object::Integer(10),
                            Object::Integer(10 + i as i64),
                            Object::Integer(50),
                            Object::Integer(50),
                        ],
                    ),
                    Operation::new("f", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
                "Resources" => dictionary! {},
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn overlay() -> Vec<u8> {
        let mut canvas = crate::pdf::Canvas::new(crate::model::PageGeometry::a4(
            crate::model::Orientation::Portrait,
        ));
        canvas.text("Stamp", 100.0, 100.0, &crate::font::FontKey::helvetica(), 12.0);
        crate::pdf::PdfWriter::new()
            .write(&canvas, &crate::font::FontContext::new())
            .unwrap()
    }

    fn first_page(bytes: &[u8]) -> (Document, ObjectId) {
        let doc = Document::load_mem(bytes).unwrap();
        let id = *doc.get_pages().values().next().unwrap();
        (doc, id)
    }

    #[test]
    fn test_garbage_template_is_invalid() {
        let err = compose(b"definitely not a pdf", &overlay(), None).unwrap_err();
        assert_eq!(err.kind(), "template_invalid");
    }

    #[test]
    fn test_zero_page_template_is_invalid() {
        let err = compose(&template(0), &overlay(), None).unwrap_err();
        assert_eq!(err.kind(), "template_invalid");
    }

    #[test]
    fn test_output_has_single_page() {
        let out = compose(&template(3), &overlay(), None).unwrap();
        let (doc, _) = first_page(&out);
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_overlay_drawn_after_isolated_template() {
        let out = compose(&template(1), &overlay(), None).unwrap();
        let (doc, page_id) = first_page(&out);
        let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();

        let template_at = content.find("re").unwrap();
        let stamp_at = content.find("/Ov0 Do").unwrap();
        assert!(content.trim_start().starts_with('q'));
        assert!(template_at < stamp_at);
        assert!(!content.contains("/Ov1"));
    }

    #[test]
    fn test_overlay_form_keeps_its_resources() {
        let out = compose(&template(1), &overlay(), None).unwrap();
        let (doc, page_id) = first_page(&out);
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let form_id = xobjects.get(b"Ov0").unwrap().as_reference().unwrap();
        let form = doc.get_object(form_id).unwrap().as_stream().unwrap();

        assert_eq!(form.dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Form");
        let form_resources = form.dict.get(b"Resources").unwrap().as_dict().unwrap();
        assert!(form_resources.get(b"Font").is_ok());
        // Inherited MediaBox was pinned onto the page.
        assert!(page.get(b"MediaBox").is_ok());
    }

    #[test]
    fn test_grid_stamped_last() {
        let out = compose(&template(1), &overlay(), Some(&overlay())).unwrap();
        let (doc, page_id) = first_page(&out);
        let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();
        let ov0 = content.find("/Ov0 Do").unwrap();
        let ov1 = content.find("/Ov1 Do").unwrap();
        assert!(ov0 < ov1);
    }
}
