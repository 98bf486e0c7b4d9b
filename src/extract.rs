use crate::config::Limits;
use crate::error::{Result, SplitError};
use crate::text_layout;
use lopdf::{dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One source page, isolated into its own serialized PDF.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// 0-based position in the source.
    pub page_index: u32,
    pub text: String,
    pub pdf_bytes: Vec<u8>,
}

impl ExtractedPage {
    pub fn page_number(&self) -> u32 {
        self.page_index + 1
    }
}

/// Anything that can hand out pages in source order.
pub trait PageSource {
    fn page_count(&self) -> u32;
    fn extract_page(&self, page_index: u32) -> Result<ExtractedPage>;

    /// Lazy, finite, ordered sequence of every page.
    fn pages(&self) -> impl Iterator<Item = Result<ExtractedPage>> + '_
    where
        Self: Sized,
    {
        (0..self.page_count()).map(move |i| self.extract_page(i))
    }
}

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// A parsed PDF held in memory. The file handle is closed as soon as the bytes are read.
pub struct SourceDocument {
    path: PathBuf,
    doc: Document,
    /// (1-based page number, page object id) in source order.
    pages: Vec<(u32, ObjectId)>,
}

impl SourceDocument {
    pub fn open(path: &Path, limits: &Limits) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| {
            SplitError::source_unreadable(path, "stat failed", Some(Box::new(e)))
        })?;
        if !meta.is_file() {
            return Err(SplitError::source_unreadable(path, "not a regular file", None));
        }
        if meta.len() > limits.max_input_file_bytes {
            return Err(SplitError::LimitExceeded {
                path: path.to_path_buf(),
                message: format!(
                    "{} bytes > max_input_file_bytes {}",
                    meta.len(),
                    limits.max_input_file_bytes
                ),
            });
        }

        let bytes = std::fs::read(path).map_err(|e| {
            SplitError::source_unreadable(path, "read failed", Some(Box::new(e)))
        })?;
        Self::from_bytes(path, &bytes, limits)
    }

    /// Parses an in-memory PDF; `path` is only used for error reporting.
    pub fn from_bytes(path: &Path, bytes: &[u8], limits: &Limits) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| {
            SplitError::source_unreadable(path, "failed to parse PDF", Some(Box::new(e)))
        })?;

        let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
        if pages.is_empty() {
            return Err(SplitError::source_unreadable(path, "document has zero pages", None));
        }
        if pages.len() > limits.max_input_pages as usize {
            return Err(SplitError::LimitExceeded {
                path: path.to_path_buf(),
                message: format!(
                    "{} pages > max_input_pages {}",
                    pages.len(),
                    limits.max_input_pages
                ),
            });
        }

        debug!(pages = pages.len(), "opened {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            doc,
            pages,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn page_text(&self, page_number: u32, page_id: ObjectId) -> Result<String> {
        text_layout::page_text(&self.doc, page_id).map_err(|e| {
            SplitError::page(
                &self.path,
                page_number,
                "text extraction failed",
                Some(Box::new(e)),
            )
        })
    }

    fn single_page_bytes(&self, page_number: u32, page_id: ObjectId) -> Result<Vec<u8>> {
        let mut single = self.isolate(page_id).map_err(|e| {
            SplitError::page(
                &self.path,
                page_number,
                "failed to isolate page",
                Some(Box::new(e)),
            )
        })?;

        let mut buf = Vec::new();
        single.save_to(&mut buf).map_err(|e| {
            SplitError::page(
                &self.path,
                page_number,
                "failed to serialize page",
                Some(Box::new(e)),
            )
        })?;
        Ok(buf)
    }

    /// New document holding the page and only the objects reachable from it.
    ///
    /// Inherited attributes are copied onto the page, references into the source page tree
    /// (other pages, `Parent`) become null, and a fresh one-page tree and catalog are added.
    fn isolate(&self, page_id: ObjectId) -> lopdf::Result<Document> {
        let mut page = self.doc.get_dictionary(page_id)?.clone();

        let mut seen = HashSet::new();
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        while let Some(id) = parent {
            if !seen.insert(id) {
                break;
            }
            let node = self.doc.get_dictionary(id)?;
            for key in INHERITABLE {
                if page.has(key) {
                    continue;
                }
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
        page.remove(b"Parent");

        let mut single = Document::with_version(self.doc.version.clone());
        let mut dropped = HashSet::new();
        let mut pending = Vec::new();
        for (_, value) in page.iter() {
            collect_refs(value, &mut pending);
        }
        while let Some(id) = pending.pop() {
            if id == page_id || single.objects.contains_key(&id) || dropped.contains(&id) {
                continue;
            }
            let Ok(object) = self.doc.get_object(id) else {
                continue;
            };
            if is_page_tree_node(object) {
                dropped.insert(id);
                continue;
            }
            collect_refs(object, &mut pending);
            single.objects.insert(id, object.clone());
        }

        for object in single.objects.values_mut() {
            null_refs(object, &dropped);
        }
        for (_, value) in page.iter_mut() {
            null_refs(value, &dropped);
        }

        single.max_id = self.doc.max_id;
        let pages_id = single.new_object_id();
        page.set("Parent", pages_id);
        single.objects.insert(page_id, Object::Dictionary(page));
        single.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1_i64,
            }),
        );
        let catalog_id = single.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        single.trailer.set("Root", catalog_id);
        single.renumber_objects();
        Ok(single)
    }
}

fn is_page_tree_node(object: &Object) -> bool {
    object
        .as_dict()
        .is_ok_and(|d| d.has_type(b"Page") || d.has_type(b"Pages"))
}

fn collect_refs(object: &Object, out: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => items.iter().for_each(|o| collect_refs(o, out)),
        Object::Dictionary(dict) => dict.iter().for_each(|(_, o)| collect_refs(o, out)),
        Object::Stream(stream) => stream.dict.iter().for_each(|(_, o)| collect_refs(o, out)),
        _ => {}
    }
}

fn null_refs(object: &mut Object, dropped: &HashSet<ObjectId>) {
    if let Object::Reference(id) = *object {
        if dropped.contains(&id) {
            *object = Object::Null;
        }
        return;
    }
    match object {
        Object::Array(items) => items.iter_mut().for_each(|o| null_refs(o, dropped)),
        Object::Dictionary(dict) => dict.iter_mut().for_each(|(_, o)| null_refs(o, dropped)),
        Object::Stream(stream) => stream.dict.iter_mut().for_each(|(_, o)| null_refs(o, dropped)),
        _ => {}
    }
}

impl PageSource for SourceDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn extract_page(&self, page_index: u32) -> Result<ExtractedPage> {
        let &(page_number, page_id) = self.pages.get(page_index as usize).ok_or_else(|| {
            SplitError::page(
                &self.path,
                page_index.saturating_add(1),
                "page index out of range",
                None,
            )
        })?;

        Ok(ExtractedPage {
            page_index,
            text: self.page_text(page_number, page_id)?,
            pdf_bytes: self.single_page_bytes(page_number, page_id)?,
        })
    }
}
