//! Editor collaborators: workspace/document state, clipboard, dialog. Narrow seams; the host editor supplies the implementations.

use std::path::PathBuf;
use std::sync::Arc;

/// Identity of an open document. Stable for the document's lifetime;
/// never reused while the document is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

/// A selection in the focused document: byte offsets plus the selected text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Selection {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Snapshot of the focused document, taken once per invocation.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub id: DocumentId,
    /// Backing file, if the document has ever been saved.
    pub path: Option<PathBuf>,
    /// Caret line, 1-based (humans number lines from 1).
    pub line: Option<u32>,
    pub selection: Option<Selection>,
    /// Full document text. Shared, not copied; only read when a
    /// disposition actually needs it.
    pub content: Arc<str>,
}

/// Save state of one open document, for the save gate.
#[derive(Debug, Clone)]
pub struct OpenDocument {
    pub name: String,
    pub dirty: bool,
}

/// One line appended to the shared error list. Lines matching
/// `path:line:` carry an address and are navigable; the host wires the
/// click-to-navigate using that address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub text: String,
    pub address: Option<(PathBuf, u32)>,
    pub from_stderr: bool,
}

impl ErrorEntry {
    /// Unstructured entry (no address).
    #[inline]
    pub fn plain(text: impl Into<String>, from_stderr: bool) -> Self {
        Self {
            text: text.into(),
            address: None,
            from_stderr,
        }
    }

    /// Navigable entry addressing `path` at `line` (1-based).
    #[inline]
    pub fn addressed(
        text: impl Into<String>,
        path: impl Into<PathBuf>,
        line: u32,
        from_stderr: bool,
    ) -> Self {
        Self {
            text: text.into(),
            address: Some((path.into(), line)),
            from_stderr,
        }
    }

    #[inline]
    pub fn is_navigable(&self) -> bool {
        self.address.is_some()
    }
}

/// Workspace/document collaborator. Read methods feed the save gate and
/// context capture; write methods are only called from the output router
/// on the host's UI task.
pub trait EditorWorkspace {
    /// Workspace root directory; the working directory for tools with no
    /// focused file.
    fn root_dir(&self) -> PathBuf;

    /// Snapshot of the focused document, or `None` when nothing is focused.
    fn focused_document(&self) -> Option<DocumentSnapshot>;

    /// Identity of the focused document, for the router's focus re-check.
    fn focused_document_id(&self) -> Option<DocumentId> {
        self.focused_document().map(|d| d.id)
    }

    /// All open documents in the active workspace with their save state.
    fn open_documents(&self) -> Vec<OpenDocument>;

    /// Open a new, unsaved document pre-filled with `content`.
    fn open_new_document(&mut self, content: &str);

    /// Insert `text` at the caret of the focused document.
    fn insert_at_caret(&mut self, text: &str);

    /// Replace the focused document's selection with `text`, or the whole
    /// document when there is no selection.
    fn replace_selection_or_all(&mut self, text: &str);
}

/// System clipboard collaborator. Writes are whole-value replacement.
pub trait Clipboard {
    fn get_text(&self) -> String;
    fn set_text(&mut self, text: String);
}

/// Dialog collaborator: read-only modal text and the shared error list.
pub trait Dialog {
    fn show_text(&mut self, title: &str, body: &str);
    fn append_errors(&mut self, entries: Vec<ErrorEntry>);
}

/// The collaborators one routing call may touch, bundled so routing is a
/// single call on the UI task.
pub struct EditorServices<'a> {
    pub workspace: &'a mut dyn EditorWorkspace,
    pub clipboard: &'a mut dyn Clipboard,
    pub dialog: &'a mut dyn Dialog,
}
