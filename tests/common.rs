use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use edtool::editor::{
    Clipboard, Dialog, DocumentId, DocumentSnapshot, EditorServices, EditorWorkspace, ErrorEntry,
    OpenDocument, Selection,
};

/// Scratch directory that doubles as the workspace root.
pub struct TestWorkspace {
    // Keep TempDir alive so dir isn't deleted until struct drop
    _tmp: TempDir,
    pub root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let root = tmp.path().to_path_buf();
        Self { _tmp: tmp, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

/// Fake workspace/document collaborator recording every mutation.
pub struct FakeWorkspace {
    pub root: PathBuf,
    pub focused: Option<DocumentSnapshot>,
    pub open: Vec<OpenDocument>,
    pub new_documents: Vec<String>,
    pub inserted: Vec<String>,
    pub replaced: Vec<String>,
}

impl FakeWorkspace {
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            focused: None,
            open: Vec::new(),
            new_documents: Vec::new(),
            inserted: Vec::new(),
            replaced: Vec::new(),
        }
    }

    /// One focused, file-backed, saved document.
    pub fn with_file(root: impl Into<PathBuf>, path: &str, content: &str) -> Self {
        let mut ws = Self::empty(root);
        ws.focused = Some(DocumentSnapshot {
            id: DocumentId(1),
            path: Some(PathBuf::from(path)),
            line: Some(1),
            selection: None,
            content: Arc::from(content),
        });
        ws.open = vec![OpenDocument {
            name: path.to_string(),
            dirty: false,
        }];
        ws
    }

    pub fn select(&mut self, start: usize, end: usize, text: &str) {
        if let Some(doc) = &mut self.focused {
            doc.selection = Some(Selection {
                start,
                end,
                text: text.to_string(),
            });
        }
    }

    pub fn mark_dirty(&mut self) {
        if let Some(doc) = self.open.first_mut() {
            doc.dirty = true;
        }
    }

    /// Simulate the user switching documents mid-run.
    pub fn switch_focus(&mut self, id: u64) {
        if let Some(doc) = &mut self.focused {
            doc.id = DocumentId(id);
        }
    }
}

impl EditorWorkspace for FakeWorkspace {
    fn root_dir(&self) -> PathBuf {
        self.root.clone()
    }

    fn focused_document(&self) -> Option<DocumentSnapshot> {
        self.focused.clone()
    }

    fn open_documents(&self) -> Vec<OpenDocument> {
        self.open.clone()
    }

    fn open_new_document(&mut self, content: &str) {
        self.new_documents.push(content.to_string());
    }

    fn insert_at_caret(&mut self, text: &str) {
        self.inserted.push(text.to_string());
    }

    fn replace_selection_or_all(&mut self, text: &str) {
        self.replaced.push(text.to_string());
    }
}

#[derive(Default)]
pub struct FakeClipboard {
    pub text: String,
    pub writes: usize,
}

impl Clipboard for FakeClipboard {
    fn get_text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
        self.writes += 1;
    }
}

#[derive(Default)]
pub struct FakeDialog {
    pub shown: Vec<(String, String)>,
    pub errors: Vec<ErrorEntry>,
}

impl Dialog for FakeDialog {
    fn show_text(&mut self, title: &str, body: &str) {
        self.shown.push((title.to_string(), body.to_string()));
    }

    fn append_errors(&mut self, entries: Vec<ErrorEntry>) {
        self.errors.extend(entries);
    }
}

/// Borrow the three fakes as one `EditorServices` bundle.
pub fn services<'a>(
    workspace: &'a mut FakeWorkspace,
    clipboard: &'a mut FakeClipboard,
    dialog: &'a mut FakeDialog,
) -> EditorServices<'a> {
    EditorServices {
        workspace,
        clipboard,
        dialog,
    }
}
