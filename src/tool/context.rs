//! Invocation context: per-invocation snapshot of the editor state a tool run needs.

use std::path::PathBuf;
use std::sync::Arc;

use crate::editor::{DocumentId, EditorWorkspace, Selection};
use crate::tool::descriptor::InputDisposition;

/// Immutable snapshot captured once per invocation from the focused
/// document and workspace. Every downstream component receives it as an
/// explicit argument; nothing reads ambient focus state after capture.
#[derive(Debug, Clone)]
pub struct InvocationCtx {
    /// Working directory for the child process: the focused file's
    /// directory when there is one, otherwise the workspace root.
    pub cwd: PathBuf,
    pub workspace_root: PathBuf,
    /// Originating document, for the router's focus re-check.
    pub document: Option<DocumentId>,
    pub file: Option<PathBuf>,
    /// Caret line, 1-based.
    pub line: Option<u32>,
    pub selection: Option<Selection>,
    /// Full document text, shared with the editor buffer snapshot.
    pub content: Option<Arc<str>>,
}

impl InvocationCtx {
    /// Capture a fresh snapshot. Discard after the invocation completes.
    pub fn capture(workspace: &dyn EditorWorkspace) -> Self {
        let root = workspace.root_dir();
        match workspace.focused_document() {
            Some(doc) => {
                let cwd = doc
                    .path
                    .as_deref()
                    .and_then(|p| p.parent())
                    .map(PathBuf::from)
                    .unwrap_or_else(|| root.clone());
                Self {
                    cwd,
                    workspace_root: root,
                    document: Some(doc.id),
                    file: doc.path,
                    line: doc.line,
                    selection: doc.selection,
                    content: Some(doc.content),
                }
            }
            None => Self {
                cwd: root.clone(),
                workspace_root: root,
                document: None,
                file: None,
                line: None,
                selection: None,
                content: None,
            },
        }
    }

    /// Bytes fed to the child's standard input for `input`, or `None`
    /// when stdin should be closed immediately.
    pub fn stdin_payload(&self, input: InputDisposition) -> Option<Vec<u8>> {
        match input {
            InputDisposition::NoInput => None,
            InputDisposition::SelectionOrDocument => match &self.selection {
                Some(sel) if !sel.is_empty() => Some(sel.text.clone().into_bytes()),
                _ => self.document_bytes(),
            },
            InputDisposition::Document => self.document_bytes(),
        }
    }

    fn document_bytes(&self) -> Option<Vec<u8>> {
        self.content.as_ref().map(|c| c.as_bytes().to_vec())
    }
}
