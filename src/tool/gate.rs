//! Save gate: preconditions checked before any process is started.

use crate::editor::EditorWorkspace;
use crate::tool::descriptor::ToolDescriptor;

/// Why the gate blocked an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The tool needs a file but the focused document has no backing path.
    NoFile,
    /// At least one open document has unsaved changes.
    UnsavedDocuments,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::NoFile => f.write_str("no file"),
            BlockReason::UnsavedDocuments => f.write_str("unsaved documents present"),
        }
    }
}

/// Gate verdict. Advisory: the gate never starts or cancels a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    Blocked(BlockReason),
}

/// Check `tool`'s preconditions against the active workspace.
pub fn check(tool: &ToolDescriptor, workspace: &dyn EditorWorkspace) -> GateDecision {
    if tool.needs_file {
        let has_file = workspace
            .focused_document()
            .is_some_and(|d| d.path.is_some());
        if !has_file {
            return GateDecision::Blocked(BlockReason::NoFile);
        }
    }
    if tool.check_everything_saved && workspace.open_documents().iter().any(|d| d.dirty) {
        return GateDecision::Blocked(BlockReason::UnsavedDocuments);
    }
    GateDecision::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{DocumentId, DocumentSnapshot, OpenDocument};
    use crate::tool::descriptor::{InputDisposition, OutputDisposition};
    use std::path::PathBuf;
    use std::sync::Arc;

    struct FakeWs {
        focused_path: Option<&'static str>,
        focused: bool,
        dirty: Vec<bool>,
    }

    impl EditorWorkspace for FakeWs {
        fn root_dir(&self) -> PathBuf {
            PathBuf::from("/ws")
        }
        fn focused_document(&self) -> Option<DocumentSnapshot> {
            self.focused.then(|| DocumentSnapshot {
                id: DocumentId(1),
                path: self.focused_path.map(PathBuf::from),
                line: Some(1),
                selection: None,
                content: Arc::from(""),
            })
        }
        fn open_documents(&self) -> Vec<OpenDocument> {
            self.dirty
                .iter()
                .enumerate()
                .map(|(i, d)| OpenDocument {
                    name: format!("doc{}", i),
                    dirty: *d,
                })
                .collect()
        }
        fn open_new_document(&mut self, _content: &str) {}
        fn insert_at_caret(&mut self, _text: &str) {}
        fn replace_selection_or_all(&mut self, _text: &str) {}
    }

    fn tool(needs_file: bool, check_saved: bool) -> ToolDescriptor {
        ToolDescriptor::new(
            "t",
            "true",
            InputDisposition::NoInput,
            OutputDisposition::Discard,
        )
        .needs_file(needs_file)
        .check_everything_saved(check_saved)
    }

    #[test]
    fn needs_file_blocks_without_backing_path() {
        let ws = FakeWs {
            focused_path: None,
            focused: true,
            dirty: vec![],
        };
        assert_eq!(
            check(&tool(true, false), &ws),
            GateDecision::Blocked(BlockReason::NoFile)
        );
    }

    #[test]
    fn needs_file_blocks_without_focused_document() {
        let ws = FakeWs {
            focused_path: None,
            focused: false,
            dirty: vec![],
        };
        assert_eq!(
            check(&tool(true, false), &ws),
            GateDecision::Blocked(BlockReason::NoFile)
        );
    }

    #[test]
    fn needs_file_allows_with_backing_path() {
        let ws = FakeWs {
            focused_path: Some("/tmp/a.txt"),
            focused: true,
            dirty: vec![false, false],
        };
        assert_eq!(check(&tool(true, false), &ws), GateDecision::Allowed);
    }

    #[test]
    fn check_everything_saved_blocks_iff_any_dirty() {
        let dirty = FakeWs {
            focused_path: Some("/tmp/a.txt"),
            focused: true,
            dirty: vec![false, true, false],
        };
        assert_eq!(
            check(&tool(false, true), &dirty),
            GateDecision::Blocked(BlockReason::UnsavedDocuments)
        );

        let clean = FakeWs {
            focused_path: Some("/tmp/a.txt"),
            focused: true,
            dirty: vec![false, false],
        };
        assert_eq!(check(&tool(false, true), &clean), GateDecision::Allowed);
    }

    #[test]
    fn no_flags_always_allowed() {
        let ws = FakeWs {
            focused_path: None,
            focused: false,
            dirty: vec![true],
        };
        assert_eq!(check(&tool(false, false), &ws), GateDecision::Allowed);
    }

    #[test]
    fn reason_display() {
        assert_eq!(BlockReason::NoFile.to_string(), "no file");
        assert_eq!(
            BlockReason::UnsavedDocuments.to_string(),
            "unsaved documents present"
        );
    }
}
