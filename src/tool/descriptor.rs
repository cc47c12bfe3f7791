//! Tool descriptors and the registry: name, command template, input/output dispositions, save-gate flags.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Deserialize;

/// What a tool's standard input is fed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputDisposition {
    /// Standard input is closed immediately.
    NoInput,
    /// The selection when non-empty, otherwise the whole document.
    /// Exactly one of the two is fed, never both.
    SelectionOrDocument,
    /// The whole document regardless of selection.
    Document,
}

/// Where a tool's captured output goes once the process is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputDisposition {
    /// Replace the system clipboard text with stdout.
    Clipboard,
    /// Open a new, unsaved document pre-filled with stdout.
    CreateNewDocument,
    /// Present stdout (or stderr if stdout is empty) as a read-only modal.
    Dialog,
    /// Drop the output.
    Discard,
    /// Parse `path:line:` references into the shared error list.
    ErrorsWindow,
    /// Insert stdout at the caret of the originating document.
    Insert,
    /// Replace the originating document's selection (or whole text) with stdout.
    Replace,
}

/// Immutable definition of a runnable external tool. Created once at
/// registration time; the registry owns it for the process lifetime.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    /// Display name, also the registry key.
    pub name: String,
    /// Command template; `$EDIT_*` placeholders are resolved per invocation.
    pub command: String,
    pub input: InputDisposition,
    pub output: OutputDisposition,
    /// The command requires a file backing the focused document.
    pub needs_file: bool,
    /// The command requires no unsaved documents in the active workspace.
    pub check_everything_saved: bool,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        input: InputDisposition,
        output: OutputDisposition,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into().trim().to_string(),
            input,
            output,
            needs_file: false,
            check_everything_saved: false,
        }
    }

    pub fn needs_file(mut self, v: bool) -> Self {
        self.needs_file = v;
        self
    }

    pub fn check_everything_saved(mut self, v: bool) -> Self {
        self.check_everything_saved = v;
        self
    }
}

/// Registry rejections. The only validation is a non-empty command
/// template; semantically odd disposition combinations are accepted here
/// and guarded at invocation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    EmptyCommand(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::EmptyCommand(name) => {
                write!(f, "tool '{}': empty command template", name)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Registry of tool descriptors by name. Thread-safe; descriptors are
/// handed out as `Arc` so invocations outlive lock scopes.
#[derive(Default)]
pub struct ToolRegistry {
    inner: RwLock<HashMap<String, Arc<ToolDescriptor>>>,
}

impl ToolRegistry {
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Register a descriptor under its name. Overwrites if the name
    /// already exists.
    pub fn register(&self, tool: ToolDescriptor) -> Result<(), RegistryError> {
        if tool.command.trim().is_empty() {
            return Err(RegistryError::EmptyCommand(tool.name));
        }
        let name = tool.name.clone();
        self.inner
            .write()
            .expect("registry lock")
            .insert(name, Arc::new(tool));
        Ok(())
    }

    /// Descriptor by name, if registered.
    pub fn lookup(&self, name: &str) -> Option<Arc<ToolDescriptor>> {
        let guard = self.inner.read().expect("registry lock");
        guard.get(name).cloned()
    }

    /// Sorted list of registered tool names.
    pub fn list(&self) -> Vec<String> {
        let guard = self.inner.read().expect("registry lock");
        let mut names: Vec<String> = guard.keys().cloned().collect();
        names.sort();
        names
    }
}
