//! Tool definitions from `tools.toml`: `[[tool]]` tables, shorthand command prefixes, registry building.
//!
//! Shorthand prefixes on `command` (Perl-open style):
//!   `<cmd`  selection-or-document → insert
//!   `>cmd`  selection-or-document → errors-window
//!   `|cmd`  selection-or-document → replace
//!   `!cmd`  no-input → errors-window
//! All four imply `needs-file`. Explicit `input`/`output` keys override
//! the shorthand's dispositions.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::tool::descriptor::{
    InputDisposition, OutputDisposition, ToolDescriptor, ToolRegistry,
};

/// Config errors: file access, TOML syntax, or an invalid tool entry.
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(s) => write!(f, "tools config io: {}", s),
            ConfigError::Parse(s) => write!(f, "tools config parse: {}", s),
            ConfigError::Invalid(s) => write!(f, "tools config: {}", s),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Raw file shape: a list of `[[tool]]` tables. Unknown keys are
/// rejected so typos in flag names fail loudly.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ToolsFile {
    #[serde(default, rename = "tool")]
    tools: Vec<ToolEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ToolEntry {
    name: Option<String>,
    command: Option<String>,
    input: Option<InputDisposition>,
    output: Option<OutputDisposition>,
    needs_file: Option<bool>,
    check_everything_saved: Option<bool>,
}

struct Shorthand {
    input: InputDisposition,
    output: OutputDisposition,
}

/// Strip a leading shorthand prefix, returning the remaining command and
/// the dispositions the prefix implies.
fn strip_shorthand(command: &str) -> (&str, Option<Shorthand>) {
    let mut chars = command.chars();
    let shorthand = match chars.next() {
        Some('<') => Shorthand {
            input: InputDisposition::SelectionOrDocument,
            output: OutputDisposition::Insert,
        },
        Some('>') => Shorthand {
            input: InputDisposition::SelectionOrDocument,
            output: OutputDisposition::ErrorsWindow,
        },
        Some('|') => Shorthand {
            input: InputDisposition::SelectionOrDocument,
            output: OutputDisposition::Replace,
        },
        Some('!') => Shorthand {
            input: InputDisposition::NoInput,
            output: OutputDisposition::ErrorsWindow,
        },
        _ => return (command, None),
    };
    (chars.as_str(), Some(shorthand))
}

fn descriptor_from(entry: ToolEntry) -> Result<ToolDescriptor, ConfigError> {
    let name = entry
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ConfigError::Invalid("tool without a 'name'".to_string()))?;
    let raw = entry
        .command
        .ok_or_else(|| ConfigError::Invalid(format!("tool '{}' has no 'command'", name)))?;

    let (command, shorthand) = strip_shorthand(raw.trim());
    if command.trim().is_empty() {
        return Err(ConfigError::Invalid(format!(
            "tool '{}': empty command template",
            name
        )));
    }

    let input = entry
        .input
        .or(shorthand.as_ref().map(|s| s.input))
        .unwrap_or(InputDisposition::NoInput);
    let output = entry
        .output
        .or(shorthand.as_ref().map(|s| s.output))
        .unwrap_or(OutputDisposition::ErrorsWindow);
    // Shorthand always implies a file-backed document.
    let needs_file = shorthand.is_some() || entry.needs_file.unwrap_or(false);

    Ok(ToolDescriptor::new(name, command, input, output)
        .needs_file(needs_file)
        .check_everything_saved(entry.check_everything_saved.unwrap_or(false)))
}

/// Parse `tools.toml` text into descriptors, in file order.
pub fn parse(text: &str) -> Result<Vec<ToolDescriptor>, ConfigError> {
    let file: ToolsFile = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    file.tools.into_iter().map(descriptor_from).collect()
}

/// Read and parse a `tools.toml` file.
pub fn load(path: &Path) -> Result<Vec<ToolDescriptor>, ConfigError> {
    let text = fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
    parse(&text)
}

/// Build a populated registry from a `tools.toml` file.
pub fn registry_from(path: &Path) -> Result<ToolRegistry, ConfigError> {
    let registry = ToolRegistry::new();
    for tool in load(path)? {
        registry
            .register(tool)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    }
    Ok(registry)
}
