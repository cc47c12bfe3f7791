//! Variable resolver: expand `$EDIT_*` placeholders in a command template against an invocation context.

use crate::tool::context::InvocationCtx;

pub const CURRENT_DIRECTORY: &str = "EDIT_CURRENT_DIRECTORY";
pub const CURRENT_FILENAME: &str = "EDIT_CURRENT_FILENAME";
pub const CURRENT_LINE_NUMBER: &str = "EDIT_CURRENT_LINE_NUMBER";
pub const CURRENT_SELECTION: &str = "EDIT_CURRENT_SELECTION";

/// A recognized placeholder had no value in the context. Reported
/// immediately; no process is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    pub placeholder: &'static str,
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no value for ${} in the current context", self.placeholder)
    }
}

impl std::error::Error for ResolveError {}

/// Substitute recognized placeholders (closed set, case-sensitive) into
/// `template`. Any other `$`-prefixed token passes through literally so
/// normal shell variables still work. Substitution is textual; no shell
/// quoting is added; placeholder values containing shell metacharacters
/// are the template author's responsibility.
///
/// Fails fast with the first recognized placeholder that has no value
/// (e.g. `$EDIT_CURRENT_LINE_NUMBER` with no focused document).
pub fn resolve(template: &str, ctx: &InvocationCtx) -> Result<String, ResolveError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let len = after
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        let token = &after[..len];
        match token {
            t if t == CURRENT_DIRECTORY => out.push_str(&ctx.cwd.to_string_lossy()),
            t if t == CURRENT_FILENAME => match &ctx.file {
                Some(file) => out.push_str(&file.to_string_lossy()),
                None => {
                    return Err(ResolveError {
                        placeholder: CURRENT_FILENAME,
                    });
                }
            },
            t if t == CURRENT_LINE_NUMBER => match ctx.line {
                Some(line) => out.push_str(&line.to_string()),
                None => {
                    return Err(ResolveError {
                        placeholder: CURRENT_LINE_NUMBER,
                    });
                }
            },
            t if t == CURRENT_SELECTION => match &ctx.selection {
                Some(sel) => out.push_str(&sel.text),
                None => {
                    return Err(ResolveError {
                        placeholder: CURRENT_SELECTION,
                    });
                }
            },
            _ => {
                // Not one of ours; leave it for the shell.
                out.push('$');
                out.push_str(token);
            }
        }
        rest = &after[len..];
    }
    out.push_str(rest);
    Ok(out)
}
