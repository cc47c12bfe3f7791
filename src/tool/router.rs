//! Output router: dispatch a terminal invocation's captured output to its declared sink.

use regex_lite::Regex;

use crate::editor::{EditorServices, EditorWorkspace, ErrorEntry};
use crate::tool::context::InvocationCtx;
use crate::tool::descriptor::OutputDisposition;
use crate::tool::runner::{InvocationStatus, RunningInvocation};

/// A terminal invocation plus everything routing needs. One `Completion`
/// per invocation; routing it is a single step on the host's UI task, so
/// output is applied atomically.
#[derive(Debug, Clone)]
pub struct Completion {
    pub invocation: RunningInvocation,
    /// Descriptor display name, for dialog titles and error annotations.
    pub tool: String,
    pub output: OutputDisposition,
    pub ctx: InvocationCtx,
}

/// Route `completion` to its sink. Must run on the task that owns UI
/// state; everything it touches goes through `services`.
pub fn route(completion: Completion, services: &mut EditorServices<'_>) {
    let invocation = &completion.invocation;
    match invocation.status {
        InvocationStatus::Running => {
            // The runner only hands over terminal invocations.
            eprintln!("output router: dropped non-terminal {}", invocation.id);
            return;
        }
        InvocationStatus::Failed => {
            // Launch failure is always visible, whatever the disposition.
            let why = invocation
                .launch_error
                .as_deref()
                .unwrap_or("unknown error");
            let body = format!(
                "There was a problem starting the command \"{}\": {}.",
                invocation.command, why
            );
            services.dialog.show_text("Couldn't start tool", &body);
            return;
        }
        InvocationStatus::Cancelled => {
            if completion.output == OutputDisposition::Dialog {
                let mut body = format!("Tool \"{}\" was cancelled.", completion.tool);
                let partial = invocation.stdout_text();
                if !partial.is_empty() {
                    body.push_str("\n\nPartial output:\n");
                    body.push_str(&partial);
                }
                services.dialog.show_text(&completion.tool, &body);
            } else {
                eprintln!(
                    "output router: {} cancelled; output discarded",
                    invocation.id
                );
            }
            return;
        }
        InvocationStatus::Succeeded => {}
    }

    let stdout = invocation.stdout_text();
    match completion.output {
        OutputDisposition::Clipboard => services.clipboard.set_text(stdout),
        OutputDisposition::CreateNewDocument => services.workspace.open_new_document(&stdout),
        OutputDisposition::Dialog => {
            let body = if stdout.is_empty() {
                invocation.stderr_text()
            } else {
                stdout
            };
            services.dialog.show_text(&completion.tool, &body);
        }
        OutputDisposition::Discard => {}
        OutputDisposition::ErrorsWindow => {
            let mut entries = parse_errors(&stdout, false);
            entries.extend(parse_errors(&invocation.stderr_text(), true));
            // A non-zero exit status is always potentially interesting.
            if let Some(code) = invocation.exit_code.filter(|c| *c != 0) {
                entries.push(ErrorEntry::plain(
                    format!("Tool \"{}\" failed with exit status {}", completion.tool, code),
                    true,
                ));
            }
            services.dialog.append_errors(entries);
        }
        OutputDisposition::Insert => {
            if target_still_focused(&*services.workspace, &completion) {
                services.workspace.insert_at_caret(&stdout);
            }
        }
        OutputDisposition::Replace => {
            if target_still_focused(&*services.workspace, &completion) {
                services.workspace.replace_selection_or_all(&stdout);
            }
        }
    }
}

/// INSERT/REPLACE re-check: the tool ran asynchronously, so the target
/// document may have changed or closed since capture.
fn target_still_focused(workspace: &dyn EditorWorkspace, completion: &Completion) -> bool {
    let Some(origin) = completion.ctx.document else {
        eprintln!(
            "output router: {} has no originating document; output discarded",
            completion.invocation.id
        );
        return false;
    };
    match workspace.focused_document_id() {
        Some(id) if id == origin => true,
        _ => {
            eprintln!(
                "output router: focus moved since {} started; output discarded",
                completion.invocation.id
            );
            false
        }
    }
}

/// Split `text` into error-list entries, one per line. Lines starting
/// with a `path:line:` address become navigable; the rest are plain.
fn parse_errors(text: &str, from_stderr: bool) -> Vec<ErrorEntry> {
    let address = Regex::new(r"^([^:\s]+):(\d+):").unwrap();
    text.lines()
        .map(|line| match address.captures(line) {
            Some(caps) => match caps[2].parse::<u32>() {
                Ok(line_no) => ErrorEntry::addressed(line, &caps[1], line_no, from_stderr),
                Err(_) => ErrorEntry::plain(line, from_stderr),
            },
            None => ErrorEntry::plain(line, from_stderr),
        })
        .collect()
}
