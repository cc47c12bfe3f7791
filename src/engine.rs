//! ToolEngine: the action-layer entry point. Gate → capture → resolve → spawn runner; completions queued back to the UI task.
//!
//! One `Arc<ToolEngine>` shared by the action layer and the runner tasks.
//! Interior mutability via `RwLock`; lock scopes kept short. Invocations
//! are independent: no de-duplication, no shared state between runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::editor::EditorWorkspace;
use crate::tool::context::InvocationCtx;
use crate::tool::descriptor::ToolRegistry;
use crate::tool::gate::{self, BlockReason, GateDecision};
use crate::tool::resolve::{self, ResolveError};
use crate::tool::router::Completion;
use crate::tool::runner::{self, InvocationId, InvocationStatus};

const MAX_FINISHED_INVOCATIONS: usize = 50;
const COMPLETION_QUEUE_DEPTH: usize = 64;

/// Why `invoke` returned without starting a process. Everything here is
/// reported before any child is spawned; nothing partially executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    UnknownTool(String),
    /// Save-gate precondition failed.
    Blocked(BlockReason),
    /// A recognized placeholder had no value in the captured context.
    Unresolved(ResolveError),
}

impl std::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvokeError::UnknownTool(name) => write!(f, "unknown tool '{}'", name),
            InvokeError::Blocked(reason) => write!(f, "blocked: {}", reason),
            InvokeError::Unresolved(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for InvokeError {}

/// Internal entry: status + cancellation token while running.
struct InvocationEntry {
    status: InvocationStatus,
    cancel: Option<CancellationToken>,
    started_at: Instant,
}

struct EngineState {
    invocations: HashMap<InvocationId, InvocationEntry>,
}

/// Owns the registry handle and the live-invocation map. Cheap to share
/// via `Arc`. Completions are delivered over the channel returned by
/// [`ToolEngine::new`]; the host's UI loop drains it and calls
/// [`crate::tool::route`], one queued task per invocation, so routing
/// stays atomic.
pub struct ToolEngine {
    registry: Arc<ToolRegistry>,
    next_id: AtomicU64,
    state: RwLock<EngineState>,
    completion_tx: mpsc::Sender<Completion>,
}

impl ToolEngine {
    pub fn new(registry: Arc<ToolRegistry>) -> (Arc<Self>, mpsc::Receiver<Completion>) {
        let (completion_tx, completion_rx) = mpsc::channel(COMPLETION_QUEUE_DEPTH);
        let engine = Arc::new(Self {
            registry,
            next_id: AtomicU64::new(1),
            state: RwLock::new(EngineState {
                invocations: HashMap::new(),
            }),
            completion_tx,
        });
        (engine, completion_rx)
    }

    #[inline]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Invoke `tool_name` against the current editor state. Returns as
    /// soon as the runner task is spawned; the terminal result arrives on
    /// the completion channel. Errors here mean no process was started.
    pub fn invoke(
        self: &Arc<Self>,
        tool_name: &str,
        workspace: &dyn EditorWorkspace,
    ) -> Result<InvocationId, InvokeError> {
        let tool = self
            .registry
            .lookup(tool_name)
            .ok_or_else(|| InvokeError::UnknownTool(tool_name.to_string()))?;

        if let GateDecision::Blocked(reason) = gate::check(&tool, workspace) {
            return Err(InvokeError::Blocked(reason));
        }

        let ctx = InvocationCtx::capture(workspace);
        let command = resolve::resolve(&tool.command, &ctx).map_err(InvokeError::Unresolved)?;
        let payload = ctx.stdin_payload(tool.input);

        let id = InvocationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let cancel = CancellationToken::new();
        {
            let mut st = self.state.write().expect("engine state lock");
            st.invocations.insert(
                id,
                InvocationEntry {
                    status: InvocationStatus::Running,
                    cancel: Some(cancel.clone()),
                    started_at: Instant::now(),
                },
            );
        }

        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let invocation = runner::run(id, command, payload, &ctx, cancel).await;
            engine.finish(id, invocation.status);
            let completion = Completion {
                tool: tool.name.clone(),
                output: tool.output,
                invocation,
                ctx,
            };
            if engine.completion_tx.send(completion).await.is_err() {
                eprintln!("tool engine: completion receiver dropped; {} result lost", id);
            }
        });

        Ok(id)
    }

    /// Request termination of a running invocation. Returns `true` if it
    /// was running and cancellation was requested; the status flips once
    /// the runner observes the kill. The router still receives the
    /// partial buffers, tagged cancelled.
    pub fn cancel(&self, id: InvocationId) -> bool {
        let st = self.state.read().expect("engine state lock");
        match st.invocations.get(&id) {
            Some(entry) if entry.status == InvocationStatus::Running => {
                if let Some(token) = &entry.cancel {
                    token.cancel();
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Status of an invocation, if still tracked.
    pub fn status(&self, id: InvocationId) -> Option<InvocationStatus> {
        let st = self.state.read().expect("engine state lock");
        st.invocations.get(&id).map(|e| e.status)
    }

    /// Record the terminal status. Idempotent: ignores if already terminal.
    fn finish(&self, id: InvocationId, status: InvocationStatus) {
        let mut st = self.state.write().expect("engine state lock");
        if let Some(entry) = st.invocations.get_mut(&id) {
            if entry.status != InvocationStatus::Running {
                return;
            }
            entry.status = status;
            entry.cancel = None;
        }
        prune_finished(&mut st);
    }
}

/// Drop terminal entries when the count exceeds the cap, keeping the most
/// recent ones. Running invocations are never pruned.
fn prune_finished(st: &mut EngineState) {
    let mut terminal: Vec<(InvocationId, Instant)> = st
        .invocations
        .iter()
        .filter(|(_, e)| e.status != InvocationStatus::Running)
        .map(|(id, e)| (*id, e.started_at))
        .collect();

    if terminal.len() <= MAX_FINISHED_INVOCATIONS {
        return;
    }

    terminal.sort_by_key(|(_, t)| *t);
    let to_remove = terminal.len() - MAX_FINISHED_INVOCATIONS;
    for (id, _) in terminal.into_iter().take(to_remove) {
        st.invocations.remove(&id);
    }
}
