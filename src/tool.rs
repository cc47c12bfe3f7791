//! Tool engine internals: descriptor/registry, invocation context, variable resolver, process runner, output router, save gate.

pub mod context;
pub mod descriptor;
pub mod gate;
pub mod resolve;
pub mod router;
pub mod runner;

pub use context::InvocationCtx;
pub use descriptor::{InputDisposition, OutputDisposition, RegistryError, ToolDescriptor, ToolRegistry};
pub use gate::{BlockReason, GateDecision};
pub use resolve::{ResolveError, resolve};
pub use router::{Completion, route};
pub use runner::{InvocationId, InvocationStatus, RunningInvocation};
