use super::events::Event;
use super::types::Command;

/// Trait for dispatching project commands.
///
/// Decouples command definitions from their execution, so a UI event loop
/// or the CLI can drive the store through one entry point.
///
/// # Semantics
///
/// - **Ordering**: state changes commit in the order operations complete,
///   not the order they were dispatched.
/// - **Idempotency**: commands are not idempotent (`DeleteProject` fails the
///   second time with `NotFound`).
/// - **Error handling**: on failure no state changes and no events are
///   emitted; the error goes back to the caller, who decides about retries.
/// - **Events**: on success, dispatch returns every event the command
///   produced, in commit order. The list may be empty (a stale load, or a
///   selection that did not change anything).
#[async_trait::async_trait]
pub trait Store {
    type Error;
    async fn dispatch(&self, cmd: Command) -> Result<Vec<Event>, Self::Error>;
}
