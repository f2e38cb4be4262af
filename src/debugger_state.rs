//! The debugger's own state machine, distinct from the embedded VM's
//! [`crate::vm_state::VMState`] flags: this tracks the session's lifecycle
//! (has `Reset` run? is it absorbing?) rather than the VM's instantaneous
//! execution status.

/// The kind of state the debugger session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub enum DebuggerStateKind {
    /// No `Reset` has succeeded yet.
    Invalid,
    /// `Reset` just succeeded; no real step has executed yet.
    Reset,
    /// Stepping is underway.
    Running,
    /// Paused at a breakpoint.
    Break,
    /// The VM halted successfully. Absorbing until the next `Reset`.
    Finished,
    /// The VM faulted. Absorbing until the next `Reset`.
    Exception,
}

impl DebuggerStateKind {
    /// Whether this state no longer changes except via `Reset`.
    pub fn is_absorbing(self) -> bool {
        matches!(self, DebuggerStateKind::Finished | DebuggerStateKind::Exception)
    }
}

/// A `DebuggerState`: a state kind paired with the bytecode offset it was
/// observed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct DebuggerState {
    pub kind: DebuggerStateKind,
    pub offset: usize,
}

impl DebuggerState {
    pub fn invalid() -> Self {
        Self {
            kind: DebuggerStateKind::Invalid,
            offset: 0,
        }
    }

    pub fn new(kind: DebuggerStateKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}
