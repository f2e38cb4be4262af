//! VM execution state flags.
//!
//! Mirrors the shape of `Neo.VM/VMState.cs` from the C# reference
//! implementation: a small bitflag set rather than a plain enum, since the
//! production VM can (rarely) report more than one condition at once.

use bitflags::bitflags;

bitflags! {
    /// Indicates the status of the embedded VM engine.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct VMState: u8 {
        /// Execution has not started, or is between instructions.
        const NONE = 0;
        /// Execution completed successfully (invocation stack emptied via `RET`).
        const HALT = 1 << 0;
        /// Execution terminated because of an unhandled fault.
        const FAULT = 1 << 1;
        /// Execution is paused at a breakpoint.
        const BREAK = 1 << 2;
    }
}

impl VMState {
    /// Returns `true` when the VM has halted successfully.
    pub fn is_halt(self) -> bool {
        self.contains(VMState::HALT)
    }

    /// Returns `true` when the VM faulted.
    pub fn is_fault(self) -> bool {
        self.contains(VMState::FAULT)
    }

    /// Returns `true` when the VM is currently at a breakpoint.
    pub fn is_break(self) -> bool {
        self.contains(VMState::BREAK)
    }

    /// Returns `true` when the VM can still execute another instruction.
    pub fn is_runnable(self) -> bool {
        self == VMState::NONE
    }
}
