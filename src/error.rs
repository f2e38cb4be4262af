//! Error types for the debugger core.
//!
//! This module provides the error hierarchy used by the embedded VM engine
//! (`VmError`) and by the emulator facade that drives it (`EmulatorError`).

use thiserror::Error;

/// Errors raised by the embedded stack-machine engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    /// Parse error with context
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Invalid opcode
    #[error("Invalid opcode: {opcode:#04x}")]
    InvalidOpCode { opcode: u8 },

    /// Invalid operation with context
    #[error("Invalid operation: {operation}, reason: {reason}")]
    InvalidOperation { operation: String, reason: String },

    /// Invalid script
    #[error("Invalid script: {reason}")]
    InvalidScript { reason: String },

    /// Stack underflow
    #[error(
        "Stack underflow: attempted to access {requested} items, but only {available} available"
    )]
    StackUnderflow { requested: usize, available: usize },

    /// Invalid type conversion
    #[error("Invalid type conversion: cannot convert {from} to {to}")]
    InvalidType { from: String, to: String },

    /// VM fault state
    #[error("VM fault: {fault_type}, details: {details}")]
    VmFault { fault_type: String, details: String },

    /// Instruction pointer fell outside the bounds of the current script.
    #[error("Instruction pointer {ip} out of range for script of length {len}")]
    InstructionPointerOutOfRange { ip: usize, len: usize },
}

impl VmError {
    /// Builds a [`VmError::Parse`].
    pub fn parse<S: Into<String>>(message: S) -> Self {
        VmError::Parse {
            message: message.into(),
        }
    }

    /// Builds a [`VmError::InvalidOperation`] from a single message.
    pub fn invalid_operation_msg<S: Into<String>>(msg: S) -> Self {
        VmError::InvalidOperation {
            operation: "vm".to_string(),
            reason: msg.into(),
        }
    }

    /// Builds a [`VmError::InvalidScript`].
    pub fn invalid_script<S: Into<String>>(reason: S) -> Self {
        VmError::InvalidScript {
            reason: reason.into(),
        }
    }

    /// Builds a [`VmError::StackUnderflow`].
    pub fn stack_underflow(requested: usize, available: usize) -> Self {
        VmError::StackUnderflow {
            requested,
            available,
        }
    }

    /// Builds a [`VmError::InvalidType`].
    pub fn invalid_type<S: Into<String>>(from: S, to: S) -> Self {
        VmError::InvalidType {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Result type for VM engine operations.
pub type VmResult<T> = std::result::Result<T, VmError>;

/// Errors raised by the emulator facade, per the documented error policy:
/// anything that corrupts session invariants is fatal to the call that
/// raised it; anything that is merely "couldn't read a value from the VM"
/// is swallowed at the call site and never constructed here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmulatorError {
    /// `Reset` was called before `set_executing_account`.
    #[error("no executing account: set_executing_account must be called before reset")]
    BytecodeMissing,

    /// The argument marshaller was given a parameter it cannot lower to a
    /// VM-loadable value.
    #[error("unsupported parameter kind: {kind}")]
    UnsupportedParamKind { kind: String },

    /// The underlying VM engine rejected the script or faulted while loading it.
    #[error("vm engine error during reset: {0}")]
    Vm(#[from] VmError),
}

/// Result type for emulator facade operations.
pub type EmulatorResult<T> = std::result::Result<T, EmulatorError>;
