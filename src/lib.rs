//! # neo-debugger-core
//!
//! A stepping emulator core for a NEO-style stack-based smart-contract VM.
//!
//! This crate drives an embedded VM engine one instruction at a time under
//! debugger control: it marshals source-level arguments onto the stack
//! before a contract's entry point runs, tracks gas and source-level
//! variable bindings as stepping proceeds, honors breakpoints, and exposes
//! stack/variable state to an external debugger UI through the
//! [`Emulator`] facade.
//!
//! Reimplementing the full opcode semantics of the production interpreter
//! is out of scope; [`vm_engine`] provides a minimal stand-in sufficient to
//! drive stepping, gas accounting, and argument marshalling against.
//!
//! ## Example
//!
//! ```
//! use neo_debugger_core::{Abi, EntryPoint, Emulator, InMemoryBlockchain, Parameter};
//! use neo_debugger_core::{OpCode, ParamTree, ScriptBuilder};
//!
//! let mut builder = ScriptBuilder::new();
//! builder.emit_opcode(OpCode::ADD);
//! builder.emit_opcode(OpCode::RET);
//!
//! let emulator = Emulator::new(Box::new(InMemoryBlockchain::default()));
//! emulator.set_executing_account(builder.to_script().as_bytes().to_vec());
//!
//! let abi = Abi::with_entry_point(EntryPoint {
//!     name: "Main".into(),
//!     inputs: vec![
//!         Parameter { name: "a".into(), declared_type: "Integer".into() },
//!         Parameter { name: "b".into(), declared_type: "Integer".into() },
//!     ],
//! });
//! let inputs = vec![ParamTree::Numeric("2".into()), ParamTree::Numeric("3".into())];
//! emulator.reset(&inputs, abi).unwrap();
//!
//! let state = emulator.run();
//! assert!(state.kind.is_absorbing());
//! ```

pub mod abi;
pub mod breakpoints;
pub mod collaborators;
pub mod debugger_state;
pub mod emulator;
pub mod error;
pub mod evaluation_stack;
pub mod execution_context;
pub mod gas;
pub mod instruction;
pub mod marshaller;
pub mod op_code;
pub mod param_tree;
pub mod script;
pub mod script_builder;
pub mod session;
pub mod stack_item;
pub mod transaction;
pub mod variables;
pub mod vm_engine;
pub mod vm_state;

pub use abi::{Abi, EntryPoint, Function, Parameter};
pub use breakpoints::BreakpointSet;
pub use collaborators::{DefaultInvokerContext, InMemoryStorageMeter, InvokerContext, StorageMeter};
pub use debugger_state::{DebuggerState, DebuggerStateKind};
pub use emulator::{Emulator, EmulatorCore, StepInfo, Trigger};
pub use error::{EmulatorError, EmulatorResult, VmError, VmResult};
pub use evaluation_stack::EvaluationStack;
pub use execution_context::ExecutionContext;
pub use gas::{opcode_cost, syscall_base_cost, syscall_cost};
pub use instruction::Instruction;
pub use marshaller::lower as lower_arguments;
pub use op_code::OpCode;
pub use param_tree::{convert_argument, ConvertedArgument, ParamTree};
pub use script::Script;
pub use script_builder::ScriptBuilder;
pub use session::SessionToken;
pub use stack_item::StackItem;
pub use transaction::{Block, Blockchain, InMemoryBlockchain, Output, Transaction};
pub use variables::{Assignment, VariableTracker, VariableValue};
pub use vm_engine::{StepOutcome, VmEngine, WitnessMode};
pub use vm_state::VMState;
