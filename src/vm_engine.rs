//! A deliberately minimal stand-in for the production opcode interpreter.
//!
//! Reimplementing the full semantics of the target VM is explicitly out of
//! scope for this crate: the real interpreter is an external collaborator.
//! What the stepping engine and gas/variable tracking actually need is a
//! engine that can execute one instruction at a time, report its status via
//! [`VMState`], and expose enough of the call-frame chain to answer "what's
//! on the stack right now". This module provides exactly that, covering the
//! opcode families the emulator's documented scenarios exercise (pushes,
//! control flow, syscalls, basic arithmetic/compound types, hashing) and
//! faulting on anything else rather than pretending to interpret it.

use std::collections::HashSet;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::collaborators::{DefaultInvokerContext, InMemoryStorageMeter, InvokerContext, StorageMeter};
use crate::emulator::EmulatorCore;
use crate::error::{VmError, VmResult};
use crate::execution_context::ExecutionContext;
use crate::evaluation_stack::EvaluationStack;
use crate::instruction::Instruction;
use crate::op_code::OpCode;
use crate::script::Script;
use crate::session::{self, SessionToken};
use crate::stack_item::StackItem;
use crate::vm_state::VMState;
use std::sync::{Arc, Mutex};

/// How `CHECKSIG`/`CHECKMULTISIG` resolve in the absence of real signature
/// verification, which this crate does not implement (cryptographic
/// primitives are an external collaborator's concern).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WitnessMode {
    /// No override configured. There is no real signature-checking
    /// collaborator behind this engine, so witness checks resolve
    /// conservatively to `false` rather than silently succeeding.
    #[default]
    Default,
    /// Witness checks always succeed.
    AlwaysTrue,
    /// Witness checks always fail.
    AlwaysFalse,
}

impl WitnessMode {
    /// The boolean outcome a `CHECKSIG`/`CHECKMULTISIG` should push under
    /// this mode.
    fn resolves_true(self) -> bool {
        matches!(self, WitnessMode::AlwaysTrue)
    }
}

/// Outcome of a single [`VmEngine::step_into`] call, for the stepping
/// engine's gas/opcode-count bookkeeping.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// The instruction that was executed.
    pub instruction: Instruction,
}

/// The embedded VM engine: an invocation-stack-of-contexts interpreter.
pub struct VmEngine {
    invocation_stack: Vec<ExecutionContext>,
    result_stack: EvaluationStack,
    state: VMState,
    breakpoints: HashSet<usize>,
    /// Set when a breakpoint halted execution before it ran, so the very
    /// next `step_into` executes through it instead of halting again.
    resuming_through_breakpoint: Option<usize>,
    witness_mode: WitnessMode,
    invoker: Box<dyn InvokerContext>,
    storage: Box<dyn StorageMeter>,
    /// The session this engine belongs to, for the reverse navigation
    /// described in the design notes: given a VM engine handle, reach the
    /// owning emulator via the weak session registry.
    session_token: Option<SessionToken>,
}

impl Default for VmEngine {
    fn default() -> Self {
        Self {
            invocation_stack: Vec::new(),
            result_stack: EvaluationStack::new(),
            state: VMState::NONE,
            breakpoints: HashSet::new(),
            resuming_through_breakpoint: None,
            witness_mode: WitnessMode::default(),
            invoker: Box::new(DefaultInvokerContext),
            storage: Box::new(InMemoryStorageMeter::default()),
            session_token: None,
        }
    }
}

impl VmEngine {
    /// Creates a fresh engine with no script loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the invoker-context collaborator.
    pub fn set_invoker(&mut self, invoker: Box<dyn InvokerContext>) {
        self.invoker = invoker;
    }

    /// Replaces the storage-meter collaborator.
    pub fn set_storage(&mut self, storage: Box<dyn StorageMeter>) {
        self.storage = storage;
    }

    /// Sets how `CHECKSIG`/`CHECKMULTISIG` should resolve.
    pub fn set_witness_mode(&mut self, mode: WitnessMode) {
        self.witness_mode = mode;
    }

    /// Gives read access to the storage collaborator, e.g. for the gas
    /// model's `Storage.Put` payload-size multiplier.
    pub fn storage(&self) -> &dyn StorageMeter {
        self.storage.as_ref()
    }

    /// Loads `script` as the sole entry on the invocation stack, resetting
    /// all other session state.
    pub fn load_script(&mut self, script: Script) {
        self.invocation_stack.clear();
        self.invocation_stack.push(ExecutionContext::new(script));
        self.result_stack.clear();
        self.state = VMState::NONE;
        self.resuming_through_breakpoint = None;
    }

    /// Loads `contract` at the bottom of the invocation stack and `prelude`
    /// on top of it, so that stepping begins in `prelude` and a `RET` from
    /// it transfers its evaluation stack into `contract`'s — the mechanism
    /// the argument marshaller's prelude relies on to stage arguments
    /// before the contract's own entry point runs.
    pub fn load_script_with_prelude(&mut self, contract: Script, prelude: Script) {
        self.invocation_stack.clear();
        self.invocation_stack.push(ExecutionContext::new(contract));
        self.invocation_stack.push(ExecutionContext::new(prelude));
        self.result_stack.clear();
        self.state = VMState::NONE;
        self.resuming_through_breakpoint = None;
    }

    /// The depth of the invocation (call-frame) stack.
    pub fn invocation_depth(&self) -> usize {
        self.invocation_stack.len()
    }

    /// Zeroes a `BREAK` status so the next `step_into` can resume, matching
    /// the stepping engine's documented "zero the VM's break flag" action.
    pub fn clear_break_flag(&mut self) {
        if self.state.is_break() {
            self.state = VMState::NONE;
        }
    }

    /// Forces `FAULT` status, used by the stepping engine to reify an
    /// embedded-engine execution error (e.g. a stack underflow) as a VM
    /// fault rather than letting it propagate as a Rust error.
    pub fn force_fault(&mut self) {
        self.state = VMState::FAULT;
    }

    /// Associates this engine with a debug session, enabling the reverse
    /// navigation described in the design notes.
    pub fn set_session_token(&mut self, token: SessionToken) {
        self.session_token = Some(token);
    }

    /// The session token this engine was bound to, if any.
    pub fn session_token(&self) -> Option<SessionToken> {
        self.session_token
    }

    /// Resolves this engine's owning emulator, if the session is still
    /// alive. An extension method in the sense of the design notes: given
    /// only a VM engine handle, the facade that owns it is reachable.
    pub fn owning_emulator(&self) -> Option<Arc<Mutex<EmulatorCore>>> {
        self.session_token.and_then(session::resolve)
    }

    /// Registers an instruction offset, within the currently loaded script,
    /// that should pause execution before it runs.
    pub fn add_break_point(&mut self, offset: usize) {
        self.breakpoints.insert(offset);
    }

    /// Clears every registered breakpoint.
    pub fn clear_break_points(&mut self) {
        self.breakpoints.clear();
    }

    /// Current VM status flags.
    pub fn state(&self) -> VMState {
        self.state
    }

    /// The active call frame, if any script is loaded.
    pub fn current_context(&self) -> Option<&ExecutionContext> {
        self.invocation_stack.last()
    }

    /// The active call frame, mutably.
    pub fn current_context_mut(&mut self) -> Option<&mut ExecutionContext> {
        self.invocation_stack.last_mut()
    }

    /// Items produced on `RET` from the outermost context.
    pub fn result_stack(&self) -> &EvaluationStack {
        &self.result_stack
    }

    /// Executes exactly one instruction, or halts at a breakpoint without
    /// executing anything.
    ///
    /// Breakpoint offsets are checked before the instruction at that offset
    /// runs, matching ordinary debugger behavior: a breakpoint pauses
    /// execution *before* the marked line, not after. Calling `step_into`
    /// again from that same paused offset executes through it, so a caller
    /// never needs to clear the breakpoint to make progress.
    pub fn step_into(&mut self) -> VmResult<Option<StepOutcome>> {
        if !self.state.is_runnable() {
            return Err(VmError::invalid_operation_msg(
                "step_into called while the VM is not runnable",
            ));
        }

        let ip = match self.current_context() {
            Some(ctx) => ctx.instruction_pointer(),
            None => return Err(VmError::invalid_operation_msg("no script loaded")),
        };

        let at_own_breakpoint = self.resuming_through_breakpoint == Some(ip);
        if self.breakpoints.contains(&ip) && !at_own_breakpoint {
            self.state = VMState::BREAK;
            self.resuming_through_breakpoint = Some(ip);
            return Ok(None);
        }
        self.resuming_through_breakpoint = None;

        let instruction = self.current_context().unwrap().current_instruction()?;
        self.execute(&instruction)?;
        Ok(Some(StepOutcome { instruction }))
    }

    fn context_mut(&mut self) -> VmResult<&mut ExecutionContext> {
        self.invocation_stack
            .last_mut()
            .ok_or_else(|| VmError::invalid_operation_msg("no active execution context"))
    }

    fn execute(&mut self, instr: &Instruction) -> VmResult<()> {
        use OpCode::*;

        match instr.opcode {
            PUSH0 => self.push_and_advance(instr, StackItem::from_int(0))?,
            PUSHM1 => self.push_and_advance(instr, StackItem::from_int(-1))?,
            PUSH1 | PUSH2 | PUSH3 | PUSH4 | PUSH5 | PUSH6 | PUSH7 | PUSH8 | PUSH9 | PUSH10
            | PUSH11 | PUSH12 | PUSH13 | PUSH14 | PUSH15 | PUSH16 => {
                let n = instr.opcode as i64 - OpCode::PUSH1 as i64 + 1;
                self.push_and_advance(instr, StackItem::from_int(n))?;
            }
            PUSHBYTES | PUSHDATA1 | PUSHDATA2 | PUSHDATA4 => {
                self.push_and_advance(instr, StackItem::ByteArray(instr.operand.clone()))?;
            }
            NOP => self.advance(instr)?,

            JMP => {
                let target = self.jump_target(instr)?;
                self.context_mut()?.jump(target);
            }
            JMPIF | JMPIFNOT => {
                let cond = self.pop_bool()?;
                let take = if instr.opcode == JMPIF { cond } else { !cond };
                if take {
                    let target = self.jump_target(instr)?;
                    self.context_mut()?.jump(target);
                } else {
                    self.advance(instr)?;
                }
            }

            CALL | APPCALL | TAILCALL => {
                // Contract-to-contract resolution is out of scope; these
                // opcodes consume their operand/hash argument and fall
                // through, which is enough to exercise gas accounting for
                // scripts that reference them without a contract registry.
                if instr.opcode != CALL {
                    self.pop()?; // target script hash
                }
                self.advance(instr)?;
            }
            RET => self.do_ret()?,

            SYSCALL => {
                let name = instr.syscall_name()?;
                self.do_syscall(&name)?;
                self.advance(instr)?;
            }

            THROW => {
                self.state = VMState::FAULT;
            }
            THROWIFNOT => {
                if !self.pop_bool()? {
                    self.state = VMState::FAULT;
                } else {
                    self.advance(instr)?;
                }
            }

            TOALTSTACK => {
                let item = self.pop()?;
                self.context_mut()?.alt_stack_mut().push(item);
                self.advance(instr)?;
            }
            FROMALTSTACK => {
                let item = self.context_mut()?.alt_stack_mut().pop()?;
                self.push(item);
                self.advance(instr)?;
            }
            DUPFROMALTSTACK => {
                let item = self.context_mut()?.alt_stack().peek(0)?.clone();
                self.push(item);
                self.advance(instr)?;
            }

            DEPTH => {
                let len = self.eval_stack()?.len() as i64;
                self.push(StackItem::from_int(len));
                self.advance(instr)?;
            }
            DROP => {
                self.pop()?;
                self.advance(instr)?;
            }
            DUP => {
                let item = self.peek(0)?.clone();
                self.push(item);
                self.advance(instr)?;
            }
            NIP => {
                let top = self.pop()?;
                self.pop()?;
                self.push(top);
                self.advance(instr)?;
            }
            OVER => {
                let item = self.peek(1)?.clone();
                self.push(item);
                self.advance(instr)?;
            }
            SWAP => {
                let a = self.pop()?;
                let b = self.pop()?;
                self.push(a);
                self.push(b);
                self.advance(instr)?;
            }
            ROT => {
                let c = self.pop()?;
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(b);
                self.push(c);
                self.push(a);
                self.advance(instr)?;
            }
            TUCK => {
                let top = self.peek(0)?.clone();
                let stack = self.eval_stack_mut()?;
                let len = stack.len();
                if len < 2 {
                    return Err(VmError::stack_underflow(2, len));
                }
                // insert a copy of the top item two slots down
                let mut items: Vec<StackItem> = stack.iter_top_down().cloned().collect();
                items.insert(2, top);
                *stack = EvaluationStack::new();
                for item in items.into_iter().rev() {
                    stack.push(item);
                }
                self.advance(instr)?;
            }
            PICK => {
                let n = self.pop_int()?;
                let idx = n
                    .to_usize()
                    .ok_or_else(|| VmError::invalid_operation_msg("PICK index out of range"))?;
                let item = self.peek(idx)?.clone();
                self.push(item);
                self.advance(instr)?;
            }
            ROLL => {
                let n = self.pop_int()?;
                let idx = n
                    .to_usize()
                    .ok_or_else(|| VmError::invalid_operation_msg("ROLL index out of range"))?;
                let stack = self.eval_stack_mut()?;
                let mut items: Vec<StackItem> = stack.iter_top_down().cloned().collect();
                if idx >= items.len() {
                    return Err(VmError::stack_underflow(idx + 1, items.len()));
                }
                let picked = items.remove(idx);
                items.insert(0, picked);
                *stack = EvaluationStack::new();
                for item in items.into_iter().rev() {
                    stack.push(item);
                }
                self.advance(instr)?;
            }
            XDROP => {
                let n = self.pop_int()?;
                let idx = n
                    .to_usize()
                    .ok_or_else(|| VmError::invalid_operation_msg("XDROP index out of range"))?;
                let stack = self.eval_stack_mut()?;
                let mut items: Vec<StackItem> = stack.iter_top_down().cloned().collect();
                if idx >= items.len() {
                    return Err(VmError::stack_underflow(idx + 1, items.len()));
                }
                items.remove(idx);
                *stack = EvaluationStack::new();
                for item in items.into_iter().rev() {
                    stack.push(item);
                }
                self.advance(instr)?;
            }
            XSWAP => {
                let n = self.pop_int()?;
                let idx = n
                    .to_usize()
                    .ok_or_else(|| VmError::invalid_operation_msg("XSWAP index out of range"))?;
                let stack = self.eval_stack_mut()?;
                let mut items: Vec<StackItem> = stack.iter_top_down().cloned().collect();
                if idx >= items.len() {
                    return Err(VmError::stack_underflow(idx + 1, items.len()));
                }
                items.swap(0, idx);
                *stack = EvaluationStack::new();
                for item in items.into_iter().rev() {
                    stack.push(item);
                }
                self.advance(instr)?;
            }
            XTUCK => {
                let n = self.pop_int()?;
                let idx = n
                    .to_usize()
                    .ok_or_else(|| VmError::invalid_operation_msg("XTUCK index out of range"))?;
                let top = self.peek(0)?.clone();
                let stack = self.eval_stack_mut()?;
                if idx == 0 || idx >= stack.len() {
                    return Err(VmError::stack_underflow(idx + 1, stack.len()));
                }
                let mut items: Vec<StackItem> = stack.iter_top_down().cloned().collect();
                items.insert(idx, top);
                *stack = EvaluationStack::new();
                for item in items.into_iter().rev() {
                    stack.push(item);
                }
                self.advance(instr)?;
            }

            CAT => {
                let b = self.pop()?.as_bytes();
                let mut a = self.pop()?.as_bytes();
                a.extend_from_slice(&b);
                self.push(StackItem::ByteArray(a));
                self.advance(instr)?;
            }
            SIZE => {
                let len = self.peek(0)?.as_bytes().len() as i64;
                self.push(StackItem::from_int(len));
                self.advance(instr)?;
            }
            EQUAL => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(StackItem::Boolean(a == b));
                self.advance(instr)?;
            }

            ADD | SUB | MUL | DIV | MOD => {
                let b = self.pop_int()?;
                let a = self.pop_int()?;
                let result = match instr.opcode {
                    ADD => a + b,
                    SUB => a - b,
                    MUL => a * b,
                    DIV => {
                        if b.is_zero() {
                            return Err(VmError::invalid_operation_msg("division by zero"));
                        }
                        a / b
                    }
                    MOD => {
                        if b.is_zero() {
                            return Err(VmError::invalid_operation_msg("division by zero"));
                        }
                        a % b
                    }
                    _ => unreachable!(),
                };
                self.push(StackItem::Integer(result));
                self.advance(instr)?;
            }

            SHA1 | SHA256 | HASH160 | HASH256 => {
                let data = self.pop()?.as_bytes();
                let hashed = hash_bytes(instr.opcode, &data);
                self.push(StackItem::ByteArray(hashed));
                self.advance(instr)?;
            }
            CHECKSIG => {
                self.pop()?; // pubkey
                self.pop()?; // signature
                self.push(StackItem::Boolean(self.witness_mode.resolves_true()));
                self.advance(instr)?;
            }
            CHECKMULTISIG => {
                let n = self.pop_int()?.to_i64().unwrap_or(0).max(0);
                for _ in 0..n {
                    self.pop()?;
                }
                let m = self.pop_int()?.to_i64().unwrap_or(0).max(0);
                for _ in 0..m {
                    self.pop()?;
                }
                self.push(StackItem::Boolean(self.witness_mode.resolves_true()));
                self.advance(instr)?;
            }

            PACK => {
                let n = self.pop_int()?;
                let count = n
                    .to_usize()
                    .ok_or_else(|| VmError::invalid_operation_msg("PACK count out of range"))?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.pop()?);
                }
                self.push(StackItem::Array(items));
                self.advance(instr)?;
            }
            UNPACK => {
                let items = match self.pop()? {
                    StackItem::Array(items) => items,
                    other => {
                        return Err(VmError::invalid_type(other.type_name().to_string(), "Array".to_string()))
                    }
                };
                let len = items.len();
                for item in items.into_iter().rev() {
                    self.push(item);
                }
                self.push(StackItem::from_int(len as i64));
                self.advance(instr)?;
            }
            ARRAYSIZE => {
                let len = match self.peek(0)? {
                    StackItem::Array(items) => items.len() as i64,
                    other => other.as_bytes().len() as i64,
                };
                self.push(StackItem::from_int(len));
                self.advance(instr)?;
            }
            NEWARRAY | NEWSTRUCT => {
                let n = self.pop_int()?;
                let count = n
                    .to_usize()
                    .ok_or_else(|| VmError::invalid_operation_msg("NEWARRAY count out of range"))?;
                self.push(StackItem::Array(vec![StackItem::from_int(0); count]));
                self.advance(instr)?;
            }
            APPEND => {
                let item = self.pop()?;
                let array = self.pop()?;
                let mut items = match array {
                    StackItem::Array(items) => items,
                    other => return Err(VmError::invalid_type(other.type_name().to_string(), "Array".to_string())),
                };
                items.push(item);
                self.push(StackItem::Array(items));
                self.advance(instr)?;
            }
            REVERSE => {
                let array = self.pop()?;
                let mut items = match array {
                    StackItem::Array(items) => items,
                    other => return Err(VmError::invalid_type(other.type_name().to_string(), "Array".to_string())),
                };
                items.reverse();
                self.push(StackItem::Array(items));
                self.advance(instr)?;
            }
            PICKITEM => {
                let idx = self.pop_int()?;
                let array = self.pop()?;
                let items = match array {
                    StackItem::Array(items) => items,
                    other => return Err(VmError::invalid_type(other.type_name().to_string(), "Array".to_string())),
                };
                let idx = idx
                    .to_usize()
                    .filter(|i| *i < items.len())
                    .ok_or_else(|| VmError::invalid_operation_msg("PICKITEM index out of range"))?;
                self.push(items[idx].clone());
                self.advance(instr)?;
            }
            SETITEM => {
                let value = self.pop()?;
                let idx = self.pop_int()?;
                let array = self.pop()?;
                let mut items = match array {
                    StackItem::Array(items) => items,
                    other => return Err(VmError::invalid_type(other.type_name().to_string(), "Array".to_string())),
                };
                let idx = idx
                    .to_usize()
                    .filter(|i| *i < items.len())
                    .ok_or_else(|| VmError::invalid_operation_msg("SETITEM index out of range"))?;
                items[idx] = value;
                self.push(StackItem::Array(items));
                self.advance(instr)?;
            }

            other => {
                return Err(VmError::invalid_operation_msg(format!(
                    "opcode {other:?} is not executable by this engine"
                )))
            }
        }
        Ok(())
    }

    fn do_syscall(&mut self, name: &str) -> VmResult<()> {
        match name {
            "Neo.Storage.Put" | "System.Storage.Put" => {
                let value = self.pop()?.as_bytes();
                let key = self.pop()?.as_bytes();
                self.storage.put(&key, &value);
            }
            "Neo.Runtime.CheckWitness" | "System.Runtime.CheckWitness" => {
                self.pop()?; // script hash to check
                let invoker = self.invoker.current_invoker_script_hash();
                self.push(StackItem::Boolean(invoker != [0u8; 20]));
            }
            "Neo.Storage.Get" | "System.Storage.Get" => {
                let key = self.pop()?.as_bytes();
                let value = self.storage.get(&key).unwrap_or_default();
                self.push(StackItem::ByteArray(value));
            }
            // Unknown syscalls are priced by the gas table but have no
            // modeled side effect; this mirrors the stated non-goal of
            // reimplementing interop semantics in full.
            _ => {}
        }
        Ok(())
    }

    fn do_ret(&mut self) -> VmResult<()> {
        let mut ctx = self
            .invocation_stack
            .pop()
            .ok_or_else(|| VmError::invalid_operation_msg("RET with no active context"))?;
        let mut items = Vec::new();
        while let Ok(item) = ctx.evaluation_stack_mut().pop() {
            items.push(item);
        }
        items.reverse();

        if let Some(parent) = self.invocation_stack.last_mut() {
            for item in items {
                parent.evaluation_stack_mut().push(item);
            }
        } else {
            for item in items {
                self.result_stack.push(item);
            }
            self.state = VMState::HALT;
        }
        Ok(())
    }

    fn jump_target(&self, instr: &Instruction) -> VmResult<usize> {
        // Legacy AVM encodes JMP-family targets as a signed 2-byte
        // little-endian offset from the instruction's own position.
        let bytes = [
            *instr.operand.first().unwrap_or(&0),
            *instr.operand.get(1).unwrap_or(&0),
        ];
        let offset = i16::from_le_bytes(bytes) as isize;
        let target = instr.position as isize + offset;
        if target < 0 {
            return Err(VmError::invalid_operation_msg("jump target is negative"));
        }
        Ok(target as usize)
    }

    fn advance(&mut self, instr: &Instruction) -> VmResult<()> {
        self.context_mut()?.move_next(instr);
        Ok(())
    }

    fn push_and_advance(&mut self, instr: &Instruction, item: StackItem) -> VmResult<()> {
        self.push(item);
        self.advance(instr)
    }

    fn eval_stack(&self) -> VmResult<&EvaluationStack> {
        self.current_context()
            .map(|c| c.evaluation_stack())
            .ok_or_else(|| VmError::invalid_operation_msg("no active execution context"))
    }

    fn eval_stack_mut(&mut self) -> VmResult<&mut EvaluationStack> {
        self.context_mut().map(|c| c.evaluation_stack_mut())
    }

    fn push(&mut self, item: StackItem) {
        if let Some(ctx) = self.current_context_mut() {
            ctx.evaluation_stack_mut().push(item);
        }
    }

    fn pop(&mut self) -> VmResult<StackItem> {
        self.eval_stack_mut()?.pop()
    }

    fn peek(&self, n: usize) -> VmResult<&StackItem> {
        self.eval_stack()?.peek(n)
    }

    fn pop_int(&mut self) -> VmResult<BigInt> {
        match self.pop()? {
            StackItem::Integer(i) => Ok(i),
            other => Err(VmError::invalid_type(other.type_name().to_string(), "Integer".to_string())),
        }
    }

    fn pop_bool(&mut self) -> VmResult<bool> {
        match self.pop()? {
            StackItem::Boolean(b) => Ok(b),
            StackItem::Integer(i) => Ok(!i.is_zero()),
            other => Err(VmError::invalid_type(other.type_name().to_string(), "Boolean".to_string())),
        }
    }
}

fn hash_bytes(opcode: OpCode, data: &[u8]) -> Vec<u8> {
    use ripemd::Ripemd160;
    use sha2::{Digest, Sha1, Sha256};

    match opcode {
        OpCode::SHA1 => Sha1::digest(data).to_vec(),
        OpCode::SHA256 => Sha256::digest(data).to_vec(),
        OpCode::HASH160 => {
            let once = Sha256::digest(data);
            Ripemd160::digest(once).to_vec()
        }
        OpCode::HASH256 => {
            let once = Sha256::digest(data);
            Sha256::digest(once).to_vec()
        }
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script_builder::ScriptBuilder;

    #[test]
    fn push_then_ret_halts_with_result() {
        let mut builder = ScriptBuilder::new();
        builder.emit_push_int(&BigInt::from(1));
        builder.emit_opcode(OpCode::RET);
        let mut engine = VmEngine::new();
        engine.load_script(builder.to_script());

        engine.step_into().unwrap();
        engine.step_into().unwrap();

        assert!(engine.state().is_halt());
        assert_eq!(engine.result_stack().peek(0).unwrap().as_int(), Some(&BigInt::from(1)));
    }

    #[test]
    fn throw_faults() {
        let mut builder = ScriptBuilder::new();
        builder.emit_opcode(OpCode::THROW);
        let mut engine = VmEngine::new();
        engine.load_script(builder.to_script());

        engine.step_into().unwrap();
        assert!(engine.state().is_fault());
    }

    #[test]
    fn breakpoint_pauses_before_instruction_then_resumes() {
        let mut builder = ScriptBuilder::new();
        builder.emit_opcode(OpCode::NOP);
        builder.emit_opcode(OpCode::RET);
        let mut engine = VmEngine::new();
        engine.load_script(builder.to_script());
        engine.add_break_point(1);

        engine.step_into().unwrap(); // executes NOP at offset 0
        assert!(engine.state().is_runnable());
        assert_eq!(engine.current_context().unwrap().instruction_pointer(), 1);

        engine.state = VMState::NONE;
        let outcome = engine.step_into().unwrap();
        assert!(outcome.is_none());
        assert!(engine.state().is_break());

        engine.state = VMState::NONE;
        let outcome = engine.step_into().unwrap();
        assert!(outcome.is_some());
        assert!(engine.state().is_halt());
    }

    #[test]
    fn pack_builds_array_in_forward_order() {
        let mut builder = ScriptBuilder::new();
        builder.emit_push_int(&BigInt::from(30));
        builder.emit_push_int(&BigInt::from(20));
        builder.emit_push_int(&BigInt::from(10));
        builder.emit_push_int(&BigInt::from(3));
        builder.emit_opcode(OpCode::PACK);
        builder.emit_opcode(OpCode::RET);
        let mut engine = VmEngine::new();
        engine.load_script(builder.to_script());

        while engine.state().is_runnable() {
            engine.step_into().unwrap();
        }

        match engine.result_stack().peek(0).unwrap() {
            StackItem::Array(items) => {
                let values: Vec<i64> = items.iter().map(|i| i.as_int().unwrap().to_i64().unwrap()).collect();
                assert_eq!(values, vec![10, 20, 30]);
            }
            other => panic!("expected array, got {other:?}"),
        }
    }
}
