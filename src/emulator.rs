//! The stepping engine (C5) and public emulator facade (C7).
//!
//! This is where every other module gets wired together: the argument
//! marshaller stages a contract's inputs, the gas table prices each
//! instruction the embedded engine executes, the variable tracker
//! refreshes source-level bindings as stepping proceeds, and the
//! breakpoint set pauses it — all driven by the `Reset -> Running ->
//! Break/Finished/Exception` state machine a debugger UI expects.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use crate::abi::Abi;
use crate::breakpoints::BreakpointSet;
use crate::collaborators::{DefaultInvokerContext, InvokerContext};
use crate::debugger_state::{DebuggerState, DebuggerStateKind};
use crate::error::{EmulatorError, EmulatorResult};
use crate::gas;
use crate::marshaller;
use crate::op_code::OpCode;
use crate::param_tree::ParamTree;
use crate::script::Script;
use crate::session::{self, SessionToken};
use crate::stack_item::StackItem;
use crate::transaction::{self, Blockchain, Transaction};
use crate::variables::VariableTracker;
use crate::vm_engine::VmEngine;

/// VM execution trigger mode (see GLOSSARY: "Trigger").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trigger {
    #[default]
    Application,
    Verification,
}

/// Per-step observation emitted through `on_step`, once per successfully
/// executed instruction, in program order, before the corresponding
/// `DebuggerState` is returned from `step`/`run`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
pub struct StepInfo {
    pub bytecode_slice: Vec<u8>,
    pub offset: usize,
    pub opcode: OpCode,
    pub gas_cost: Decimal,
    pub syscall_name: Option<String>,
}

type OnStep = Box<dyn FnMut(&StepInfo) + Send>;

/// One debug session's state: the embedded VM engine plus everything the
/// stepping engine consults or updates around it. Exclusively owned by the
/// `Emulator` facade that wraps it; see [`crate::session`] for how a VM
/// engine handle navigates back to this.
pub struct EmulatorCore {
    contract_bytecode: Option<Vec<u8>>,
    vm: VmEngine,
    breakpoints: BreakpointSet,
    last_state: DebuggerState,
    used_gas: Decimal,
    used_opcode_count: u64,
    trigger: Trigger,
    timestamp: u32,
    variables: VariableTracker,
    abi: Option<Abi>,
    blockchain: Box<dyn Blockchain>,
    invoker: Arc<dyn InvokerContext>,
    current_transaction: Option<Transaction>,
    on_step: Option<OnStep>,
}

impl EmulatorCore {
    /// Creates a session backed by `blockchain`, with the default
    /// (20-zero-byte) invoker context.
    pub fn new(blockchain: Box<dyn Blockchain>) -> Self {
        Self::with_invoker(blockchain, Arc::new(DefaultInvokerContext))
    }

    /// Creates a session backed by `blockchain`, with an injected invoker
    /// context — e.g. a real blockchain-backed implementation answering
    /// "who is calling?" in production.
    pub fn with_invoker(blockchain: Box<dyn Blockchain>, invoker: Arc<dyn InvokerContext>) -> Self {
        let mut vm = VmEngine::new();
        vm.set_invoker(Box::new(Arc::clone(&invoker)));
        Self {
            contract_bytecode: None,
            vm,
            breakpoints: BreakpointSet::new(),
            last_state: DebuggerState::invalid(),
            used_gas: Decimal::ZERO,
            used_opcode_count: 0,
            trigger: Trigger::default(),
            timestamp: 0,
            variables: VariableTracker::new(),
            abi: None,
            blockchain,
            invoker,
            current_transaction: None,
            on_step: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn new_for_test() -> Self {
        Self::new(Box::new(crate::transaction::InMemoryBlockchain::default()))
    }

    /// Binds the compiled contract this session will debug.
    pub fn set_executing_account(&mut self, bytecode: Vec<u8>) {
        self.contract_bytecode = Some(bytecode);
    }

    /// Registers a breakpoint at `offset`, or removes it.
    pub fn set_breakpoint(&mut self, offset: usize, enabled: bool) {
        if enabled {
            self.breakpoints.add(offset);
        } else {
            self.breakpoints.remove(offset);
        }
    }

    /// Registers a static source-level assignment. Must happen before
    /// `reset` to take effect for that session.
    pub fn register_assignment(&mut self, offset: usize, name: impl Into<String>, declared_type: impl Into<String>) {
        self.variables.register_assignment(offset, name, declared_type);
    }

    pub fn set_trigger(&mut self, trigger: Trigger) {
        self.trigger = trigger;
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn set_timestamp(&mut self, timestamp: u32) {
        self.timestamp = timestamp;
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn set_witness_mode(&mut self, mode: crate::vm_engine::WitnessMode) {
        self.vm.set_witness_mode(mode);
    }

    /// Registers the observer invoked after each successfully executed
    /// instruction. Single-subscriber, matching the design notes.
    pub fn set_on_step(&mut self, callback: OnStep) {
        self.on_step = Some(callback);
    }

    /// Builds the synthetic transaction/block a script executes against
    /// (C6). The second output's amount preserves the source's own
    /// placeholder formula verbatim, including both of its documented
    /// quirks: it is not drawn from the blockchain's actual balance, and
    /// it can go negative when `amount` exceeds the synthesized total.
    pub fn set_transaction(&mut self, asset_id: Vec<u8>, amount: i128) {
        let source = self.invoker.current_invoker_script_hash();
        let tx = transaction::set_transaction(
            self.blockchain.as_mut(),
            asset_id,
            amount,
            transaction::CURRENT_HASH_PLACEHOLDER,
            source,
        );
        self.current_transaction = Some(tx);
    }

    /// Rebuilds the embedded VM: loads the contract and a freshly lowered
    /// argument prelude, re-registers breakpoints, rewrites any pending
    /// transaction's placeholder output, and seeds entry-point variables.
    ///
    /// Idempotent when already in `Reset`, per the facade contract: calling
    /// it again simply rebuilds the session from scratch.
    pub fn reset(&mut self, inputs: &[ParamTree], abi: Abi) -> EmulatorResult<DebuggerState> {
        let bytecode = self
            .contract_bytecode
            .clone()
            .ok_or(EmulatorError::BytecodeMissing)?;
        let contract_script = Script::new(bytecode);
        let contract_hash = contract_script.hash();

        let mut prelude_bytes = marshaller::lower(inputs).as_bytes().to_vec();
        prelude_bytes.push(OpCode::RET as u8);
        let prelude_script = Script::new(prelude_bytes);

        self.vm.load_script_with_prelude(contract_script, prelude_script);
        self.vm.clear_break_points();
        for offset in self.breakpoints.iter() {
            self.vm.add_break_point(offset);
        }

        // The source comment flags this as a suspicious-looking but
        // intentionally preserved lifecycle quirk: the transaction is
        // rewritten against the now-known contract hash, then cleared,
        // even though the VM may still hold references derived from it.
        if let Some(tx) = self.current_transaction.as_mut() {
            transaction::rewrite_current_hash(tx, contract_hash);
        }
        self.current_transaction = None;

        self.used_gas = Decimal::ZERO;
        self.used_opcode_count = 0;
        self.variables.clear_variables();
        self.abi = Some(abi);

        self.bootstrap();

        self.last_state = DebuggerState::new(DebuggerStateKind::Reset, 0);
        log::debug!(
            "emulator reset: contract hash {}",
            contract_hash.iter().map(|b| format!("{b:02x}")).collect::<String>()
        );
        Ok(self.last_state)
    }

    /// Runs the argument prelude to completion against the embedded
    /// engine, invisibly to gas/opcode accounting, then seeds entry-point
    /// variables. This is the "skip the prelude's initial call-frame
    /// entry" step from the stepping procedure, performed once during
    /// `reset` rather than deferred to the first `step` call — see
    /// SPEC_FULL.md for why.
    fn bootstrap(&mut self) {
        let starting_depth = self.vm.invocation_depth();
        while self.vm.invocation_depth() >= starting_depth {
            if !self.vm.state().is_runnable() {
                break;
            }
            match self.vm.step_into() {
                Ok(_) => {}
                Err(_) => break,
            }
            if self.vm.invocation_depth() < starting_depth {
                break;
            }
        }
        self.seed_entry_point_variables();
    }

    fn seed_entry_point_variables(&mut self) {
        let Some(entry) = self.abi.as_ref().and_then(|abi| abi.entry_point.as_ref()) else {
            return;
        };
        for (i, param) in entry.inputs.iter().enumerate() {
            let Some(ctx) = self.vm.current_context() else {
                break;
            };
            match ctx.evaluation_stack().peek(i) {
                Ok(value) => {
                    let value = value.clone();
                    self.variables.record(&param.name, value, &param.declared_type);
                }
                Err(_) => break,
            }
        }
    }

    /// Advances the VM exactly one instruction, updating gas/opcode
    /// counters and variable bindings, and returns the resulting state.
    /// No-op, returning the same state, once `last_state` is absorbing.
    pub fn step(&mut self) -> DebuggerState {
        if self.last_state.kind.is_absorbing() {
            return self.last_state;
        }

        let outcome = if self.vm.state().is_runnable() {
            self.vm.step_into()
        } else {
            Ok(None)
        };

        let stale_offset = self
            .vm
            .current_context()
            .map(|c| c.instruction_pointer())
            .unwrap_or(self.last_state.offset);

        match outcome {
            Ok(Some(step_outcome)) => {
                let instr = step_outcome.instruction;
                let syscall_name = if instr.opcode == OpCode::SYSCALL {
                    instr.syscall_name().ok()
                } else {
                    None
                };

                if self.vm.state().is_runnable() {
                    if let Some(ctx) = self.vm.current_context() {
                        let ip = ctx.instruction_pointer();
                        if let Some(assignment) = self.variables.assignment_at(ip).cloned() {
                            if let Ok(value) = ctx.evaluation_stack().peek(0) {
                                let value = value.clone();
                                self.variables
                                    .record(&assignment.name, value, &assignment.declared_type);
                            }
                        }
                    }
                }

                let gas_cost = if instr.opcode == OpCode::SYSCALL {
                    let name = syscall_name.clone().unwrap_or_default();
                    gas::syscall_cost(&name, self.vm.storage().last_storage_payload_bytes())
                } else {
                    gas::opcode_cost(instr.opcode)
                };
                self.used_gas += gas_cost;
                self.used_opcode_count += 1;

                let step_info = StepInfo {
                    bytecode_slice: self
                        .vm
                        .current_context()
                        .map(|c| c.script().as_bytes().to_vec())
                        .unwrap_or_default(),
                    offset: instr.position,
                    opcode: instr.opcode,
                    gas_cost,
                    syscall_name,
                };
                log::trace!(
                    "step: offset={} opcode={:?} gas_cost={}",
                    step_info.offset,
                    step_info.opcode,
                    step_info.gas_cost
                );
                if let Some(cb) = self.on_step.as_mut() {
                    cb(&step_info);
                }

                self.finish_step(instr.position)
            }
            Ok(None) => self.finish_step(stale_offset),
            Err(_) => {
                // An embedded-engine execution error (e.g. stack underflow)
                // is reified as a VM fault rather than propagated, per the
                // documented error policy.
                self.vm.force_fault();
                self.finish_step(stale_offset)
            }
        }
    }

    fn finish_step(&mut self, offset: usize) -> DebuggerState {
        let kind = if self.vm.state().is_fault() {
            log::debug!("emulator exception at offset {offset}");
            DebuggerStateKind::Exception
        } else if self.vm.state().is_break() {
            self.vm.clear_break_flag();
            DebuggerStateKind::Break
        } else if self.vm.state().is_halt() {
            DebuggerStateKind::Finished
        } else {
            DebuggerStateKind::Running
        };
        self.last_state = DebuggerState::new(kind, offset);
        self.last_state
    }

    /// Repeats `step` until the returned state is no longer `Running`.
    pub fn run(&mut self) -> DebuggerState {
        loop {
            let state = self.step();
            if state.kind != DebuggerStateKind::Running {
                return state;
            }
        }
    }

    /// Peeks the top of the evaluation stack after a successful `Finished`.
    pub fn get_output(&self) -> Option<StackItem> {
        self.vm.result_stack().peek(0).ok().cloned()
    }

    /// A snapshot of the current frame's evaluation stack, top-down.
    /// Recomputed fresh on each call ("restartable" per the facade
    /// contract: no shared cursor survives between calls).
    pub fn evaluation_stack(&self) -> Vec<StackItem> {
        self.vm
            .current_context()
            .map(|c| c.evaluation_stack().iter_top_down().cloned().collect())
            .unwrap_or_default()
    }

    /// A snapshot of the current frame's alt stack, top-down.
    pub fn alt_stack(&self) -> Vec<StackItem> {
        self.vm
            .current_context()
            .map(|c| c.alt_stack().iter_top_down().cloned().collect())
            .unwrap_or_default()
    }

    /// The current frame's script bytes, or `None` if no frame is active
    /// (e.g. after the session has finished and its invocation stack has
    /// emptied).
    pub fn executing_bytecode(&self) -> Option<Vec<u8>> {
        self.vm.current_context().map(|c| c.script().as_bytes().to_vec())
    }

    /// Looks up a tracked variable's current value and declared type.
    pub fn get_variable(&self, name: &str) -> Option<(StackItem, String)> {
        self.variables
            .get(name)
            .map(|v| (v.value.clone(), v.declared_type.clone()))
    }

    pub fn used_gas(&self) -> Decimal {
        self.used_gas
    }

    pub fn used_opcode_count(&self) -> u64 {
        self.used_opcode_count
    }

    pub fn last_state(&self) -> DebuggerState {
        self.last_state
    }
}

/// The public emulator facade (C7): a cheaply-clonable handle to one debug
/// session. Cloning shares the same underlying [`EmulatorCore`] — this is
/// what lets a VM engine's `owning_emulator()` hand back a live handle
/// rather than a snapshot.
#[derive(Clone)]
pub struct Emulator {
    token: SessionToken,
    core: Arc<Mutex<EmulatorCore>>,
}

impl Emulator {
    /// Creates a fresh debug session backed by `blockchain`.
    pub fn new(blockchain: Box<dyn Blockchain>) -> Self {
        Self::with_invoker(blockchain, Arc::new(DefaultInvokerContext))
    }

    /// Creates a fresh debug session with an injected invoker context.
    pub fn with_invoker(blockchain: Box<dyn Blockchain>, invoker: Arc<dyn InvokerContext>) -> Self {
        let token = session::allocate_token();
        let mut core = EmulatorCore::with_invoker(blockchain, invoker);
        core.vm.set_session_token(token);
        let core = Arc::new(Mutex::new(core));
        session::register(token, &core);
        Self { token, core }
    }

    /// This session's stable token, e.g. for correlating log lines across
    /// a VM engine callback and the owning facade.
    pub fn token(&self) -> SessionToken {
        self.token
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EmulatorCore> {
        self.core.lock().expect("emulator session mutex poisoned")
    }

    pub fn set_executing_account(&self, bytecode: Vec<u8>) {
        self.lock().set_executing_account(bytecode);
    }

    pub fn set_breakpoint(&self, offset: usize, enabled: bool) {
        self.lock().set_breakpoint(offset, enabled);
    }

    pub fn register_assignment(&self, offset: usize, name: impl Into<String>, declared_type: impl Into<String>) {
        self.lock().register_assignment(offset, name, declared_type);
    }

    pub fn set_trigger(&self, trigger: Trigger) {
        self.lock().set_trigger(trigger);
    }

    pub fn set_timestamp(&self, timestamp: u32) {
        self.lock().set_timestamp(timestamp);
    }

    pub fn set_witness_mode(&self, mode: crate::vm_engine::WitnessMode) {
        self.lock().set_witness_mode(mode);
    }

    pub fn set_on_step(&self, callback: OnStep) {
        self.lock().set_on_step(callback);
    }

    pub fn set_transaction(&self, asset_id: Vec<u8>, amount: i128) {
        self.lock().set_transaction(asset_id, amount);
    }

    pub fn reset(&self, inputs: &[ParamTree], abi: Abi) -> EmulatorResult<DebuggerState> {
        self.lock().reset(inputs, abi)
    }

    pub fn step(&self) -> DebuggerState {
        self.lock().step()
    }

    pub fn run(&self) -> DebuggerState {
        self.lock().run()
    }

    pub fn get_output(&self) -> Option<StackItem> {
        self.lock().get_output()
    }

    pub fn evaluation_stack(&self) -> Vec<StackItem> {
        self.lock().evaluation_stack()
    }

    pub fn alt_stack(&self) -> Vec<StackItem> {
        self.lock().alt_stack()
    }

    pub fn executing_bytecode(&self) -> Option<Vec<u8>> {
        self.lock().executing_bytecode()
    }

    pub fn get_variable(&self, name: &str) -> Option<(StackItem, String)> {
        self.lock().get_variable(name)
    }

    pub fn used_gas(&self) -> Decimal {
        self.lock().used_gas()
    }

    pub fn used_opcode_count(&self) -> u64 {
        self.lock().used_opcode_count()
    }

    pub fn last_state(&self) -> DebuggerState {
        self.lock().last_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{Abi, EntryPoint, Parameter};
    use crate::op_code::OpCode;
    use crate::script_builder::ScriptBuilder;
    use crate::transaction::InMemoryBlockchain;
    use num_bigint::BigInt;

    fn empty_abi() -> Abi {
        Abi::with_entry_point(EntryPoint {
            name: "Main".into(),
            inputs: vec![],
        })
    }

    fn emulator() -> Emulator {
        let _ = env_logger::builder().is_test(true).try_init();
        Emulator::new(Box::new(InMemoryBlockchain::default()))
    }

    #[test]
    fn reset_without_executing_account_fails() {
        let em = emulator();
        let err = em.reset(&[], empty_abi());
        assert!(matches!(err, Err(EmulatorError::BytecodeMissing)));
    }

    #[test]
    fn reset_clears_used_gas_to_zero() {
        let em = emulator();
        let mut b = ScriptBuilder::new();
        b.emit_push_int(&BigInt::from(1));
        b.emit_opcode(OpCode::RET);
        em.set_executing_account(b.to_script().as_bytes().to_vec());
        em.reset(&[], empty_abi()).unwrap();
        assert_eq!(em.used_gas(), Decimal::ZERO);
    }

    #[test]
    fn empty_args_entry_runs_to_finished() {
        let em = emulator();
        let mut b = ScriptBuilder::new();
        b.emit_opcode(OpCode::PUSH1);
        b.emit_opcode(OpCode::RET);
        em.set_executing_account(b.to_script().as_bytes().to_vec());
        em.reset(&[], empty_abi()).unwrap();

        let state = em.run();
        assert_eq!(state.kind, DebuggerStateKind::Finished);
        assert_eq!(em.get_output(), Some(StackItem::from_int(1)));
        // PUSH1 costs 0, RET costs the default 0.001; both count toward
        // used_opcode_count (see SPEC_FULL.md's resolution of the
        // scenario-vs-invariant conflict).
        assert_eq!(em.used_opcode_count(), 2);
        assert_eq!(em.used_gas(), rust_decimal_macros::dec!(0.001));
    }

    #[test]
    fn single_integer_argument_is_seeded_after_reset() {
        let em = emulator();
        let mut b = ScriptBuilder::new();
        b.emit_opcode(OpCode::RET);
        em.set_executing_account(b.to_script().as_bytes().to_vec());

        let abi = Abi::with_entry_point(EntryPoint {
            name: "add1".into(),
            inputs: vec![Parameter {
                name: "n".into(),
                declared_type: "Integer".into(),
            }],
        });
        em.reset(&[ParamTree::Numeric("5".into())], abi).unwrap();

        let (value, _) = em.get_variable("n").expect("n should be seeded");
        assert_eq!(value, StackItem::from_int(5));
    }

    #[test]
    fn breakpoint_produces_exactly_one_break_then_resumes() {
        let em = emulator();
        let mut b = ScriptBuilder::new();
        b.emit_opcode(OpCode::NOP); // offset 0, in the contract after the bootstrap
        b.emit_opcode(OpCode::NOP); // offset 1 <- breakpoint
        b.emit_opcode(OpCode::RET); // offset 2
        em.set_executing_account(b.to_script().as_bytes().to_vec());
        em.set_breakpoint(1, true);
        em.reset(&[], empty_abi()).unwrap();

        let state = em.run();
        assert_eq!(state.kind, DebuggerStateKind::Break);
        assert_eq!(state.offset, 1);

        let state = em.run();
        assert_eq!(state.kind, DebuggerStateKind::Finished);
    }

    #[test]
    fn fault_is_absorbing() {
        let em = emulator();
        let mut b = ScriptBuilder::new();
        b.emit_opcode(OpCode::THROW);
        em.set_executing_account(b.to_script().as_bytes().to_vec());
        em.reset(&[], empty_abi()).unwrap();

        let first = em.run();
        assert_eq!(first.kind, DebuggerStateKind::Exception);
        let second = em.step();
        assert_eq!(second, first);
    }

    #[test]
    fn storage_put_scales_gas_by_payload_size() {
        let em = emulator();
        let mut b = ScriptBuilder::new();
        // key, value, SYSCALL Neo.Storage.Put
        b.emit_push_bytes(&[1u8]);
        b.emit_push_bytes(&vec![0u8; 2048]);
        b.emit_syscall("Neo.Storage.Put");
        b.emit_opcode(OpCode::RET);
        em.set_executing_account(b.to_script().as_bytes().to_vec());
        em.reset(&[], empty_abi()).unwrap();

        let state = em.run();
        assert_eq!(state.kind, DebuggerStateKind::Finished);
        assert_eq!(em.used_gas(), rust_decimal_macros::dec!(2.001));
    }

    #[test]
    fn byte_array_argument_marshals_into_an_array_on_the_stack() {
        let em = emulator();
        let mut b = ScriptBuilder::new();
        b.emit_opcode(OpCode::RET);
        em.set_executing_account(b.to_script().as_bytes().to_vec());

        let tree = ParamTree::Composite(vec![
            ParamTree::Numeric("10".into()),
            ParamTree::Numeric("20".into()),
            ParamTree::Numeric("30".into()),
        ]);
        em.reset(std::slice::from_ref(&tree), empty_abi()).unwrap();

        match em.evaluation_stack().first() {
            Some(StackItem::Array(items)) => {
                assert_eq!(items.len(), 3);
            }
            other => panic!("expected array at top of stack, got {other:?}"),
        }
    }

    #[test]
    fn vm_engine_resolves_back_to_its_owning_emulator() {
        let em = emulator();
        let mut b = ScriptBuilder::new();
        b.emit_opcode(OpCode::RET);
        em.set_executing_account(b.to_script().as_bytes().to_vec());
        em.reset(&[], empty_abi()).unwrap();

        let resolved = {
            let core = em.lock();
            core.vm.owning_emulator()
        };
        assert!(resolved.is_some());
    }
}
