//! A single call frame of the embedded VM engine.

use crate::error::{VmError, VmResult};
use crate::evaluation_stack::EvaluationStack;
use crate::instruction::Instruction;
use crate::script::Script;
use std::sync::Arc;

/// One entry in the VM's call-frame chain: a script, its instruction
/// pointer, and the evaluation/alt stacks private to this invocation.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    script: Arc<Script>,
    instruction_pointer: usize,
    evaluation_stack: EvaluationStack,
    alt_stack: EvaluationStack,
}

impl ExecutionContext {
    /// Creates a new context at the start of `script`.
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(script),
            instruction_pointer: 0,
            evaluation_stack: EvaluationStack::new(),
            alt_stack: EvaluationStack::new(),
        }
    }

    /// Returns the script this context is executing.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Returns the current instruction pointer.
    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    /// Returns the evaluation stack.
    pub fn evaluation_stack(&self) -> &EvaluationStack {
        &self.evaluation_stack
    }

    /// Returns the evaluation stack, mutably.
    pub fn evaluation_stack_mut(&mut self) -> &mut EvaluationStack {
        &mut self.evaluation_stack
    }

    /// Returns the alt stack, mutably.
    pub fn alt_stack_mut(&mut self) -> &mut EvaluationStack {
        &mut self.alt_stack
    }

    /// Returns the alt stack.
    pub fn alt_stack(&self) -> &EvaluationStack {
        &self.alt_stack
    }

    /// Decodes the instruction at the current instruction pointer.
    pub fn current_instruction(&self) -> VmResult<Instruction> {
        if self.instruction_pointer >= self.script.len() {
            return Err(VmError::InstructionPointerOutOfRange {
                ip: self.instruction_pointer,
                len: self.script.len(),
            });
        }
        Instruction::parse(self.script.as_bytes(), self.instruction_pointer)
    }

    /// Advances the instruction pointer past `instruction`.
    pub fn move_next(&mut self, instruction: &Instruction) {
        self.instruction_pointer = instruction.position + instruction.size;
    }

    /// Sets the instruction pointer directly (used for `JMP`-family opcodes).
    pub fn jump(&mut self, position: usize) {
        self.instruction_pointer = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_starts_at_zero() {
        let ctx = ExecutionContext::new(Script::new(vec![0x61]));
        assert_eq!(ctx.instruction_pointer(), 0);
    }

    #[test]
    fn move_next_advances_past_operand() {
        let mut ctx = ExecutionContext::new(Script::new(vec![0x03, 1, 2, 3, 0x61]));
        let instr = ctx.current_instruction().unwrap();
        ctx.move_next(&instr);
        assert_eq!(ctx.instruction_pointer(), 4);
    }
}
