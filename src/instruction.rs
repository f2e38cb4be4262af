//! Instruction decoding for the embedded stack-machine engine.

use crate::error::{VmError, VmResult};
use crate::op_code::OpCode;

/// A single decoded instruction: its opcode, its position in the script,
/// and any operand bytes (push payload or SYSCALL name).
#[derive(Debug, Clone)]
pub struct Instruction {
    /// Offset of the opcode byte within the script.
    pub position: usize,
    /// The decoded opcode.
    pub opcode: OpCode,
    /// Operand bytes, meaning depends on `opcode`:
    /// - push opcodes: the literal bytes to push
    /// - `SYSCALL`: the UTF-8 syscall name
    /// - everything else: empty
    pub operand: Vec<u8>,
    /// Total length of this instruction (opcode byte + any length prefix + operand).
    pub size: usize,
}

impl Instruction {
    /// Decodes the instruction starting at `position` in `script`.
    pub fn parse(script: &[u8], position: usize) -> VmResult<Self> {
        if position >= script.len() {
            return Err(VmError::parse("instruction position out of bounds"));
        }

        let raw = script[position];
        let opcode = OpCode::try_from(raw)?;

        let (operand, size) = match opcode {
            OpCode::PUSHBYTES => {
                let len = raw as usize;
                let start = position + 1;
                let end = start + len;
                if end > script.len() {
                    return Err(VmError::parse(format!(
                        "push-bytes operand exceeds script bounds at {position}"
                    )));
                }
                (script[start..end].to_vec(), 1 + len)
            }
            OpCode::PUSHDATA1 => {
                let len_pos = position + 1;
                let len = *script
                    .get(len_pos)
                    .ok_or_else(|| VmError::parse("PUSHDATA1 missing length byte"))?
                    as usize;
                let start = len_pos + 1;
                let end = start + len;
                if end > script.len() {
                    return Err(VmError::parse("PUSHDATA1 operand exceeds script bounds"));
                }
                (script[start..end].to_vec(), 2 + len)
            }
            OpCode::PUSHDATA2 => {
                let start_len = position + 1;
                if start_len + 2 > script.len() {
                    return Err(VmError::parse("PUSHDATA2 missing length bytes"));
                }
                let len = u16::from_le_bytes([script[start_len], script[start_len + 1]]) as usize;
                let start = start_len + 2;
                let end = start + len;
                if end > script.len() {
                    return Err(VmError::parse("PUSHDATA2 operand exceeds script bounds"));
                }
                (script[start..end].to_vec(), 3 + len)
            }
            OpCode::PUSHDATA4 => {
                let start_len = position + 1;
                if start_len + 4 > script.len() {
                    return Err(VmError::parse("PUSHDATA4 missing length bytes"));
                }
                let len = u32::from_le_bytes([
                    script[start_len],
                    script[start_len + 1],
                    script[start_len + 2],
                    script[start_len + 3],
                ]) as usize;
                let start = start_len + 4;
                let end = start + len;
                if end > script.len() {
                    return Err(VmError::parse("PUSHDATA4 operand exceeds script bounds"));
                }
                (script[start..end].to_vec(), 5 + len)
            }
            OpCode::JMP | OpCode::JMPIF | OpCode::JMPIFNOT | OpCode::CALL => {
                let start = position + 1;
                let end = start + 2;
                if end > script.len() {
                    return Err(VmError::parse(format!(
                        "{opcode:?} missing 2-byte offset operand at {position}"
                    )));
                }
                (script[start..end].to_vec(), 3)
            }
            OpCode::SYSCALL => {
                let len_pos = position + 1;
                let len = *script
                    .get(len_pos)
                    .ok_or_else(|| VmError::parse("SYSCALL missing length byte"))?
                    as usize;
                let start = len_pos + 1;
                let end = start + len;
                if end > script.len() {
                    return Err(VmError::parse("SYSCALL operand exceeds script bounds"));
                }
                (script[start..end].to_vec(), 2 + len)
            }
            _ => (Vec::new(), 1),
        };

        Ok(Instruction {
            position,
            opcode,
            operand,
            size,
        })
    }

    /// Returns the syscall name for a `SYSCALL` instruction.
    pub fn syscall_name(&self) -> VmResult<String> {
        if self.opcode != OpCode::SYSCALL {
            return Err(VmError::invalid_operation_msg(
                "syscall_name called on a non-SYSCALL instruction",
            ));
        }
        String::from_utf8(self.operand.clone())
            .map_err(|_| VmError::parse("syscall name is not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_push_bytes() {
        let script = [0x03u8, 0x01, 0x02, 0x03];
        let instr = Instruction::parse(&script, 0).unwrap();
        assert_eq!(instr.opcode, OpCode::PUSHBYTES);
        assert_eq!(instr.operand, vec![1, 2, 3]);
        assert_eq!(instr.size, 4);
    }

    #[test]
    fn decodes_syscall_name() {
        let name = b"Neo.Storage.Put";
        let mut script = vec![OpCode::SYSCALL as u8, name.len() as u8];
        script.extend_from_slice(name);
        let instr = Instruction::parse(&script, 0).unwrap();
        assert_eq!(instr.syscall_name().unwrap(), "Neo.Storage.Put");
    }

    #[test]
    fn rejects_out_of_bounds_operand() {
        let script = [OpCode::PUSHDATA1 as u8, 0x05];
        assert!(Instruction::parse(&script, 0).is_err());
    }
}
