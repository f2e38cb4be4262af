//! Programmatic construction of VM scripts.
//!
//! The argument marshaller (see [`crate::marshaller`]) is the main consumer:
//! it lowers a [`crate::param_tree::ParamTree`] into a prelude script by
//! driving a `ScriptBuilder`.

use crate::op_code::OpCode;
use crate::script::Script;

/// Incrementally builds up the bytes of a VM script.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self { script: Vec::new() }
    }

    /// Emits a raw byte.
    pub fn emit(&mut self, byte: u8) -> &mut Self {
        self.script.push(byte);
        self
    }

    /// Emits an opcode.
    pub fn emit_opcode(&mut self, op: OpCode) -> &mut Self {
        self.script.push(op as u8);
        self
    }

    /// Emits a push of arbitrary bytes, picking the shortest legacy
    /// encoding: a direct 1-byte length prefix for payloads up to 75 bytes,
    /// otherwise `PUSHDATA1/2/4` depending on size.
    pub fn emit_push_bytes(&mut self, data: &[u8]) -> &mut Self {
        let len = data.len();
        if len <= 0x4B {
            self.emit(len as u8);
        } else if len <= 0xFF {
            self.emit_opcode(OpCode::PUSHDATA1);
            self.emit(len as u8);
        } else if len <= 0xFFFF {
            self.emit_opcode(OpCode::PUSHDATA2);
            self.emit((len & 0xFF) as u8);
            self.emit(((len >> 8) & 0xFF) as u8);
        } else {
            self.emit_opcode(OpCode::PUSHDATA4);
            for shift in [0, 8, 16, 24] {
                self.emit(((len >> shift) & 0xFF) as u8);
            }
        }
        self.script.extend_from_slice(data);
        self
    }

    /// Emits a push of a big integer, using the `PUSHM1`/`PUSH0..PUSH16`
    /// constant opcodes when the value fits, otherwise falling back to a
    /// little-endian signed byte-array push.
    pub fn emit_push_int(&mut self, value: &num_bigint::BigInt) -> &mut Self {
        use num_traits::ToPrimitive;

        if let Some(small) = value.to_i64() {
            if (-1..=16).contains(&small) {
                let opcode = if small == -1 {
                    OpCode::PUSHM1 as u8
                } else {
                    OpCode::PUSH0 as u8 + small as u8
                };
                return self.emit(opcode);
            }
        }
        self.emit_push_bytes(&value.to_signed_bytes_le())
    }

    /// Emits a push of a boolean as `PUSH1`/`PUSH0`.
    pub fn emit_push_bool(&mut self, value: bool) -> &mut Self {
        self.emit_opcode(if value { OpCode::PUSH1 } else { OpCode::PUSH0 })
    }

    /// Emits a push of a UTF-8 string as a byte-array push.
    pub fn emit_push_string(&mut self, value: &str) -> &mut Self {
        self.emit_push_bytes(value.as_bytes())
    }

    /// Emits a `SYSCALL` instruction for the named syscall.
    pub fn emit_syscall(&mut self, name: &str) -> &mut Self {
        let bytes = name.as_bytes();
        debug_assert!(bytes.len() <= 252, "syscall name too long: {name}");
        self.emit_opcode(OpCode::SYSCALL);
        self.emit(bytes.len() as u8);
        self.script.extend_from_slice(bytes);
        self
    }

    /// Finalizes the builder into an immutable [`Script`].
    pub fn to_script(&self) -> Script {
        Script::new(self.script.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn small_integers_use_constant_opcodes() {
        let mut b = ScriptBuilder::new();
        b.emit_push_int(&BigInt::from(5));
        assert_eq!(b.to_script().as_bytes(), &[OpCode::PUSH5 as u8]);
    }

    #[test]
    fn large_integers_fall_back_to_byte_push() {
        let mut b = ScriptBuilder::new();
        b.emit_push_int(&BigInt::from(1000));
        let bytes = b.to_script().as_bytes().to_vec();
        assert_eq!(bytes[0] as usize, bytes.len() - 1);
    }

    #[test]
    fn syscall_encodes_name_length_prefix() {
        let mut b = ScriptBuilder::new();
        b.emit_syscall("Neo.Storage.Put");
        let bytes = b.to_script().as_bytes().to_vec();
        assert_eq!(bytes[0], OpCode::SYSCALL as u8);
        assert_eq!(bytes[1], 15);
    }
}
