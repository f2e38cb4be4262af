//! OpCode definitions for the embedded stack-machine engine.
//!
//! This is the subset of the legacy NEO AVM instruction set the emulator
//! needs to drive stepping, gas accounting and argument marshalling. The
//! full opcode semantics (arithmetic, compound types, exception handling)
//! belong to the production interpreter this crate's `VmEngine` stands in
//! for; see the module docs on [`crate::vm_engine`].

use crate::error::VmError;
use std::convert::TryFrom;

/// A single NEO AVM instruction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum OpCode {
    PUSH0 = 0x00,
    /// Stand-in for the whole `0x01..=0x4B` "push N literal bytes" family;
    /// the actual length lives in the decoded [`crate::instruction::Instruction`]'s
    /// operand, not in the opcode byte itself.
    PUSHBYTES = 0x01,
    PUSHDATA1 = 0x4C,
    PUSHDATA2 = 0x4D,
    PUSHDATA4 = 0x4E,
    PUSHM1 = 0x4F,
    PUSH1 = 0x51,
    PUSH2 = 0x52,
    PUSH3 = 0x53,
    PUSH4 = 0x54,
    PUSH5 = 0x55,
    PUSH6 = 0x56,
    PUSH7 = 0x57,
    PUSH8 = 0x58,
    PUSH9 = 0x59,
    PUSH10 = 0x5A,
    PUSH11 = 0x5B,
    PUSH12 = 0x5C,
    PUSH13 = 0x5D,
    PUSH14 = 0x5E,
    PUSH15 = 0x5F,
    PUSH16 = 0x60,

    NOP = 0x61,
    JMP = 0x62,
    JMPIF = 0x63,
    JMPIFNOT = 0x64,
    CALL = 0x65,
    RET = 0x66,
    APPCALL = 0x67,
    SYSCALL = 0x68,
    TAILCALL = 0x69,

    DUPFROMALTSTACK = 0x6A,
    TOALTSTACK = 0x6B,
    FROMALTSTACK = 0x6C,
    XDROP = 0x6D,
    XSWAP = 0x72,
    XTUCK = 0x73,
    DEPTH = 0x74,
    DROP = 0x75,
    DUP = 0x76,
    NIP = 0x77,
    OVER = 0x78,
    PICK = 0x79,
    ROLL = 0x7A,
    ROT = 0x7B,
    SWAP = 0x7C,
    TUCK = 0x7D,

    CAT = 0x7E,
    SUBSTR = 0x7F,
    LEFT = 0x80,
    RIGHT = 0x81,
    SIZE = 0x82,

    INVERT = 0x83,
    AND = 0x84,
    OR = 0x85,
    XOR = 0x86,
    EQUAL = 0x87,

    ADD = 0x93,
    SUB = 0x94,
    MUL = 0x95,
    DIV = 0x96,
    MOD = 0x97,

    THROW = 0xF0,
    THROWIFNOT = 0xF1,

    ARRAYSIZE = 0xC5,
    PACK = 0xC1,
    UNPACK = 0xC2,
    PICKITEM = 0xC3,
    SETITEM = 0xC4,
    NEWARRAY = 0xC6,
    NEWSTRUCT = 0xC7,
    NEWMAP = 0xC8,
    APPEND = 0xC9,
    REVERSE = 0xCA,
    REMOVE = 0xCB,
    HASKEY = 0xCC,
    KEYS = 0xCD,
    VALUES = 0xCE,

    SHA1 = 0xA1,
    SHA256 = 0xA2,
    HASH160 = 0xA3,
    HASH256 = 0xA4,
    CHECKSIG = 0xAC,
    CHECKMULTISIG = 0xAE,
}

impl OpCode {
    /// Whether this opcode is one of the `PUSH0..PUSH16`/`PUSHM1` family,
    /// which always cost zero gas regardless of operand.
    pub fn is_push_constant(self) -> bool {
        matches!(
            self,
            OpCode::PUSH0
                | OpCode::PUSHBYTES
                | OpCode::PUSHDATA1
                | OpCode::PUSHDATA2
                | OpCode::PUSHDATA4
                | OpCode::PUSHM1
                | OpCode::PUSH1
                | OpCode::PUSH2
                | OpCode::PUSH3
                | OpCode::PUSH4
                | OpCode::PUSH5
                | OpCode::PUSH6
                | OpCode::PUSH7
                | OpCode::PUSH8
                | OpCode::PUSH9
                | OpCode::PUSH10
                | OpCode::PUSH11
                | OpCode::PUSH12
                | OpCode::PUSH13
                | OpCode::PUSH14
                | OpCode::PUSH15
                | OpCode::PUSH16
        )
    }

}

impl TryFrom<u8> for OpCode {
    type Error = VmError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use OpCode::*;
        Ok(match value {
            0x00 => PUSH0,
            0x01..=0x4B => PUSHBYTES,
            0x4C => PUSHDATA1,
            0x4D => PUSHDATA2,
            0x4E => PUSHDATA4,
            0x4F => PUSHM1,
            0x51 => PUSH1,
            0x52 => PUSH2,
            0x53 => PUSH3,
            0x54 => PUSH4,
            0x55 => PUSH5,
            0x56 => PUSH6,
            0x57 => PUSH7,
            0x58 => PUSH8,
            0x59 => PUSH9,
            0x5A => PUSH10,
            0x5B => PUSH11,
            0x5C => PUSH12,
            0x5D => PUSH13,
            0x5E => PUSH14,
            0x5F => PUSH15,
            0x60 => PUSH16,
            0x61 => NOP,
            0x62 => JMP,
            0x63 => JMPIF,
            0x64 => JMPIFNOT,
            0x65 => CALL,
            0x66 => RET,
            0x67 => APPCALL,
            0x68 => SYSCALL,
            0x69 => TAILCALL,
            0x6A => DUPFROMALTSTACK,
            0x6B => TOALTSTACK,
            0x6C => FROMALTSTACK,
            0x6D => XDROP,
            0x72 => XSWAP,
            0x73 => XTUCK,
            0x74 => DEPTH,
            0x75 => DROP,
            0x76 => DUP,
            0x77 => NIP,
            0x78 => OVER,
            0x79 => PICK,
            0x7A => ROLL,
            0x7B => ROT,
            0x7C => SWAP,
            0x7D => TUCK,
            0x7E => CAT,
            0x7F => SUBSTR,
            0x80 => LEFT,
            0x81 => RIGHT,
            0x82 => SIZE,
            0x83 => INVERT,
            0x84 => AND,
            0x85 => OR,
            0x86 => XOR,
            0x87 => EQUAL,
            0x93 => ADD,
            0x94 => SUB,
            0x95 => MUL,
            0x96 => DIV,
            0x97 => MOD,
            0xA1 => SHA1,
            0xA2 => SHA256,
            0xA3 => HASH160,
            0xA4 => HASH256,
            0xAC => CHECKSIG,
            0xAE => CHECKMULTISIG,
            0xC1 => PACK,
            0xC2 => UNPACK,
            0xC3 => PICKITEM,
            0xC4 => SETITEM,
            0xC5 => ARRAYSIZE,
            0xC6 => NEWARRAY,
            0xC7 => NEWSTRUCT,
            0xC8 => NEWMAP,
            0xC9 => APPEND,
            0xCA => REVERSE,
            0xCB => REMOVE,
            0xCC => HASKEY,
            0xCD => KEYS,
            0xCE => VALUES,
            0xF0 => THROW,
            0xF1 => THROWIFNOT,
            other => return Err(VmError::InvalidOpCode { opcode: other }),
        })
    }
}
