//! Per-opcode gas accounting.
//!
//! Note this is *not* the production VM's exact opcode price list (that
//! model prices hundreds of opcodes individually); it is the coarser
//! class-based table this debugger core is specified against.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::op_code::OpCode;

/// Base cost, in gas, of known syscalls by fully-qualified name. Unknown
/// syscalls cost zero.
static SYSCALL_COSTS: Lazy<HashMap<&'static str, Decimal>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("Neo.Storage.Put", dec!(1.0));
    m.insert("System.Storage.Put", dec!(1.0));
    m.insert("Neo.Storage.Get", dec!(0.1));
    m.insert("System.Storage.Get", dec!(0.1));
    m.insert("Neo.Runtime.CheckWitness", dec!(0.03));
    m.insert("System.Runtime.CheckWitness", dec!(0.03));
    m.insert("System.Runtime.Log", dec!(0.01));
    m.insert("System.Contract.Call", dec!(0.2));
    m
});

/// Looks up a syscall's base cost, prior to any data-sensitive adjustment.
pub fn syscall_base_cost(name: &str) -> Decimal {
    SYSCALL_COSTS.get(name).copied().unwrap_or(Decimal::ZERO)
}

/// The class-based cost of executing `opcode`, for opcodes other than
/// `SYSCALL` (whose cost depends on the resolved syscall name and is
/// computed by [`syscall_cost`]).
pub fn opcode_cost(opcode: OpCode) -> Decimal {
    use OpCode::*;
    match opcode {
        _ if opcode.is_push_constant() => Decimal::ZERO,
        NOP => Decimal::ZERO,
        CHECKSIG | CHECKMULTISIG => dec!(0.1),
        APPCALL | TAILCALL | SHA256 | SHA1 => dec!(0.01),
        HASH256 | HASH160 => dec!(0.02),
        SYSCALL => unreachable!("SYSCALL cost must go through syscall_cost"),
        _ => dec!(0.001),
    }
}

/// The full cost of a `SYSCALL` instruction resolving to `name`, including
/// the `Storage.Put` payload-size multiplier.
///
/// `last_storage_payload_bytes` is read from the storage collaborator
/// regardless of which syscall executed; it only affects cost when `name`
/// ends in `"Storage.Put"`, matching how the source attributes the most
/// recent write's size to whatever step happens to read it next.
pub fn syscall_cost(name: &str, last_storage_payload_bytes: u64) -> Decimal {
    let base = syscall_base_cost(name);
    if name.ends_with("Storage.Put") {
        let scale = Decimal::from(last_storage_payload_bytes) / dec!(1024);
        let scaled = base * scale;
        if scaled < Decimal::ONE {
            Decimal::ONE
        } else {
            scaled
        }
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_nop_are_free() {
        assert_eq!(opcode_cost(OpCode::PUSH1), Decimal::ZERO);
        assert_eq!(opcode_cost(OpCode::NOP), Decimal::ZERO);
    }

    #[test]
    fn checksig_costs_a_tenth() {
        assert_eq!(opcode_cost(OpCode::CHECKSIG), dec!(0.1));
    }

    #[test]
    fn storage_put_scales_with_payload_and_clamps_to_one() {
        assert_eq!(syscall_cost("Neo.Storage.Put", 2048), dec!(2.0));
        assert_eq!(syscall_cost("Neo.Storage.Put", 100), Decimal::ONE);
    }

    #[test]
    fn unknown_syscall_is_free() {
        assert_eq!(syscall_cost("Neo.Nonexistent.Thing", 0), Decimal::ZERO);
    }
}
