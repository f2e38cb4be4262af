//! Argument marshalling: lowers ABI-ordered entry-point arguments into a
//! stack-loading prelude script.

use num_bigint::BigInt;

use crate::op_code::OpCode;
use crate::param_tree::{convert_argument, ConvertedArgument, ParamTree};
use crate::script::Script;
use crate::script_builder::ScriptBuilder;

/// Lowers `args`, in ABI order, into a prelude script.
///
/// Each argument is converted independently (nested composites within a
/// single argument's tree still collapse to a byte array when every child
/// is a 0-255 numeric leaf, or to a recursively-converted list otherwise).
/// The converted arguments are then emitted in *reverse* ABI order, so
/// that after the prelude runs, argument 0 sits at the top of the
/// evaluation stack, argument 1 just beneath it, and so on.
pub fn lower(args: &[ParamTree]) -> Script {
    let mut builder = ScriptBuilder::new();
    for arg in args.iter().rev() {
        emit_converted(&mut builder, &convert_argument(arg));
    }
    builder.to_script()
}

fn emit_converted(builder: &mut ScriptBuilder, arg: &ConvertedArgument) {
    match arg {
        ConvertedArgument::ByteArray(bytes) => {
            for &byte in bytes.iter().rev() {
                builder.emit_push_int(&BigInt::from(byte));
            }
            builder.emit_push_int(&BigInt::from(bytes.len()));
            builder.emit_opcode(OpCode::PACK);
        }
        ConvertedArgument::List(items) => {
            for item in items {
                emit_converted(builder, item);
            }
            builder.emit_push_int(&BigInt::from(items.len()));
            builder.emit_opcode(OpCode::PACK);
        }
        ConvertedArgument::Null => {
            builder.emit_push_string("");
        }
        ConvertedArgument::String(s) => {
            builder.emit_push_string(s);
        }
        ConvertedArgument::Boolean(v) => {
            builder.emit_push_bool(*v);
        }
        ConvertedArgument::BigInteger(i) => {
            builder.emit_push_int(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm_engine::VmEngine;
    use crate::stack_item::StackItem;

    #[test]
    fn byte_array_argument_round_trips_through_the_vm() {
        let tree = ParamTree::Composite(vec![
            ParamTree::Numeric("10".into()),
            ParamTree::Numeric("20".into()),
            ParamTree::Numeric("30".into()),
        ]);
        let script = lower(std::slice::from_ref(&tree));

        let mut builder = ScriptBuilder::new();
        builder.emit_opcode(OpCode::RET);
        let mut full = script.as_bytes().to_vec();
        full.extend_from_slice(builder.to_script().as_bytes());

        let mut engine = VmEngine::new();
        engine.load_script(Script::new(full));
        while engine.state().is_runnable() {
            engine.step_into().unwrap();
        }

        match engine.result_stack().peek(0).unwrap() {
            StackItem::Array(items) => {
                let values: Vec<u8> = items
                    .iter()
                    .map(|i| i.as_int().unwrap().to_bytes_le().1[0])
                    .collect();
                assert_eq!(values, vec![10, 20, 30]);
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn two_integer_arguments_leave_first_on_top() {
        let args = vec![ParamTree::Numeric("5".into()), ParamTree::Numeric("9".into())];
        let script = lower(&args);
        // arg0 (5) must be emitted last so it ends up pushed last / on top.
        let bytes = script.as_bytes();
        assert_eq!(bytes[bytes.len() - 1], OpCode::PUSH5 as u8);
    }

    #[test]
    fn is_deterministic_for_equal_inputs() {
        let args = vec![ParamTree::String("hello".into())];
        assert_eq!(lower(&args).as_bytes(), lower(&args).as_bytes());
    }
}
