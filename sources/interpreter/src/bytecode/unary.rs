#![allow(clippy::redundant_closure_call)]

use super::{Instruction, Progression};
use crate::arg;
use crate::error::Throwable;
use crate::frame::Frame;
use crate::object::numeric::Integral;
use crate::object::RuntimeValue;
use crate::VM;

macro_rules! unop {
    ($ins: ident (int) => $op: expr) => {
        #[derive(Debug)]
        pub struct $ins;

        impl Instruction for $ins {
            fn handle(&self, _vm: &mut VM, frame: &mut Frame) -> Result<Progression, Throwable> {
                let value = arg!(frame, "operand" => Integral);

                let result: i32 = $op(value);
                frame.push(RuntimeValue::Integral(result.into()))?;

                Ok(Progression::Next)
            }
        }
    };
}

unop!(Ineg (int) => |value: Integral| {
    0_i32.wrapping_sub(value.value as i32)
});
