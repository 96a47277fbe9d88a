#![allow(clippy::redundant_closure_call)]

use super::{Instruction, Progression};
use crate::arg;
use crate::error::Throwable;
use crate::frame::Frame;
use crate::object::numeric::Integral;
use crate::object::RuntimeValue;
use crate::VM;

macro_rules! binop {
    ($ins: ident (int) => $op: expr) => {
        #[derive(Debug)]
        pub struct $ins;

        impl Instruction for $ins {
            fn handle(&self, _vm: &mut VM, frame: &mut Frame) -> Result<Progression, Throwable> {
                let rhs = arg!(frame, "rhs" => Integral);
                let lhs = arg!(frame, "lhs" => Integral);

                let result: i32 = $op(lhs, rhs)?;
                frame.push(RuntimeValue::Integral(result.into()))?;

                Ok(Progression::Next)
            }
        }
    };
}

binop!(Iadd (int) => |lhs: Integral, rhs: Integral| -> Result<i32, Throwable> {
    Ok((lhs.value as i32).wrapping_add(rhs.value as i32))
});

binop!(Isub (int) => |lhs: Integral, rhs: Integral| -> Result<i32, Throwable> {
    Ok((lhs.value as i32).wrapping_sub(rhs.value as i32))
});

binop!(Imul (int) => |lhs: Integral, rhs: Integral| -> Result<i32, Throwable> {
    Ok((lhs.value as i32).wrapping_mul(rhs.value as i32))
});

// idiv and irem truncate toward zero, which wrapping_div/wrapping_rem
// already do; only the zero divisor needs a trap
binop!(Idiv (int) => |lhs: Integral, rhs: Integral| {
    if rhs.value as i32 == 0 {
        return Err(Throwable::arithmetic("/ by zero"));
    }

    Ok((lhs.value as i32).wrapping_div(rhs.value as i32))
});

binop!(Irem (int) => |lhs: Integral, rhs: Integral| {
    if rhs.value as i32 == 0 {
        return Err(Throwable::arithmetic("/ by zero"));
    }

    Ok((lhs.value as i32).wrapping_rem(rhs.value as i32))
});

binop!(Iand (int) => |lhs: Integral, rhs: Integral| -> Result<i32, Throwable> {
    Ok((lhs.value as i32) & (rhs.value as i32))
});

binop!(Ior (int) => |lhs: Integral, rhs: Integral| -> Result<i32, Throwable> {
    Ok((lhs.value as i32) | (rhs.value as i32))
});
