use std::fmt;

use bytes::Bytes;
use support::bytes_ext::SafeBuf;

use crate::error::Throwable;
use crate::frame::Frame;
use crate::internal;
use crate::object::RuntimeValue;
use crate::VM;

pub mod binary;
pub mod load_store;
pub mod ops;
pub mod unary;

pub trait Instruction: fmt::Debug {
    fn handle(&self, vm: &mut VM, frame: &mut Frame) -> Result<Progression, Throwable>;
}

/// What the step loop does after an instruction ran.
#[derive(Debug)]
pub enum Progression {
    /// Advance past the bytes the instruction decoded from.
    Next,
    /// Leave the frame, handing the value (if any) to the caller.
    Return(Option<RuntimeValue>),
    /// Trap. The frame's exception table gets the first look.
    Throw(Throwable),
}

/// Utility to box a value. Used below to box each instruction that we decode
fn b<T>(v: T) -> Box<T> {
    Box::new(v)
}

/// Decode one instruction, consuming exactly its width from `bytes`.
///
/// Only the arithmetic core is dispatched. Everything else becomes
/// [`ops::Unimplemented`], which warns and falls through one byte; that is
/// contractual behaviour, not an error.
pub fn decode_instruction(bytes: &mut Bytes) -> Result<Box<dyn Instruction>, Throwable> {
    let opcode = bytes.try_get_u8().map_err(|err| internal!(err))?;

    Ok(match opcode {
        // aconst_null
        0x01 => b(load_store::PushConst {
            value: RuntimeValue::null(),
        }),

        // iconst_m1 through iconst_5
        0x02..=0x08 => b(load_store::PushConst {
            value: RuntimeValue::Integral((opcode as i32 - 3).into()),
        }),

        // iload with an explicit slot
        0x15 => b(load_store::LoadLocal {
            index: bytes.try_get_u8().map_err(|err| internal!(err))? as usize,
        }),

        // iload_0 through iload_3
        0x1a..=0x1d => b(load_store::LoadLocal {
            index: (opcode - 0x1a) as usize,
        }),

        // istore with an explicit slot
        0x36 => b(load_store::StoreLocal {
            index: bytes.try_get_u8().map_err(|err| internal!(err))? as usize,
        }),

        // istore_0 through istore_3
        0x3b..=0x3e => b(load_store::StoreLocal {
            index: (opcode - 0x3b) as usize,
        }),

        0x60 => b(binary::Iadd),
        0x64 => b(binary::Isub),
        0x68 => b(binary::Imul),
        0x6c => b(binary::Idiv),
        0x70 => b(binary::Irem),
        0x74 => b(unary::Ineg),
        0x7e => b(binary::Iand),
        0x80 => b(binary::Ior),

        0xac => b(ops::Ireturn),

        other => b(ops::Unimplemented { opcode: other }),
    })
}
