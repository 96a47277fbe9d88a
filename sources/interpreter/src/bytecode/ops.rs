use tracing::warn;

use super::{Instruction, Progression};
use crate::arg;
use crate::error::Throwable;
use crate::frame::Frame;
use crate::object::RuntimeValue;
use crate::VM;

#[macro_export]
macro_rules! pop {
    ($frame: expr) => {
        $frame.pop()?
    };
}

#[macro_export]
macro_rules! arg {
    ($frame: expr, $side: expr => Integral) => {{
        let value = $crate::pop!($frame);

        *value
            .as_integral()
            .ok_or_else(|| $crate::internal!("{} was not an integral", $side))?
    }};
    ($frame: expr, $side: expr => Ref) => {{
        let value = $crate::pop!($frame);

        *value
            .as_ref()
            .ok_or_else(|| $crate::internal!("{} was not a reference", $side))?
    }};
}

#[derive(Debug)]
pub struct Ireturn;

impl Instruction for Ireturn {
    fn handle(&self, _vm: &mut VM, frame: &mut Frame) -> Result<Progression, Throwable> {
        let value = arg!(frame, "return value" => Integral);

        Ok(Progression::Return(Some(RuntimeValue::Integral(value))))
    }
}

/// Every opcode outside the dispatched subset. Runs as a one-byte no-op,
/// loudly; masking these as errors would reject code the machine can
/// otherwise step over.
#[derive(Debug)]
pub struct Unimplemented {
    pub opcode: u8,
}

impl Instruction for Unimplemented {
    fn handle(&self, _vm: &mut VM, frame: &mut Frame) -> Result<Progression, Throwable> {
        warn!(
            "unimplemented opcode {:#04x} at pc {}, stepping over it",
            self.opcode, frame.pc
        );

        Ok(Progression::Next)
    }
}
