use super::{Instruction, Progression};
use crate::error::Throwable;
use crate::frame::Frame;
use crate::object::RuntimeValue;
use crate::VM;

#[derive(Debug)]
pub struct PushConst {
    pub(crate) value: RuntimeValue,
}

impl Instruction for PushConst {
    fn handle(&self, _vm: &mut VM, frame: &mut Frame) -> Result<Progression, Throwable> {
        frame.push(self.value)?;
        Ok(Progression::Next)
    }
}

#[derive(Debug)]
pub struct LoadLocal {
    pub(crate) index: usize,
}

impl Instruction for LoadLocal {
    fn handle(&self, _vm: &mut VM, frame: &mut Frame) -> Result<Progression, Throwable> {
        let local = frame.local(self.index)?;
        frame.push(local)?;
        Ok(Progression::Next)
    }
}

#[derive(Debug)]
pub struct StoreLocal {
    pub(crate) index: usize,
}

impl Instruction for StoreLocal {
    fn handle(&self, _vm: &mut VM, frame: &mut Frame) -> Result<Progression, Throwable> {
        let value = frame.pop()?;
        frame.set_local(self.index, value)?;
        Ok(Progression::Next)
    }
}
