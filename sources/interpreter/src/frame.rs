use std::sync::Arc;

use parse::attributes::CodeAttribute;
use parse::classfile::ClassFile;

use crate::error::{CallError, Throwable};
use crate::heap::Handle;
use crate::object::RuntimeValue;

/// Per-method activation record: a bounded operand stack, `max_locals`
/// typed slots, and a program counter into the method's bytecode.
#[derive(Debug)]
pub struct Frame {
    pub class: Arc<ClassFile>,
    pub code: CodeAttribute,
    pub method_name: String,

    pub pc: i32,
    pub operands: Vec<RuntimeValue>,
    pub locals: Vec<RuntimeValue>,
    pub receiver: Option<Handle>,
}

impl Frame {
    /// Look the method up by name, take its code, and seat `args` in the
    /// low locals. The remaining slots start out as `null`.
    pub fn build(
        class: Arc<ClassFile>,
        receiver: Option<Handle>,
        args: &[RuntimeValue],
        method_name: &str,
    ) -> Result<Self, CallError> {
        let method = class
            .methods
            .locate(method_name)
            .ok_or_else(|| CallError::MethodNotFound {
                name: method_name.to_string(),
            })?;

        let code = method
            .attributes
            .code()
            .cloned()
            .ok_or_else(|| CallError::NoCode {
                name: method_name.to_string(),
            })?;

        if args.len() > code.max_locals as usize {
            return Err(CallError::TooManyArguments {
                given: args.len(),
                max: code.max_locals,
            });
        }

        let mut locals = vec![RuntimeValue::null(); code.max_locals as usize];
        locals[..args.len()].copy_from_slice(args);

        Ok(Self {
            class,
            operands: Vec::with_capacity(code.max_stack as usize),
            locals,
            code,
            method_name: method_name.to_string(),
            pc: 0,
            receiver,
        })
    }

    /// Push onto the operand stack, trapping once `max_stack` is reached.
    pub fn push(&mut self, value: RuntimeValue) -> Result<(), Throwable> {
        if self.operands.len() >= self.code.max_stack as usize {
            return Err(Throwable::stack_overflow(self.code.max_stack));
        }

        self.operands.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<RuntimeValue, Throwable> {
        self.operands
            .pop()
            .ok_or_else(|| Throwable::vm_error("operand stack underflow"))
    }

    pub fn local(&self, index: usize) -> Result<RuntimeValue, Throwable> {
        self.locals
            .get(index)
            .copied()
            .ok_or_else(|| Throwable::vm_error(format!("no local slot {index}")))
    }

    pub fn set_local(&mut self, index: usize, value: RuntimeValue) -> Result<(), Throwable> {
        match self.locals.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Throwable::vm_error(format!("no local slot {index}"))),
        }
    }
}
