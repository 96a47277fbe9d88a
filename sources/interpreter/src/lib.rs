use std::sync::Arc;

use bytes::Bytes;
use parse::classfile::ClassFile;
use tracing::debug;

use crate::bytecode::{decode_instruction, Progression};
use crate::error::{CallError, FrameSource, Throwable, ThrownState};
use crate::frame::Frame;
use crate::heap::Handle;
use crate::object::RuntimeValue;

pub mod bytecode;
pub mod error;
pub mod frame;
pub mod heap;
pub mod object;

/// The machine: one heap context and a stack of frame sources for traces.
/// Execution itself lives in the frames; the VM owns what outlives them.
pub struct VM {
    pub heap: heap::Context,
    pub frames: Vec<FrameSource>,
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl VM {
    pub fn new() -> Self {
        Self {
            heap: heap::Context::new(),
            frames: Vec::new(),
        }
    }

    /// Build a frame for `method_name` and run it to completion.
    pub fn call(
        &mut self,
        class: Arc<ClassFile>,
        receiver: Option<Handle>,
        args: &[RuntimeValue],
        method_name: &str,
    ) -> Result<Option<RuntimeValue>, Throwable> {
        let frame = Frame::build(class, receiver, args, method_name)
            .map_err(|err: CallError| crate::internal!(err))?;

        self.run(frame).map_err(|(err, _)| err)
    }

    /// Step a frame until it returns, runs off the end of its code, or
    /// traps without a handler.
    pub fn run(
        &mut self,
        mut frame: Frame,
    ) -> Result<Option<RuntimeValue>, (Throwable, ThrownState)> {
        self.frames.push(FrameSource {
            class_name: frame.class.name().unwrap_or_default(),
            method_name: frame.method_name.clone(),
        });

        let result = self.step(&mut frame);
        self.frames.pop();
        result
    }

    fn step(
        &mut self,
        frame: &mut Frame,
    ) -> Result<Option<RuntimeValue>, (Throwable, ThrownState)> {
        while (frame.pc as usize) < frame.code.code.len() {
            let slice = &frame.code.code[frame.pc as usize..];
            let length_before = slice.len();

            let mut instruction_bytes = Bytes::copy_from_slice(slice);
            let instruction = decode_instruction(&mut instruction_bytes)
                .map_err(|err| (err, ThrownState { pc: frame.pc }))?;

            // The decoder consumed exactly the instruction's width
            let width = (length_before - instruction_bytes.len()) as i32;
            debug!("pc {}: {:?} ({} bytes)", frame.pc, instruction, width);

            let outcome = match instruction.handle(self, frame) {
                Ok(progression) => progression,
                Err(err) => Progression::Throw(err),
            };

            match outcome {
                Progression::Next => frame.pc += width,
                Progression::Return(value) => {
                    debug!("returning {:?} from {}", value, frame.method_name);
                    return Ok(value);
                }
                Progression::Throw(err) => self.dispatch_trap(frame, err)?,
            }
        }

        Ok(None)
    }

    /// Give the frame's exception table the first look at a trap. A covering
    /// handler takes over with the exception object as the sole operand;
    /// otherwise the trap leaves the frame.
    fn dispatch_trap(
        &mut self,
        frame: &mut Frame,
        err: Throwable,
    ) -> Result<(), (Throwable, ThrownState)> {
        let state = ThrownState { pc: frame.pc };

        let handler_pc = err
            .caught_by(&frame.code, &state)
            .map(|entry| entry.handler_pc);

        match (handler_pc, err) {
            (Some(handler_pc), Throwable::Runtime(thrown)) => {
                debug!(
                    "{} caught at pc {}, entering handler at {}",
                    thrown.class_name, frame.pc, handler_pc
                );

                let exception = self
                    .heap
                    .prod(&thrown.class_name, RuntimeValue::null())
                    .map_err(|err| (crate::internal!(err), state))?;

                frame.operands.clear();
                frame
                    .push(RuntimeValue::Ref(Some(exception)))
                    .map_err(|err| (err, state))?;
                frame.pc = handler_pc as i32;

                Ok(())
            }
            (_, err) => Err((self.with_trace(err), state)),
        }
    }

    fn with_trace(&self, err: Throwable) -> Throwable {
        match err {
            Throwable::Runtime(mut thrown) => {
                thrown.sources = self.frames.iter().rev().cloned().collect();
                Throwable::Runtime(thrown)
            }
            internal => internal,
        }
    }
}
