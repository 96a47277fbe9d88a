use parse::attributes::{CodeAttribute, ExceptionEntry};
use parse::classfile::Resolvable;
use thiserror::Error;

/// Anything the machine can throw. `Runtime` errors model Java exceptions
/// and may be caught by a frame's exception table; `Internal` errors are
/// the machine's own and never reach bytecode handlers.
#[derive(Error, Debug)]
pub enum Throwable {
    #[error("[K] {0}")]
    Runtime(RuntimeException),

    #[error("[K] {0}")]
    Internal(#[from] anyhow::Error),
}

#[macro_export]
macro_rules! internal {
    ($msg:literal $(,)?) => {
        $crate::error::Throwable::Internal(anyhow::anyhow!($msg))
    };
    ($err:expr $(,)?) => {
        $crate::error::Throwable::Internal(anyhow::anyhow!($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::Throwable::Internal(anyhow::anyhow!($fmt, $($arg)*))
    };
}

/// Where the machine was when something was thrown.
#[derive(Debug, Clone, Copy)]
pub struct ThrownState {
    pub pc: i32,
}

/// One entry of the call trace attached to a runtime exception.
#[derive(Error, Debug, Clone)]
#[error("at {class_name}.{method_name}")]
pub struct FrameSource {
    pub class_name: String,
    pub method_name: String,
}

#[derive(Error, Debug, Clone)]
#[error("{class_name}: {message}")]
pub struct RuntimeException {
    pub class_name: String,
    pub message: String,
    pub sources: Vec<FrameSource>,
}

impl RuntimeException {
    pub fn new(class_name: &str, message: impl Into<String>) -> Self {
        Self {
            class_name: class_name.to_string(),
            message: message.into(),
            sources: Vec::new(),
        }
    }
}

impl Throwable {
    pub fn arithmetic(message: impl Into<String>) -> Self {
        Throwable::Runtime(RuntimeException::new(
            "java/lang/ArithmeticException",
            message,
        ))
    }

    pub fn stack_overflow(limit: u16) -> Self {
        Throwable::Runtime(RuntimeException::new(
            "java/lang/StackOverflowError",
            format!("operand stack limit {limit}"),
        ))
    }

    pub fn vm_error(message: impl Into<String>) -> Self {
        Throwable::Runtime(RuntimeException::new(
            "java/lang/VirtualMachineError",
            message,
        ))
    }

    /// Find the handler covering the throw site, if the code has one.
    ///
    /// A handler matches when its `[start_pc, end_pc)` range covers the pc
    /// and its catch type is either absent (catch-all) or names the thrown
    /// class. Internal errors are never caught.
    pub fn caught_by<'a>(
        &self,
        code: &'a CodeAttribute,
        state: &ThrownState,
    ) -> Option<&'a ExceptionEntry> {
        let Throwable::Runtime(thrown) = self else {
            return None;
        };
        let pc = u16::try_from(state.pc).ok()?;

        code.exception_table.iter().find(|entry| {
            let covers_pc = (entry.start_pc..entry.end_pc).contains(&pc);

            let type_matches = match &entry.catch_type {
                None => true,
                Some(class) => class
                    .try_resolve()
                    .ok()
                    .and_then(|c| c.name.try_resolve().ok())
                    .and_then(|n| n.try_string().ok())
                    .is_some_and(|name| name == thrown.class_name),
            };

            covers_pc && type_matches
        })
    }
}

/// Frame construction failures. These surface before a single opcode runs,
/// so they are not throwable into bytecode handlers.
#[derive(Error, Debug)]
pub enum CallError {
    #[error("[K] no method named {name}")]
    MethodNotFound { name: String },

    #[error("[K] method {name} has no code")]
    NoCode { name: String },

    #[error("[K] {given} arguments into {max} local slots")]
    TooManyArguments { given: usize, max: u16 },
}
