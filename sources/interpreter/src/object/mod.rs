use std::fmt;

use enum_as_inner::EnumAsInner;

use crate::heap::Handle;

use self::numeric::{Floating, Integral};

pub mod numeric;

/// Anything a local slot or operand stack cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, EnumAsInner)]
pub enum RuntimeValue {
    Integral(Integral),
    Floating(Floating),
    /// An object reference; `None` is Java's `null`.
    Ref(Option<Handle>),
}

impl RuntimeValue {
    pub fn null() -> Self {
        RuntimeValue::Ref(None)
    }
}

impl fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeValue::Integral(data) => write!(f, "{}", data.value),
            RuntimeValue::Floating(data) => write!(f, "{}", data.value),
            RuntimeValue::Ref(Some(handle)) => write!(f, "[object @ {}]", handle.slot()),
            RuntimeValue::Ref(None) => write!(f, "null"),
        }
    }
}
