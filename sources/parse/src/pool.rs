use std::sync::Arc;

use anyhow::Context;
use enum_as_inner::EnumAsInner;
use parking_lot::RwLock;

use crate::classfile::Addressed;
use crate::classfile::Resolvable;
use crate::error::ParseError;

/// The constant pool as the rest of the class file sees it: a 1-indexed
/// table of tagged entries shared behind [`Addressed`] handles.
#[derive(Debug, Clone)]
pub struct ConstantPool {
    pub entries: Arc<RwLock<Vec<ConstantEntry>>>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(vec![])),
        }
    }

    pub fn insert(&mut self, entry: ConstantEntry) {
        let mut pool = self.entries.write();
        pool.push(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Fetch by class-file index (1-based).
    pub fn get(&self, index: u16) -> Option<ConstantEntry> {
        let pool = self.entries.read();
        (index as usize)
            .checked_sub(1)
            .and_then(|i| pool.get(i))
            .cloned()
    }

    pub fn address<T>(&self, for_index: u16) -> Addressed<T> {
        Addressed::from(for_index, Arc::clone(&self.entries))
    }

    /// Chase an entry down to its UTF-8 leaf and return an owned copy.
    ///
    /// `Class`, `String`, `NameAndType`, `Module` and `Package` entries all
    /// reduce to a `Utf8` leaf in a well-formed pool. The hop count is capped
    /// at the pool length so a malformed cycle fails instead of spinning.
    pub fn resolve_string(&self, index: u16) -> Result<String, ParseError> {
        let entries = self.entries.read();
        let len = entries.len();

        let mut current = index;
        for _ in 0..=len {
            let entry = (current as usize)
                .checked_sub(1)
                .and_then(|i| entries.get(i))
                .ok_or(ParseError::IndexOutOfBounds {
                    index: current,
                    len,
                })?;

            current = match entry {
                ConstantEntry::Utf8(data) => {
                    return String::from_utf8(data.bytes.clone())
                        .context("constant was not valid utf-8")
                        .map_err(ParseError::Internal)
                }
                ConstantEntry::Class(data) => data.name.index(),
                ConstantEntry::String(data) => data.string.index(),
                ConstantEntry::NameAndType(data) => data.name.index(),
                ConstantEntry::Module(data) => data.name.index(),
                ConstantEntry::Package(data) => data.name.index(),
                _ => return Err(ParseError::StringNotFound { index: current }),
            };
        }

        Err(ParseError::StringNotFound { index })
    }

    pub(crate) fn perform_format_checking(&self) -> Result<(), ParseError> {
        let entries = self.entries.read();
        for item in entries.iter() {
            match item {
                ConstantEntry::Class(data) => {
                    data.name.try_resolve()?;
                }
                ConstantEntry::Field(data) => {
                    data.class.try_resolve()?;
                    data.name_and_type.try_resolve()?;
                }
                ConstantEntry::Method(data) => {
                    data.class.try_resolve()?;
                    data.name_and_type.try_resolve()?;
                }
                ConstantEntry::InterfaceMethod(data) => {
                    data.class.try_resolve()?;
                    data.name_and_type.try_resolve()?;
                }
                ConstantEntry::String(data) => {
                    data.string.try_resolve()?;
                }
                ConstantEntry::NameAndType(data) => {
                    data.name.try_resolve()?;
                    data.descriptor.try_resolve()?;
                }
                ConstantEntry::MethodType(data) => {
                    data.descriptor.try_resolve()?;
                }
                ConstantEntry::Dynamic(data) | ConstantEntry::InvokeDynamic(data) => {
                    data.name_and_type.try_resolve()?;
                }
                ConstantEntry::Module(data) => {
                    data.name.try_resolve()?;
                }
                ConstantEntry::Package(data) => {
                    data.name.try_resolve()?;
                }
                ConstantEntry::Integer(_)
                | ConstantEntry::Float(_)
                | ConstantEntry::Long(_)
                | ConstantEntry::Double(_)
                | ConstantEntry::Utf8(_)
                | ConstantEntry::MethodHandle(_)
                | ConstantEntry::Reserved => {}
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantTag {
    Class,
    Field,
    Method,
    InterfaceMethod,
    String,
    Integer,
    Float,
    Long,
    Double,
    NameAndType,
    Utf8,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
}

impl ConstantTag {
    pub fn from_tag(tag: u8) -> Result<Self, ParseError> {
        Ok(match tag {
            1 => ConstantTag::Utf8,
            3 => ConstantTag::Integer,
            4 => ConstantTag::Float,
            5 => ConstantTag::Long,
            6 => ConstantTag::Double,
            7 => ConstantTag::Class,
            8 => ConstantTag::String,
            9 => ConstantTag::Field,
            10 => ConstantTag::Method,
            11 => ConstantTag::InterfaceMethod,
            12 => ConstantTag::NameAndType,
            15 => ConstantTag::MethodHandle,
            16 => ConstantTag::MethodType,
            17 => ConstantTag::Dynamic,
            18 => ConstantTag::InvokeDynamic,
            19 => ConstantTag::Module,
            20 => ConstantTag::Package,
            _ => return Err(ParseError::UnsupportedTag { tag }),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConstantClass {
    pub tag: ConstantTag,
    pub name: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantField {
    pub tag: ConstantTag,
    pub class: Addressed<ConstantClass>,
    pub name_and_type: Addressed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantMethod {
    pub tag: ConstantTag,
    pub class: Addressed<ConstantClass>,
    pub name_and_type: Addressed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantInterfaceMethod {
    pub tag: ConstantTag,
    pub class: Addressed<ConstantClass>,
    pub name_and_type: Addressed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantString {
    pub tag: ConstantTag,
    pub string: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantInteger {
    pub tag: ConstantTag,
    pub bytes: u32,
}

#[derive(Debug, Clone)]
pub struct ConstantFloat {
    pub tag: ConstantTag,
    pub bytes: f32,
}

#[derive(Debug, Clone)]
pub struct ConstantLong {
    pub tag: ConstantTag,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ConstantDouble {
    pub tag: ConstantTag,
    pub bytes: f64,
}

#[derive(Debug, Clone)]
pub struct ConstantNameAndType {
    pub tag: ConstantTag,
    pub name: Addressed<ConstantUtf8>,
    pub descriptor: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantUtf8 {
    pub tag: ConstantTag,
    pub length: u16,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ConstantMethodHandle {
    pub tag: ConstantTag,
    pub kind: u8,
    pub index: u16,
}

#[derive(Debug, Clone)]
pub struct ConstantMethodType {
    pub tag: ConstantTag,
    pub descriptor: Addressed<ConstantUtf8>,
}

/// Shared by `Dynamic` and `InvokeDynamic`; both point into the
/// `BootstrapMethods` attribute.
#[derive(Debug, Clone)]
pub struct ConstantDynamicInfo {
    pub tag: ConstantTag,
    pub bootstrap_index: u16,
    pub name_and_type: Addressed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantModule {
    pub tag: ConstantTag,
    pub name: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantPackage {
    pub tag: ConstantTag,
    pub name: Addressed<ConstantUtf8>,
}

impl ConstantUtf8 {
    pub fn string(self) -> String {
        self.try_string().unwrap()
    }

    pub fn try_string(self) -> anyhow::Result<String> {
        Ok(String::from_utf8(self.bytes)?)
    }
}

impl ConstantString {
    pub fn string(&self) -> String {
        self.try_string().unwrap()
    }

    pub fn try_string(&self) -> anyhow::Result<String> {
        Ok(String::from_utf8(self.string.try_resolve()?.bytes)?)
    }
}

#[derive(EnumAsInner, Clone, Debug)]
pub enum ConstantEntry {
    Class(ConstantClass),
    Field(ConstantField),
    Method(ConstantMethod),
    InterfaceMethod(ConstantInterfaceMethod),
    String(ConstantString),
    Integer(ConstantInteger),
    Float(ConstantFloat),
    Long(ConstantLong),
    Double(ConstantDouble),
    NameAndType(ConstantNameAndType),
    Utf8(ConstantUtf8),
    MethodHandle(ConstantMethodHandle),
    MethodType(ConstantMethodType),
    Dynamic(ConstantDynamicInfo),
    InvokeDynamic(ConstantDynamicInfo),
    Module(ConstantModule),
    Package(ConstantPackage),
    /// Second slot of a `Long` or `Double`. Keeping it explicit preserves
    /// 1-based indexing without an indirection table.
    Reserved,
}
