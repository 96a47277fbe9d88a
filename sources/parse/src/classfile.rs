use crate::{
    attributes::Attributes,
    error::ParseError,
    flags::{ClassFileAccessFlags, FieldAccessFlags, MethodAccessFlags},
    pool::{ConstantClass, ConstantEntry, ConstantNameAndType, ConstantPool, ConstantUtf8},
};
use anyhow::Result;
use parking_lot::RwLock;
use std::{fmt, marker::PhantomData, sync::Arc};

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub constant_pool: ConstantPool,
    pub meta_data: MetaData,

    pub access_flags: ClassFileAccessFlags,
    pub this_class: Addressed<ConstantClass>,
    pub super_class: Option<Addressed<ConstantClass>>,

    pub interfaces: Interfaces,
    pub fields: Fields,
    pub methods: Methods,
    pub attributes: Attributes,
}

impl ClassFile {
    /// Binary name of this class, e.g. `java/lang/Object`.
    pub fn name(&self) -> Result<String, ParseError> {
        self.constant_pool.resolve_string(self.this_class.index())
    }

    /// Binary name of the direct superclass. `java/lang/Object` has none
    /// and renders as the empty string.
    pub fn super_name(&self) -> Result<String, ParseError> {
        match &self.super_class {
            Some(super_class) => self.constant_pool.resolve_string(super_class.index()),
            None => Ok(String::new()),
        }
    }

    pub fn interface_names(&self) -> Result<Vec<String>, ParseError> {
        self.interfaces
            .values
            .iter()
            .map(|i| self.constant_pool.resolve_string(i.index()))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub flags: FieldAccessFlags,
    pub name: Addressed<ConstantUtf8>,
    pub descriptor: Addressed<ConstantUtf8>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct Fields {
    pub values: Vec<Field>,
}

impl IntoIterator for Fields {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[derive(Debug, Clone)]
pub struct Method {
    pub flags: MethodAccessFlags,
    pub name: Addressed<ConstantUtf8>,
    pub descriptor: Addressed<ConstantUtf8>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct Methods {
    pub values: Vec<Method>,
}

impl Methods {
    /// Find a method by bare name. Descriptors are not consulted: calls in
    /// this machine are frame-local, so overloads cannot collide yet.
    pub fn locate(&self, name: &str) -> Option<&Method> {
        self.values.iter().find(|m| {
            m.name
                .try_resolve()
                .ok()
                .and_then(|n| n.try_string().ok())
                .is_some_and(|n| n == name)
        })
    }
}

#[derive(Debug, Clone)]
pub struct Interfaces {
    pub values: Vec<Addressed<ConstantClass>>,
}

impl IntoIterator for Interfaces {
    type Item = Addressed<ConstantClass>;
    type IntoIter = std::vec::IntoIter<Addressed<ConstantClass>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[derive(Debug, Clone)]
pub struct MetaData {
    pub minor_version: u16,
    pub major_version: u16,
}

/// A lazy, typed pointer into the constant pool. Resolution happens on
/// demand so entries can reference entries that parse later.
#[derive(Clone)]
pub struct Addressed<T> {
    phantom: PhantomData<T>,

    index: u16,
    entries: Arc<RwLock<Vec<ConstantEntry>>>,
}

impl<T> Addressed<T> {
    pub fn from(index: u16, pool: Arc<RwLock<Vec<ConstantEntry>>>) -> Self {
        Self {
            phantom: PhantomData,
            index,
            entries: pool,
        }
    }

    pub fn index(&self) -> u16 {
        self.index
    }
}

impl<T> fmt::Debug for Addressed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addressed {{ {} }}", self.index)
    }
}

pub trait Resolvable<T> {
    fn resolve(&self) -> T {
        self.try_resolve().unwrap()
    }

    fn try_resolve(&self) -> Result<T>;
}

macro_rules! address {
    ($type: ty, $enum: ident) => {
        impl Resolvable<$type> for Addressed<$type> {
            fn try_resolve(&self) -> anyhow::Result<$type> {
                let entries = self.entries.read();
                let value = (self.index as usize)
                    .checked_sub(1)
                    .and_then(|i| entries.get(i))
                    .ok_or(anyhow::anyhow!("no constant @ {}", self.index))?;

                match value {
                    ConstantEntry::$enum(data) => Ok(data.clone()),
                    _ => Err(anyhow::anyhow!(
                        "expected {} got {:#?} @ {}",
                        stringify!($enum),
                        value,
                        self.index
                    )),
                }
            }
        }
    };
}

impl Resolvable<ConstantEntry> for Addressed<ConstantEntry> {
    fn try_resolve(&self) -> Result<ConstantEntry> {
        let entries = self.entries.read();
        let value = (self.index as usize)
            .checked_sub(1)
            .and_then(|i| entries.get(i))
            .ok_or(anyhow::anyhow!("no constant @ {}", self.index))?;

        Ok(value.clone())
    }
}

address!(ConstantClass, Class);
address!(ConstantNameAndType, NameAndType);
address!(ConstantUtf8, Utf8);
