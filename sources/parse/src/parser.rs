use bytes::Bytes;
use tracing::debug;

use crate::attributes::Attributes;
use crate::classfile::{
    Addressed, ClassFile, Field, Fields, Interfaces, MetaData, Method, Methods,
};
use crate::constants::MAGIC;
use crate::error::ParseError;
use crate::flags::{ClassFileAccessFlags, FieldAccessFlags, MethodAccessFlags};
use crate::pool::{
    ConstantClass, ConstantDouble, ConstantDynamicInfo, ConstantEntry, ConstantField,
    ConstantFloat, ConstantInteger, ConstantInterfaceMethod, ConstantLong, ConstantMethod,
    ConstantMethodHandle, ConstantMethodType, ConstantModule, ConstantNameAndType,
    ConstantPackage, ConstantPool, ConstantString, ConstantTag, ConstantUtf8,
};
use crate::result::ParseResult;
use support::bytes_ext::SafeBuf;

/// Consumes a class-file byte slice front to back. Every step reads from
/// the shared cursor, so the structural order is fixed: magic, versions,
/// pool, flags, this/super, interfaces, fields, methods, attributes.
pub struct Parser {
    bytes: Bytes,
}

impl Parser {
    pub fn new(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool, ParseError> {
        let length = self.bytes.try_get_u16()?;
        let mut pool = ConstantPool::new();

        let mut i = 0;
        while i < length.saturating_sub(1) {
            let tag = ConstantTag::from_tag(self.bytes.try_get_u8()?)?;
            let entry = match tag {
                ConstantTag::Class => ConstantEntry::Class(ConstantClass {
                    tag,
                    name: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Field => ConstantEntry::Field(ConstantField {
                    tag,
                    class: pool.address(self.bytes.try_get_u16()?),
                    name_and_type: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Method => ConstantEntry::Method(ConstantMethod {
                    tag,
                    class: pool.address(self.bytes.try_get_u16()?),
                    name_and_type: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::InterfaceMethod => {
                    ConstantEntry::InterfaceMethod(ConstantInterfaceMethod {
                        tag,
                        class: pool.address(self.bytes.try_get_u16()?),
                        name_and_type: pool.address(self.bytes.try_get_u16()?),
                    })
                }
                ConstantTag::String => ConstantEntry::String(ConstantString {
                    tag,
                    string: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Integer => ConstantEntry::Integer(ConstantInteger {
                    tag,
                    bytes: self.bytes.try_get_u32()?,
                }),
                ConstantTag::Float => ConstantEntry::Float(ConstantFloat {
                    tag,
                    bytes: self.bytes.try_get_f32()?,
                }),
                ConstantTag::Long => ConstantEntry::Long(ConstantLong {
                    tag,
                    bytes: self.bytes.try_get_u64()?,
                }),
                ConstantTag::Double => ConstantEntry::Double(ConstantDouble {
                    tag,
                    bytes: self.bytes.try_get_f64()?,
                }),
                ConstantTag::NameAndType => ConstantEntry::NameAndType(ConstantNameAndType {
                    tag,
                    name: pool.address(self.bytes.try_get_u16()?),
                    descriptor: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Utf8 => {
                    let length = self.bytes.try_get_u16()?;
                    let bytes = self.bytes.try_take_bytes(length.into())?.to_vec();

                    ConstantEntry::Utf8(ConstantUtf8 {
                        tag,
                        length,
                        bytes,
                    })
                }
                ConstantTag::MethodHandle => ConstantEntry::MethodHandle(ConstantMethodHandle {
                    tag,
                    kind: self.bytes.try_get_u8()?,
                    index: self.bytes.try_get_u16()?,
                }),
                ConstantTag::MethodType => ConstantEntry::MethodType(ConstantMethodType {
                    tag,
                    descriptor: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Dynamic => ConstantEntry::Dynamic(ConstantDynamicInfo {
                    tag,
                    bootstrap_index: self.bytes.try_get_u16()?,
                    name_and_type: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::InvokeDynamic => ConstantEntry::InvokeDynamic(ConstantDynamicInfo {
                    tag,
                    bootstrap_index: self.bytes.try_get_u16()?,
                    name_and_type: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Module => ConstantEntry::Module(ConstantModule {
                    tag,
                    name: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Package => ConstantEntry::Package(ConstantPackage {
                    tag,
                    name: pool.address(self.bytes.try_get_u16()?),
                }),
            };

            let should_reserve_next =
                matches!(entry, ConstantEntry::Long(_) | ConstantEntry::Double(_));
            pool.insert(entry);

            // 64 bit entries take up 2 slots, so insert a placeholder and
            // advance the logical index by an additional 1
            if should_reserve_next {
                pool.insert(ConstantEntry::Reserved);
                i += 1;
            }

            i += 1;
        }

        Ok(pool)
    }

    fn parse_interfaces(&mut self, pool: &ConstantPool) -> Result<Interfaces, ParseError> {
        let length = self.bytes.try_get_u16()?;
        let mut interfaces = Interfaces {
            values: Vec::with_capacity(length.into()),
        };

        for _ in 0..length {
            interfaces
                .values
                .push(pool.address(self.bytes.try_get_u16()?));
        }

        Ok(interfaces)
    }

    fn parse_fields(&mut self, pool: &ConstantPool) -> Result<Fields, ParseError> {
        let length = self.bytes.try_get_u16()?;
        let mut fields = Fields {
            values: Vec::with_capacity(length.into()),
        };

        for _ in 0..length {
            fields.values.push(Field {
                flags: FieldAccessFlags::from_bits(self.bytes.try_get_u16()?)?,
                name: pool.address(self.bytes.try_get_u16()?),
                descriptor: pool.address(self.bytes.try_get_u16()?),
                attributes: Attributes::parse(&mut self.bytes, pool)?,
            });
        }

        Ok(fields)
    }

    fn parse_methods(&mut self, pool: &ConstantPool) -> Result<Methods, ParseError> {
        let length = self.bytes.try_get_u16()?;
        let mut methods = Methods {
            values: Vec::with_capacity(length.into()),
        };

        for _ in 0..length {
            methods.values.push(Method {
                flags: MethodAccessFlags::from_bits(self.bytes.try_get_u16()?)?,
                name: pool.address(self.bytes.try_get_u16()?),
                descriptor: pool.address(self.bytes.try_get_u16()?),
                attributes: Attributes::parse(&mut self.bytes, pool)?,
            });
        }

        Ok(methods)
    }

    pub fn parse(&mut self) -> ParseResult {
        let magic = self.bytes.try_get_u32()?;
        if magic != MAGIC {
            return Err(ParseError::BadMagic { found: magic });
        }

        let minor = self.bytes.try_get_u16()?;
        let major = self.bytes.try_get_u16()?;

        let meta_data = MetaData {
            minor_version: minor,
            major_version: major,
        };

        let constant_pool = self.parse_constant_pool()?;

        // Every symbolic reference in the pool must reach the entry kind it
        // claims to point at before anything downstream trusts it
        constant_pool.perform_format_checking()?;

        let access_flags = ClassFileAccessFlags::from_bits(self.bytes.try_get_u16()?)?;
        let this_class: Addressed<ConstantClass> = constant_pool.address(self.bytes.try_get_u16()?);

        // Index 0 means no superclass, which only java/lang/Object may claim
        let super_class_index = self.bytes.try_get_u16()?;
        let super_class = (super_class_index != 0).then(|| constant_pool.address(super_class_index));

        let interfaces = self.parse_interfaces(&constant_pool)?;
        let fields = self.parse_fields(&constant_pool)?;
        let methods = self.parse_methods(&constant_pool)?;
        let attributes = Attributes::parse(&mut self.bytes, &constant_pool)?;

        debug!(
            major,
            pool = constant_pool.len(),
            methods = methods.values.len(),
            "parsed class"
        );

        Ok(ClassFile {
            constant_pool,
            meta_data,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }
}
