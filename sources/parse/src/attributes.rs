use crate::{
    classfile::{Addressed, Resolvable},
    error::ParseError,
    flags::ClassFileAccessFlags,
    pool::{ConstantClass, ConstantEntry, ConstantPool, ConstantUtf8},
};
use bytes::Bytes;
use support::bytes_ext::SafeBuf;

/// Names the JVM specification assigns to predefined attributes. Anything
/// not in this table parses as [`AttrTag::Unknown`] and keeps its raw body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrTag {
    ConstantValue,
    Code,
    StackMapTable,
    Exceptions,
    InnerClasses,
    EnclosingMethod,
    Synthetic,
    Signature,
    SourceFile,
    SourceDebugExtension,
    LineNumberTable,
    LocalVariableTable,
    LocalVariableTypeTable,
    Deprecated,
    RuntimeVisibleAnnotations,
    RuntimeInvisibleAnnotations,
    RuntimeVisibleParameterAnnotations,
    RuntimeInvisibleParameterAnnotations,
    RuntimeVisibleTypeAnnotations,
    RuntimeInvisibleTypeAnnotations,
    AnnotationDefault,
    BootstrapMethods,
    MethodParameters,
    Module,
    ModulePackages,
    ModuleMainClass,
    NestHost,
    NestMembers,
    Record,
    PermittedSubclasses,
    Unknown,
}

impl AttrTag {
    pub fn from_name(name: &str) -> Self {
        match name {
            "ConstantValue" => AttrTag::ConstantValue,
            "Code" => AttrTag::Code,
            "StackMapTable" => AttrTag::StackMapTable,
            "Exceptions" => AttrTag::Exceptions,
            "InnerClasses" => AttrTag::InnerClasses,
            "EnclosingMethod" => AttrTag::EnclosingMethod,
            "Synthetic" => AttrTag::Synthetic,
            "Signature" => AttrTag::Signature,
            "SourceFile" => AttrTag::SourceFile,
            "SourceDebugExtension" => AttrTag::SourceDebugExtension,
            "LineNumberTable" => AttrTag::LineNumberTable,
            "LocalVariableTable" => AttrTag::LocalVariableTable,
            "LocalVariableTypeTable" => AttrTag::LocalVariableTypeTable,
            "Deprecated" => AttrTag::Deprecated,
            "RuntimeVisibleAnnotations" => AttrTag::RuntimeVisibleAnnotations,
            "RuntimeInvisibleAnnotations" => AttrTag::RuntimeInvisibleAnnotations,
            "RuntimeVisibleParameterAnnotations" => AttrTag::RuntimeVisibleParameterAnnotations,
            "RuntimeInvisibleParameterAnnotations" => AttrTag::RuntimeInvisibleParameterAnnotations,
            "RuntimeVisibleTypeAnnotations" => AttrTag::RuntimeVisibleTypeAnnotations,
            "RuntimeInvisibleTypeAnnotations" => AttrTag::RuntimeInvisibleTypeAnnotations,
            "AnnotationDefault" => AttrTag::AnnotationDefault,
            "BootstrapMethods" => AttrTag::BootstrapMethods,
            "MethodParameters" => AttrTag::MethodParameters,
            "Module" => AttrTag::Module,
            "ModulePackages" => AttrTag::ModulePackages,
            "ModuleMainClass" => AttrTag::ModuleMainClass,
            "NestHost" => AttrTag::NestHost,
            "NestMembers" => AttrTag::NestMembers,
            "Record" => AttrTag::Record,
            "PermittedSubclasses" => AttrTag::PermittedSubclasses,
            _ => AttrTag::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AttrTag::ConstantValue => "ConstantValue",
            AttrTag::Code => "Code",
            AttrTag::StackMapTable => "StackMapTable",
            AttrTag::Exceptions => "Exceptions",
            AttrTag::InnerClasses => "InnerClasses",
            AttrTag::EnclosingMethod => "EnclosingMethod",
            AttrTag::Synthetic => "Synthetic",
            AttrTag::Signature => "Signature",
            AttrTag::SourceFile => "SourceFile",
            AttrTag::SourceDebugExtension => "SourceDebugExtension",
            AttrTag::LineNumberTable => "LineNumberTable",
            AttrTag::LocalVariableTable => "LocalVariableTable",
            AttrTag::LocalVariableTypeTable => "LocalVariableTypeTable",
            AttrTag::Deprecated => "Deprecated",
            AttrTag::RuntimeVisibleAnnotations => "RuntimeVisibleAnnotations",
            AttrTag::RuntimeInvisibleAnnotations => "RuntimeInvisibleAnnotations",
            AttrTag::RuntimeVisibleParameterAnnotations => "RuntimeVisibleParameterAnnotations",
            AttrTag::RuntimeInvisibleParameterAnnotations => "RuntimeInvisibleParameterAnnotations",
            AttrTag::RuntimeVisibleTypeAnnotations => "RuntimeVisibleTypeAnnotations",
            AttrTag::RuntimeInvisibleTypeAnnotations => "RuntimeInvisibleTypeAnnotations",
            AttrTag::AnnotationDefault => "AnnotationDefault",
            AttrTag::BootstrapMethods => "BootstrapMethods",
            AttrTag::MethodParameters => "MethodParameters",
            AttrTag::Module => "Module",
            AttrTag::ModulePackages => "ModulePackages",
            AttrTag::ModuleMainClass => "ModuleMainClass",
            AttrTag::NestHost => "NestHost",
            AttrTag::NestMembers => "NestMembers",
            AttrTag::Record => "Record",
            AttrTag::PermittedSubclasses => "PermittedSubclasses",
            AttrTag::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub tag: AttrTag,
    pub name: Addressed<ConstantUtf8>,
    pub length: u32,
    pub info: AttributeInfo,
}

#[derive(Debug, Clone)]
pub enum AttributeInfo {
    ConstantValue(ConstantValueAttribute),
    Code(CodeAttribute),
    Exceptions(ExceptionsAttribute),
    InnerClasses(InnerClassesAttribute),
    EnclosingMethod(EnclosingMethodAttribute),
    Synthetic,
    Signature(SignatureAttribute),
    SourceFile(SourceFileAttribute),
    /// Recognized-but-undecoded tags, and every unknown name. The body is
    /// carried verbatim so nothing is lost and siblings stay aligned.
    Raw(Bytes),
}

#[derive(Debug, Clone)]
pub struct ConstantValueAttribute {
    pub value: Addressed<ConstantEntry>,
}

#[derive(Debug, Clone)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionEntry>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct ExceptionEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// `None` when the class-file index is 0: the handler catches everything.
    pub catch_type: Option<Addressed<ConstantClass>>,
}

#[derive(Debug, Clone)]
pub struct ExceptionsAttribute {
    pub classes: Vec<Addressed<ConstantClass>>,
}

#[derive(Debug, Clone)]
pub struct InnerClassesAttribute {
    pub entries: Vec<InnerClassEntry>,
}

#[derive(Debug, Clone)]
pub struct InnerClassEntry {
    pub inner_info: Addressed<ConstantClass>,
    pub outer_info: Option<Addressed<ConstantClass>>,
    pub inner_name: Option<Addressed<ConstantUtf8>>,
    pub access: ClassFileAccessFlags,
}

#[derive(Debug, Clone)]
pub struct EnclosingMethodAttribute {
    pub class: Addressed<ConstantClass>,
    pub method_index: u16,
}

#[derive(Debug, Clone)]
pub struct SignatureAttribute {
    pub signature: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct SourceFileAttribute {
    pub source_file: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct Attributes {
    pub values: Vec<Attribute>,
}

impl Attributes {
    pub fn find(&self, tag: AttrTag) -> Option<&Attribute> {
        self.values.iter().find(|a| a.tag == tag)
    }

    pub fn get(&self, tag: AttrTag) -> Result<&Attribute, ParseError> {
        self.find(tag)
            .ok_or(ParseError::AttrTagNotFound { tag: tag.name() })
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.find(AttrTag::Code).and_then(|a| match &a.info {
            AttributeInfo::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn is_synthetic(&self) -> bool {
        self.find(AttrTag::Synthetic).is_some()
    }

    pub fn parse(bytes: &mut Bytes, constant_pool: &ConstantPool) -> Result<Self, ParseError> {
        let length = bytes.try_get_u16()?;
        let mut attributes = Attributes {
            values: Vec::with_capacity(length.into()),
        };

        for _ in 0..length {
            let name: Addressed<ConstantUtf8> = constant_pool.address(bytes.try_get_u16()?);
            let attr_length = bytes.try_get_u32()?;

            // Carving the body out up front keeps the outer cursor aligned
            // for sibling attributes whatever the tag turns out to be.
            let mut body = bytes.try_take_bytes(attr_length as usize)?;

            let tag = name
                .try_resolve()
                .ok()
                .and_then(|n| n.try_string().ok())
                .map(|n| AttrTag::from_name(&n))
                .unwrap_or(AttrTag::Unknown);

            let info = Self::decode(tag, &mut body, constant_pool)?;

            attributes.values.push(Attribute {
                tag,
                name,
                length: attr_length,
                info,
            });
        }

        Ok(attributes)
    }

    fn decode(
        tag: AttrTag,
        body: &mut Bytes,
        constant_pool: &ConstantPool,
    ) -> Result<AttributeInfo, ParseError> {
        Ok(match tag {
            AttrTag::ConstantValue => AttributeInfo::ConstantValue(ConstantValueAttribute {
                value: constant_pool.address(body.try_get_u16()?),
            }),
            AttrTag::Code => AttributeInfo::Code(CodeAttribute::parse(body, constant_pool)?),
            AttrTag::Exceptions => {
                let count = body.try_get_u16()?;
                let mut classes = Vec::with_capacity(count.into());
                for _ in 0..count {
                    classes.push(constant_pool.address(body.try_get_u16()?));
                }

                AttributeInfo::Exceptions(ExceptionsAttribute { classes })
            }
            AttrTag::InnerClasses => {
                let count = body.try_get_u16()?;
                let mut entries = Vec::with_capacity(count.into());
                for _ in 0..count {
                    let inner_index = body.try_get_u16()?;
                    let outer_index = body.try_get_u16()?;
                    let name_index = body.try_get_u16()?;
                    let access = ClassFileAccessFlags::from_bits(body.try_get_u16()?)?;

                    // A nested class cannot enclose itself
                    if inner_index == outer_index {
                        return Err(ParseError::InvalidInnerClass { index: inner_index });
                    }

                    entries.push(InnerClassEntry {
                        inner_info: constant_pool.address(inner_index),
                        outer_info: (outer_index != 0)
                            .then(|| constant_pool.address(outer_index)),
                        inner_name: (name_index != 0).then(|| constant_pool.address(name_index)),
                        access,
                    });
                }

                AttributeInfo::InnerClasses(InnerClassesAttribute { entries })
            }
            AttrTag::EnclosingMethod => AttributeInfo::EnclosingMethod(EnclosingMethodAttribute {
                class: constant_pool.address(body.try_get_u16()?),
                method_index: body.try_get_u16()?,
            }),
            AttrTag::Synthetic => AttributeInfo::Synthetic,
            AttrTag::Signature => AttributeInfo::Signature(SignatureAttribute {
                signature: constant_pool.address(body.try_get_u16()?),
            }),
            AttrTag::SourceFile => AttributeInfo::SourceFile(SourceFileAttribute {
                source_file: constant_pool.address(body.try_get_u16()?),
            }),
            _ => AttributeInfo::Raw(body.clone()),
        })
    }
}

impl CodeAttribute {
    pub fn parse(bytes: &mut Bytes, constant_pool: &ConstantPool) -> Result<Self, ParseError> {
        let max_stack = bytes.try_get_u16()?;
        let max_locals = bytes.try_get_u16()?;

        let code_length = bytes.try_get_u32()?;
        let code = bytes.try_take_bytes(code_length as usize)?.to_vec();

        let exception_length = bytes.try_get_u16()?;
        let mut exception_table: Vec<ExceptionEntry> = Vec::with_capacity(exception_length.into());
        for _ in 0..exception_length {
            let start_pc = bytes.try_get_u16()?;
            let end_pc = bytes.try_get_u16()?;
            let handler_pc = bytes.try_get_u16()?;
            let catch_index = bytes.try_get_u16()?;

            exception_table.push(ExceptionEntry {
                start_pc,
                end_pc,
                handler_pc,
                catch_type: (catch_index != 0).then(|| constant_pool.address(catch_index)),
            })
        }

        let attributes = Attributes::parse(bytes, constant_pool)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }
}
