//! Builds parseable class files around hand-written bytecode so execution
//! tests drive the real parser output, not fixtures.

use std::sync::Arc;

use parse::classfile::ClassFile;
use parse::parser::Parser;

pub struct MethodSpec<'a> {
    pub name: &'a str,
    pub descriptor: &'a str,
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: &'a [u8],
    pub exceptions: &'a [ExceptionSpec<'a>],
}

pub struct ExceptionSpec<'a> {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// `None` builds a catch-all entry (catch_type index 0).
    pub catch_class: Option<&'a str>,
}

#[derive(Default)]
struct Builder {
    constants: Vec<Vec<u8>>,
    slots: u16,
    methods: Vec<Vec<u8>>,
}

impl Builder {
    fn utf8(&mut self, text: &str) -> u16 {
        let mut encoded = vec![1];
        encoded.extend((text.len() as u16).to_be_bytes());
        encoded.extend(text.as_bytes());
        self.constants.push(encoded);
        self.slots += 1;
        self.slots
    }

    fn class(&mut self, name_index: u16) -> u16 {
        let mut encoded = vec![7];
        encoded.extend(name_index.to_be_bytes());
        self.constants.push(encoded);
        self.slots += 1;
        self.slots
    }

    fn method(&mut self, name: u16, descriptor: u16, code: Vec<u8>) {
        let mut encoded = Vec::new();
        encoded.extend(0x0009_u16.to_be_bytes()); // PUBLIC | STATIC
        encoded.extend(name.to_be_bytes());
        encoded.extend(descriptor.to_be_bytes());
        encoded.extend(1_u16.to_be_bytes());
        encoded.extend(code);
        self.methods.push(encoded);
    }

    fn method_without_code(&mut self, name: u16, descriptor: u16) {
        let mut encoded = Vec::new();
        encoded.extend(0x0409_u16.to_be_bytes()); // PUBLIC | STATIC | ABSTRACT
        encoded.extend(name.to_be_bytes());
        encoded.extend(descriptor.to_be_bytes());
        encoded.extend(0_u16.to_be_bytes());
        self.methods.push(encoded);
    }

    fn build(self, this_class: u16) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(0xCAFE_BABE_u32.to_be_bytes());
        out.extend(0_u16.to_be_bytes());
        out.extend(61_u16.to_be_bytes());

        out.extend((self.slots + 1).to_be_bytes());
        for constant in self.constants {
            out.extend(constant);
        }

        out.extend(0x0021_u16.to_be_bytes());
        out.extend(this_class.to_be_bytes());
        out.extend(0_u16.to_be_bytes()); // no super
        out.extend(0_u16.to_be_bytes()); // interfaces
        out.extend(0_u16.to_be_bytes()); // fields

        out.extend((self.methods.len() as u16).to_be_bytes());
        for method in self.methods {
            out.extend(method);
        }

        out.extend(0_u16.to_be_bytes()); // attributes
        out
    }
}

fn code_attribute(
    name_index: u16,
    spec: &MethodSpec,
    exceptions: &[(u16, u16, u16, u16)],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend(spec.max_stack.to_be_bytes());
    body.extend(spec.max_locals.to_be_bytes());
    body.extend((spec.code.len() as u32).to_be_bytes());
    body.extend(spec.code);
    body.extend((exceptions.len() as u16).to_be_bytes());
    for (start_pc, end_pc, handler_pc, catch_type) in exceptions {
        body.extend(start_pc.to_be_bytes());
        body.extend(end_pc.to_be_bytes());
        body.extend(handler_pc.to_be_bytes());
        body.extend(catch_type.to_be_bytes());
    }
    body.extend(0_u16.to_be_bytes()); // no sub-attributes

    let mut out = Vec::new();
    out.extend(name_index.to_be_bytes());
    out.extend((body.len() as u32).to_be_bytes());
    out.extend(body);
    out
}

/// A class named `TestSubject` holding the given methods.
pub fn class_with_methods(methods: &[MethodSpec]) -> Arc<ClassFile> {
    let mut builder = Builder::default();
    let class_name = builder.utf8("TestSubject");
    let this_class = builder.class(class_name);
    let code_name = builder.utf8("Code");

    for spec in methods {
        let name = builder.utf8(spec.name);
        let descriptor = builder.utf8(spec.descriptor);

        let exceptions: Vec<(u16, u16, u16, u16)> = spec
            .exceptions
            .iter()
            .map(|entry| {
                let catch_type = match entry.catch_class {
                    Some(class) => {
                        let name = builder.utf8(class);
                        builder.class(name)
                    }
                    None => 0,
                };
                (entry.start_pc, entry.end_pc, entry.handler_pc, catch_type)
            })
            .collect();

        builder.method(name, descriptor, code_attribute(code_name, spec, &exceptions));
    }

    let bytes = builder.build(this_class);
    Arc::new(Parser::new(&bytes).parse().expect("test class parses"))
}

/// A class whose single method carries no `Code` attribute at all.
pub fn class_without_code(method_name: &str) -> Arc<ClassFile> {
    let mut builder = Builder::default();
    let class_name = builder.utf8("TestSubject");
    let this_class = builder.class(class_name);
    let name = builder.utf8(method_name);
    let descriptor = builder.utf8("()V");
    builder.method_without_code(name, descriptor);

    let bytes = builder.build(this_class);
    Arc::new(Parser::new(&bytes).parse().expect("test class parses"))
}
