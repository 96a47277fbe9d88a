//! Hand-assembled class files for parser tests. Indices are the 1-based
//! class-file indices, with wide constants claiming two slots.

pub struct ClassFileBuilder {
    constants: Vec<Vec<u8>>,
    slots: u16,
    access: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl Default for ClassFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassFileBuilder {
    pub fn new() -> Self {
        Self {
            constants: Vec::new(),
            slots: 0,
            access: 0x0021, // PUBLIC | SUPER
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }

    fn push_constant(&mut self, encoded: Vec<u8>, width: u16) -> u16 {
        self.constants.push(encoded);
        self.slots += width;
        self.slots - width + 1
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        let mut encoded = vec![1];
        encoded.extend((text.len() as u16).to_be_bytes());
        encoded.extend(text.as_bytes());
        self.push_constant(encoded, 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut encoded = vec![3];
        encoded.extend(value.to_be_bytes());
        self.push_constant(encoded, 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let mut encoded = vec![5];
        encoded.extend(value.to_be_bytes());
        self.push_constant(encoded, 2)
    }

    pub fn class(&mut self, name_index: u16) -> u16 {
        let mut encoded = vec![7];
        encoded.extend(name_index.to_be_bytes());
        self.push_constant(encoded, 1)
    }

    pub fn string(&mut self, utf8_index: u16) -> u16 {
        let mut encoded = vec![8];
        encoded.extend(utf8_index.to_be_bytes());
        self.push_constant(encoded, 1)
    }

    pub fn raw_constant(&mut self, encoded: Vec<u8>) -> u16 {
        self.push_constant(encoded, 1)
    }

    pub fn this_class(&mut self, index: u16) -> &mut Self {
        self.this_class = index;
        self
    }

    pub fn super_class(&mut self, index: u16) -> &mut Self {
        self.super_class = index;
        self
    }

    pub fn method(&mut self, flags: u16, name: u16, descriptor: u16, attributes: Vec<Vec<u8>>) {
        let mut encoded = Vec::new();
        encoded.extend(flags.to_be_bytes());
        encoded.extend(name.to_be_bytes());
        encoded.extend(descriptor.to_be_bytes());
        encoded.extend((attributes.len() as u16).to_be_bytes());
        for attr in attributes {
            encoded.extend(attr);
        }
        self.methods.push(encoded);
    }

    pub fn field(&mut self, flags: u16, name: u16, descriptor: u16, attributes: Vec<Vec<u8>>) {
        // Fields and methods share their wire shape
        let mut encoded = Vec::new();
        encoded.extend(flags.to_be_bytes());
        encoded.extend(name.to_be_bytes());
        encoded.extend(descriptor.to_be_bytes());
        encoded.extend((attributes.len() as u16).to_be_bytes());
        for attr in attributes {
            encoded.extend(attr);
        }
        self.fields.push(encoded);
    }

    pub fn class_attribute(&mut self, attribute: Vec<u8>) {
        self.attributes.push(attribute);
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(0xCAFE_BABE_u32.to_be_bytes());
        out.extend(0_u16.to_be_bytes()); // minor
        out.extend(61_u16.to_be_bytes()); // major, Java 17

        out.extend((self.slots + 1).to_be_bytes());
        for constant in self.constants {
            out.extend(constant);
        }

        out.extend(self.access.to_be_bytes());
        out.extend(self.this_class.to_be_bytes());
        out.extend(self.super_class.to_be_bytes());

        out.extend((self.interfaces.len() as u16).to_be_bytes());
        for interface in self.interfaces {
            out.extend(interface.to_be_bytes());
        }

        out.extend((self.fields.len() as u16).to_be_bytes());
        for field in self.fields {
            out.extend(field);
        }

        out.extend((self.methods.len() as u16).to_be_bytes());
        for method in self.methods {
            out.extend(method);
        }

        out.extend((self.attributes.len() as u16).to_be_bytes());
        for attribute in self.attributes {
            out.extend(attribute);
        }

        out
    }
}

/// A named attribute with an arbitrary body.
pub fn attribute(name_index: u16, body: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::new();
    encoded.extend(name_index.to_be_bytes());
    encoded.extend((body.len() as u32).to_be_bytes());
    encoded.extend(body);
    encoded
}

/// A `Code` attribute body with the given bytecode and exception table.
pub fn code_attribute(
    name_index: u16,
    max_stack: u16,
    max_locals: u16,
    code: &[u8],
    exceptions: &[(u16, u16, u16, u16)],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend(max_stack.to_be_bytes());
    body.extend(max_locals.to_be_bytes());
    body.extend((code.len() as u32).to_be_bytes());
    body.extend(code);
    body.extend((exceptions.len() as u16).to_be_bytes());
    for (start_pc, end_pc, handler_pc, catch_type) in exceptions {
        body.extend(start_pc.to_be_bytes());
        body.extend(end_pc.to_be_bytes());
        body.extend(handler_pc.to_be_bytes());
        body.extend(catch_type.to_be_bytes());
    }
    body.extend(0_u16.to_be_bytes()); // no sub-attributes

    attribute(name_index, &body)
}
