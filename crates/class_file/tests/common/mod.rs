#![allow(dead_code)]

//! Hand assembles class files so tests do not depend on a Java compiler.

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

pub struct ClassBuilder {
    pub magic: u32,
    pub minor_version: u16,
    pub major_version: u16,
    pool: Vec<u8>,
    next_index: u16,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
    pub trailing: Vec<u8>,
}

impl ClassBuilder {
    pub fn new() -> Self {
        Self {
            magic: 0xCAFEBABE,
            minor_version: 0,
            major_version: 52,
            pool: Vec::new(),
            next_index: 1,
            access_flags: 0,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
            trailing: Vec::new(),
        }
    }

    /// `public class <name> extends java/lang/Object`
    pub fn class(name: &str) -> Self {
        let mut builder = Self::new();
        builder.access_flags = 0x0021;
        builder.this_class = builder.class_ref(name);
        builder.super_class = builder.class_ref("java/lang/Object");
        builder
    }

    fn entry(&mut self, tag: u8, body: &[u8], slots: u16) -> u16 {
        let index = self.next_index;
        self.pool.push(tag);
        self.pool.extend_from_slice(body);
        self.next_index += slots;
        index
    }

    pub fn utf8_bytes(&mut self, bytes: &[u8]) -> u16 {
        let mut body = u16_be(bytes.len() as u16);
        body.extend_from_slice(bytes);
        self.entry(1, &body, 1)
    }

    pub fn utf8(&mut self, s: &str) -> u16 {
        self.utf8_bytes(s.as_bytes())
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.entry(3, &value.to_be_bytes(), 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        self.entry(5, &value.to_be_bytes(), 2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        self.entry(6, &value.to_be_bytes(), 2)
    }

    pub fn class_ref(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.entry(7, &u16_be(name_index), 1)
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let string_index = self.utf8(value);
        self.entry(8, &u16_be(string_index), 1)
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let mut body = u16_be(self.utf8(name));
        body.extend(u16_be(self.utf8(descriptor)));
        self.entry(12, &body, 1)
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let mut body = u16_be(self.class_ref(class));
        body.extend(u16_be(self.name_and_type(name, descriptor)));
        self.entry(10, &body, 1)
    }

    pub fn method_handle(&mut self, reference_kind: u8, reference_index: u16) -> u16 {
        let mut body = vec![reference_kind];
        body.extend(u16_be(reference_index));
        self.entry(15, &body, 1)
    }

    /// Appends a raw pool entry, for exercising malformed input.
    pub fn raw_entry(&mut self, tag: u8, body: &[u8]) -> u16 {
        self.entry(tag, body, 1)
    }

    pub fn interface(&mut self, name: &str) -> u16 {
        let index = self.class_ref(name);
        self.interfaces.push(index);
        index
    }

    pub fn attribute(&mut self, name: &str, info: &[u8]) -> Vec<u8> {
        let mut bytes = u16_be(self.utf8(name));
        bytes.extend((info.len() as u32).to_be_bytes());
        bytes.extend_from_slice(info);
        bytes
    }

    pub fn code_attribute(
        &mut self,
        max_stack: u16,
        max_locals: u16,
        code: &[u8],
        attributes: Vec<Vec<u8>>,
    ) -> Vec<u8> {
        let mut info = u16_be(max_stack);
        info.extend(u16_be(max_locals));
        info.extend((code.len() as u32).to_be_bytes());
        info.extend_from_slice(code);
        info.extend(u16_be(0));
        info.extend(table(attributes));
        self.attribute("Code", &info)
    }

    pub fn field(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) {
        let member = self.member(access_flags, name, descriptor, attributes);
        self.fields.push(member);
    }

    pub fn method(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) {
        let member = self.member(access_flags, name, descriptor, attributes);
        self.methods.push(member);
    }

    pub fn class_attribute(&mut self, attribute: Vec<u8>) {
        self.attributes.push(attribute);
    }

    fn member(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) -> Vec<u8> {
        let mut bytes = u16_be(access_flags);
        bytes.extend(u16_be(self.utf8(name)));
        bytes.extend(u16_be(self.utf8(descriptor)));
        bytes.extend(table(attributes));
        bytes
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = self.magic.to_be_bytes().to_vec();
        bytes.extend(u16_be(self.minor_version));
        bytes.extend(u16_be(self.major_version));
        bytes.extend(u16_be(self.next_index));
        bytes.extend_from_slice(&self.pool);
        bytes.extend(u16_be(self.access_flags));
        bytes.extend(u16_be(self.this_class));
        bytes.extend(u16_be(self.super_class));
        bytes.extend(u16_be(self.interfaces.len() as u16));
        for &index in &self.interfaces {
            bytes.extend(u16_be(index));
        }
        bytes.extend(table(self.fields.clone()));
        bytes.extend(table(self.methods.clone()));
        bytes.extend(table(self.attributes.clone()));
        bytes.extend_from_slice(&self.trailing);
        bytes
    }
}

pub fn u16_be(value: u16) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

fn table(records: Vec<Vec<u8>>) -> Vec<u8> {
    let mut bytes = u16_be(records.len() as u16);
    bytes.extend(records.into_iter().flatten());
    bytes
}
