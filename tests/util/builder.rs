//! Assembles small synthetic class files for the patch tests, standing in
//! for a compiler's output.

use std::fs;
use std::path::{Path, PathBuf};

use classfile::{
    attributes::{Attribute, Attributes, CodeAttribute, ConstantValueAttribute},
    classfile::{ClassFile, ClassVersion, Field, Method},
    constants::{ATTR_CODE, ATTR_CONSTANT_VALUE},
    flags::{ClassFileAccessFlags, FieldAccessFlags, MethodAccessFlags},
    pool::{ConstantClass, ConstantEntry, ConstantField as ConstantFieldRef, ConstantNameAndType, ConstantPool},
    writer,
};

const ACC_PUBLIC: u16 = 0x0001;
const ACC_STATIC: u16 = 0x0008;
const ACC_FINAL: u16 = 0x0010;
const ACC_SUPER: u16 = 0x0020;

const ALOAD_0: u8 = 0x2a;
const LDC: u8 = 0x12;
const PUTFIELD: u8 = 0xb5;
const RETURN: u8 = 0xb1;
const ARETURN: u8 = 0xb0;

pub struct ClassBuilder {
    name: String,
    pool: ConstantPool,
    this_class: u16,
    super_class: u16,
    fields: Vec<Field>,
    methods: Vec<Method>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        let mut pool = ConstantPool::new();

        let this_utf8 = pool.intern_utf8(&name.replace('.', "/"));
        let this_name = pool.address(this_utf8);
        let this_class = pool.push(ConstantEntry::Class(ConstantClass { name: this_name }));

        let super_utf8 = pool.intern_utf8("java/lang/Object");
        let super_name = pool.address(super_utf8);
        let super_class = pool.push(ConstantEntry::Class(ConstantClass { name: super_name }));

        Self {
            name: name.to_string(),
            pool,
            this_class,
            super_class,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn static_final_string_field(self, name: &str, value: &str) -> Self {
        self.string_field(name, ACC_PUBLIC | ACC_STATIC | ACC_FINAL, Some(value))
    }

    pub fn instance_string_field(self, name: &str) -> Self {
        self.string_field(name, ACC_PUBLIC, None)
    }

    fn string_field(mut self, name: &str, flags: u16, constant: Option<&str>) -> Self {
        let name_idx = self.pool.intern_utf8(name);
        let desc_idx = self.pool.intern_utf8("Ljava/lang/String;");

        let mut attributes = Attributes::empty();
        if let Some(value) = constant {
            let string_idx = self.pool.intern_string(value);
            let attr_name_idx = self.pool.intern_utf8(ATTR_CONSTANT_VALUE);
            attributes.values.push(Attribute {
                name: self.pool.address(attr_name_idx),
                data: ConstantValueAttribute::encode(string_idx),
            });
        }

        self.fields.push(Field {
            flags: FieldAccessFlags::from_bits(flags).unwrap(),
            name: self.pool.address(name_idx),
            descriptor: self.pool.address(desc_idx),
            attributes,
        });

        self
    }

    /// A method whose body loads and returns the given literal.
    pub fn string_method(mut self, name: &str, descriptor: &str, returns: &str) -> Self {
        let string_idx = self.pool.intern_string(returns);
        assert!(string_idx <= u8::MAX as u16, "test pool outgrew ldc range");

        let code = vec![LDC, string_idx as u8, ARETURN];
        self.push_method(name, descriptor, ACC_PUBLIC, code, 1)
    }

    /// A `<init>()V` that assigns the literal to the named instance field,
    /// the shape a compiler emits for a field initialiser.
    pub fn constructor_assigning(mut self, field: &str, literal: &str) -> Self {
        let string_idx = self.pool.intern_string(literal);
        assert!(string_idx <= u8::MAX as u16, "test pool outgrew ldc range");

        let nat_name = self.pool.intern_utf8(field);
        let nat_desc = self.pool.intern_utf8("Ljava/lang/String;");
        let name = self.pool.address(nat_name);
        let descriptor = self.pool.address(nat_desc);
        let nat_idx = self
            .pool
            .push(ConstantEntry::NameAndType(ConstantNameAndType {
                name,
                descriptor,
            }));

        let class = self.pool.address(self.this_class);
        let name_and_type = self.pool.address(nat_idx);
        let field_ref = self.pool.push(ConstantEntry::Field(ConstantFieldRef {
            class,
            name_and_type,
        }));

        let mut code = vec![ALOAD_0, LDC, string_idx as u8, PUTFIELD];
        code.extend_from_slice(&field_ref.to_be_bytes());
        code.push(RETURN);

        self.push_method("<init>", "()V", ACC_PUBLIC, code, 1)
    }

    fn push_method(
        mut self,
        name: &str,
        descriptor: &str,
        flags: u16,
        code: Vec<u8>,
        max_locals: u16,
    ) -> Self {
        let name_idx = self.pool.intern_utf8(name);
        let desc_idx = self.pool.intern_utf8(descriptor);

        let body = CodeAttribute {
            max_stack: 2,
            max_locals,
            code,
            exception_table: vec![],
            attributes: Attributes::empty(),
        };

        let attr_name_idx = self.pool.intern_utf8(ATTR_CODE);
        let mut attributes = Attributes::empty();
        attributes.values.push(Attribute {
            name: self.pool.address(attr_name_idx),
            data: body.encode().unwrap(),
        });

        self.methods.push(Method {
            flags: MethodAccessFlags::from_bits(flags).unwrap(),
            name: self.pool.address(name_idx),
            descriptor: self.pool.address(desc_idx),
            attributes,
        });

        self
    }

    pub fn build(&self) -> ClassFile {
        ClassFile {
            constant_pool: self.pool.clone(),
            version: ClassVersion {
                minor: 0,
                major: 52,
            },
            access_flags: ClassFileAccessFlags::from_bits(ACC_PUBLIC | ACC_SUPER).unwrap(),
            this_class: self.pool.address(self.this_class),
            super_class: Some(self.pool.address(self.super_class)),
            interfaces: vec![],
            fields: self.fields.clone(),
            methods: self.methods.clone(),
            attributes: Attributes::empty(),
        }
    }

    /// Writes the class below `root` at its package path and returns the
    /// file path.
    pub fn write_to(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for part in self.name.split('.') {
            path.push(part);
        }
        path.set_extension("class");

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, writer::encode(&self.build()).unwrap()).unwrap();

        path
    }
}
