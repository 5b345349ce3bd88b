use anyhow::{anyhow, Result};
use bytes::Bytes;

use crate::attributes::Attributes;
use crate::bytes_ext::SafeBuf;
use crate::classfile::{ClassFile, ClassVersion, Field, Indexed, Method};
use crate::constants::MAGIC;
use crate::flags::{ClassFileAccessFlags, FieldAccessFlags, MethodAccessFlags};
use crate::pool::{
    tags, ConstantClass, ConstantDynamic, ConstantEntry, ConstantField, ConstantMethod,
    ConstantMethodHandle, ConstantMethodType, ConstantModule, ConstantNameAndType, ConstantPool,
    ConstantString, ConstantUtf8,
};

pub struct Parser {
    bytes: Bytes,
}

impl Parser {
    pub fn new(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let length = self.bytes.try_get_u16()?;
        let mut pool = ConstantPool::new();

        let mut i = 0;
        while i < length.saturating_sub(1) {
            let tag = self.bytes.try_get_u8()?;
            let entry = match tag {
                tags::CLASS => ConstantEntry::Class(ConstantClass {
                    name: pool.address(self.bytes.try_get_u16()?),
                }),
                tags::FIELD => ConstantEntry::Field(ConstantField {
                    class: pool.address(self.bytes.try_get_u16()?),
                    name_and_type: pool.address(self.bytes.try_get_u16()?),
                }),
                tags::METHOD => ConstantEntry::Method(ConstantMethod {
                    class: pool.address(self.bytes.try_get_u16()?),
                    name_and_type: pool.address(self.bytes.try_get_u16()?),
                }),
                tags::INTERFACE_METHOD => ConstantEntry::InterfaceMethod(ConstantMethod {
                    class: pool.address(self.bytes.try_get_u16()?),
                    name_and_type: pool.address(self.bytes.try_get_u16()?),
                }),
                tags::STRING => ConstantEntry::String(ConstantString {
                    string: pool.address(self.bytes.try_get_u16()?),
                }),
                tags::INTEGER => ConstantEntry::Integer(self.bytes.try_get_u32()?),
                tags::FLOAT => ConstantEntry::Float(self.bytes.try_get_f32()?),
                tags::LONG => ConstantEntry::Long(self.bytes.try_get_u64()?),
                tags::DOUBLE => ConstantEntry::Double(self.bytes.try_get_f64()?),
                tags::NAME_AND_TYPE => ConstantEntry::NameAndType(ConstantNameAndType {
                    name: pool.address(self.bytes.try_get_u16()?),
                    descriptor: pool.address(self.bytes.try_get_u16()?),
                }),
                tags::UTF8 => {
                    let length = self.bytes.try_get_u16()?;
                    let mut bytes: Vec<u8> = Vec::with_capacity(length.into());

                    for _ in 0..length {
                        bytes.push(self.bytes.try_get_u8()?);
                    }

                    ConstantEntry::Utf8(ConstantUtf8 { bytes })
                }
                tags::METHOD_HANDLE => ConstantEntry::MethodHandle(ConstantMethodHandle {
                    kind: self.bytes.try_get_u8()?,
                    index: self.bytes.try_get_u16()?,
                }),
                tags::METHOD_TYPE => ConstantEntry::MethodType(ConstantMethodType {
                    descriptor: pool.address(self.bytes.try_get_u16()?),
                }),
                tags::DYNAMIC => ConstantEntry::Dynamic(ConstantDynamic {
                    bootstrap_method_index: self.bytes.try_get_u16()?,
                    name_and_type: pool.address(self.bytes.try_get_u16()?),
                }),
                tags::INVOKE_DYNAMIC => ConstantEntry::InvokeDynamic(ConstantDynamic {
                    bootstrap_method_index: self.bytes.try_get_u16()?,
                    name_and_type: pool.address(self.bytes.try_get_u16()?),
                }),
                tags::MODULE => ConstantEntry::Module(ConstantModule {
                    name: pool.address(self.bytes.try_get_u16()?),
                }),
                tags::PACKAGE => ConstantEntry::Package(ConstantModule {
                    name: pool.address(self.bytes.try_get_u16()?),
                }),
                _ => return Err(anyhow!("unknown constant pool tag {}", tag)),
            };

            let should_reserve_next =
                matches!(entry, ConstantEntry::Long(_) | ConstantEntry::Double(_));
            pool.insert(entry);

            // 64 bit types take up two pool slots, so insert a placeholder
            // and skip an additional index
            if should_reserve_next {
                pool.insert(ConstantEntry::Reserved);
                i += 1;
            }

            i += 1;
        }

        Ok(pool)
    }

    fn parse_interfaces(
        &mut self,
        pool: &ConstantPool,
    ) -> Result<Vec<Indexed<ConstantClass>>> {
        let length = self.bytes.try_get_u16()?;
        let mut interfaces = Vec::with_capacity(length.into());

        for _ in 0..length {
            interfaces.push(pool.address(self.bytes.try_get_u16()?));
        }

        Ok(interfaces)
    }

    fn parse_fields(&mut self, pool: &ConstantPool) -> Result<Vec<Field>> {
        let length = self.bytes.try_get_u16()?;
        let mut fields = Vec::with_capacity(length.into());

        for _ in 0..length {
            fields.push(Field {
                flags: FieldAccessFlags::from_bits(self.bytes.try_get_u16()?)?,
                name: pool.address(self.bytes.try_get_u16()?),
                descriptor: pool.address(self.bytes.try_get_u16()?),
                attributes: Attributes::parse(&mut self.bytes, pool)?,
            });
        }

        Ok(fields)
    }

    fn parse_methods(&mut self, pool: &ConstantPool) -> Result<Vec<Method>> {
        let length = self.bytes.try_get_u16()?;
        let mut methods = Vec::with_capacity(length.into());

        for _ in 0..length {
            methods.push(Method {
                flags: MethodAccessFlags::from_bits(self.bytes.try_get_u16()?)?,
                name: pool.address(self.bytes.try_get_u16()?),
                descriptor: pool.address(self.bytes.try_get_u16()?),
                attributes: Attributes::parse(&mut self.bytes, pool)?,
            });
        }

        Ok(methods)
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let magic = self.bytes.try_get_u32()?;

        // Format checking: the first four bytes must be the magic number
        if magic != MAGIC {
            return Err(anyhow!("invalid magic value '{:#x}'", magic));
        }

        let minor = self.bytes.try_get_u16()?;
        let major = self.bytes.try_get_u16()?;

        let version = ClassVersion { minor, major };

        let constant_pool = self.parse_constant_pool()?;
        // Format checking: every pool entry must reference entries of the
        // kind its tag demands
        constant_pool.perform_format_checking()?;

        let access_flags = ClassFileAccessFlags::from_bits(self.bytes.try_get_u16()?)?;
        let this_class: Indexed<ConstantClass> = constant_pool.address(self.bytes.try_get_u16()?);

        let super_class_index = self.bytes.try_get_u16()?;
        let mut super_class: Option<Indexed<ConstantClass>> = None;
        if super_class_index != 0 {
            super_class = Some(constant_pool.address(super_class_index));
        }

        let interfaces = self.parse_interfaces(&constant_pool)?;
        let fields = self.parse_fields(&constant_pool)?;
        let methods = self.parse_methods(&constant_pool)?;
        let attributes = Attributes::parse(&mut self.bytes, &constant_pool)?;

        // Format checking: no trailing garbage
        if !self.bytes.is_empty() {
            return Err(anyhow!("classfile has extra bytes at the end"));
        }

        Ok(ClassFile {
            constant_pool,
            version,
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
