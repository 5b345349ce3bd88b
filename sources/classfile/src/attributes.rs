use crate::{
    classfile::{Indexed, Resolvable},
    constants::{ATTR_CODE, ATTR_CONSTANT_VALUE},
    pool::{ConstantEntry, ConstantPool, ConstantUtf8},
};
use anyhow::{anyhow, Result};
use bytes::Bytes;

use crate::bytes_ext::SafeBuf;

/// A single attribute. Payloads are raw bytes; anything the engine does not
/// rewrite passes through untouched.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: Indexed<ConstantUtf8>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Attributes {
    pub values: Vec<Attribute>,
}

impl Attributes {
    pub fn empty() -> Self {
        Self { values: vec![] }
    }

    pub fn parse(bytes: &mut Bytes, constant_pool: &ConstantPool) -> Result<Self> {
        let length = bytes.try_get_u16()?;
        let mut attributes = Attributes {
            values: Vec::with_capacity(length.into()),
        };

        for _ in 0..length {
            let name = constant_pool.address(bytes.try_get_u16()?);
            let attr_length = bytes.try_get_u32()?;
            let mut info: Vec<u8> = Vec::with_capacity(attr_length as usize);

            for _ in 0..attr_length {
                info.push(bytes.try_get_u8()?);
            }

            attributes.values.push(Attribute { name, data: info });
        }

        Ok(attributes)
    }

    pub fn encode_into(&self, bytes: &mut Vec<u8>) -> Result<()> {
        if self.values.len() > u16::MAX as usize {
            return Err(anyhow!("attribute count exceeds format limit"));
        }

        bytes.extend_from_slice(&(self.values.len() as u16).to_be_bytes());
        for attr in self.values.iter() {
            bytes.extend_from_slice(&attr.name.index().to_be_bytes());
            bytes.extend_from_slice(&(attr.data.len() as u32).to_be_bytes());
            bytes.extend_from_slice(&attr.data);
        }

        Ok(())
    }

    pub fn find(&self, id: &str) -> Result<Option<&Attribute>> {
        for attr in self.values.iter() {
            if attr.name.try_resolve()?.try_string()? == id {
                return Ok(Some(attr));
            }
        }

        Ok(None)
    }

    /// Replaces the payload of the named attribute, or appends it when the
    /// member did not carry one yet. `name_index` must be the pool index of
    /// the attribute's name.
    pub fn replace(&mut self, id: &str, name_index: Indexed<ConstantUtf8>, data: Vec<u8>) -> Result<()> {
        for attr in self.values.iter_mut() {
            if attr.name.try_resolve()?.try_string()? == id {
                attr.data = data;
                return Ok(());
            }
        }

        self.values.push(Attribute {
            name: name_index,
            data,
        });

        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let mut found = None;
        for (i, attr) in self.values.iter().enumerate() {
            if attr.name.try_resolve()?.try_string()? == id {
                found = Some(i);
                break;
            }
        }

        if let Some(i) = found {
            self.values.remove(i);
        }

        Ok(found.is_some())
    }

    pub fn known_attribute<T>(&self, constant_pool: &ConstantPool) -> Result<T>
    where
        T: KnownAttribute,
    {
        let attr = self
            .find(T::id())?
            .ok_or_else(|| anyhow!("could not locate known attribute {}", T::id()))?;

        let bytes = Bytes::copy_from_slice(&attr.data);
        T::decode(bytes, constant_pool)
    }
}

pub trait KnownAttribute
where
    Self: Sized,
{
    fn decode(bytes: Bytes, constant_pool: &ConstantPool) -> Result<Self>;
    fn id() -> &'static str;
}

#[derive(Debug, Clone)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionEntry>,
    pub attributes: Attributes,
}

impl KnownAttribute for CodeAttribute {
    fn decode(mut bytes: Bytes, constant_pool: &ConstantPool) -> Result<Self> {
        let max_stack = bytes.try_get_u16()?;
        let max_locals = bytes.try_get_u16()?;

        let code_length = bytes.try_get_u32()?;
        let mut code: Vec<u8> = Vec::with_capacity(code_length as usize);
        for _ in 0..code_length {
            code.push(bytes.try_get_u8()?);
        }

        let exception_length = bytes.try_get_u16()?;
        let mut exception_table: Vec<ExceptionEntry> = Vec::with_capacity(exception_length.into());
        for _ in 0..exception_length {
            exception_table.push(ExceptionEntry {
                start_pc: bytes.try_get_u16()?,
                end_pc: bytes.try_get_u16()?,
                handler_pc: bytes.try_get_u16()?,
                catch_type: bytes.try_get_u16()?,
            })
        }
        let attributes = Attributes::parse(&mut bytes, constant_pool)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn id() -> &'static str {
        ATTR_CODE
    }
}

impl CodeAttribute {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();

        bytes.extend_from_slice(&self.max_stack.to_be_bytes());
        bytes.extend_from_slice(&self.max_locals.to_be_bytes());
        bytes.extend_from_slice(&(self.code.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.code);

        bytes.extend_from_slice(&(self.exception_table.len() as u16).to_be_bytes());
        for entry in self.exception_table.iter() {
            bytes.extend_from_slice(&entry.start_pc.to_be_bytes());
            bytes.extend_from_slice(&entry.end_pc.to_be_bytes());
            bytes.extend_from_slice(&entry.handler_pc.to_be_bytes());
            bytes.extend_from_slice(&entry.catch_type.to_be_bytes());
        }

        self.attributes.encode_into(&mut bytes)?;

        Ok(bytes)
    }
}

#[derive(Debug, Clone)]
pub struct ExceptionEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    // Raw pool index; 0 means "any"
    pub catch_type: u16,
}

#[derive(Debug, Clone)]
pub struct ConstantValueAttribute {
    pub value: Indexed<ConstantEntry>,
}

impl KnownAttribute for ConstantValueAttribute {
    fn decode(mut bytes: Bytes, constant_pool: &ConstantPool) -> Result<Self> {
        Ok(ConstantValueAttribute {
            value: constant_pool.address(bytes.try_get_u16()?),
        })
    }

    fn id() -> &'static str {
        ATTR_CONSTANT_VALUE
    }
}

impl ConstantValueAttribute {
    pub fn encode(value_index: u16) -> Vec<u8> {
        value_index.to_be_bytes().to_vec()
    }
}
