use std::rc::Rc;

use anyhow::{anyhow, Result};
use enum_as_inner::EnumAsInner;
use parking_lot::RwLock;

use crate::classfile::{Indexed, Resolvable};

pub mod tags {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELD: u8 = 9;
    pub const METHOD: u8 = 10;
    pub const INTERFACE_METHOD: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;
}

/// The class file constant pool.
///
/// Entries are shared behind an `Rc` so that [`Indexed`] references handed
/// out during parsing stay valid while the pool grows during patching.
/// Indices are 1-based, as in the class file format. 64 bit entries occupy
/// two slots; the second slot is a [`ConstantEntry::Reserved`] placeholder.
#[derive(Debug, Clone)]
pub struct ConstantPool {
    pub entries: Rc<RwLock<Vec<ConstantEntry>>>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RwLock::new(vec![])),
        }
    }

    pub fn insert(&mut self, entry: ConstantEntry) {
        let mut pool = self.entries.write();
        pool.push(entry)
    }

    pub fn get(&self, index: u16) -> Option<ConstantEntry> {
        let slot = (index as usize).checked_sub(1)?;
        let pool = self.entries.read();
        pool.get(slot).cloned()
    }

    pub fn address<T>(&self, for_index: u16) -> Indexed<T> {
        Indexed::from(for_index, Rc::clone(&self.entries))
    }

    /// Appends an entry, returning its 1-based index. 64 bit entries get
    /// their reserved second slot appended automatically.
    pub fn push(&mut self, entry: ConstantEntry) -> u16 {
        let reserve_next = matches!(entry, ConstantEntry::Long(_) | ConstantEntry::Double(_));

        let mut pool = self.entries.write();
        pool.push(entry);
        let index = pool.len() as u16;

        if reserve_next {
            pool.push(ConstantEntry::Reserved);
        }

        index
    }

    /// Returns the index of a Utf8 entry with the given contents, appending
    /// one if the pool does not contain it yet.
    pub fn intern_utf8(&mut self, value: &str) -> u16 {
        {
            let pool = self.entries.read();
            for (i, entry) in pool.iter().enumerate() {
                if let ConstantEntry::Utf8(data) = entry {
                    if data.bytes == value.as_bytes() {
                        return (i + 1) as u16;
                    }
                }
            }
        }

        self.push(ConstantEntry::Utf8(ConstantUtf8 {
            bytes: value.as_bytes().to_vec(),
        }))
    }

    /// Returns the index of a String entry wrapping the given contents,
    /// appending the String (and its Utf8) if needed.
    pub fn intern_string(&mut self, value: &str) -> u16 {
        let utf8 = self.intern_utf8(value);

        {
            let pool = self.entries.read();
            for (i, entry) in pool.iter().enumerate() {
                if let ConstantEntry::String(data) = entry {
                    if data.string.index() == utf8 {
                        return (i + 1) as u16;
                    }
                }
            }
        }

        let string = self.address(utf8);
        self.push(ConstantEntry::String(ConstantString { string }))
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let pool = self.entries.read();
        let mut bytes = Vec::new();

        // The count field is one larger than the number of slots
        bytes.extend_from_slice(&((pool.len() + 1) as u16).to_be_bytes());

        for entry in pool.iter() {
            entry.encode_into(&mut bytes)?;
        }

        Ok(bytes)
    }

    pub(crate) fn perform_format_checking(&self) -> Result<()> {
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
                ConstantEntry::InvokeDynamic(data) | ConstantEntry::Dynamic(data) => {
                    data.name_and_type.try_resolve()?;
                }
                ConstantEntry::Module(data) | ConstantEntry::Package(data) => {
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

#[derive(Debug, Clone)]
pub struct ConstantClass {
    pub name: Indexed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantField {
    pub class: Indexed<ConstantClass>,
    pub name_and_type: Indexed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantMethod {
    pub class: Indexed<ConstantClass>,
    pub name_and_type: Indexed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantString {
    pub string: Indexed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantNameAndType {
    pub name: Indexed<ConstantUtf8>,
    pub descriptor: Indexed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantUtf8 {
    pub bytes: Vec<u8>,
}

impl ConstantUtf8 {
    pub fn string(&self) -> String {
        String::from_utf8(self.bytes.clone()).expect("malformed utf8 constant")
    }

    pub fn try_string(&self) -> Result<String> {
        Ok(String::from_utf8(self.bytes.clone())?)
    }
}

impl ConstantString {
    pub fn try_string(&self) -> Result<String> {
        self.string.try_resolve()?.try_string()
    }
}

#[derive(Debug, Clone)]
pub struct ConstantMethodHandle {
    pub kind: u8,
    pub index: u16,
}

#[derive(Debug, Clone)]
pub struct ConstantMethodType {
    pub descriptor: Indexed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantDynamic {
    pub bootstrap_method_index: u16,
    pub name_and_type: Indexed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantModule {
    pub name: Indexed<ConstantUtf8>,
}

#[derive(EnumAsInner, Clone, Debug)]
pub enum ConstantEntry {
    Class(ConstantClass),
    Field(ConstantField),
    Method(ConstantMethod),
    InterfaceMethod(ConstantMethod),
    String(ConstantString),
    Integer(u32),
    Float(f32),
    Long(u64),
    Double(f64),
    NameAndType(ConstantNameAndType),
    Utf8(ConstantUtf8),
    MethodHandle(ConstantMethodHandle),
    MethodType(ConstantMethodType),
    Dynamic(ConstantDynamic),
    InvokeDynamic(ConstantDynamic),
    Module(ConstantModule),
    Package(ConstantModule),
    Reserved,
}

impl ConstantEntry {
    pub fn encode_into(&self, bytes: &mut Vec<u8>) -> Result<()> {
        match self {
            ConstantEntry::Class(data) => {
                bytes.push(tags::CLASS);
                bytes.extend_from_slice(&data.name.index().to_be_bytes());
            }
            ConstantEntry::Field(data) => {
                bytes.push(tags::FIELD);
                bytes.extend_from_slice(&data.class.index().to_be_bytes());
                bytes.extend_from_slice(&data.name_and_type.index().to_be_bytes());
            }
            ConstantEntry::Method(data) => {
                bytes.push(tags::METHOD);
                bytes.extend_from_slice(&data.class.index().to_be_bytes());
                bytes.extend_from_slice(&data.name_and_type.index().to_be_bytes());
            }
            ConstantEntry::InterfaceMethod(data) => {
                bytes.push(tags::INTERFACE_METHOD);
                bytes.extend_from_slice(&data.class.index().to_be_bytes());
                bytes.extend_from_slice(&data.name_and_type.index().to_be_bytes());
            }
            ConstantEntry::String(data) => {
                bytes.push(tags::STRING);
                bytes.extend_from_slice(&data.string.index().to_be_bytes());
            }
            ConstantEntry::Integer(value) => {
                bytes.push(tags::INTEGER);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            ConstantEntry::Float(value) => {
                bytes.push(tags::FLOAT);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            ConstantEntry::Long(value) => {
                bytes.push(tags::LONG);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            ConstantEntry::Double(value) => {
                bytes.push(tags::DOUBLE);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            ConstantEntry::NameAndType(data) => {
                bytes.push(tags::NAME_AND_TYPE);
                bytes.extend_from_slice(&data.name.index().to_be_bytes());
                bytes.extend_from_slice(&data.descriptor.index().to_be_bytes());
            }
            ConstantEntry::Utf8(data) => {
                if data.bytes.len() > u16::MAX as usize {
                    return Err(anyhow!("utf8 constant exceeds format limit"));
                }
                bytes.push(tags::UTF8);
                bytes.extend_from_slice(&(data.bytes.len() as u16).to_be_bytes());
                bytes.extend_from_slice(&data.bytes);
            }
            ConstantEntry::MethodHandle(data) => {
                bytes.push(tags::METHOD_HANDLE);
                bytes.push(data.kind);
                bytes.extend_from_slice(&data.index.to_be_bytes());
            }
            ConstantEntry::MethodType(data) => {
                bytes.push(tags::METHOD_TYPE);
                bytes.extend_from_slice(&data.descriptor.index().to_be_bytes());
            }
            ConstantEntry::Dynamic(data) => {
                bytes.push(tags::DYNAMIC);
                bytes.extend_from_slice(&data.bootstrap_method_index.to_be_bytes());
                bytes.extend_from_slice(&data.name_and_type.index().to_be_bytes());
            }
            ConstantEntry::InvokeDynamic(data) => {
                bytes.push(tags::INVOKE_DYNAMIC);
                bytes.extend_from_slice(&data.bootstrap_method_index.to_be_bytes());
                bytes.extend_from_slice(&data.name_and_type.index().to_be_bytes());
            }
            ConstantEntry::Module(data) => {
                bytes.push(tags::MODULE);
                bytes.extend_from_slice(&data.name.index().to_be_bytes());
            }
            ConstantEntry::Package(data) => {
                bytes.push(tags::PACKAGE);
                bytes.extend_from_slice(&data.name.index().to_be_bytes());
            }
            // Second slot of a 64 bit entry, not materialised in the format
            ConstantEntry::Reserved => {}
        }

        Ok(())
    }
}
