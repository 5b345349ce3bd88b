use crate::{
    attributes::Attributes,
    flags::{ClassFileAccessFlags, FieldAccessFlags, MethodAccessFlags},
    pool::{ConstantClass, ConstantEntry, ConstantNameAndType, ConstantPool, ConstantUtf8},
};
use anyhow::Result;
use parking_lot::RwLock;
use std::{fmt, marker::PhantomData, rc::Rc};

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub constant_pool: ConstantPool,
    pub version: ClassVersion,

    pub access_flags: ClassFileAccessFlags,
    pub this_class: Indexed<ConstantClass>,
    pub super_class: Option<Indexed<ConstantClass>>,

    pub interfaces: Vec<Indexed<ConstantClass>>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Attributes,
}

impl ClassFile {
    /// Binary name of this class, in internal form (`a/b/C`).
    pub fn name(&self) -> Result<String> {
        self.this_class.try_resolve()?.name.try_resolve()?.try_string()
    }

    /// Index of the declared field with the given name, if any.
    /// Inherited fields are not visible here by construction.
    pub fn field_index(&self, name: &str) -> Result<Option<usize>> {
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.try_resolve()?.try_string()? == name {
                return Ok(Some(i));
            }
        }

        Ok(None)
    }

    /// Indices of all declared methods sharing the given name, in
    /// declaration order, ignoring descriptors.
    pub fn method_indices(&self, name: &str) -> Result<Vec<usize>> {
        let mut found = Vec::new();
        for (i, method) in self.methods.iter().enumerate() {
            if method.name.try_resolve()?.try_string()? == name {
                found.push(i);
            }
        }

        Ok(found)
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub flags: FieldAccessFlags,
    pub name: Indexed<ConstantUtf8>,
    pub descriptor: Indexed<ConstantUtf8>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub flags: MethodAccessFlags,
    pub name: Indexed<ConstantUtf8>,
    pub descriptor: Indexed<ConstantUtf8>,
    pub attributes: Attributes,
}

impl Method {
    /// `name(Ldescriptor;)` form used when reporting overload candidates.
    pub fn display_name(&self) -> Result<String> {
        Ok(format!(
            "{}{}",
            self.name.try_resolve()?.try_string()?,
            self.descriptor.try_resolve()?.try_string()?
        ))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClassVersion {
    pub minor: u16,
    pub major: u16,
}

/// A 1-based reference into the constant pool, typed by the entry kind it
/// is expected to resolve to. Resolution is lazy so forward references
/// created mid-parse are fine.
#[derive(Clone)]
pub struct Indexed<T> {
    phantom: PhantomData<T>,

    index: u16,
    entries: Rc<RwLock<Vec<ConstantEntry>>>,
}

impl<T> Indexed<T> {
    pub fn from(index: u16, pool: Rc<RwLock<Vec<ConstantEntry>>>) -> Self {
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

impl<T> fmt::Debug for Indexed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Indexed {{ {} }}", self.index)
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
        impl Resolvable<$type> for Indexed<$type> {
            fn try_resolve(&self) -> anyhow::Result<$type> {
                let slot = (self.index as usize)
                    .checked_sub(1)
                    .ok_or(anyhow::anyhow!("pool index 0 is not addressable"))?;

                let entries = self.entries.read();
                let value = entries
                    .get(slot)
                    .ok_or(anyhow::anyhow!("no pool entry at {}", self.index))?;

                match value {
                    ConstantEntry::$enum(data) => Ok(data.clone()),
                    _ => Err(anyhow::anyhow!(
                        "expected {} got {:?} @ {}",
                        stringify!($enum),
                        value,
                        self.index
                    )),
                }
            }
        }
    };
}

impl Resolvable<ConstantEntry> for Indexed<ConstantEntry> {
    fn try_resolve(&self) -> Result<ConstantEntry> {
        let slot = (self.index as usize)
            .checked_sub(1)
            .ok_or(anyhow::anyhow!("pool index 0 is not addressable"))?;

        let pool = self.entries.read();
        let value = pool
            .get(slot)
            .ok_or(anyhow::anyhow!("no pool entry at {}", self.index))?;

        Ok(value.clone())
    }
}

address!(ConstantClass, Class);
address!(ConstantNameAndType, NameAndType);
address!(ConstantUtf8, Utf8);
