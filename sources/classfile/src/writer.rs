//! Serialization of an in-memory [`ClassFile`] back to the binary format.
//!
//! Everything the patch engine did not touch is re-emitted from the parsed
//! representation, so unrelated members and attributes come out byte for
//! byte as they went in.

use anyhow::Result;

use crate::classfile::ClassFile;
use crate::constants::MAGIC;

pub fn encode(class_file: &ClassFile) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();

    bytes.extend_from_slice(&MAGIC.to_be_bytes());
    bytes.extend_from_slice(&class_file.version.minor.to_be_bytes());
    bytes.extend_from_slice(&class_file.version.major.to_be_bytes());

    bytes.extend_from_slice(&class_file.constant_pool.encode()?);

    bytes.extend_from_slice(&class_file.access_flags.bits().to_be_bytes());
    bytes.extend_from_slice(&class_file.this_class.index().to_be_bytes());

    let super_index = class_file
        .super_class
        .as_ref()
        .map(|s| s.index())
        .unwrap_or(0);
    bytes.extend_from_slice(&super_index.to_be_bytes());

    bytes.extend_from_slice(&(class_file.interfaces.len() as u16).to_be_bytes());
    for interface in class_file.interfaces.iter() {
        bytes.extend_from_slice(&interface.index().to_be_bytes());
    }

    bytes.extend_from_slice(&(class_file.fields.len() as u16).to_be_bytes());
    for field in class_file.fields.iter() {
        bytes.extend_from_slice(&field.flags.bits().to_be_bytes());
        bytes.extend_from_slice(&field.name.index().to_be_bytes());
        bytes.extend_from_slice(&field.descriptor.index().to_be_bytes());
        field.attributes.encode_into(&mut bytes)?;
    }

    bytes.extend_from_slice(&(class_file.methods.len() as u16).to_be_bytes());
    for method in class_file.methods.iter() {
        bytes.extend_from_slice(&method.flags.bits().to_be_bytes());
        bytes.extend_from_slice(&method.name.index().to_be_bytes());
        bytes.extend_from_slice(&method.descriptor.index().to_be_bytes());
        method.attributes.encode_into(&mut bytes)?;
    }

    class_file.attributes.encode_into(&mut bytes)?;

    Ok(bytes)
}
