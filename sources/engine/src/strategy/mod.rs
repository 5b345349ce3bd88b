//! The two interchangeable patch mechanisms.
//!
//! Both rewrite one member's bound value and leave every other member
//! alone; they differ in how they get there. [`PoolRewrite`] mutates the
//! cached class directly. [`OverlayRedefine`] redefines an isolated copy
//! and only commits it back once the whole patch succeeded, which also
//! gives it the documented divergent behaviour on non-final instance
//! fields.

use std::{cell::RefCell, rc::Rc};

use anyhow::{anyhow, Result};
use classfile::{
    attributes::{Attributes, CodeAttribute, ConstantValueAttribute},
    classfile::ClassFile,
    constants::{ATTR_CODE, ATTR_CONSTANT_VALUE},
};

use crate::{
    artifact::LoadedClass, classify::MemberTarget, config::StrategyKind, error::InjectError,
    pointcut::Pointcut, writer::ArtifactWriter,
};

mod overlay;
mod pool_rewrite;

pub use overlay::OverlayRedefine;
pub use pool_rewrite::PoolRewrite;

const LDC: u8 = 0x12;
const LDC_W: u8 = 0x13;
const ARETURN: u8 = 0xb0;

pub trait PatchStrategy {
    fn name(&self) -> &'static str;

    /// Applies the patch to the classified member and hands the artifact to
    /// the writer. Implementations must not leave a partial mutation behind
    /// on error.
    fn apply(
        &self,
        artifact: &Rc<RefCell<LoadedClass>>,
        target: MemberTarget,
        value: &str,
        pointcut: &Pointcut,
        writer: &ArtifactWriter,
    ) -> Result<(), InjectError>;
}

pub fn build(kind: StrategyKind) -> Box<dyn PatchStrategy> {
    match kind {
        StrategyKind::Pool => Box::new(PoolRewrite),
        StrategyKind::Overlay => Box::new(OverlayRedefine),
    }
}

/// Binds `value` as the field's compile time constant: a fresh String pool
/// entry wired into a `ConstantValue` attribute, replacing any previous
/// binding.
pub(crate) fn bind_constant_value(
    class_file: &mut ClassFile,
    field_index: usize,
    value: &str,
) -> Result<()> {
    let mut pool = class_file.constant_pool.clone();
    let string_index = pool.intern_string(value);
    let name_index = pool.intern_utf8(ATTR_CONSTANT_VALUE);
    let name = pool.address(name_index);

    let field = class_file
        .fields
        .get_mut(field_index)
        .ok_or_else(|| anyhow!("field index {} out of range", field_index))?;

    field.attributes.replace(
        ATTR_CONSTANT_VALUE,
        name,
        ConstantValueAttribute::encode(string_index),
    )?;

    Ok(())
}

/// Replaces the method's entire body with a push of `value` followed by a
/// reference return. The descriptor is untouched; only the implementation
/// changes. Local slot count is preserved so parameters keep their space.
pub(crate) fn synthesize_string_return(
    class_file: &mut ClassFile,
    method_index: usize,
    value: &str,
) -> Result<()> {
    let mut pool = class_file.constant_pool.clone();
    let string_index = pool.intern_string(value);
    let name_index = pool.intern_utf8(ATTR_CODE);
    let name = pool.address(name_index);

    let method = class_file
        .methods
        .get(method_index)
        .ok_or_else(|| anyhow!("method index {} out of range", method_index))?;

    let old: CodeAttribute = method
        .attributes
        .known_attribute(&class_file.constant_pool)
        .map_err(|_| anyhow!("method has no body to replace (abstract or native?)"))?;

    let mut code = Vec::with_capacity(4);
    if string_index <= u8::MAX as u16 {
        code.push(LDC);
        code.push(string_index as u8);
    } else {
        code.push(LDC_W);
        code.extend_from_slice(&string_index.to_be_bytes());
    }
    code.push(ARETURN);

    let body = CodeAttribute {
        max_stack: 1,
        max_locals: old.max_locals,
        code,
        exception_table: vec![],
        attributes: Attributes::empty(),
    };

    class_file.methods[method_index]
        .attributes
        .replace(ATTR_CODE, name, body.encode()?)?;

    Ok(())
}
