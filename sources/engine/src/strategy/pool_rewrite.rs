use std::{cell::RefCell, rc::Rc};

use crate::{
    artifact::LoadedClass, classify::MemberTarget, error::InjectError, pointcut::Pointcut,
    writer::ArtifactWriter,
};

use super::{bind_constant_value, synthesize_string_return, PatchStrategy};

/// Strategy A: rewrite the constant pool of the cached class in place.
///
/// A field target is removed and re-added at the end of the field table
/// with its value bound as a compile time constant. A method target gets
/// its instruction stream replaced wholesale.
pub struct PoolRewrite;

impl PatchStrategy for PoolRewrite {
    fn name(&self) -> &'static str {
        "pool-rewrite"
    }

    fn apply(
        &self,
        artifact: &Rc<RefCell<LoadedClass>>,
        target: MemberTarget,
        value: &str,
        pointcut: &Pointcut,
        writer: &ArtifactWriter,
    ) -> Result<(), InjectError> {
        let mut class = artifact.borrow_mut();
        if class.is_frozen() {
            class.defrost();
        }

        match target {
            MemberTarget::Field(index) => {
                let class_file = class.class_file_mut();
                bind_constant_value(class_file, index, value)
                    .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?;

                // Remove / re-add: the rebound field moves to the end of
                // the declared field table
                let field = class_file.fields.remove(index);
                class_file.fields.push(field);
            }
            MemberTarget::Method(index) => {
                synthesize_string_return(class.class_file_mut(), index, value)
                    .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?;
            }
        }

        writer.write(&mut class, pointcut)?;

        Ok(())
    }
}
