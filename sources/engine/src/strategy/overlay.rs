use std::{cell::RefCell, rc::Rc};

use anyhow::anyhow;
use classfile::{classfile::ClassFile, flags::FieldAccessFlag, parser::Parser};
use tracing::{debug, warn};

use crate::{
    artifact::LoadedClass, classify::MemberTarget, error::InjectError, pointcut::Pointcut,
    writer::ArtifactWriter,
};

use super::{bind_constant_value, synthesize_string_return, PatchStrategy};

/// Strategy B: redefinition through an isolated override layer.
///
/// The patch runs against a separate copy of the class loaded inside an
/// [`OverlayContext`]; only a fully successful redefinition is committed
/// back to the run cache and written out. Field overrides are attached
/// uniformly for static and instance fields, with the documented caveat
/// that a non-final instance field's own initialiser still wins at
/// construction time.
pub struct OverlayRedefine;

impl PatchStrategy for OverlayRedefine {
    fn name(&self) -> &'static str {
        "overlay"
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
        let mut context = OverlayContext::open(&class, pointcut)?;

        match target {
            MemberTarget::Field(index) => {
                let field = &context.class_file().fields[index];
                let is_static = field.flags.has(FieldAccessFlag::STATIC);
                let is_final = field.flags.has(FieldAccessFlag::FINAL);

                if !is_static && !is_final {
                    // The override binds the declared initialiser only: the
                    // instance initialiser assigns the original literal
                    // after this binding, so that value wins at runtime
                    warn!(
                        "field target {} is neither static nor final; \
                         the injected value applies to the declared initialiser, \
                         constructed instances keep the original value",
                        pointcut
                    );
                }

                bind_constant_value(context.class_file_mut(), index, value)
                    .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?;
            }
            MemberTarget::Method(index) => {
                // Redefinition intercepts by name; it refuses to guess
                // between overloads even if classification were to change
                let candidates = context
                    .class_file()
                    .method_indices(&pointcut.member)
                    .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?;
                if candidates.len() != 1 {
                    return Err(InjectError::patch(
                        &pointcut.to_string(),
                        anyhow!(
                            "redefinition requires exactly one method named '{}', found {}",
                            pointcut.member,
                            candidates.len()
                        ),
                    ));
                }

                synthesize_string_return(context.class_file_mut(), index, value)
                    .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?;
            }
        }

        context.commit(&mut class, writer, pointcut)?;

        Ok(())
    }
}

/// Scoped redefinition context.
///
/// Owns the working copy of the class between load and commit, so a failed
/// patch never leaks partial mutations into the run cache. The copy is
/// materialised by re-loading the cached artifact's current binary image,
/// which keeps mutations from earlier pointcuts visible. The context is
/// disposed when it goes out of scope whether the patch succeeded or not.
struct OverlayContext {
    class_name: String,
    redefined: Option<ClassFile>,
}

impl OverlayContext {
    fn open(shared: &LoadedClass, pointcut: &Pointcut) -> Result<Self, InjectError> {
        let image = classfile::writer::encode(shared.class_file())
            .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?;
        let redefined = Parser::new(&image)
            .parse()
            .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?;

        debug!("opened overlay context for {}", shared.name());

        Ok(Self {
            class_name: shared.name().to_string(),
            redefined: Some(redefined),
        })
    }

    fn class_file(&self) -> &ClassFile {
        self.redefined.as_ref().expect("context already committed")
    }

    fn class_file_mut(&mut self) -> &mut ClassFile {
        self.redefined.as_mut().expect("context already committed")
    }

    /// Writes the redefined class and swaps it into the run cache.
    fn commit(
        mut self,
        shared: &mut LoadedClass,
        writer: &ArtifactWriter,
        pointcut: &Pointcut,
    ) -> Result<(), InjectError> {
        let redefined = self.redefined.take().expect("context already committed");

        if shared.is_frozen() {
            shared.defrost();
        }
        shared.redefine(redefined);

        writer.write(shared, pointcut)?;

        Ok(())
    }
}

impl Drop for OverlayContext {
    fn drop(&mut self) {
        if self.redefined.is_some() {
            debug!("overlay context for {} disposed without commit", self.class_name);
        }
    }
}
