use classfile::classfile::ClassFile;
use tracing::debug;

use crate::{error::InjectError, pointcut::Pointcut};

/// The member a pointcut resolved to, as an index into the class's declared
/// field or method table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberTarget {
    Field(usize),
    Method(usize),
}

/// Decides whether the pointcut's member names a declared field or a
/// declared method. Fields win over methods; methods are matched by name
/// only, and an overloaded name is a hard error rather than a silent
/// first-match pick. Inherited members are never considered.
pub fn classify(class: &ClassFile, pointcut: &Pointcut) -> Result<MemberTarget, InjectError> {
    let member = &pointcut.member;

    if let Some(index) = class
        .field_index(member)
        .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?
    {
        debug!("{} resolved to a declared field", pointcut);
        return Ok(MemberTarget::Field(index));
    }

    debug!("did not find field {}, trying methods ...", member);

    let candidates = class
        .method_indices(member)
        .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?;

    match candidates.len() {
        0 => Err(InjectError::MemberNotFound {
            pointcut: pointcut.to_string(),
            class_name: pointcut.class_name.clone(),
            member: member.clone(),
        }),
        1 => {
            debug!("{} resolved to a declared method", pointcut);
            Ok(MemberTarget::Method(candidates[0]))
        }
        _ => {
            let mut names = Vec::with_capacity(candidates.len());
            for index in candidates {
                let name = class.methods[index]
                    .display_name()
                    .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?;
                names.push(name);
            }

            Err(InjectError::AmbiguousMethodTarget {
                pointcut: pointcut.to_string(),
                class_name: pointcut.class_name.clone(),
                member: member.clone(),
                candidates: names,
            })
        }
    }
}
