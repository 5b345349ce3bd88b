use crate::error::InjectError;

/// A parsed injection target: a fully qualified class name plus the simple
/// name of one of its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointcut {
    pub class_name: String,
    pub member: String,
}

impl Pointcut {
    /// Splits a dotted target at the last `.`. The member part is not
    /// validated further here; whether it names anything real is decided
    /// against the loaded class.
    pub fn parse(target: &str) -> Result<Self, InjectError> {
        let idx = target
            .rfind('.')
            .ok_or_else(|| InjectError::MalformedPointcut(target.to_string()))?;

        Ok(Self {
            class_name: target[..idx].to_string(),
            member: target[idx + 1..].to_string(),
        })
    }
}

impl std::fmt::Display for Pointcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.class_name, self.member)
    }
}
