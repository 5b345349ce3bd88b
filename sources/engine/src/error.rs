use std::path::PathBuf;

use thiserror::Error;

/// Terminal failures for an injection run. Every variant names the
/// pointcut that caused it; none of them are retryable, since the inputs
/// are static configuration.
#[derive(Error, Debug)]
pub enum InjectError {
    #[error(
        "can not parse '{0}' into pattern <FULL_CLASS_NAME>.<FIELD|METHOD>, \
         expected something like foo.Bar.MY_VERSION or foo.Bar.getSomeValue"
    )]
    MalformedPointcut(String),

    #[error("value is null for injection {0}")]
    NullInjectionValue(String),

    #[error("can not locate class '{class_name}' on the search path (pointcut '{pointcut}')")]
    ArtifactNotFound { pointcut: String, class_name: String },

    #[error("no field or method named '{member}' in '{class_name}' (pointcut '{pointcut}')")]
    MemberNotFound {
        pointcut: String,
        class_name: String,
        member: String,
    },

    #[error(
        "method '{member}' in '{class_name}' is ambiguous, candidates: {} (pointcut '{pointcut}')",
        candidates.join(", ")
    )]
    AmbiguousMethodTarget {
        pointcut: String,
        class_name: String,
        member: String,
        candidates: Vec<String>,
    },

    #[error("patch failed for pointcut '{pointcut}'")]
    PatchFailure {
        pointcut: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("can not write patched class to {path} (pointcut '{pointcut}')")]
    WriteFailure {
        pointcut: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InjectError {
    pub(crate) fn patch(pointcut: &str, source: anyhow::Error) -> Self {
        InjectError::PatchFailure {
            pointcut: pointcut.to_string(),
            source,
        }
    }
}
