use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// One configured injection: a literal value applied to one or many
/// pointcuts. An injection with no pointcut at all has no effect; a
/// missing value rejects the whole run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Injection {
    pub value: Option<String>,
    pub pointcut: Option<String>,
    pub pointcuts: Option<Vec<String>>,
}

impl fmt::Display for Injection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Injection{{value={:?}, pointcut={:?}, pointcuts={:?}}}",
            self.value, self.pointcut, self.pointcuts
        )
    }
}

/// Which patch mechanism to use for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Rewrite constants and bodies directly in the loaded class.
    #[default]
    Pool,
    /// Redefine the class through an isolated override layer.
    Overlay,
}

/// Shape of the TOML configuration file consumed by the CLI.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub class_path: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default, rename = "injection")]
    pub injections: Vec<Injection>,
}
