use std::{fs, path::PathBuf};

use tracing::debug;

use crate::{artifact::LoadedClass, error::InjectError, pointcut::Pointcut};

/// Writes a patched class below the output root, deriving the file path
/// from the class name. Freezes the artifact once the bytes are on disk.
pub struct ArtifactWriter {
    output_root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_root: PathBuf) -> Self {
        Self { output_root }
    }

    pub fn write(
        &self,
        class: &mut LoadedClass,
        pointcut: &Pointcut,
    ) -> Result<PathBuf, InjectError> {
        let mut path = self.output_root.clone();
        for part in class.name().split('.') {
            path.push(part);
        }
        path.set_extension("class");

        let bytes = classfile::writer::encode(class.class_file())
            .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| InjectError::WriteFailure {
                pointcut: pointcut.to_string(),
                path: path.clone(),
                source: e,
            })?;
        }

        fs::write(&path, bytes).map_err(|e| InjectError::WriteFailure {
            pointcut: pointcut.to_string(),
            path: path.clone(),
            source: e,
        })?;

        class.freeze();
        debug!("wrote {}", path.display());

        Ok(path)
    }
}
