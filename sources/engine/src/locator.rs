use std::{cell::RefCell, collections::HashMap, fs, path::PathBuf, rc::Rc};

use classfile::parser::Parser;
use tracing::debug;

use crate::{artifact::LoadedClass, error::InjectError, pointcut::Pointcut};

/// Locates compiled classes on an ordered search path of directory roots
/// (exploded classpath entries) and caches them for the run.
///
/// The cache is not an optimisation: a later pointcut that re-targets an
/// already patched type has to observe the earlier mutation, so everyone
/// shares one handle per class name until the run ends.
pub struct ArtifactLocator {
    class_path: Vec<PathBuf>,
    cache: HashMap<String, Rc<RefCell<LoadedClass>>>,
}

impl ArtifactLocator {
    pub fn new(class_path: Vec<PathBuf>) -> Self {
        for root in class_path.iter() {
            debug!("search path root: {}", root.display());
        }

        Self {
            class_path,
            cache: HashMap::new(),
        }
    }

    pub fn load(&mut self, pointcut: &Pointcut) -> Result<Rc<RefCell<LoadedClass>>, InjectError> {
        let name = &pointcut.class_name;

        if let Some(artifact) = self.cache.get(name) {
            debug!("fast path: {}", name);
            return Ok(Rc::clone(artifact));
        }

        debug!("slow path: {}", name);

        let path = self
            .resolve_name(pointcut)
            .ok_or_else(|| InjectError::ArtifactNotFound {
                pointcut: pointcut.to_string(),
                class_name: name.clone(),
            })?;

        let bytes = fs::read(&path).map_err(|e| InjectError::patch(&pointcut.to_string(), e.into()))?;
        let class_file = Parser::new(&bytes)
            .parse()
            .map_err(|e| InjectError::patch(&pointcut.to_string(), e))?;

        let artifact = Rc::new(RefCell::new(LoadedClass::new(name.clone(), class_file)));
        self.cache.insert(name.clone(), Rc::clone(&artifact));

        Ok(artifact)
    }

    fn resolve_name(&self, pointcut: &Pointcut) -> Option<PathBuf> {
        let mut relative = PathBuf::new();
        for part in pointcut.class_name.split('.') {
            relative.push(part);
        }
        relative.set_extension("class");

        for root in self.class_path.iter() {
            let path = root.join(&relative);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }
}
