use classfile::classfile::ClassFile;

/// One compiled type held in memory for patching.
///
/// The artifact starts out frozen after a load and is frozen again by the
/// writer; a strategy has to defrost it before mutating, mirroring the
/// load / defrost / patch / write lifecycle of the underlying format
/// tooling this models.
pub struct LoadedClass {
    name: String,
    class_file: ClassFile,
    frozen: bool,
}

impl LoadedClass {
    pub fn new(name: String, class_file: ClassFile) -> Self {
        Self {
            name,
            class_file,
            frozen: true,
        }
    }

    /// Fully qualified class name in source form (`a.b.C`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_file(&self) -> &ClassFile {
        &self.class_file
    }

    /// Mutable access for patching. Callers must have defrosted first.
    pub fn class_file_mut(&mut self) -> &mut ClassFile {
        debug_assert!(!self.frozen, "attempted to mutate a frozen class");
        &mut self.class_file
    }

    /// Swaps in a redefined class file, replacing the previous state.
    pub fn redefine(&mut self, class_file: ClassFile) {
        debug_assert!(!self.frozen, "attempted to redefine a frozen class");
        self.class_file = class_file;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn defrost(&mut self) {
        self.frozen = false;
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}
