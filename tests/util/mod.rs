pub mod builder;

use std::path::{Path, PathBuf};

use classfile::{
    attributes::{CodeAttribute, ConstantValueAttribute},
    classfile::{ClassFile, Resolvable},
    parser::Parser,
    pool::ConstantEntry,
};
use engine::{
    config::{Injection, StrategyKind},
    error::InjectError,
    run::{execute, RunConfig},
};

pub fn run_one(
    class_path: &Path,
    output: &Path,
    strategy: StrategyKind,
    pointcut: &str,
    value: &str,
) -> Result<(), InjectError> {
    run_many(class_path, output, strategy, &[(pointcut, value)])
}

pub fn run_many(
    class_path: &Path,
    output: &Path,
    strategy: StrategyKind,
    patches: &[(&str, &str)],
) -> Result<(), InjectError> {
    let injections = patches
        .iter()
        .map(|(pointcut, value)| Injection {
            value: Some(value.to_string()),
            pointcut: Some(pointcut.to_string()),
            pointcuts: None,
        })
        .collect();

    execute(&RunConfig {
        class_path: vec![class_path.to_path_buf()],
        output: output.to_path_buf(),
        strategy,
        injections,
    })
}

pub fn output_path(output: &Path, class_name: &str) -> PathBuf {
    let mut path = output.to_path_buf();
    for part in class_name.split('.') {
        path.push(part);
    }
    path.set_extension("class");
    path
}

pub fn parse_output(output: &Path, class_name: &str) -> ClassFile {
    let path = output_path(output, class_name);
    let bytes = std::fs::read(&path)
        .unwrap_or_else(|_| panic!("expected patched class at {}", path.display()));
    Parser::new(&bytes).parse().expect("patched class parses")
}

/// The string bound as the named field's compile time constant, if any.
pub fn field_constant(class: &ClassFile, field: &str) -> Option<String> {
    let index = class.field_index(field).unwrap()?;
    let attr: ConstantValueAttribute = class.fields[index]
        .attributes
        .known_attribute(&class.constant_pool)
        .ok()?;

    match attr.value.try_resolve().ok()? {
        ConstantEntry::String(data) => data.try_string().ok(),
        other => panic!("expected a string constant, got {:?}", other),
    }
}

pub fn method_code(class: &ClassFile, method: &str) -> CodeAttribute {
    let indices = class.method_indices(method).unwrap();
    assert_eq!(indices.len(), 1, "expected exactly one method {}", method);

    class.methods[indices[0]]
        .attributes
        .known_attribute(&class.constant_pool)
        .expect("method has a body")
}

/// Decodes a `ldc`/`ldc_w` + `areturn` body and resolves the pushed string.
pub fn returned_string(class: &ClassFile, code: &CodeAttribute) -> String {
    let index = match code.code.as_slice() {
        [0x12, idx, 0xb0] => *idx as u16,
        [0x13, hi, lo, 0xb0] => u16::from_be_bytes([*hi, *lo]),
        other => panic!("body is not a constant string return: {:?}", other),
    };

    match class.constant_pool.get(index) {
        Some(ConstantEntry::String(data)) => data.try_string().unwrap(),
        other => panic!("expected a string at {}, got {:?}", index, other),
    }
}
