use std::path::PathBuf;

use tracing::{debug, info};

use crate::{
    classify::classify,
    config::{Injection, StrategyKind},
    error::InjectError,
    locator::ArtifactLocator,
    pointcut::Pointcut,
    strategy::{self, PatchStrategy},
    writer::ArtifactWriter,
};

/// Everything one run needs: where to look, where to write, what to patch.
/// Read-only for the duration of the run.
pub struct RunConfig {
    pub class_path: Vec<PathBuf>,
    pub output: PathBuf,
    pub strategy: StrategyKind,
    pub injections: Vec<Injection>,
}

/// Processes every injection strictly in configured order, failing fast on
/// the first error. Within an injection the single pointcut is applied
/// before the pointcut list, in list order.
pub fn execute(config: &RunConfig) -> Result<(), InjectError> {
    let mut locator = ArtifactLocator::new(config.class_path.clone());
    let writer = ArtifactWriter::new(config.output.clone());
    let strategy = strategy::build(config.strategy);
    debug!("patching with {} strategy", strategy.name());

    for injection in config.injections.iter() {
        apply_injection(injection, &mut locator, &writer, strategy.as_ref())?;
    }

    Ok(())
}

fn apply_injection(
    injection: &Injection,
    locator: &mut ArtifactLocator,
    writer: &ArtifactWriter,
    strategy: &dyn PatchStrategy,
) -> Result<(), InjectError> {
    let value = injection
        .value
        .as_deref()
        .ok_or_else(|| InjectError::NullInjectionValue(injection.to_string()))?;

    if let Some(target) = injection.pointcut.as_deref() {
        apply_pointcut(target, value, locator, writer, strategy)?;
    }

    if let Some(targets) = injection.pointcuts.as_ref() {
        for target in targets.iter() {
            apply_pointcut(target, value, locator, writer, strategy)?;
        }
    }

    Ok(())
}

fn apply_pointcut(
    target: &str,
    value: &str,
    locator: &mut ArtifactLocator,
    writer: &ArtifactWriter,
    strategy: &dyn PatchStrategy,
) -> Result<(), InjectError> {
    let pointcut = Pointcut::parse(target)?;

    info!("Injecting value '{}' into {}", value, target);

    let artifact = locator.load(&pointcut)?;

    let member = {
        let class = artifact.borrow();
        classify(class.class_file(), &pointcut)?
    };

    strategy.apply(&artifact, member, value, &pointcut, writer)
}
