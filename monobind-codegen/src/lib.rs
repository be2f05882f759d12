// monobind-codegen: reads the symbol table JSON and generates the C
// definitions surface (runtime state, assembly binder, per-unit thunks).

pub mod c_gen;
pub mod c_ir;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod naming;
pub mod schema;
pub mod type_map;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::c_gen::Artifact;
use crate::config::MonobindConfig;
use crate::context::BindingPlan;
use crate::error::{CodegenError, CodegenResult};
use crate::schema::BindingsFile;

/// What a `generate` run produced.
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    pub out_dir: PathBuf,
    pub files: Vec<String>,
    pub classes: usize,
    pub thunks: usize,
}

/// Run the generate command. Main entry point for codegen.
pub fn run_generate(config_path: &Path) -> CodegenResult<GenerateSummary> {
    let config = MonobindConfig::load(config_path)?;
    let config_dir = config_dir(config_path)?;
    let out_dir = config_dir.join(&config.codegen.out_dir);

    let plan = build_plan(&config, &config_dir)?;
    check_exported_names(&plan)?;

    info!("generating C definitions");
    let artifacts = c_gen::generate(&plan, &config.runtime, &config.codegen.support_header);
    c_gen::write_artifacts(&out_dir, &artifacts)?;

    info!(out_dir = %out_dir.display(), "verifying output");
    verify_output(&out_dir, &artifacts)?;

    let summary = GenerateSummary {
        out_dir,
        files: artifacts.into_iter().map(|a| a.file_name).collect(),
        classes: plan.classes().count(),
        thunks: plan.classes().map(|c| c.thunks.len()).sum(),
    };
    info!(
        files = summary.files.len(),
        classes = summary.classes,
        thunks = summary.thunks,
        "done"
    );
    Ok(summary)
}

/// Load, filter and lower the symbol table without writing anything.
pub fn plan_from_config(config_path: &Path) -> CodegenResult<BindingPlan> {
    let config = MonobindConfig::load(config_path)?;
    build_plan(&config, &config_dir(config_path)?)
}

/// Directory that relative config paths are resolved against.
fn config_dir(config_path: &Path) -> CodegenResult<PathBuf> {
    let dir = match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    dir.canonicalize().map_err(|e| CodegenError::io(dir, e))
}

fn build_plan(config: &MonobindConfig, config_dir: &Path) -> CodegenResult<BindingPlan> {
    let input = config_dir.join(&config.codegen.input);
    info!(input = %input.display(), "loading symbol table");
    let mut file = BindingsFile::load(&input)?;
    info!(
        assembly = %file.assembly,
        units = file.units.len(),
        classes = file.classes().count(),
        "symbol table loaded"
    );

    info!("filtering");
    filter::apply_filters(&mut file, &config.blocklist);

    Ok(BindingPlan::build(&file, config.codegen.error_policy))
}

/// Exported names must be unique across the run. Distinct managed names can
/// collide once `.` becomes `_`. Checked before anything is written.
pub fn check_exported_names(plan: &BindingPlan) -> CodegenResult<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    let errors: Vec<String> = plan
        .exported_names()
        .filter(|name| !seen.insert(*name))
        .map(|name| format!("duplicate exported function: {name}"))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CodegenError::Verification(errors))
    }
}

/// Verify codegen output integrity: every artifact exists and is non-empty.
pub fn verify_output(out_dir: &Path, artifacts: &[Artifact]) -> CodegenResult<()> {
    let mut errors: Vec<String> = Vec::new();
    for artifact in artifacts {
        let path = out_dir.join(&artifact.file_name);
        match std::fs::metadata(&path) {
            Ok(m) if m.len() == 0 => errors.push(format!("output empty: {}", path.display())),
            Err(_) => errors.push(format!("output missing: {}", path.display())),
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CodegenError::Verification(errors))
    }
}
