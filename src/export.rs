//! Export LogicModules to JSON files, one directory per module type.

use std::path::{Path, PathBuf};

use crate::client::LmClient;
use crate::error::{LmError, Result};
use crate::models::{list_modules, ModuleType};
use crate::output::{self, CollectionFiles};
use crate::pagination::ListOptions;

/// Keyword selecting every module type.
pub const ALL_TYPES: &str = "all";

/// Where and how to export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub out_dir: PathBuf,
    pub list: ListOptions,
}

/// Result of exporting one module type.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub module_type: ModuleType,
    pub item_count: usize,
    pub files: CollectionFiles,
}

/// Outcome of one module type within a multi-type export.
#[derive(Debug)]
pub struct ModuleReport {
    pub module_type: ModuleType,
    pub result: Result<ExportSummary>,
}

impl ModuleReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Resolve command-line selections to module types.
///
/// `all` (any case) expands to every type. Order follows first mention and
/// repeats are dropped.
///
/// # Errors
///
/// Returns [`LmError::InvalidArgument`] for an unknown name.
pub fn select_module_types<S: AsRef<str>>(selections: &[S]) -> Result<Vec<ModuleType>> {
    let mut selected: Vec<ModuleType> = Vec::new();

    for selection in selections {
        let selection = selection.as_ref();
        let types = if selection.trim().eq_ignore_ascii_case(ALL_TYPES) {
            ModuleType::ALL.to_vec()
        } else {
            vec![selection.parse::<ModuleType>()?]
        };
        for t in types {
            if !selected.contains(&t) {
                selected.push(t);
            }
        }
    }

    if selected.is_empty() {
        return Err(LmError::InvalidArgument(
            "no module types selected".to_string(),
        ));
    }
    Ok(selected)
}

/// Directory a module type is written to.
pub fn module_dir(out_dir: &Path, module_type: ModuleType) -> PathBuf {
    out_dir.join(module_type.key())
}

/// Export one module type.
///
/// Writes `<out>/<type>/index.json` with the full list and one
/// `<id>__<name>.json` per item.
#[tracing::instrument(skip(client, options), fields(endpoint = module_type.endpoint()))]
pub async fn export_module_type(
    client: &LmClient,
    module_type: ModuleType,
    options: &ExportOptions,
) -> Result<ExportSummary> {
    let dir = module_dir(&options.out_dir, module_type);
    output::ensure_dir(&dir)?;

    tracing::info!("Exporting {} from {}", module_type, module_type.endpoint());
    let items = list_modules(client, module_type, &options.list).await?;

    let files = output::write_collection(&dir, &items, output::module_file_stem)?;
    tracing::info!(
        items = items.len(),
        index = %files.index.display(),
        "Saved {} items",
        items.len()
    );

    Ok(ExportSummary {
        module_type,
        item_count: items.len(),
        files,
    })
}

/// Export several module types in order.
///
/// A failing type is logged and reported; the remaining types are still
/// exported.
pub async fn export_modules(
    client: &LmClient,
    module_types: &[ModuleType],
    options: &ExportOptions,
) -> Vec<ModuleReport> {
    let mut reports = Vec::with_capacity(module_types.len());

    for &module_type in module_types {
        let result = export_module_type(client, module_type, options).await;
        if let Err(ref e) = result {
            tracing::error!(
                module = %module_type,
                error = %e,
                "Export failed, continuing with next module type"
            );
        }
        reports.push(ModuleReport {
            module_type,
            result,
        });
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_expands_in_order() {
        let types = select_module_types(&["all"]).unwrap();
        assert_eq!(types, ModuleType::ALL.to_vec());
    }

    #[test]
    fn test_select_dedups_and_keeps_first_mention() {
        let types = select_module_types(&["oids", "DataSources", "oids", "ALL"]).unwrap();
        assert_eq!(types.len(), ModuleType::ALL.len());
        assert_eq!(types[0], ModuleType::Oids);
        assert_eq!(types[1], ModuleType::DataSources);
    }

    #[test]
    fn test_select_rejects_unknown() {
        assert!(select_module_types(&["datasources", "bogus"]).is_err());
        assert!(select_module_types::<&str>(&[]).is_err());
    }

    #[test]
    fn test_module_dir() {
        let dir = module_dir(Path::new("out"), ModuleType::PropertySources);
        assert_eq!(dir, Path::new("out").join("propertysources"));
    }
}
