//! Catalog loading functionality

use super::row::{DecodedField, RecipeRow};
use super::Catalog;
use crate::server::metrics;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not open recipe dataset {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read recipe dataset: {0}")]
    Read(#[source] csv::Error),

    #[error("Catalog loading task failed: {0}")]
    Task(String),
}

/// Non-fatal issue found while building the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// A JSON column could not be decoded, the recipe was kept without it.
    FieldDecode {
        line: u64,
        dish_name: String,
        field: DecodedField,
        reason: String,
    },
    /// The row could not be turned into a recipe and was skipped.
    RowDropped { line: Option<u64>, reason: String },
}

impl Problem {
    pub fn kind(&self) -> &'static str {
        match self {
            Problem::FieldDecode {
                field: DecodedField::Ingredients,
                ..
            } => "ingredients_decode",
            Problem::FieldDecode {
                field: DecodedField::Steps,
                ..
            } => "steps_decode",
            Problem::RowDropped { .. } => "row_dropped",
        }
    }
}

pub struct CatalogBuildResult {
    pub catalog: Catalog,
    pub rows_read: usize,
    pub problems: Vec<Problem>,
}

impl CatalogBuildResult {
    pub fn dropped_rows(&self) -> usize {
        self.problems
            .iter()
            .filter(|p| matches!(p, Problem::RowDropped { .. }))
            .count()
    }
}

fn is_io_error(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(_))
}

impl Catalog {
    /// Builds a catalog from CSV data with a header row. Only I/O failures are
    /// fatal, malformed rows and fields are collected as [`Problem`]s.
    pub fn from_reader<R: Read>(reader: R) -> Result<CatalogBuildResult, LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let headers = csv_reader.headers().map_err(LoadError::Read)?.clone();

        let mut recipes = vec![];
        let mut problems = vec![];
        let mut rows_read = 0;

        for record in csv_reader.records() {
            rows_read += 1;
            let record = match record {
                Ok(record) => record,
                Err(err) if is_io_error(&err) => return Err(LoadError::Read(err)),
                Err(err) => {
                    problems.push(Problem::RowDropped {
                        line: err.position().map(|p| p.line()),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let row: RecipeRow = match record.deserialize(Some(&headers)) {
                Ok(row) => row,
                Err(err) => {
                    problems.push(Problem::RowDropped {
                        line: Some(line),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let parsed = row.into_recipe();
            for warning in parsed.warnings {
                problems.push(Problem::FieldDecode {
                    line,
                    dish_name: parsed.recipe.dish_name.clone(),
                    field: warning.field,
                    reason: warning.reason,
                });
            }
            recipes.push(parsed.recipe);
        }

        Ok(CatalogBuildResult {
            catalog: Catalog::new(recipes),
            rows_read,
            problems,
        })
    }

    pub fn build(path: &Path) -> Result<CatalogBuildResult, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_owned(),
            source,
        })?;
        Catalog::from_reader(file)
    }
}

fn report(path: &Path, result: &CatalogBuildResult) {
    for problem in result.problems.iter() {
        match problem {
            Problem::FieldDecode {
                line,
                dish_name,
                field,
                reason,
            } => warn!(
                line = *line,
                dish = %dish_name,
                field = %field,
                "Could not decode recipe field, keeping the recipe without it: {}",
                reason
            ),
            Problem::RowDropped { line, reason } => {
                warn!(line = ?line, "Dropped recipe row: {}", reason)
            }
        }
    }

    if result.problems.is_empty() {
        info!("Catalog checked, no issues found.");
    } else {
        info!(
            "Catalog was built, but check the {} non-fatal issues above.",
            result.problems.len()
        );
    }
    info!(
        "Loaded {} recipes from {:?} ({} rows read, {} dropped)",
        result.catalog.len(),
        path,
        result.rows_read,
        result.dropped_rows()
    );
    if let Some(first) = result.catalog.recipes().first() {
        info!("Sample recipe loaded: {}", first.dish_name);
    }
}

/// Reads and parses the dataset on a blocking worker, then reports problems
/// through logs and metrics.
pub async fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, LoadError> {
    let path = path.as_ref().to_owned();
    let start = Instant::now();

    let task_path = path.clone();
    let result = tokio::task::spawn_blocking(move || Catalog::build(&task_path))
        .await
        .map_err(|err| LoadError::Task(err.to_string()))?;

    let result = match result {
        Ok(result) => result,
        Err(err) => {
            metrics::record_catalog_load_failure();
            return Err(err);
        }
    };

    report(&path, &result);
    metrics::record_catalog_loaded(&result, start.elapsed());

    Ok(result.catalog)
}
