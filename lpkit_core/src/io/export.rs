//! Export of solution values to CSV, and of index sums to chart-ready JSON
//!
//! Existing files are overwritten.
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use indexmap::IndexMap;

use crate::inspect::{resolve, sum_variables_by_index, Scope};
use crate::model::variable::Var;
use crate::model::Model;

use super::IoError;

/// Ensure a path has the expected extension, ignoring case
fn check_extension(path: &Path, expected: &'static str) -> Result<(), IoError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(expected) => Ok(()),
        _ => Err(IoError::WrongExtension {
            path: path.display().to_string(),
            expected,
        }),
    }
}

/// Write the solution value of every variable in scope to a CSV file
///
/// The header is `Variable name,Value`, names containing commas are quoted.
pub fn variables_to_csv<P: AsRef<Path>>(
    path: P,
    model: &Model,
    scope: Scope<'_, Var>,
) -> Result<(), IoError> {
    let path = path.as_ref();
    check_extension(path, "csv")?;
    let variables = resolve(model, scope)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Variable name", "Value"])?;
    for var in variables {
        writer.write_record([model.var_name(var)?.to_string(), model.value(var)?.to_string()])?;
    }
    writer.flush()?;
    log::info!("Wrote variable values to {}", path.display());
    Ok(())
}

/// Write the solution values of the variables in scope, summed by `index`, to a CSV file
///
/// The header is `Index,Value`, rows are sorted by index value.
pub fn variables_to_csv_by_index<P: AsRef<Path>>(
    path: P,
    index: usize,
    model: &Model,
    scope: Scope<'_, Var>,
) -> Result<(), IoError> {
    let path = path.as_ref();
    check_extension(path, "csv")?;
    let sums = sum_variables_by_index(index, model, scope)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Index", "Value"])?;
    for (key, value) in sums {
        writer.write_record([key.to_string(), value.to_string()])?;
    }
    writer.flush()?;
    log::info!("Wrote sums by index {} to {}", index, path.display());
    Ok(())
}

/// Write the solution values of the variables in scope, summed by `index`, to a JSON file
/// shaped for charting libraries
///
/// The file holds `{key: [{key: {index value: sum}}]}` where `key` is `alias`, or the
/// index position when no alias is given.
pub fn variables_to_json_by_index<P: AsRef<Path>>(
    path: P,
    index: usize,
    model: &Model,
    scope: Scope<'_, Var>,
    alias: Option<&str>,
) -> Result<(), IoError> {
    let path = path.as_ref();
    check_extension(path, "json")?;
    let key = match alias {
        Some(alias) if !alias.is_empty() => alias.to_string(),
        _ => index.to_string(),
    };
    let sums: IndexMap<String, f64> = sum_variables_by_index(index, model, scope)?
        .into_iter()
        .map(|(value, sum)| (value.to_string(), sum))
        .collect();
    let mut series = IndexMap::new();
    series.insert(key.clone(), sums);
    let mut data = IndexMap::new();
    data.insert(key, vec![series]);

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, &data)?;
    log::info!("Wrote sums by index {} to {}", index, path.display());
    Ok(())
}
