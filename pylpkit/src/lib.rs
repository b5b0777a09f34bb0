use std::collections::BTreeMap;

use lpkit_core::inspect::{
    self, InspectError, Query, Scope, CONSTANT_SENSE_DEFAULT, VARIABLES_SENSE_DEFAULT,
};
use lpkit_core::io::{self, IoError};
use lpkit_core::model::attributes::AttrValue;
use lpkit_core::model::constraint::Constr;
use lpkit_core::model::variable::Var;
use lpkit_core::model::{Model, ModelError};
use lpkit_core::naming::{IndexFilter, IndexValue};
use lpkit_core::optimize::ObjectiveSense;

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

fn inspect_err(err: InspectError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn model_err(err: ModelError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn io_err(err: IoError) -> PyErr {
    PyIOError::new_err(err.to_string())
}

fn scope<H>(name: Option<&str>) -> Scope<'_, H> {
    name.map_or(Scope::All, Scope::Set)
}

fn index_to_py(py: Python<'_>, value: &IndexValue) -> PyResult<PyObject> {
    Ok(match value {
        IndexValue::Int(v) => (*v).into_pyobject(py)?.into_any().unbind(),
        IndexValue::Str(v) => v.as_str().into_pyobject(py)?.into_any().unbind(),
    })
}

fn index_from_py(value: &Bound<'_, PyAny>) -> PyResult<IndexValue> {
    if let Ok(v) = value.extract::<i64>() {
        return Ok(IndexValue::Int(v));
    }
    Ok(IndexValue::from(value.extract::<String>()?))
}

fn attr_to_py(py: Python<'_>, value: &AttrValue) -> PyResult<PyObject> {
    Ok(match value {
        AttrValue::Float(v) => (*v).into_pyobject(py)?.into_any().unbind(),
        AttrValue::Int(v) => (*v).into_pyobject(py)?.into_any().unbind(),
        AttrValue::Char(v) => (*v).into_pyobject(py)?.into_any().unbind(),
        AttrValue::Str(v) => v.as_str().into_pyobject(py)?.into_any().unbind(),
    })
}

fn attr_from_py(value: &Bound<'_, PyAny>) -> PyResult<AttrValue> {
    if let Ok(v) = value.extract::<i64>() {
        return Ok(AttrValue::Int(v));
    }
    if let Ok(v) = value.extract::<f64>() {
        return Ok(AttrValue::Float(v));
    }
    Ok(AttrValue::Str(value.extract::<String>()?))
}

fn sums_to_py<'py>(
    py: Python<'py>,
    sums: &BTreeMap<IndexValue, f64>,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (key, value) in sums {
        dict.set_item(index_to_py(py, key)?, value)?;
    }
    Ok(dict)
}

fn build_query(
    name: Option<String>,
    approx: bool,
    filter: Option<&Bound<'_, PyDict>>,
    exclude: bool,
) -> PyResult<Query> {
    let mut index_filter = IndexFilter::new();
    if let Some(filter) = filter {
        for (position, value) in filter.iter() {
            index_filter.insert(position.extract::<usize>()?, index_from_py(&value)?);
        }
    }
    Ok(Query {
        name,
        approx,
        filter: index_filter,
        exclude,
    })
}

/// Linear program whose variables and constraints are addressed by name
#[pyclass(name = "Model")]
struct PyModel {
    inner: Model,
}

impl PyModel {
    fn var_names(&self, variables: &[Var]) -> PyResult<Vec<String>> {
        variables
            .iter()
            .map(|v| self.inner.var_name(*v).map(str::to_string).map_err(model_err))
            .collect()
    }

    fn constr_names(&self, constraints: &[Constr]) -> PyResult<Vec<String>> {
        constraints
            .iter()
            .map(|c| self.inner.constr_name(*c).map(str::to_string).map_err(model_err))
            .collect()
    }

    fn vars_by_name(&self, names: &[String]) -> PyResult<Vec<Var>> {
        names
            .iter()
            .map(|name| {
                self.inner
                    .var_by_name(name)
                    .ok_or_else(|| PyValueError::new_err(format!("No variable named {}", name)))
            })
            .collect()
    }
}

#[pymethods]
impl PyModel {
    #[new]
    #[pyo3(signature = (name = "model"))]
    fn new(name: &str) -> Self {
        PyModel {
            inner: Model::new(name),
        }
    }

    /// Read a model from a .json file
    #[staticmethod]
    fn read(path: &str) -> PyResult<Self> {
        Ok(PyModel {
            inner: io::read_model(path).map_err(io_err)?,
        })
    }

    /// Write the model to a .json or .lp file
    fn write(&self, path: &str) -> PyResult<()> {
        io::write_model(&self.inner, path).map_err(io_err)
    }

    /// Optimize the model, returning the status
    fn optimize(&mut self) -> PyResult<String> {
        Ok(self.inner.optimize().map_err(model_err)?.to_string())
    }

    /// Discard the previous solution and optimize again
    fn reoptimize(&mut self) -> PyResult<String> {
        Ok(inspect::reoptimize(&mut self.inner)
            .map_err(inspect_err)?
            .to_string())
    }

    fn update(&mut self) {
        self.inner.update();
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    #[getter]
    fn name(&self) -> String {
        self.inner.name().to_string()
    }

    #[getter]
    fn status(&self) -> String {
        self.inner.status().to_string()
    }

    /// `"minimize"` or `"maximize"`
    #[getter]
    fn sense(&self) -> String {
        self.inner.sense().to_string().to_lowercase()
    }

    #[setter]
    fn set_sense(&mut self, sense: &str) -> PyResult<()> {
        let sense = match sense.to_lowercase().as_str() {
            "min" | "minimize" => ObjectiveSense::Minimize,
            "max" | "maximize" => ObjectiveSense::Maximize,
            other => {
                return Err(PyValueError::new_err(format!(
                    "Unknown objective sense {}",
                    other
                )))
            }
        };
        self.inner.set_sense(sense);
        Ok(())
    }

    #[getter]
    fn objective_value(&self) -> PyResult<f64> {
        self.inner.objective_value().map_err(model_err)
    }

    #[getter]
    fn num_vars(&self) -> usize {
        self.inner.num_vars()
    }

    #[getter]
    fn num_constrs(&self) -> usize {
        self.inner.num_constrs()
    }

    /// Number of variables in each variable set
    fn list_variables(&self) -> PyResult<BTreeMap<String, usize>> {
        inspect::list_variables(&self.inner).map_err(inspect_err)
    }

    /// Number of constraints in each constraint set
    fn list_constraints(&self) -> PyResult<BTreeMap<String, usize>> {
        inspect::list_constraints(&self.inner).map_err(inspect_err)
    }

    fn print_variable_sets(&self) -> PyResult<()> {
        inspect::print_variable_sets(&self.inner).map_err(inspect_err)
    }

    fn print_constraint_sets(&self) -> PyResult<()> {
        inspect::print_constraint_sets(&self.inner).map_err(inspect_err)
    }

    /// Names of the variables matching a set name and index filter
    #[pyo3(signature = (name = None, approx = false, filter = None, exclude = false))]
    fn get_variables(
        &self,
        name: Option<String>,
        approx: bool,
        filter: Option<&Bound<'_, PyDict>>,
        exclude: bool,
    ) -> PyResult<Vec<String>> {
        let query = build_query(name, approx, filter, exclude)?;
        let variables = inspect::get_variables(&self.inner, &query).map_err(inspect_err)?;
        self.var_names(&variables)
    }

    /// Names of the constraints matching a set name and index filter
    #[pyo3(signature = (name = None, approx = false, filter = None, exclude = false))]
    fn get_constraints(
        &self,
        name: Option<String>,
        approx: bool,
        filter: Option<&Bound<'_, PyDict>>,
        exclude: bool,
    ) -> PyResult<Vec<String>> {
        let query = build_query(name, approx, filter, exclude)?;
        let constraints = inspect::get_constraints(&self.inner, &query).map_err(inspect_err)?;
        self.constr_names(&constraints)
    }

    /// Dict of variable name to attribute value
    #[pyo3(signature = (attr, name = None))]
    fn get_variables_attr<'py>(
        &self,
        py: Python<'py>,
        attr: &str,
        name: Option<&str>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let values =
            inspect::get_variables_attr(attr, &self.inner, scope(name)).map_err(inspect_err)?;
        let dict = PyDict::new(py);
        for (key, value) in &values {
            dict.set_item(key, attr_to_py(py, value)?)?;
        }
        Ok(dict)
    }

    /// Set an attribute of every variable in the set, returns the number changed
    #[pyo3(signature = (attr, value, name = None))]
    fn set_variables_attr(
        &mut self,
        attr: &str,
        value: &Bound<'_, PyAny>,
        name: Option<&str>,
    ) -> PyResult<usize> {
        inspect::set_variables_attr(attr, attr_from_py(value)?, &mut self.inner, scope(name))
            .map_err(inspect_err)
    }

    /// Dict of constraint name to attribute value
    #[pyo3(signature = (attr, name = None))]
    fn get_constraints_attr<'py>(
        &self,
        py: Python<'py>,
        attr: &str,
        name: Option<&str>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let values =
            inspect::get_constraints_attr(attr, &self.inner, scope(name)).map_err(inspect_err)?;
        let dict = PyDict::new(py);
        for (key, value) in &values {
            dict.set_item(key, attr_to_py(py, value)?)?;
        }
        Ok(dict)
    }

    /// Set an attribute of every constraint in the set, returns the number changed
    #[pyo3(signature = (attr, value, name = None))]
    fn set_constraints_attr(
        &mut self,
        attr: &str,
        value: &Bound<'_, PyAny>,
        name: Option<&str>,
    ) -> PyResult<usize> {
        inspect::set_constraints_attr(attr, attr_from_py(value)?, &mut self.inner, scope(name))
            .map_err(inspect_err)
    }

    #[pyo3(signature = (lb = None, ub = None, name = None))]
    fn set_variables_bounds(
        &mut self,
        lb: Option<f64>,
        ub: Option<f64>,
        name: Option<&str>,
    ) -> PyResult<()> {
        inspect::set_variables_bounds(lb, ub, &mut self.inner, scope(name)).map_err(inspect_err)
    }

    /// Multiply the right hand sides of the constraints in the set by `percent`
    #[pyo3(signature = (percent, name = None))]
    fn set_constraints_rhs_as_percent(&mut self, percent: f64, name: Option<&str>) -> PyResult<()> {
        inspect::set_constraints_rhs_as_percent(percent, &mut self.inner, scope(name))
            .map_err(inspect_err)
    }

    fn zero_all_objective_coeffs(&mut self) -> PyResult<()> {
        inspect::zero_all_objective_coeffs(&mut self.inner).map_err(inspect_err)
    }

    #[pyo3(signature = (name = None))]
    fn remove_variables(&mut self, name: Option<&str>) -> PyResult<usize> {
        inspect::remove_variables_from_model(&mut self.inner, scope(name)).map_err(inspect_err)
    }

    #[pyo3(signature = (name = None))]
    fn remove_constraints(&mut self, name: Option<&str>) -> PyResult<usize> {
        inspect::remove_constraints_from_model(&mut self.inner, scope(name)).map_err(inspect_err)
    }

    /// Add `sum(variables) sense constant`, variables given by name
    #[pyo3(signature = (variables, constant, sense = CONSTANT_SENSE_DEFAULT, name = ""))]
    fn add_constraint_constant(
        &mut self,
        variables: Vec<String>,
        constant: f64,
        sense: &str,
        name: &str,
    ) -> PyResult<()> {
        let variables = self.vars_by_name(&variables)?;
        inspect::add_constraint_constant(&mut self.inner, &variables, constant, sense, name)
            .map_err(inspect_err)?;
        Ok(())
    }

    /// Add `sum(variables1) sense sum(variables2)`, variables given by name
    #[pyo3(signature = (variables1, variables2, sense = VARIABLES_SENSE_DEFAULT, name = ""))]
    fn add_constraint_variables(
        &mut self,
        variables1: Vec<String>,
        variables2: Vec<String>,
        sense: &str,
        name: &str,
    ) -> PyResult<()> {
        let variables1 = self.vars_by_name(&variables1)?;
        let variables2 = self.vars_by_name(&variables2)?;
        inspect::add_constraint_variables(&mut self.inner, &variables1, &variables2, sense, name)
            .map_err(inspect_err)?;
        Ok(())
    }

    /// Solution values summed by the value at index position `index`
    #[pyo3(signature = (index, name = None))]
    fn sum_variables_by_index<'py>(
        &self,
        py: Python<'py>,
        index: usize,
        name: Option<&str>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let sums = inspect::sum_variables_by_index(index, &self.inner, scope(name))
            .map_err(inspect_err)?;
        sums_to_py(py, &sums)
    }

    /// Solution values summed by `index2` within each value of `index1`
    #[pyo3(signature = (index1, index2, name = None))]
    fn sum_variables_by_two_indices<'py>(
        &self,
        py: Python<'py>,
        index1: usize,
        index2: usize,
        name: Option<&str>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let nested =
            inspect::sum_variables_by_two_indices(index1, index2, &self.inner, scope(name))
                .map_err(inspect_err)?;
        let dict = PyDict::new(py);
        for (key, sums) in &nested {
            dict.set_item(index_to_py(py, key)?, sums_to_py(py, sums)?)?;
        }
        Ok(dict)
    }

    #[pyo3(signature = (path, name = None))]
    fn variables_to_csv(&self, path: &str, name: Option<&str>) -> PyResult<()> {
        io::variables_to_csv(path, &self.inner, scope(name)).map_err(io_err)
    }

    #[pyo3(signature = (path, index, name = None))]
    fn variables_to_csv_by_index(
        &self,
        path: &str,
        index: usize,
        name: Option<&str>,
    ) -> PyResult<()> {
        io::variables_to_csv_by_index(path, index, &self.inner, scope(name)).map_err(io_err)
    }

    #[pyo3(signature = (path, index, name = None, alias = None))]
    fn variables_to_json_by_index(
        &self,
        path: &str,
        index: usize,
        name: Option<&str>,
        alias: Option<&str>,
    ) -> PyResult<()> {
        io::variables_to_json_by_index(path, index, &self.inner, scope(name), alias)
            .map_err(io_err)
    }
}

/// Names of the variable attributes which can be read
#[pyfunction]
fn variable_attrs() -> Vec<&'static str> {
    inspect::variable_attrs()
}

/// Names of the constraint attributes which can be read
#[pyfunction]
fn constraint_attrs() -> Vec<&'static str> {
    inspect::constraint_attrs()
}

/// Forest harvest scheduling LP with `n_stands` random stands
#[pyfunction]
#[pyo3(signature = (n_stands = 100, seed = 0))]
fn create_sample_lp(n_stands: usize, seed: u64) -> PyResult<PyModel> {
    Ok(PyModel {
        inner: lpkit_core::sample::create_sample_lp(n_stands, seed).map_err(model_err)?,
    })
}

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` setting in the `Cargo.toml`, else Python will not be able to
/// import the module.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyModel>()?;
    m.add_function(wrap_pyfunction!(create_sample_lp, m)?)?;
    m.add_function(wrap_pyfunction!(variable_attrs, m)?)?;
    m.add_function(wrap_pyfunction!(constraint_attrs, m)?)?;
    Ok(())
}
