//! Module providing JSON IO for Models
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::constraint::Sense;
use crate::model::expr::LinExpr;
use crate::model::variable::{Var, VarType, VariableBuilder, VariableBuilderError};
use crate::model::{Model, ModelError};
use crate::optimize::ObjectiveSense;

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing models in json format
#[derive(Serialize, Deserialize)]
struct JsonModel {
    name: String,
    #[serde(default)]
    sense: ObjectiveSense,
    variables: Vec<JsonVariable>,
    constraints: Vec<JsonConstraint>,
}

/// Infinite bounds are written as null
#[derive(Serialize, Deserialize)]
struct JsonVariable {
    name: String,
    lower_bound: Option<f64>,
    upper_bound: Option<f64>,
    #[serde(default)]
    objective: f64,
    #[serde(default)]
    variable_type: VarType,
}

#[derive(Serialize, Deserialize)]
struct JsonConstraint {
    name: String,
    /// Coefficients keyed by variable name
    terms: IndexMap<String, f64>,
    sense: Sense,
    rhs: f64,
}
// endregion JSON Model

// region Conversions
fn finite(bound: f64) -> Option<f64> {
    if bound.is_finite() {
        Some(bound)
    } else {
        None
    }
}

impl Model {
    /// Read a model from a json file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, JsonError> {
        let model_str = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
        };
        let json_model = match serde_json::from_str::<JsonModel>(&model_str) {
            Ok(model) => model,
            Err(err) => return Err(JsonError::UnableToParse(format!("{:?}", err))),
        };
        Model::from_json(json_model)
    }

    /// Write the committed variables and constraints of the model to a json file
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        let json_model = self.to_json()?;
        let model_string = serde_json::to_string_pretty(&json_model)?;
        fs::write(path, model_string)?;
        Ok(())
    }

    fn from_json(json_model: JsonModel) -> Result<Self, JsonError> {
        let mut model = Model::new(&json_model.name);
        model.set_sense(json_model.sense);
        let mut by_name: HashMap<String, Var> = HashMap::new();
        for v in json_model.variables {
            if by_name.contains_key(&v.name) {
                return Err(JsonError::DuplicateName(v.name));
            }
            let variable = VariableBuilder::default()
                .name(v.name.clone())
                .lower_bound(v.lower_bound.unwrap_or(f64::NEG_INFINITY))
                .upper_bound(v.upper_bound.unwrap_or(f64::INFINITY))
                .objective(v.objective)
                .variable_type(v.variable_type)
                .build()?;
            by_name.insert(v.name, model.add_var(variable));
        }
        for c in json_model.constraints {
            let mut lhs = LinExpr::new();
            for (name, coef) in &c.terms {
                let var = by_name
                    .get(name)
                    .ok_or_else(|| JsonError::UnknownVariable {
                        constraint: c.name.clone(),
                        variable: name.clone(),
                    })?;
                lhs.add_term(*var, *coef);
            }
            model.add_constr(lhs, c.sense, c.rhs, &c.name)?;
        }
        model.update();
        Ok(model)
    }

    fn to_json(&self) -> Result<JsonModel, JsonError> {
        let mut names: HashMap<Var, &str> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut json_variables: Vec<JsonVariable> = Vec::with_capacity(self.num_vars());
        for var in self.vars() {
            let v = self.var(var)?;
            if !seen.insert(&v.name) {
                return Err(JsonError::DuplicateName(v.name.clone()));
            }
            names.insert(var, &v.name);
            json_variables.push(JsonVariable {
                name: v.name.clone(),
                lower_bound: finite(v.lower_bound),
                upper_bound: finite(v.upper_bound),
                objective: v.objective,
                variable_type: v.variable_type,
            });
        }
        let mut json_constraints: Vec<JsonConstraint> = Vec::with_capacity(self.num_constrs());
        for constr in self.constrs() {
            let c = self.constr(constr)?;
            let mut terms = IndexMap::with_capacity(c.terms.len());
            for (var, coef) in &c.terms {
                let name = names
                    .get(var)
                    .ok_or(ModelError::UnknownVariable(*var))?;
                terms.insert(name.to_string(), *coef);
            }
            json_constraints.push(JsonConstraint {
                name: c.name.clone(),
                terms,
                sense: c.sense,
                rhs: c.rhs,
            });
        }
        Ok(JsonModel {
            name: self.name().to_string(),
            sense: self.sense(),
            variables: json_variables,
            constraints: json_constraints,
        })
    }
}

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    /// Terms are keyed by variable name, so names have to be unique
    #[error("Variable name {0} is used more than once")]
    DuplicateName(String),
    #[error("Constraint {constraint} refers to unknown variable {variable}")]
    UnknownVariable { constraint: String, variable: String },
    #[error("Unable to build variable")]
    UnableToBuildVariable(#[from] VariableBuilderError),
    #[error("Unable to build model: {0}")]
    Model(#[from] ModelError),
    #[error("Serde json parse error")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}
// endregion Conversions
