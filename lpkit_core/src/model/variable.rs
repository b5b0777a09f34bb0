//! Module providing representation of model variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::configuration::{default_lower_bound, default_upper_bound};

/// Value read back from start and hint attributes which were never set
pub const UNDEFINED: f64 = 1e101;

/// Handle to a variable in a [`crate::model::Model`]
///
/// Handles are never reused, even after the variable has been removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub(crate) usize);

impl Var {
    /// Position of the variable in the order variables were created
    pub fn id(&self) -> usize {
        self.0
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Represents a variable in the model
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Variable {
    /// Name of the variable, empty names are replaced by `C<id>` when added to a model
    #[builder(default = "String::new()")]
    pub name: String,
    /// Lower bound
    #[builder(default = "default_lower_bound()")]
    pub lower_bound: f64,
    /// Upper bound
    #[builder(default = "default_upper_bound()")]
    pub upper_bound: f64,
    /// Objective coefficient
    #[builder(default = "0.")]
    pub objective: f64,
    /// Type of the variable
    #[builder(default = "VarType::Continuous")]
    pub variable_type: VarType,
    /// MIP start value
    #[builder(default = "UNDEFINED")]
    pub start: f64,
    /// Hint value handed to MIP heuristics
    #[builder(default = "UNDEFINED")]
    pub hint_value: f64,
    /// Priority of the hint value
    #[builder(default = "0")]
    pub hint_priority: i64,
    /// Branching priority
    #[builder(default = "0")]
    pub branch_priority: i64,
    /// Warm start basis status
    #[builder(default = "None")]
    pub basis: Option<i64>,
    /// Warm start primal value
    #[builder(default = "UNDEFINED")]
    pub primal_start: f64,
}

impl Variable {
    /// Bounds of the variable as seen by the solver, binaries are limited to [0, 1]
    pub fn solver_bounds(&self) -> (f64, f64) {
        match self.variable_type {
            VarType::Binary => (self.lower_bound.max(0.), self.upper_bound.min(1.)),
            _ => (self.lower_bound, self.upper_bound),
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.variable_type)
    }
}

/// Represents the type of a variable
///
/// # Notes:
/// Not all variable types are supported by all solvers, currently Clarabel only supports
/// Continuous variables, while HiGHS supports all types
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VarType {
    /// Continuous variable
    #[default]
    Continuous,
    /// Integer variable
    Integer,
    /// Binary Variable
    Binary,
}

impl VarType {
    /// Single character code, `C`, `I` or `B`
    pub fn code(&self) -> char {
        match self {
            VarType::Continuous => 'C',
            VarType::Integer => 'I',
            VarType::Binary => 'B',
        }
    }

    /// Variable type from its single character code, case-insensitive
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'C' => Some(VarType::Continuous),
            'I' => Some(VarType::Integer),
            'B' => Some(VarType::Binary),
            _ => None,
        }
    }
}

impl Display for VarType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VarType::Continuous => write!(f, "CONTINUOUS"),
            VarType::Integer => write!(f, "INTEGER"),
            VarType::Binary => write!(f, "BINARY"),
        }
    }
}
