//! Provides the sense of a model's objective
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveSense {
    /// The objective should be minimized
    #[default]
    Minimize,
    /// The objective should be maximized
    Maximize,
}

impl ObjectiveSense {
    /// Integer code of the sense, 1 for minimization and -1 for maximization
    pub fn code(&self) -> i64 {
        match self {
            ObjectiveSense::Minimize => 1,
            ObjectiveSense::Maximize => -1,
        }
    }

    /// Sense from its integer code, any negative value means maximization
    pub fn from_code(code: i64) -> Self {
        if code < 0 {
            ObjectiveSense::Maximize
        } else {
            ObjectiveSense::Minimize
        }
    }
}

impl Display for ObjectiveSense {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectiveSense::Minimize => write!(f, "Minimize"),
            ObjectiveSense::Maximize => write!(f, "Maximize"),
        }
    }
}
