//! Named attributes of variables and constraints
//!
//! Attribute names follow the usual solver naming (`LB`, `X`, `RHS`, `Pi`, ...) and are
//! matched case-insensitively. Only the attributes listed in [`VarAttr::ALL`] and
//! [`ConAttr::ALL`] are recognized.
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::constraint::{Constr, Sense};
use crate::model::variable::{Var, VarType};
use crate::model::{Model, ModelError};
use crate::naming::EntityKind;

// region Attribute Values
/// Value of an attribute
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Float(f64),
    Int(i64),
    Char(char),
    Str(String),
}

impl AttrValue {
    /// Numeric view of the value, integers are widened
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Integer view of the value, floats are accepted when they hold a whole number
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            AttrValue::Float(v) if v.fract() == 0. => Some(*v as i64),
            _ => None,
        }
    }

    /// Character view of the value, single character strings are accepted
    pub fn as_char(&self) -> Option<char> {
        match self {
            AttrValue::Char(c) => Some(*c),
            AttrValue::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Char(v) => write!(f, "{}", v),
            AttrValue::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<char> for AttrValue {
    fn from(value: char) -> Self {
        AttrValue::Char(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}
// endregion Attribute Values

// region Variable Attributes
/// Recognized variable attributes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VarAttr {
    LB,
    UB,
    Obj,
    VType,
    VarName,
    X,
    Xn,
    RC,
    BarX,
    Start,
    VarHintVal,
    VarHintPri,
    BranchPriority,
    VBasis,
    PStart,
    IISLB,
    IISUB,
    PWLObjCvx,
    SAObjLow,
    SAObjUp,
    SALBLow,
    SALBUp,
    SAUBLow,
    SAUBUp,
    UnbdRay,
}

impl VarAttr {
    /// Every variable attribute, in the order they are listed to users
    pub const ALL: [VarAttr; 25] = [
        VarAttr::LB,
        VarAttr::UB,
        VarAttr::Obj,
        VarAttr::VType,
        VarAttr::VarName,
        VarAttr::X,
        VarAttr::Xn,
        VarAttr::RC,
        VarAttr::BarX,
        VarAttr::Start,
        VarAttr::VarHintVal,
        VarAttr::VarHintPri,
        VarAttr::BranchPriority,
        VarAttr::VBasis,
        VarAttr::PStart,
        VarAttr::IISLB,
        VarAttr::IISUB,
        VarAttr::PWLObjCvx,
        VarAttr::SAObjLow,
        VarAttr::SAObjUp,
        VarAttr::SALBLow,
        VarAttr::SALBUp,
        VarAttr::SAUBLow,
        VarAttr::SAUBUp,
        VarAttr::UnbdRay,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VarAttr::LB => "LB",
            VarAttr::UB => "UB",
            VarAttr::Obj => "Obj",
            VarAttr::VType => "VType",
            VarAttr::VarName => "VarName",
            VarAttr::X => "X",
            VarAttr::Xn => "Xn",
            VarAttr::RC => "RC",
            VarAttr::BarX => "BarX",
            VarAttr::Start => "Start",
            VarAttr::VarHintVal => "VarHintVal",
            VarAttr::VarHintPri => "VarHintPri",
            VarAttr::BranchPriority => "BranchPriority",
            VarAttr::VBasis => "VBasis",
            VarAttr::PStart => "PStart",
            VarAttr::IISLB => "IISLB",
            VarAttr::IISUB => "IISUB",
            VarAttr::PWLObjCvx => "PWLObjCvx",
            VarAttr::SAObjLow => "SAObjLow",
            VarAttr::SAObjUp => "SAObjUp",
            VarAttr::SALBLow => "SALBLow",
            VarAttr::SALBUp => "SALBUp",
            VarAttr::SAUBLow => "SAUBLow",
            VarAttr::SAUBUp => "SAUBUp",
            VarAttr::UnbdRay => "UnbdRay",
        }
    }

    /// Can the attribute be written by the user
    pub fn settable(&self) -> bool {
        matches!(
            self,
            VarAttr::LB
                | VarAttr::UB
                | VarAttr::Obj
                | VarAttr::VType
                | VarAttr::VarName
                | VarAttr::Start
                | VarAttr::VarHintVal
                | VarAttr::VarHintPri
                | VarAttr::BranchPriority
                | VarAttr::VBasis
                | VarAttr::PStart
        )
    }

    /// Does the attribute hold a number which can be summed
    pub fn numeric(&self) -> bool {
        !matches!(self, VarAttr::VType | VarAttr::VarName)
    }
}

impl FromStr for VarAttr {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VarAttr::ALL
            .iter()
            .find(|attr| attr.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| ModelError::UnknownAttribute {
                attr: s.to_string(),
                kind: EntityKind::Variable,
            })
    }
}

impl Display for VarAttr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
// endregion Variable Attributes

// region Constraint Attributes
/// Recognized constraint attributes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConAttr {
    Sense,
    RHS,
    ConstrName,
    Pi,
    Slack,
    CBasis,
    DStart,
    Lazy,
    IISConstr,
    SARHSLow,
    SARHSUp,
    FarkasDual,
}

impl ConAttr {
    /// Every constraint attribute, in the order they are listed to users
    pub const ALL: [ConAttr; 12] = [
        ConAttr::Sense,
        ConAttr::RHS,
        ConAttr::ConstrName,
        ConAttr::Pi,
        ConAttr::Slack,
        ConAttr::CBasis,
        ConAttr::DStart,
        ConAttr::Lazy,
        ConAttr::IISConstr,
        ConAttr::SARHSLow,
        ConAttr::SARHSUp,
        ConAttr::FarkasDual,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConAttr::Sense => "Sense",
            ConAttr::RHS => "RHS",
            ConAttr::ConstrName => "ConstrName",
            ConAttr::Pi => "Pi",
            ConAttr::Slack => "Slack",
            ConAttr::CBasis => "CBasis",
            ConAttr::DStart => "DStart",
            ConAttr::Lazy => "Lazy",
            ConAttr::IISConstr => "IISConstr",
            ConAttr::SARHSLow => "SARHSLow",
            ConAttr::SARHSUp => "SARHSUp",
            ConAttr::FarkasDual => "FarkasDual",
        }
    }

    /// Can the attribute be written by the user
    pub fn settable(&self) -> bool {
        matches!(
            self,
            ConAttr::Sense
                | ConAttr::RHS
                | ConAttr::ConstrName
                | ConAttr::CBasis
                | ConAttr::DStart
                | ConAttr::Lazy
        )
    }
}

impl FromStr for ConAttr {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConAttr::ALL
            .iter()
            .find(|attr| attr.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| ModelError::UnknownAttribute {
                attr: s.to_string(),
                kind: EntityKind::Constraint,
            })
    }
}

impl Display for ConAttr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
// endregion Constraint Attributes

// region Model Attribute Access
fn expect_f64(attr: &'static str, value: &AttrValue) -> Result<f64, ModelError> {
    value.as_f64().ok_or(ModelError::AttributeType {
        attr,
        expected: "numeric",
    })
}

fn expect_i64(attr: &'static str, value: &AttrValue) -> Result<i64, ModelError> {
    value.as_i64().ok_or(ModelError::AttributeType {
        attr,
        expected: "integer",
    })
}

impl Model {
    /// Read an attribute of a variable
    ///
    /// # Errors
    /// - [`ModelError::UnknownVariable`] if the variable is not part of the model
    /// - [`ModelError::NoSolution`] for solution attributes when the model has no solution
    /// - [`ModelError::AttributeUnavailable`] for attributes which can't be computed
    pub fn var_attr(&self, var: Var, attr: VarAttr) -> Result<AttrValue, ModelError> {
        let variable = self.var(var)?;
        let value = match attr {
            VarAttr::LB => AttrValue::Float(variable.lower_bound),
            VarAttr::UB => AttrValue::Float(variable.upper_bound),
            VarAttr::Obj => AttrValue::Float(variable.objective),
            VarAttr::VType => AttrValue::Char(variable.variable_type.code()),
            VarAttr::VarName => AttrValue::Str(variable.name.clone()),
            VarAttr::X | VarAttr::Xn => AttrValue::Float(self.value(var)?),
            VarAttr::RC => AttrValue::Float(self.reduced_cost(var)?),
            VarAttr::BarX => {
                let solution = self.solution.as_ref().ok_or(ModelError::NoSolution)?;
                if !solution.barrier {
                    return Err(ModelError::AttributeUnavailable(attr.name()));
                }
                AttrValue::Float(self.value(var)?)
            }
            VarAttr::Start => AttrValue::Float(variable.start),
            VarAttr::VarHintVal => AttrValue::Float(variable.hint_value),
            VarAttr::VarHintPri => AttrValue::Int(variable.hint_priority),
            VarAttr::BranchPriority => AttrValue::Int(variable.branch_priority),
            VarAttr::VBasis => match variable.basis {
                Some(basis) => AttrValue::Int(basis),
                None => return Err(ModelError::AttributeUnavailable(attr.name())),
            },
            VarAttr::PStart => AttrValue::Float(variable.primal_start),
            _ => return Err(ModelError::AttributeUnavailable(attr.name())),
        };
        Ok(value)
    }

    /// Write an attribute of a variable
    ///
    /// The change is applied immediately, but the model is neither updated nor
    /// re-optimized.
    pub fn set_var_attr(
        &mut self,
        var: Var,
        attr: VarAttr,
        value: AttrValue,
    ) -> Result<(), ModelError> {
        let name = attr.name();
        let variable = self.var_mut(var)?;
        match attr {
            VarAttr::LB => variable.lower_bound = expect_f64(name, &value)?,
            VarAttr::UB => variable.upper_bound = expect_f64(name, &value)?,
            VarAttr::Obj => variable.objective = expect_f64(name, &value)?,
            VarAttr::VType => {
                let code = value.as_char().ok_or(ModelError::AttributeType {
                    attr: name,
                    expected: "character",
                })?;
                variable.variable_type = VarType::from_code(code)
                    .ok_or_else(|| ModelError::InvalidVariableType(code.to_string()))?;
            }
            VarAttr::VarName => {
                variable.name = value
                    .as_str()
                    .ok_or(ModelError::AttributeType {
                        attr: name,
                        expected: "string",
                    })?
                    .to_string()
            }
            VarAttr::Start => variable.start = expect_f64(name, &value)?,
            VarAttr::VarHintVal => variable.hint_value = expect_f64(name, &value)?,
            VarAttr::VarHintPri => variable.hint_priority = expect_i64(name, &value)?,
            VarAttr::BranchPriority => variable.branch_priority = expect_i64(name, &value)?,
            VarAttr::VBasis => variable.basis = Some(expect_i64(name, &value)?),
            VarAttr::PStart => variable.primal_start = expect_f64(name, &value)?,
            _ => {
                return Err(ModelError::ReadOnlyAttribute {
                    attr: name,
                    kind: EntityKind::Variable,
                })
            }
        }
        Ok(())
    }

    /// Read an attribute of a constraint
    pub fn constr_attr(&self, constr: Constr, attr: ConAttr) -> Result<AttrValue, ModelError> {
        let constraint = self.constr(constr)?;
        let value = match attr {
            ConAttr::Sense => AttrValue::Char(constraint.sense.code()),
            ConAttr::RHS => AttrValue::Float(constraint.rhs),
            ConAttr::ConstrName => AttrValue::Str(constraint.name.clone()),
            ConAttr::Pi => AttrValue::Float(self.dual(constr)?),
            ConAttr::Slack => AttrValue::Float(self.slack(constr)?),
            ConAttr::CBasis => match constraint.basis {
                Some(basis) => AttrValue::Int(basis),
                None => return Err(ModelError::AttributeUnavailable(attr.name())),
            },
            ConAttr::DStart => AttrValue::Float(constraint.dual_start),
            ConAttr::Lazy => AttrValue::Int(constraint.lazy),
            _ => return Err(ModelError::AttributeUnavailable(attr.name())),
        };
        Ok(value)
    }

    /// Write an attribute of a constraint
    ///
    /// The change is applied immediately, but the model is neither updated nor
    /// re-optimized.
    pub fn set_constr_attr(
        &mut self,
        constr: Constr,
        attr: ConAttr,
        value: AttrValue,
    ) -> Result<(), ModelError> {
        let name = attr.name();
        let constraint = self.constr_mut(constr)?;
        match attr {
            ConAttr::Sense => {
                constraint.sense = match &value {
                    AttrValue::Char(c) => c.to_string().parse::<Sense>()?,
                    AttrValue::Str(s) => s.parse::<Sense>()?,
                    _ => {
                        return Err(ModelError::AttributeType {
                            attr: name,
                            expected: "character",
                        })
                    }
                }
            }
            ConAttr::RHS => constraint.rhs = expect_f64(name, &value)?,
            ConAttr::ConstrName => {
                constraint.name = value
                    .as_str()
                    .ok_or(ModelError::AttributeType {
                        attr: name,
                        expected: "string",
                    })?
                    .to_string()
            }
            ConAttr::CBasis => constraint.basis = Some(expect_i64(name, &value)?),
            ConAttr::DStart => constraint.dual_start = expect_f64(name, &value)?,
            ConAttr::Lazy => constraint.lazy = expect_i64(name, &value)?,
            _ => {
                return Err(ModelError::ReadOnlyAttribute {
                    attr: name,
                    kind: EntityKind::Constraint,
                })
            }
        }
        Ok(())
    }
}
// endregion Model Attribute Access

#[cfg(test)]
mod attributes_tests {
    use super::*;
    use crate::model::expr::LinExpr;

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!("lb".parse::<VarAttr>().unwrap(), VarAttr::LB);
        assert_eq!("x".parse::<VarAttr>().unwrap(), VarAttr::X);
        assert_eq!("RHS".parse::<ConAttr>().unwrap(), ConAttr::RHS);
        assert_eq!("pi".parse::<ConAttr>().unwrap(), ConAttr::Pi);
        assert!(matches!(
            "Foo".parse::<VarAttr>(),
            Err(ModelError::UnknownAttribute { .. })
        ));
        // constraint attributes aren't variable attributes
        assert!("Slack".parse::<VarAttr>().is_err());
    }

    #[test]
    fn every_name_round_trips() {
        for attr in VarAttr::ALL {
            assert_eq!(attr.name().to_uppercase().parse::<VarAttr>().unwrap(), attr);
        }
        for attr in ConAttr::ALL {
            assert_eq!(attr.name().to_lowercase().parse::<ConAttr>().unwrap(), attr);
        }
    }

    #[test]
    fn set_and_get() {
        let mut model = Model::new("attrs");
        let x = model
            .add_new_var("x[1]", VarType::Continuous, 0., 10., 1.)
            .unwrap();
        let c = model
            .add_constr(LinExpr::from(x), Sense::LessEqual, 5., "c(1)")
            .unwrap();
        model.update();

        model.set_var_attr(x, VarAttr::UB, AttrValue::Int(4)).unwrap();
        assert_eq!(model.var_attr(x, VarAttr::UB).unwrap(), AttrValue::Float(4.));
        model
            .set_var_attr(x, VarAttr::VType, AttrValue::from("I"))
            .unwrap();
        assert_eq!(model.var_attr(x, VarAttr::VType).unwrap(), AttrValue::Char('I'));

        model
            .set_constr_attr(c, ConAttr::Sense, AttrValue::Char('>'))
            .unwrap();
        assert_eq!(model.constr(c).unwrap().sense, Sense::GreaterEqual);

        assert!(matches!(
            model.set_var_attr(x, VarAttr::X, AttrValue::Float(1.)),
            Err(ModelError::ReadOnlyAttribute { .. })
        ));
        assert!(matches!(
            model.set_var_attr(x, VarAttr::LB, AttrValue::from("low")),
            Err(ModelError::AttributeType { .. })
        ));
        assert!(matches!(
            model.var_attr(x, VarAttr::X),
            Err(ModelError::NoSolution)
        ));
        assert!(matches!(
            model.var_attr(x, VarAttr::SAObjLow),
            Err(ModelError::AttributeUnavailable(_))
        ));
    }

    #[test]
    fn solution_attributes() {
        // maximize 2x + y subject to x + y <= 4, x <= 3
        let mut model = Model::new("duals");
        model.set_sense(crate::optimize::ObjectiveSense::Maximize);
        let x = model
            .add_new_var("x", VarType::Continuous, 0., f64::INFINITY, 2.)
            .unwrap();
        let y = model
            .add_new_var("y", VarType::Continuous, 0., f64::INFINITY, 1.)
            .unwrap();
        let total = model
            .add_constr(LinExpr::from(x) + y, Sense::LessEqual, 4., "total")
            .unwrap();
        let cap = model
            .add_constr(LinExpr::from(x), Sense::LessEqual, 3., "cap")
            .unwrap();
        model.optimize().unwrap();

        let x_val = model.var_attr(x, VarAttr::X).unwrap().as_f64().unwrap();
        let y_val = model.var_attr(y, VarAttr::X).unwrap().as_f64().unwrap();
        assert!((x_val - 3.).abs() < 1e-5);
        assert!((y_val - 1.).abs() < 1e-5);
        let pi_total = model.constr_attr(total, ConAttr::Pi).unwrap().as_f64().unwrap();
        let pi_cap = model.constr_attr(cap, ConAttr::Pi).unwrap().as_f64().unwrap();
        assert!((pi_total - 1.).abs() < 1e-5);
        assert!((pi_cap - 1.).abs() < 1e-5);
        let slack = model.constr_attr(cap, ConAttr::Slack).unwrap().as_f64().unwrap();
        assert!(slack.abs() < 1e-5);
        let rc = model.var_attr(y, VarAttr::RC).unwrap().as_f64().unwrap();
        assert!(rc.abs() < 1e-5);
        // Clarabel is an interior point method
        assert!(model.var_attr(x, VarAttr::BarX).is_ok());

        // editing the data does not change what the solve reported
        model
            .set_constr_attr(cap, ConAttr::RHS, AttrValue::Float(1.5))
            .unwrap();
        model.set_var_attr(y, VarAttr::Obj, AttrValue::Float(5.)).unwrap();
        let slack = model.constr_attr(cap, ConAttr::Slack).unwrap().as_f64().unwrap();
        assert!(slack.abs() < 1e-5);
        let rc = model.var_attr(y, VarAttr::RC).unwrap().as_f64().unwrap();
        assert!(rc.abs() < 1e-5);
    }
}
