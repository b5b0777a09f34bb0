//! Helpers for inspecting and editing a [`Model`] by the names of its variables and
//! constraints
//!
//! Entities are grouped into sets by the part of their name before the index brackets,
//! see [`crate::naming`]. Most helpers act on a [`Scope`], which is either the whole
//! model, a named set, a [`Query`], or an explicit list of handles.
//!
//! None of the editing helpers update or re-optimize the model, call
//! [`Model::update`] or [`edit::reoptimize`] when done.
use std::fmt::Debug;
use std::hash::Hash;

use derive_builder::Builder;
use thiserror::Error;

use crate::model::constraint::Constr;
use crate::model::variable::Var;
use crate::model::{Model, ModelError};
use crate::naming::{EntityKind, IndexFilter};

pub mod aggregate;
pub mod attrs;
pub mod edit;
pub mod report;
pub mod selection;

pub use aggregate::*;
pub use attrs::*;
pub use edit::*;
pub use report::*;
pub use selection::*;

/// Which entities of a model a helper acts on
#[derive(Copy, Clone, Debug)]
pub enum Scope<'a, H> {
    /// Every entity of the model
    All,
    /// Every entity of the set with exactly this name
    Set(&'a str),
    /// The entities matched by a query
    Query(&'a Query),
    /// Exactly these entities
    Handles(&'a [H]),
}

/// Selection of entities by set name and index values
///
/// # Examples
/// ```rust
/// use lpkit_core::inspect::QueryBuilder;
/// use lpkit_core::naming::{IndexFilter, IndexValue};
/// let mut filter = IndexFilter::new();
/// filter.insert(1, IndexValue::from("north"));
/// // every harv variable which is not in region north
/// let query = QueryBuilder::default()
///     .name("harv")
///     .filter(filter)
///     .exclude(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Builder, Clone, Debug, Default, PartialEq)]
#[builder(setter(into))]
pub struct Query {
    /// Set name to look for, every set when None
    #[builder(default = "None", setter(into, strip_option))]
    pub name: Option<String>,
    /// Match sets whose name contains `name` instead of equals it
    #[builder(default = "false")]
    pub approx: bool,
    /// Required index values, by index position
    #[builder(default = "IndexFilter::new()")]
    pub filter: IndexFilter,
    /// Return the entities not matching the filter instead
    #[builder(default = "false")]
    pub exclude: bool,
}

impl Query {
    /// Query matching a single set by exact name
    pub fn set(name: &str) -> Self {
        Query {
            name: Some(name.to_string()),
            ..Query::default()
        }
    }
}

/// Common access to variables and constraints
pub trait Handle: Copy + Eq + Hash + Debug {
    /// Kind of entity, determining the index brackets of its name
    const KIND: EntityKind;

    /// Every committed entity of this kind in the model
    fn all(model: &Model) -> Vec<Self>;

    /// Full name of the entity
    fn name(self, model: &Model) -> Result<&str, ModelError>;
}

impl Handle for Var {
    const KIND: EntityKind = EntityKind::Variable;

    fn all(model: &Model) -> Vec<Self> {
        model.vars()
    }

    fn name(self, model: &Model) -> Result<&str, ModelError> {
        model.var_name(self)
    }
}

impl Handle for Constr {
    const KIND: EntityKind = EntityKind::Constraint;

    fn all(model: &Model) -> Vec<Self> {
        model.constrs()
    }

    fn name(self, model: &Model) -> Result<&str, ModelError> {
        model.constr_name(self)
    }
}

/// Resolve a scope into the entities it covers
///
/// An empty result is logged, but is not an error.
pub fn resolve<H: Handle>(model: &Model, scope: Scope<'_, H>) -> Result<Vec<H>, InspectError> {
    let (handles, description) = match scope {
        Scope::All => (H::all(model), "all".to_string()),
        Scope::Set(name) => (
            selection::lookup(model, &Query::set(name))?,
            format!("set {}", name),
        ),
        Scope::Query(query) => (selection::lookup(model, query)?, format!("{:?}", query)),
        Scope::Handles(handles) => (handles.to_vec(), "given handles".to_string()),
    };
    if handles.is_empty() {
        log::warn!(
            "No {}s found for model {}, {}",
            H::KIND,
            model.name(),
            description
        );
    }
    Ok(handles)
}

/// Errors raised by the inspection helpers
#[derive(Error, Debug)]
pub enum InspectError {
    /// A required argument was empty
    #[error("No {0} given")]
    MissingArgument(&'static str),
    #[error("Invalid {argument}: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },
    /// The selection was empty where a result is required
    #[error("No {0}s found")]
    NoEntities(EntityKind),
    /// The name of an entity has fewer index values than requested
    #[error("{name} has no index at position {index}")]
    IndexOutOfRange { name: String, index: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[cfg(test)]
pub(crate) mod test_model {
    use crate::model::constraint::Sense;
    use crate::model::expr::LinExpr;
    use crate::model::variable::VarType;
    use crate::model::Model;

    /// Model with variables `x[i,r]` for i in 1..=3 and r in {a, b}, `y[1]`, `total` and
    /// constraints `cap(i)` on x[i,a] + x[i,b] <= i, and `link(a)`
    pub fn indexed_model() -> Model {
        let mut model = Model::new("indexed");
        let mut x = Vec::new();
        for i in 1..=3 {
            for r in ["a", "b"] {
                let var = model
                    .add_new_var(
                        &format!("x[{},{}]", i, r),
                        VarType::Continuous,
                        0.,
                        10.,
                        1.,
                    )
                    .unwrap();
                x.push(var);
            }
        }
        model
            .add_new_var("y[1]", VarType::Continuous, 0., 5., 0.)
            .unwrap();
        model
            .add_new_var("total", VarType::Continuous, 0., 100., 0.)
            .unwrap();
        for i in 0..3 {
            model
                .add_constr(
                    LinExpr::from(x[2 * i]) + x[2 * i + 1],
                    Sense::LessEqual,
                    (i + 1) as f64,
                    &format!("cap({})", i + 1),
                )
                .unwrap();
        }
        model
            .add_constr(LinExpr::from(x[0]), Sense::LessEqual, 0.5, "link(a)")
            .unwrap();
        model.set_sense(crate::optimize::ObjectiveSense::Maximize);
        model.update();
        model
    }
}

#[cfg(test)]
mod inspect_tests {
    use super::*;
    use crate::inspect::test_model::indexed_model;

    #[test]
    fn resolve_scopes() {
        let model = indexed_model();
        let all: Vec<Var> = resolve(&model, Scope::All).unwrap();
        assert_eq!(all.len(), 8);
        let x: Vec<Var> = resolve(&model, Scope::Set("x")).unwrap();
        assert_eq!(x.len(), 6);
        let given = [all[7]];
        let handles = resolve(&model, Scope::Handles(&given)).unwrap();
        assert_eq!(handles, vec![all[7]]);
        let none: Vec<Constr> = resolve(&model, Scope::Set("missing")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn query_builder() {
        let query = QueryBuilder::default().name("x").build().unwrap();
        assert_eq!(query, Query::set("x"));
        assert!(!query.exclude);
    }
}
