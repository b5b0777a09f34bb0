//! Forest harvest scheduling LP
//!
//! Every stand has an area of one hectare and is assigned a mix of harvest schedules over
//! a planning horizon of ten 10-year periods. The model maximises the harvested volume
//! subject to at least 20% of each region being 60 years or older from period 5 on.
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::{Display, Formatter};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::constraint::Sense;
use crate::model::expr::LinExpr;
use crate::model::variable::{Var, VarType};
use crate::model::{Model, ModelError};
use crate::optimize::ObjectiveSense;

/// Number of planning periods
pub const PERIODS: usize = 10;
/// Length of a period in years
pub const PERIOD_LENGTH: u32 = 10;
/// Stands younger than this can not be harvested
pub const MIN_HARVEST_AGE: u32 = 40;
/// Minimum number of periods between the two harvests of a schedule is this plus one
pub const HARVEST_GAP: usize = 4;
/// Age from which a stand counts as old forest
pub const OLD_FOREST_AGE: u32 = 60;
/// First period in which the old forest constraints apply
pub const OLD_FOREST_FROM: usize = 5;
/// Share of each region which has to be old forest
pub const OLD_FOREST_SHARE: f64 = 0.2;
/// Oldest initial stand age
pub const MAX_INITIAL_AGE: u32 = 90;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    South,
    North,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::South, Region::North];
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::South => write!(f, "south"),
            Region::North => write!(f, "north"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Species {
    Softwood,
    Hardwood,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Softwood, Species::Hardwood];

    /// Steepness of the yield curve
    pub fn growth_rate(&self) -> f64 {
        match self {
            Species::Softwood => 0.05125,
            Species::Hardwood => 0.025,
        }
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Species::Softwood => write!(f, "sw"),
            Species::Hardwood => write!(f, "hw"),
        }
    }
}

/// A contiguous area of forest with uniform characteristics
#[derive(Clone, Debug, PartialEq)]
pub struct Stand {
    pub id: usize,
    /// Age in years, a multiple of [`PERIOD_LENGTH`]
    pub initial_age: u32,
    /// Proportion of softwood
    pub softwood: f64,
    pub region: Region,
}

/// Harvest decision per period, `true` meaning the stand is clearcut in that period
pub type Schedule = Vec<bool>;

/// Whether a schedule has at most two harvests, and two harvests at least `k + 1`
/// periods apart
fn eligible(schedule: &[bool], k: usize) -> bool {
    let harvests: Vec<usize> = schedule
        .iter()
        .enumerate()
        .filter(|(_, harvest)| **harvest)
        .map(|(period, _)| period)
        .collect();
    match harvests.as_slice() {
        [] | [_] => true,
        [first, second] => second - first > k,
        _ => false,
    }
}

/// Every eligible schedule of length `n`, see [`eligible`]
///
/// Only schedules with at most two harvests are built, so any `n` is accepted. They are
/// returned in lexicographic order, so the first one never harvests.
pub fn schedule_generator(k: usize, n: usize) -> Vec<Schedule> {
    let harvest_at = |periods: &[usize]| -> Schedule {
        (0..n).map(|period| periods.contains(&period)).collect()
    };
    let mut schedules = vec![harvest_at(&[])];
    for first in 0..n {
        schedules.push(harvest_at(&[first]));
        for second in first + 1..n {
            schedules.push(harvest_at(&[first, second]));
        }
    }
    schedules.retain(|schedule| eligible(schedule, k));
    schedules.sort();
    schedules
}

/// Standing volume per hectare at `age`, a logistic curve with maximum 150 scaled by
/// `age / 80` and capped at 150
pub fn logistic_yield(age: f64, k: f64) -> f64 {
    let volume = 150. / (1. + (-k * age).exp()) * (age / 80.);
    volume.min(150.)
}

/// Yield by age for every multiple of [`PERIOD_LENGTH`] below 200
pub fn yield_table(species: Species) -> BTreeMap<u32, f64> {
    (0..200)
        .step_by(PERIOD_LENGTH as usize)
        .map(|age| (age, logistic_yield(age as f64, species.growth_rate())))
        .collect()
}

/// Age of a stand at the start of each period under a schedule
pub fn stand_ages(initial_age: u32, schedule: &[bool]) -> Vec<u32> {
    let mut age = initial_age;
    schedule
        .iter()
        .map(|harvest| {
            let current = age;
            age = if *harvest { 0 } else { age + PERIOD_LENGTH };
            current
        })
        .collect()
}

/// Ages by initial age, then by schedule number, then by period
pub fn age_schedule_table(schedules: &[Schedule]) -> BTreeMap<u32, Vec<Vec<u32>>> {
    (0..200)
        .step_by(PERIOD_LENGTH as usize)
        .map(|initial_age| {
            let ages = schedules
                .iter()
                .map(|schedule| stand_ages(initial_age, schedule))
                .collect();
            (initial_age, ages)
        })
        .collect()
}

/// Draw from a normal distribution with the Box-Muller transform
fn gaussian<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = 1. - rng.random::<f64>();
    let u2: f64 = rng.random();
    mean + std_dev * (-2. * u1.ln()).sqrt() * (2. * PI * u2).cos()
}

/// Create `n` stands with normally distributed ages in whole periods between 0 and
/// [`MAX_INITIAL_AGE`], spread over both regions
pub fn create_stands<R: Rng>(n: usize, rng: &mut R) -> Vec<Stand> {
    (0..n)
        .map(|id| {
            let age = (gaussian(rng, 40., 40.).round() / 10.).trunc() * 10.;
            let initial_age = age.clamp(0., MAX_INITIAL_AGE as f64) as u32;
            let softwood = rng.random::<f64>();
            let region = if rng.random_bool(0.5) {
                Region::South
            } else {
                Region::North
            };
            Stand {
                id,
                initial_age,
                softwood,
                region,
            }
        })
        .collect()
}

/// Whether a stand may follow a schedule, young stands can not be harvested before they
/// reach [`MIN_HARVEST_AGE`]
fn schedule_allowed(stand: &Stand, schedule: &[bool]) -> bool {
    if stand.initial_age >= MIN_HARVEST_AGE {
        return true;
    }
    let waiting = ((MIN_HARVEST_AGE - stand.initial_age) / PERIOD_LENGTH) as usize;
    !schedule.iter().take(waiting).any(|harvest| *harvest)
}

/// Build the forest LP for `n_stands` randomly generated stands
///
/// The same seed always gives the same model. Variables are `x[stand,schedule]` (area of
/// a stand under a schedule), `harv[species,region,period]` (volume harvested) and
/// `age[region,period]` (area of old forest). Constraints are `gub(stand)`,
/// `harv(species,region,period)`, `age(region,period)` and `env(region,period)`.
///
/// # Examples
/// ```rust
/// use lpkit_core::inspect::list_variables;
/// use lpkit_core::sample::create_sample_lp;
/// let model = create_sample_lp(10, 42).unwrap();
/// let sets = list_variables(&model).unwrap();
/// assert_eq!(sets["harv"], 40);
/// assert_eq!(sets["age"], 10);
/// ```
pub fn create_sample_lp(n_stands: usize, seed: u64) -> Result<Model, ModelError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let stands = create_stands(n_stands, &mut rng);
    let schedules = schedule_generator(HARVEST_GAP, PERIODS);
    let yields: BTreeMap<Species, BTreeMap<u32, f64>> = Species::ALL
        .iter()
        .map(|species| (*species, yield_table(*species)))
        .collect();

    let mut model = Model::new("Forest LP");
    model.set_sense(ObjectiveSense::Maximize);

    // region Assignment
    let mut assignments: Vec<(Var, &Stand, Vec<u32>, &Schedule)> = Vec::new();
    for stand in &stands {
        let mut gub = LinExpr::new();
        for (number, schedule) in schedules.iter().enumerate() {
            if !schedule_allowed(stand, schedule) {
                continue;
            }
            let x = model.add_new_var(
                &format!("x[{},{}]", stand.id, number),
                VarType::Continuous,
                0.,
                f64::INFINITY,
                0.,
            )?;
            gub += x;
            assignments.push((x, stand, stand_ages(stand.initial_age, schedule), schedule));
        }
        if gub.terms.is_empty() {
            log::warn!("Stand {} received no schedule", stand.id);
            continue;
        }
        model.add_constr(gub, Sense::Equal, 1., &format!("gub({})", stand.id))?;
    }
    // endregion Assignment

    // region Old forest
    for region in Region::ALL {
        let area = stands.iter().filter(|s| s.region == region).count() as f64;
        for period in OLD_FOREST_FROM..PERIODS {
            let age = model.add_new_var(
                &format!("age[{},{}]", region, period),
                VarType::Continuous,
                0.,
                f64::INFINITY,
                0.,
            )?;
            let old: LinExpr = assignments
                .iter()
                .filter(|(_, stand, ages, _)| {
                    stand.region == region && ages[period] >= OLD_FOREST_AGE
                })
                .map(|(x, _, _, _)| *x)
                .collect();
            model.add_constr(age, Sense::Equal, old, &format!("age({},{})", region, period))?;
            model.add_constr(
                age,
                Sense::GreaterEqual,
                OLD_FOREST_SHARE * area,
                &format!("env({},{})", region, period),
            )?;
        }
    }
    // endregion Old forest

    // region Harvest
    for period in 0..PERIODS {
        for region in Region::ALL {
            for species in Species::ALL {
                let harv = model.add_new_var(
                    &format!("harv[{},{},{}]", species, region, period),
                    VarType::Continuous,
                    0.,
                    f64::INFINITY,
                    1.,
                )?;
                let mut volume = LinExpr::new();
                for (x, stand, ages, schedule) in &assignments {
                    if stand.region != region || !schedule[period] {
                        continue;
                    }
                    let per_hectare = yields[&species]
                        .get(&ages[period])
                        .copied()
                        .unwrap_or(150.);
                    volume.add_term(*x, per_hectare);
                }
                model.add_constr(
                    harv,
                    Sense::Equal,
                    volume,
                    &format!("harv({},{},{})", species, region, period),
                )?;
            }
        }
    }
    // endregion Harvest

    model.update();
    log::info!(
        "Created forest LP with {} stands, {} variables and {} constraints",
        n_stands,
        model.num_vars(),
        model.num_constrs()
    );
    Ok(model)
}

#[cfg(test)]
mod forest_tests {
    use super::*;
    use crate::inspect::{list_constraints, sum_variables_by_index, Scope};
    use crate::naming::IndexValue;

    #[test]
    fn schedules() {
        let schedules = schedule_generator(4, 10);
        assert_eq!(schedules.len(), 26);
        assert!(schedules[0].iter().all(|harvest| !harvest));
        assert!(schedules
            .iter()
            .all(|s| s.iter().filter(|harvest| **harvest).count() <= 2));
        assert_eq!(schedule_generator(2, 4).len(), 6);
        assert!(!eligible(&[true, false, true, false], 2));
        assert!(eligible(&[true, false, false, true], 2));
        assert!(!eligible(&[true, false, false, true, true], 0));

        // [0,0,0,0] [0,0,0,1] [0,0,1,0] [0,1,0,0] [1,0,0,0] [1,0,0,1]
        let short = schedule_generator(2, 4);
        assert_eq!(short[1], vec![false, false, false, true]);
        assert_eq!(short[5], vec![true, false, false, true]);

        // longer than the bits of a usize
        let long = schedule_generator(4, 70);
        assert_eq!(long.len(), 1 + 70 + (1..=65).sum::<usize>());
        assert!(long.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(schedule_generator(0, 0) == vec![Vec::<bool>::new()]);
    }

    #[test]
    fn yields() {
        assert_eq!(logistic_yield(0., 0.05125), 0.);
        assert_eq!(logistic_yield(180., 0.05125), 150.);
        let expected = 150. / (1. + (-0.025f64 * 40.).exp()) * 0.5;
        assert!((logistic_yield(40., 0.025) - expected).abs() < 1e-12);
        let table = yield_table(Species::Softwood);
        assert_eq!(table.len(), 20);
        assert!(table[&60] > table[&50]);
    }

    #[test]
    fn ages() {
        let schedule = [false, true, false, false];
        assert_eq!(stand_ages(30, &schedule), vec![30, 40, 0, 10]);
        let table = age_schedule_table(&schedule_generator(4, 10));
        assert_eq!(table.len(), 20);
        assert_eq!(table[&90][0][9], 180);
    }

    #[test]
    fn young_stands_wait() {
        let stand = Stand {
            id: 0,
            initial_age: 10,
            softwood: 0.5,
            region: Region::North,
        };
        let mut early = vec![false; PERIODS];
        early[2] = true;
        assert!(!schedule_allowed(&stand, &early));
        let mut late = vec![false; PERIODS];
        late[3] = true;
        assert!(schedule_allowed(&stand, &late));
    }

    #[test]
    fn stands_are_reproducible() {
        let a = create_stands(30, &mut StdRng::seed_from_u64(3));
        let b = create_stands(30, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
        assert!(a
            .iter()
            .all(|s| s.initial_age <= MAX_INITIAL_AGE && s.initial_age % 10 == 0));
    }

    #[test]
    fn model_structure() {
        let model = create_sample_lp(20, 11).unwrap();
        let sets = list_constraints(&model).unwrap();
        assert_eq!(sets["gub"], 20);
        assert_eq!(sets["harv"], 40);
        assert_eq!(sets["age"], 10);
        assert_eq!(sets["env"], 10);
        assert_eq!(model.num_constrs(), 80);
        assert_eq!(model.sense(), ObjectiveSense::Maximize);
        let again = create_sample_lp(20, 11).unwrap();
        assert_eq!(again.num_vars(), model.num_vars());
    }

    #[test]
    fn solve_small_forest() {
        let mut model = create_sample_lp(20, 11).unwrap();
        let status = model.optimize().unwrap();
        assert!(status.has_solution());
        assert!(model.objective_value().unwrap() > 0.);
        let areas = sum_variables_by_index(0, &model, Scope::Set("x")).unwrap();
        assert_eq!(areas.len(), 20);
        for area in areas.values() {
            assert!((area - 1.).abs() < 1e-4);
        }
        assert!(areas.contains_key(&IndexValue::Int(19)));
    }
}
