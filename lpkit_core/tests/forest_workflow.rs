// Solve the sample forest LP and inspect it through set names
#[cfg(test)]
mod tests {
    use log::LevelFilter;
    use lpkit_core::inspect::{
        format_variable_sets, get_constraints_attr, get_variables, reoptimize,
        set_constraints_rhs_as_percent, sum_variables_by_index, sum_variables_by_two_indices,
        QueryBuilder, Scope,
    };
    use lpkit_core::io::{read_model, variables_to_csv_by_index, variables_to_json_by_index, write_model};
    use lpkit_core::naming::{IndexFilter, IndexValue};
    use lpkit_core::sample::create_sample_lp;

    fn init_logging() {
        let _ = env_logger::Builder::default()
            .filter(None, LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-4 * (1. + a.abs().max(b.abs()))
    }

    #[test]
    fn forest_workflow() {
        init_logging();
        let mut model = create_sample_lp(30, 2024).unwrap();
        let sets = format_variable_sets(&model).unwrap();
        assert!(sets.starts_with("Variable set, Number of variables\n"));
        assert!(sets.contains("age, 10"));
        assert!(sets.contains("harv, 40"));

        let status = model.optimize().unwrap();
        assert!(status.has_solution());
        let objective = model.objective_value().unwrap();
        assert!(objective > 0.);

        // harvest by period adds up to the objective
        let by_period = sum_variables_by_index(2, &model, Scope::Set("harv")).unwrap();
        assert_eq!(by_period.len(), 10);
        assert_eq!(by_period.keys().next(), Some(&IndexValue::Int(0)));
        assert!(close(by_period.values().sum::<f64>(), objective));

        let by_species = sum_variables_by_two_indices(0, 1, &model, Scope::Set("harv")).unwrap();
        let species: Vec<String> = by_species.keys().map(|k| k.to_string()).collect();
        assert_eq!(species, vec!["hw", "sw"]);

        let mut filter = IndexFilter::new();
        filter.insert(1, IndexValue::from("north"));
        let north = QueryBuilder::default()
            .name("harv")
            .filter(filter.clone())
            .build()
            .unwrap();
        let south = QueryBuilder::default()
            .name("harv")
            .filter(filter)
            .exclude(true)
            .build()
            .unwrap();
        assert_eq!(get_variables(&model, &north).unwrap().len(), 20);
        assert_eq!(get_variables(&model, &south).unwrap().len(), 20);

        // env rows are >= rows, so their slack is never positive
        let slack = get_constraints_attr("slack", &model, Scope::Set("env")).unwrap();
        assert_eq!(slack.len(), 10);
        assert!(slack.values().all(|s| s.as_f64().unwrap() <= 1e-6));

        // relaxing the old forest requirement can only increase the harvest
        set_constraints_rhs_as_percent(0.5, &mut model, Scope::Set("env")).unwrap();
        reoptimize(&mut model).unwrap();
        let relaxed = model.objective_value().unwrap();
        assert!(relaxed >= objective - 1e-4 * objective.abs());

        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("harvest.csv");
        variables_to_csv_by_index(&csv, 2, &model, Scope::Set("harv")).unwrap();
        let text = std::fs::read_to_string(&csv).unwrap();
        assert_eq!(text.lines().count(), 11);
        let chart = dir.path().join("harvest.json");
        variables_to_json_by_index(&chart, 2, &model, Scope::Set("harv"), Some("period")).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&chart).unwrap()).unwrap();
        assert_eq!(value["period"][0]["period"].as_object().unwrap().len(), 10);

        // the written model solves to the same optimum
        let path = dir.path().join("forest.json");
        write_model(&model, &path).unwrap();
        write_model(&model, dir.path().join("forest.lp")).unwrap();
        let mut read = read_model(&path).unwrap();
        assert_eq!(read.num_vars(), model.num_vars());
        assert!(read.optimize().unwrap().has_solution());
        assert!(close(read.objective_value().unwrap(), relaxed));
    }
}
