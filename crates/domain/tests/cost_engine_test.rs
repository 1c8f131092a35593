#[cfg(test)]
mod cost_engine_tests {
    use budget_core::config::{PeriodConfig, ProgramConfig};
    use budget_core::models::{Actor, ActorId, ParameterKey, ParameterValue, Percent, Pricing};
    use budget_core::ParameterSurface;
    use budget_domain::*;

    fn program() -> ProgramConfig {
        ProgramConfig {
            actors: vec![
                Actor::new("ActorA", "Team A", Pricing::hourly(25.0)),
                Actor::new("GRESB", "GRESB", Pricing::monthly(1000.0)),
                Actor::new("ESGDS", "ESGDS", Pricing::annual(15000.0)),
            ],
            periods: vec![
                PeriodConfig::new("Jan - March", &["Docs", "OAD"]),
                PeriodConfig::new("Apr - June", &["Admin"]),
            ],
        }
    }

    fn set(store: &mut ParameterStore, key: ParameterKey, value: ParameterValue) {
        store.set(&key, value).unwrap();
    }

    fn percent(value: u8) -> ParameterValue {
        ParameterValue::Percent(Percent::new(value).unwrap())
    }

    fn compute(program: &ProgramConfig, store: &ParameterStore) -> CostReport {
        let model = AllocationModel::assemble(program, store).unwrap();
        let rates = RateCard::assemble(program, store);
        CostEngine::compute(&model, &rates)
    }

    #[test]
    fn test_hourly_actor_cost() {
        let program = program();
        let mut store = ParameterStore::from_program(&program);
        set(&mut store, ParameterKey::hours("Docs"), ParameterValue::Hours(100));
        set(&mut store, ParameterKey::percent("Docs", "ActorA"), percent(50));

        let report = compute(&program, &store);
        assert_eq!(report.rows[0].costs[&ActorId::new("ActorA")], 1250.0);
    }

    #[test]
    fn test_monthly_prorated_actor_cost() {
        let program = program();
        let mut store = ParameterStore::from_program(&program);
        set(&mut store, ParameterKey::hours("Docs"), ParameterValue::Hours(100));
        set(&mut store, ParameterKey::percent("Docs", "GRESB"), percent(20));

        let report = compute(&program, &store);
        assert_eq!(report.rows[0].costs[&ActorId::new("GRESB")], 125.0);
    }

    #[test]
    fn test_rate_parameter_overrides_configured_amount() {
        let program = program();
        let mut store = ParameterStore::from_program(&program);
        set(&mut store, ParameterKey::hours("Admin"), ParameterValue::Hours(10));
        set(&mut store, ParameterKey::percent("Admin", "ESGDS"), percent(100));
        set(&mut store, ParameterKey::rate("ESGDS"), ParameterValue::Amount(20000.0));

        let report = compute(&program, &store);
        // 20000 / 2000 = 10 每小时
        assert_eq!(report.rows[2].costs[&ActorId::new("ESGDS")], 100.0);
    }

    #[test]
    fn test_over_allocated_task_still_computes() {
        let program = program();
        let mut store = ParameterStore::from_program(&program);
        set(&mut store, ParameterKey::hours("OAD"), ParameterValue::Hours(10));
        set(&mut store, ParameterKey::percent("OAD", "ActorA"), percent(80));
        set(&mut store, ParameterKey::percent("OAD", "GRESB"), percent(60));

        let report = compute(&program, &store);
        let row = &report.rows[1];
        assert_eq!(row.costs[&ActorId::new("ActorA")], 200.0);
        assert_eq!(row.costs[&ActorId::new("GRESB")], 37.5);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].task.as_str(), "OAD");
        assert_eq!(report.warnings[0].total_percent, 140);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let program = program();
        let mut store = ParameterStore::from_program(&program);
        set(&mut store, ParameterKey::hours("Docs"), ParameterValue::Hours(37));
        set(&mut store, ParameterKey::percent("Docs", "GRESB"), percent(33));
        set(&mut store, ParameterKey::percent("Docs", "ESGDS"), percent(17));
        set(&mut store, ParameterKey::hours("Admin"), ParameterValue::Hours(11));
        set(&mut store, ParameterKey::percent("Admin", "ActorA"), percent(71));

        let first = compute(&program, &store);
        let second = compute(&program, &store);
        assert_eq!(first, second);
        for (a, b) in first.rows.iter().zip(&second.rows) {
            assert_eq!(a.total.to_bits(), b.total.to_bits());
        }
        assert_eq!(
            first.aggregates.grand_total.to_bits(),
            second.aggregates.grand_total.to_bits()
        );
    }

    #[test]
    fn test_changing_one_task_leaves_others_untouched() {
        let program = program();
        let mut store = ParameterStore::from_program(&program);
        set(&mut store, ParameterKey::hours("Docs"), ParameterValue::Hours(40));
        set(&mut store, ParameterKey::percent("Docs", "ActorA"), percent(25));
        set(&mut store, ParameterKey::hours("Admin"), ParameterValue::Hours(12));
        set(&mut store, ParameterKey::percent("Admin", "GRESB"), percent(90));
        let before = compute(&program, &store);

        set(&mut store, ParameterKey::hours("Docs"), ParameterValue::Hours(400));
        set(&mut store, ParameterKey::percent("Docs", "ESGDS"), percent(30));
        let after = compute(&program, &store);

        assert_ne!(before.rows[0], after.rows[0]);
        assert_eq!(before.rows[1], after.rows[1]);
        assert_eq!(before.rows[2], after.rows[2]);
    }

    #[test]
    fn test_zero_prorating_hours_is_flagged_not_fatal() {
        let mut program = program();
        program.actors[1].pricing = Pricing::MonthlyProrated {
            monthly_cost: 1000.0,
            prorating_hours: 0.0,
        };
        let mut store = ParameterStore::from_program(&program);
        set(&mut store, ParameterKey::hours("Docs"), ParameterValue::Hours(10));
        set(&mut store, ParameterKey::percent("Docs", "GRESB"), percent(50));
        set(&mut store, ParameterKey::percent("Docs", "ActorA"), percent(50));

        let report = compute(&program, &store);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.rows[0].costs[&ActorId::new("GRESB")], 0.0);
        assert_eq!(report.rows[0].total, 125.0);
    }

    #[test]
    fn test_period_totals_follow_chronological_order() {
        let program = program();
        let store = ParameterStore::from_program(&program);
        let report = compute(&program, &store);
        let periods: Vec<&String> = report.aggregates.by_period.keys().collect();
        assert_eq!(periods, vec!["Jan - March", "Apr - June"]);
        assert_eq!(report.aggregates.grand_total, 0.0);
    }
}
