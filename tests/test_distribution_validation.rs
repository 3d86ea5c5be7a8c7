#[cfg(test)]
mod test_distribution_validation {
    use bayestable::pgm::common::error::{ConstructionError, LookupError};
    use bayestable::pgm::{BayesianNetwork, ConditioningKey, Distribution, NetworkError, Reference};

    fn coin() -> Distribution {
        Distribution::independent([("heads", 0.5), ("tails", 0.5)]).unwrap()
    }

    fn die() -> Distribution {
        Distribution::independent([("low", 0.5), ("high", 0.5)]).unwrap()
    }

    fn refs(table: &Distribution) -> (Reference, Reference) {
        (table.labels()[0].clone(), table.labels()[1].clone())
    }

    fn construction_error<T>(result: Result<T, NetworkError>) -> ConstructionError {
        match result {
            Err(NetworkError::Construction(error)) => error,
            Err(other) => panic!("expected a construction error, got {}", other),
            Ok(_) => panic!("expected a construction error, got a value"),
        }
    }

    #[test]
    fn test_independent_must_sum_to_one() {
        let error = construction_error(Distribution::independent([("a", 0.5), ("b", 0.4)]));
        assert!(matches!(error, ConstructionError::NotNormalized { .. }));

        assert!(Distribution::independent([("a", 0.5), ("b", 0.5 - 1e-10)]).is_ok());
    }

    #[test]
    fn test_independent_rejects_invalid_values() {
        let error = construction_error(Distribution::independent([("a", 1.5), ("b", -0.5)]));
        assert!(matches!(error, ConstructionError::InvalidProbability { .. }));

        let error = construction_error(Distribution::independent([("a", f64::NAN), ("b", 1.0)]));
        assert!(matches!(error, ConstructionError::NotNormalized { .. }));
    }

    #[test]
    fn test_duplicate_labels_are_rejected() {
        let error = construction_error(Distribution::independent([("a", 0.5), ("a", 0.5)]));
        assert!(matches!(error, ConstructionError::DuplicateLabel(label) if label == "a"));
    }

    #[test]
    fn test_row_length_must_match_labels() {
        let coin = coin();
        let (heads, tails) = refs(&coin);
        let error = construction_error(Distribution::dependent(
            &["x", "y"],
            [(heads, vec![0.2, 0.3, 0.5]), (tails, vec![0.5, 0.5])],
        ));
        assert!(matches!(error, ConstructionError::LabelCountMismatch { .. }));
    }

    #[test]
    fn test_rows_must_have_equal_length() {
        let coin = coin();
        let (heads, tails) = refs(&coin);
        let error = construction_error(Distribution::dependent(
            &["x", "y"],
            [(heads, vec![0.5, 0.5]), (tails, vec![1.0])],
        ));
        assert!(matches!(error, ConstructionError::RaggedRows { .. }));
    }

    #[test]
    fn test_key_shapes_must_be_consistent() {
        let coin = coin();
        let (heads, tails) = refs(&coin);
        let error = construction_error(Distribution::dependent(
            &["x", "y"],
            [
                (ConditioningKey::Single(heads), [0.5, 0.5]),
                (ConditioningKey::Tuple(vec![tails]), [0.5, 0.5]),
            ],
        ));
        assert!(matches!(error, ConstructionError::MixedKeyShapes));
    }

    #[test]
    fn test_row_cannot_repeat_a_table() {
        let coin = coin();
        let (heads, tails) = refs(&coin);
        let error = construction_error(Distribution::dependent(
            &["x", "y"],
            [
                ([heads.clone(), tails.clone()], [0.5, 0.5]),
                ([tails, heads], [0.5, 0.5]),
            ],
        ));
        assert!(matches!(error, ConstructionError::RepeatedDependency { .. }));
    }

    #[test]
    fn test_every_dependency_label_must_appear() {
        let coin = coin();
        let (heads, _) = refs(&coin);
        let error = construction_error(Distribution::dependent(&["x", "y"], [(heads, [0.5, 0.5])]));
        assert!(matches!(error, ConstructionError::IncompleteDependency { .. }));
    }

    #[test]
    fn test_rows_must_sum_to_one() {
        let coin = coin();
        let (heads, tails) = refs(&coin);
        let error = construction_error(Distribution::dependent(
            &["x", "y"],
            [(heads, [0.5, 0.5]), (tails, [0.5, 0.4])],
        ));
        assert!(matches!(error, ConstructionError::NotNormalized { .. }));
    }

    #[test]
    fn test_rows_must_cover_cross_product() {
        let coin = coin();
        let die = die();
        let (heads, tails) = refs(&coin);
        let (low, high) = refs(&die);

        // every label of each table appears, but (tails, low) is missing
        let error = construction_error(Distribution::dependent(
            &["x", "y"],
            [
                ([heads.clone(), low.clone()], [0.5, 0.5]),
                ([heads, high.clone()], [0.5, 0.5]),
                ([tails, high], [0.5, 0.5]),
            ],
        ));
        match error {
            ConstructionError::IncompleteCrossProduct { missing, .. } => {
                assert!(missing.contains("tails"));
                assert!(missing.contains("low"));
            }
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn test_rows_must_not_repeat_a_combination() {
        let coin = coin();
        let (heads, tails) = refs(&coin);
        let error = construction_error(Distribution::dependent(
            &["x", "y"],
            [
                (heads.clone(), [0.5, 0.5]),
                (tails, [0.5, 0.5]),
                (heads, [0.1, 0.9]),
            ],
        ));
        assert!(matches!(error, ConstructionError::DuplicateCombination(_)));
    }

    #[test]
    fn test_rows_must_hold_probabilities() {
        let coin = coin();
        let (heads, tails) = refs(&coin);
        let error = construction_error(Distribution::dependent(
            &["x", "y"],
            [(heads, [1.25, -0.25]), (tails, [0.5, 0.5])],
        ));
        assert!(matches!(error, ConstructionError::InvalidProbability { .. }));
    }

    #[test]
    fn test_empty_rows_are_rejected() {
        let error = construction_error(Distribution::dependent(
            &["x", "y"],
            Vec::<(ConditioningKey, Vec<f64>)>::new(),
        ));
        assert!(matches!(error, ConstructionError::EmptyRows));
    }

    #[test]
    fn test_lookup_with_too_few_keys() {
        let coin = coin();
        let (heads, tails) = refs(&coin);
        let flip = Distribution::dependent(&["x", "y"], [(heads, [0.3, 0.7]), (tails, [0.6, 0.4])])
            .unwrap();
        assert!(matches!(
            flip.get(["x"]),
            Err(NetworkError::Lookup(LookupError::IncompleteKeys { .. }))
        ));
    }

    #[test]
    fn test_network_names_are_validated() {
        let error = construction_error(BayesianNetwork::new([("a.b", coin())]));
        assert!(matches!(error, ConstructionError::InvalidName(_)));

        let error = construction_error(BayesianNetwork::new([("coin", coin()), ("coin", die())]));
        assert!(matches!(error, ConstructionError::DuplicateName(_)));
    }

    #[test]
    fn test_network_requires_all_dependencies() {
        let coin = coin();
        let (heads, tails) = refs(&coin);
        let flip = Distribution::dependent(&["x", "y"], [(heads, [0.3, 0.7]), (tails, [0.6, 0.4])])
            .unwrap();
        let error = construction_error(BayesianNetwork::new([("flip", flip)]));
        assert!(matches!(error, ConstructionError::UnknownDependency { .. }));
    }

    #[test]
    fn test_network_orders_late_declared_dependencies_first() {
        let coin = coin();
        let (heads, tails) = refs(&coin);
        let flip = Distribution::dependent(&["x", "y"], [(heads, [0.3, 0.7]), (tails, [0.6, 0.4])])
            .unwrap();
        let network = BayesianNetwork::new([("flip", flip), ("coin", coin)]).unwrap();
        assert_eq!(network.names(), vec!["coin", "flip"]);

        let y = network.reference("flip.y").unwrap();
        let p = network.joint_probability(&[y]).unwrap();
        assert!((p - (0.5 * 0.7 + 0.5 * 0.4)).abs() < 1e-12);
    }
}
