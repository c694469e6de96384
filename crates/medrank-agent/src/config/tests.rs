#[cfg(test)]
mod tests {
    use super::super::*;
    use medrank_ranker::Attribute;

    #[test]
    fn test_flag_beats_env() {
        let path = resolve_path(Some(Path::new("custom.yaml")), Some("env.toml".to_string()));
        assert_eq!(path, PathBuf::from("custom.yaml"));
    }

    #[test]
    fn test_env_beats_default() {
        assert_eq!(resolve_path(None, Some("env.toml".to_string())), PathBuf::from("env.toml"));
        assert_eq!(resolve_path(None, Some(String::new())), PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(resolve_path(None, None), PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load(Some(Path::new("/nonexistent/medrank.toml"))).unwrap();
        assert_eq!(config, RankingConfig::default());
    }

    #[test]
    fn test_default_weights_validate() {
        let w = weights(&RankingConfig::default()).unwrap();
        assert!(w.is_submittable());
        assert_eq!(w.get(Attribute::AverageGpa), 20.0);
    }

    #[test]
    fn test_unknown_weight_key_rejected() {
        let mut config = RankingConfig::default();
        config.weights.insert("Prestige".to_string(), 10);
        let err = weights(&config).unwrap_err();
        assert!(format!("{err:#}").contains("Prestige"));
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = RankingConfig::default();
        apply_overrides(
            &mut config,
            Overrides {
                out_of_state: true,
                top_n: Some(10),
                format: Some(OutputFormat::Csv),
                ..Default::default()
            },
        );
        assert_eq!(config.dataset.cost_view, CostView::OutOfState);
        assert_eq!(config.output.top_n, Some(10));
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.output.search, None);
    }
}
