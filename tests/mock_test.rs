#[cfg(feature = "mock")]
mod mock_tests {
    use catalog_backoffice::dashboard::{
        default_preferences, CoreUsage, CpuStats, RedisStats, ServerResources,
    };
    use catalog_backoffice::search::SuggestionUpdate;
    use catalog_backoffice::{
        Alert, BackofficeError, Dashboard, MockMetricsSource, MockNotifier, MockSuggestionSource,
        PollOutcome, SuggestionBox,
    };
    use std::sync::Arc;

    fn busy_server() -> ServerResources {
        ServerResources {
            cpu: CpuStats {
                per_core: vec![
                    CoreUsage { usage: Some(97.0) },
                    CoreUsage { usage: Some(12.0) },
                ],
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_mock_metrics_raise_and_notify() {
        let mut source = MockMetricsSource::new();
        source
            .expect_server_resources()
            .times(2)
            .returning(|| Ok(busy_server()));
        source
            .expect_redis_stats()
            .times(2)
            .returning(|| Ok(RedisStats::default()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|alert: &Alert| alert.kpi_id == "cpu" && alert.value == 97.0)
            .times(1)
            .returning(|_| Ok(()));

        let mut dashboard = Dashboard::new(Arc::new(source), default_preferences())
            .with_notifier(Arc::new(notifier));

        assert!(matches!(
            dashboard.poll_once().await,
            PollOutcome::Updated { ref alerts } if alerts.len() == 1
        ));
        // Still above the threshold: no second notification
        assert!(matches!(
            dashboard.poll_once().await,
            PollOutcome::Updated { ref alerts } if alerts.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_mock_metrics_failure_is_stale() {
        let mut source = MockMetricsSource::new();
        source
            .expect_server_resources()
            .returning(|| Err(BackofficeError::Network("connection refused".to_string())));
        source
            .expect_redis_stats()
            .returning(|| Ok(RedisStats::default()));

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let mut dashboard = Dashboard::new(Arc::new(source), default_preferences())
            .with_notifier(Arc::new(notifier));

        assert!(matches!(
            dashboard.poll_once().await,
            PollOutcome::Stale(BackofficeError::Network(_))
        ));
        assert!(dashboard.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_mock_suggestion_source() {
        let mut source = MockSuggestionSource::new();
        source
            .expect_suggestions()
            .withf(|query: &str| query == "nin")
            .times(1)
            .returning(|_| Ok(vec!["Nina Simone".to_string(), "Nine Inch Nails".to_string()]));

        let suggestion_box = SuggestionBox::new(Arc::new(source));

        assert_eq!(
            suggestion_box.update("n").await.unwrap(),
            SuggestionUpdate::Cleared
        );
        assert_eq!(
            suggestion_box.update("nin").await.unwrap(),
            SuggestionUpdate::Applied(vec![
                "Nina Simone".to_string(),
                "Nine Inch Nails".to_string()
            ])
        );
    }
}
