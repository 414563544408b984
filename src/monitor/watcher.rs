use super::core::alerts::{exceeds_threshold, Alert};
use super::{Delivery, Notifier, PriceSource, Sleeper};
use crate::config::MonitorSettings;
use log::{error, info, warn};

/// Result of a single fetch/compare/notify pass.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    FetchFailed,
    /// First known price, nothing to compare against.
    Baseline { price: f64 },
    Steady { price: f64, difference: f64 },
    /// `delivery` is `None` when the notifier returned an error.
    Alerted {
        price: f64,
        difference: f64,
        delivery: Option<Delivery>,
    },
}

pub struct PriceMonitor<P, N, S> {
    source: P,
    notifier: N,
    sleeper: S,
    settings: MonitorSettings,
    last_price: Option<f64>,
}

impl<P, N, S> PriceMonitor<P, N, S>
where
    P: PriceSource,
    N: Notifier,
    S: Sleeper,
{
    pub fn new(source: P, notifier: N, sleeper: S, settings: MonitorSettings) -> Self {
        Self {
            source,
            notifier,
            sleeper,
            settings,
            last_price: None,
        }
    }

    #[cfg(test)]
    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }

    /// Polls forever. Every tick is followed by the same fixed wait.
    pub async fn run(&mut self) {
        info!("Starting {} price monitor...", self.settings.symbol);
        loop {
            self.tick().await;
            self.sleeper.sleep(self.settings.interval).await;
        }
    }

    pub async fn tick(&mut self) -> TickOutcome {
        let symbol = &self.settings.symbol;

        let current = match self.source.fetch_price().await {
            Ok(price) => price,
            Err(e) => {
                warn!("Error fetching {} price: {}", symbol, e);
                return TickOutcome::FetchFailed;
            }
        };

        let outcome = match self.last_price {
            None => TickOutcome::Baseline { price: current },
            Some(previous) => {
                match exceeds_threshold(previous, current, self.settings.threshold) {
                    Some(difference) => {
                        let alert =
                            Alert::price_move(symbol, previous, current, self.settings.threshold);
                        let delivery = match self.notifier.notify(&alert.subject, &alert.body).await
                        {
                            Ok(delivery) => Some(delivery),
                            Err(e) => {
                                error!("Error sending {} price alert: {}", symbol, e);
                                None
                            }
                        };
                        TickOutcome::Alerted {
                            price: current,
                            difference,
                            delivery,
                        }
                    }
                    None => TickOutcome::Steady {
                        price: current,
                        difference: (current - previous).abs(),
                    },
                }
            }
        };

        self.last_price = Some(current);
        info!("Current {} price: ${:.3}", symbol, current);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeliveryError, FetchError};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Replays a script of prices; `None` entries fail the fetch.
    #[derive(Clone, Default)]
    struct ScriptedSource {
        script: Arc<Mutex<VecDeque<Option<f64>>>>,
        calls: Arc<Mutex<usize>>,
    }

    impl ScriptedSource {
        fn new(script: &[Option<f64>]) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.iter().copied().collect())),
                calls: Arc::new(Mutex::new(0)),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PriceSource for ScriptedSource {
        async fn fetch_price(&self) -> Result<f64, FetchError> {
            *self.calls.lock().unwrap() += 1;
            match self.script.lock().unwrap().pop_front().flatten() {
                Some(price) => Ok(price),
                None => Err(FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)),
            }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<(String, String)>>>,
        fail: bool,
        unconfigured: bool,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn unconfigured() -> Self {
            Self {
                unconfigured: true,
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, subject: &str, body: &str) -> Result<Delivery, DeliveryError> {
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), body.to_string()));
            if self.unconfigured {
                Ok(Delivery::SkippedMissingConfig)
            } else if self.fail {
                Err(DeliveryError::Rejected {
                    status: StatusCode::UNAUTHORIZED,
                    body: "bad key".to_string(),
                })
            } else {
                Ok(Delivery::Sent { status: 202 })
            }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSleeper {
        waits: Arc<Mutex<Vec<Duration>>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
            tokio::time::sleep(duration).await;
        }
    }

    fn monitor(
        source: &ScriptedSource,
        notifier: &RecordingNotifier,
    ) -> PriceMonitor<ScriptedSource, RecordingNotifier, RecordingSleeper> {
        PriceMonitor::new(
            source.clone(),
            notifier.clone(),
            RecordingSleeper::default(),
            MonitorSettings::default(),
        )
    }

    #[tokio::test]
    async fn first_price_only_sets_baseline() {
        let source = ScriptedSource::new(&[Some(0.50)]);
        let notifier = RecordingNotifier::default();
        let mut monitor = monitor(&source, &notifier);

        assert_eq!(monitor.tick().await, TickOutcome::Baseline { price: 0.50 });
        assert_eq!(monitor.last_price(), Some(0.50));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn move_past_threshold_sends_one_alert() {
        let source = ScriptedSource::new(&[Some(0.50), Some(0.65)]);
        let notifier = RecordingNotifier::default();
        let mut monitor = monitor(&source, &notifier);

        monitor.tick().await;
        match monitor.tick().await {
            TickOutcome::Alerted {
                price,
                difference,
                delivery,
            } => {
                assert_eq!(price, 0.65);
                assert!((difference - 0.15).abs() < 1e-9);
                assert_eq!(delivery, Some(Delivery::Sent { status: 202 }));
            }
            other => panic!("expected alert, got {:?}", other),
        }

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        let (subject, body) = &sent[0];
        assert!(subject.contains("$0.1"));
        assert!(body.contains("Previous price: $0.50"));
        assert!(body.contains("Current price:  $0.65"));
        assert!(body.contains("Difference is $0.15"));
        assert_eq!(monitor.last_price(), Some(0.65));
    }

    #[tokio::test]
    async fn small_move_stays_quiet_but_updates_baseline() {
        let source = ScriptedSource::new(&[Some(0.50), Some(0.55)]);
        let notifier = RecordingNotifier::default();
        let mut monitor = monitor(&source, &notifier);

        monitor.tick().await;
        assert!(matches!(
            monitor.tick().await,
            TickOutcome::Steady { price, .. } if price == 0.55
        ));
        assert!(notifier.sent().is_empty());
        assert_eq!(monitor.last_price(), Some(0.55));
    }

    #[tokio::test]
    async fn drop_past_threshold_alerts_too() {
        let source = ScriptedSource::new(&[Some(0.80), Some(0.60)]);
        let notifier = RecordingNotifier::default();
        let mut monitor = monitor(&source, &notifier);

        monitor.tick().await;
        assert!(matches!(monitor.tick().await, TickOutcome::Alerted { .. }));
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_baseline() {
        let source = ScriptedSource::new(&[Some(0.50), None, Some(0.65)]);
        let notifier = RecordingNotifier::default();
        let mut monitor = monitor(&source, &notifier);

        monitor.tick().await;
        assert_eq!(monitor.tick().await, TickOutcome::FetchFailed);
        assert_eq!(monitor.last_price(), Some(0.50));
        assert!(notifier.sent().is_empty());

        // compared against 0.50, not reset by the failure
        assert!(matches!(monitor.tick().await, TickOutcome::Alerted { .. }));
    }

    #[tokio::test]
    async fn failure_before_any_price_leaves_state_empty() {
        let source = ScriptedSource::new(&[None, Some(1.0)]);
        let notifier = RecordingNotifier::default();
        let mut monitor = monitor(&source, &notifier);

        assert_eq!(monitor.tick().await, TickOutcome::FetchFailed);
        assert_eq!(monitor.last_price(), None);
        assert_eq!(monitor.tick().await, TickOutcome::Baseline { price: 1.0 });
    }

    #[tokio::test]
    async fn delivery_error_is_swallowed() {
        let source = ScriptedSource::new(&[Some(0.50), Some(0.65), Some(0.90)]);
        let notifier = RecordingNotifier::failing();
        let mut monitor = monitor(&source, &notifier);

        monitor.tick().await;
        assert!(matches!(
            monitor.tick().await,
            TickOutcome::Alerted { delivery: None, .. }
        ));
        assert_eq!(monitor.last_price(), Some(0.65));

        assert!(matches!(monitor.tick().await, TickOutcome::Alerted { .. }));
        assert_eq!(notifier.sent().len(), 2);
        assert_eq!(monitor.last_price(), Some(0.90));
    }

    #[tokio::test]
    async fn unconfigured_notifier_still_advances_baseline() {
        let source = ScriptedSource::new(&[Some(0.50), Some(0.65), Some(0.66)]);
        let notifier = RecordingNotifier::unconfigured();
        let mut monitor = monitor(&source, &notifier);

        monitor.tick().await;
        assert!(matches!(
            monitor.tick().await,
            TickOutcome::Alerted {
                delivery: Some(Delivery::SkippedMissingConfig),
                ..
            }
        ));
        assert_eq!(monitor.last_price(), Some(0.65));

        assert!(matches!(
            monitor.tick().await,
            TickOutcome::Steady { price, .. } if price == 0.66
        ));
        assert_eq!(monitor.last_price(), Some(0.66));
    }

    #[tokio::test(start_paused = true)]
    async fn run_waits_fixed_interval_after_every_tick() {
        let source = ScriptedSource::new(&[Some(0.50), None, Some(0.70), Some(0.71)]);
        let notifier = RecordingNotifier::default();
        let sleeper = RecordingSleeper::default();
        let mut monitor = PriceMonitor::new(
            source.clone(),
            notifier.clone(),
            sleeper.clone(),
            MonitorSettings::default(),
        );

        // ticks at t=0, 60, 120, 180; the deadline lands inside the fourth wait
        let res = tokio::time::timeout(Duration::from_secs(200), monitor.run()).await;
        assert!(res.is_err(), "run never returns on its own");

        assert_eq!(source.calls(), 4);
        let waits = sleeper.waits.lock().unwrap().clone();
        assert_eq!(waits, vec![Duration::from_secs(60); 4]);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(monitor.last_price(), Some(0.71));
    }
}
