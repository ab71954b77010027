//! Dashboard aggregate loader.
//!
//! The dashboard is four independent widgets. They load concurrently and a
//! failing widget degrades to its empty default instead of failing the page;
//! the individual failure has already been logged by the gateway.

use std::future::Future;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::api::medications::{self, AdherenceReport, Confirmation, DailyStatus};
use crate::api::prescriptions::{self, Prescription};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::metrics;

/// Confirmations shown on the dashboard.
pub const RECENT_CONFIRMATIONS: u32 = 10;

// Widget names, as used in logs and `DashboardSnapshot::degraded`.

/// Adherence rate over the requested window.
pub const WIDGET_ADHERENCE: &str = "adherence";
/// Most recent reminder confirmations.
pub const WIDGET_CONFIRMATIONS: &str = "confirmations";
/// Today's dose counts and logs.
pub const WIDGET_DAILY_STATUS: &str = "daily_status";
/// The patient's prescriptions.
pub const WIDGET_PRESCRIPTIONS: &str = "prescriptions";

/// Everything the dashboard renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub adherence: AdherenceReport,
    pub confirmations: Vec<Confirmation>,
    pub daily_status: DailyStatus,
    pub prescriptions: Vec<Prescription>,
    /// Widgets that failed and show defaults.
    pub degraded: Vec<&'static str>,
}

impl DashboardSnapshot {
    /// Whether every widget loaded.
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }
}

/// Await `fut`, replacing a failure with `T::default()`.
///
/// Returns the value and whether it is a fallback.
pub async fn fallback<T, F>(widget: &'static str, fut: F) -> (T, bool)
where
    T: Default,
    F: Future<Output = Result<T>>,
{
    match fut.await {
        Ok(value) => (value, false),
        Err(e) => {
            warn!(widget, error = %e, "widget failed, showing defaults");
            metrics::record_dashboard_fallback(widget);
            (T::default(), true)
        }
    }
}

/// Load every dashboard widget for `patient_name`. Never fails.
#[instrument(skip(gateway))]
pub async fn load_dashboard(gateway: &Gateway, patient_name: &str, days: u32) -> DashboardSnapshot {
    let (adherence, confirmations, daily_status, prescriptions) = tokio::join!(
        fallback(WIDGET_ADHERENCE, medications::adherence(gateway, patient_name, days)),
        fallback(
            WIDGET_CONFIRMATIONS,
            medications::confirmations(gateway, patient_name, RECENT_CONFIRMATIONS),
        ),
        fallback(WIDGET_DAILY_STATUS, medications::daily_status(gateway, patient_name)),
        fallback(WIDGET_PRESCRIPTIONS, prescriptions::list(gateway, patient_name)),
    );

    let degraded: Vec<&'static str> = [
        (WIDGET_ADHERENCE, adherence.1),
        (WIDGET_CONFIRMATIONS, confirmations.1),
        (WIDGET_DAILY_STATUS, daily_status.1),
        (WIDGET_PRESCRIPTIONS, prescriptions.1),
    ]
    .into_iter()
    .filter_map(|(widget, failed)| failed.then_some(widget))
    .collect();

    info!(degraded = degraded.len(), "dashboard loaded");

    DashboardSnapshot {
        adherence: adherence.0,
        confirmations: confirmations.0,
        daily_status: daily_status.0,
        prescriptions: prescriptions.0,
        degraded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::gateway::{MockReply, MockTransport};
    use crate::session::MemoryStorage;
    use pretty_assertions::assert_eq;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (MockTransport, Gateway) {
        let mock = MockTransport::new();
        let gateway = mock.gateway(Arc::new(MemoryStorage::new("user"))).unwrap();
        (mock, gateway)
    }

    fn script_all(mock: &MockTransport) {
        mock.on(
            Method::GET,
            "/api/medications/medication-adherence/ana",
            MockReply::json(200, json!({"adherence_rate": 80, "taken": 4, "missed": 1, "pending": 0})),
        );
        mock.on(
            Method::GET,
            "/api/medications/medication-confirmations/ana",
            MockReply::json(200, json!({"confirmations": [{"medication_id": "m-1", "is_taken": true}]})),
        );
        mock.on(
            Method::GET,
            "/api/medications/medication-status/ana",
            MockReply::json(200, json!({"today_summary": {"total": 2, "taken": 1, "missed": 0, "pending": 1}})),
        );
        mock.on(
            Method::GET,
            "/api/prescriptions/prescriptions/ana",
            MockReply::json(200, json!({"prescriptions": [{"_id": "p-1", "diagnosis": "Flu"}]})),
        );
    }

    #[tokio::test]
    async fn all_widgets_load() {
        let (mock, gateway) = setup();
        script_all(&mock);

        let snapshot = load_dashboard(&gateway, "ana", 7).await;

        assert!(snapshot.is_complete());
        assert_eq!(snapshot.adherence.taken, 4);
        assert_eq!(snapshot.confirmations.len(), 1);
        assert_eq!(snapshot.daily_status.today_summary.pending, 1);
        assert_eq!(snapshot.prescriptions[0].diagnosis, "Flu");
        assert_eq!(mock.requests().len(), 4);
    }

    #[tokio::test]
    async fn one_failing_widget_degrades_to_default() {
        let (mock, gateway) = setup();
        script_all(&mock);
        mock.on(
            Method::GET,
            "/api/medications/medication-confirmations/ana",
            MockReply::json(500, json!({"detail": "Error getting confirmations"})),
        );

        let snapshot = load_dashboard(&gateway, "ana", 7).await;

        assert_eq!(snapshot.degraded, vec![WIDGET_CONFIRMATIONS]);
        assert!(snapshot.confirmations.is_empty());
        assert_eq!(snapshot.adherence.adherence_rate, 80.0);
        assert_eq!(snapshot.daily_status.today_summary.total, 2);
        assert_eq!(snapshot.prescriptions.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_backend_yields_empty_dashboard() {
        let (mock, gateway) = setup();
        for path in [
            "/api/medications/medication-adherence/ana",
            "/api/medications/medication-confirmations/ana",
            "/api/medications/medication-status/ana",
            "/api/prescriptions/prescriptions/ana",
        ] {
            mock.on(Method::GET, path, MockReply::network_error("connection refused"));
        }

        let snapshot = load_dashboard(&gateway, "ana", 7).await;

        assert_eq!(snapshot.degraded.len(), 4);
        assert_eq!(
            DashboardSnapshot {
                degraded: Vec::new(),
                ..snapshot
            },
            DashboardSnapshot::default()
        );
    }

    #[tokio::test]
    async fn fallback_passes_success_through() {
        let (value, degraded) = fallback("w", async { Ok::<_, ClientError>(vec![1, 2]) }).await;
        assert_eq!(value, vec![1, 2]);
        assert!(!degraded);
    }

    #[tokio::test]
    async fn fallback_swallows_failure() {
        let (value, degraded): (Vec<u8>, bool) =
            fallback("w", async { Err(ClientError::Network("down".to_string())) }).await;
        assert!(value.is_empty());
        assert!(degraded);
    }
}
