use crate::domain::alert::{Alert, AlertKind};
use crate::error::EngineError;
use parking_lot::RwLock;
use uuid::Uuid;

/// Append-only alert table; only the acknowledgment fields ever change.
#[derive(Default)]
pub struct AlertStore {
    alerts: RwLock<Vec<Alert>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(
        &self,
        kind: AlertKind,
        bank: &str,
        message: String,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Alert {
        let alert = Alert {
            id: Uuid::new_v4(),
            bank: bank.to_string(),
            kind,
            message,
            created_at: now,
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
        };
        tracing::warn!(bank, kind = ?kind, message = %alert.message, "alert raised");
        self.alerts.write().push(alert.clone());
        alert
    }

    pub fn list(&self, include_acknowledged: bool) -> Vec<Alert> {
        self.alerts
            .read()
            .iter()
            .filter(|a| include_acknowledged || !a.acknowledged)
            .cloned()
            .collect()
    }

    pub fn acknowledge(
        &self,
        id: Uuid,
        by: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Alert, EngineError> {
        let mut alerts = self.alerts.write();
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(EngineError::UnknownAlert(id))?;
        alert.acknowledged = true;
        alert.acknowledged_by = Some(by.to_string());
        alert.acknowledged_at = Some(now);
        Ok(alert.clone())
    }
}
