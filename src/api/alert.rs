//! Alerts, alert types and the triggers that raise them.

use serde::Serialize;

use super::objects::{Alert, AlertTrigger, AlertType};
use super::{Api, ApiObject, Form, SOURCE};
use crate::data::parse_dimension_specs;
use crate::error::ApiError;

/// Which open alerts to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertFilter {
    Unresolved,
    Unacknowledged,
}

impl AlertFilter {
    fn query_key(self) -> &'static str {
        match self {
            AlertFilter::Unresolved => "selectByResolved",
            AlertFilter::Unacknowledged => "selectByAcknowledged",
        }
    }
}

/// What to do with an open alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSolution {
    Acknowledge,
    Resolve,
}

impl AlertSolution {
    fn action(self) -> &'static str {
        match self {
            AlertSolution::Acknowledge => "acknowledge",
            AlertSolution::Resolve => "resolve",
        }
    }
}

/// Fields of a new alert type. Handles are already in their JSON form.
#[derive(Debug, Clone, Default)]
pub struct NewAlertType {
    pub name: String,
    pub description: String,
    pub handle: String,
    pub backup_handle: Option<String>,
    pub backup_seconds: Option<i64>,
    pub escalation_handle: Option<String>,
    pub escalation_seconds: Option<i64>,
}

/// Fields of a new trigger. Leaving both `server_id` and `group_id` empty
/// makes the trigger apply to the whole application.
#[derive(Debug, Clone, Default)]
pub struct NewTrigger {
    pub name: String,
    pub description: String,
    pub config: String,
    pub dimension_specs: String,
    pub metric_id: i64,
    pub auto_resolve: Option<i64>,
    pub server_id: Option<i64>,
    pub group_id: Option<i64>,
}

impl NewTrigger {
    pub fn on_app(&self) -> bool {
        self.server_id.is_none() && self.group_id.is_none()
    }
}

#[derive(Debug, Serialize)]
struct Contact<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook: Option<&'a str>,
}

/// Turns `EMAILUSER:1 EMAIL:ops@example.com SLACK:<url>` into the JSON list
/// of delivery mechanisms the API expects. Unknown contact types are skipped.
pub fn parse_handle(handle: &str) -> Result<String, ApiError> {
    let mut contacts = Vec::new();

    for contact in handle.split(' ') {
        let Some((kind, target)) = contact.split_once(':') else {
            continue;
        };
        let mut parsed = Contact {
            kind,
            id: None,
            address: None,
            webhook: None,
        };
        match kind {
            "EMAILUSER" => parsed.id = Some(target),
            "EMAIL" => parsed.address = Some(target),
            "SLACK" => parsed.webhook = Some(target),
            _ => continue,
        }
        contacts.push(parsed);
    }

    if contacts.is_empty() {
        return Err(ApiError::InvalidArgument(
            "Could not parse the alert handle".to_string(),
        ));
    }
    Ok(serde_json::to_string(&contacts)?)
}

impl Api {
    pub async fn get_alerts_by(&mut self, filter: AlertFilter) -> Result<String, ApiError> {
        let uri = self.app_path(&format!("{}s/", Alert::NAME));
        self.call(
            reqwest::Method::GET,
            &uri,
            &[(filter.query_key(), "false")],
            &Form::new(),
        )
        .await
    }

    pub async fn alert_solution(
        &mut self,
        alert: &Alert,
        solution: AlertSolution,
    ) -> Result<String, ApiError> {
        let form: Form = vec![("version", alert.version.to_string())];
        self.put(&format!("alerts/{}/{}/", alert.id, solution.action()), form)
            .await
    }

    pub async fn create_alert_type(&mut self, alert_type: &NewAlertType) -> Result<String, ApiError> {
        let mut form: Form = vec![
            ("name", alert_type.name.clone()),
            ("description", alert_type.description.clone()),
            ("handle", alert_type.handle.clone()),
            ("source", SOURCE.to_string()),
        ];
        if let Some(seconds) = alert_type.backup_seconds {
            form.push(("backupSeconds", seconds.to_string()));
        }
        if let Some(handle) = &alert_type.backup_handle {
            form.push(("backupHandle", handle.clone()));
        }
        if let Some(seconds) = alert_type.escalation_seconds {
            form.push(("escalationSeconds", seconds.to_string()));
        }
        if let Some(handle) = &alert_type.escalation_handle {
            form.push(("escalationHandle", handle.clone()));
        }

        let result = self.post("alerttypes/", form).await;
        self.created_or_existing(AlertType::NAME, result).await
    }

    /// Zero seconds and empty handles are left out of the update.
    pub async fn update_alert_type(&mut self, alert_type: &AlertType) -> Result<String, ApiError> {
        let mut form: Form = vec![
            ("name", alert_type.name.clone()),
            ("description", alert_type.description.clone()),
            ("handle", alert_type.handle.clone()),
            ("source", alert_type.source.clone()),
            ("version", alert_type.version.to_string()),
        ];
        if alert_type.backup_seconds != 0 {
            form.push(("backupSeconds", alert_type.backup_seconds.to_string()));
        }
        if !alert_type.backup_handle.is_empty() {
            form.push(("backupHandle", alert_type.backup_handle.clone()));
        }
        if alert_type.escalation_seconds != 0 {
            form.push(("escalationSeconds", alert_type.escalation_seconds.to_string()));
        }
        if !alert_type.escalation_handle.is_empty() {
            form.push(("escalationHandle", alert_type.escalation_handle.clone()));
        }

        self.put(&format!("alerttypes/{}/", alert_type.id), form)
            .await
    }

    pub async fn get_triggers(&mut self, alert_type_id: i64) -> Result<String, ApiError> {
        self.get(&format!("alerttypes/{alert_type_id}/triggers/"))
            .await
    }

    pub async fn create_trigger(
        &mut self,
        alert_type_id: i64,
        trigger: &NewTrigger,
    ) -> Result<String, ApiError> {
        let dimension_specs = parse_dimension_specs(&trigger.dimension_specs)?;
        let mut form: Form = vec![
            ("name", trigger.name.clone()),
            ("description", trigger.description.clone()),
            ("metric", trigger.metric_id.to_string()),
            ("config", trigger.config.clone()),
            ("onApp", trigger.on_app().to_string()),
            ("source", SOURCE.to_string()),
            ("dimensionSpecs", dimension_specs),
        ];
        if let Some(server_id) = trigger.server_id {
            form.push(("server", server_id.to_string()));
        } else if let Some(group_id) = trigger.group_id {
            form.push(("group", group_id.to_string()));
        }
        if let Some(seconds) = trigger.auto_resolve {
            form.push(("autoresolveSeconds", seconds.to_string()));
        }

        match self
            .post(&format!("alerttypes/{alert_type_id}/triggers/"), form)
            .await
        {
            Err(ApiError::Duplicate(id)) => {
                self.get_object_from_group(AlertType::NAME, AlertTrigger::NAME, alert_type_id, id)
                    .await
            }
            other => other,
        }
    }

    pub async fn update_trigger(
        &mut self,
        alert_type_id: i64,
        trigger: &AlertTrigger,
    ) -> Result<String, ApiError> {
        let mut form: Form = vec![
            ("name", trigger.name.clone()),
            ("description", trigger.description.clone()),
            ("dimensionSpecs", trigger.dimension_specs.clone()),
            ("config", trigger.config.clone()),
            ("onApp", trigger.on_app.to_string()),
            ("source", trigger.source.clone()),
            ("version", trigger.version.to_string()),
        ];
        if trigger.metric != 0 {
            form.push(("metric", trigger.metric.to_string()));
        }
        if trigger.server_id != 0 {
            form.push(("server", trigger.server_id.to_string()));
        } else if trigger.group_id != 0 {
            form.push(("group", trigger.group_id.to_string()));
        }
        if trigger.auto_resolve != 0 {
            form.push(("autoresolveSeconds", trigger.auto_resolve.to_string()));
        }

        self.put(
            &format!("alerttypes/{alert_type_id}/triggers/{}/", trigger.id),
            form,
        )
        .await?;
        self.get_object_from_group(AlertType::NAME, AlertTrigger::NAME, alert_type_id, trigger.id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_handle_all_contact_types() {
        let handle = parse_handle("EMAILUSER:1 EMAIL:ops@example.com SLACK:https://hooks.slack.com/x")
            .unwrap();
        assert_eq!(
            handle,
            r#"[{"type":"EMAILUSER","id":"1"},{"type":"EMAIL","address":"ops@example.com"},{"type":"SLACK","webhook":"https://hooks.slack.com/x"}]"#
        );
    }

    #[test]
    fn test_parse_handle_skips_unknown_contacts() {
        let handle = parse_handle("PAGER:12 EMAIL:a@b.c nothing").unwrap();
        assert_eq!(handle, r#"[{"type":"EMAIL","address":"a@b.c"}]"#);
    }

    #[test]
    fn test_parse_handle_without_contacts() {
        for handle in ["", "ops@example.com", "PAGER:1"] {
            let err = parse_handle(handle).unwrap_err();
            assert_eq!(err.to_string(), "Could not parse the alert handle");
        }
    }

    #[test]
    fn test_trigger_scope() {
        let mut trigger = NewTrigger::default();
        assert!(trigger.on_app());
        trigger.group_id = Some(3);
        assert!(!trigger.on_app());
    }

    #[test]
    fn test_filter_and_solution_names() {
        assert_eq!(AlertFilter::Unresolved.query_key(), "selectByResolved");
        assert_eq!(AlertFilter::Unacknowledged.query_key(), "selectByAcknowledged");
        assert_eq!(AlertSolution::Acknowledge.action(), "acknowledge");
        assert_eq!(AlertSolution::Resolve.action(), "resolve");
    }
}
