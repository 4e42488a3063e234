//! Typed views of the API objects the CLI reads back before updating them.
//!
//! Only the fields the CLI sends on update are modelled; anything else the
//! API returns is ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// An API object with an identity, addressed by its collection name.
pub trait ApiObject: DeserializeOwned {
    /// Singular collection name, e.g. `servergroup` for `/servergroups/`.
    const NAME: &'static str;

    fn id(&self) -> i64;
}

macro_rules! api_object {
    ($ty:ty, $name:literal) => {
        impl ApiObject for $ty {
            const NAME: &'static str = $name;

            fn id(&self) -> i64 {
                self.id
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Server {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub state: String,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerGroup {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub state: String,
    pub parent_id: Option<i64>,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metric {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub data_type: String,
    pub period: i64,
    pub unit: String,
    pub source: String,
    pub subject: String,
    pub state: String,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricGroup {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub state: String,
    pub subject: String,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dimension {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub attribute_descriptions: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub state: String,
    pub version: i64,
}

/// One occurrence of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventData {
    pub id: i64,
    pub timestamp: i64,
    #[serde(alias = "stoptime")]
    pub stop_time: Option<i64>,
    pub message: String,
    pub attribute: String,
    pub subject: String,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Alert {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub version: i64,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertType {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub handle: String,
    pub backup_handle: String,
    pub escalation_handle: String,
    pub backup_seconds: i64,
    pub escalation_seconds: i64,
    pub source: String,
    pub version: i64,
}

/// Condition on a metric that raises alerts of an [`AlertType`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertTrigger {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "autoresolveSeconds")]
    pub auto_resolve: i64,
    pub dimension_specs: String,
    pub metric: i64,
    pub config: String,
    pub on_app: bool,
    #[serde(rename = "group")]
    pub group_id: i64,
    #[serde(rename = "server")]
    pub server_id: i64,
    pub source: String,
    pub version: i64,
}

api_object!(Server, "server");
api_object!(ServerGroup, "servergroup");
api_object!(Metric, "metric");
api_object!(MetricGroup, "metricgroup");
api_object!(Dimension, "dimension");
api_object!(Event, "event");
api_object!(EventData, "data");
api_object!(Alert, "alert");
api_object!(AlertType, "alerttype");
api_object!(AlertTrigger, "trigger");
