//! Events and their data entries.

use reqwest::Method;

use super::objects::{Event, EventData};
use super::{Api, ApiObject, Form, SOURCE};
use crate::error::ApiError;

/// A new occurrence of an event.
#[derive(Debug, Clone, Default)]
pub struct NewEventData<'a> {
    pub message: &'a str,
    pub subject: &'a str,
    pub attribute: &'a str,
    pub timestamp: i64,
    pub stop_time: Option<i64>,
}

impl Api {
    pub async fn create_event(
        &mut self,
        name: &str,
        description: &str,
        attribute_descriptions: &str,
        event_type: &str,
    ) -> Result<String, ApiError> {
        let form: Form = vec![
            ("name", name.to_string()),
            ("description", description.to_string()),
            ("attributeDescriptions", attribute_descriptions.to_string()),
            ("type", event_type.to_string()),
            ("source", SOURCE.to_string()),
        ];
        let result = self.post("events/", form).await;
        self.created_or_existing(Event::NAME, result).await
    }

    pub async fn update_event(&mut self, event: &Event) -> Result<String, ApiError> {
        let form: Form = vec![
            ("name", event.name.clone()),
            ("description", event.description.clone()),
            ("attributeDescriptions", event.attribute_descriptions.clone()),
            ("type", event.kind.clone()),
            ("source", event.source.clone()),
            ("version", event.version.to_string()),
        ];
        self.put(&format!("events/{}/", event.id), form).await?;
        self.get_object(Event::NAME, event.id).await
    }

    pub async fn get_event_data(
        &mut self,
        event_id: i64,
        data_id: i64,
    ) -> Result<EventData, ApiError> {
        let uri = self.app_path(&format!("events/{event_id}/data/get/{data_id}/"));
        self.call_json(Method::GET, &uri, &[], &Form::new()).await
    }

    pub async fn insert_event_data(
        &mut self,
        event_id: i64,
        data: &NewEventData<'_>,
    ) -> Result<String, ApiError> {
        let mut form: Form = vec![
            ("message", data.message.to_string()),
            ("timestamp", data.timestamp.to_string()),
            ("subject", data.subject.to_string()),
            ("attribute", data.attribute.to_string()),
        ];
        if let Some(stop_time) = data.stop_time {
            form.push(("stopTime", stop_time.to_string()));
        }
        self.post(&format!("events/{event_id}/data/"), form).await
    }

    pub async fn update_event_data(
        &mut self,
        event_id: i64,
        data: &EventData,
    ) -> Result<String, ApiError> {
        let mut form: Form = vec![
            ("message", data.message.clone()),
            ("timestamp", data.timestamp.to_string()),
            ("subject", data.subject.clone()),
            ("attribute", data.attribute.clone()),
            ("version", data.version.to_string()),
        ];
        if let Some(stop_time) = data.stop_time {
            form.push(("stopTime", stop_time.to_string()));
        }
        self.put(&format!("events/{event_id}/data/{}/", data.id), form)
            .await
    }

    pub async fn delete_event_data(
        &mut self,
        event_id: i64,
        data_id: i64,
    ) -> Result<String, ApiError> {
        self.delete(&format!("events/{event_id}/data/{data_id}/"))
            .await
    }
}
