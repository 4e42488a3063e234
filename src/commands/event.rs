//! `event` commands, including event data entries.

use anyhow::Result;

use coscale_cli::api::event::NewEventData;
use coscale_cli::api::objects::Event;
use coscale_cli::api::{Api, ApiObject};
use coscale_cli::cli::{EventAction, EventDataArgs};

use super::{delete_object, get_object, resolve, resolve_id};

pub async fn command_event(api: &mut Api, action: EventAction) -> Result<String> {
    match action {
        EventAction::List => Ok(api.list_objects(Event::NAME).await?),
        EventAction::Get(target) => get_object::<Event>(api, &target).await,
        EventAction::Delete(target) => delete_object::<Event>(api, &target).await,
        EventAction::New {
            name,
            kind,
            description,
            attribute_descriptions,
        } => Ok(api
            .create_event(&name, &description, &attribute_descriptions, &kind)
            .await?),
        EventAction::Update {
            target,
            kind,
            description,
            attribute_descriptions,
        } => {
            let mut event: Event = resolve(api, target.id, target.name.as_deref()).await?;
            if let Some(name) = target.name {
                event.name = name;
            }
            if let Some(kind) = kind {
                event.kind = kind;
            }
            if let Some(description) = description {
                event.description = description;
            }
            if let Some(attribute_descriptions) = attribute_descriptions {
                event.attribute_descriptions = attribute_descriptions;
            }
            Ok(api.update_event(&event).await?)
        }
        EventAction::Data(args) | EventAction::NewData(args) => insert_event_data(api, args).await,
        EventAction::UpdateData {
            event,
            data_id,
            message,
            subject,
            attribute,
            timestamp,
            stop_time,
        } => {
            let event_id = resolve_id::<Event>(api, event.id, event.name.as_deref()).await?;
            let mut data = api.get_event_data(event_id, data_id).await?;
            if let Some(message) = message {
                data.message = message;
            }
            if let Some(subject) = subject {
                data.subject = subject;
            }
            if let Some(attribute) = attribute {
                data.attribute = attribute;
            }
            if let Some(timestamp) = timestamp {
                data.timestamp = timestamp;
            }
            data.stop_time = stop_time;
            Ok(api.update_event_data(event_id, &data).await?)
        }
        EventAction::DeleteData { id, data_id } => Ok(api.delete_event_data(id, data_id).await?),
    }
}

async fn insert_event_data(api: &mut Api, args: EventDataArgs) -> Result<String> {
    let event_id = resolve_id::<Event>(api, args.event.id, args.event.name.as_deref()).await?;
    let data = NewEventData {
        message: &args.message,
        subject: &args.subject,
        attribute: &args.attribute,
        timestamp: args.timestamp,
        stop_time: args.stop_time,
    };
    Ok(api.insert_event_data(event_id, &data).await?)
}
