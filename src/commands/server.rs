//! `server` and `servergroup` commands.

use anyhow::Result;

use coscale_cli::api::objects::{Server, ServerGroup};
use coscale_cli::api::{Api, ApiObject};
use coscale_cli::cli::{ServerAction, ServerGroupAction};

use super::{change_membership, delete_object, get_object, resolve};

pub async fn command_server(api: &mut Api, action: ServerAction) -> Result<String> {
    match action {
        ServerAction::List => Ok(api.list_objects(Server::NAME).await?),
        ServerAction::Get(target) => get_object::<Server>(api, &target).await,
        ServerAction::Delete(target) => delete_object::<Server>(api, &target).await,
        ServerAction::New {
            name,
            description,
            server_type,
        } => Ok(api.create_server(&name, &description, &server_type).await?),
        ServerAction::Update {
            target,
            description,
            kind,
            state,
        } => {
            let mut server: Server = resolve(api, target.id, target.name.as_deref()).await?;
            if let Some(name) = target.name {
                server.name = name;
            }
            if let Some(description) = description {
                server.description = description;
            }
            if let Some(kind) = kind {
                server.kind = kind;
            }
            if let Some(state) = state {
                server.state = state;
            }
            Ok(api.update_server(&server).await?)
        }
    }
}

pub async fn command_servergroup(api: &mut Api, action: ServerGroupAction) -> Result<String> {
    match action {
        ServerGroupAction::List => Ok(api.list_objects(ServerGroup::NAME).await?),
        ServerGroupAction::Get(target) => get_object::<ServerGroup>(api, &target).await,
        ServerGroupAction::Delete(target) => delete_object::<ServerGroup>(api, &target).await,
        ServerGroupAction::New {
            name,
            parent_id,
            description,
            kind,
            state,
        } => Ok(api
            .create_server_group(&name, &description, &kind, &state, parent_id)
            .await?),
        ServerGroupAction::Update {
            target,
            parent_id,
            description,
            kind,
            state,
        } => {
            let mut group: ServerGroup = resolve(api, target.id, target.name.as_deref()).await?;
            if let Some(name) = target.name {
                group.name = name;
            }
            if parent_id.is_some() {
                group.parent_id = parent_id;
            }
            if let Some(description) = description {
                group.description = description;
            }
            if let Some(kind) = kind {
                group.kind = kind;
            }
            if let Some(state) = state {
                group.state = state;
            }
            Ok(api.update_server_group(&group).await?)
        }
        ServerGroupAction::AddServer(membership) => {
            change_membership::<Server, ServerGroup>(api, &membership, true).await
        }
        ServerGroupAction::DeleteServer(membership) => {
            change_membership::<Server, ServerGroup>(api, &membership, false).await
        }
        ServerGroupAction::AddServergroup(membership) => {
            change_membership::<ServerGroup, ServerGroup>(api, &membership, true).await
        }
        ServerGroupAction::DeleteServergroup(membership) => {
            change_membership::<ServerGroup, ServerGroup>(api, &membership, false).await
        }
    }
}
