//! Servers and server groups.

use super::objects::{Server, ServerGroup};
use super::{Api, ApiObject, Form, SOURCE};
use crate::error::ApiError;

impl Api {
    pub async fn create_server(
        &mut self,
        name: &str,
        description: &str,
        server_type: &str,
    ) -> Result<String, ApiError> {
        let form: Form = vec![
            ("name", name.to_string()),
            ("description", description.to_string()),
            ("type", server_type.to_string()),
            ("source", SOURCE.to_string()),
        ];
        let result = self.post("servers/", form).await;
        self.created_or_existing(Server::NAME, result).await
    }

    /// Sends every field of `server` and returns the stored object.
    pub async fn update_server(&mut self, server: &Server) -> Result<String, ApiError> {
        let form: Form = vec![
            ("name", server.name.clone()),
            ("description", server.description.clone()),
            ("type", server.kind.clone()),
            ("source", server.source.clone()),
            ("state", server.state.clone()),
            ("version", server.version.to_string()),
        ];
        self.put(&format!("servers/{}/", server.id), form).await?;
        self.get_object(Server::NAME, server.id).await
    }

    pub async fn create_server_group(
        &mut self,
        name: &str,
        description: &str,
        group_type: &str,
        state: &str,
        parent_id: Option<i64>,
    ) -> Result<String, ApiError> {
        let mut form: Form = vec![
            ("name", name.to_string()),
            ("description", description.to_string()),
            ("type", group_type.to_string()),
            ("state", state.to_string()),
            ("source", SOURCE.to_string()),
        ];
        if let Some(parent_id) = parent_id {
            form.push(("parentId", parent_id.to_string()));
        }
        let result = self.post("servergroups/", form).await;
        self.created_or_existing(ServerGroup::NAME, result).await
    }

    pub async fn update_server_group(&mut self, group: &ServerGroup) -> Result<String, ApiError> {
        let mut form: Form = vec![
            ("name", group.name.clone()),
            ("description", group.description.clone()),
            ("type", group.kind.clone()),
            ("state", group.state.clone()),
            ("source", group.source.clone()),
            ("version", group.version.to_string()),
        ];
        if let Some(parent_id) = group.parent_id {
            form.push(("parentId", parent_id.to_string()));
        }
        self.put(&format!("servergroups/{}/", group.id), form).await?;
        self.get_object(ServerGroup::NAME, group.id).await
    }
}
