//! HTTP client for the CoScale REST API.
//!
//! Every call is made against `/api/v1/app/<app id>/...` with form-encoded
//! bodies. The client logs in lazily and logs in once more when a session
//! token turns out to be expired.

pub mod alert;
pub mod data;
pub mod dimension;
pub mod event;
pub mod metric;
pub mod objects;
pub mod server;

use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ApiConfiguration;
use crate::error::ApiError;

pub use objects::ApiObject;

/// Value sent as `source` for objects created by this tool.
pub const SOURCE: &str = "CLI";

const USER_AGENT: &str = "CoScale CLI";
const AUTH_HEADER: &str = "HTTPAuthorization";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Ordered form fields of a request body.
pub type Form = Vec<(&'static str, String)>;

#[derive(Debug, Deserialize)]
struct LoginData {
    #[serde(alias = "Token")]
    token: String,
}

/// Body of a 409 answer.
#[derive(Debug, Default, Deserialize)]
struct ConflictBody {
    #[serde(default, alias = "Msg")]
    msg: String,
    #[serde(default, rename = "type", alias = "Type")]
    kind: String,
    #[serde(default, alias = "ID")]
    id: i64,
}

/// Connection to one CoScale application.
pub struct Api {
    base_url: String,
    access_token: String,
    app_id: String,
    raw_output: bool,
    token: Option<String>,
    client: Client,
}

impl Api {
    pub fn new(config: &ApiConfiguration, raw_output: bool) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            app_id: config.app_id.clone(),
            raw_output,
            token: None,
            client,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Path below the application root, e.g. `servers/12/`.
    pub(crate) fn app_path(&self, path: &str) -> String {
        format!("/api/v1/app/{}/{}", self.app_id, path)
    }

    fn url(&self, uri: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, uri))
            .map_err(|e| ApiError::InvalidConfig(format!("Invalid api url {}: {e}", self.base_url)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn do_request(
        &self,
        method: Method,
        url: Url,
        form: &Form,
    ) -> Result<String, ApiError> {
        debug!("{} {}", method, url);
        let sends_body = method == Method::POST || method == Method::PUT;

        let mut request = self.client.request(method, url);
        if let Some(token) = &self.token {
            request = request.header(AUTH_HEADER, token);
        }
        if sends_body {
            request = request.form(form);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        check_status(status, body)
    }

    /// Exchanges the access token for a session token.
    pub async fn login(&mut self) -> Result<(), ApiError> {
        let url = self.url(&self.app_path("login/"), &[])?;
        let form: Form = vec![("accessToken", self.access_token.clone())];

        self.token = None;
        let body = self
            .do_request(Method::POST, url, &form)
            .await
            .map_err(|e| ApiError::Authentication(e.to_string()))?;
        let login: LoginData = serde_json::from_str(&body)?;

        info!("Logged in to application {}", self.app_id);
        self.token = Some(login.token);
        Ok(())
    }

    async fn make_raw_call(
        &mut self,
        method: Method,
        uri: &str,
        query: &[(&str, &str)],
        form: &Form,
    ) -> Result<String, ApiError> {
        if self.token.is_none() {
            self.login().await?;
        }

        let url = self.url(uri, query)?;
        match self.do_request(method.clone(), url.clone(), form).await {
            Err(ApiError::Unauthorized(_)) => {
                debug!("Session expired, logging in again");
                self.login().await?;
                self.do_request(method, url, form).await
            }
            other => other,
        }
    }

    /// Performs a call and returns the response formatted for output.
    pub(crate) async fn call(
        &mut self,
        method: Method,
        uri: &str,
        query: &[(&str, &str)],
        form: &Form,
    ) -> Result<String, ApiError> {
        let body = self.make_raw_call(method, uri, query, form).await?;
        Ok(self.format_output(&body))
    }

    /// Performs a call and decodes the JSON response.
    pub(crate) async fn call_json<T: DeserializeOwned>(
        &mut self,
        method: Method,
        uri: &str,
        query: &[(&str, &str)],
        form: &Form,
    ) -> Result<T, ApiError> {
        let body = self.make_raw_call(method, uri, query, form).await?;
        let mut value: serde_json::Value = serde_json::from_str(&body)?;
        strip_nulls(&mut value);
        Ok(serde_json::from_value(value)?)
    }

    pub(crate) async fn get(&mut self, path: &str) -> Result<String, ApiError> {
        let uri = self.app_path(path);
        self.call(Method::GET, &uri, &[], &Form::new()).await
    }

    pub(crate) async fn post(&mut self, path: &str, form: Form) -> Result<String, ApiError> {
        let uri = self.app_path(path);
        self.call(Method::POST, &uri, &[], &form).await
    }

    pub(crate) async fn put(&mut self, path: &str, form: Form) -> Result<String, ApiError> {
        let uri = self.app_path(path);
        self.call(Method::PUT, &uri, &[], &form).await
    }

    pub(crate) async fn delete(&mut self, path: &str) -> Result<String, ApiError> {
        let uri = self.app_path(path);
        self.call(Method::DELETE, &uri, &[], &Form::new()).await
    }

    /// Pretty prints JSON with a one-space indent unless raw output was requested.
    pub fn format_output(&self, body: &str) -> String {
        if self.raw_output {
            body.to_string()
        } else {
            indent_json(body)
        }
    }
}

/// Maps an HTTP status code onto the API error taxonomy.
pub(crate) fn check_status(status: u16, body: String) -> Result<String, ApiError> {
    match status {
        200 => Ok(body),
        401 => Err(ApiError::Unauthorized(body)),
        404 => Err(ApiError::NotFound(body)),
        409 => match serde_json::from_str::<ConflictBody>(&body) {
            Ok(conflict) if conflict.kind == "DUPLICATE" => Err(ApiError::Duplicate(conflict.id)),
            Ok(conflict) if conflict.kind == "DISABLED" => Err(ApiError::Disabled(conflict.msg)),
            _ => Err(ApiError::Request(body)),
        },
        code => Err(ApiError::Status { code, body }),
    }
}

/// Drops `null` members so that missing and null fields both take their defaults.
fn strip_nulls(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

fn indent_json(body: &str) -> String {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return body.to_string(),
    };

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    if value.serialize(&mut serializer).is_err() {
        return body.to_string();
    }
    String::from_utf8(out).unwrap_or_else(|_| body.to_string())
}

/// `server` -> `servergroup`; group names are kept as they are.
pub fn group_name(object_name: &str) -> String {
    if object_name.ends_with("group") {
        object_name.to_string()
    } else {
        format!("{object_name}group")
    }
}

/// Generic calls shared by every object family.
impl Api {
    pub async fn list_objects(&mut self, object_name: &str) -> Result<String, ApiError> {
        self.get(&format!("{object_name}s/")).await
    }

    pub async fn get_object(&mut self, object_name: &str, id: i64) -> Result<String, ApiError> {
        self.get(&format!("{object_name}s/{id}/")).await
    }

    pub async fn get_object_by_name(
        &mut self,
        object_name: &str,
        name: &str,
    ) -> Result<String, ApiError> {
        let uri = self.app_path(&format!("{object_name}s/"));
        self.call(Method::GET, &uri, &[("selectByName", name)], &Form::new())
            .await
    }

    pub async fn get_object_from_group(
        &mut self,
        group: &str,
        object_name: &str,
        group_id: i64,
        id: i64,
    ) -> Result<String, ApiError> {
        self.get(&format!("{group}s/{group_id}/{object_name}s/{id}/"))
            .await
    }

    /// Fetches one object of type `T` by id.
    pub async fn fetch<T: ApiObject>(&mut self, id: i64) -> Result<T, ApiError> {
        let uri = self.app_path(&format!("{}s/{id}/", T::NAME));
        self.call_json(Method::GET, &uri, &[], &Form::new()).await
    }

    /// Fetches the first object of type `T` with the given name.
    pub async fn fetch_by_name<T: ApiObject>(&mut self, name: &str) -> Result<T, ApiError> {
        let uri = self.app_path(&format!("{}s/", T::NAME));
        let found: Vec<T> = self
            .call_json(Method::GET, &uri, &[("selectByName", name)], &Form::new())
            .await?;
        found
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("no {} named '{}'", T::NAME, name)))
    }

    /// Fetches an object of type `T` that lives below a parent object.
    pub async fn fetch_from_group<T: ApiObject>(
        &mut self,
        group: &str,
        group_id: i64,
        id: i64,
    ) -> Result<T, ApiError> {
        let uri = self.app_path(&format!("{group}s/{group_id}/{}s/{id}/", T::NAME));
        self.call_json(Method::GET, &uri, &[], &Form::new()).await
    }

    pub async fn fetch_by_name_from_group<T: ApiObject>(
        &mut self,
        group: &str,
        group_id: i64,
        name: &str,
    ) -> Result<T, ApiError> {
        let uri = self.app_path(&format!("{group}s/{group_id}/{}s/", T::NAME));
        let found: Vec<T> = self
            .call_json(Method::GET, &uri, &[("selectByName", name)], &Form::new())
            .await?;
        found
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("no {} named '{}'", T::NAME, name)))
    }

    pub async fn delete_object(&mut self, object_name: &str, id: i64) -> Result<String, ApiError> {
        self.delete(&format!("{object_name}s/{id}/")).await
    }

    /// Adds an object to a group; an object that is already a member is not an error.
    pub async fn add_object_to_group(
        &mut self,
        object_name: &str,
        id: i64,
        group_id: i64,
    ) -> Result<String, ApiError> {
        let group = group_name(object_name);
        match self
            .post(&format!("{group}s/{group_id}/{object_name}s/{id}/"), Form::new())
            .await
        {
            Err(err @ (ApiError::Request(_) | ApiError::Duplicate(_))) => {
                debug!("{object_name} {id} already in {group} {group_id}: {err}");
                Ok(String::new())
            }
            other => other,
        }
    }

    pub async fn delete_object_from_group(
        &mut self,
        object_name: &str,
        id: i64,
        group_id: i64,
    ) -> Result<String, ApiError> {
        let group = group_name(object_name);
        self.delete_object_from_group_by_id(&group, object_name, group_id, id)
            .await
    }

    pub async fn delete_object_from_group_by_id(
        &mut self,
        group: &str,
        object_name: &str,
        group_id: i64,
        id: i64,
    ) -> Result<String, ApiError> {
        self.delete(&format!("{group}s/{group_id}/{object_name}s/{id}/"))
            .await
    }

    /// Resolves a create call that hit a duplicate into the existing object.
    pub(crate) async fn created_or_existing(
        &mut self,
        object_name: &str,
        result: Result<String, ApiError>,
    ) -> Result<String, ApiError> {
        match result {
            Err(ApiError::Duplicate(id)) => {
                debug!("{object_name} already exists with id {id}");
                self.get_object(object_name, id).await
            }
            other => other,
        }
    }
}
