//! Minimal client for the CKAN action API.
//!
//! Only the pieces the analysis pipeline needs are modelled: invoking an
//! action, mapping the response envelope onto [`ToolError`] variants, and
//! listing the resources of a dataset ("package").

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, error, instrument};

use crate::error::{Result, ToolError};

/// Action returning the metadata of a single dataset.
pub const PACKAGE_SHOW: &str = "package_show";

const NOT_FOUND_ERROR: &str = "Not Found Error";
const AUTHORIZATION_ERROR: &str = "Authorization Error";
const VALIDATION_ERROR: &str = "Validation Error";

/// Connection to a CKAN instance.
pub trait CkanApi {
    /// Invokes `action` with `data` as its parameter dictionary and returns the
    /// `result` member of a successful response.
    fn call_action(&self, action: &str, data: &Value) -> Result<Value>;
}

/// [`CkanApi`] implementation talking to a remote instance over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteCkan {
    base_url: String,
    client: Client,
}

impl RemoteCkan {
    /// `base_url` is the site address without the trailing `/api/action`.
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn action_url(&self, action: &str) -> String {
        format!("{}/api/action/{action}", self.base_url.trim_end_matches('/'))
    }
}

impl CkanApi for RemoteCkan {
    #[instrument(level = "debug", skip(self, data), fields(base_url = %self.base_url))]
    fn call_action(&self, action: &str, data: &Value) -> Result<Value> {
        let url = self.action_url(action);
        let response = self.client.post(&url).json(data).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!(status, bytes = body.len(), "received action response");
        interpret_response(action, &url, status, &body)
    }
}

#[derive(Debug, Deserialize)]
struct ActionResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ActionError>,
}

#[derive(Debug, Deserialize)]
struct ActionError {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(flatten)]
    details: Map<String, Value>,
}

impl ActionError {
    fn message(&self) -> String {
        match self.details.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => Value::Object(self.details.clone()).to_string(),
        }
    }
}

/// Maps a raw action response onto the action result or a typed error.
pub fn interpret_response(action: &str, url: &str, status: u16, body: &str) -> Result<Value> {
    let envelope: ActionResponse =
        serde_json::from_str(body).map_err(|_| ToolError::NotCkan {
            url: url.to_string(),
            status,
        })?;

    if envelope.success {
        return Ok(envelope.result.unwrap_or(Value::Null));
    }

    let Some(failure) = envelope.error else {
        return Err(ToolError::NotCkan {
            url: url.to_string(),
            status,
        });
    };

    let message = failure.message();
    Err(match failure.kind.as_deref() {
        Some(NOT_FOUND_ERROR) => ToolError::NotFound(message),
        Some(AUTHORIZATION_ERROR) => ToolError::NotAuthorized(message),
        Some(VALIDATION_ERROR) => ToolError::Validation(message),
        kind => ToolError::ActionFailed {
            action: action.to_string(),
            kind: kind.unwrap_or("unknown").to_string(),
            message,
        },
    })
}

/// Metadata record describing one downloadable data file of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Resource {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// Looks up the dataset `identifier` and returns its resource list.
///
/// A dataset the catalog does not know is logged and reported as `Ok(None)`;
/// `Ok(None)` is also returned when the dataset has no `resources` member.
/// Any other failure is propagated.
#[instrument(level = "info", skip(connection))]
pub fn get_data_file_list<C>(connection: &C, identifier: &str) -> Result<Option<Vec<Resource>>>
where
    C: CkanApi + ?Sized,
{
    let data = json!({ "id": identifier });
    let package = match connection.call_action(PACKAGE_SHOW, &data) {
        Ok(package) => package,
        Err(ToolError::NotFound(_)) => {
            error!(identifier, "No dataset with identifier {identifier} found.");
            return Ok(None);
        }
        Err(other) => return Err(other),
    };

    match package.get("resources") {
        None | Some(Value::Null) => Ok(None),
        Some(resources) => {
            let resources: Vec<Resource> = serde_json::from_value(resources.clone())?;
            debug!(count = resources.len(), "dataset resources listed");
            Ok(Some(resources))
        }
    }
}
