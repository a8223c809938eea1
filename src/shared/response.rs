use serde::Serialize;
use utoipa::ToSchema;

/// JSON:API resource object
#[derive(Debug, Serialize, ToSchema)]
pub struct JsonApiResource<T> {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    pub attributes: T,
}

impl<T> JsonApiResource<T> {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>, attributes: T) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            attributes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JsonApiMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// JSON:API top-level document
#[derive(Debug, Serialize, ToSchema)]
pub struct JsonApiResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<JsonApiMeta>,
}

impl<T> JsonApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data, meta: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.meta = Some(JsonApiMeta {
            message: Some(message.into()),
        });
        self
    }
}

/// Body for endpoints that only acknowledge an action
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
