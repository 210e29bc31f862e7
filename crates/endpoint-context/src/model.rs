use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContextError;

/// HTTP method of an endpoint as emitted by the collection/OpenAPI parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(ContextError::UnknownMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = ContextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Method a query appears to be asking about. `Any` means no usable hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MethodHint {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "PUT")]
    Put,
    #[serde(rename = "PATCH")]
    Patch,
    #[serde(rename = "DELETE")]
    Delete,
    #[default]
    #[serde(rename = "any")]
    Any,
}

impl MethodHint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Any => "any",
        }
    }

    pub fn is_any(self) -> bool {
        self == Self::Any
    }

    /// `Any` matches every method; a concrete hint matches only itself.
    pub fn matches(self, method: HttpMethod) -> bool {
        match self {
            Self::Any => true,
            Self::Get => method == HttpMethod::Get,
            Self::Post => method == HttpMethod::Post,
            Self::Put => method == HttpMethod::Put,
            Self::Patch => method == HttpMethod::Patch,
            Self::Delete => method == HttpMethod::Delete,
        }
    }
}

impl fmt::Display for MethodHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodHint {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }
        match trimmed.parse::<HttpMethod>()? {
            HttpMethod::Get => Ok(Self::Get),
            HttpMethod::Post => Ok(Self::Post),
            HttpMethod::Put => Ok(Self::Put),
            HttpMethod::Patch => Ok(Self::Patch),
            HttpMethod::Delete => Ok(Self::Delete),
            HttpMethod::Head | HttpMethod::Options => {
                Err(ContextError::UnknownMethod(s.to_string()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    #[default]
    Query,
    Path,
    Header,
    Cookie,
    Body,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: ParameterLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// Status code as written in the source, e.g. "200", "404" or "default".
    pub status: String,
    #[serde(default)]
    pub description: String,
}

/// One HTTP operation of the loaded API description.
///
/// Produced by the external collection/OpenAPI parser and only ever read here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub id: String,
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub request_body: String,
    #[serde(default)]
    pub responses: Vec<ResponseSpec>,
    #[serde(default)]
    pub auth_required: bool,
}

impl EndpointRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            method,
            path: path.into(),
            folder: None,
            description: String::new(),
            parameters: Vec::new(),
            request_body: String::new(),
            responses: Vec::new(),
            auth_required: false,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        location: ParameterLocation,
    ) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            description: description.into(),
            location,
        });
        self
    }

    pub fn with_request_body(mut self, body: impl Into<String>) -> Self {
        self.request_body = body.into();
        self
    }

    pub fn with_response(mut self, status: impl Into<String>, description: impl Into<String>) -> Self {
        self.responses.push(ResponseSpec {
            status: status.into(),
            description: description.into(),
        });
        self
    }

    pub fn requiring_auth(mut self) -> Self {
        self.auth_required = true;
        self
    }

    pub fn has_response_status(&self, status: u16) -> bool {
        let wanted = status.to_string();
        self.responses.iter().any(|r| r.status.trim() == wanted)
    }
}

/// An ordered corpus snapshot: the collection title plus its endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCorpus {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub endpoints: Vec<EndpointRecord>,
}

impl ApiCorpus {
    pub fn new(title: impl Into<String>, endpoints: Vec<EndpointRecord>) -> Self {
        Self {
            title: title.into(),
            endpoints,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ContextError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// The endpoint field a term was indexed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EndpointField {
    Name,
    Path,
    Method,
    Folder,
    Description,
    ParameterName,
    ParameterDescription,
    RequestBody,
    Response,
}

impl EndpointField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Path => "path",
            Self::Method => "method",
            Self::Folder => "folder",
            Self::Description => "description",
            Self::ParameterName => "parameter_name",
            Self::ParameterDescription => "parameter_description",
            Self::RequestBody => "request_body",
            Self::Response => "response",
        }
    }
}

/// A ranked endpoint. Borrows the record from the caller's corpus.
#[derive(Debug, Clone)]
pub struct ScoredResult<'a> {
    pub endpoint: &'a EndpointRecord,
    pub score: f64,
    pub matched_terms: Vec<String>,
    pub matched_fields: Vec<EndpointField>,
}
