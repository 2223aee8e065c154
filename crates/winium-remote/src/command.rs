//! Wire description of a named command and its URL templating.

use std::fmt;

use reqwest::Url;
use serde_json::{Map, Value};

use crate::error::RemoteError;

/// Placeholder filled from the command's session id rather than its parameters.
pub const SESSION_ID_PLACEHOLDER: &str = "sessionId";

/// HTTP verb used by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Delete,
}

impl HttpVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpVerb> for reqwest::Method {
    fn from(verb: HttpVerb) -> Self {
        match verb {
            HttpVerb::Get => reqwest::Method::GET,
            HttpVerb::Post => reqwest::Method::POST,
            HttpVerb::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A command's verb and URL template, e.g. `POST /session/{sessionId}/element`.
///
/// Template segments of the form `{name}` are placeholders. `{sessionId}` is
/// filled from [`Command::session_id`]; every other placeholder is looked up
/// in [`Command::parameters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    verb: HttpVerb,
    url_template: &'static str,
}

impl CommandInfo {
    /// Describe a command with a static template (usable in `const` tables).
    pub const fn new(verb: HttpVerb, url_template: &'static str) -> Self {
        Self {
            verb,
            url_template,
        }
    }

    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    pub fn url_template(&self) -> &'static str {
        self.url_template
    }

    /// Resolve the template against `base` for one concrete command.
    ///
    /// Literal segments are appended as-is; placeholder values are
    /// percent-encoded as single path segments.
    pub fn build_url(&self, base: &Url, command: &Command) -> Result<Url, RemoteError> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| RemoteError::InvalidUrl {
                address: base.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            })?;
            segments.pop_if_empty();

            for segment in self.url_template.split('/').filter(|s| !s.is_empty()) {
                match placeholder_name(segment) {
                    Some(SESSION_ID_PLACEHOLDER) => {
                        let session_id = command
                            .session_id
                            .as_deref()
                            .ok_or_else(|| RemoteError::NoSession(command.name.clone()))?;
                        segments.push(session_id);
                    }
                    Some(name) => {
                        let value = command.placeholder_value(name).ok_or_else(|| {
                            RemoteError::MissingParameter {
                                command: command.name.clone(),
                                placeholder: name.to_string(),
                            }
                        })?;
                        segments.push(&value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }
        Ok(url)
    }
}

/// Return the name inside a `{name}` segment.
fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}

/// One invocation of a named command.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Session the command targets; `None` for session-less commands.
    pub session_id: Option<String>,
    /// Registry name of the command (e.g. `"findElement"`).
    pub name: String,
    /// JSON parameters. Also the source for URL placeholder values.
    pub parameters: Map<String, Value>,
}

impl Command {
    pub fn new(session_id: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            session_id: session_id.map(str::to_owned),
            name: name.into(),
            parameters: Map::new(),
        }
    }

    /// Add a parameter, builder style.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Value used to fill the `{name}` placeholder, if any.
    fn placeholder_value(&self, name: &str) -> Option<String> {
        match self.parameters.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://127.0.0.1:9999/").unwrap()
    }

    #[test]
    fn build_url_substitutes_session_and_parameters() {
        let info = CommandInfo::new(
            HttpVerb::Post,
            "/session/{sessionId}/element/{id}/datagrid/cell/{row}/{column}",
        );
        let command = Command::new(Some("abc"), "findDataGridCell")
            .with_parameter("id", "grid-1")
            .with_parameter("row", 2)
            .with_parameter("column", 7);
        let url = info.build_url(&base(), &command).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9999/session/abc/element/grid-1/datagrid/cell/2/7"
        );
    }

    #[test]
    fn build_url_keeps_base_path_prefix() {
        let info = CommandInfo::new(HttpVerb::Post, "/session");
        let base = Url::parse("http://remote:4444/wd/hub").unwrap();
        let url = info.build_url(&base, &Command::new(None, "newSession")).unwrap();
        assert_eq!(url.as_str(), "http://remote:4444/wd/hub/session");
    }

    #[test]
    fn build_url_encodes_placeholder_values() {
        let info = CommandInfo::new(
            HttpVerb::Post,
            "/session/{sessionId}/element/{id}/menu/item/{path}",
        );
        let command = Command::new(Some("s"), "findMenuItem")
            .with_parameter("id", "menu")
            .with_parameter("path", "File$Save As/Copy");
        let url = info.build_url(&base(), &command).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9999/session/s/element/menu/menu/item/File$Save%20As%2FCopy"
        );
    }

    #[test]
    fn build_url_reports_missing_placeholder() {
        let info = CommandInfo::new(HttpVerb::Post, "/session/{sessionId}/element/{id}/click");
        let command = Command::new(Some("s"), "clickElement");
        let err = info.build_url(&base(), &command).unwrap_err();
        match err {
            RemoteError::MissingParameter { command, placeholder } => {
                assert_eq!(command, "clickElement");
                assert_eq!(placeholder, "id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn build_url_without_session_fails_for_session_command() {
        let info = CommandInfo::new(HttpVerb::Delete, "/session/{sessionId}");
        let err = info
            .build_url(&base(), &Command::new(None, "quit"))
            .unwrap_err();
        assert!(matches!(err, RemoteError::NoSession(ref name) if name == "quit"));
    }

    #[test]
    fn verb_display_and_method() {
        assert_eq!(HttpVerb::Post.to_string(), "POST");
        assert_eq!(reqwest::Method::from(HttpVerb::Delete), reqwest::Method::DELETE);
    }
}
