use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Author of a piece of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to Gemini API to generate content
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Total number of text characters carried by the request
    pub fn text_len(&self) -> usize {
        self.contents
            .iter()
            .flat_map(|content| content.parts.iter())
            .map(|part| part.text.len())
            .sum()
    }
}

/// Content structure for requests
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Part structure for a piece of request content
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Part {
    pub text: String,
}

/// Response from Gemini API.
///
/// Nothing in here is trusted: every level may be missing or `null`, so
/// every field is optional and unknown fields (safety ratings, usage
/// metadata, function calls) are ignored.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct GenerateContentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Option<Candidate>>>,
}

impl GenerateContentResponse {
    /// A well-formed single-candidate response carrying `text`
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: Some(vec![Some(Candidate {
                content: Some(ContentResponsePart {
                    parts: Some(vec![Some(PartResponse {
                        text: Some(text.into()),
                    })]),
                    role: Some(Role::Model.as_str().to_string()),
                }),
            })]),
        }
    }
}

/// Candidate in the response
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct Candidate {
    /// `None` when the content is missing, `null`, or `{}`
    #[serde(
        default,
        deserialize_with = "non_empty_object",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<ContentResponsePart>,
}

/// Content part in the response
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct ContentResponsePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Option<PartResponse>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Part response from the API
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct PartResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// An object with no keys at all carries nothing; any key, even an unknown
// one or a `null` value, makes the object present.
fn non_empty_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Map<String, Value>>::deserialize(deserializer)? {
        Some(object) if !object.is_empty() => serde_json::from_value(Value::Object(object))
            .map(Some)
            .map_err(de::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_roles_in_lowercase() {
        let request = GenerateContentRequest {
            contents: vec![
                Content::text(Role::User, "directive"),
                Content::text(Role::Model, "print(1)"),
            ],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "directive"}]},
                    {"role": "model", "parts": [{"text": "print(1)"}]}
                ]
            })
        );
        assert_eq!(request.text_len(), "directive".len() + "print(1)".len());
    }

    #[test]
    fn test_response_tolerates_missing_and_extra_fields() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model"},
                "finishReason": "STOP",
                "safetyRatings": []
            }],
            "usageMetadata": {"totalTokenCount": 12}
        });

        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let candidates = response.candidates.unwrap();
        let content = candidates[0].as_ref().unwrap().content.as_ref().unwrap();
        assert!(content.parts.is_none());
        assert_eq!(content.role.as_deref(), Some("model"));
    }

    #[test]
    fn test_content_presence() {
        let content_of = |body: Value| {
            let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
            response.candidates.unwrap().remove(0).unwrap().content
        };

        assert_eq!(content_of(json!({"candidates": [{"content": {}}]})), None);
        assert_eq!(content_of(json!({"candidates": [{"content": null}]})), None);
        assert_eq!(
            content_of(json!({"candidates": [{"content": {"parts": null}}]})),
            Some(ContentResponsePart::default())
        );
        assert_eq!(
            content_of(json!({"candidates": [{"content": {"foo": 1}}]})),
            Some(ContentResponsePart::default())
        );
    }

    #[test]
    fn test_null_entries_decode() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [null, {"content": {"parts": [null, {"text": "x = 1"}]}}]
        }))
        .unwrap();

        let candidates = response.candidates.unwrap();
        assert!(candidates[0].is_none());
        let parts = candidates[1].as_ref().unwrap().content.as_ref().unwrap().parts.as_ref().unwrap();
        assert!(parts[0].is_none());
        assert_eq!(parts[1].as_ref().unwrap().text.as_deref(), Some("x = 1"));
    }

    #[test]
    fn test_response_with_null_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": null})).unwrap();
        assert!(response.candidates.is_none());

        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response, GenerateContentResponse::default());
    }
}
