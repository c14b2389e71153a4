//! Contract with the natural-language extraction service.
//!
//! The service is given a fixed prompt and answers with schema JSON, often
//! wrapped in a markdown code fence. The HTTP exchange itself happens outside
//! this crate; only the request body, prompt and reply decoding live here.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::schema::Schema;

/// Request body posted to the extraction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub user_text: String,
}

impl ExtractionRequest {
    pub fn new(user_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

const RULES: &str = r#"You are an expert in database ER diagrams following Chen notation. Extract all entities, attributes, relationships, and cardinalities from the user's text.

Rules:
1. Primary keys: prefix the primary key attribute of each entity with "PK_".
2. Multi-valued attributes: prefix with "MV_".
3. Derived attributes: prefix with "DA_".
4. Composite attributes: keep the main attribute and list its parts in a "components" array, e.g. {"entity": "Employee", "attribute": "address", "components": ["street", "city", "zip"]}.
5. Weak entities: set "isWeak": true; their identifying relationship sets "isIdentifying": true.
6. Relationship attributes: list them in the relationship's "attributes" array.
7. Cardinalities: use 1:1, 1:N or M:N.
8. Do not repeat an attribute for the same entity.

Reply ONLY with valid JSON in exactly this structure, without comments or markdown:
{
  "entities": [{"name": "EntityName", "isWeak": false}],
  "attributes": [
    {"entity": "EntityName", "attribute": "PK_attributeName"},
    {"entity": "EntityName", "attribute": "regularAttribute"},
    {"entity": "EntityName", "attribute": "compositeAttr", "components": ["part1", "part2"]}
  ],
  "relationships": [
    {"from": "Entity1", "to": "Entity2", "label": "relationshipName", "isIdentifying": false, "attributes": ["attributeName"]}
  ],
  "cardinalities": [{"from": "Entity1", "to": "Entity2", "type": "1:N"}]
}
"#;

/// Full prompt for a user description.
pub fn build_prompt(user_text: &str) -> String {
    format!("{RULES}\nText for extraction:\n{user_text}\n")
}

/// Decode the service's text reply into a schema.
///
/// A leading ```` ```json ```` (or bare ```` ``` ````) fence and a trailing
/// fence are stripped before parsing.
pub fn parse_reply(raw: &str) -> Result<Schema, SchemaError> {
    let text = strip_fence(raw);
    if text.is_empty() {
        return Err(SchemaError::EmptyReply);
    }
    Schema::from_json(text)
}

fn strip_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_user_text_and_contract() {
        let prompt = build_prompt("Students enroll in courses.");
        assert!(prompt.ends_with("Text for extraction:\nStudents enroll in courses.\n"));
        assert!(prompt.contains(r#""PK_""#));
        assert!(prompt.contains(r#""cardinalities""#));
    }

    #[test]
    fn test_request_body() {
        let body = ExtractionRequest::new("x").to_json().unwrap();
        assert_eq!(body, r#"{"userText":"x"}"#);
    }

    #[test]
    fn test_parse_fenced_reply() {
        let raw = "```json\n{\"entities\": [{\"name\": \"A\"}], \"attributes\": []}\n```";
        let schema = parse_reply(raw).unwrap();
        assert_eq!(schema.entities[0].name, "A");
    }

    #[test]
    fn test_parse_plain_reply() {
        let schema = parse_reply(r#"{"entities": [], "attributes": []}"#).unwrap();
        assert!(schema.entities.is_empty());
    }

    #[test]
    fn test_empty_reply() {
        assert!(matches!(parse_reply("```json\n```"), Err(SchemaError::EmptyReply)));
        assert!(matches!(parse_reply("   "), Err(SchemaError::EmptyReply)));
    }

    #[test]
    fn test_reply_with_invalid_entities() {
        let err = parse_reply(r#"{"entities": "none", "attributes": []}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid entities format: expected an array");
    }
}
