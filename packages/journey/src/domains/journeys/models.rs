//! Data carried between pipeline stages.
//!
//! The extractor's output is typed for the two fields the creator reads
//! (`title`, `image`); everything else rides along untouched in `extra` and is
//! handed verbatim to the initializer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Structured record returned by the extractor for an external URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecord {
    pub title: String,
    /// Image reference. Scrapers report it as `src`.
    #[serde(alias = "src")]
    pub image: String,
    /// Pass-through fields consumed only by the initializer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExternalRecord {
    pub fn new(title: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            image: image.into(),
            extra: Map::new(),
        }
    }

    /// Attach a pass-through field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Wallet/account that will own the created journey.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerIdentity(String);

impl OwnerIdentity {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload sent to the journey creator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJourneyRequest {
    pub name: String,
    pub desc: String,
    pub image: String,
    pub wallet_address: String,
}

impl CreateJourneyRequest {
    /// Map an extracted record onto a creation request.
    ///
    /// title → name, image → image, owner → walletAddress; the description is
    /// the caller's fixed label.
    pub fn from_record(record: &ExternalRecord, desc: &str, owner: &OwnerIdentity) -> Self {
        Self {
            name: record.title.clone(),
            desc: desc.to_string(),
            image: record.image.clone(),
            wallet_address: owner.as_str().to_string(),
        }
    }
}

/// Persisted journey as returned by the creator. The id is always assigned
/// by the creator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyEntity {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JourneyEntity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_unknown_fields() {
        let record: ExternalRecord = serde_json::from_value(json!({
            "title": "Grant 42",
            "src": "img.png",
            "round": "GG20",
            "tags": ["climate"]
        }))
        .unwrap();

        assert_eq!(record.title, "Grant 42");
        assert_eq!(record.image, "img.png");
        assert_eq!(record.extra["round"], json!("GG20"));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["tags"], json!(["climate"]));
        assert_eq!(back["image"], json!("img.png"));
    }

    #[test]
    fn test_record_without_title_is_rejected() {
        let result: Result<ExternalRecord, _> =
            serde_json::from_value(json!({ "image": "img.png" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_request_mapping() {
        let record = ExternalRecord::new("Grant 42", "img.png").with_field("round", "GG20");
        let owner = OwnerIdentity::new("0xabc");

        let req = CreateJourneyRequest::from_record(&record, "Gitcoin Project", &owner);

        assert_eq!(req.name, "Grant 42");
        assert_eq!(req.desc, "Gitcoin Project");
        assert_eq!(req.image, "img.png");
        assert_eq!(req.wallet_address, "0xabc");

        let wire = serde_json::to_value(&req).unwrap();
        assert_eq!(wire["walletAddress"], json!("0xabc"));
    }

    #[test]
    fn test_entity_accepts_either_id_spelling() {
        let a: JourneyEntity = serde_json::from_value(json!({ "_id": "j1" })).unwrap();
        let b: JourneyEntity = serde_json::from_value(json!({ "id": "j2", "name": "x" })).unwrap();

        assert_eq!(a.id, "j1");
        assert_eq!(b.id, "j2");
        assert_eq!(b.extra["name"], json!("x"));
    }
}
