//! Domain models for producers, milk collections, and quality issues.
//!
//! All models serialize with camelCase field names so the JSON written to
//! the store (and carried through backup files) stays byte-compatible with
//! data recorded by earlier versions of the app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A milk supplier tracked by the app.
///
/// Producers are never physically removed: "deleting" one only flips
/// `active` to false, keeping historical collections attributable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    /// Unique record id (timestamp + random suffix)
    pub id: String,
    /// Producer's name
    pub name: String,
    /// Street address, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Contact phone, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// State registration number, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_registration: Option<String>,
    /// Current agreed price per liter. Positivity is the form layer's
    /// responsibility; the repository stores what it is given.
    pub price_per_liter: f64,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Lifecycle flag: false means soft-deleted
    pub active: bool,
    /// When the record was first saved
    pub created_at: DateTime<Utc>,
    /// When the record was last changed
    pub updated_at: DateTime<Utc>,
}

/// Validated producer form fields, as supplied by the UI layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerFormData {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub state_registration: Option<String>,
    pub price_per_liter: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One recorded pickup of milk from a producer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilkCollection {
    /// Unique record id (timestamp + random suffix)
    pub id: String,
    /// Id of the producer this pickup belongs to. Not enforced by the
    /// store - a collection may outlive or predate its producer record.
    pub producer_id: String,
    /// When the milk was collected
    pub date: DateTime<Utc>,
    /// Collected volume in liters
    pub quantity: f64,
    /// Price per liter copied from the producer at save time
    pub price_per_liter: f64,
    /// `quantity * price_per_liter` as of save time. Never recomputed on
    /// read, so it goes stale if the producer's price changes later.
    pub total_price: f64,
    /// Quality/process issues observed, denormalized from the catalog
    pub issues: Vec<CollectionIssue>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the record was first saved
    pub created_at: DateTime<Utc>,
    /// When the record was last changed
    pub updated_at: DateTime<Utc>,
}

/// Validated collection form fields. `issues` carries catalog ids only;
/// the repository resolves them into full [`CollectionIssue`] objects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFormData {
    pub producer_id: String,
    pub date: DateTime<Utc>,
    pub quantity: f64,
    pub price_per_liter: f64,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A predefined quality/process problem attachable to a collection.
/// The catalog is closed - users cannot define their own issues.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionIssue {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

static ISSUE_CATALOG: LazyLock<Vec<CollectionIssue>> = LazyLock::new(|| {
    let issue = |id: &str, name: &str, description: &str| CollectionIssue {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
    };
    vec![
        issue("0", "Acidez", "O leite apresentou acidez acima do esperado"),
        issue(
            "1",
            "Qualidade baixa",
            "O leite apresentou qualidade abaixo do esperado",
        ),
        issue(
            "2",
            "Contaminação",
            "Foram encontrados contaminantes no leite",
        ),
        issue(
            "3",
            "Problemas no transporte",
            "Ocorreram problemas durante o transporte",
        ),
        issue("4", "Atraso na coleta", "A coleta foi realizada com atraso"),
        issue(
            "5",
            "Volume abaixo do esperado",
            "O volume coletado foi menor que o esperado",
        ),
    ]
});

/// The fixed catalog of collection issues, ids "0" through "5".
#[must_use]
pub fn issue_catalog() -> &'static [CollectionIssue] {
    &ISSUE_CATALOG
}

/// Resolves catalog ids into full issue objects, preserving catalog order.
/// Ids that do not exist in the catalog are silently dropped.
#[must_use]
pub fn resolve_issues(ids: &[String]) -> Vec<CollectionIssue> {
    issue_catalog()
        .iter()
        .filter(|issue| ids.contains(&issue.id))
        .cloned()
        .collect()
}

/// Identity of the app's user, printed in export headers.
/// Stored under the `user_data` key; all fields default to empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub cnpj: String,
    pub state_registration: String,
    pub address: String,
    pub phone: String,
}
