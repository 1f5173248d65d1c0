//! Domain records mapping to the wire tables.

use crate::error::{RecordError, RecordResult};
use crate::tables::{cell, TableRecord, TableSpec, ACTIVITY_LOGS, CAMPAIGNS, INVENTORY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stockroom_core::{Actor, Warehouse};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

// =============================================================================
// Products
// =============================================================================

/// Inventory product record. Keyed by `reference`, unique within the active
/// table; a trashed copy may coexist under the same reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub reference: String,
    pub image_url: String,
    pub height: String,
    pub width: String,
    pub brand: String,
    /// Campaign display name, not a store-enforced foreign key.
    pub campaign: String,
    pub date: String,
    pub stock: u32,
    pub location: String,
    pub typology: String,
    pub notes: String,
    pub warehouse: Warehouse,
}

impl TableRecord for Product {
    fn spec() -> &'static TableSpec {
        &INVENTORY
    }

    fn key(&self) -> &str {
        &self.reference
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.reference.clone(),
            self.image_url.clone(),
            self.height.clone(),
            self.width.clone(),
            self.brand.clone(),
            self.campaign.clone(),
            self.date.clone(),
            self.stock.to_string(),
            self.location.clone(),
            self.typology.clone(),
            self.notes.clone(),
            self.warehouse.as_tag().to_string(),
        ]
    }

    fn from_row(row: &[String]) -> RecordResult<Self> {
        let reference = cell(row, 0).trim().to_string();
        if reference.is_empty() {
            return Err(RecordError::Validation(
                "product row has an empty reference".to_string(),
            ));
        }

        let stock_cell = cell(row, 7).trim();
        let stock = if stock_cell.is_empty() {
            0
        } else {
            stock_cell.parse().map_err(|_| {
                RecordError::Validation(format!(
                    "product {reference} has a non-numeric stock: {stock_cell}"
                ))
            })?
        };

        let warehouse = Warehouse::from_tag(cell(row, 11))
            .map_err(|e| RecordError::Validation(format!("product {reference}: {e}")))?;

        Ok(Self {
            reference,
            image_url: cell(row, 1).to_string(),
            height: cell(row, 2).to_string(),
            width: cell(row, 3).to_string(),
            brand: cell(row, 4).to_string(),
            campaign: cell(row, 5).to_string(),
            date: cell(row, 6).to_string(),
            stock,
            location: cell(row, 8).to_string(),
            typology: cell(row, 9).to_string(),
            notes: cell(row, 10).to_string(),
            warehouse,
        })
    }
}

// =============================================================================
// Campaigns
// =============================================================================

/// Marketing campaign lifecycle state. Stored verbatim in Portuguese; the
/// values are part of the wire contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CampaignStatus {
    Ativo,
    Inativo,
    Planejado,
    Encerrado,
}

impl CampaignStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignStatus::Ativo => "Ativo",
            CampaignStatus::Inativo => "Inativo",
            CampaignStatus::Planejado => "Planejado",
            CampaignStatus::Encerrado => "Encerrado",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = RecordError;

    fn from_str(s: &str) -> RecordResult<Self> {
        match s.trim() {
            "Ativo" => Ok(CampaignStatus::Ativo),
            "Inativo" => Ok(CampaignStatus::Inativo),
            "Planejado" => Ok(CampaignStatus::Planejado),
            "Encerrado" => Ok(CampaignStatus::Encerrado),
            other => Err(RecordError::Validation(format!(
                "unknown campaign status: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for CampaignStatus {
    type Error = RecordError;

    fn try_from(value: String) -> RecordResult<Self> {
        value.parse()
    }
}

impl From<CampaignStatus> for String {
    fn from(value: CampaignStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Marketing campaign record, keyed by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub brand_id: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub status: CampaignStatus,
}

impl TableRecord for Campaign {
    fn spec() -> &'static TableSpec {
        &CAMPAIGNS
    }

    fn key(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.brand_id.clone(),
            self.start_date.clone(),
            self.end_date.clone(),
            self.description.clone(),
            self.status.as_str().to_string(),
        ]
    }

    fn from_row(row: &[String]) -> RecordResult<Self> {
        let id = cell(row, 0).trim().to_string();
        if id.is_empty() {
            return Err(RecordError::Validation(
                "campaign row has an empty id".to_string(),
            ));
        }

        Ok(Self {
            id,
            name: cell(row, 1).to_string(),
            brand_id: cell(row, 2).to_string(),
            start_date: cell(row, 3).to_string(),
            end_date: cell(row, 4).to_string(),
            description: cell(row, 5).to_string(),
            status: cell(row, 6).parse()?,
        })
    }
}

// =============================================================================
// Racks
// =============================================================================

/// Rack lookup entry. The same rack id may exist once per warehouse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackEntry {
    pub id: String,
    pub warehouse: Warehouse,
}

impl RackEntry {
    pub(crate) fn to_row(&self) -> Vec<String> {
        vec![self.id.clone(), self.warehouse.as_tag().to_string()]
    }

    pub(crate) fn from_row(row: &[String]) -> RecordResult<Self> {
        let id = cell(row, 0).trim().to_string();
        if id.is_empty() {
            return Err(RecordError::Validation(
                "rack row has an empty id".to_string(),
            ));
        }
        let warehouse = Warehouse::from_tag(cell(row, 1))
            .map_err(|e| RecordError::Validation(format!("rack {id}: {e}")))?;
        Ok(Self { id, warehouse })
    }
}

// =============================================================================
// Activity log
// =============================================================================

/// Kind of audited mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Added,
    Edited,
    Deleted,
}

impl ActivityAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::Added => "added",
            ActivityAction::Edited => "edited",
            ActivityAction::Deleted => "deleted",
        }
    }
}

impl FromStr for ActivityAction {
    type Err = RecordError;

    fn from_str(s: &str) -> RecordResult<Self> {
        match s.trim() {
            "added" => Ok(ActivityAction::Added),
            "edited" => Ok(ActivityAction::Edited),
            "deleted" => Ok(ActivityAction::Deleted),
            other => Err(RecordError::Validation(format!(
                "unknown activity action: {other}"
            ))),
        }
    }
}

/// Kind of entity an audit entry refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Brand,
    Typology,
    Rack,
    Campaign,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Brand => "brand",
            EntityKind::Typology => "typology",
            EntityKind::Rack => "rack",
            EntityKind::Campaign => "campaign",
        }
    }
}

impl FromStr for EntityKind {
    type Err = RecordError;

    fn from_str(s: &str) -> RecordResult<Self> {
        match s.trim() {
            "product" => Ok(EntityKind::Product),
            "brand" => Ok(EntityKind::Brand),
            "typology" => Ok(EntityKind::Typology),
            "rack" => Ok(EntityKind::Rack),
            "campaign" => Ok(EntityKind::Campaign),
            other => Err(RecordError::Validation(format!(
                "unknown entity kind: {other}"
            ))),
        }
    }
}

/// Before/after snapshot attached to an audit entry. Either side may be
/// absent (no before on create, no after on delete).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
}

impl ChangeSet {
    pub fn added(after: serde_json::Value) -> Self {
        Self {
            before: None,
            after: Some(after),
        }
    }

    pub fn edited(before: serde_json::Value, after: serde_json::Value) -> Self {
        Self {
            before: Some(before),
            after: Some(after),
        }
    }

    pub fn deleted(before: serde_json::Value) -> Self {
        Self {
            before: Some(before),
            after: None,
        }
    }
}

/// One audit trail entry. Append-only; never mutated or deleted by normal
/// operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Time-derived id (unix milliseconds at creation). Monotonic-ish; plays
    /// no role in the log contract.
    pub id: String,
    pub timestamp: OffsetDateTime,
    pub action: ActivityAction,
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub changes: ChangeSet,
    pub actor: Actor,
}

impl TableRecord for ActivityLogEntry {
    fn spec() -> &'static TableSpec {
        &ACTIVITY_LOGS
    }

    fn key(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> Vec<String> {
        // String-keyed JSON values always serialize; empty cell on the
        // unreachable path.
        let changes = serde_json::to_string(&self.changes).unwrap_or_default();
        let timestamp = self.timestamp.format(&Rfc3339).unwrap_or_default();
        vec![
            self.id.clone(),
            timestamp,
            self.action.as_str().to_string(),
            self.entity_type.as_str().to_string(),
            self.entity_id.clone(),
            changes,
            self.actor.id.clone(),
            self.actor.name.clone(),
            self.actor.email.clone(),
            self.actor.role.clone(),
        ]
    }

    fn from_row(row: &[String]) -> RecordResult<Self> {
        let id = cell(row, 0).trim().to_string();
        if id.is_empty() {
            return Err(RecordError::Validation(
                "log row has an empty id".to_string(),
            ));
        }

        let raw_timestamp = cell(row, 1);
        let timestamp = OffsetDateTime::parse(raw_timestamp, &Rfc3339).map_err(|_| {
            RecordError::Validation(format!("log {id} has a bad timestamp: {raw_timestamp}"))
        })?;

        let raw_changes = cell(row, 5).trim();
        let changes = if raw_changes.is_empty() {
            ChangeSet::default()
        } else {
            serde_json::from_str(raw_changes).map_err(|e| {
                RecordError::Validation(format!("log {id} has a bad changes cell: {e}"))
            })?
        };

        Ok(Self {
            id,
            timestamp,
            action: cell(row, 2).parse()?,
            entity_type: cell(row, 3).parse()?,
            entity_id: cell(row, 4).to_string(),
            changes,
            actor: Actor {
                id: cell(row, 6).to_string(),
                name: cell(row, 7).to_string(),
                email: cell(row, 8).to_string(),
                role: cell(row, 9).to_string(),
            },
        })
    }
}
