//! Logical table specifications and the row codec trait.
//!
//! Column orders here are the wire contract with the backing spreadsheet;
//! changing them breaks every deployed document.

use crate::error::RecordResult;

/// Description of a logical table in the backing store.
#[derive(Clone, Copy, Debug)]
pub struct TableSpec {
    /// Tab name in the backing document.
    pub name: &'static str,
    /// Fixed column order.
    pub header: &'static [&'static str],
    /// Paired trash table sharing the same column layout, when the table
    /// supports soft delete.
    pub trash: Option<&'static str>,
    /// Whether the key column must be unique within the active table.
    pub unique_key: bool,
}

/// Primary inventory table.
pub const INVENTORY: TableSpec = TableSpec {
    name: "Inventory",
    header: &[
        "ref", "image", "height", "width", "brand", "campaign", "date", "stock", "location",
        "typology", "notes", "warehouse",
    ],
    trash: Some("InventoryTrash"),
    unique_key: true,
};

/// Brand lookup list.
pub const BRANDS: TableSpec = TableSpec {
    name: "Brands",
    header: &["name"],
    trash: None,
    unique_key: true,
};

/// Typology lookup list.
pub const TYPOLOGIES: TableSpec = TableSpec {
    name: "Typologies",
    header: &["name"],
    trash: None,
    unique_key: true,
};

/// Rack lookup list; uniqueness is scoped per warehouse, not global.
pub const RACKS: TableSpec = TableSpec {
    name: "Racks",
    header: &["id", "warehouse"],
    trash: None,
    unique_key: false,
};

/// Marketing campaign table.
pub const CAMPAIGNS: TableSpec = TableSpec {
    name: "Campaigns",
    header: &[
        "id",
        "name",
        "brandId",
        "startDate",
        "endDate",
        "description",
        "status",
    ],
    trash: None,
    unique_key: true,
};

/// Append-only audit trail.
pub const ACTIVITY_LOGS: TableSpec = TableSpec {
    name: "ActivityLogs",
    header: &[
        "id",
        "timestamp",
        "actionType",
        "entityType",
        "entityId",
        "changesJSON",
        "userId",
        "userName",
        "userEmail",
        "userRole",
    ],
    trash: None,
    unique_key: false,
};

/// A record stored as one row of a keyed table.
///
/// Identity is carried by the designated key column, never by row position;
/// a row index is an ephemeral address that repositories re-resolve before
/// every index-based mutation.
pub trait TableRecord: Clone + Send + Sync + 'static {
    /// The table this record type lives in.
    fn spec() -> &'static TableSpec;

    /// The unique business key.
    fn key(&self) -> &str;

    /// Encode as a full row in wire column order.
    fn to_row(&self) -> Vec<String>;

    /// Decode from a row. Rows may be shorter than the header when trailing
    /// cells are empty; implementations read missing cells as empty strings.
    fn from_row(row: &[String]) -> RecordResult<Self>;
}

/// Read a cell, treating missing trailing cells as empty.
pub(crate) fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
