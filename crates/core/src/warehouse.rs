//! Warehouse tags and their storage encoding.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The warehouse a product or rack belongs to.
///
/// The backing store encodes this as the string `"1"` or `"2"`; mapping the
/// tag to a display name is presentation logic and lives with the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Warehouse {
    One,
    Two,
}

impl Warehouse {
    /// The storage encoding of this tag.
    pub fn as_tag(self) -> &'static str {
        match self {
            Warehouse::One => "1",
            Warehouse::Two => "2",
        }
    }

    /// Parse a storage tag.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim() {
            "1" => Ok(Warehouse::One),
            "2" => Ok(Warehouse::Two),
            other => Err(Error::InvalidWarehouse(other.to_string())),
        }
    }
}

impl fmt::Display for Warehouse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for Warehouse {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Warehouse::from_tag(s)
    }
}

impl TryFrom<String> for Warehouse {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Warehouse::from_tag(&value)
    }
}

impl From<Warehouse> for String {
    fn from(value: Warehouse) -> Self {
        value.as_tag().to_string()
    }
}
