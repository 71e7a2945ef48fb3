//! Domain identifier types with validation
//!
//! Newtype wrappers for the natural identifiers issued by the source system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hospital admission number issued by the source system
///
/// # Examples
///
/// ```
/// use ward_sync::domain::ids::AdmissionNumber;
/// use std::str::FromStr;
///
/// let number = AdmissionNumber::from_str("A100").unwrap();
/// assert_eq!(number.as_str(), "A100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdmissionNumber(String);

impl AdmissionNumber {
    /// Creates a new admission number, rejecting blank values
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Admission number cannot be empty".to_string());
        }
        Ok(Self(id.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AdmissionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AdmissionNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Bed identifier (the source system's bed code)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BedId(String);

impl BedId {
    /// Creates a new bed id, rejecting blank values
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Bed id cannot be empty".to_string());
        }
        Ok(Self(id.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BedId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
