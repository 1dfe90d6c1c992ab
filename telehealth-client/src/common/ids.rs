//! Validated identifiers for PubMed (PMID) and PubMed Central (PMC ID) records

use crate::error::{Result, TelehealthError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated PubMed ID (PMID)
///
/// # Examples
///
/// ```
/// use telehealth_client::common::PubMedId;
///
/// let pmid = PubMedId::parse("  31978945  ").unwrap();
/// assert_eq!(pmid.as_u32(), 31978945);
/// assert_eq!(pmid.to_string(), "31978945");
///
/// assert!(PubMedId::parse("").is_err());
/// assert!(PubMedId::parse("abc").is_err());
/// assert!(PubMedId::parse("0").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PubMedId {
    value: u32,
}

impl PubMedId {
    /// Parse a PMID from a string; surrounding whitespace is ignored
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || TelehealthError::InvalidPmid {
            pmid: s.to_string(),
        };

        let value = s.trim().parse::<u32>().map_err(|_| invalid())?;
        if value == 0 {
            return Err(invalid());
        }

        Ok(Self { value })
    }

    pub fn as_u32(&self) -> u32 {
        self.value
    }
}

impl fmt::Display for PubMedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for PubMedId {
    type Err = TelehealthError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A validated PubMed Central ID, always rendered with the `PMC` prefix
///
/// # Examples
///
/// ```
/// use telehealth_client::common::PmcId;
///
/// let pmcid = PmcId::parse("PMC7906746").unwrap();
/// assert_eq!(pmcid.to_string(), "PMC7906746");
/// assert_eq!(PmcId::parse("7906746").unwrap(), pmcid);
/// assert_eq!(PmcId::parse("pmc7906746").unwrap().numeric_part(), 7906746);
/// assert!(PmcId::parse("PMC").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PmcId {
    value: u32,
}

impl PmcId {
    /// Parse a PMC ID with or without the (case-insensitive) `PMC` prefix
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || TelehealthError::InvalidPmcid {
            pmcid: s.to_string(),
        };

        let trimmed = s.trim();
        let digits = match trimmed.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("pmc") => &trimmed[3..],
            _ => trimmed,
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let value = digits.parse::<u32>().map_err(|_| invalid())?;
        if value == 0 {
            return Err(invalid());
        }

        Ok(Self { value })
    }

    pub fn numeric_part(&self) -> u32 {
        self.value
    }
}

impl fmt::Display for PmcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PMC{}", self.value)
    }
}

impl FromStr for PmcId {
    type Err = TelehealthError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
