//! Types shared between the decoders, the compiler and the wire format.

use crate::codec::{fr_from_decimal, fr_to_decimal};
use crate::error::{CircuitInputError, Result};
use ark_bn254::Fr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Aadhaar gender code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "T")]
    Transgender,
}

impl Gender {
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            "T" => Ok(Gender::Transgender),
            other => Err(CircuitInputError::validation(format!(
                "gender must be one of M, F, T, got '{other}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Transgender => "T",
        }
    }

    /// ASCII code the circuit compares against (77, 70, 84).
    pub fn char_code(&self) -> u8 {
        self.as_str().as_bytes()[0]
    }
}

/// Passport MRZ sex marker. Anything other than M or F reads as X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "X")]
    Unspecified,
}

impl Sex {
    pub fn from_mrz(marker: &str) -> Self {
        match marker {
            "M" => Sex::Male,
            "F" => Sex::Female,
            _ => Sex::Unspecified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unspecified => "X",
        }
    }
}

/// JSON-friendly representation of a field element.
///
/// Circuit tooling exchanges Fr values as base-10 strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDecimal(pub Fr);

impl FieldDecimal {
    pub fn to_fr(&self) -> Fr {
        self.0
    }
}

impl From<Fr> for FieldDecimal {
    fn from(value: Fr) -> Self {
        FieldDecimal(value)
    }
}

impl fmt::Display for FieldDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&fr_to_decimal(&self.0))
    }
}

impl Serialize for FieldDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&fr_to_decimal(&self.0))
    }
}

impl<'de> Deserialize<'de> for FieldDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        fr_from_decimal(&raw)
            .map(FieldDecimal)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::from_code("M").unwrap().char_code(), 77);
        assert_eq!(Gender::from_code("F").unwrap().char_code(), 70);
        assert_eq!(Gender::from_code("T").unwrap().char_code(), 84);
        assert!(Gender::from_code("X").is_err());
        assert!(Gender::from_code("").is_err());
    }

    #[test]
    fn test_sex_defaults_to_unspecified() {
        assert_eq!(Sex::from_mrz("M"), Sex::Male);
        assert_eq!(Sex::from_mrz("F"), Sex::Female);
        assert_eq!(Sex::from_mrz("<"), Sex::Unspecified);
        assert_eq!(Sex::from_mrz("Q").as_str(), "X");
    }

    #[test]
    fn test_field_decimal_json() {
        let value = FieldDecimal(Fr::from(12_345u64));
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"12345\"");

        let back: FieldDecimal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);

        assert!(serde_json::from_str::<FieldDecimal>("\"-1\"").is_err());
    }
}
