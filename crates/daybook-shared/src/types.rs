use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::DATE_FORMAT;
use crate::error::ValidationError;

// Opaque owner identifier issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyOwner);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OwnerId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A calendar day in the user's local time zone.
///
/// The canonical text form is `YYYY-MM-DD`. Parsing is strict: single-digit
/// months or days, signed or space-padded fields, trailing text and
/// impossible dates are all rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayDate(NaiveDate);

impl DayDate {
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today according to the local clock.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let malformed = || ValidationError::MalformedDate(s.to_string());

        let bytes = s.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(malformed());
        }
        // chrono tolerates signs and padding inside numeric fields
        let digits_ok = bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !digits_ok {
            return Err(malformed());
        }
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| malformed())
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn pred(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl fmt::Display for DayDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for DayDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DayDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_rejects_blank() {
        assert_eq!(OwnerId::new("  "), Err(ValidationError::EmptyOwner));
        assert_eq!(OwnerId::new("user_2abc").unwrap().as_str(), "user_2abc");
    }

    #[test]
    fn date_canonical_form() {
        let date = DayDate::parse("2025-03-07").unwrap();
        assert_eq!(date.to_string(), "2025-03-07");
        assert_eq!(date.year(), 2025);
    }

    #[test]
    fn date_rejects_malformed() {
        for bad in ["2025-3-7", "2025/03/07", "2025-02-30", "20250307", "2025-03-07x", ""] {
            assert!(DayDate::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn date_rejects_signed_or_padded_fields() {
        for bad in [
            "+025-03-07",
            " 025-03-07",
            "-025-03-07",
            "2025-03- 7",
            "2025- 3-07",
            "2025-+3-07",
            "2025-03-+7",
        ] {
            assert_eq!(
                DayDate::parse(bad),
                Err(ValidationError::MalformedDate(bad.to_string())),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn date_serde_as_string() {
        let date = DayDate::parse("2024-12-31").unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2024-12-31\"");
        let back: DayDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
        assert!(serde_json::from_str::<DayDate>("\"31-12-2024\"").is_err());
    }

    #[test]
    fn date_neighbours() {
        let date = DayDate::parse("2025-03-01").unwrap();
        assert_eq!(date.pred().unwrap().to_string(), "2025-02-28");
        assert_eq!(date.succ().unwrap().to_string(), "2025-03-02");
    }
}
