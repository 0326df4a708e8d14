//! Draw records.
//!
//! A draw publishes two three-digit panels ("open3" and "close3") and the
//! two-digit double that is the classification target. Records are immutable
//! once built and are appended to the history in non-decreasing date order.

use crate::domain::errors::DrawError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A three-digit panel such as `"389"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Panel([u8; 3]);

impl Panel {
    pub fn digit_sum(&self) -> u32 {
        self.0.iter().map(|&d| u32::from(d)).sum()
    }

    /// Leading digit.
    pub fn tens(&self) -> u8 {
        self.0[0]
    }

    /// Trailing digit.
    pub fn units(&self) -> u8 {
        self.0[2]
    }
}

impl FromStr for Panel {
    type Err = DrawError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(DrawError::InvalidPanel {
                value: s.to_string(),
            });
        }
        Ok(Self([bytes[0] - b'0', bytes[1] - b'0', bytes[2] - b'0']))
    }
}

impl TryFrom<String> for Panel {
    type Error = DrawError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Panel> for String {
    fn from(panel: Panel) -> Self {
        panel.to_string()
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.0[0], self.0[1], self.0[2])
    }
}

/// The two-digit draw result, 00-99. Its integer value is the class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Double(u8);

impl Double {
    pub fn new(value: u8) -> Result<Self, DrawError> {
        if value > 99 {
            return Err(DrawError::DoubleOutOfRange { value });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn tens(&self) -> u8 {
        self.0 / 10
    }

    pub fn units(&self) -> u8 {
        self.0 % 10
    }
}

impl FromStr for Double {
    type Err = DrawError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(DrawError::InvalidDouble {
                value: s.to_string(),
            });
        }
        Ok(Self((bytes[0] - b'0') * 10 + (bytes[1] - b'0')))
    }
}

impl TryFrom<u8> for Double {
    type Error = DrawError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Double> for u8 {
    fn from(double: Double) -> Self {
        double.0
    }
}

impl fmt::Display for Double {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Where and when a draw was observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawProvenance {
    pub raw_source: String,
    pub source_url: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub date: NaiveDate,
    pub open3: Panel,
    pub close3: Panel,
    pub double: Double,
    pub provenance: DrawProvenance,
}

impl DrawRecord {
    pub fn new(
        date: NaiveDate,
        open3: Panel,
        close3: Panel,
        double: Double,
        provenance: DrawProvenance,
    ) -> Self {
        Self {
            date,
            open3,
            close3,
            double,
            provenance,
        }
    }

    /// Stable identifier, e.g. `2024-01-05-23`.
    pub fn draw_id(&self) -> String {
        format!("{}-{}", self.date, self.double.value())
    }

    pub fn tens(&self) -> u8 {
        self.double.tens()
    }

    pub fn units(&self) -> u8 {
        self.double.units()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_digits_for_every_label() {
        for d in 0..=99u8 {
            let double = Double::new(d).unwrap();
            assert_eq!(double.tens(), d / 10);
            assert_eq!(double.units(), d % 10);
            assert!(double.tens() <= 9 && double.units() <= 9);
        }
    }

    #[test]
    fn test_double_parse_and_display() {
        let double: Double = "07".parse().unwrap();
        assert_eq!(double.value(), 7);
        assert_eq!(double.to_string(), "07");
        assert!("7".parse::<Double>().is_err());
        assert!("1a".parse::<Double>().is_err());
        assert!(Double::new(100).is_err());
    }

    #[test]
    fn test_panel_parse() {
        let panel: Panel = "389".parse().unwrap();
        assert_eq!(panel.digit_sum(), 20);
        assert_eq!(panel.tens(), 3);
        assert_eq!(panel.units(), 9);
        assert_eq!(panel.to_string(), "389");
        assert!("38".parse::<Panel>().is_err());
        assert!("3890".parse::<Panel>().is_err());
        assert!("***".parse::<Panel>().is_err());
    }

    #[test]
    fn test_draw_id() {
        let record = DrawRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            "123".parse().unwrap(),
            "456".parse().unwrap(),
            "05".parse().unwrap(),
            DrawProvenance {
                raw_source: String::new(),
                source_url: String::new(),
                fetched_at: Utc::now(),
            },
        );
        assert_eq!(record.draw_id(), "2024-01-05-5");
    }
}
