//! Feature schema.
//!
//! The ordered list of feature slots is a contract shared by training and
//! inference. Any change to the order or the set of names is a breaking change
//! for every persisted model.

use crate::domain::errors::FeatureError;
use serde::Serialize;
use std::collections::HashMap;

macro_rules! feature_schema {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Closed set of feature slots, in schema order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(usize)]
        pub enum FeatureId {
            $($variant),+
        }

        /// Ordered list of feature names.
        pub const FEATURE_NAMES: &[&str] = &[$($name),+];

        impl FeatureId {
            pub const ALL: &'static [FeatureId] = &[$(FeatureId::$variant),+];

            pub fn name(self) -> &'static str {
                FEATURE_NAMES[self as usize]
            }
        }
    };
}

feature_schema! {
    OpenSum => "open_sum",
    CloseSum => "close_sum",
    DigitRootOpen => "digit_root_open",
    DigitRootClose => "digit_root_close",
    OpenTens => "open_tens",
    OpenUnits => "open_units",
    CloseTens => "close_tens",
    CloseUnits => "close_units",
    DoubleTens => "double_tens",
    DoubleUnits => "double_units",
    DayOfWeek => "day_of_week",
    IsWeekend => "is_weekend",
    WeekOfMonth => "week_of_month",
    RecencyIndex => "recency_index",
    SumProduct => "sum_product",
    DoubleSum => "double_sum",
    OpenSumMa7 => "open_sum_ma7",
    OpenSumMa14 => "open_sum_ma14",
    OpenSumMa30 => "open_sum_ma30",
    CloseSumMa7 => "close_sum_ma7",
    CloseSumMa14 => "close_sum_ma14",
    CloseSumMa30 => "close_sum_ma30",
    DoubleTensMa7 => "double_tens_ma7",
    DoubleTensMa14 => "double_tens_ma14",
    DoubleTensMa30 => "double_tens_ma30",
    DoubleUnitsMa7 => "double_units_ma7",
    DoubleUnitsMa14 => "double_units_ma14",
    DoubleUnitsMa30 => "double_units_ma30",
    TensFreq0 => "tens_freq_0",
    TensFreq1 => "tens_freq_1",
    TensFreq2 => "tens_freq_2",
    TensFreq3 => "tens_freq_3",
    TensFreq4 => "tens_freq_4",
    TensFreq5 => "tens_freq_5",
    TensFreq6 => "tens_freq_6",
    TensFreq7 => "tens_freq_7",
    TensFreq8 => "tens_freq_8",
    TensFreq9 => "tens_freq_9",
    UnitsFreq0 => "units_freq_0",
    UnitsFreq1 => "units_freq_1",
    UnitsFreq2 => "units_freq_2",
    UnitsFreq3 => "units_freq_3",
    UnitsFreq4 => "units_freq_4",
    UnitsFreq5 => "units_freq_5",
    UnitsFreq6 => "units_freq_6",
    UnitsFreq7 => "units_freq_7",
    UnitsFreq8 => "units_freq_8",
    UnitsFreq9 => "units_freq_9",
    MonthSin => "month_sin",
    MonthCos => "month_cos",
    DaySin => "day_sin",
    DayCos => "day_cos",
    AvgTransitionToCurrent => "avg_transition_to_current",
    TransitionEntropy => "transition_entropy",
    IsSwap => "is_swap",
    TensDiff => "tens_diff",
    UnitsDiff => "units_diff",
    SumDiff => "sum_diff",
    DoubleStreak => "double_streak",
    TensStreak => "tens_streak",
    UnitsStreak => "units_streak",
}

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

impl FeatureId {
    pub fn from_name(name: &str) -> Option<Self> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|idx| Self::ALL[idx])
    }

    /// Tens-digit histogram slot for `digit` (0-9).
    pub fn tens_freq(digit: u8) -> Self {
        Self::ALL[FeatureId::TensFreq0 as usize + usize::from(digit.min(9))]
    }

    /// Units-digit histogram slot for `digit` (0-9).
    pub fn units_freq(digit: u8) -> Self {
        Self::ALL[FeatureId::UnitsFreq0 as usize + usize::from(digit.min(9))]
    }
}

/// Returns true when `names` is exactly the compiled schema, in order.
pub fn schema_matches(names: &[String]) -> bool {
    names.len() == FEATURE_COUNT && names.iter().zip(FEATURE_NAMES).all(|(a, b)| a == b)
}

pub fn schema_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|n| n.to_string()).collect()
}

/// Dense feature vector indexed by [`FeatureId`]. Unset slots are 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            values: [0.0; FEATURE_COUNT],
        }
    }
}

impl FeatureVector {
    pub fn get(&self, id: FeatureId) -> f64 {
        self.values[id as usize]
    }

    pub fn set(&mut self, id: FeatureId, value: f64) {
        self.values[id as usize] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, f64)> + '_ {
        FeatureId::ALL.iter().map(|&id| (id, self.get(id)))
    }

    /// Builds a vector from an untrusted name→value mapping.
    ///
    /// Absent names default to 0.0. Names outside the schema and non-finite
    /// values are rejected.
    pub fn from_named(named: &HashMap<String, f64>) -> Result<Self, FeatureError> {
        let mut unknown: Vec<&String> = named
            .keys()
            .filter(|name| FeatureId::from_name(name).is_none())
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(FeatureError::UnknownFeature {
                name: unknown
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let mut fv = Self::default();
        for (name, &value) in named {
            if !value.is_finite() {
                return Err(FeatureError::NonFinite { name: name.clone() });
            }
            if let Some(id) = FeatureId::from_name(name) {
                fv.set(id, value);
            }
        }
        Ok(fv)
    }

    /// Name→value view in schema order.
    pub fn to_named(&self) -> NamedFeatures {
        NamedFeatures(self.iter().map(|(id, v)| (id.name(), v)).collect())
    }
}

/// Serializes as a JSON object whose keys follow schema order.
#[derive(Debug, Clone)]
pub struct NamedFeatures(pub Vec<(&'static str, f64)>);

impl Serialize for NamedFeatures {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_length() {
        let fv = FeatureVector::default();
        assert_eq!(fv.as_slice().len(), FEATURE_NAMES.len());
        assert_eq!(FeatureId::ALL.len(), FEATURE_COUNT);
        assert_eq!(FEATURE_COUNT, 61);
    }

    #[test]
    fn test_feature_consistency() {
        for (idx, &id) in FeatureId::ALL.iter().enumerate() {
            assert_eq!(id as usize, idx);
            assert_eq!(FeatureId::from_name(id.name()), Some(id));
        }
        assert_eq!(FeatureId::OpenSum.name(), "open_sum");
        assert_eq!(FeatureId::UnitsStreak.name(), "units_streak");
        assert_eq!(FeatureId::tens_freq(4).name(), "tens_freq_4");
        assert_eq!(FeatureId::units_freq(9).name(), "units_freq_9");
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = FEATURE_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_missing_slot_defaults_to_zero() {
        let mut named = HashMap::new();
        named.insert("open_sum".to_string(), 10.0);

        let fv = FeatureVector::from_named(&named).unwrap();
        assert_eq!(fv.get(FeatureId::OpenSum), 10.0);
        assert_eq!(fv.get(FeatureId::CloseSum), 0.0);
        assert_eq!(fv.as_slice().iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn test_unknown_slot_is_rejected() {
        let mut named = HashMap::new();
        named.insert("open_sum".to_string(), 1.0);
        named.insert("lucky_number".to_string(), 7.0);

        let err = FeatureVector::from_named(&named).unwrap_err();
        assert_eq!(
            err,
            FeatureError::UnknownFeature {
                name: "lucky_number".to_string()
            }
        );
    }

    #[test]
    fn test_non_finite_value_is_rejected() {
        let mut named = HashMap::new();
        named.insert("open_sum".to_string(), f64::NAN);
        assert!(matches!(
            FeatureVector::from_named(&named),
            Err(FeatureError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_schema_matches() {
        let mut names = schema_names();
        assert!(schema_matches(&names));
        names.swap(0, 1);
        assert!(!schema_matches(&names));
        names.swap(0, 1);
        names.pop();
        assert!(!schema_matches(&names));
    }

    #[test]
    fn test_named_serialization_keeps_schema_order() {
        let json = serde_json::to_string(&FeatureVector::default().to_named()).unwrap();
        assert!(json.starts_with("{\"open_sum\":0.0,\"close_sum\":0.0"));
        assert!(json.ends_with("\"units_streak\":0.0}"));
    }
}
