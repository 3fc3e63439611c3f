//! Diagnosis Result

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseLevelError;

/// Confidence the rule base places in a diagnosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Moderate,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "Low",
            Confidence::Moderate => "Moderate",
            Confidence::High => "High",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "moderate" => Ok(Confidence::Moderate),
            "high" => Ok(Confidence::High),
            _ => Err(ParseLevelError::new("confidence", s)),
        }
    }
}

/// How soon the patient should seek care
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Moderate,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Moderate => "Moderate",
            Urgency::High => "High",
            Urgency::Critical => "Critical",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "moderate" => Ok(Urgency::Moderate),
            "high" => Ok(Urgency::High),
            "critical" => Ok(Urgency::Critical),
            _ => Err(ParseLevelError::new("urgency", s)),
        }
    }
}

/// A diagnosis produced by one fired rule.
///
/// Plain value: it holds no reference back to the fact or rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Diagnosed condition
    pub condition: String,
    /// Confidence level
    pub confidence: Confidence,
    /// Recommended course of action
    pub recommendation: String,
    /// Urgency level
    pub urgency: Urgency,
}

impl Diagnosis {
    pub fn new(
        condition: impl Into<String>,
        confidence: Confidence,
        recommendation: impl Into<String>,
        urgency: Urgency,
    ) -> Self {
        Self {
            condition: condition.into(),
            confidence,
            recommendation: recommendation.into(),
            urgency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_names() {
        let diagnosis = Diagnosis::new("Migraine", Confidence::Moderate, "Rest", Urgency::Low);
        let json = serde_json::to_value(&diagnosis).unwrap();

        assert_eq!(json["condition"], "Migraine");
        assert_eq!(json["confidence"], "Moderate");
        assert_eq!(json["recommendation"], "Rest");
        assert_eq!(json["urgency"], "Low");
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("high".parse::<Confidence>().unwrap(), Confidence::High);
        assert_eq!("Critical".parse::<Urgency>().unwrap(), Urgency::Critical);
        assert!("Certain".parse::<Confidence>().is_err());
        assert!("Critical".parse::<Confidence>().is_err());
    }

    #[test]
    fn test_urgency_ordering() {
        assert!(Urgency::Critical > Urgency::High);
        assert!(Urgency::Low < Urgency::Moderate);
    }
}
