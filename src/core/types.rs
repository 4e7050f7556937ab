//! Core type definitions used throughout the codebase

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Settings bag sent alongside every command to the NLP service
pub type SettingsMap = serde_json::Map<String, Value>;

/// Action-specific payload carried by an NLU result
///
/// The NLP service sends whatever JSON it likes here; it is narrowed once,
/// at the gateway seam, so the control unit only ever sees these three shapes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Parameter {
    Integer(i64),
    Text(String),
    #[default]
    Absent,
}

impl Parameter {
    /// Narrow an arbitrary JSON value
    ///
    /// Integral numbers (including `22.0`) become `Integer`, blank strings and
    /// `null` become `Absent`, everything else is kept as its text form.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                            Self::Integer(f as i64)
                        }
                        _ => Self::Text(n.to_string()),
                    }
                }
            }
            Value::String(s) if s.trim().is_empty() => Self::Absent,
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(i) => Value::from(*i),
            Self::Text(s) => Value::String(s.clone()),
            Self::Absent => Value::Null,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Text(s) => write!(f, "{}", s),
            Self::Absent => write!(f, "-"),
        }
    }
}

impl Serialize for Parameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Parameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

/// Display language for feedback sentences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zh" | "zh-cn" | "zh_cn" | "cn" | "chinese" => Ok(Self::Zh),
            "en" | "en-us" | "en_us" | "english" => Ok(Self::En),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zh => write!(f, "zh"),
            Self::En => write!(f, "en"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameter_from_integral_float() {
        assert_eq!(Parameter::from_json(&json!(22.0)), Parameter::Integer(22));
        assert_eq!(Parameter::from_json(&json!(80)), Parameter::Integer(80));
    }

    #[test]
    fn test_parameter_fractional_kept_as_text() {
        assert_eq!(
            Parameter::from_json(&json!(0.05)),
            Parameter::Text("0.05".to_string())
        );
    }

    #[test]
    fn test_parameter_blank_is_absent() {
        assert_eq!(Parameter::from_json(&json!(null)), Parameter::Absent);
        assert_eq!(Parameter::from_json(&json!("  ")), Parameter::Absent);
    }

    #[test]
    fn test_numeric_string_is_not_integer() {
        let param = Parameter::from_json(&json!("26"));
        assert_eq!(param.as_integer(), None);
        assert_eq!(param.as_text(), Some("26"));
    }

    #[test]
    fn test_parameter_serializes_to_plain_json() {
        assert_eq!(serde_json::to_value(Parameter::Integer(5)).unwrap(), json!(5));
        assert_eq!(serde_json::to_value(Parameter::Absent).unwrap(), json!(null));
        let back: Parameter = serde_json::from_value(json!("warm_white")).unwrap();
        assert_eq!(back, Parameter::Text("warm_white".into()));
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("zh-CN".parse::<Language>().unwrap(), Language::Zh);
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
    }
}
