//! Field visibility modes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormError;

/// How a field is presented.
///
/// All transitions between modes are legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Rendered and interactive
    #[default]
    Full,
    /// Laid out but not shown
    Hidden,
    /// Not rendered at all
    Suppress,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Visibility::Full, Visibility::Hidden, Visibility::Suppress];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Full => "full",
            Visibility::Hidden => "hidden",
            Visibility::Suppress => "suppress",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Visibility::Full),
            "hidden" => Ok(Visibility::Hidden),
            "suppress" => Ok(Visibility::Suppress),
            _ => Err(FormError::invalid_visibility(s)),
        }
    }
}

impl TryFrom<&Value> for Visibility {
    type Error = FormError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => s.parse(),
            other => Err(FormError::invalid_visibility(other)),
        }
    }
}

impl From<Visibility> for Value {
    fn from(visibility: Visibility) -> Self {
        Value::String(visibility.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_full() {
        assert_eq!(Visibility::default(), Visibility::Full);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("HIDDEN".parse::<Visibility>().unwrap(), Visibility::Hidden);
        assert_eq!(" suppress ".parse::<Visibility>().unwrap(), Visibility::Suppress);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "invisible".parse::<Visibility>().unwrap_err();
        assert!(matches!(err, FormError::InvalidVisibility { .. }));
    }

    #[test]
    fn test_try_from_value() {
        assert_eq!(Visibility::try_from(&json!("full")).unwrap(), Visibility::Full);
        assert!(Visibility::try_from(&json!(10)).is_err());
        assert!(Visibility::try_from(&Value::Null).is_err());
    }

    #[test]
    fn test_value_round_trip() {
        for mode in Visibility::ALL {
            let value: Value = mode.into();
            assert_eq!(Visibility::try_from(&value).unwrap(), mode);
        }
    }
}
