use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

static HAS_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([A-Za-z_][\w-]*)\]$").expect("valid regex"));
static ATTRIBUTE_EQUALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[([A-Za-z_][\w-]*)="([^"]*)"\]$"#).expect("valid regex")
});
static CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.([A-Za-z_][\w-]*)(?::not\(\.([A-Za-z_][\w-]*)\))?$").expect("valid regex")
});

/// The subset of CSS selectors the bootstrap needs from a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// `[attr]`
    HasAttribute(String),
    /// `[attr="value"]`
    AttributeEquals { attribute: String, value: String },
    /// `.class` or `.class:not(.except)`
    Class {
        class: String,
        except: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("unsupported selector '{0}'")]
    Unsupported(String),
}

impl Selector {
    pub fn has_attribute(attribute: impl Into<String>) -> Self {
        Selector::HasAttribute(attribute.into())
    }

    pub fn attribute_equals(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Selector::AttributeEquals {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Selects every input of the group named `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self::attribute_equals("name", name)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::HasAttribute(attribute) => write!(f, "[{attribute}]"),
            Selector::AttributeEquals { attribute, value } => {
                write!(f, "[{attribute}=\"{value}\"]")
            }
            Selector::Class { class, except } => {
                write!(f, ".{class}")?;
                if let Some(except) = except {
                    write!(f, ":not(.{except})")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if let Some(captures) = HAS_ATTRIBUTE.captures(raw) {
            return Ok(Selector::HasAttribute(captures[1].to_string()));
        }
        if let Some(captures) = ATTRIBUTE_EQUALS.captures(raw) {
            return Ok(Selector::attribute_equals(&captures[1], &captures[2]));
        }
        if let Some(captures) = CLASS.captures(raw) {
            return Ok(Selector::Class {
                class: captures[1].to_string(),
                except: captures.get(2).map(|except| except.as_str().to_string()),
            });
        }
        Err(SelectorError::Unsupported(raw.to_string()))
    }
}

/// Selectors travel through config files as their CSS text.
impl Serialize for Selector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_attribute_selectors() {
        let selector: Selector = "[data-conditional-logic]".parse().expect("selector");
        assert_eq!(selector, Selector::has_attribute("data-conditional-logic"));
        assert_eq!(selector.to_string(), "[data-conditional-logic]");

        let selector: Selector = r#"[name="question_5"]"#.parse().expect("selector");
        assert_eq!(selector, Selector::named("question_5"));
        assert_eq!(selector.to_string(), r#"[name="question_5"]"#);
    }

    #[test]
    fn parses_class_with_exclusion() {
        let selector: Selector = ".alert:not(.alert-permanent)".parse().expect("selector");
        assert_eq!(
            selector,
            Selector::Class {
                class: "alert".into(),
                except: Some("alert-permanent".into()),
            }
        );
        assert_eq!(selector.to_string(), ".alert:not(.alert-permanent)");
    }

    #[test]
    fn round_trips_through_json_text() {
        let selector: Selector = serde_json::from_str(r#"".notice""#).expect("selector");
        assert_eq!(
            selector,
            Selector::Class {
                class: "notice".into(),
                except: None,
            }
        );
        assert_eq!(
            serde_json::to_string(&selector).expect("json"),
            r#"".notice""#
        );
        assert!(serde_json::from_str::<Selector>(r#""div > p""#).is_err());
    }

    #[test]
    fn rejects_descendant_combinators() {
        let err = "form input".parse::<Selector>().unwrap_err();
        assert_eq!(err, SelectorError::Unsupported("form input".into()));
    }
}
