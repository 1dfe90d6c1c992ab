//! Custom serde deserializers for PubMed XML fields that do not map cleanly
//! onto derived structs

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::result;

/// One `AbstractText` element with its optional `Label` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct AbstractTextElement {
    pub label: Option<String>,
    pub text: String,
}

impl<'de> Deserialize<'de> for AbstractTextElement {
    fn deserialize<D>(deserializer: D) -> result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_abstract_text_with_label(deserializer)
    }
}

/// Handles both plain string content and map structures with `$text`/`$value`
/// keys plus attributes like `@Label` (structured abstracts).
///
/// Inline HTML tags are stripped during preprocessing; any other child element
/// is skipped and the surrounding text parts are joined.
fn deserialize_abstract_text_with_label<'de, D>(
    deserializer: D,
) -> result::Result<AbstractTextElement, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, IgnoredAny, MapAccess, Visitor};

    struct AbstractTextVisitor;

    impl<'de> Visitor<'de> for AbstractTextVisitor {
        type Value = AbstractTextElement;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("abstract text content")
        }

        fn visit_str<E>(self, value: &str) -> result::Result<AbstractTextElement, E>
        where
            E: de::Error,
        {
            Ok(AbstractTextElement {
                label: None,
                text: value.to_string(),
            })
        }

        fn visit_string<E>(self, value: String) -> result::Result<AbstractTextElement, E>
        where
            E: de::Error,
        {
            Ok(AbstractTextElement {
                label: None,
                text: value,
            })
        }

        fn visit_unit<E>(self) -> result::Result<AbstractTextElement, E>
        where
            E: de::Error,
        {
            Ok(AbstractTextElement {
                label: None,
                text: String::new(),
            })
        }

        fn visit_map<M>(self, mut map: M) -> result::Result<AbstractTextElement, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut text_parts = Vec::new();
            let mut label = None;
            while let Some(key) = map.next_key::<String>()? {
                if key == "$text" || key == "$value" {
                    let value: String = map.next_value()?;
                    text_parts.push(value);
                } else if key == "@Label" {
                    let value: String = map.next_value()?;
                    label = Some(value);
                } else {
                    // @NlmCategory and stray child elements
                    let _: IgnoredAny = map.next_value()?;
                }
            }
            Ok(AbstractTextElement {
                label,
                text: text_parts.join(" "),
            })
        }
    }

    deserializer.deserialize_any(AbstractTextVisitor)
}
