use serde::{Deserialize, Deserializer, Serialize};

/// Written for any field that could not be extracted from the page.
pub const NOT_AVAILABLE: &str = "N/A";

// record
//  ├── url
//  ├── price          "1,250,000 LYD" | "N/A"
//  ├── location       map link | "N/A"
//  ├── description    free text (Bahu only)
//  └── attributes
//       ├── "City"         → "Tripoli"
//       ├── "Bedrooms"     → "3 Bedrooms"
//       └── ...

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub url: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

/// Keys keep the page's own labels; order is the order they appeared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(pub Vec<(String, String)>);

impl ListingRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            price: Some(NOT_AVAILABLE.to_string()),
            location: Some(NOT_AVAILABLE.to_string()),
            description: None,
            attributes: Attributes::default(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }
}

/// Hand-edited datasets sometimes carry numeric prices; keep them as text.
fn scalar_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Later values for an existing key replace the earlier one in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// JSON objects in the dataset are serialized as key/value maps, not pairs.
mod attributes_serde {
    use super::Attributes;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    impl Serialize for Attributes {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.0.len()))?;
            for (k, v) in &self.0 {
                map.serialize_entry(k, v)?;
            }
            map.end()
        }
    }

    struct AttributesVisitor;

    impl<'de> Visitor<'de> for AttributesVisitor {
        type Value = Attributes;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of attribute names to values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Attributes, A::Error> {
            let mut attrs = Attributes::default();
            while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => continue,
                    other => other.to_string(),
                };
                attrs.insert(key, value);
            }
            Ok(attrs)
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Attributes, E> {
            Ok(Attributes::default())
        }
    }

    impl<'de> Deserialize<'de> for Attributes {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(AttributesVisitor)
        }
    }
}
