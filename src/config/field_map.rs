//! @acp:module "Field Map"
//! @acp:summary "Insertion-ordered string map for placeholders and answer fields"
//! @acp:domain cli
//! @acp:layer model
//!
//! Substitution order and answer line order both follow the order keys
//! appear in the configuration file. A JSON object that repeats a key is
//! rejected instead of silently keeping the last value.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};

/// Ordered `String -> String` map with unique keys
pub type FieldMap = IndexMap<String, String>;

/// Keys as an unordered set, for cross-variant comparison
pub fn key_set(map: &FieldMap) -> BTreeSet<&str> {
    map.keys().map(String::as_str).collect()
}

/// `deserialize_with` target for [`FieldMap`] fields
pub fn deserialize_unique<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FieldMap, D::Error> {
    deserializer.deserialize_map(UniqueKeysVisitor)
}

struct UniqueKeysVisitor;

impl<'de> Visitor<'de> for UniqueKeysVisitor {
    type Value = FieldMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping strings to strings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldMap, A::Error> {
        let mut map = FieldMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            if let indexmap::map::Entry::Vacant(slot) = map.entry(key.clone()) {
                slot.insert(value);
            } else {
                return Err(de::Error::custom(format!("duplicate key '{}'", key)));
            }
        }
        Ok(map)
    }
}
