use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const ID_ATTRIBUTE: &str = "Id";
pub const NAME_ATTRIBUTE: &str = "Name";

/// Attribute map as held by the store, keyed by attribute name.
pub type StoredItem = BTreeMap<String, String>;

/// Public shape of a location served by the read API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Record {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    #[error("stored item is missing required attribute '{attribute}'")]
    MissingAttribute { attribute: &'static str },
    #[error("stored item has an empty '{attribute}' attribute")]
    EmptyAttribute { attribute: &'static str },
}

impl Record {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn to_item(&self) -> StoredItem {
        BTreeMap::from([
            (ID_ATTRIBUTE.to_string(), self.id.clone()),
            (NAME_ATTRIBUTE.to_string(), self.name.clone()),
        ])
    }

    /// Maps a stored item back to a record. Extra attributes are ignored;
    /// missing or blank `Id`/`Name` attributes are integrity faults.
    pub fn from_item(item: &StoredItem) -> Result<Self, IntegrityError> {
        Ok(Self {
            id: required_attribute(item, ID_ATTRIBUTE)?,
            name: required_attribute(item, NAME_ATTRIBUTE)?,
        })
    }
}

fn required_attribute(
    item: &StoredItem,
    attribute: &'static str,
) -> Result<String, IntegrityError> {
    let value = item
        .get(attribute)
        .ok_or(IntegrityError::MissingAttribute { attribute })?;
    if value.trim().is_empty() {
        return Err(IntegrityError::EmptyAttribute { attribute });
    }
    Ok(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_uses_pascal_case_attribute_names() {
        let item = Record::new("1", "Newcastle").to_item();
        assert_eq!(item.get("Id").map(String::as_str), Some("1"));
        assert_eq!(item.get("Name").map(String::as_str), Some("Newcastle"));
    }

    #[test]
    fn from_item_ignores_extra_attributes() {
        let mut item = Record::new("2", "London").to_item();
        item.insert("Region".to_string(), "South East".to_string());

        let record = Record::from_item(&item).expect("item should map");
        assert_eq!(record, Record::new("2", "London"));
    }

    #[test]
    fn from_item_rejects_missing_name() {
        let item = StoredItem::from([("Id".to_string(), "3".to_string())]);

        let error = Record::from_item(&item).expect_err("item without name should fail");
        assert_eq!(error, IntegrityError::MissingAttribute { attribute: "Name" });
    }

    #[test]
    fn from_item_rejects_blank_id() {
        let item = Record::new(" ", "Manchester").to_item();

        let error = Record::from_item(&item).expect_err("blank id should fail");
        assert_eq!(error, IntegrityError::EmptyAttribute { attribute: "Id" });
    }
}
