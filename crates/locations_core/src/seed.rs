use crate::record::Record;

/// Identifier reported for the seeded data set on every lifecycle outcome.
pub const PHYSICAL_RESOURCE_ID: &str = "LocationsTableData";

const SEED_LOCATIONS: [(&str, &str); 3] = [
    ("1", "Newcastle"),
    ("2", "London"),
    ("3", "Manchester"),
];

pub fn seed_set() -> Vec<Record> {
    SEED_LOCATIONS
        .iter()
        .map(|(id, name)| Record::new(*id, *name))
        .collect()
}
