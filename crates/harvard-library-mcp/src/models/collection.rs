//! Known catalog collections.

use serde::Serialize;

/// A named collection usable with collection search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Collection {
    /// Identifier passed as the `collection` search value.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Short description.
    pub description: &'static str,
}

/// Curated list of collections.
pub const COLLECTIONS: &[Collection] = &[
    Collection {
        id: "English_Crime_and_Execution_Broadsides",
        name: "English Crime and Execution Broadsides",
        description: "Collection of 18th-19th century English crime broadsides",
    },
    Collection {
        id: "Harvard_Graduate_School_of_Education",
        name: "Harvard Graduate School of Education Collection",
        description: "Materials from the Harvard Graduate School of Education",
    },
    Collection {
        id: "Women_Working_1800_1930",
        name: "Women Working, 1800-1930",
        description: "Collection focusing on women's roles in the economy",
    },
    Collection {
        id: "Latin_American_Pamphlets",
        name: "Latin American Pamphlets",
        description: "Historical pamphlets from Latin America",
    },
    Collection {
        id: "Harvard_Medical_School",
        name: "Harvard Medical School Collection",
        description: "Historical materials from Harvard Medical School",
    },
];

/// Look up a curated collection by id.
#[must_use]
pub fn find_collection(id: &str) -> Option<&'static Collection> {
    COLLECTIONS.iter().find(|c| c.id == id)
}
