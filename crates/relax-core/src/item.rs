//! Items from the collection, as seen by the sandbox.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Size class of an item. Decides the body radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSize {
    Small,
    Medium,
    Large,
}

impl ItemSize {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];
}

impl fmt::Display for ItemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        })
    }
}

/// Weight class of an item. Decides the body density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemWeight {
    Light,
    Mid,
    Heavy,
}

impl ItemWeight {
    pub const ALL: [Self; 3] = [Self::Light, Self::Mid, Self::Heavy];
}

impl fmt::Display for ItemWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Mid => "mid",
            Self::Heavy => "heavy",
        })
    }
}

/// A collected object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub image_url: String,
    pub size: ItemSize,
    pub weight: ItemWeight,
}

impl Item {
    pub fn new(id: impl Into<String>, image_url: impl Into<String>, size: ItemSize, weight: ItemWeight) -> Self {
        Self {
            id: id.into(),
            image_url: image_url.into(),
            size,
            weight,
        }
    }
}
