//! Resource-type blocking applied to a page before navigation

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Categories of sub-resources a page may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceCategory {
    Image,
    Stylesheet,
    Font,
    Script,
    Media,
    Xhr,
    Fetch,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 7] = [
        Self::Image,
        Self::Stylesheet,
        Self::Font,
        Self::Script,
        Self::Media,
        Self::Xhr,
        Self::Fetch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Stylesheet => "stylesheet",
            Self::Font => "font",
            Self::Script => "script",
            Self::Media => "media",
            Self::Xhr => "xhr",
            Self::Fetch => "fetch",
        }
    }
}

impl FromStr for ResourceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown resource category: {}", s))
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of categories a page refuses to load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBlocklist(BTreeSet<ResourceCategory>);

impl ResourceBlocklist {
    /// Blocks nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// Blocks every category; used for listing pages where only anchors matter
    pub fn all() -> Self {
        ResourceCategory::ALL.into_iter().collect()
    }

    pub fn blocks(&self, category: ResourceCategory) -> bool {
        self.0.contains(&category)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ResourceCategory> for ResourceBlocklist {
    fn from_iter<I: IntoIterator<Item = ResourceCategory>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ResourceBlocklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|c| c.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
