use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A department listed under a district
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentEntry {
    pub id: String,
    pub name: String,
    pub link: String,
}

/// Departments discovered per district
///
/// Districts keep the order in which they were discovered, both in memory and
/// in the serialized `{district: [...]}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentCatalog {
    districts: Vec<(String, Vec<DepartmentEntry>)>,
}

impl DepartmentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the departments for a district, replacing any earlier entry for it
    pub fn insert(&mut self, district: impl Into<String>, departments: Vec<DepartmentEntry>) {
        let district = district.into();
        match self.districts.iter_mut().find(|(d, _)| *d == district) {
            Some((_, existing)) => *existing = departments,
            None => self.districts.push((district, departments)),
        }
    }

    pub fn get(&self, district: &str) -> Option<&[DepartmentEntry]> {
        self.districts
            .iter()
            .find(|(name, _)| name == district)
            .map(|(_, departments)| departments.as_slice())
    }

    /// Iterates districts in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DepartmentEntry])> {
        self.districts
            .iter()
            .map(|(name, departments)| (name.as_str(), departments.as_slice()))
    }

    pub fn district_count(&self) -> usize {
        self.districts.len()
    }

    pub fn department_count(&self) -> usize {
        self.districts.iter().map(|(_, d)| d.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}

impl Serialize for DepartmentCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.districts.len()))?;
        for (district, departments) in &self.districts {
            map.serialize_entry(district, departments)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DepartmentCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = DepartmentCatalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of district names to department lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut catalog = DepartmentCatalog::new();
                while let Some((district, departments)) =
                    access.next_entry::<String, Vec<DepartmentEntry>>()?
                {
                    catalog.insert(district, departments);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// On-disk envelope for the catalog: `{"department": {...}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CatalogDocument {
    pub department: DepartmentCatalog,
}
