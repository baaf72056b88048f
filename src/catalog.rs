//! Collection and search-field schema, as supplied by the RAPI or an offline catalog file.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub collections: Vec<Collection>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Collection {
    pub id: String,
    pub title: String,
    /// Shorthand names accepted in place of the id (e.g. "RCM").
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default = "default_data_type")]
    pub data_type: String,
}

fn default_data_type() -> String {
    "String".to_string()
}

impl Catalog {
    pub fn new(collections: Vec<Collection>) -> Self {
        Self { collections }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog: Self = toml::from_str(&content)?;
        Ok(catalog)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Case-insensitive lookup by id or alias.
    pub fn resolve(&self, name: &str) -> Option<&Collection> {
        let name = name.trim();
        self.collections
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(name))
            .or_else(|| {
                self.collections
                    .iter()
                    .find(|c| c.aliases.iter().any(|a| a.eq_ignore_ascii_case(name)))
            })
    }

    /// Collections in the order the selection menu shows them.
    pub fn sorted_by_title(&self) -> Vec<&Collection> {
        let mut sorted = self.collections.iter().collect::<Vec<_>>();
        sorted.sort_by(|a, b| a.title.cmp(&b.title));
        sorted
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl Collection {
    /// Field lookup is case-insensitive and accepts either the id or the display title.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        let name = name.trim();
        self.fields
            .iter()
            .find(|f| f.id.eq_ignore_ascii_case(name))
            .or_else(|| self.fields.iter().find(|f| f.title.eq_ignore_ascii_case(name)))
    }
}

impl FieldDescriptor {
    pub fn choices_description(&self) -> String {
        if self.choices.is_empty() {
            format!("any {} value", self.data_type)
        } else {
            self.choices.join(", ")
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_PATH: &str = "/tmp/eodms_cli_catalog_test.toml";

    #[test]
    fn test_resolve_by_id_and_alias() {
        let catalog = fixtures::catalog();
        assert_eq!(catalog.resolve("rcmimageproducts").unwrap().id, "RCMImageProducts");
        assert_eq!(catalog.resolve("rcm").unwrap().id, "RCMImageProducts");
        assert_eq!(catalog.resolve(" NAPL ").unwrap().id, "NAPL");
        assert!(catalog.resolve("Sentinel2").is_none());
    }

    #[test]
    fn test_sorted_by_title() {
        let catalog = fixtures::catalog();
        let ids = catalog
            .sorted_by_title()
            .iter()
            .map(|c| c.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["NAPL", "RCMImageProducts", "Radarsat1"]);
    }

    #[test]
    fn test_field_lookup() {
        let catalog = fixtures::catalog();
        let rcm = catalog.resolve("RCM").unwrap();
        assert_eq!(rcm.field("BEAM_MNEMONIC").unwrap().id, "beam_mnemonic");
        assert_eq!(rcm.field("product type").unwrap().id, "product_type");
        assert_eq!(
            rcm.field("incidence_angle").unwrap().choices_description(),
            "any Float value"
        );
        assert!(rcm.field("colour").is_none());
    }

    #[test]
    fn test_write_then_read_toml() {
        let path = Path::new(CATALOG_PATH);
        let catalog = fixtures::catalog();
        catalog.write(path).unwrap();
        let read = Catalog::read(path).unwrap();
        assert_eq!(read, catalog);
    }
}
