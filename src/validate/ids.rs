use super::validate_collection;
use crate::catalog::Catalog;
use crate::error::ValidationError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId {
    pub collection: String,
    pub id: String,
}

/// `<collection>:<record id>[,<collection>:<record id>...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIdSet(Vec<RecordId>);

impl RecordIdSet {
    pub fn parse(text: &str, catalog: &Catalog) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidRecordIds(text.trim().to_string());

        let mut ids: Vec<RecordId> = vec![];
        for entry in text.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (coll, id) = entry.split_once(':').ok_or_else(invalid)?;
            let id = id.trim();
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            let record = RecordId {
                collection: validate_collection(catalog, coll)?,
                id: id.to_string(),
            };
            if !ids.contains(&record) {
                ids.push(record);
            }
        }
        if ids.is_empty() {
            return Err(invalid());
        }
        Ok(Self(ids))
    }

    pub fn ids(&self) -> &[RecordId] {
        &self.0
    }

    pub fn contains_collection(&self, collection: &str) -> bool {
        self.0.iter().any(|r| r.collection == collection)
    }
}

impl fmt::Display for RecordIdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .0
            .iter()
            .map(|r| format!("{}:{}", r.collection, r.id))
            .collect::<Vec<_>>();
        f.write_str(&entries.join(","))
    }
}

/// `orders:<id>,<id>|items:<id>,...`, either section may be left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderItemSet {
    pub orders: Vec<u64>,
    pub items: Vec<u64>,
}

impl OrderItemSet {
    /// Empty input means "all available items" and yields `Ok(None)`.
    pub fn parse(text: &str) -> Result<Option<Self>, ValidationError> {
        let text = text.trim().trim_matches(|c: char| c == '\'' || c == '"');
        if text.is_empty() {
            return Ok(None);
        }
        let invalid = || ValidationError::InvalidOrderItems(text.to_string());

        let mut set = Self::default();
        for section in text.split('|').map(str::trim) {
            let (key, ids) = section.split_once(':').ok_or_else(invalid)?;
            let target = match key.trim().to_ascii_lowercase().as_str() {
                "orders" | "order" => &mut set.orders,
                "items" | "item" => &mut set.items,
                _ => return Err(invalid()),
            };
            for id in ids.split(',').map(str::trim).filter(|i| !i.is_empty()) {
                if !id.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                let id: u64 = id.parse().map_err(|_| invalid())?;
                if !target.contains(&id) {
                    target.push(id);
                }
            }
        }
        if set.orders.is_empty() && set.items.is_empty() {
            return Err(invalid());
        }
        Ok(Some(set))
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",")
}

impl fmt::Display for OrderItemSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sections = vec![];
        if !self.orders.is_empty() {
            sections.push(format!("orders:{}", join_ids(&self.orders)));
        }
        if !self.items.is_empty() {
            sections.push(format!("items:{}", join_ids(&self.items)));
        }
        f.write_str(&sections.join("|"))
    }
}
