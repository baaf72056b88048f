//! Per-collection search filters.
//!
//! ```text
//! filters   := clause ("," clause)*
//! clause    := [collection "."] field operator value ("|" value)*
//! operator  := "=" | "<>" | "<=" | ">=" | "<" | ">"
//! ```
//!
//! Commas and bars inside single or double quotes do not split, and quote
//! characters are removed from fields and values once splitting is done. A `.`
//! only qualifies a collection when it appears before the operator, so
//! `incidence_angle=30.5` is a plain clause with a decimal value.
use crate::catalog::{Catalog, Collection};
use crate::error::{FilterError, SchemaLookupError, ValidationError};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Gt => ">",
        }
    }

    /// Two-character operators are matched first.
    fn at(s: &str) -> Option<Self> {
        [Self::Ne, Self::Le, Self::Ge, Self::Eq, Self::Lt, Self::Gt]
            .into_iter()
            .find(|op| s.starts_with(op.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub field: String,
    pub op: Operator,
    pub values: Vec<String>,
}

impl fmt::Display for FilterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self
            .values
            .iter()
            .map(|v| {
                let v = strip_quotes(v);
                if v.contains(',') || v.contains('|') {
                    format!("'{}'", v)
                } else {
                    v
                }
            })
            .collect::<Vec<_>>();
        write!(f, "{}{}{}", self.field, self.op.as_str(), values.join("|"))
    }
}

/// Collection id -> clauses, in order of first mention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    entries: Vec<(String, Vec<FilterClause>)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, collection: &str) -> Option<&[FilterClause]> {
        self.entries
            .iter()
            .find(|(c, _)| c == collection)
            .map(|(_, clauses)| clauses.as_slice())
    }

    fn entry(&mut self, collection: &str) -> &mut Vec<FilterClause> {
        let idx = match self.entries.iter().position(|(c, _)| c == collection) {
            Some(idx) => idx,
            None => {
                self.entries.push((collection.to_string(), vec![]));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Records the collection with no clauses if it has not been seen yet.
    pub fn insert_empty(&mut self, collection: &str) {
        self.entry(collection);
    }

    pub fn push(&mut self, collection: &str, clause: FilterClause) {
        let clauses = self.entry(collection);
        if !clauses.contains(&clause) {
            clauses.push(clause);
        }
    }

    pub fn extend(&mut self, collection: &str, clauses: Vec<FilterClause>) {
        self.insert_empty(collection);
        for clause in clauses {
            self.push(collection, clause);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FilterClause])> {
        self.entries.iter().map(|(c, f)| (c.as_str(), f.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_clauses(&self) -> bool {
        self.entries.iter().any(|(_, f)| !f.is_empty())
    }

    /// Drops collections that were asked about but given no clauses.
    pub fn normalized(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(_, f)| !f.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// `coll.clause,coll.clause`, or `None` when there is nothing to filter on.
    pub fn to_expression(&self) -> Option<String> {
        let clauses = self
            .entries
            .iter()
            .flat_map(|(coll, clauses)| clauses.iter().map(move |c| format!("{}.{}", coll, c)))
            .collect::<Vec<_>>();
        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(","))
        }
    }
}

impl Serialize for FilterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (coll, clauses) in &self.entries {
            let clauses = clauses.iter().map(|c| c.to_string()).collect::<Vec<_>>();
            map.serialize_entry(coll, &clauses)?;
        }
        map.end()
    }
}

fn strip_quotes(s: &str) -> String {
    s.replace(['"', '\''], "").trim().to_string()
}

fn malformed(clause: &str, reason: &str) -> ValidationError {
    ValidationError::MalformedFilter {
        clause: clause.to_string(),
        reason: reason.to_string(),
    }
}

/// Splits on `sep` wherever it is not inside quotes.
fn split_top_level(text: &str, sep: char) -> Result<Vec<&str>, ValidationError> {
    let mut parts = vec![];
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, c) if c == sep => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(malformed(text, "unterminated quote"));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// Byte offset and operator of the first comparison outside quotes.
fn find_operator(clause: &str) -> Option<(usize, Operator)> {
    let mut quote: Option<char> = None;
    for (i, c) in clause.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None => {
                if let Some(op) = Operator::at(&clause[i..]) {
                    return Some((i, op));
                }
            }
        }
    }
    None
}

/// A clause as written, before its collection and field are checked against the schema.
#[derive(Debug, PartialEq)]
struct RawClause {
    qualifier: Option<String>,
    field: String,
    op: Operator,
    values: Vec<String>,
}

fn parse_clause(text: &str) -> Result<RawClause, ValidationError> {
    let (pos, op) = find_operator(text).ok_or_else(|| malformed(text, "missing operator"))?;
    let lhs = strip_quotes(&text[..pos]);
    let rhs = &text[pos + op.as_str().len()..];

    let (qualifier, field) = match lhs.split_once('.') {
        Some((q, f)) => (Some(q.trim().to_string()), f.trim().to_string()),
        None => (None, lhs.clone()),
    };
    if field.is_empty() || qualifier.as_deref() == Some("") {
        return Err(malformed(text, "missing field"));
    }

    let values = split_top_level(rhs, '|')?
        .into_iter()
        .map(strip_quotes)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>();
    if values.is_empty() {
        return Err(malformed(text, "missing value"));
    }

    Ok(RawClause {
        qualifier,
        field,
        op,
        values,
    })
}

fn parse_clauses(text: &str) -> Result<Vec<RawClause>, ValidationError> {
    split_top_level(text.trim(), ',')?
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(parse_clause)
        .collect()
}

pub struct FilterParser<'a> {
    catalog: &'a Catalog,
}

impl<'a> FilterParser<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    fn collection(&self, id: &str) -> Result<&'a Collection, SchemaLookupError> {
        self.catalog
            .resolve(id)
            .ok_or_else(|| SchemaLookupError::UnknownCollection(id.to_string()))
    }

    fn resolve(&self, collection: &Collection, raw: &RawClause) -> Result<FilterClause, SchemaLookupError> {
        let field = collection
            .field(&raw.field)
            .ok_or_else(|| SchemaLookupError::UnknownField {
                collection: collection.id.clone(),
                field: raw.field.clone(),
            })?;
        Ok(FilterClause {
            field: field.id.clone(),
            op: raw.op,
            values: raw.values.clone(),
        })
    }

    /// The `--filters` form. Qualified clauses go to their collection, which
    /// must be one of `selected`; unqualified clauses apply to every selected
    /// collection.
    pub fn parse_command_line(&self, text: &str, selected: &[String]) -> Result<FilterSpec, FilterError> {
        let mut spec = FilterSpec::new();
        for raw in parse_clauses(text)? {
            let targets = match &raw.qualifier {
                Some(q) => {
                    let coll = self.collection(q)?;
                    if !selected.iter().any(|s| s == &coll.id) {
                        return Err(ValidationError::UnselectedCollection(coll.id.clone()).into());
                    }
                    vec![coll]
                }
                None => selected
                    .iter()
                    .map(|s| self.collection(s))
                    .collect::<Result<Vec<_>, _>>()?,
            };
            for coll in targets {
                let clause = self.resolve(coll, &raw)?;
                spec.push(&coll.id, clause);
            }
        }
        Ok(spec)
    }

    /// One interactive line for one collection. A qualifier, if given, has to name that collection.
    pub fn parse_for_collection(&self, text: &str, collection: &str) -> Result<Vec<FilterClause>, FilterError> {
        let coll = self.collection(collection)?;
        let mut clauses: Vec<FilterClause> = vec![];
        for raw in parse_clauses(text)? {
            if let Some(q) = &raw.qualifier {
                let named = self.collection(q)?;
                if named.id != coll.id {
                    return Err(malformed(
                        &format!("{}.{}", q, raw.field),
                        &format!("qualifier does not match collection '{}'", coll.id),
                    )
                    .into());
                }
            }
            let clause = self.resolve(coll, &raw)?;
            if !clauses.contains(&clause) {
                clauses.push(clause);
            }
        }
        Ok(clauses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;

    fn clause(field: &str, op: Operator, values: &[&str]) -> FilterClause {
        FilterClause {
            field: field.to_string(),
            op,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_qualified_and_interactive_forms_agree() {
        let catalog = fixtures::catalog();
        let parser = FilterParser::new(&catalog);
        let selected = vec!["RCMImageProducts".to_string()];

        let from_cli = parser
            .parse_command_line("RCMImageProducts.beam_mnemonic=16M11", &selected)
            .unwrap();
        let mut from_prompt = FilterSpec::new();
        from_prompt.extend(
            "RCMImageProducts",
            parser
                .parse_for_collection("beam_mnemonic=16M11", "RCMImageProducts")
                .unwrap(),
        );
        assert_eq!(from_cli, from_prompt);
    }

    #[test]
    fn test_single_collection_unqualified() {
        let catalog = fixtures::catalog();
        let parser = FilterParser::new(&catalog);
        let spec = parser
            .parse_command_line(
                "beam_mnemonic=16M11|16M13,PRODUCT_TYPE=GRD",
                &["RCMImageProducts".to_string()],
            )
            .unwrap();
        assert_eq!(
            spec.get("RCMImageProducts").unwrap(),
            &[
                clause("beam_mnemonic", Operator::Eq, &["16M11", "16M13"]),
                clause("product_type", Operator::Eq, &["GRD"]),
            ]
        );
    }

    #[test]
    fn test_multi_collection_qualifiers_keep_first_mention_order() {
        let catalog = fixtures::catalog();
        let parser = FilterParser::new(&catalog);
        let selected = vec!["RCMImageProducts".to_string(), "Radarsat1".to_string()];
        let spec = parser
            .parse_command_line(
                "R1.orbit_direction=Ascending,rcm.beam_mnemonic=5M10,Radarsat1.beam_mnemonic=S7",
                &selected,
            )
            .unwrap();
        let order = spec.iter().map(|(c, _)| c).collect::<Vec<_>>();
        assert_eq!(order, vec!["Radarsat1", "RCMImageProducts"]);
        assert_eq!(spec.get("Radarsat1").unwrap().len(), 2);
    }

    #[test]
    fn test_unqualified_applies_to_each_selected_collection() {
        let catalog = fixtures::catalog();
        let parser = FilterParser::new(&catalog);
        let selected = vec!["RCMImageProducts".to_string(), "Radarsat1".to_string()];
        let spec = parser.parse_command_line("beam_mnemonic=S7", &selected).unwrap();
        assert_eq!(spec.get("RCMImageProducts").unwrap().len(), 1);
        assert_eq!(spec.get("Radarsat1").unwrap().len(), 1);

        let err = parser
            .parse_command_line("orbit_direction=Ascending", &selected)
            .unwrap_err();
        assert!(matches!(err, FilterError::Schema(SchemaLookupError::UnknownField { .. })));
    }

    #[test]
    fn test_decimal_value_is_not_a_qualifier() {
        let catalog = fixtures::catalog();
        let parser = FilterParser::new(&catalog);
        let clauses = parser
            .parse_for_collection("incidence_angle>=30.5", "RCMImageProducts")
            .unwrap();
        assert_eq!(clauses, vec![clause("incidence_angle", Operator::Ge, &["30.5"])]);

        let spec = parser
            .parse_command_line("RCM.incidence_angle<>12.25", &["RCMImageProducts".to_string()])
            .unwrap();
        assert_eq!(
            spec.to_expression().unwrap(),
            "RCMImageProducts.incidence_angle<>12.25"
        );
    }

    #[test]
    fn test_quotes_survive_split_and_are_stripped() {
        let catalog = fixtures::catalog();
        let parser = FilterParser::new(&catalog);
        let clauses = parser
            .parse_for_collection("\"scale\"='1,000|2,000'|\"5000\",colour=C", "NAPL")
            .unwrap();
        assert_eq!(clauses[0], clause("scale", Operator::Eq, &["1,000|2,000", "5000"]));
        assert_eq!(clauses[0].to_string(), "scale='1,000|2,000'|5000");
        assert_eq!(clauses[1], clause("colour", Operator::Eq, &["C"]));
    }

    #[test]
    fn test_whole_string_rejected_on_unknown_field() {
        let catalog = fixtures::catalog();
        let parser = FilterParser::new(&catalog);
        let err = parser
            .parse_for_collection("colour=C,bogus=1", "NAPL")
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::Schema(SchemaLookupError::UnknownField {
                collection: "NAPL".into(),
                field: "bogus".into()
            })
        );
    }

    #[test]
    fn test_malformed_clauses() {
        let catalog = fixtures::catalog();
        let parser = FilterParser::new(&catalog);
        for bad in ["colour", "=C", "colour=", "colour='C", ".colour=C"] {
            let err = parser.parse_for_collection(bad, "NAPL").unwrap_err();
            assert!(matches!(err, FilterError::Syntax(_)), "{bad}");
        }
        let err = parser
            .parse_for_collection("RCMImageProducts.beam_mnemonic=16M11", "NAPL")
            .unwrap_err();
        assert!(matches!(err, FilterError::Syntax(_)));
    }

    #[test]
    fn test_filter_for_unselected_collection() {
        let catalog = fixtures::catalog();
        let parser = FilterParser::new(&catalog);
        let err = parser
            .parse_command_line("NAPL.colour=C", &["RCMImageProducts".to_string()])
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::Syntax(ValidationError::UnselectedCollection("NAPL".into()))
        );
        let err = parser
            .parse_command_line("Landsat.colour=C", &["NAPL".to_string()])
            .unwrap_err();
        assert!(matches!(err, FilterError::Schema(SchemaLookupError::UnknownCollection(_))));
    }

    #[test]
    fn test_empty_entry_is_distinct_from_absent() {
        let mut spec = FilterSpec::new();
        spec.extend("NAPL", vec![]);
        assert_eq!(spec.get("NAPL"), Some(&[][..]));
        assert_eq!(spec.get("RCMImageProducts"), None);
        assert!(!spec.has_clauses());
        assert!(spec.normalized().is_empty());
        assert_eq!(spec.to_expression(), None);
    }
}
