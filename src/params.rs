//! The validated parameter set for one session.
use crate::filters::FilterSpec;
use crate::geo::Aoi;
use crate::validate::{DateRange, Maximum, OrderItemSet, Priority, RecordIdSet};
use crate::workflow::Workflow;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Parameter names, in the order the command line is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Param {
    Process,
    InputVal,
    Collections,
    Filters,
    Dates,
    Maximum,
    Priority,
    Output,
    Aws,
    Overlap,
    Orderitems,
    NoOrder,
    Downloads,
}

impl Param {
    pub const ALL: [Param; 13] = [
        Param::Process,
        Param::InputVal,
        Param::Collections,
        Param::Filters,
        Param::Dates,
        Param::Maximum,
        Param::Priority,
        Param::Output,
        Param::Aws,
        Param::Overlap,
        Param::Orderitems,
        Param::NoOrder,
        Param::Downloads,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::InputVal => "input_val",
            Self::Collections => "collections",
            Self::Filters => "filters",
            Self::Dates => "dates",
            Self::Maximum => "maximum",
            Self::Priority => "priority",
            Self::Output => "output",
            Self::Aws => "aws",
            Self::Overlap => "overlap",
            Self::Orderitems => "orderitems",
            Self::NoOrder => "no_order",
            Self::Downloads => "downloads",
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What `--input_val` holds depends on the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    Aoi(Aoi),
    Csv(PathBuf),
    RecordIds(RecordIdSet),
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aoi(aoi) => write!(f, "{}", aoi),
            Self::Csv(path) => write!(f, "{}", path.display()),
            Self::RecordIds(ids) => write!(f, "{}", ids),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Process(Workflow),
    InputVal(InputValue),
    Collections(Vec<String>),
    Filters(FilterSpec),
    Dates(DateRange),
    Maximum(Maximum),
    Priority(Priority),
    Output(String),
    Aws(bool),
    Overlap(u8),
    Orderitems(OrderItemSet),
    NoOrder(bool),
    Downloads(PathBuf),
}

impl ParamValue {
    pub fn param(&self) -> Param {
        match self {
            Self::Process(_) => Param::Process,
            Self::InputVal(_) => Param::InputVal,
            Self::Collections(_) => Param::Collections,
            Self::Filters(_) => Param::Filters,
            Self::Dates(_) => Param::Dates,
            Self::Maximum(_) => Param::Maximum,
            Self::Priority(_) => Param::Priority,
            Self::Output(_) => Param::Output,
            Self::Aws(_) => Param::Aws,
            Self::Overlap(_) => Param::Overlap,
            Self::Orderitems(_) => Param::Orderitems,
            Self::NoOrder(_) => Param::NoOrder,
            Self::Downloads(_) => Param::Downloads,
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Process(w) => w.serialize(serializer),
            Self::InputVal(v) => serializer.serialize_str(&v.to_string()),
            Self::Collections(c) => c.serialize(serializer),
            Self::Filters(f) => f.serialize(serializer),
            Self::Dates(d) => serializer.serialize_str(&d.to_string()),
            Self::Maximum(m) => serializer.serialize_str(&m.to_string()),
            Self::Priority(p) => serializer.serialize_str(&p.to_string()),
            Self::Output(o) => serializer.serialize_str(o),
            Self::Aws(b) | Self::NoOrder(b) => serializer.serialize_bool(*b),
            Self::Overlap(o) => serializer.serialize_u8(*o),
            Self::Orderitems(o) => serializer.serialize_str(&o.to_string()),
            Self::Downloads(d) => d.serialize(serializer),
        }
    }
}

/// Every value in the store has already been through its validator; the
/// store itself does not validate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterStore {
    values: BTreeMap<Param, ParamValue>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, param: Param) -> Option<&ParamValue> {
        self.values.get(&param)
    }

    pub fn set(&mut self, value: ParamValue) {
        self.values.insert(value.param(), value);
    }

    pub fn remove(&mut self, param: Param) -> Option<ParamValue> {
        self.values.remove(&param)
    }

    pub fn as_mapping(&self) -> &BTreeMap<Param, ParamValue> {
        &self.values
    }

    pub fn workflow(&self) -> Option<Workflow> {
        match self.get(Param::Process) {
            Some(ParamValue::Process(w)) => Some(*w),
            _ => None,
        }
    }

    pub fn collections(&self) -> &[String] {
        match self.get(Param::Collections) {
            Some(ParamValue::Collections(c)) => c,
            _ => &[],
        }
    }

    pub fn filters(&self) -> Option<&FilterSpec> {
        match self.get(Param::Filters) {
            Some(ParamValue::Filters(f)) => Some(f),
            _ => None,
        }
    }

    pub fn input(&self) -> Option<&InputValue> {
        match self.get(Param::InputVal) {
            Some(ParamValue::InputVal(v)) => Some(v),
            _ => None,
        }
    }

    pub fn no_order(&self) -> bool {
        matches!(self.get(Param::NoOrder), Some(ParamValue::NoOrder(true)))
    }

    /// The set as the command line would give it back: empty filter entries dropped.
    pub fn normalized(&self) -> Self {
        let mut store = self.clone();
        if let Some(spec) = self.filters() {
            let spec = spec.normalized();
            if spec.is_empty() {
                store.remove(Param::Filters);
            } else {
                store.set(ParamValue::Filters(spec));
            }
        }
        store
    }
}

impl Serialize for ParameterStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (param, value) in &self.values {
            map.serialize_entry(param.name(), value)?;
        }
        map.end()
    }
}
