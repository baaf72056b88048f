//! Rebuilds a command line that runs the same parameters silently.
use crate::flags::FlagRegistry;
use crate::params::{ParamValue, ParameterStore};

pub const SYNTAX_HEADER: &str = "Use this command-line syntax to run the same parameters:";

fn quote_if(value: &str, special: impl Fn(char) -> bool) -> String {
    if value.chars().any(special) {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

fn quote_list_item(value: &str) -> String {
    quote_if(value, char::is_whitespace)
}

fn quote_string(value: &str) -> String {
    quote_if(value, |c| c.is_whitespace() || c == '|')
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandSerializer {
    flags: FlagRegistry,
}

impl CommandSerializer {
    pub fn new(flags: FlagRegistry) -> Self {
        Self { flags }
    }

    /// `None` means the value is left off the command line.
    fn render_value(value: &ParamValue) -> Option<String> {
        let rendered = match value {
            ParamValue::Process(w) => w.as_str().to_string(),
            ParamValue::InputVal(v) => quote_string(&v.to_string()),
            ParamValue::Collections(c) => c
                .iter()
                .map(|c| quote_list_item(c))
                .collect::<Vec<_>>()
                .join(","),
            ParamValue::Filters(spec) => format!("\"{}\"", spec.to_expression()?),
            ParamValue::Dates(d) => d
                .parts()
                .iter()
                .map(|p| quote_list_item(p))
                .collect::<Vec<_>>()
                .join("-"),
            ParamValue::Maximum(m) => quote_string(&m.to_string()),
            ParamValue::Priority(p) => p.to_string(),
            ParamValue::Output(o) => quote_string(o),
            ParamValue::Aws(b) | ParamValue::NoOrder(b) => {
                if !*b {
                    return None;
                }
                String::new()
            }
            ParamValue::Overlap(o) => o.to_string(),
            ParamValue::Orderitems(o) => quote_string(&o.to_string()),
            ParamValue::Downloads(d) => quote_string(&d.display().to_string()),
        };
        Some(rendered)
    }

    /// `<program> <flag> <value> ... -s`, in registry order.
    pub fn render(&self, program: &str, store: &ParameterStore) -> String {
        let mut parts = vec![program.to_string()];
        for (param, value) in store.as_mapping() {
            let Some(rendered) = Self::render_value(value) else {
                continue;
            };
            let Some(flag) = self.flags.for_param(*param) else {
                continue;
            };
            parts.push(flag.render.to_string());
            if !rendered.is_empty() {
                parts.push(rendered);
            }
        }
        parts.push("-s".to_string());
        parts.join(" ")
    }

    /// The block printed before a workflow starts.
    pub fn syntax_block(&self, program: &str, store: &ParameterStore) -> String {
        format!("\n{}\n{}", SYNTAX_HEADER, self.render(program, store))
    }
}
