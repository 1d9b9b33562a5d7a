//! Block-structured configuration text built from models.
//!
//! Attributes render sorted by name. Objects become nested blocks, lists of
//! objects become repeated blocks, and `depends_on` always comes last.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub enum Variable {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Variable>),
    Object(BTreeMap<String, Variable>),
    /// Emitted verbatim, e.g. a reference to another object's attribute.
    Raw(String),
}

impl Variable {
    pub fn string(value: impl Into<String>) -> Self {
        Variable::String(value.into())
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Variable>,
    {
        Variable::List(items.into_iter().map(Into::into).collect())
    }

    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Variable)>,
        K: Into<String>,
    {
        Variable::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn raw(expression: impl Into<String>) -> Self {
        Variable::Raw(expression.into())
    }

    /// JSON form, as the provider receives configuration values.
    pub fn to_json(&self) -> Value {
        match self {
            Variable::String(s) | Variable::Raw(s) => Value::String(s.clone()),
            Variable::Int(n) => Value::from(*n),
            Variable::Bool(b) => Value::Bool(*b),
            Variable::List(items) => Value::Array(items.iter().map(Variable::to_json).collect()),
            Variable::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    fn is_block(&self) -> bool {
        matches!(self, Variable::Object(_))
    }
}

impl From<&str> for Variable {
    fn from(s: &str) -> Self {
        Variable::String(s.to_string())
    }
}

impl From<String> for Variable {
    fn from(s: String) -> Self {
        Variable::String(s)
    }
}

impl From<bool> for Variable {
    fn from(b: bool) -> Self {
        Variable::Bool(b)
    }
}

impl From<i64> for Variable {
    fn from(n: i64) -> Self {
        Variable::Int(n)
    }
}

impl From<i32> for Variable {
    fn from(n: i32) -> Self {
        Variable::Int(n.into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Resource,
    DataSource,
}

impl ModelKind {
    fn keyword(&self) -> &'static str {
        match self {
            ModelKind::Resource => "resource",
            ModelKind::DataSource => "data",
        }
    }
}

/// Kind, type, local name and explicit dependencies shared by every model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelMeta {
    pub kind: ModelKind,
    pub type_name: &'static str,
    pub name: String,
    pub depends_on: Vec<String>,
}

impl ModelMeta {
    pub const DEFAULT_NAME: &'static str = "test";

    pub fn data_source(type_name: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind: ModelKind::DataSource,
            type_name,
            name: name.into(),
            depends_on: Vec::new(),
        }
    }

    pub fn resource(type_name: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind: ModelKind::Resource,
            type_name,
            name: name.into(),
            depends_on: Vec::new(),
        }
    }

    /// Address other objects use to reference this one.
    pub fn address(&self) -> String {
        match self.kind {
            ModelKind::Resource => format!("{}.{}", self.type_name, self.name),
            ModelKind::DataSource => format!("data.{}.{}", self.type_name, self.name),
        }
    }
}

pub trait Model {
    fn meta(&self) -> &ModelMeta;

    /// Set attributes only; unset ones are omitted from the output.
    fn variables(&self) -> BTreeMap<String, Variable>;

    /// Attributes as the JSON values a provider operation receives.
    fn values(&self) -> Map<String, Value> {
        self.variables()
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

/// Collects the set `Option<Variable>` fields of a model.
pub(crate) fn collect_set<'a, I>(fields: I) -> BTreeMap<String, Variable>
where
    I: IntoIterator<Item = (&'a str, &'a Option<Variable>)>,
{
    fields
        .into_iter()
        .filter_map(|(k, v)| v.clone().map(|v| (k.to_string(), v)))
        .collect()
}

/// Render every model, separated by an empty line.
pub fn from_models(models: &[&dyn Model]) -> String {
    models
        .iter()
        .map(|m| render_model(*m))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_model(model: &dyn Model) -> String {
    let meta = model.meta();
    let mut out = format!(
        "{} \"{}\" \"{}\" {{\n",
        meta.kind.keyword(),
        meta.type_name,
        meta.name
    );
    render_body(&mut out, &model.variables(), 1);
    if !meta.depends_on.is_empty() {
        out.push_str(&format!("  depends_on = [{}]\n", meta.depends_on.join(", ")));
    }
    out.push_str("}\n");
    out
}

fn render_body(out: &mut String, variables: &BTreeMap<String, Variable>, depth: usize) {
    let indent = "  ".repeat(depth);
    for (key, value) in variables {
        match value {
            Variable::Object(entries) => render_block(out, key, entries, depth),
            Variable::List(items) if !items.is_empty() && items.iter().all(Variable::is_block) => {
                for item in items {
                    if let Variable::Object(entries) = item {
                        render_block(out, key, entries, depth);
                    }
                }
            }
            other => out.push_str(&format!("{}{} = {}\n", indent, key, inline(other))),
        }
    }
}

fn render_block(out: &mut String, key: &str, entries: &BTreeMap<String, Variable>, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{}{} {{\n", indent, key));
    render_body(out, entries, depth + 1);
    out.push_str(&format!("{}}}\n", indent));
}

fn inline(value: &Variable) -> String {
    match value {
        Variable::String(s) => format!("\"{}\"", escape(s)),
        Variable::Int(n) => n.to_string(),
        Variable::Bool(b) => b.to_string(),
        Variable::Raw(expr) => expr.clone(),
        Variable::List(items) => {
            let rendered: Vec<String> = items.iter().map(inline).collect();
            format!("[{}]", rendered.join(", "))
        }
        Variable::Object(entries) => {
            let rendered: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{} = {}", k, inline(v)))
                .collect();
            format!("{{ {} }}", rendered.join(", "))
        }
    }
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain {
        meta: ModelMeta,
        variables: BTreeMap<String, Variable>,
    }

    impl Model for Plain {
        fn meta(&self) -> &ModelMeta {
            &self.meta
        }

        fn variables(&self) -> BTreeMap<String, Variable> {
            self.variables.clone()
        }
    }

    #[test]
    fn renders_sorted_keys_blocks_and_depends_on_last() {
        let mut meta = ModelMeta::resource("snowflake_network_rule", "rule");
        meta.depends_on = vec!["snowflake_database.db".into()];
        let model = Plain {
            meta,
            variables: BTreeMap::from([
                ("value_list".to_string(), Variable::list(["0.0.0.0"])),
                ("comment".to_string(), Variable::string("say \"hi\"")),
                (
                    "limit".to_string(),
                    Variable::list([Variable::object([("rows", Variable::Int(1))])]),
                ),
            ]),
        };
        let expected = "resource \"snowflake_network_rule\" \"rule\" {\n  comment = \"say \\\"hi\\\"\"\n  limit {\n    rows = 1\n  }\n  value_list = [\"0.0.0.0\"]\n  depends_on = [snowflake_database.db]\n}\n";
        assert_eq!(from_models(&[&model]), expected);
    }

    #[test]
    fn models_are_separated_by_a_blank_line() {
        let a = Plain {
            meta: ModelMeta::data_source("snowflake_users", "a"),
            variables: BTreeMap::new(),
        };
        let b = Plain {
            meta: ModelMeta::data_source("snowflake_users", "b"),
            variables: BTreeMap::new(),
        };
        assert_eq!(
            from_models(&[&a, &b]),
            "data \"snowflake_users\" \"a\" {\n}\n\ndata \"snowflake_users\" \"b\" {\n}\n"
        );
        assert_eq!(a.meta.address(), "data.snowflake_users.a");
    }

    #[test]
    fn values_mirror_variables_as_json() {
        let model = Plain {
            meta: ModelMeta::data_source("snowflake_grants", "g"),
            variables: BTreeMap::from([(
                "grants_on".to_string(),
                Variable::object([("account", Variable::Bool(true))]),
            )]),
        };
        assert_eq!(
            Value::Object(model.values()),
            serde_json::json!({"grants_on": {"account": true}})
        );
    }
}
