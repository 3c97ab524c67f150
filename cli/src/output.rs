//! Output formatting

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Parses a `default_format` value from the config file
    pub fn from_config(value: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(value, true)
            .map_err(|_| anyhow::anyhow!("unknown output format in config: {}", value))
    }

    pub fn render<T: Serialize>(&self, data: &T) -> Result<String> {
        Ok(match self {
            OutputFormat::Json => serde_json::to_string_pretty(data)?,
            OutputFormat::Yaml => serde_yaml::to_string(data)?,
            OutputFormat::Table => table(&serde_json::to_value(data)?),
        })
    }

    pub fn print<T: Serialize>(&self, data: &T) -> Result<()> {
        println!("{}", self.render(data)?);
        Ok(())
    }
}

/// A list of records becomes one table with a column per key seen in any
/// record. A single record becomes a two-column key/value table.
fn table(value: &Value) -> String {
    match value {
        Value::Array(items) => list_table(items),
        Value::Object(fields) => {
            let mut builder = Builder::default();
            for (key, value) in fields {
                builder.push_record([key.clone(), scalar(value)]);
            }
            styled(builder)
        }
        other => scalar(other),
    }
}

fn list_table(items: &[Value]) -> String {
    let mut columns: Vec<&String> = Vec::new();
    for fields in items.iter().filter_map(Value::as_object) {
        for key in fields.keys() {
            if !columns.contains(&key) {
                columns.push(key);
            }
        }
    }

    let mut builder = Builder::default();
    if columns.is_empty() {
        for item in items {
            builder.push_record([scalar(item)]);
        }
        return styled(builder);
    }

    builder.push_record(columns.iter().map(|key| key.to_string()));
    for item in items {
        builder.push_record(
            columns
                .iter()
                .map(|key| item.get(key.as_str()).map(scalar).unwrap_or_default()),
        );
    }
    styled(builder)
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "<none>".to_string(),
        other => other.to_string(),
    }
}
