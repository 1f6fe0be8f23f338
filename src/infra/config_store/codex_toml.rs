//! Usage: Codex config.toml flavor (`[mcp_servers.*]` tables, enabled flag).

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use toml_edit::{Array, DocumentMut, InlineTable, Item, Table, TableLike, Value};

use crate::mcp::{NetworkConfig, ServerConfig, ServerPartition, StdioConfig};

const SERVERS_TABLE: &str = "mcp_servers";
const LEGACY_DISABLED_TABLE: &str = "disabled_mcp_servers";
const ENABLED_KEY: &str = "enabled";

const STDIO_KEYS: &[&str] = &["type", "enabled", "command", "args", "env"];
const NETWORK_KEYS: &[&str] = &["type", "enabled", "url", "headers"];

fn parse_document(bytes: &[u8], hint: &str) -> Result<DocumentMut, String> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| format!("CONFIG_PARSE: {hint} is not UTF-8: {e}"))?;
    text.parse::<DocumentMut>()
        .map_err(|e| format!("CONFIG_PARSE: invalid TOML in {hint}: {e}"))
}

fn string_field(table: &dyn TableLike, key: &str) -> Option<String> {
    table.get(key).and_then(Item::as_str).map(str::to_string)
}

fn string_array(table: &dyn TableLike, key: &str) -> Vec<String> {
    let Some(array) = table.get(key).and_then(Item::as_array) else {
        return Vec::new();
    };
    array
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn string_map(table: &dyn TableLike, key: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let Some(child) = table.get(key).and_then(Item::as_table_like) else {
        return out;
    };
    for (k, item) in child.iter() {
        if let Some(s) = item.as_str() {
            out.insert(k.to_string(), s.to_string());
        }
    }
    out
}

fn toml_item_to_json(item: &Item) -> Option<JsonValue> {
    match item.as_value()? {
        Value::String(s) => Some(JsonValue::String(s.value().clone())),
        Value::Integer(i) => Some(JsonValue::from(*i.value())),
        Value::Float(f) => Some(JsonValue::from(*f.value())),
        Value::Boolean(b) => Some(JsonValue::Bool(*b.value())),
        _ => None,
    }
}

fn json_to_toml_value(value: &JsonValue) -> Option<Value> {
    match value {
        JsonValue::String(s) => Some(Value::from(s.as_str())),
        JsonValue::Bool(b) => Some(Value::from(*b)),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Value::from)
            .or_else(|| n.as_f64().map(Value::from)),
        _ => None,
    }
}

fn collect_extras(
    table: &dyn TableLike,
    known: &[&str],
    name: &str,
    hint: &str,
) -> BTreeMap<String, JsonValue> {
    let mut extras = BTreeMap::new();
    for (key, item) in table.iter() {
        if known.contains(&key) {
            continue;
        }
        match toml_item_to_json(item) {
            Some(value) => {
                extras.insert(key.to_string(), value);
            }
            None => tracing::warn!(
                file = %hint,
                server = %name,
                key = %key,
                "dropping non-scalar extra field"
            ),
        }
    }
    extras
}

fn server_from_table(
    name: &str,
    table: &dyn TableLike,
    hint: &str,
) -> Result<ServerConfig, String> {
    if let Some(command) = string_field(table, "command") {
        return Ok(ServerConfig::Stdio(StdioConfig {
            command,
            args: string_array(table, "args"),
            env: string_map(table, "env"),
            extra: collect_extras(table, STDIO_KEYS, name, hint),
        }));
    }
    if let Some(url) = string_field(table, "url") {
        return Ok(ServerConfig::Network(NetworkConfig {
            url,
            headers: string_map(table, "headers"),
            extra: collect_extras(table, NETWORK_KEYS, name, hint),
        }));
    }
    Err(format!(
        "CONFIG_PARSE: {hint} server '{name}' has neither command nor url"
    ))
}

fn enabled_flag(table: &dyn TableLike) -> bool {
    table
        .get(ENABLED_KEY)
        .and_then(Item::as_bool)
        .unwrap_or(true)
}

fn inline_string_map(map: &BTreeMap<String, String>) -> Value {
    let mut inline = InlineTable::default();
    for (k, v) in map {
        inline.insert(k, Value::from(v.as_str()));
    }
    Value::InlineTable(inline)
}

fn server_to_table(config: &ServerConfig, enabled: bool) -> Table {
    let mut table = Table::new();
    match config {
        ServerConfig::Stdio(stdio) => {
            table.insert("type", toml_edit::value("stdio"));
            table.insert("command", toml_edit::value(stdio.command.as_str()));
            if !stdio.args.is_empty() {
                let mut args = Array::new();
                for arg in &stdio.args {
                    args.push(arg.as_str());
                }
                table.insert("args", toml_edit::value(args));
            }
            if !stdio.env.is_empty() {
                table.insert("env", Item::Value(inline_string_map(&stdio.env)));
            }
            for (key, value) in &stdio.extra {
                if let Some(v) = json_to_toml_value(value) {
                    table.insert(key, Item::Value(v));
                }
            }
        }
        ServerConfig::Network(network) => {
            table.insert("type", toml_edit::value("http"));
            table.insert("url", toml_edit::value(network.url.as_str()));
            if !network.headers.is_empty() {
                table.insert("headers", Item::Value(inline_string_map(&network.headers)));
            }
            for (key, value) in &network.extra {
                if let Some(v) = json_to_toml_value(value) {
                    table.insert(key, Item::Value(v));
                }
            }
        }
    }
    if !enabled {
        table.insert(ENABLED_KEY, toml_edit::value(false));
    }
    table
}

pub(super) fn partition_from_toml(bytes: &[u8], hint: &str) -> Result<ServerPartition, String> {
    let doc = parse_document(bytes, hint)?;

    let mut active = BTreeMap::new();
    let mut disabled = BTreeMap::new();

    if let Some(servers) = doc.get(SERVERS_TABLE).and_then(Item::as_table_like) {
        for (name, item) in servers.iter() {
            let Some(table) = item.as_table_like() else {
                return Err(format!(
                    "CONFIG_PARSE: {hint} server '{name}' is not a table"
                ));
            };
            let config = server_from_table(name, table, hint)?;
            if enabled_flag(table) {
                active.insert(name.to_string(), config);
            } else {
                disabled.insert(name.to_string(), config);
            }
        }
    }

    // Older files kept disabled servers in a separate table; fold them in.
    if let Some(legacy) = doc.get(LEGACY_DISABLED_TABLE).and_then(Item::as_table_like) {
        for (name, item) in legacy.iter() {
            if active.contains_key(name) || disabled.contains_key(name) {
                continue;
            }
            let Some(table) = item.as_table_like() else {
                return Err(format!(
                    "CONFIG_PARSE: {hint} server '{name}' is not a table"
                ));
            };
            disabled.insert(name.to_string(), server_from_table(name, table, hint)?);
        }
    }

    let (partition, dropped) = ServerPartition::reconcile(active, disabled);
    if !dropped.is_empty() {
        tracing::warn!(
            file = %hint,
            dropped = ?dropped,
            "server names present in both states; keeping the active entry"
        );
    }
    Ok(partition)
}

/// Rebuild the `mcp_servers` table from the partition; every other table in
/// the document (model settings, sandbox flags, ...) is left as-is. The
/// legacy disabled table is dropped once its content is represented inline.
pub(super) fn patch_toml(
    current: Option<&[u8]>,
    partition: &ServerPartition,
    hint: &str,
) -> Result<Vec<u8>, String> {
    let mut doc = match current {
        Some(bytes) => parse_document(bytes, hint)?,
        None => DocumentMut::new(),
    };

    doc.remove(LEGACY_DISABLED_TABLE);

    let mut servers = Table::new();
    servers.set_implicit(true);
    for (name, config) in partition.active() {
        servers.insert(name, Item::Table(server_to_table(config, true)));
    }
    for (name, config) in partition.disabled() {
        servers.insert(name, Item::Table(server_to_table(config, false)));
    }
    doc.insert(SERVERS_TABLE, Item::Table(servers));

    Ok(doc.to_string().into_bytes())
}
