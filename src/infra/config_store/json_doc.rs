//! Usage: JSON config flavors (split-map, disabled-flag, active-flag).

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::mcp::{ServerConfig, ServerPartition};

const ACTIVE_KEY: &str = "mcpServers";
const DISABLED_KEY: &str = "__disabled";
const DISABLED_FLAG: &str = "disabled";
const ACTIVE_FLAG: &str = "isActive";

/// JSON representations of the disabled half of the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum JsonFlavor {
    /// `mcpServers` + `__disabled` maps.
    Split,
    /// One map; disabled entries carry `"disabled": true` (cline, roo_code).
    DisabledFlag,
    /// One map; disabled entries carry `"isActive": false` (cherrystudio).
    ActiveFlag,
}

fn parse_root(bytes: &[u8], hint: &str) -> Result<Map<String, Value>, String> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| format!("CONFIG_PARSE: invalid JSON in {hint}: {e}"))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(format!("CONFIG_PARSE: {hint} root is not an object")),
    }
}

fn take_object(
    root: &mut Map<String, Value>,
    key: &str,
    hint: &str,
) -> Result<Map<String, Value>, String> {
    match root.remove(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(format!("CONFIG_PARSE: {hint} key '{key}' is not an object")),
    }
}

fn entry_from_value(name: &str, value: Value, hint: &str) -> Result<ServerConfig, String> {
    serde_json::from_value(value)
        .map_err(|e| format!("CONFIG_PARSE: {hint} server '{name}' has an invalid config: {e}"))
}

fn entry_to_object(name: &str, config: &ServerConfig) -> Result<Map<String, Value>, String> {
    match serde_json::to_value(config) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) => Err(format!(
            "CONFIG_PARSE: failed to serialize server '{name}'"
        )),
    }
}

/// Pop the flavor's marker from a raw entry; returns whether it marks the
/// entry as disabled.
fn take_disabled_marker(flavor: JsonFlavor, entry: &mut Value) -> bool {
    let Some(obj) = entry.as_object_mut() else {
        return false;
    };
    match flavor {
        JsonFlavor::Split => false,
        JsonFlavor::DisabledFlag => obj
            .remove(DISABLED_FLAG)
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        JsonFlavor::ActiveFlag => obj
            .remove(ACTIVE_FLAG)
            .and_then(|v| v.as_bool())
            .map(|active| !active)
            .unwrap_or(false),
    }
}

pub(super) fn partition_from_json(
    bytes: &[u8],
    flavor: JsonFlavor,
    hint: &str,
) -> Result<ServerPartition, String> {
    let mut root = parse_root(bytes, hint)?;
    let servers = take_object(&mut root, ACTIVE_KEY, hint)?;
    let split_disabled = take_object(&mut root, DISABLED_KEY, hint)?;

    let mut active = BTreeMap::new();
    let mut disabled = BTreeMap::new();

    for (name, mut value) in servers {
        let flagged_off = take_disabled_marker(flavor, &mut value);
        let config = entry_from_value(&name, value, hint)?;
        if flagged_off {
            disabled.insert(name, config);
        } else {
            active.insert(name, config);
        }
    }

    // A `__disabled` map in a flag-flavor file is a leftover from the split
    // representation; fold it in instead of dropping it.
    for (name, value) in split_disabled {
        disabled.insert(name.clone(), entry_from_value(&name, value, hint)?);
    }

    let (partition, dropped) = ServerPartition::reconcile(active, disabled);
    if !dropped.is_empty() {
        tracing::warn!(
            file = %hint,
            dropped = ?dropped,
            "server names present in both maps; keeping the active entry"
        );
    }
    Ok(partition)
}

/// Materialize the partition into the file's JSON root. Foreign top-level
/// keys in the existing document survive untouched.
pub(super) fn patch_json(
    current: Option<&[u8]>,
    flavor: JsonFlavor,
    partition: &ServerPartition,
    hint: &str,
) -> Result<Vec<u8>, String> {
    let mut root = match current {
        Some(bytes) => parse_root(bytes, hint)?,
        None => Map::new(),
    };

    match flavor {
        JsonFlavor::Split => {
            let mut servers = Map::new();
            for (name, config) in partition.active() {
                servers.insert(name.clone(), Value::Object(entry_to_object(name, config)?));
            }
            let mut off = Map::new();
            for (name, config) in partition.disabled() {
                off.insert(name.clone(), Value::Object(entry_to_object(name, config)?));
            }
            root.insert(ACTIVE_KEY.to_string(), Value::Object(servers));
            root.insert(DISABLED_KEY.to_string(), Value::Object(off));
        }
        JsonFlavor::DisabledFlag | JsonFlavor::ActiveFlag => {
            let mut servers = Map::new();
            for (name, config) in partition.active() {
                servers.insert(name.clone(), Value::Object(entry_to_object(name, config)?));
            }
            for (name, config) in partition.disabled() {
                let mut obj = entry_to_object(name, config)?;
                match flavor {
                    JsonFlavor::DisabledFlag => obj.insert(DISABLED_FLAG.to_string(), Value::Bool(true)),
                    JsonFlavor::ActiveFlag => obj.insert(ACTIVE_FLAG.to_string(), Value::Bool(false)),
                    JsonFlavor::Split => unreachable!(),
                };
                servers.insert(name.clone(), Value::Object(obj));
            }
            root.insert(ACTIVE_KEY.to_string(), Value::Object(servers));
            // Migrated files keep a single representation.
            root.remove(DISABLED_KEY);
        }
    }

    let mut out = serde_json::to_vec_pretty(&Value::Object(root))
        .map_err(|e| format!("CONFIG_PARSE: failed to serialize {hint}: {e}"))?;
    out.push(b'\n');
    Ok(out)
}
