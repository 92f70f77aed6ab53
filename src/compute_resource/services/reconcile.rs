//! VM attribute reconciliation.
//!
//! Pure functions that shape a host definition into the parameter tree a
//! backend expects, flatten a live VM back into comparable attributes, and
//! decide whether a desired attribute tree differs materially from an
//! actual one. Each function operates on generic attribute maps; no
//! backend specifics leak in here.

use crate::compute_resource::domain::{AttrMap, HostDefinition, RemoteServer};
use serde_json::Value;

/// Attribute key a backend listing uses for the VM identity.
const IDENTITY_ATTR: &str = "id";

/// Sub-mapping key carrying indexed interface attributes.
const INTERFACES_ATTR: &str = "interfaces_attributes";

/// Sub-mapping key carrying indexed volume attributes.
const VOLUMES_ATTR: &str = "volumes_attributes";

/// Builds the parameter tree sent to a backend when creating or updating a
/// VM from a host definition.
///
/// Carries the VM name, the provisioning method, and an indexed
/// `interfaces_attributes` sub-mapping keyed `"0"`, `"1"`, ... over the
/// host's *physical* interfaces only, each entry being the interface's
/// backend attributes merged with its `ip`/`ip6`.
#[must_use]
pub fn host_compute_attrs(host: &HostDefinition) -> AttrMap {
    let mut attrs = AttrMap::new();
    attrs.insert(
        "name".to_owned(),
        Value::String(host.vm_name().to_owned()),
    );
    attrs.insert(
        "provision_method".to_owned(),
        Value::String(host.provision_method().as_str().to_owned()),
    );
    attrs.insert(
        INTERFACES_ATTR.to_owned(),
        Value::Object(host_interfaces_attrs(host)),
    );
    attrs
}

/// Indexes the host's physical interfaces by position.
fn host_interfaces_attrs(host: &HostDefinition) -> AttrMap {
    host.interfaces()
        .iter()
        .filter(|interface| interface.physical())
        .enumerate()
        .map(|(index, interface)| {
            let mut merged = interface.compute_attributes().clone();
            merged.insert("ip".to_owned(), optional_string(interface.ip()));
            merged.insert("ip6".to_owned(), optional_string(interface.ip6()));
            (index.to_string(), Value::Object(merged))
        })
        .collect()
}

fn optional_string(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |inner| Value::String(inner.to_owned()))
}

/// Flattens a live VM into the attribute tree compared against a host's
/// desired attributes.
///
/// The backend identity field is dropped, and when the VM exposes a volume
/// collection an indexed `volumes_attributes` sub-mapping is injected the
/// same way interfaces are indexed on the way in.
#[must_use]
pub fn vm_compute_attrs(vm: &RemoteServer) -> AttrMap {
    let mut attrs: AttrMap = vm
        .attributes()
        .iter()
        .filter(|(key, _)| key.as_str() != IDENTITY_ATTR)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if let Some(volumes) = vm.volumes() {
        let indexed: AttrMap = volumes
            .iter()
            .enumerate()
            .map(|(index, volume)| {
                (index.to_string(), Value::Object(volume.attributes().clone()))
            })
            .collect();
        attrs.insert(VOLUMES_ATTR.to_owned(), Value::Object(indexed));
    }

    attrs
}

/// Decides whether `new` differs materially from `old`.
///
/// Full-depth recursive comparison with early exit: any key present in
/// `new` whose value is absent from `old` or differs at any nesting depth
/// (type mismatches included) is a difference. Keys present only in `old`
/// are not; a re-apply never needs to remove what the caller no longer
/// mentions.
#[must_use]
pub fn attrs_differ(old: &AttrMap, new: &AttrMap) -> bool {
    new.iter().any(|(key, new_value)| {
        old.get(key)
            .is_none_or(|old_value| value_differs(old_value, new_value))
    })
}

fn value_differs(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => attrs_differ(old_map, new_map),
        _ => old != new,
    }
}

/// Parses an ordered, possibly sparse UI-submitted collection (disks,
/// interfaces, volumes) into a sequence of attribute maps.
///
/// The `new_<kind>` template placeholder is removed, entries are ordered
/// numerically by the leading digits of their key (a non-numeric key sorts
/// as zero), and entries flagged for deletion that carry no existing
/// identity are dropped. Relative order of surviving entries is preserved.
#[must_use]
pub fn parse_nested_params(kind: &str, raw: &AttrMap) -> Vec<AttrMap> {
    let template_key = format!("new_{kind}");

    let mut entries: Vec<(i64, AttrMap)> = raw
        .iter()
        .filter(|(key, _)| key.as_str() != template_key)
        .filter_map(|(key, value)| {
            value
                .as_object()
                .map(|entry| (leading_number(key), entry.clone()))
        })
        .collect();
    entries.sort_by_key(|(position, _)| *position);

    entries
        .into_iter()
        .map(|(_, entry)| entry)
        .filter(|entry| !deleted_without_identity(entry))
        .collect()
}

/// Numeric prefix of a key, zero when the key does not start with digits.
fn leading_number(key: &str) -> i64 {
    let digits: String = key.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Whether an entry is flagged for deletion while carrying no identity.
///
/// Entries with an identity stay in the sequence even when flagged; the
/// surrounding system needs them to issue the actual delete.
fn deleted_without_identity(entry: &AttrMap) -> bool {
    let flagged = match entry.get("_delete") {
        Some(Value::String(flag)) => flag == "1",
        Some(Value::Bool(flag)) => *flag,
        _ => false,
    };
    if !flagged {
        return false;
    }

    let has_identity = match entry.get(IDENTITY_ATTR) {
        None | Some(Value::Null) => false,
        Some(Value::String(id)) => !id.is_empty(),
        Some(_) => true,
    };
    !has_identity
}
