//! Wire records emitted by `vpn-user-portal-status --json`.
//!
//! Field names are the upstream contract and must not be renamed. Decoding is
//! lenient: unknown fields are ignored and absent (or `null`) fields take
//! their zero value, so schema drift upstream shows up as zeros rather than
//! as scrape failures. [`missing_fields`] offers the strict check on top.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treats an explicit JSON `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One active connection reported under a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ip_list: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub vpn_proto: String,
}

impl ConnectionEntry {
    pub const FIELDS: &'static [&'static str] = &["user_id", "ip_list", "vpn_proto"];

    /// IP addresses joined with `,` in reported order, no escaping.
    pub fn joined_ips(&self) -> String {
        self.ip_list.join(",")
    }
}

/// Status of one VPN profile.
///
/// `active_connection_count`, `max_connection_count`, `percentage_in_use` and
/// `wireguard_percentage_allocated` are decoded for completeness but never
/// exported; the per-protocol counts carry the same information. They are
/// signed so an odd value there cannot fail the scrape. Exported counts are
/// unsigned and reject negatives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub profile_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub active_connection_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub max_connection_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub percentage_in_use: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub openvpn_max_connection_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub openvpn_active_connection_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub wireguard_max_connection_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub wireguard_active_connection_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub wireguard_allocated_ip_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub wireguard_free_ip_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub wireguard_percentage_allocated: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub connection_list: Vec<ConnectionEntry>,
}

impl StatusRecord {
    pub const FIELDS: &'static [&'static str] = &[
        "profile_id",
        "active_connection_count",
        "max_connection_count",
        "percentage_in_use",
        "openvpn_max_connection_count",
        "openvpn_active_connection_count",
        "wireguard_max_connection_count",
        "wireguard_active_connection_count",
        "wireguard_allocated_ip_count",
        "wireguard_free_ip_count",
        "wireguard_percentage_allocated",
        "connection_list",
    ];
}

/// Decoded payload of a single scrape cycle, in upstream order.
pub type ScrapeResult = Vec<StatusRecord>;

/// Lists every expected field absent from an already well-formed payload.
///
/// Paths look like `[1].wireguard_free_ip_count` or
/// `[0].connection_list[2].vpn_proto`. Values of the wrong shape are left to
/// the regular decode to report.
pub fn missing_fields(payload: &Value) -> Vec<String> {
    let mut missing = Vec::new();
    let Some(records) = payload.as_array() else {
        return missing;
    };

    for (index, record) in records.iter().enumerate() {
        let Some(record) = record.as_object() else {
            continue;
        };
        for field in StatusRecord::FIELDS {
            if !record.contains_key(*field) {
                missing.push(format!("[{index}].{field}"));
            }
        }

        let connections = record.get("connection_list").and_then(Value::as_array);
        for (conn_index, conn) in connections.into_iter().flatten().enumerate() {
            let Some(conn) = conn.as_object() else {
                continue;
            };
            for field in ConnectionEntry::FIELDS {
                if !conn.contains_key(*field) {
                    missing.push(format!("[{index}].connection_list[{conn_index}].{field}"));
                }
            }
        }
    }

    missing
}
