//! Turns raw status output into metric samples.
//!
//! Decoding happens in two steps so operators can tell broken output
//! (not JSON at all) apart from JSON of an unexpected shape. Projection
//! only runs on a fully decoded payload and cannot fail.

use crate::application::scrape::tracker::UniqueUserTracker;
use crate::domain::errors::ScrapeError;
use crate::domain::metrics::{MetricKind, MetricSample, PROTO_OPENVPN, PROTO_WIREGUARD};
use crate::domain::ports::MetricSink;
use crate::domain::status::{ScrapeResult, StatusRecord, missing_fields};
use serde_json::Value;

/// How strictly the payload shape is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// Missing fields decode as zero.
    #[default]
    Lenient,
    /// Every expected field must be present.
    Strict,
}

#[derive(Debug, Default)]
pub struct MetricTranslator {
    tracker: UniqueUserTracker,
    mode: DecodeMode,
}

impl MetricTranslator {
    pub fn new(mode: DecodeMode) -> Self {
        Self {
            tracker: UniqueUserTracker::new(),
            mode,
        }
    }

    pub fn tracker(&self) -> &UniqueUserTracker {
        &self.tracker
    }

    /// Validates and decodes one payload.
    ///
    /// Nesting deeper than serde_json's recursion limit (128) cannot be
    /// decoded. It is reported as a schema error, since the text may well be
    /// valid JSON; the part past the limit is not checked.
    pub fn decode(&self, raw: &[u8]) -> Result<ScrapeResult, ScrapeError> {
        let payload: Value = serde_json::from_slice(raw).map_err(|err| {
            if is_too_deep(&err) {
                ScrapeError::SchemaDecode {
                    reason: err.to_string(),
                }
            } else {
                ScrapeError::MalformedOutput(err)
            }
        })?;

        if self.mode == DecodeMode::Strict {
            let missing = missing_fields(&payload);
            if !missing.is_empty() {
                return Err(ScrapeError::SchemaDecode {
                    reason: format!("missing fields: {}", missing.join(", ")),
                });
            }
        }

        Ok(serde_json::from_value(payload)?)
    }

    /// Emits every sample for `records` in order, finishing with the
    /// cumulative unique-user count. Returns the number of samples emitted.
    pub fn project(&self, records: &[StatusRecord], sink: &mut dyn MetricSink) -> usize {
        let mut emitted = 0;
        let mut emit = |sample: MetricSample| {
            sink.emit(sample);
            emitted += 1;
        };

        for record in records {
            let profile = record.profile_id.as_str();

            emit(MetricSample::per_profile(
                MetricKind::MaxConnections,
                record.openvpn_max_connection_count,
                profile,
                PROTO_OPENVPN,
            ));
            emit(MetricSample::per_profile(
                MetricKind::MaxConnections,
                record.wireguard_max_connection_count,
                profile,
                PROTO_WIREGUARD,
            ));
            emit(MetricSample::per_profile(
                MetricKind::ActiveConnections,
                record.openvpn_active_connection_count,
                profile,
                PROTO_OPENVPN,
            ));
            emit(MetricSample::per_profile(
                MetricKind::ActiveConnections,
                record.wireguard_active_connection_count,
                profile,
                PROTO_WIREGUARD,
            ));
            // OpenVPN has no address pool to report.
            emit(MetricSample::per_profile(
                MetricKind::AllocatedIps,
                record.wireguard_allocated_ip_count,
                profile,
                PROTO_WIREGUARD,
            ));
            emit(MetricSample::per_profile(
                MetricKind::FreeIps,
                record.wireguard_free_ip_count,
                profile,
                PROTO_WIREGUARD,
            ));

            for conn in &record.connection_list {
                emit(MetricSample::new(
                    MetricKind::ConnectionList,
                    1.0,
                    vec![
                        profile.to_string(),
                        conn.user_id.clone(),
                        conn.joined_ips(),
                        conn.vpn_proto.clone(),
                    ],
                ));

                if self.tracker.observe(&conn.user_id) {
                    tracing::debug!(profile, user_id = %conn.user_id, "New unique user observed");
                }
            }
        }

        emit(MetricSample::new(
            MetricKind::UniqueUsers,
            self.tracker.count() as f64,
            Vec::new(),
        ));

        emitted
    }
}

/// serde_json exposes no error code for this case, only its message.
fn is_too_deep(err: &serde_json::Error) -> bool {
    err.is_syntax() && err.to_string().starts_with("recursion limit exceeded")
}
