//! Legacy backend conversion.
//!
//! When a legacy backend kind is configured, a record transparently moves
//! from the old format to the active one on first access: copy through the
//! active mapper, then delete the legacy copy only once the new copy is
//! durable. The conversion is at-least-once and idempotent; any failure
//! leaves both copies intact and the next initialization retries.

use crate::factory::MapperFactory;
use crate::mapper::Mapper;
use crate::params::MapperParams;
use tracing::{debug, info, warn};

/// Converts the record at `mapper`'s current query from the configured
/// legacy backend.
///
/// Returns `true` when a copy completed during this call. Does nothing when
/// no legacy kind is configured, when the legacy kind equals the active
/// mapper's own kind (copying onto itself would destroy the record just
/// written), or when no legacy copy exists.
pub fn convert(factory: &MapperFactory, mapper: &mut dyn Mapper, params: &MapperParams) -> bool {
    let Some(legacy_kind) = factory.config().legacy_kind else {
        return false;
    };
    if legacy_kind == mapper.kind() {
        debug!(kind = %legacy_kind, "legacy kind matches active kind, skipping conversion");
        return false;
    }
    let Some(query) = mapper.current_query().map(str::to_owned) else {
        return false;
    };

    let mut legacy = factory.create(Some(legacy_kind));
    legacy.init(params);
    legacy.select(&query);
    if !legacy.exists() {
        return false;
    }

    info!(%query, from = %legacy_kind, to = %mapper.kind(), "converting record from legacy backend");
    let data = legacy.record();
    mapper.set_record(data);
    if !mapper.modify() {
        warn!(%query, "conversion write failed, legacy copy kept");
        return false;
    }
    if !legacy.delete() {
        warn!(%query, "legacy copy not fully removed after conversion");
    }
    true
}
