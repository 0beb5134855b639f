//! Record identifiers. Both entity kinds are keyed by UUID v4; parsing happens at the
//! route boundary, where an unparseable id is treated the same as an unknown one.

use uuid::Uuid;

pub type RecordId = Uuid;

pub fn new_record_id() -> RecordId {
    Uuid::new_v4()
}

/// Parse a path segment into a record id. `None` means "no such record".
pub fn parse_record_id(raw: &str) -> Option<RecordId> {
    Uuid::parse_str(raw.trim()).ok()
}
