use keystone_dns_domain::RecordType;

/// Conversions between our supported record types and the wire-level type
/// registry.
pub struct RecordTypeMapper;

impl RecordTypeMapper {
    pub fn to_wire(record_type: RecordType) -> hickory_proto::rr::RecordType {
        hickory_proto::rr::RecordType::from(record_type.to_u16())
    }

    /// `None` for anything outside the supported set; the frontend answers
    /// those questions with an empty set.
    pub fn from_wire(record_type: hickory_proto::rr::RecordType) -> Option<RecordType> {
        RecordType::from_u16(u16::from(record_type))
    }
}
