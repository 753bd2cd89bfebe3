use uuid::Uuid;

/// Deterministic UUIDv5 from an arbitrary string id.
///
/// Used for chunk identity: the same `(source, text)` pair always maps to the
/// same point id, so re-ingesting unchanged content upserts in place instead
/// of accumulating duplicates.
pub fn stable_uuid(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

/// Random UUIDv4 for pipeline job ids.
pub fn new_job_id() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_uuid_is_deterministic() {
        assert_eq!(stable_uuid("sample|Ahri"), stable_uuid("sample|Ahri"));
        assert_ne!(stable_uuid("sample|Ahri"), stable_uuid("sample|Yasuo"));
    }
}
