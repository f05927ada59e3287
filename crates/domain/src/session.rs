use uuid::Uuid;

/// Derive a stable session id for a (service, environment) pair.
///
/// Uses uuid v5 over `NAMESPACE_URL` with the name
/// `"arecibo:{service}:{env}"`, so the derivation is deterministic
/// byte for byte: two agents announcing the same service in the same
/// environment always derive the same session id, with no
/// coordination or persisted state required.
pub fn derive_session_id(service_name: &str, environment: &str) -> String {
    let name = format!("arecibo:{service_name}:{environment}");
    Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_session_id_is_stable() {
        let a = derive_session_id("demo-service", "local");
        let b = derive_session_id("demo-service", "local");
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_session_id_differs_by_environment() {
        let local = derive_session_id("demo-service", "local");
        let prod = derive_session_id("demo-service", "production");
        assert_ne!(local, prod);
    }

    #[test]
    fn test_derive_session_id_is_valid_uuid() {
        let id = derive_session_id("demo-service", "local");
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
