//! Client-supplied request identifiers.

use uuid::Uuid;

/// A fresh identifier for an oracle request.
///
/// Random (UUID v4), so requests built within the same second never collide.
pub fn next_client_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_in_a_burst() {
        let ids: HashSet<String> = (0..10_000).map(|_| next_client_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_id_fits_chain_limit() {
        let id = next_client_id();
        assert_eq!(id.len(), 32);
        assert!(id.bytes().all(|b| b.is_ascii_hexdigit()));
    }
}
