//! Tests for strongly-typed identifiers and validated codes

use core_kernel::{CapabilityId, ClaimId, RecordId, SessionId, StageId};
use std::collections::HashSet;
use uuid::Uuid;

mod session_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let ids: HashSet<SessionId> = (0..100).map(|_| SessionId::new()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_from_str_with_and_without_prefix() {
        let uuid = Uuid::new_v4();
        let with_prefix: SessionId = format!("SES-{}", uuid).parse().unwrap();
        let without_prefix: SessionId = uuid.to_string().parse().unwrap();
        assert_eq!(with_prefix, without_prefix);
        assert_eq!(with_prefix.as_uuid(), &uuid);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("SES-not-a-uuid".parse::<SessionId>().is_err());
    }
}

mod record_id_tests {
    use super::*;

    #[test]
    fn test_v7_ids_are_time_ordered() {
        let first = RecordId::new_v7();
        let second = RecordId::new_v7();
        assert!(first.as_uuid() < second.as_uuid() || first.as_uuid() == second.as_uuid());
    }

    #[test]
    fn test_json_is_bare_uuid() {
        let id = RecordId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}

mod code_tests {
    use super::*;

    #[test]
    fn test_claim_id_keeps_insurer_format() {
        let id = ClaimId::new("CLM001-2024-LAKSHMI").unwrap();
        assert_eq!(id.to_string(), "CLM001-2024-LAKSHMI");
    }

    #[test]
    fn test_blank_codes_are_rejected() {
        assert!(ClaimId::new("").is_err());
        assert!(CapabilityId::new("\t").is_err());
        assert!(StageId::new(" ").is_err());
    }

    #[test]
    fn test_codes_order_lexicographically() {
        let mut ids = vec![
            CapabilityId::new("medical_validator").unwrap(),
            CapabilityId::new("billing_validator").unwrap(),
        ];
        ids.sort();
        assert_eq!(ids[0].as_str(), "billing_validator");
    }

    #[test]
    fn test_code_json_roundtrip() {
        let id = StageId::new("specialist_review").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"specialist_review\"");
        let back: StageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
