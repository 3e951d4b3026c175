//! Unit tests for the identifier newtypes
//!
//! Tests cover creation, parsing, conversion and display formatting.

use core_kernel::{CustomerId, InvoiceId, LineItemId};
use uuid::Uuid;

mod invoice_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = InvoiceId::new();
        let id2 = InvoiceId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = InvoiceId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = InvoiceId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(InvoiceId::prefix(), "IVC");
    }

    #[test]
    fn test_display_round_trip() {
        let id = InvoiceId::new();
        let parsed: InvoiceId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_invalid() {
        let result: Result<InvoiceId, _> = "IVC-not-a-uuid".parse();
        assert!(result.is_err());
    }
}

mod other_id_tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(CustomerId::prefix(), "CUS");
        assert_eq!(LineItemId::prefix(), "ITM");
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = CustomerId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_default_is_random() {
        assert_ne!(LineItemId::default(), LineItemId::default());
    }

    #[test]
    fn test_serde_is_transparent() {
        let uuid = Uuid::new_v4();
        let id = CustomerId::from(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
