//! Tests for the customer model and deletion policy

use domain_party::{Customer, CustomerDeletionPolicy, NewCustomer, PartyError, UpdateCustomer};

mod customer_tests {
    use super::*;

    #[test]
    fn test_customer_serialization_round_trip() {
        let customer = Customer::from_request(
            NewCustomer::named("Farzana Akter")
                .with_email("farzana@example.com")
                .with_phone("+8801700000000"),
        );

        let json = serde_json::to_string(&customer).unwrap();
        let back: Customer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, customer);
    }

    #[test]
    fn test_long_name_rejected() {
        let err = NewCustomer::named("x".repeat(201)).check().unwrap_err();
        assert!(matches!(err, PartyError::InvalidData { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_update_with_invalid_email_rejected() {
        let update = UpdateCustomer {
            email: Some("bride@".to_string()),
            ..Default::default()
        };
        let err = update.check().unwrap_err();
        assert_eq!(err.field_name(), Some("email"));
    }

    #[test]
    fn test_update_bumps_timestamp() {
        let mut customer = Customer::from_request(NewCustomer::named("Rima"));
        let created = customer.updated_at;
        customer.apply(UpdateCustomer {
            name: Some("Rima Das".to_string()),
            ..Default::default()
        });
        assert_eq!(customer.name, "Rima Das");
        assert!(customer.updated_at >= created);
    }
}

mod policy_tests {
    use super::*;

    #[test]
    fn test_policy_display_matches_parse() {
        for policy in [CustomerDeletionPolicy::Cascade, CustomerDeletionPolicy::Restrict] {
            let parsed: CustomerDeletionPolicy = policy.to_string().parse().unwrap();
            assert_eq!(parsed, policy);
        }
    }

    #[test]
    fn test_unknown_policy_message() {
        let err = "archive".parse::<CustomerDeletionPolicy>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown customer deletion policy: archive");
    }
}
