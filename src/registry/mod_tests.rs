//! Tests for the adapter registry accessor.

use crate::network::{AdapterIdentity, AdapterKind};
use crate::registry::mock::{MemoryBackend, StoreOp};
use crate::registry::{
    AdapterRegistry, INSTANCE_ID_VALUE, NETWORK_ADDRESS_VALUE, StoreError, StoreKey,
};

const GUID: &str = "{1B2C3D4E-0000-1111-2222-333344445555}";

fn wifi(instance_id: &str) -> AdapterIdentity {
    AdapterIdentity::new("Wi-Fi", instance_id, AdapterKind::Wireless)
}

/// Registry with an Ethernet adapter at 0000 and the Wi-Fi adapter at 0001.
fn populated() -> AdapterRegistry<MemoryBackend> {
    AdapterRegistry::new(
        MemoryBackend::new()
            .with_adapter("0000", "{99999999-8888-7777-6666-555555555555}")
            .with_adapter("0001", GUID),
    )
}

mod resolve_store_key {
    use super::*;

    #[test]
    fn finds_matching_subkey() {
        let registry = populated();

        let key = registry.resolve_store_key(&wifi(GUID));

        assert_eq!(key, Some(StoreKey::new("0001")));
    }

    #[test]
    fn match_is_case_insensitive() {
        let registry = populated();

        let key = registry.resolve_store_key(&wifi(&GUID.to_lowercase()));

        assert_eq!(key, Some(StoreKey::new("0001")));
    }

    #[test]
    fn missing_instance_id_resolves_to_none() {
        let registry = populated();
        assert_eq!(registry.resolve_store_key(&wifi("")), None);
    }

    #[test]
    fn unknown_instance_id_resolves_to_none() {
        let registry = populated();
        assert_eq!(
            registry.resolve_store_key(&wifi("{00000000-0000-0000-0000-000000000000}")),
            None
        );
    }

    #[test]
    fn unreadable_subkeys_are_skipped() {
        let registry = AdapterRegistry::new(
            MemoryBackend::new()
                .with_unreadable("0000")
                .with_adapter("0001", GUID),
        );

        assert_eq!(
            registry.resolve_store_key(&wifi(GUID)),
            Some(StoreKey::new("0001"))
        );
    }

    #[test]
    fn subkeys_without_instance_id_are_skipped() {
        let registry = AdapterRegistry::new(
            MemoryBackend::new()
                .with_value("Properties", "Other", "x")
                .with_adapter("0001", GUID),
        );

        assert_eq!(
            registry.resolve_store_key(&wifi(GUID)),
            Some(StoreKey::new("0001"))
        );
    }

    #[test]
    fn enumeration_failure_resolves_to_none() {
        let registry = populated();
        registry.backend().fail_enumeration(true);

        assert_eq!(registry.resolve_store_key(&wifi(GUID)), None);
    }
}

mod read {
    use super::*;

    #[test]
    fn absent_override_is_none() {
        let registry = populated();
        assert_eq!(registry.read(&StoreKey::new("0001")), None);
    }

    #[test]
    fn present_override_is_returned() {
        let registry = AdapterRegistry::new(
            MemoryBackend::new()
                .with_adapter("0001", GUID)
                .with_value("0001", NETWORK_ADDRESS_VALUE, "AABBCCDDEEFF"),
        );

        assert_eq!(
            registry.read(&StoreKey::new("0001")).as_deref(),
            Some("AABBCCDDEEFF")
        );
    }

    #[test]
    fn empty_override_is_distinct_from_absent() {
        let registry = AdapterRegistry::new(
            MemoryBackend::new()
                .with_adapter("0001", GUID)
                .with_value("0001", NETWORK_ADDRESS_VALUE, ""),
        );

        assert_eq!(registry.read(&StoreKey::new("0001")).as_deref(), Some(""));
    }

    #[test]
    fn read_failure_is_none() {
        let registry = AdapterRegistry::new(MemoryBackend::new().with_unreadable("0001"));
        assert_eq!(registry.read(&StoreKey::new("0001")), None);
    }
}

mod write {
    use super::*;

    #[test]
    fn sets_network_address() {
        let registry = populated();
        let key = StoreKey::new("0001");

        registry.write(&key, "B83A370478D1").unwrap();

        assert_eq!(
            registry.backend().value("0001", NETWORK_ADDRESS_VALUE).as_deref(),
            Some("B83A370478D1")
        );
        assert_eq!(
            registry.backend().value("0001", INSTANCE_ID_VALUE).as_deref(),
            Some(GUID)
        );
    }

    #[test]
    fn failure_is_reported_not_raised() {
        let registry = populated();
        registry.backend().fail_writes(true);

        let result = registry.write(&StoreKey::new("0001"), "B83A370478D1");

        assert!(matches!(
            result,
            Err(StoreError::Access {
                operation: "write",
                ..
            })
        ));
        assert_eq!(registry.backend().value("0001", NETWORK_ADDRESS_VALUE), None);
    }
}

mod clear {
    use super::*;

    #[test]
    fn removes_existing_override() {
        let registry = AdapterRegistry::new(
            MemoryBackend::new()
                .with_adapter("0001", GUID)
                .with_value("0001", NETWORK_ADDRESS_VALUE, "AABBCCDDEEFF"),
        );

        registry.clear(&StoreKey::new("0001")).unwrap();

        assert_eq!(registry.backend().value("0001", NETWORK_ADDRESS_VALUE), None);
    }

    #[test]
    fn clearing_absent_override_succeeds() {
        let registry = populated();

        let result = registry.clear(&StoreKey::new("0001"));

        assert!(result.is_ok());
        assert_eq!(
            registry.backend().operations(),
            vec![StoreOp::Delete {
                subkey: "0001".to_string()
            }]
        );
    }

    #[test]
    fn delete_failure_is_reported() {
        let registry = populated();
        registry.backend().fail_deletes(true);

        assert!(registry.clear(&StoreKey::new("0001")).is_err());
    }
}

mod store_error {
    use super::*;

    #[test]
    fn access_error_displays_operation_and_path() {
        let error = StoreError::Access {
            operation: "write",
            path: r"SYSTEM\CurrentControlSet\Control\Class\{x}\0001".to_string(),
            reason: "Access is denied.".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("write"));
        assert!(message.contains("0001"));
        assert!(message.contains("Access is denied."));
    }

    #[test]
    fn unexpected_type_displays_path() {
        let error = StoreError::UnexpectedType {
            path: r"0001\NetworkAddress".to_string(),
        };
        assert!(error.to_string().contains("NetworkAddress"));
    }
}
