//! Unit tests for strongly-typed identifiers

use core_kernel::{ClaimId, DraftId, PatientId};
use uuid::Uuid;

#[test]
fn test_display_includes_prefix() {
    assert!(ClaimId::new().to_string().starts_with("CLM-"));
    assert!(DraftId::new().to_string().starts_with("DRF-"));
    assert!(PatientId::new().to_string().starts_with("PAT-"));
}

#[test]
fn test_parse_round_trip_with_prefix() {
    let id = ClaimId::new_v7();
    let parsed: ClaimId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn test_parse_accepts_bare_uuid() {
    let uuid = Uuid::new_v4();
    let parsed: ClaimId = uuid.to_string().parse().unwrap();
    assert_eq!(*parsed.as_uuid(), uuid);
}

#[test]
fn test_serde_is_transparent() {
    let id = ClaimId::new();
    let json = serde_json::to_string(&id).unwrap();
    // Serialized as the bare UUID, not the prefixed display form
    assert_eq!(json, format!("\"{}\"", id.as_uuid()));
}

#[test]
fn test_new_v7_produces_version_7() {
    let id = ClaimId::new_v7();
    assert_eq!(id.as_uuid().get_version_num(), 7);
}
