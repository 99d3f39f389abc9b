//! Unit tests for the persisted field contract

use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::principal::{AuthPrincipal, PrincipalKind};
use crate::domain::entities::token::{TokenId, TokenRecord, TokenState};
use crate::errors::StoreError;
use crate::repositories::token::columns::*;

const T0: i64 = 1_700_000_000_000;

fn sample_state() -> TokenState {
    let mut state = TokenState::new();
    state.insert("scope".to_string(), json!("read"));
    state.insert("attempts".to_string(), json!(2));
    state
}

fn sample_record() -> TokenRecord {
    let principal = AuthPrincipal::new(PrincipalKind::AdminUser, Uuid::new_v4(), Uuid::new_v4());
    let mut record = TokenRecord::new(
        TokenId::generate(T0),
        "access",
        Some(principal),
        Some(sample_state()),
    );
    record.mark_accessed(T0 + 5_000);
    record
}

#[test]
fn test_to_columns_writes_every_field() {
    let record = sample_record();
    let columns = to_columns(&record).unwrap();

    assert_eq!(columns[FIELD_UUID], record.id.to_string());
    assert_eq!(columns[FIELD_TYPE], "access");
    assert_eq!(columns[FIELD_CREATED], T0.to_string());
    assert_eq!(columns[FIELD_ACCESSED], (T0 + 5_000).to_string());
    assert_eq!(columns[FIELD_PRINCIPAL], "admin_user");
    assert_eq!(columns[FIELD_ENTITY], record.principal.unwrap().id.to_string());
    assert_eq!(
        columns[FIELD_APPLICATION],
        record.principal.unwrap().application_id.to_string()
    );

    let state: serde_json::Value = serde_json::from_str(&columns[FIELD_STATE]).unwrap();
    assert_eq!(state, json!({"scope": "read", "attempts": 2}));
}

#[test]
fn test_record_without_principal_or_state() {
    let record = TokenRecord::new(TokenId::generate(T0), "email", None, None);
    let columns = to_columns(&record).unwrap();

    assert!(!columns.contains_key(FIELD_PRINCIPAL));
    assert!(!columns.contains_key(FIELD_ENTITY));
    assert!(!columns.contains_key(FIELD_APPLICATION));
    assert_eq!(columns[FIELD_STATE], "null");

    let restored = from_columns(&columns).unwrap().unwrap();
    assert_eq!(restored, record);
}

#[test]
fn test_columns_restore_full_record() {
    let record = sample_record();
    let restored = from_columns(&to_columns(&record).unwrap()).unwrap().unwrap();
    assert_eq!(restored, record);
}

#[test]
fn test_missing_required_field_reads_as_no_record() {
    for field in [FIELD_UUID, FIELD_TYPE, FIELD_CREATED, FIELD_ACCESSED] {
        let mut columns = to_columns(&sample_record()).unwrap();
        columns.remove(field);
        assert!(from_columns(&columns).unwrap().is_none(), "field {}", field);
    }
    assert!(from_columns(&TokenColumns::new()).unwrap().is_none());
}

#[test]
fn test_unparsable_field_is_corrupt() {
    let mut columns = to_columns(&sample_record()).unwrap();
    columns.insert(FIELD_CREATED.to_string(), "yesterday".to_string());

    match from_columns(&columns) {
        Err(StoreError::Corrupt { field, .. }) => assert_eq!(field, FIELD_CREATED),
        other => panic!("expected corrupt record, got {:?}", other),
    }

    let mut columns = to_columns(&sample_record()).unwrap();
    columns.insert(FIELD_STATE.to_string(), "{not json".to_string());
    assert!(matches!(
        from_columns(&columns),
        Err(StoreError::Corrupt { .. })
    ));

    let mut columns = to_columns(&sample_record()).unwrap();
    columns.insert(FIELD_UUID.to_string(), Uuid::new_v4().to_string());
    assert!(matches!(
        from_columns(&columns),
        Err(StoreError::Corrupt { .. })
    ));
}

#[test]
fn test_unknown_principal_kind_drops_principal_only() {
    let record = sample_record();
    let mut columns = to_columns(&record).unwrap();
    columns.insert(FIELD_PRINCIPAL.to_string(), "group".to_string());

    let restored = from_columns(&columns).unwrap().unwrap();
    assert!(restored.principal.is_none());
    assert_eq!(restored.id, record.id);
    assert_eq!(restored.state, record.state);
}
