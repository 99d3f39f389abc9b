//! Translation between `TokenRecord` and the store's flat field map.
//!
//! Every store persists a record as string fields:
//!
//! | field         | content                                   |
//! |---------------|-------------------------------------------|
//! | `uuid`        | token id, hyphenated lowercase            |
//! | `type`        | record type label                         |
//! | `created`     | creation time, epoch ms                   |
//! | `accessed`    | last access, epoch ms                     |
//! | `principal`   | principal kind (only with a principal)    |
//! | `entity`      | principal id (only with a principal)      |
//! | `application` | owning scope id (only with a principal)   |
//! | `state`       | JSON object text, `null` when absent      |

use std::collections::HashMap;
use std::str::FromStr;

use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::principal::{AuthPrincipal, PrincipalKind};
use crate::domain::entities::token::{TokenId, TokenRecord, TokenState};
use crate::errors::StoreError;

/// Flat field map as held by a store
pub type TokenColumns = HashMap<String, String>;

pub const FIELD_UUID: &str = "uuid";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_CREATED: &str = "created";
pub const FIELD_ACCESSED: &str = "accessed";
pub const FIELD_PRINCIPAL: &str = "principal";
pub const FIELD_ENTITY: &str = "entity";
pub const FIELD_APPLICATION: &str = "application";
pub const FIELD_STATE: &str = "state";

const REQUIRED_FIELDS: [&str; 4] = [FIELD_UUID, FIELD_TYPE, FIELD_CREATED, FIELD_ACCESSED];

/// Flattens a record into store fields
///
/// # Errors
///
/// Returns `StoreError::Serialization` if the state cannot be encoded as JSON.
pub fn to_columns(record: &TokenRecord) -> Result<TokenColumns, StoreError> {
    let mut columns = TokenColumns::new();
    columns.insert(FIELD_UUID.to_string(), record.id.to_string());
    columns.insert(FIELD_TYPE.to_string(), record.token_type.clone());
    columns.insert(FIELD_CREATED.to_string(), record.created.to_string());
    columns.insert(FIELD_ACCESSED.to_string(), record.accessed.to_string());

    if let Some(principal) = &record.principal {
        columns.insert(FIELD_PRINCIPAL.to_string(), principal.kind.as_str().to_string());
        columns.insert(FIELD_ENTITY.to_string(), principal.id.to_string());
        columns.insert(
            FIELD_APPLICATION.to_string(),
            principal.application_id.to_string(),
        );
    }

    let state = serde_json::to_string(&record.state).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })?;
    columns.insert(FIELD_STATE.to_string(), state);

    Ok(columns)
}

/// Rebuilds a record from store fields
///
/// A map missing any required field reads as no record. A field that is
/// present but unparsable is reported as `StoreError::Corrupt`. A principal
/// kind that no longer parses drops the principal and keeps the rest.
pub fn from_columns(columns: &TokenColumns) -> Result<Option<TokenRecord>, StoreError> {
    if REQUIRED_FIELDS.iter().any(|field| !columns.contains_key(*field)) {
        return Ok(None);
    }

    let id = TokenId::from_str(&columns[FIELD_UUID])
        .map_err(|e| StoreError::corrupt(FIELD_UUID, e.to_string()))?;
    let created = parse_millis(columns, FIELD_CREATED)?;
    let accessed = parse_millis(columns, FIELD_ACCESSED)?;
    let principal = read_principal(columns)?;

    let state = match columns.get(FIELD_STATE) {
        None => None,
        Some(text) => serde_json::from_str::<Option<TokenState>>(text)
            .map_err(|e| StoreError::corrupt(FIELD_STATE, e.to_string()))?,
    };

    Ok(Some(TokenRecord {
        id,
        token_type: columns[FIELD_TYPE].clone(),
        created,
        accessed,
        principal,
        state,
    }))
}

fn parse_millis(columns: &TokenColumns, field: &str) -> Result<i64, StoreError> {
    columns[field]
        .trim()
        .parse::<i64>()
        .map_err(|e| StoreError::corrupt(field, e.to_string()))
}

fn parse_uuid(text: &str, field: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(text).map_err(|e| StoreError::corrupt(field, e.to_string()))
}

fn read_principal(columns: &TokenColumns) -> Result<Option<AuthPrincipal>, StoreError> {
    let (Some(kind), Some(entity), Some(application)) = (
        columns.get(FIELD_PRINCIPAL),
        columns.get(FIELD_ENTITY),
        columns.get(FIELD_APPLICATION),
    ) else {
        return Ok(None);
    };

    let kind = match PrincipalKind::from_str(kind) {
        Ok(kind) => kind,
        Err(reason) => {
            warn!(principal = %kind, reason = %reason, "Dropping unrecognised principal from token record");
            return Ok(None);
        }
    };

    Ok(Some(AuthPrincipal::new(
        kind,
        parse_uuid(entity, FIELD_ENTITY)?,
        parse_uuid(application, FIELD_APPLICATION)?,
    )))
}
