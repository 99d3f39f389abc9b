//! Tests for the expiration policy

use crate::domain::entities::token::{TokenId, TokenKind, ONE_DAY_MILLIS, ONE_WEEK_MILLIS};
use crate::errors::TokenError;
use crate::services::token::ExpirationPolicy;

const T0: i64 = 1_700_000_000_000;
const HOUR: i64 = 60 * 60 * 1000;

#[test]
fn test_default_lifetimes() {
    let policy = ExpirationPolicy::default();
    assert_eq!(policy.ttl_for(TokenKind::Access), ONE_DAY_MILLIS);
    assert_eq!(policy.ttl_for(TokenKind::Refresh), ONE_WEEK_MILLIS);
    assert_eq!(policy.ttl_for(TokenKind::Email), ONE_WEEK_MILLIS);
    assert_eq!(policy.ttl_for(TokenKind::Offline), ONE_WEEK_MILLIS);
    assert_eq!(policy.max_persistence_age(), ONE_WEEK_MILLIS);
    assert_eq!(policy.persistence_ttl_seconds(), 7 * 24 * 60 * 60);
}

#[test]
fn test_non_positive_overrides_are_ignored() {
    let policy = ExpirationPolicy::builder()
        .ttl(TokenKind::Access, Some(0))
        .ttl(TokenKind::Refresh, Some(-5))
        .ttl(TokenKind::Email, None)
        .ttl(TokenKind::Offline, Some(HOUR))
        .max_persistence_age(Some(-1))
        .build();

    assert_eq!(policy.ttl_for(TokenKind::Access), ONE_DAY_MILLIS);
    assert_eq!(policy.ttl_for(TokenKind::Refresh), ONE_WEEK_MILLIS);
    assert_eq!(policy.ttl_for(TokenKind::Email), ONE_WEEK_MILLIS);
    assert_eq!(policy.ttl_for(TokenKind::Offline), HOUR);
    assert_eq!(policy.max_persistence_age(), ONE_WEEK_MILLIS);
}

#[test]
fn test_persistence_ttl_is_at_least_one_second() {
    let policy = ExpirationPolicy::builder().max_persistence_age(Some(10)).build();
    assert_eq!(policy.persistence_ttl_seconds(), 1);
}

#[test]
fn test_ttl_boundary() {
    let policy = ExpirationPolicy::default();
    let id = TokenId::generate(T0);

    for kind in [TokenKind::Email, TokenKind::Offline] {
        let limit = T0 + policy.ttl_for(kind);
        assert!(policy.is_valid(kind, &id, None, limit - 1));
        assert!(policy.is_valid(kind, &id, None, limit));
        assert!(!policy.is_valid(kind, &id, None, limit + 1));
    }

    let limit = T0 + ONE_DAY_MILLIS;
    assert!(policy.is_valid(TokenKind::Access, &id, Some(limit), limit - 1));
    assert!(!policy.is_valid(TokenKind::Access, &id, Some(limit), limit + 1));
}

#[test]
fn test_embedded_expiry_binds_even_when_policy_is_looser() {
    let id = TokenId::generate(T0);
    let embedded = T0 + ONE_DAY_MILLIS;
    let looser = ExpirationPolicy::builder()
        .ttl(TokenKind::Access, Some(2 * ONE_DAY_MILLIS))
        .build();

    assert!(looser.is_valid(TokenKind::Access, &id, Some(embedded), T0 + 23 * HOUR));
    assert!(!looser.is_valid(TokenKind::Access, &id, Some(embedded), T0 + 25 * HOUR));
}

#[test]
fn test_tightening_policy_invalidates_older_tokens() {
    let id = TokenId::generate(T0);
    let embedded = T0 + ONE_DAY_MILLIS;
    let tighter = ExpirationPolicy::builder()
        .ttl(TokenKind::Access, Some(HOUR))
        .build();

    assert!(tighter.is_valid(TokenKind::Access, &id, Some(embedded), T0 + HOUR / 2));
    assert!(!tighter.is_valid(TokenKind::Access, &id, Some(embedded), T0 + 2 * HOUR));
}

#[test]
fn test_embedded_expiry_ignored_for_kinds_without_one() {
    let policy = ExpirationPolicy::default();
    let id = TokenId::generate(T0);
    assert!(policy.is_valid(TokenKind::Email, &id, Some(T0), T0 + HOUR));
}

#[test]
fn test_check_reports_expired() {
    let policy = ExpirationPolicy::default();
    let id = TokenId::generate(T0);
    assert_eq!(policy.check(TokenKind::Offline, &id, None, T0), Ok(()));
    assert_eq!(
        policy.check(TokenKind::Offline, &id, None, T0 + ONE_WEEK_MILLIS + 1),
        Err(TokenError::Expired)
    );
    assert_eq!(policy.expires_at(TokenKind::Access, &id), T0 + ONE_DAY_MILLIS);
}
