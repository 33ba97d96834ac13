// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use jsonwebtoken::{DecodingKey, EncodingKey, Validation};

use super::*;
use crate::credential::{epoch_secs, JwtInfo, MIN_TTL};
use crate::test_support::{public_pem, test_jwt};

const T0: u64 = 1_700_000_000;

fn provider(ttl: Duration) -> TokenProvider {
    TokenProvider::new(Some(test_jwt(ttl)))
}

#[test]
fn unauthenticated_never_yields_token() -> anyhow::Result<()> {
    let tokens = TokenProvider::unauthenticated();
    assert!(!tokens.is_authenticated());
    assert_eq!(tokens.current_token()?, None);
    assert_eq!(tokens.token_at(T0)?, None);
    assert!(tokens.cached().is_none());
    Ok(())
}

#[test]
fn token_reused_one_minute_later() -> anyhow::Result<()> {
    let tokens = provider(Duration::from_secs(600));
    let first = tokens.token_at(T0)?;
    let second = tokens.token_at(T0 + 60)?;
    assert!(first.is_some());
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn token_refreshed_inside_guard_window() -> anyhow::Result<()> {
    let tokens = provider(Duration::from_secs(600));
    let first = tokens.token_at(T0)?;
    let later = tokens.token_at(T0 + 6 * 60)?;
    assert_ne!(first, later);

    let cached = tokens.cached().ok_or_else(|| anyhow::anyhow!("no cached token"))?;
    assert_eq!(cached.issued_at, T0 + 6 * 60);
    assert_eq!(cached.expires_at, T0 + 6 * 60 + 600);
    Ok(())
}

#[test]
fn token_refreshed_exactly_at_guard_boundary() -> anyhow::Result<()> {
    let tokens = provider(Duration::from_secs(600));
    let first = tokens.token_at(T0)?;
    // 299s before the boundary: still 301s of lifetime left.
    assert_eq!(tokens.token_at(T0 + 299)?, first);
    // Remaining lifetime == guard window.
    assert_ne!(tokens.token_at(T0 + 300)?, first);
    Ok(())
}

#[test]
fn ttl_below_floor_is_raised() -> anyhow::Result<()> {
    let jwt = test_jwt(Duration::from_secs(60));
    assert_eq!(jwt.ttl(), MIN_TTL);

    let tokens = TokenProvider::new(Some(jwt));
    tokens.token_at(T0)?;
    let cached = tokens.cached().ok_or_else(|| anyhow::anyhow!("no cached token"))?;
    assert_eq!(cached.expires_at - cached.issued_at, MIN_TTL.as_secs());
    Ok(())
}

#[test]
fn token_verifies_with_public_key() -> anyhow::Result<()> {
    let tokens = provider(Duration::from_secs(3600));
    let now = epoch_secs();
    let token = tokens.token_at(now)?.ok_or_else(|| anyhow::anyhow!("no token"))?;

    let header = jsonwebtoken::decode_header(&token)?;
    assert_eq!(header.alg, Algorithm::RS256);
    assert_eq!(header.kid.as_deref(), Some("test-kid"));

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&["statushook-test"]);
    validation.set_audience(&["subscribers"]);
    let key = DecodingKey::from_rsa_pem(public_pem().as_bytes())?;
    let data = jsonwebtoken::decode::<CallbackClaims>(&token, &key, &validation)?;
    assert_eq!(data.claims.exp, now + 3600);
    assert_eq!(data.claims.iat, now);
    Ok(())
}

#[test]
fn signing_failure_propagates_and_caches_nothing() {
    let jwt = JwtInfo::new(
        EncodingKey::from_secret(b"not-an-rsa-key"),
        "kid",
        "iss",
        "aud",
        Duration::from_secs(600),
    );
    let tokens = TokenProvider::new(Some(jwt));
    let err = tokens.token_at(T0);
    assert!(matches!(err, Err(CredentialError::Signing(_))));
    assert!(tokens.cached().is_none());
}

#[yare::parameterized(
    wraps_u64 = { u64::MAX },
    past_numeric_date = { i64::MAX as u64 },
)]
fn oversized_ttl_is_signing_error(ttl_secs: u64) {
    let tokens = provider(Duration::from_secs(ttl_secs));
    let result = tokens.token_at(T0);
    assert!(matches!(result, Err(CredentialError::Signing(_))));
    assert!(tokens.cached().is_none());
}

#[yare::parameterized(
    fits = { T0, 3600, Some(T0 + 3600) },
    last_numeric_date = { 0, i64::MAX as u64, Some(i64::MAX as u64) },
    past_numeric_date = { 1, i64::MAX as u64, None },
    wraps = { T0, u64::MAX, None },
)]
fn expiry_bounds(now: u64, ttl_secs: u64, expected: Option<u64>) {
    assert_eq!(expiry(now, ttl_secs), expected);
}

#[test]
fn concurrent_callers_share_one_token() -> anyhow::Result<()> {
    let tokens = provider(Duration::from_secs(600));
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| tokens.token_at(T0))).collect();
        handles.into_iter().filter_map(|h| h.join().ok()).collect()
    });
    assert_eq!(results.len(), 8);

    let first = tokens.token_at(T0)?;
    for result in results {
        assert_eq!(result?, first);
    }
    Ok(())
}
