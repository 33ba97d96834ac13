// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for unit tests.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Duration;

use jsonwebtoken::EncodingKey;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;

use crate::credential::JwtInfo;

/// One RSA key per test binary; generation is slow in debug builds.
pub fn test_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rsa::rand_core::OsRng, 2048).expect("generate rsa key")
    })
}

pub fn pkcs1_pem() -> String {
    test_key().to_pkcs1_pem(LineEnding::LF).expect("pkcs1 pem").as_str().to_owned()
}

pub fn pkcs8_pem() -> String {
    test_key().to_pkcs8_pem(LineEnding::LF).expect("pkcs8 pem").as_str().to_owned()
}

pub fn public_pem() -> String {
    test_key().to_public_key().to_public_key_pem(LineEnding::LF).expect("public pem")
}

/// Write `contents` to a temp file that lives as long as the handle.
pub fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

pub fn test_jwt(ttl: Duration) -> JwtInfo {
    let key = EncodingKey::from_rsa_pem(pkcs1_pem().as_bytes()).expect("encoding key");
    JwtInfo::new(key, "test-kid", "statushook-test", "subscribers", ttl)
}
