//!
//! 集成测试
//!
//! 端到端验证公开 API：从字符串参数到编码后的密文，再还原为原值。
//!

mod common;

use common::*;
use sm_seal::asymmetric::traits::AsymmetricCryptographicSystem;
use sm_seal::asymmetric::systems::{C1C2C3, C1C3C2};
use sm_seal::symmetric::traits::SymmetricCryptographicSystem;
use sm_seal::{
    ConfigFile, Encoding, ErrorKind, MaskingEngine, Sm2CryptoSystem, Sm2Mode, Sm4Cbc, Sm4Ecb,
    Sm4Gcm, Sm4Iv, Sm4Mode, UdfFunction,
};
use tempfile::tempdir;

// === SM4 ===

#[test]
fn test_sm4_roundtrip_every_mode_and_encoding() {
    let engine = engine();
    for mode in [Sm4Mode::Ecb, Sm4Mode::Cbc, Sm4Mode::Gcm] {
        for encoding in [Encoding::Hex, Encoding::Base64] {
            for value in [PHONE, CHINESE, "x"] {
                let c = engine
                    .sm4_encrypt(KEY, value, mode, Some(IV), encoding)
                    .unwrap();
                assert_ne!(c, value);
                let p = engine.sm4_decrypt(KEY, &c, mode, Some(IV), encoding).unwrap();
                assert_eq!(p, value, "{mode} / {encoding}");
            }
        }
    }
}

#[test]
fn test_sm4_encrypting_empty_string_returns_empty_string() {
    let engine = engine();
    for mode in [Sm4Mode::Ecb, Sm4Mode::Cbc, Sm4Mode::Gcm] {
        assert_eq!(
            engine.sm4_encrypt(KEY, "", mode, Some(IV), Encoding::Base64).unwrap(),
            ""
        );
    }
}

#[test]
fn test_sm4_17_byte_hex_key_is_invalid() {
    let err = engine()
        .sm4_encrypt(
            "6d796b6579313233343536373839303031",
            "x",
            Sm4Mode::Ecb,
            None,
            Encoding::Hex,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidKey);
}

#[test]
fn test_sm4_ecb_identical_blocks() {
    let engine = engine();
    let value = "0123456789abcdef0123456789abcdef";
    let c = engine
        .sm4_encrypt(KEY, value, Sm4Mode::Ecb, None, Encoding::Hex)
        .unwrap();
    assert_eq!(c.len(), 96);
    assert_eq!(c[..32], c[32..64]);
}

#[test]
fn test_sm4_cbc_wrong_iv_never_restores_plaintext() {
    let engine = engine();
    let c = engine
        .sm4_encrypt(KEY, PHONE, Sm4Mode::Cbc, Some(IV), Encoding::Base64)
        .unwrap();
    match engine.sm4_decrypt(KEY, &c, Sm4Mode::Cbc, Some("fedcba0987654321"), Encoding::Base64) {
        Ok(p) => assert_ne!(p, PHONE),
        Err(e) => assert_eq!(e.kind(), ErrorKind::Decryption),
    }
}

#[test]
fn test_sm4_gcm_wrong_nonce_fails_authentication() {
    let engine = engine();
    let c = engine
        .sm4_encrypt(KEY, PHONE, Sm4Mode::Gcm, Some(IV), Encoding::Base64)
        .unwrap();
    let err = engine
        .sm4_decrypt(KEY, &c, Sm4Mode::Gcm, Some("fedcba0987654321"), Encoding::Base64)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decryption);
}

#[test]
fn test_sm4_byte_paths_match_string_paths() {
    let engine = engine();
    let key = engine.sm4_key(KEY, Encoding::Hex).unwrap();
    let iv = Sm4Iv::from_bytes(IV.as_bytes()).unwrap();

    let bytes = engine
        .sm4_encrypt_bytes(&key, Some(&iv), PHONE.as_bytes(), Sm4Mode::Cbc)
        .unwrap();
    let text = engine
        .sm4_encrypt(KEY, PHONE, Sm4Mode::Cbc, Some(IV), Encoding::Hex)
        .unwrap();
    assert_eq!(Encoding::Hex.encode(&bytes), text);

    let plain = engine
        .sm4_decrypt_bytes(&key, Some(&iv), &bytes, Sm4Mode::Cbc)
        .unwrap();
    assert_eq!(plain, PHONE.as_bytes());
}

#[test]
fn test_sm4_systems_agree_with_engine() {
    let engine = engine();
    let key = Sm4Ecb::import_key(KEY_HEX).unwrap();
    let iv = Sm4Iv::from_bytes(IV.as_bytes()).unwrap();

    let ecb = Sm4Ecb::encrypt(&key, None, PHONE.as_bytes(), None).unwrap();
    assert_eq!(
        Encoding::Base64.encode(&ecb),
        engine
            .sm4_encrypt(KEY, PHONE, Sm4Mode::Ecb, None, Encoding::Base64)
            .unwrap()
    );

    let cbc = Sm4Cbc::encrypt(&key, Some(&iv), PHONE.as_bytes(), None).unwrap();
    let gcm = Sm4Gcm::encrypt(&key, Some(&iv), PHONE.as_bytes(), None).unwrap();
    assert_ne!(cbc, gcm);
    assert_eq!(
        Sm4Gcm::decrypt(&key, Some(&iv), &gcm, None).unwrap(),
        PHONE.as_bytes()
    );
}

#[test]
fn test_generated_sm4_key_is_usable() {
    let engine = engine();
    let key = engine.generate_sm4_key().unwrap();
    assert_eq!(key.len(), 32);
    let c = engine
        .sm4_encrypt(&key, PHONE, Sm4Mode::Ecb, None, Encoding::Hex)
        .unwrap();
    assert_eq!(
        engine.sm4_decrypt(&key, &c, Sm4Mode::Ecb, None, Encoding::Hex).unwrap(),
        PHONE
    );
}

// === SM2 ===

#[test]
fn test_sm2_roundtrip_both_modes_and_encodings() {
    let engine = engine();
    let (public_key, private_key) = sm2_keys();
    for mode in [Sm2Mode::C1C3C2, Sm2Mode::C1C2C3] {
        for encoding in [Encoding::Hex, Encoding::Base64] {
            let c = engine
                .sm2_encrypt(&public_key, CHINESE, mode, encoding)
                .unwrap();
            let p = engine
                .sm2_decrypt(&private_key, &c, mode, encoding)
                .unwrap();
            assert_eq!(p.as_deref(), Some(CHINESE));
        }
    }
}

#[test]
fn test_sm2_encryption_is_not_deterministic() {
    let engine = engine();
    let (public_key, _) = sm2_keys();
    let a = engine
        .sm2_encrypt(&public_key, PHONE, Sm2Mode::C1C3C2, Encoding::Hex)
        .unwrap();
    let b = engine
        .sm2_encrypt(&public_key, PHONE, Sm2Mode::C1C3C2, Encoding::Hex)
        .unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_sm2_mode_mismatch_is_a_decryption_error() {
    let engine = engine();
    let (public_key, private_key) = sm2_keys();
    let c = engine
        .sm2_encrypt(&public_key, PHONE, Sm2Mode::C1C3C2, Encoding::Hex)
        .unwrap();
    let err = engine
        .sm2_decrypt(&private_key, &c, Sm2Mode::C1C2C3, Encoding::Hex)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decryption);
}

#[test]
fn test_sm2_wrong_key_is_a_decryption_error() {
    let engine = engine();
    let (public_key, _) = sm2_keys();
    let (_, other_private) = sm2_keys();
    let c = engine
        .sm2_encrypt(&public_key, PHONE, Sm2Mode::C1C3C2, Encoding::Base64)
        .unwrap();
    let err = engine
        .sm2_decrypt(&other_private, &c, Sm2Mode::C1C3C2, Encoding::Base64)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decryption);
}

#[test]
fn test_sm2_invalid_keys() {
    let engine = engine();
    let short = engine
        .sm2_encrypt("abcd", PHONE, Sm2Mode::C1C3C2, Encoding::Hex)
        .unwrap_err();
    assert_eq!(short.kind(), ErrorKind::InvalidKey);

    let not_hex = engine
        .sm2_encrypt(&"zz".repeat(64), PHONE, Sm2Mode::C1C3C2, Encoding::Hex)
        .unwrap_err();
    assert_eq!(not_hex.kind(), ErrorKind::InvalidKey);

    let off_curve = engine
        .sm2_encrypt(&"11".repeat(64), PHONE, Sm2Mode::C1C3C2, Encoding::Hex)
        .unwrap_err();
    assert_eq!(off_curve.kind(), ErrorKind::InvalidKey);
}

#[test]
fn test_sm2_typed_systems_interoperate_with_engine() {
    let engine = engine();
    let (pk, sk) = Sm2CryptoSystem::<C1C2C3>::generate_keypair(&Default::default()).unwrap();
    let c = Sm2CryptoSystem::<C1C2C3>::encrypt(&pk, PHONE.as_bytes()).unwrap();
    let p = engine.sm2_decrypt_bytes(&sk, &c, Sm2Mode::C1C2C3).unwrap();
    assert_eq!(p, PHONE.as_bytes());

    let c = engine
        .sm2_encrypt_bytes(&pk, PHONE.as_bytes(), Sm2Mode::C1C3C2)
        .unwrap();
    assert_eq!(
        Sm2CryptoSystem::<C1C3C2>::decrypt(&sk, &c).unwrap(),
        PHONE.as_bytes()
    );
}

// === 配置与函数目录 ===

#[test]
fn test_engine_from_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sm-seal.json");
    std::fs::write(
        &path,
        r#"{ "crypto": { "gcm_nonce_policy": "legacy-key-derived", "sm2_mode": "C1C2C3" } }"#,
    )
    .unwrap();

    let engine = MaskingEngine::from_config_file(&path).unwrap();
    assert_eq!(engine.config().sm2_mode, Sm2Mode::C1C2C3);

    // 兼容策略下 GCM 可以不带 nonce
    let c = engine
        .sm4_encrypt(KEY, PHONE, Sm4Mode::Gcm, None, Encoding::Base64)
        .unwrap();
    assert_eq!(
        engine.sm4_decrypt(KEY, &c, Sm4Mode::Gcm, None, Encoding::Base64).unwrap(),
        PHONE
    );

    let saved = dir.path().join("saved.json");
    ConfigFile {
        crypto: engine.config().clone(),
    }
    .save_to_file(&saved)
    .unwrap();
    assert_eq!(
        MaskingEngine::from_config_file(&saved).unwrap().config(),
        engine.config()
    );
}

#[test]
fn test_engine_from_missing_config_file() {
    let dir = tempdir().unwrap();
    let err = MaskingEngine::from_config_file(dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_udf_catalogue_end_to_end() {
    let engine = engine();
    let (public_key, private_key) = sm2_keys();

    let sm2 = UdfFunction::from_name("sm2_encrypt")
        .unwrap()
        .invoke(&engine, &[Some(PHONE), Some(public_key.as_str())])
        .unwrap()
        .unwrap();
    let plain = UdfFunction::from_name("sm2_decrypt")
        .unwrap()
        .invoke(&engine, &[Some(sm2.as_str()), Some(private_key.as_str())])
        .unwrap();
    assert_eq!(plain.as_deref(), Some(PHONE));

    let ecb = UdfFunction::Sm4EncryptEcb
        .invoke(&engine, &[Some(PHONE), Some(KEY_HEX)])
        .unwrap()
        .unwrap();
    let plain = UdfFunction::Sm4DecryptEcb
        .invoke(&engine, &[Some(ecb.as_str()), Some(KEY)])
        .unwrap();
    assert_eq!(plain.as_deref(), Some(PHONE));
}

#[test]
fn test_random_helpers() {
    let hex = sm_seal::common::random_hex_string(32).unwrap();
    assert_eq!(hex.len(), 32);
    let uuid = sm_seal::common::random_uuid_string(true, true).unwrap();
    assert_eq!(uuid.len(), 36);
    assert_eq!(uuid, uuid.to_uppercase());
}
