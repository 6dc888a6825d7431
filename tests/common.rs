//!
//! 集成测试的通用辅助函数
//!
#![allow(dead_code)]

use sm_seal::{CryptoConfig, GcmNoncePolicy, MaskingEngine};

/// 16 字节的原始 UTF-8 密钥
pub const KEY: &str = "mykey12345678901";
/// 与 [`KEY`] 等价的 32 位十六进制形式
pub const KEY_HEX: &str = "6d796b65793132333435363738393031";
/// 与 [`KEY`] 等价的 Base64 形式
pub const KEY_BASE64: &str = "bXlrZXkxMjM0NTY3ODkwMQ==";
/// 16 字节的原始 UTF-8 IV
pub const IV: &str = "1234567890abcdef";

/// 推荐的 12 字节 GCM nonce
pub const NONCE_12: &str = "123456789012";

pub const PHONE: &str = "13800138001";
pub const CHINESE: &str = "测试中文加密";

/// 默认配置的引擎
pub fn engine() -> MaskingEngine {
    MaskingEngine::default()
}

/// 允许 GCM 以密钥作为 nonce 的兼容引擎
pub fn legacy_gcm_engine() -> MaskingEngine {
    MaskingEngine::new(CryptoConfig {
        gcm_nonce_policy: GcmNoncePolicy::LegacyKeyDerived,
        ..CryptoConfig::default()
    })
}

/// 生成一对十六进制 SM2 密钥 `(公钥, 私钥)`
pub fn sm2_keys() -> (String, String) {
    engine().generate_sm2_keypair().unwrap()
}

/// 固定的 SM2 私钥 `d`，以下向量均由 OpenSSL 在该密钥下生成
pub const FIXED_SM2_PRIVATE: &str =
    "730f5de9f0bbab191440147f7008ec67071dd5135ea9fa9f8de9a32cd205829d";
/// [`FIXED_SM2_PRIVATE`] 对应的公钥 `x || y`
pub const FIXED_SM2_PUBLIC: &str = "81def9d02cae1030c42282fe32d6bc43bc6b875f2fa78a0608d9b43c9f581c58\
                                    c3dab90b54ea53c21556ce73efbba50773d282e4dd9314958447dbab53d6d299";
