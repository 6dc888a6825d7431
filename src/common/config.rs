//!
//! # 通用配置模块
//!
//! 加解密函数的可调参数。所有字段都有默认值，默认值即与现网数据库内置函数兼容的行为，
//! 只有 GCM nonce 策略默认采用更安全的显式 nonce。
//!
use crate::common::codec::Encoding;
use crate::common::errors::Error;
use crate::common::mode::Sm2Mode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "SM_SEAL_";

/// SM4-GCM 的 nonce 来源
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GcmNoncePolicy {
    /// 调用方必须显式提供 16 字节 nonce
    #[default]
    Explicit,
    /// 未提供 nonce 时直接以密钥作为 nonce。
    ///
    /// **不安全**：同一密钥下的每次加密都复用同一个 nonce，会同时破坏 GCM 的
    /// 机密性与认证性。仅用于解密或对接仍在使用该约定的存量系统。
    LegacyKeyDerived,
}

impl fmt::Display for GcmNoncePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GcmNoncePolicy::Explicit => f.write_str("explicit"),
            GcmNoncePolicy::LegacyKeyDerived => f.write_str("legacy-key-derived"),
        }
    }
}

impl FromStr for GcmNoncePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explicit" => Ok(GcmNoncePolicy::Explicit),
            "legacy-key-derived" | "legacy" => Ok(GcmNoncePolicy::LegacyKeyDerived),
            other => Err(format!("unknown GCM nonce policy: {other}")),
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hex" => Ok(Encoding::Hex),
            "base64" => Ok(Encoding::Base64),
            other => Err(format!("unknown encoding: {other}")),
        }
    }
}

/// 加密配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CryptoConfig {
    /// SQL 函数未指定模式时使用的 SM2 密文顺序
    pub sm2_mode: Sm2Mode,
    /// SM2 公私钥文本的编码（现网约定为十六进制）
    pub sm2_key_encoding: Encoding,
    /// 是否拒绝超长的 SM2 公钥，而不是截取末尾 128 个字符
    pub strict_sm2_public_key: bool,
    /// SM4-GCM nonce 策略
    pub gcm_nonce_policy: GcmNoncePolicy,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            sm2_mode: Sm2Mode::C1C3C2,
            sm2_key_encoding: Encoding::Hex,
            strict_sm2_public_key: false,
            gcm_nonce_policy: GcmNoncePolicy::Explicit,
        }
    }
}

/// 完整配置文件
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ConfigFile {
    /// 加密配置
    #[serde(default)]
    pub crypto: CryptoConfig,
}

impl ConfigFile {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded configuration file");
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 从环境变量加载配置，未设置的项保持默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 使用给定的查找函数读取 `SM_SEAL_*` 变量。无法解析的值会被忽略并记录告警。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let crypto = &mut config.crypto;

        if let Some(mode) = parse_var(&lookup, "SM2_MODE") {
            crypto.sm2_mode = mode;
        }
        if let Some(encoding) = parse_var(&lookup, "SM2_KEY_ENCODING") {
            crypto.sm2_key_encoding = encoding;
        }
        if let Some(value) = lookup(&format!("{ENV_PREFIX}STRICT_SM2_PUBLIC_KEY")) {
            crypto.strict_sm2_public_key = value.to_lowercase() == "true";
        }
        if let Some(policy) = parse_var(&lookup, "GCM_NONCE_POLICY") {
            crypto.gcm_nonce_policy = policy;
        }

        config
    }
}

fn parse_var<T, F>(lookup: &F, suffix: &str) -> Option<T>
where
    T: FromStr<Err = String>,
    F: Fn(&str) -> Option<String>,
{
    let name = format!("{ENV_PREFIX}{suffix}");
    let value = lookup(&name)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(reason) => {
            tracing::warn!(variable = %name, %reason, "ignoring invalid configuration value");
            None
        }
    }
}
