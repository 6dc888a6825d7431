//! 密钥材料解析：把调用方传入的十六进制、Base64 或原始 UTF-8 文本
//! 规整为各算法可直接使用的字节表示。
//!
//! 规则概览：
//!
//! - SM4 密钥与 IV 必须恰好 16 字节。32 位十六进制串按十六进制解码；
//!   否则取其 UTF-8 字节；当调用约定为 Base64 时，还接受解码后为 16 字节的 Base64 串。
//! - GCM nonce 的规则相同，但长度可以是 12 字节（24 位十六进制）或 16 字节（32 位十六进制）。
//! - SM2 公钥为 `x || y` 共 128 个十六进制字符。更长的输入只保留末尾 128 个字符，
//!   以兼容携带 `04` 等格式前缀的公钥；严格模式下只接受 128 或 `04` 开头的 130 个字符。
//! - SM2 私钥按无符号大端整数解析，去掉前导零后左侧补零到 32 字节。
use crate::common::codec::{CodecError, Encoding, decode_base64, decode_hex_strict, encode_hex};
use crate::common::utils::{ZeroizingVec, is_hex};
use std::fmt;
use thiserror::Error;

/// SM4 分组长度，也是 SM4 密钥与 IV 的长度
pub const SM4_BLOCK_LEN: usize = 16;
/// GCM 推荐的 96 位 nonce 长度
pub const GCM_NONCE_LEN: usize = 12;
/// 一个曲线坐标的字节数
pub const SM2_COORDINATE_LEN: usize = 32;
/// `x || y` 的十六进制字符数
pub const SM2_PUBLIC_KEY_HEX_LEN: usize = SM2_COORDINATE_LEN * 4;

/// 密钥材料在运算中扮演的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    Sm2PublicKey,
    Sm2PrivateKey,
    Sm4Key,
    Sm4Iv,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRole::Sm2PublicKey => f.write_str("SM2 public key"),
            KeyRole::Sm2PrivateKey => f.write_str("SM2 private key"),
            KeyRole::Sm4Key => f.write_str("SM4 key"),
            KeyRole::Sm4Iv => f.write_str("SM4 IV"),
        }
    }
}

/// 密钥材料的原始文本编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySource {
    Hex,
    Base64,
    RawUtf8,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterialError {
    #[error("{0} must not be empty")]
    Empty(KeyRole),

    #[error("{role} must be 16 bytes or a 32-char hex string, got {actual} bytes")]
    InvalidBlockLength { role: KeyRole, actual: usize },

    #[error(
        "GCM nonce must be 12 or 16 bytes, or a 24- or 32-char hex string, got {0} bytes"
    )]
    InvalidNonceLength(usize),

    #[error("{0} contains non-hex characters")]
    NotHex(KeyRole),

    #[error("SM2 public key needs at least 128 hex characters, got {0}")]
    PublicKeyTooShort(usize),

    #[error("SM2 public key must be 128 hex characters or 130 starting with 04, got {0}")]
    PublicKeyLength(usize),

    #[error("SM2 private key scalar is {0} bytes, longer than 32")]
    PrivateKeyTooLong(usize),

    #[error("{role} is not valid {encoding}: {source}")]
    Malformed {
        role: KeyRole,
        encoding: Encoding,
        #[source]
        source: CodecError,
    },
}

/// 规整后的密钥材料：字节、角色与来源编码。
#[derive(Clone, Debug)]
pub struct KeyMaterial {
    bytes: ZeroizingVec,
    role: KeyRole,
    source: KeySource,
}

impl KeyMaterial {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn role(&self) -> KeyRole {
        self.role
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    /// 解析 SM4 密钥
    pub fn sm4_key(text: &str, encoding: Encoding) -> Result<Self, KeyMaterialError> {
        resolve_block_key(text, KeyRole::Sm4Key, encoding, &[SM4_BLOCK_LEN]).unwrap_or(Err(
            KeyMaterialError::InvalidBlockLength {
                role: KeyRole::Sm4Key,
                actual: text.len(),
            },
        ))
    }

    /// 解析 CBC 模式的 SM4 IV，规则与密钥相同
    pub fn sm4_iv(text: &str, encoding: Encoding) -> Result<Self, KeyMaterialError> {
        resolve_block_key(text, KeyRole::Sm4Iv, encoding, &[SM4_BLOCK_LEN]).unwrap_or(Err(
            KeyMaterialError::InvalidBlockLength {
                role: KeyRole::Sm4Iv,
                actual: text.len(),
            },
        ))
    }

    /// 解析 GCM nonce，接受 12 或 16 字节
    pub fn gcm_nonce(text: &str, encoding: Encoding) -> Result<Self, KeyMaterialError> {
        resolve_block_key(text, KeyRole::Sm4Iv, encoding, &[GCM_NONCE_LEN, SM4_BLOCK_LEN])
            .unwrap_or(Err(KeyMaterialError::InvalidNonceLength(text.len())))
    }

    /// 解析 SM2 公钥，结果为 64 字节的 `x || y`。
    ///
    /// `strict` 为 false 时沿用截断规则，只保留末尾 128 个十六进制字符。
    pub fn sm2_public_key(
        text: &str,
        encoding: Encoding,
        strict: bool,
    ) -> Result<Self, KeyMaterialError> {
        let role = KeyRole::Sm2PublicKey;
        if text.is_empty() {
            return Err(KeyMaterialError::Empty(role));
        }

        let (hex_text, source) = match encoding {
            Encoding::Hex => {
                if !is_hex(text) {
                    return Err(KeyMaterialError::NotHex(role));
                }
                (text.to_string(), KeySource::Hex)
            }
            Encoding::Base64 => {
                let raw = decode_base64(text).map_err(|source| KeyMaterialError::Malformed {
                    role,
                    encoding,
                    source,
                })?;
                (encode_hex(&raw), KeySource::Base64)
            }
        };

        let len = hex_text.len();
        if strict {
            let well_formed = len == SM2_PUBLIC_KEY_HEX_LEN
                || (len == SM2_PUBLIC_KEY_HEX_LEN + 2 && hex_text.starts_with("04"));
            if !well_formed {
                return Err(KeyMaterialError::PublicKeyLength(len));
            }
        }
        if len < SM2_PUBLIC_KEY_HEX_LEN {
            return Err(KeyMaterialError::PublicKeyTooShort(len));
        }
        if len > SM2_PUBLIC_KEY_HEX_LEN {
            let dropped = len - SM2_PUBLIC_KEY_HEX_LEN;
            if dropped == 2 && hex_text.starts_with("04") {
                tracing::debug!("dropping SEC1 uncompressed prefix from SM2 public key");
            } else {
                tracing::warn!(
                    dropped,
                    "truncating SM2 public key to its trailing 128 hex characters"
                );
            }
        }

        let coordinates = &hex_text[len - SM2_PUBLIC_KEY_HEX_LEN..];
        let bytes = decode_hex_strict(coordinates).map_err(|source| KeyMaterialError::Malformed {
            role,
            encoding: Encoding::Hex,
            source,
        })?;

        Ok(Self {
            bytes: ZeroizingVec(bytes),
            role,
            source,
        })
    }

    /// 解析 SM2 私钥标量 `d`，结果固定为 32 字节大端表示。
    ///
    /// 这里只做形状检查，`d` 是否落在 `[1, n-1]` 由 SM2 系统校验。
    pub fn sm2_private_key(text: &str, encoding: Encoding) -> Result<Self, KeyMaterialError> {
        let role = KeyRole::Sm2PrivateKey;
        if text.is_empty() {
            return Err(KeyMaterialError::Empty(role));
        }

        let (raw, source) = match encoding {
            Encoding::Hex => {
                if !is_hex(text) {
                    return Err(KeyMaterialError::NotHex(role));
                }
                // 奇数位数按左补零处理
                let padded = if text.len() % 2 == 1 {
                    format!("0{text}")
                } else {
                    text.to_string()
                };
                let raw = decode_hex_strict(&padded).map_err(|source| {
                    KeyMaterialError::Malformed {
                        role,
                        encoding,
                        source,
                    }
                })?;
                (raw, KeySource::Hex)
            }
            Encoding::Base64 => {
                let raw = decode_base64(text).map_err(|source| KeyMaterialError::Malformed {
                    role,
                    encoding,
                    source,
                })?;
                (raw, KeySource::Base64)
            }
        };
        let raw = ZeroizingVec(raw);

        let significant = match raw.iter().position(|&b| b != 0) {
            Some(first) => &raw[first..],
            None => &[][..],
        };
        if significant.len() > SM2_COORDINATE_LEN {
            return Err(KeyMaterialError::PrivateKeyTooLong(significant.len()));
        }

        let mut scalar = vec![0u8; SM2_COORDINATE_LEN];
        scalar[SM2_COORDINATE_LEN - significant.len()..].copy_from_slice(significant);

        Ok(Self {
            bytes: ZeroizingVec(scalar),
            role,
            source,
        })
    }

    /// 对公钥材料，返回 `(x, y)` 两个 32 字节大端坐标
    pub fn coordinates(&self) -> Option<(&[u8], &[u8])> {
        if self.role != KeyRole::Sm2PublicKey || self.bytes.len() != SM2_COORDINATE_LEN * 2 {
            return None;
        }
        Some(self.bytes.split_at(SM2_COORDINATE_LEN))
    }

    /// 以 SEC1 非压缩格式 (`04 || x || y`) 返回公钥点
    pub fn to_uncompressed_point(&self) -> Option<Vec<u8>> {
        let (x, y) = self.coordinates()?;
        let mut point = Vec::with_capacity(1 + SM2_COORDINATE_LEN * 2);
        point.push(0x04);
        point.extend_from_slice(x);
        point.extend_from_slice(y);
        Some(point)
    }

    /// 以密钥字节本身构造 IV 材料。仅用于旧版 GCM 的“密钥即 nonce”兼容路径。
    pub(crate) fn derive_iv_from_key(key: &KeyMaterial) -> Self {
        Self {
            bytes: key.bytes.clone(),
            role: KeyRole::Sm4Iv,
            source: key.source,
        }
    }
}

/// 依次尝试十六进制、原始 UTF-8 与 Base64 三种形式，解码长度须在 `lengths` 之中。
/// 没有任何形式匹配时返回 `None`，由调用方给出具体的长度错误。
fn resolve_block_key(
    text: &str,
    role: KeyRole,
    encoding: Encoding,
    lengths: &[usize],
) -> Option<Result<KeyMaterial, KeyMaterialError>> {
    if text.is_empty() {
        return Some(Err(KeyMaterialError::Empty(role)));
    }
    let material = |bytes: Vec<u8>, source: KeySource| KeyMaterial {
        bytes: ZeroizingVec(bytes),
        role,
        source,
    };

    if lengths.iter().any(|&len| text.len() == len * 2) && is_hex(text) {
        let decoded = decode_hex_strict(text).map_err(|source| KeyMaterialError::Malformed {
            role,
            encoding: Encoding::Hex,
            source,
        });
        return Some(decoded.map(|bytes| material(bytes, KeySource::Hex)));
    }

    let raw = text.as_bytes();
    if lengths.contains(&raw.len()) {
        return Some(Ok(material(raw.to_vec(), KeySource::RawUtf8)));
    }

    if encoding == Encoding::Base64 {
        if let Ok(decoded) = decode_base64(text) {
            if lengths.contains(&decoded.len()) {
                return Some(Ok(material(decoded, KeySource::Base64)));
            }
        }
    }

    None
}
