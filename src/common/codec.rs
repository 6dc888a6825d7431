//! 文本编解码层：十六进制、Base64 与 UTF-8 之间的转换。
//!
//! 所有函数对空输入直接返回空结果，不调用底层编码器。
use base64::{Engine, engine::general_purpose};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 编解码错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid hex string: {0}")]
    Hex(String),

    #[error("Hex text of {0} characters contains no hex digits")]
    NoHexDigits(usize),
}

/// 调用方与函数之间约定的文本表示。线上格式本身不带任何标记。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Hex,
    Base64,
}

impl Encoding {
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Hex => encode_hex(bytes),
            Encoding::Base64 => encode_base64(bytes),
        }
    }

    pub fn decode(self, text: &str) -> Result<Vec<u8>, CodecError> {
        match self {
            Encoding::Hex => {
                let bytes = decode_hex(text);
                if bytes.is_empty() && !text.is_empty() {
                    return Err(CodecError::NoHexDigits(text.chars().count()));
                }
                Ok(bytes)
            }
            Encoding::Base64 => decode_base64(text),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Hex => f.write_str("hex"),
            Encoding::Base64 => f.write_str("base64"),
        }
    }
}

/// 带文本表示标签的字节序列。内部处理始终基于原始字节。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedPayload {
    bytes: Vec<u8>,
    encoding: Encoding,
}

impl EncodedPayload {
    pub fn new(bytes: Vec<u8>, encoding: Encoding) -> Self {
        Self { bytes, encoding }
    }

    /// 按约定的编码解析调用方传入的文本。
    pub fn parse(text: &str, encoding: Encoding) -> Result<Self, CodecError> {
        Ok(Self {
            bytes: encoding.decode(text)?,
            encoding,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_text(&self) -> String {
        self.encoding.encode(&self.bytes)
    }
}

/// 宽松的十六进制解码。
///
/// 忽略大小写，跳过 `[0-9A-Fa-f]` 以外的任何字符；有效位数为奇数时在左侧补一个 0。
/// 输入中可能夹带格式字符，这两点都是兼容性要求。
pub fn decode_hex(s: &str) -> Vec<u8> {
    if s.is_empty() {
        return Vec::new();
    }

    let nibbles: Vec<u8> = s
        .chars()
        .filter_map(|c| c.to_digit(16).map(|d| d as u8))
        .collect();

    let mut out = vec![0u8; nibbles.len().div_ceil(2)];
    let mut pos = nibbles.len() & 1;
    for nibble in nibbles {
        let slot = &mut out[pos >> 1];
        *slot = (*slot << 4) | nibble;
        pos += 1;
    }
    out
}

/// 严格的十六进制解码，仅接受偶数长度的纯十六进制字符串。用于密钥解析。
pub fn decode_hex_strict(s: &str) -> Result<Vec<u8>, CodecError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    hex::decode(s).map_err(|e| CodecError::Hex(e.to_string()))
}

/// 小写十六进制编码
pub fn encode_hex(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    hex::encode(bytes)
}

pub fn decode_base64(s: &str) -> Result<Vec<u8>, CodecError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    Ok(general_purpose::STANDARD.decode(s)?)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    general_purpose::STANDARD.encode(bytes)
}

/// 解密结果转为字符串。非法 UTF-8 序列替换为 U+FFFD，与宿主引擎的字符串语义一致。
pub fn utf8_lossy(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    String::from_utf8_lossy(bytes).into_owned()
}
