//! SQL 函数目录。
//!
//! 描述各部署中注册到 SQL 引擎的加解密函数：名称、参数个数、NULL/空值约定与线上编码。
//! 参数检查器与结果装箱属于宿主适配层，这里只处理已经取出的字符串参数，
//! `None` 表示 SQL NULL。

use crate::common::codec::Encoding;
use crate::common::errors::Error;
use crate::common::mode::{Sm2Mode, Sm4Mode};
use crate::engine::MaskingEngine;
use std::fmt;
use std::ops::RangeInclusive;

/// 已注册的 SQL 函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UdfFunction {
    /// `sm2_encrypt(plaintext, public_key[, mode_type])`，输出 Base64
    Sm2Encrypt,
    /// `sm2_decrypt(data, private_key)`，输入 Base64
    Sm2Decrypt,
    /// `sm2_hexdecrypt(data, private_key)`，输入十六进制
    Sm2HexDecrypt,
    /// `sm4_encrypt_ecb(plaintext, key)`
    Sm4EncryptEcb,
    /// `sm4_decrypt_ecb(ciphertext, key)`
    Sm4DecryptEcb,
    /// `sm4_encrypt_cbc(plaintext, key, iv)`
    Sm4EncryptCbc,
    /// `sm4_decrypt_cbc(ciphertext, key, iv)`
    Sm4DecryptCbc,
    /// `sm4_encrypt(data, key[, nonce[, aad]])`，GCM 模式
    Sm4Encrypt,
    /// `sm4_decrypt(data, key[, nonce[, aad]])`，GCM 模式
    Sm4Decrypt,
    /// `sm2_get_pubkey(private_key)`，返回 128 个十六进制字符
    Sm2GetPubkey,
    /// `sm2_sign(message, private_key[, id])`，输出 Base64
    Sm2Sign,
    /// `sm2_verify(message, public_key, signature[, id])`，签名为 Base64
    Sm2Verify,
    /// `sm2_sign_hex(message, private_key[, id])`，输出十六进制
    Sm2SignHex,
    /// `sm2_verify_hex(message, public_key, signature[, id])`，签名为十六进制
    Sm2VerifyHex,
}

impl UdfFunction {
    pub const ALL: [UdfFunction; 14] = [
        UdfFunction::Sm2Encrypt,
        UdfFunction::Sm2Decrypt,
        UdfFunction::Sm2HexDecrypt,
        UdfFunction::Sm4EncryptEcb,
        UdfFunction::Sm4DecryptEcb,
        UdfFunction::Sm4EncryptCbc,
        UdfFunction::Sm4DecryptCbc,
        UdfFunction::Sm4Encrypt,
        UdfFunction::Sm4Decrypt,
        UdfFunction::Sm2GetPubkey,
        UdfFunction::Sm2Sign,
        UdfFunction::Sm2Verify,
        UdfFunction::Sm2SignHex,
        UdfFunction::Sm2VerifyHex,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UdfFunction::Sm2Encrypt => "sm2_encrypt",
            UdfFunction::Sm2Decrypt => "sm2_decrypt",
            UdfFunction::Sm2HexDecrypt => "sm2_hexdecrypt",
            UdfFunction::Sm4EncryptEcb => "sm4_encrypt_ecb",
            UdfFunction::Sm4DecryptEcb => "sm4_decrypt_ecb",
            UdfFunction::Sm4EncryptCbc => "sm4_encrypt_cbc",
            UdfFunction::Sm4DecryptCbc => "sm4_decrypt_cbc",
            UdfFunction::Sm4Encrypt => "sm4_encrypt",
            UdfFunction::Sm4Decrypt => "sm4_decrypt",
            UdfFunction::Sm2GetPubkey => "sm2_get_pubkey",
            UdfFunction::Sm2Sign => "sm2_sign",
            UdfFunction::Sm2Verify => "sm2_verify",
            UdfFunction::Sm2SignHex => "sm2_sign_hex",
            UdfFunction::Sm2VerifyHex => "sm2_verify_hex",
        }
    }

    /// SQL 函数名不区分大小写
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// 可接受的参数个数
    pub fn arity(self) -> RangeInclusive<usize> {
        match self {
            UdfFunction::Sm2GetPubkey => 1..=1,
            UdfFunction::Sm2Encrypt | UdfFunction::Sm2Sign | UdfFunction::Sm2SignHex => 2..=3,
            UdfFunction::Sm4Encrypt | UdfFunction::Sm4Decrypt => 2..=4,
            UdfFunction::Sm2Decrypt
            | UdfFunction::Sm2HexDecrypt
            | UdfFunction::Sm4EncryptEcb
            | UdfFunction::Sm4DecryptEcb => 2..=2,
            UdfFunction::Sm4EncryptCbc | UdfFunction::Sm4DecryptCbc => 3..=3,
            UdfFunction::Sm2Verify | UdfFunction::Sm2VerifyHex => 3..=4,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            UdfFunction::Sm2Encrypt => "Encrypts a value with an SM2 public key, returns Base64",
            UdfFunction::Sm2Decrypt => {
                "Decrypts Base64 SM2 ciphertext and returns a UTF-8 encoded string"
            }
            UdfFunction::Sm2HexDecrypt => {
                "Decrypts hex SM2 ciphertext and returns a UTF-8 encoded string"
            }
            UdfFunction::Sm4EncryptEcb => "SM4 ECB mode encryption, returns Base64",
            UdfFunction::Sm4DecryptEcb => "SM4 ECB mode decryption of Base64 ciphertext",
            UdfFunction::Sm4EncryptCbc => "SM4 CBC mode encryption, returns Base64",
            UdfFunction::Sm4DecryptCbc => "SM4 CBC mode decryption of Base64 ciphertext",
            UdfFunction::Sm4Encrypt => "SM4 GCM mode encryption, returns Base64",
            UdfFunction::Sm4Decrypt => "SM4 GCM mode decryption of Base64 ciphertext",
            UdfFunction::Sm2GetPubkey => "Derives the 128-char hex SM2 public key (x || y)",
            UdfFunction::Sm2Sign => "SM2 signature (r || s) over a value, returns Base64",
            UdfFunction::Sm2Verify => "Verifies a Base64 SM2 signature, returns true or false",
            UdfFunction::Sm2SignHex => "SM2 signature (r || s) over a value, returns hex",
            UdfFunction::Sm2VerifyHex => "Verifies a hex SM2 signature, returns true or false",
        }
    }

    /// 执行计划中显示的调用形式，例如 `sm4_encrypt_cbc(col, 'k', 'iv')`
    pub fn display_string(self, children: &[&str]) -> String {
        format!("{}({})", self.name(), children.join(", "))
    }

    /// 以宿主引擎取出的参数调用函数。参数个数不符或缺少必需参数时返回 `InvalidArgument`。
    pub fn invoke(
        self,
        engine: &MaskingEngine,
        args: &[Option<&str>],
    ) -> Result<Option<String>, Error> {
        let arity = self.arity();
        if !arity.contains(&args.len()) {
            let expected = if arity.start() == arity.end() {
                format!("exactly {}", arity.start())
            } else {
                format!("{} to {}", arity.start(), arity.end())
            };
            return Err(Error::InvalidArgument(format!(
                "{} requires {expected} parameters, got {}",
                self.name(),
                args.len()
            )));
        }
        let arg = |i: usize| args.get(i).copied().flatten();

        match self {
            UdfFunction::Sm2Encrypt => {
                let Some(plaintext) = arg(0) else {
                    return Ok(None);
                };
                if plaintext.is_empty() {
                    return Ok(Some(String::new()));
                }
                let key = required(self, "public key", arg(1))?;
                let mode = match arg(2) {
                    Some(mode_type) => parse_mode_type(self, mode_type)?,
                    None => engine.config().sm2_mode,
                };
                engine
                    .sm2_encrypt(key, plaintext, mode, Encoding::Base64)
                    .map(Some)
            }
            UdfFunction::Sm2Decrypt | UdfFunction::Sm2HexDecrypt => {
                let (Some(data), Some(key)) = (arg(0), arg(1)) else {
                    return Ok(None);
                };
                let encoding = if self == UdfFunction::Sm2Decrypt {
                    Encoding::Base64
                } else {
                    Encoding::Hex
                };
                engine.sm2_decrypt(key, data, engine.config().sm2_mode, encoding)
            }
            UdfFunction::Sm4EncryptEcb
            | UdfFunction::Sm4DecryptEcb
            | UdfFunction::Sm4EncryptCbc
            | UdfFunction::Sm4DecryptCbc => {
                let data = arg(0).unwrap_or_default();
                if data.is_empty() {
                    return Ok(Some(String::new()));
                }
                let key = required(self, "key", arg(1))?;
                let (mode, iv) = match self {
                    UdfFunction::Sm4EncryptCbc | UdfFunction::Sm4DecryptCbc => {
                        (Sm4Mode::Cbc, Some(required(self, "IV", arg(2))?))
                    }
                    _ => (Sm4Mode::Ecb, None),
                };
                let result = if self.is_encrypt() {
                    engine.sm4_encrypt(key, data, mode, iv, Encoding::Base64)?
                } else {
                    engine.sm4_decrypt(key, data, mode, iv, Encoding::Base64)?
                };
                Ok(Some(result))
            }
            UdfFunction::Sm4Encrypt | UdfFunction::Sm4Decrypt => {
                // 数据或密钥缺失时原样返回数据
                let data = arg(0);
                let (Some(text), Some(key)) = (data, arg(1)) else {
                    return Ok(data.map(str::to_string));
                };
                if text.is_empty() || key.is_empty() {
                    return Ok(Some(text.to_string()));
                }
                let nonce = arg(2);
                let aad = arg(3).filter(|a| !a.is_empty());
                let result = if self.is_encrypt() {
                    engine.sm4_encrypt_with_aad(key, text, Sm4Mode::Gcm, nonce, aad, Encoding::Base64)?
                } else {
                    engine.sm4_decrypt_with_aad(key, text, Sm4Mode::Gcm, nonce, aad, Encoding::Base64)?
                };
                Ok(Some(result))
            }
            UdfFunction::Sm2GetPubkey => {
                let Some(private_key) = arg(0) else {
                    return Ok(None);
                };
                engine.sm2_get_public_key(private_key).map(Some)
            }
            UdfFunction::Sm2Sign | UdfFunction::Sm2SignHex => {
                let (Some(message), Some(private_key)) = (arg(0), arg(1)) else {
                    return Ok(None);
                };
                engine
                    .sm2_sign(private_key, message, arg(2), self.signature_encoding())
                    .map(Some)
            }
            UdfFunction::Sm2Verify | UdfFunction::Sm2VerifyHex => {
                let (Some(message), Some(public_key), Some(signature)) = (arg(0), arg(1), arg(2))
                else {
                    return Ok(None);
                };
                let valid = engine.sm2_verify(
                    public_key,
                    message,
                    signature,
                    arg(3),
                    self.signature_encoding(),
                )?;
                Ok(Some(valid.to_string()))
            }
        }
    }

    fn signature_encoding(self) -> Encoding {
        match self {
            UdfFunction::Sm2SignHex | UdfFunction::Sm2VerifyHex => Encoding::Hex,
            _ => Encoding::Base64,
        }
    }

    fn is_encrypt(self) -> bool {
        matches!(
            self,
            UdfFunction::Sm2Encrypt
                | UdfFunction::Sm4EncryptEcb
                | UdfFunction::Sm4EncryptCbc
                | UdfFunction::Sm4Encrypt
        )
    }
}

impl fmt::Display for UdfFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn required<'a>(
    function: UdfFunction,
    what: &str,
    value: Option<&'a str>,
) -> Result<&'a str, Error> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::InvalidArgument(format!(
            "{function} {what} cannot be null or empty"
        ))),
    }
}

fn parse_mode_type(function: UdfFunction, mode_type: &str) -> Result<Sm2Mode, Error> {
    mode_type
        .trim()
        .parse::<i32>()
        .map(Sm2Mode::from_mode_type)
        .map_err(|_| {
            Error::InvalidArgument(format!(
                "{function} mode type must be an integer, got {mode_type:?}"
            ))
        })
}
