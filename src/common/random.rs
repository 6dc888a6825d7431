//! 安全随机数：为密钥生成、随机串与 UUID 提供操作系统熵源。
use crate::common::codec::encode_hex;
use rand_core::{OsError, OsRng, TryRngCore};
use uuid::Builder;

/// 返回 `n` 个来自操作系统 CSPRNG 的随机字节
pub fn next_bytes(n: usize) -> Result<Vec<u8>, OsError> {
    let mut bytes = vec![0u8; n];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

/// 生成 `length / 2` 个随机字节并以小写十六进制返回
pub fn random_hex_string(length: usize) -> Result<String, OsError> {
    Ok(encode_hex(&next_bytes(length / 2)?))
}

/// 生成随机 (v4) UUID 字符串
pub fn random_uuid_string(upper_case: bool, with_hyphen: bool) -> Result<String, OsError> {
    let mut bytes = [0u8; 16];
    OsRng.try_fill_bytes(&mut bytes)?;
    let uuid = Builder::from_random_bytes(bytes).into_uuid();

    let text = if with_hyphen {
        uuid.hyphenated().to_string()
    } else {
        uuid.simple().to_string()
    };
    Ok(if upper_case { text.to_uppercase() } else { text })
}
