use crate::common::config::CryptoConfig;
use std::fmt::Debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// 对称加密系统的公共特征
pub trait SymmetricCryptographicSystem: Sized {
    /// 密钥的期望长度（以字节为单位）。
    const KEY_SIZE: usize;

    /// 是否需要 IV/nonce
    const REQUIRES_IV: bool;

    /// 用于加密和解密的单一密钥。
    type Key: Clone + Debug;

    /// IV 或 nonce 类型。不使用 IV 的模式会忽略传入值。
    type Iv: Clone + Debug;

    /// 该系统的错误类型。
    type Error: std::error::Error + Send + Sync + 'static;

    /// 生成一个新的密钥。
    fn generate_key(config: &CryptoConfig) -> Result<Self::Key, Self::Error>;

    /// 使用密钥加密数据。空明文加密结果为空。
    fn encrypt(
        key: &Self::Key,
        iv: Option<&Self::Iv>,
        plaintext: &[u8],
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, Self::Error>;

    /// 使用密钥解密数据。
    fn decrypt(
        key: &Self::Key,
        iv: Option<&Self::Iv>,
        ciphertext: &[u8],
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, Self::Error>;

    /// 导出密钥为字符串
    fn export_key(key: &Self::Key) -> Result<String, Self::Error>;

    /// 从字符串导入密钥
    fn import_key(key_data: &str) -> Result<Self::Key, Self::Error>;
}

/// `SymmetricParallelSystem` 使用 Rayon 对一批相互独立的值（例如同一列的多行）并行加解密。
///
/// 每个值仍是一次完整的单值加密，结果顺序与输入一致。任一值失败时整批返回第一个错误。
#[cfg(feature = "parallel")]
pub trait SymmetricParallelSystem: SymmetricCryptographicSystem
where
    Self::Key: Sync,
    Self::Iv: Sync,
    Self::Error: Send,
{
    /// [并行] 加密一批明文。
    fn par_encrypt_batch<T>(
        key: &Self::Key,
        iv: Option<&Self::Iv>,
        plaintexts: &[T],
    ) -> Result<Vec<Vec<u8>>, Self::Error>
    where
        T: AsRef<[u8]> + Sync,
    {
        plaintexts
            .par_iter()
            .map(|p| Self::encrypt(key, iv, p.as_ref(), None))
            .collect()
    }

    /// [并行] 解密一批密文。
    fn par_decrypt_batch<T>(
        key: &Self::Key,
        iv: Option<&Self::Iv>,
        ciphertexts: &[T],
    ) -> Result<Vec<Vec<u8>>, Self::Error>
    where
        T: AsRef<[u8]> + Sync,
    {
        ciphertexts
            .par_iter()
            .map(|c| Self::decrypt(key, iv, c.as_ref(), None))
            .collect()
    }
}

#[cfg(feature = "parallel")]
impl<S> SymmetricParallelSystem for S
where
    S: SymmetricCryptographicSystem,
    S::Key: Sync,
    S::Iv: Sync,
    S::Error: Send,
{
}
