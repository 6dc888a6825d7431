#[cfg(feature = "asymmetric")]
use crate::asymmetric::errors::AsymmetricError;
use crate::common::codec::CodecError;
use crate::common::key_material::KeyMaterialError;
#[cfg(feature = "symmetric")]
use crate::symmetric::errors::SymmetricError;
use std::fmt;
use thiserror::Error;

/// 面向调用方的错误分类。SQL 适配层据此决定返回 NULL 还是抛出异常。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 密钥或 IV 形状不合法，或公钥不在曲线上
    InvalidKey,
    /// 十六进制或 Base64 文本无法解码
    Decoding,
    /// 认证失败、填充错误、模式或密钥不匹配
    Decryption,
    /// 底层提供者加密失败（包括随机数源不可用）
    Encryption,
    /// 缺少必需的参数，例如 CBC 的 IV
    InvalidArgument,
    /// 配置加载失败
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidKey => "invalid key",
            ErrorKind::Decoding => "decoding error",
            ErrorKind::Decryption => "decryption error",
            ErrorKind::Encryption => "encryption error",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::Configuration => "configuration error",
        };
        f.write_str(name)
    }
}

/// 加解密操作可能遇到的错误类型
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error (JSON): {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Decoding error: {0}")]
    Decoding(#[from] CodecError),

    #[error("Invalid key material: {0}")]
    KeyMaterial(#[from] KeyMaterialError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Secure random source failed: {0}")]
    Random(#[from] rand_core::OsError),

    #[cfg(feature = "asymmetric")]
    #[error("Asymmetric cryptographic error: {0}")]
    Asymmetric(#[from] AsymmetricError),

    #[cfg(feature = "symmetric")]
    #[error("Symmetric cryptographic error: {0}")]
    Symmetric(#[from] SymmetricError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::Json(_) | Error::Configuration(_) => ErrorKind::Configuration,
            Error::Decoding(_) => ErrorKind::Decoding,
            Error::KeyMaterial(_) => ErrorKind::InvalidKey,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Random(_) => ErrorKind::Encryption,
            #[cfg(feature = "asymmetric")]
            Error::Asymmetric(e) => e.kind(),
            #[cfg(feature = "symmetric")]
            Error::Symmetric(e) => e.kind(),
        }
    }
}

#[cfg(feature = "asymmetric")]
impl From<crate::asymmetric::systems::sm2::Sm2SystemError> for Error {
    fn from(err: crate::asymmetric::systems::sm2::Sm2SystemError) -> Self {
        Error::Asymmetric(AsymmetricError::from(err))
    }
}

#[cfg(feature = "symmetric")]
impl From<crate::symmetric::systems::sm4::Sm4SystemError> for Error {
    fn from(err: crate::symmetric::systems::sm4::Sm4SystemError) -> Self {
        Error::Symmetric(SymmetricError::from(err))
    }
}
