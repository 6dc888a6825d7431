//! # sm-seal: 国密 SM2/SM4 列级脱敏加解密
//!
//! `sm-seal` 为分布式 SQL 引擎提供可调用的 SM2 公钥加密与 SM4 分组加密函数，
//! 用于对手机号、证件号等列做加密脱敏。库只负责密码变换层：
//! 多种文本编码下的密钥规整、模式选择，以及两种算法的加解密路径。
//!
//! ## Core Concepts
//!
//! - **`MaskingEngine`**: 按配置执行单值或整列的加解密，输入输出均为字符串。
//! - **`KeyMaterial`**: 把十六进制、Base64 或原始 UTF-8 文本解析为各算法需要的密钥字节。
//! - **`Sm2CryptoSystem` / `Sm4Ecb` / `Sm4Cbc` / `Sm4Gcm`**: 基于字节的算法实现。
//! - **`UdfFunction`**: 注册到 SQL 引擎的函数目录及其 NULL/空值约定。
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sm_seal::prelude::*;
//!
//! fn main() -> Result<(), Error> {
//!     let engine = MaskingEngine::default();
//!
//!     let ciphertext = engine.sm4_encrypt(
//!         "mykey12345678901",
//!         "13800138001",
//!         Sm4Mode::Cbc,
//!         Some("1234567890abcdef"),
//!         Encoding::Base64,
//!     )?;
//!     let plaintext = engine.sm4_decrypt(
//!         "mykey12345678901",
//!         &ciphertext,
//!         Sm4Mode::Cbc,
//!         Some("1234567890abcdef"),
//!         Encoding::Base64,
//!     )?;
//!     assert_eq!(plaintext, "13800138001");
//!     Ok(())
//! }
//! ```

pub mod common;
pub mod engine;

#[cfg(feature = "asymmetric")]
pub mod asymmetric;

#[cfg(feature = "symmetric")]
pub mod symmetric;

#[cfg(all(feature = "asymmetric", feature = "symmetric"))]
pub mod udf;

pub use common::codec::{EncodedPayload, Encoding};
pub use common::config::{ConfigFile, CryptoConfig, GcmNoncePolicy};
pub use common::errors::{Error, ErrorKind};
pub use common::key_material::{KeyMaterial, KeyRole, KeySource};
pub use common::mode::{CipherMode, Sm2Mode, Sm4Mode};
pub use engine::MaskingEngine;

#[cfg(feature = "asymmetric")]
pub use asymmetric::systems::sm2::{Sm2CryptoSystem, Sm2PrivateKey, Sm2PublicKey};
#[cfg(feature = "symmetric")]
pub use symmetric::systems::sm4::{Sm4Cbc, Sm4Ecb, Sm4Gcm, Sm4Iv, Sm4Key};
#[cfg(all(feature = "asymmetric", feature = "symmetric"))]
pub use udf::UdfFunction;

/// 常用类型与特征
pub mod prelude {
    pub use crate::common::codec::Encoding;
    pub use crate::common::config::{CryptoConfig, GcmNoncePolicy};
    pub use crate::common::errors::{Error, ErrorKind};
    pub use crate::common::mode::{Sm2Mode, Sm4Mode};
    pub use crate::engine::MaskingEngine;

    #[cfg(feature = "asymmetric")]
    pub use crate::asymmetric::traits::AsymmetricCryptographicSystem;
    #[cfg(feature = "symmetric")]
    pub use crate::symmetric::traits::SymmetricCryptographicSystem;
    #[cfg(all(feature = "symmetric", feature = "parallel"))]
    pub use crate::symmetric::traits::SymmetricParallelSystem;
}

/// The version of the `sm-seal` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
