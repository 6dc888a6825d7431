//! # 非对称加密系统模块
//!
//! 目前只包含国密 SM2 公钥加密。每个系统都实现 `AsymmetricCryptographicSystem` 特征。

pub mod sm2;

pub use self::sm2::{C1C2C3, C1C3C2, Sm2CryptoSystem};
