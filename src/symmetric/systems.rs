//! # 对称加密系统模块
//!
//! 本模块汇总国密 SM4 的三种工作模式：ECB、CBC 与 GCM。
//! 每个模式都是一个独立的系统类型，并实现 `SymmetricCryptographicSystem` 特征。

pub mod sm4;

pub use self::sm4::{Sm4Cbc, Sm4Ecb, Sm4Gcm, Sm4Iv, Sm4Key};
