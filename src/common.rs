//! 通用模块，包含编解码、密钥材料解析、错误处理、配置与共享工具

pub mod codec;
pub mod config;
pub mod errors;
pub mod key_material;
pub mod mode;
pub mod provider;
pub mod random;
pub mod utils;

pub use self::codec::{CodecError, EncodedPayload, Encoding};
pub use self::config::{ConfigFile, CryptoConfig, GcmNoncePolicy};
pub use self::errors::{Error, ErrorKind};
pub use self::key_material::{KeyMaterial, KeyMaterialError, KeyRole, KeySource};
pub use self::mode::{CipherMode, Sm2Mode, Sm4Mode};
pub use self::random::{next_bytes, random_hex_string, random_uuid_string};
pub use self::utils::ZeroizingVec;
