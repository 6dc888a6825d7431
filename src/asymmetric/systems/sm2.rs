//! `Sm2CryptoSystem` 提供基于国密 SM2 (`sm2p256v1`) 的公钥加解密。
//!
//! 密文由三段组成：C1 为 65 字节的非压缩临时公钥点，C3 为 32 字节 SM3 摘要，
//! C2 与明文等长。三段的排列顺序由 [`SegmentOrder`] 在类型上确定，
//! 运行时选择则使用 [`Sm2Encryptor`]/[`Sm2Decryptor`]。
//! 线上格式不带任何模式标记，解密方必须使用与加密方相同的顺序。

use crate::asymmetric::traits::AsymmetricCryptographicSystem;
use crate::common::codec::{CodecError, Encoding, encode_hex};
use crate::common::config::CryptoConfig;
use crate::common::errors::ErrorKind;
use crate::common::key_material::{KeyMaterial, KeyMaterialError, KeyRole, SM2_COORDINATE_LEN};
use crate::common::mode::Sm2Mode;
use crate::common::random::next_bytes;
use crate::common::utils::ZeroizingVec;
use serde::{Deserialize, Serialize};
use sm2::elliptic_curve::Curve;
use sm2::elliptic_curve::bigint::U256;
use sm2::elliptic_curve::common::getrandom::SysRng;
#[allow(deprecated)]
use sm2::elliptic_curve::sec1::ToSec1Point;
use sm2::dsa::signature::{Signer, Verifier};
use sm2::dsa::{Signature, SigningKey, VerifyingKey};
use sm2::pke::{DecryptingKey, EncryptingKey, Mode};
use sm2::{AffinePoint, PublicKey, SecretKey};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::OnceLock;
use thiserror::Error;

/// 单次加密的名义明文块大小，仅作说明，不做强制
pub const DEFAULT_DATA_BLOCK_SIZE: usize = 1024;
/// 与 [`DEFAULT_DATA_BLOCK_SIZE`] 对应的名义密文块大小，仅作说明，不做强制
pub const ENCRYPT_DATA_BLOCK_SIZE: usize = 2242;

/// C1 段长度（`04 || x || y`）
pub const C1_LEN: usize = 1 + SM2_COORDINATE_LEN * 2;
/// C3 段长度（SM3 摘要）
pub const C3_LEN: usize = 32;
/// `r || s` 签名长度
pub const SIGNATURE_LEN: usize = 64;
/// 未指定用户标识时签名与验签使用的 ID
pub const DEFAULT_USER_ID: &str = "1234567812345678";

/// SM2 系统的独立错误类型
#[derive(Error, Debug)]
pub enum Sm2SystemError {
    #[error("Invalid SM2 public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid SM2 private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Key material error: {0}")]
    KeyMaterial(#[from] KeyMaterialError),

    #[error("SM2 encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("SM2 decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("SM2 signing failed: {0}")]
    SigningFailed(String),

    #[error("Malformed SM2 signature: {0}")]
    MalformedSignature(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(#[from] rand_core::OsError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

impl Sm2SystemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Sm2SystemError::InvalidPublicKey(_)
            | Sm2SystemError::InvalidPrivateKey(_)
            | Sm2SystemError::KeyMaterial(_) => ErrorKind::InvalidKey,
            Sm2SystemError::EncryptionFailed(_)
            | Sm2SystemError::KeyGeneration(_)
            | Sm2SystemError::SigningFailed(_) => ErrorKind::Encryption,
            Sm2SystemError::DecryptionFailed(_) => ErrorKind::Decryption,
            Sm2SystemError::Codec(_) | Sm2SystemError::MalformedSignature(_) => ErrorKind::Decoding,
        }
    }
}

/// `sm2p256v1` 域参数，进程内只初始化一次并以只读方式共享。
#[derive(Debug)]
pub struct Sm2Domain {
    name: &'static str,
    order: U256,
    generator: AffinePoint,
}

static DOMAIN: OnceLock<Sm2Domain> = OnceLock::new();

impl Sm2Domain {
    pub fn get() -> &'static Sm2Domain {
        DOMAIN.get_or_init(|| Sm2Domain {
            name: "sm2p256v1",
            order: *<sm2::Sm2 as Curve>::ORDER.as_ref(),
            generator: AffinePoint::GENERATOR,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 基点的阶 n
    pub fn order(&self) -> &U256 {
        &self.order
    }

    /// 基点 G
    pub fn generator(&self) -> &AffinePoint {
        &self.generator
    }

    /// 32 字节大端标量是否落在 `[1, n-1]`
    pub fn is_valid_scalar(&self, scalar: &[u8]) -> bool {
        if scalar.len() != SM2_COORDINATE_LEN {
            return false;
        }
        let d = U256::from_be_slice(scalar);
        d != U256::ZERO && d < self.order
    }
}

/// SM2 公钥，保存 SEC1 非压缩编码 (`04 || x || y`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sm2PublicKey(pub Vec<u8>);

impl Sm2PublicKey {
    /// 由解析好的公钥材料构造，并校验点在曲线上
    pub fn from_key_material(material: &KeyMaterial) -> Result<Self, Sm2SystemError> {
        if material.role() != KeyRole::Sm2PublicKey {
            return Err(Sm2SystemError::InvalidPublicKey(format!(
                "expected public key material, got {}",
                material.role()
            )));
        }
        let point = material.to_uncompressed_point().ok_or_else(|| {
            Sm2SystemError::InvalidPublicKey("public key must hold 64 coordinate bytes".to_string())
        })?;
        Self::from_sec1_bytes(&point)
    }

    /// 接受任意合法的 SEC1 编码，统一保存为非压缩格式
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, Sm2SystemError> {
        let public_key = PublicKey::from_sec1_bytes(bytes)
            .map_err(|_| Sm2SystemError::InvalidPublicKey("point is not on sm2p256v1".to_string()))?;
        Ok(Self(public_key.as_affine().to_sec1_point(false).as_bytes().to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// 去掉 `04` 前缀后的 `x || y`，共 64 字节
    pub fn coordinates(&self) -> &[u8] {
        self.0.get(1..).unwrap_or_default()
    }

    /// 校验 `r || s` 签名。签名值不成立时返回 `Ok(false)`，长度不对时报错。
    pub fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        user_id: &str,
    ) -> Result<bool, Sm2SystemError> {
        if signature.len() != SIGNATURE_LEN {
            return Err(Sm2SystemError::MalformedSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LEN,
                signature.len()
            )));
        }
        let verifying_key = VerifyingKey::new(user_id, self.to_public_key()?)
            .map_err(|_| Sm2SystemError::InvalidPublicKey("user id is too long".to_string()))?;
        // r 或 s 不在 [1, n-1] 内的签名不可能成立
        let Ok(signature) = Signature::from_slice(signature) else {
            return Ok(false);
        };
        Ok(verifying_key.verify(message, &signature).is_ok())
    }

    fn to_public_key(&self) -> Result<PublicKey, Sm2SystemError> {
        PublicKey::from_sec1_bytes(&self.0)
            .map_err(|_| Sm2SystemError::InvalidPublicKey("point is not on sm2p256v1".to_string()))
    }
}

/// SM2 私钥标量，32 字节大端，离开作用域时清零
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sm2PrivateKey(pub ZeroizingVec);

impl Sm2PrivateKey {
    /// 由解析好的私钥材料构造，要求 `d` 落在 `[1, n-1]`
    pub fn from_key_material(material: &KeyMaterial) -> Result<Self, Sm2SystemError> {
        if material.role() != KeyRole::Sm2PrivateKey {
            return Err(Sm2SystemError::InvalidPrivateKey(format!(
                "expected private key material, got {}",
                material.role()
            )));
        }
        if !Sm2Domain::get().is_valid_scalar(material.bytes()) {
            return Err(Sm2SystemError::InvalidPrivateKey(
                "scalar must be in [1, n-1]".to_string(),
            ));
        }
        Ok(Self(ZeroizingVec(material.bytes().to_vec())))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// 推导对应的公钥
    pub fn public_key(&self) -> Result<Sm2PublicKey, Sm2SystemError> {
        let secret = self.to_secret_key()?;
        Ok(Sm2PublicKey(
            secret.public_key().as_affine().to_sec1_point(false).as_bytes().to_vec(),
        ))
    }

    /// 以用户标识 `user_id` 对消息签名，返回 `r || s`。
    /// 随机数 k 按 RFC 6979 由私钥和摘要确定，同一输入签名结果相同。
    pub fn sign(&self, message: &[u8], user_id: &str) -> Result<Vec<u8>, Sm2SystemError> {
        let secret = self.to_secret_key()?;
        let signing_key = SigningKey::new(user_id, &secret)
            .map_err(|_| Sm2SystemError::SigningFailed("user id is too long".to_string()))?;
        let signature: Signature = signing_key
            .try_sign(message)
            .map_err(|e| Sm2SystemError::SigningFailed(e.to_string()))?;
        Ok(signature.to_vec())
    }

    fn to_secret_key(&self) -> Result<SecretKey, Sm2SystemError> {
        SecretKey::from_slice(&self.0)
            .map_err(|_| Sm2SystemError::InvalidPrivateKey("scalar must be in [1, n-1]".to_string()))
    }
}

fn provider_mode(mode: Sm2Mode) -> Mode {
    match mode {
        Sm2Mode::C1C2C3 => Mode::C1C2C3,
        Sm2Mode::C1C3C2 => Mode::C1C3C2,
    }
}

/// 已绑定公钥与模式的加密器。初始化一次后可重复对多个值加密。
pub struct Sm2Encryptor {
    key: EncryptingKey,
    mode: Sm2Mode,
}

impl Sm2Encryptor {
    pub fn new(public_key: &Sm2PublicKey, mode: Sm2Mode) -> Result<Self, Sm2SystemError> {
        let key = EncryptingKey::new_with_mode(public_key.to_public_key()?, provider_mode(mode));
        Ok(Self { key, mode })
    }

    pub fn mode(&self) -> Sm2Mode {
        self.mode
    }

    /// 加密整个输入。每次调用使用新的临时密钥，因此结果不确定。
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Sm2SystemError> {
        if plaintext.is_empty() {
            return Ok(Vec::new());
        }
        self.key
            .encrypt(&mut SysRng, plaintext)
            .map_err(|e| Sm2SystemError::EncryptionFailed(e.to_string()))
    }
}

/// 已绑定私钥与模式的解密器
pub struct Sm2Decryptor {
    key: DecryptingKey,
    mode: Sm2Mode,
}

impl Sm2Decryptor {
    pub fn new(private_key: &Sm2PrivateKey, mode: Sm2Mode) -> Result<Self, Sm2SystemError> {
        let secret = private_key.to_secret_key()?;
        let key = DecryptingKey::new_with_mode(secret.to_nonzero_scalar(), provider_mode(mode));
        Ok(Self { key, mode })
    }

    pub fn mode(&self) -> Sm2Mode {
        self.mode
    }

    /// 解密整个输入。顺序不匹配或密钥错误时摘要校验失败。
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Sm2SystemError> {
        if ciphertext.is_empty() {
            return Ok(Vec::new());
        }
        if ciphertext.len() < C1_LEN + C3_LEN {
            return Err(Sm2SystemError::DecryptionFailed(format!(
                "ciphertext is {} bytes, shorter than C1 and C3",
                ciphertext.len()
            )));
        }
        if ciphertext[0] != 0x04 {
            return Err(Sm2SystemError::DecryptionFailed(
                "C1 is not an uncompressed point".to_string(),
            ));
        }
        self.key
            .decrypt(ciphertext)
            .map_err(|_| Sm2SystemError::DecryptionFailed(format!("integrity check failed under {}", self.mode)))
    }
}

/// 在类型上固定 SM2 密文三段的顺序
pub trait SegmentOrder: Debug + Send + Sync + 'static {
    const MODE: Sm2Mode;
}

/// 现行标准顺序
#[derive(Debug, Clone, Copy, Default)]
pub struct C1C3C2;

/// 旧版标准顺序
#[derive(Debug, Clone, Copy, Default)]
pub struct C1C2C3;

impl SegmentOrder for C1C3C2 {
    const MODE: Sm2Mode = Sm2Mode::C1C3C2;
}

impl SegmentOrder for C1C2C3 {
    const MODE: Sm2Mode = Sm2Mode::C1C2C3;
}

/// SM2 加密系统实现
#[derive(Debug, Default)]
pub struct Sm2CryptoSystem<O: SegmentOrder = C1C3C2>(PhantomData<O>);

impl<O: SegmentOrder> AsymmetricCryptographicSystem for Sm2CryptoSystem<O> {
    type PublicKey = Sm2PublicKey;
    type PrivateKey = Sm2PrivateKey;
    type Error = Sm2SystemError;

    fn generate_keypair(
        _config: &CryptoConfig,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), Self::Error> {
        // 拒绝采样，直到得到 [1, n-1] 内的标量
        let secret = loop {
            let candidate = ZeroizingVec(next_bytes(SM2_COORDINATE_LEN)?);
            if let Ok(secret) = SecretKey::from_slice(&candidate) {
                break secret;
            }
        };
        let public_key = Sm2PublicKey(
            secret.public_key().as_affine().to_sec1_point(false).as_bytes().to_vec(),
        );
        let private_key = Sm2PrivateKey(ZeroizingVec(secret.to_bytes().to_vec()));
        Ok((public_key, private_key))
    }

    fn encrypt(public_key: &Self::PublicKey, plaintext: &[u8]) -> Result<Vec<u8>, Self::Error> {
        Sm2Encryptor::new(public_key, O::MODE)?.encrypt(plaintext)
    }

    fn decrypt(
        private_key: &Self::PrivateKey,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, Self::Error> {
        Sm2Decryptor::new(private_key, O::MODE)?.decrypt(ciphertext)
    }

    fn export_public_key(public_key: &Self::PublicKey) -> Result<String, Self::Error> {
        Ok(encode_hex(public_key.as_bytes()))
    }

    fn export_private_key(private_key: &Self::PrivateKey) -> Result<String, Self::Error> {
        Ok(encode_hex(private_key.as_bytes()))
    }

    fn import_public_key(key_data: &str) -> Result<Self::PublicKey, Self::Error> {
        let material = KeyMaterial::sm2_public_key(key_data, Encoding::Hex, false)?;
        Sm2PublicKey::from_key_material(&material)
    }

    fn import_private_key(key_data: &str) -> Result<Self::PrivateKey, Self::Error> {
        let material = KeyMaterial::sm2_private_key(key_data, Encoding::Hex)?;
        Sm2PrivateKey::from_key_material(&material)
    }
}
