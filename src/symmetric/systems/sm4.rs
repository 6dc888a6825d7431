//! 国密 SM4 对称加密实现：ECB/PKCS7、CBC/PKCS7 与 GCM (12 或 16 字节 nonce，标签附在密文末尾)。
//!
//! 三种模式都整块处理输入，不做流式分段，线上格式中也没有任何长度或模式前缀。
use crate::common::codec::{Encoding, encode_hex};
use crate::common::config::CryptoConfig;
use crate::common::errors::ErrorKind;
use crate::common::key_material::{
    GCM_NONCE_LEN, KeyMaterial, KeyMaterialError, KeyRole, SM4_BLOCK_LEN,
};
use crate::common::mode::Sm4Mode;
use crate::common::random::next_bytes;
use crate::common::utils::ZeroizingVec;
use crate::symmetric::traits::SymmetricCryptographicSystem;
use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{AesGcm, Nonce};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use sm4::Sm4;
use thiserror::Error;

/// 单次加密的名义明文块大小，仅作说明，不做强制
pub const DEFAULT_DATA_BLOCK_SIZE: usize = 1024;
/// 与 [`DEFAULT_DATA_BLOCK_SIZE`] 对应的名义密文块大小，仅作说明，不做强制
pub const ENCRYPT_DATA_BLOCK_SIZE: usize = 2080;

const KEY_SIZE: usize = SM4_BLOCK_LEN;
const TAG_SIZE: usize = 16;

type Sm4EcbEnc = ecb::Encryptor<Sm4>;
type Sm4EcbDec = ecb::Decryptor<Sm4>;
type Sm4CbcEnc = cbc::Encryptor<Sm4>;
type Sm4CbcDec = cbc::Decryptor<Sm4>;
type Sm4Gcm96 = AesGcm<Sm4, U12>;
type Sm4Gcm128 = AesGcm<Sm4, U16>;

const GCM_NONCE_LENS: [usize; 2] = [GCM_NONCE_LEN, SM4_BLOCK_LEN];

/// SM4 系统的独立错误类型
#[derive(Error, Debug)]
pub enum Sm4SystemError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(#[from] rand_core::OsError),

    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("Invalid IV size: expected {expected}, got {actual}")]
    InvalidIvSize { expected: usize, actual: usize },

    #[error("Key material error: {0}")]
    KeyMaterial(#[from] KeyMaterialError),

    #[error("SM4/{0} requires an IV or nonce")]
    MissingIv(Sm4Mode),

    #[error("Additional authenticated data is only supported by SM4/GCM, not SM4/{0}")]
    UnexpectedAad(Sm4Mode),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Ciphertext is malformed or truncated: {0}")]
    MalformedCiphertext(String),
}

impl Sm4SystemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Sm4SystemError::InvalidKeySize { .. }
            | Sm4SystemError::InvalidIvSize { .. }
            | Sm4SystemError::KeyMaterial(_) => ErrorKind::InvalidKey,
            Sm4SystemError::MissingIv(_) | Sm4SystemError::UnexpectedAad(_) => {
                ErrorKind::InvalidArgument
            }
            Sm4SystemError::KeyGeneration(_) | Sm4SystemError::EncryptionFailed(_) => {
                ErrorKind::Encryption
            }
            Sm4SystemError::DecryptionFailed(_) | Sm4SystemError::MalformedCiphertext(_) => {
                ErrorKind::Decryption
            }
        }
    }
}

/// SM4 密钥，16 字节，离开作用域时清零
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sm4Key(pub ZeroizingVec);

impl Sm4Key {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Sm4SystemError> {
        if bytes.len() != KEY_SIZE {
            return Err(Sm4SystemError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self(ZeroizingVec(bytes.to_vec())))
    }

    pub fn from_key_material(material: &KeyMaterial) -> Result<Self, Sm4SystemError> {
        Self::from_bytes(material.bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// SM4 IV（GCM 模式下即 nonce）。CBC 要求 16 字节，GCM 接受 12 或 16 字节。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sm4Iv(pub Vec<u8>);

impl Sm4Iv {
    /// 16 字节 IV，两种模式都可使用
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Sm4SystemError> {
        if bytes.len() != SM4_BLOCK_LEN {
            return Err(Sm4SystemError::InvalidIvSize {
                expected: SM4_BLOCK_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes.to_vec()))
    }

    /// GCM nonce，12 字节（推荐）或 16 字节
    pub fn gcm_nonce(bytes: &[u8]) -> Result<Self, Sm4SystemError> {
        if !GCM_NONCE_LENS.contains(&bytes.len()) {
            return Err(Sm4SystemError::InvalidIvSize {
                expected: GCM_NONCE_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes.to_vec()))
    }

    /// 由解析好的材料构造，长度按 12 或 16 字节接受，CBC 的长度在加解密时再检查
    pub fn from_key_material(material: &KeyMaterial) -> Result<Self, Sm4SystemError> {
        if material.role() != KeyRole::Sm4Iv {
            tracing::debug!(role = %material.role(), "using non-IV key material as SM4 IV");
        }
        Self::gcm_nonce(material.bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn require_iv<'a>(
    mode: Sm4Mode,
    iv: Option<&'a Sm4Iv>,
    lengths: &[usize],
) -> Result<&'a Sm4Iv, Sm4SystemError> {
    let iv = iv.ok_or(Sm4SystemError::MissingIv(mode))?;
    if !lengths.contains(&iv.as_bytes().len()) {
        return Err(Sm4SystemError::InvalidIvSize {
            expected: lengths.last().copied().unwrap_or(SM4_BLOCK_LEN),
            actual: iv.as_bytes().len(),
        });
    }
    Ok(iv)
}

fn check_block_aligned(ciphertext: &[u8]) -> Result<(), Sm4SystemError> {
    if ciphertext.len() % SM4_BLOCK_LEN != 0 {
        return Err(Sm4SystemError::MalformedCiphertext(format!(
            "length {} is not a multiple of {}",
            ciphertext.len(),
            SM4_BLOCK_LEN
        )));
    }
    Ok(())
}

fn invalid_key_size(key: &Sm4Key) -> Sm4SystemError {
    Sm4SystemError::InvalidKeySize {
        expected: KEY_SIZE,
        actual: key.as_bytes().len(),
    }
}

fn generate_key() -> Result<Sm4Key, Sm4SystemError> {
    Ok(Sm4Key(ZeroizingVec(next_bytes(KEY_SIZE)?)))
}

fn import_key(key_data: &str) -> Result<Sm4Key, Sm4SystemError> {
    let material = KeyMaterial::sm4_key(key_data, Encoding::Hex)?;
    Sm4Key::from_key_material(&material)
}

/// SM4-ECB，PKCS7 填充。
///
/// 相同的明文分组总是得到相同的密文分组，会泄露数据模式。
#[derive(Debug, Default)]
pub struct Sm4Ecb;

impl SymmetricCryptographicSystem for Sm4Ecb {
    const KEY_SIZE: usize = KEY_SIZE;
    const REQUIRES_IV: bool = false;
    type Key = Sm4Key;
    type Iv = Sm4Iv;
    type Error = Sm4SystemError;

    fn generate_key(_config: &CryptoConfig) -> Result<Self::Key, Self::Error> {
        generate_key()
    }

    fn encrypt(
        key: &Self::Key,
        _iv: Option<&Self::Iv>,
        plaintext: &[u8],
        _additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, Self::Error> {
        if plaintext.is_empty() {
            return Ok(Vec::new());
        }
        let cipher = Sm4EcbEnc::new_from_slice(key.as_bytes()).map_err(|_| invalid_key_size(key))?;
        Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }

    fn decrypt(
        key: &Self::Key,
        _iv: Option<&Self::Iv>,
        ciphertext: &[u8],
        _additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, Self::Error> {
        if ciphertext.is_empty() {
            return Ok(Vec::new());
        }
        check_block_aligned(ciphertext)?;
        let cipher = Sm4EcbDec::new_from_slice(key.as_bytes()).map_err(|_| invalid_key_size(key))?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| Sm4SystemError::DecryptionFailed("invalid PKCS7 padding".to_string()))
    }

    fn export_key(key: &Self::Key) -> Result<String, Self::Error> {
        Ok(encode_hex(key.as_bytes()))
    }

    fn import_key(key_data: &str) -> Result<Self::Key, Self::Error> {
        import_key(key_data)
    }
}

/// SM4-CBC，PKCS7 填充。IV 的唯一性由调用方保证。
#[derive(Debug, Default)]
pub struct Sm4Cbc;

impl SymmetricCryptographicSystem for Sm4Cbc {
    const KEY_SIZE: usize = KEY_SIZE;
    const REQUIRES_IV: bool = true;
    type Key = Sm4Key;
    type Iv = Sm4Iv;
    type Error = Sm4SystemError;

    fn generate_key(_config: &CryptoConfig) -> Result<Self::Key, Self::Error> {
        generate_key()
    }

    fn encrypt(
        key: &Self::Key,
        iv: Option<&Self::Iv>,
        plaintext: &[u8],
        _additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, Self::Error> {
        let iv = require_iv(Sm4Mode::Cbc, iv, &[SM4_BLOCK_LEN])?;
        if plaintext.is_empty() {
            return Ok(Vec::new());
        }
        let cipher = Sm4CbcEnc::new_from_slices(key.as_bytes(), iv.as_bytes())
            .map_err(|_| invalid_key_size(key))?;
        Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }

    fn decrypt(
        key: &Self::Key,
        iv: Option<&Self::Iv>,
        ciphertext: &[u8],
        _additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, Self::Error> {
        let iv = require_iv(Sm4Mode::Cbc, iv, &[SM4_BLOCK_LEN])?;
        if ciphertext.is_empty() {
            return Ok(Vec::new());
        }
        check_block_aligned(ciphertext)?;
        let cipher = Sm4CbcDec::new_from_slices(key.as_bytes(), iv.as_bytes())
            .map_err(|_| invalid_key_size(key))?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| Sm4SystemError::DecryptionFailed("invalid PKCS7 padding".to_string()))
    }

    fn export_key(key: &Self::Key) -> Result<String, Self::Error> {
        Ok(encode_hex(key.as_bytes()))
    }

    fn import_key(key_data: &str) -> Result<Self::Key, Self::Error> {
        import_key(key_data)
    }
}

/// SM4-GCM，16 字节认证标签附在密文末尾。
///
/// nonce 为 12 字节时走标准的 96 位路径，16 字节时先经 GHASH 派生计数器初值。
/// 同一密钥下 nonce 绝不能重复。
#[derive(Debug, Default)]
pub struct Sm4Gcm;

impl SymmetricCryptographicSystem for Sm4Gcm {
    const KEY_SIZE: usize = KEY_SIZE;
    const REQUIRES_IV: bool = true;
    type Key = Sm4Key;
    type Iv = Sm4Iv;
    type Error = Sm4SystemError;

    fn generate_key(_config: &CryptoConfig) -> Result<Self::Key, Self::Error> {
        generate_key()
    }

    fn encrypt(
        key: &Self::Key,
        iv: Option<&Self::Iv>,
        plaintext: &[u8],
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, Self::Error> {
        let nonce = require_iv(Sm4Mode::Gcm, iv, &GCM_NONCE_LENS)?;
        if plaintext.is_empty() {
            return Ok(Vec::new());
        }
        let payload = Payload {
            msg: plaintext,
            aad: additional_data.unwrap_or(&[]),
        };
        let sealed = match nonce.as_bytes().len() {
            GCM_NONCE_LEN => Sm4Gcm96::new_from_slice(key.as_bytes())
                .map_err(|_| invalid_key_size(key))?
                .encrypt(Nonce::<U12>::from_slice(nonce.as_bytes()), payload),
            _ => Sm4Gcm128::new_from_slice(key.as_bytes())
                .map_err(|_| invalid_key_size(key))?
                .encrypt(Nonce::<U16>::from_slice(nonce.as_bytes()), payload),
        };
        sealed.map_err(|e| Sm4SystemError::EncryptionFailed(e.to_string()))
    }

    fn decrypt(
        key: &Self::Key,
        iv: Option<&Self::Iv>,
        ciphertext: &[u8],
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, Self::Error> {
        let nonce = require_iv(Sm4Mode::Gcm, iv, &GCM_NONCE_LENS)?;
        if ciphertext.is_empty() {
            return Ok(Vec::new());
        }
        if ciphertext.len() < TAG_SIZE {
            return Err(Sm4SystemError::MalformedCiphertext(
                "ciphertext is shorter than the authentication tag".to_string(),
            ));
        }
        let payload = Payload {
            msg: ciphertext,
            aad: additional_data.unwrap_or(&[]),
        };
        let opened = match nonce.as_bytes().len() {
            GCM_NONCE_LEN => Sm4Gcm96::new_from_slice(key.as_bytes())
                .map_err(|_| invalid_key_size(key))?
                .decrypt(Nonce::<U12>::from_slice(nonce.as_bytes()), payload),
            _ => Sm4Gcm128::new_from_slice(key.as_bytes())
                .map_err(|_| invalid_key_size(key))?
                .decrypt(Nonce::<U16>::from_slice(nonce.as_bytes()), payload),
        };
        opened.map_err(|_| Sm4SystemError::DecryptionFailed("authentication tag mismatch".to_string()))
    }

    fn export_key(key: &Self::Key) -> Result<String, Self::Error> {
        Ok(encode_hex(key.as_bytes()))
    }

    fn import_key(key_data: &str) -> Result<Self::Key, Self::Error> {
        import_key(key_data)
    }
}

/// 运行时选择的模式是否需要 IV/nonce
pub fn requires_iv(mode: Sm4Mode) -> bool {
    match mode {
        Sm4Mode::Ecb => Sm4Ecb::REQUIRES_IV,
        Sm4Mode::Cbc => Sm4Cbc::REQUIRES_IV,
        Sm4Mode::Gcm => Sm4Gcm::REQUIRES_IV,
    }
}

/// 不需要 IV 的模式丢弃传入的 IV；只有 GCM 接受附加认证数据
fn checked_inputs<'a>(
    mode: Sm4Mode,
    iv: Option<&'a Sm4Iv>,
    additional_data: Option<&[u8]>,
) -> Result<Option<&'a Sm4Iv>, Sm4SystemError> {
    if additional_data.is_some() && mode != Sm4Mode::Gcm {
        return Err(Sm4SystemError::UnexpectedAad(mode));
    }
    if requires_iv(mode) {
        Ok(Some(iv.ok_or(Sm4SystemError::MissingIv(mode))?))
    } else {
        Ok(None)
    }
}

/// 按运行时选择的模式加密
pub fn encrypt_with_mode(
    mode: Sm4Mode,
    key: &Sm4Key,
    iv: Option<&Sm4Iv>,
    plaintext: &[u8],
    additional_data: Option<&[u8]>,
) -> Result<Vec<u8>, Sm4SystemError> {
    let iv = checked_inputs(mode, iv, additional_data)?;
    match mode {
        Sm4Mode::Ecb => Sm4Ecb::encrypt(key, iv, plaintext, None),
        Sm4Mode::Cbc => Sm4Cbc::encrypt(key, iv, plaintext, None),
        Sm4Mode::Gcm => Sm4Gcm::encrypt(key, iv, plaintext, additional_data),
    }
}

/// 按运行时选择的模式解密
pub fn decrypt_with_mode(
    mode: Sm4Mode,
    key: &Sm4Key,
    iv: Option<&Sm4Iv>,
    ciphertext: &[u8],
    additional_data: Option<&[u8]>,
) -> Result<Vec<u8>, Sm4SystemError> {
    let iv = checked_inputs(mode, iv, additional_data)?;
    match mode {
        Sm4Mode::Ecb => Sm4Ecb::decrypt(key, iv, ciphertext, None),
        Sm4Mode::Cbc => Sm4Cbc::decrypt(key, iv, ciphertext, None),
        Sm4Mode::Gcm => Sm4Gcm::decrypt(key, iv, ciphertext, additional_data),
    }
}
