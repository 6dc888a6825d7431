//! `MaskingEngine` 是执行列脱敏加解密的统一入口。
//!
//! 每次调用都按 "解码 → 解析密钥 → 变换 → 编码" 的顺序处理一个值，不缓存任何密钥。
//! 引擎本身只持有只读配置，可以在线程间自由共享。

use crate::common::codec::{EncodedPayload, Encoding, utf8_lossy};
use crate::common::config::{ConfigFile, CryptoConfig};
use crate::common::errors::Error;
use crate::common::mode::CipherMode;
use crate::common::provider::provider;
use std::path::Path;

#[cfg(feature = "asymmetric")]
use crate::asymmetric::systems::sm2::{
    DEFAULT_USER_ID, Sm2Decryptor, Sm2Encryptor, Sm2PrivateKey, Sm2PublicKey,
};
#[cfg(feature = "asymmetric")]
use crate::common::codec::encode_hex;
#[cfg(feature = "asymmetric")]
use crate::common::mode::Sm2Mode;

#[cfg(feature = "symmetric")]
use crate::common::config::GcmNoncePolicy;
#[cfg(feature = "symmetric")]
use crate::common::mode::Sm4Mode;
#[cfg(feature = "symmetric")]
use crate::symmetric::systems::sm4::{self, Sm4Iv, Sm4Key};

#[cfg(any(feature = "asymmetric", feature = "symmetric"))]
use crate::common::key_material::KeyMaterial;

/// 列脱敏引擎
#[derive(Clone, Debug)]
pub struct MaskingEngine {
    config: CryptoConfig,
}

impl Default for MaskingEngine {
    fn default() -> Self {
        Self::new(CryptoConfig::default())
    }
}

impl MaskingEngine {
    /// 使用给定配置创建引擎，并确保提供者已经注册
    pub fn new(config: CryptoConfig) -> Self {
        provider();
        Self { config }
    }

    /// 从 JSON 配置文件创建引擎
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(Self::new(ConfigFile::from_file(path)?.crypto))
    }

    /// 从 `SM_SEAL_*` 环境变量创建引擎
    pub fn from_env() -> Self {
        Self::new(ConfigFile::from_env().crypto)
    }

    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    /// 确认模式已在提供者中登记
    #[cfg(any(feature = "asymmetric", feature = "symmetric"))]
    fn ensure_supported(&self, mode: impl Into<CipherMode>) -> Result<(), Error> {
        let mode = mode.into();
        if provider().supports(mode) {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "{mode} is not registered with the {} provider",
                provider().name()
            )))
        }
    }
}

#[cfg(feature = "asymmetric")]
impl MaskingEngine {
    /// 按配置的编码与严格程度解析 SM2 公钥
    pub fn sm2_public_key(&self, text: &str) -> Result<Sm2PublicKey, Error> {
        let material = KeyMaterial::sm2_public_key(
            text,
            self.config.sm2_key_encoding,
            self.config.strict_sm2_public_key,
        )?;
        Ok(Sm2PublicKey::from_key_material(&material)?)
    }

    /// 按配置的编码解析 SM2 私钥
    pub fn sm2_private_key(&self, text: &str) -> Result<Sm2PrivateKey, Error> {
        let material = KeyMaterial::sm2_private_key(text, self.config.sm2_key_encoding)?;
        Ok(Sm2PrivateKey::from_key_material(&material)?)
    }

    /// SM2 加密一个字符串值，结果按 `encoding` 编码。空明文直接返回空串。
    pub fn sm2_encrypt(
        &self,
        public_key: &str,
        plaintext: &str,
        mode: Sm2Mode,
        encoding: Encoding,
    ) -> Result<String, Error> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        let key = self.sm2_public_key(public_key)?;
        let ciphertext = self.sm2_encrypt_bytes(&key, plaintext.as_bytes(), mode)?;
        Ok(EncodedPayload::new(ciphertext, encoding).to_text())
    }

    /// SM2 解密一个编码后的密文。密文或私钥为空时返回 `None`。
    pub fn sm2_decrypt(
        &self,
        private_key: &str,
        ciphertext: &str,
        mode: Sm2Mode,
        encoding: Encoding,
    ) -> Result<Option<String>, Error> {
        if ciphertext.is_empty() || private_key.is_empty() {
            return Ok(None);
        }
        let key = self.sm2_private_key(private_key)?;
        let payload = EncodedPayload::parse(ciphertext, encoding)?;
        let plaintext = self.sm2_decrypt_bytes(&key, payload.bytes(), mode)?;
        Ok(Some(utf8_lossy(&plaintext)))
    }

    pub fn sm2_encrypt_bytes(
        &self,
        public_key: &Sm2PublicKey,
        plaintext: &[u8],
        mode: Sm2Mode,
    ) -> Result<Vec<u8>, Error> {
        self.ensure_supported(mode)?;
        tracing::debug!(%mode, "SM2 encrypt");
        Ok(Sm2Encryptor::new(public_key, mode)?.encrypt(plaintext)?)
    }

    pub fn sm2_decrypt_bytes(
        &self,
        private_key: &Sm2PrivateKey,
        ciphertext: &[u8],
        mode: Sm2Mode,
    ) -> Result<Vec<u8>, Error> {
        self.ensure_supported(mode)?;
        tracing::debug!(%mode, "SM2 decrypt");
        Ok(Sm2Decryptor::new(private_key, mode)?.decrypt(ciphertext)?)
    }

    /// 由私钥推导公钥，返回不带 `04` 前缀的 128 个十六进制字符 (`x || y`)
    pub fn sm2_get_public_key(&self, private_key: &str) -> Result<String, Error> {
        let key = self.sm2_private_key(private_key)?;
        Ok(encode_hex(key.public_key()?.coordinates()))
    }

    /// SM2 签名，返回按 `encoding` 编码的 64 字节 `r || s`。
    /// `user_id` 为空时使用默认 ID `1234567812345678`。
    pub fn sm2_sign(
        &self,
        private_key: &str,
        message: &str,
        user_id: Option<&str>,
        encoding: Encoding,
    ) -> Result<String, Error> {
        let key = self.sm2_private_key(private_key)?;
        let user_id = user_id.filter(|id| !id.is_empty()).unwrap_or(DEFAULT_USER_ID);
        tracing::debug!(user_id, "SM2 sign");
        let signature = key.sign(message.as_bytes(), user_id)?;
        Ok(EncodedPayload::new(signature, encoding).to_text())
    }

    /// 校验 SM2 签名。签名不成立返回 `false`；密钥或签名格式不对时报错。
    pub fn sm2_verify(
        &self,
        public_key: &str,
        message: &str,
        signature: &str,
        user_id: Option<&str>,
        encoding: Encoding,
    ) -> Result<bool, Error> {
        let key = self.sm2_public_key(public_key)?;
        let user_id = user_id.filter(|id| !id.is_empty()).unwrap_or(DEFAULT_USER_ID);
        let signature = EncodedPayload::parse(signature, encoding)?;
        tracing::debug!(user_id, "SM2 verify");
        Ok(key.verify(message.as_bytes(), signature.bytes(), user_id)?)
    }

    /// 生成新的 SM2 密钥对，返回 `(公钥, 私钥)` 的十六进制文本。
    /// 公钥为带 `04` 前缀的 130 个字符，私钥为 64 个字符。
    pub fn generate_sm2_keypair(&self) -> Result<(String, String), Error> {
        use crate::asymmetric::systems::sm2::Sm2CryptoSystem;
        use crate::asymmetric::traits::AsymmetricCryptographicSystem;

        // 密钥本身与密文顺序无关
        type System = Sm2CryptoSystem;
        let (public_key, private_key) = System::generate_keypair(&self.config)?;
        Ok((
            System::export_public_key(&public_key)?,
            System::export_private_key(&private_key)?,
        ))
    }
}

#[cfg(feature = "symmetric")]
impl MaskingEngine {
    /// 解析 SM4 密钥。`encoding` 为 Base64 时额外接受 Base64 形式的密钥。
    pub fn sm4_key(&self, text: &str, encoding: Encoding) -> Result<Sm4Key, Error> {
        let material = KeyMaterial::sm4_key(text, encoding)?;
        Ok(Sm4Key::from_key_material(&material)?)
    }

    /// 按模式与 nonce 策略确定 IV。
    ///
    /// ECB 忽略 IV；CBC 必须提供 16 字节 IV；GCM 接受 12 或 16 字节 nonce，
    /// 未提供时仅在旧版兼容策略下以密钥作为 nonce。
    pub fn sm4_iv(
        &self,
        mode: Sm4Mode,
        key_text: &str,
        iv: Option<&str>,
        encoding: Encoding,
    ) -> Result<Option<Sm4Iv>, Error> {
        let iv = iv.filter(|s| !s.is_empty());
        if !sm4::requires_iv(mode) {
            if iv.is_some() {
                tracing::debug!(%mode, "ignoring IV supplied for a mode without one");
            }
            return Ok(None);
        }
        match (mode, iv) {
            (Sm4Mode::Gcm, Some(text)) => {
                let material = KeyMaterial::gcm_nonce(text, encoding)?;
                Ok(Some(Sm4Iv::from_key_material(&material)?))
            }
            (_, Some(text)) => {
                let material = KeyMaterial::sm4_iv(text, encoding)?;
                Ok(Some(Sm4Iv::from_key_material(&material)?))
            }
            (Sm4Mode::Gcm, None)
                if self.config.gcm_nonce_policy == GcmNoncePolicy::LegacyKeyDerived =>
            {
                tracing::warn!(
                    "deriving SM4/GCM nonce from the key; every value under this key reuses the same nonce"
                );
                let key = KeyMaterial::sm4_key(key_text, encoding)?;
                let derived = KeyMaterial::derive_iv_from_key(&key);
                Ok(Some(Sm4Iv::from_key_material(&derived)?))
            }
            (_, None) => Err(Error::InvalidArgument(format!(
                "SM4/{mode} requires an IV or nonce"
            ))),
        }
    }

    /// SM4 加密一个字符串值。空明文直接返回空串。
    pub fn sm4_encrypt(
        &self,
        key: &str,
        plaintext: &str,
        mode: Sm4Mode,
        iv: Option<&str>,
        encoding: Encoding,
    ) -> Result<String, Error> {
        self.sm4_encrypt_with_aad(key, plaintext, mode, iv, None, encoding)
    }

    /// 同 [`sm4_encrypt`](Self::sm4_encrypt)，GCM 模式下额外认证 `aad`。
    /// 其他模式传入 `aad` 时返回 `InvalidArgument`。
    pub fn sm4_encrypt_with_aad(
        &self,
        key: &str,
        plaintext: &str,
        mode: Sm4Mode,
        iv: Option<&str>,
        aad: Option<&str>,
        encoding: Encoding,
    ) -> Result<String, Error> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        let sm4_key = self.sm4_key(key, encoding)?;
        let sm4_iv = self.sm4_iv(mode, key, iv, encoding)?;
        let ciphertext = self.sm4_encrypt_bytes_with_aad(
            &sm4_key,
            sm4_iv.as_ref(),
            plaintext.as_bytes(),
            aad.map(str::as_bytes),
            mode,
        )?;
        Ok(EncodedPayload::new(ciphertext, encoding).to_text())
    }

    /// SM4 解密一个编码后的密文。空密文直接返回空串。
    pub fn sm4_decrypt(
        &self,
        key: &str,
        ciphertext: &str,
        mode: Sm4Mode,
        iv: Option<&str>,
        encoding: Encoding,
    ) -> Result<String, Error> {
        self.sm4_decrypt_with_aad(key, ciphertext, mode, iv, None, encoding)
    }

    /// 同 [`sm4_decrypt`](Self::sm4_decrypt)，`aad` 必须与加密时一致
    pub fn sm4_decrypt_with_aad(
        &self,
        key: &str,
        ciphertext: &str,
        mode: Sm4Mode,
        iv: Option<&str>,
        aad: Option<&str>,
        encoding: Encoding,
    ) -> Result<String, Error> {
        if ciphertext.is_empty() {
            return Ok(String::new());
        }
        let sm4_key = self.sm4_key(key, encoding)?;
        let sm4_iv = self.sm4_iv(mode, key, iv, encoding)?;
        let payload = EncodedPayload::parse(ciphertext, encoding)?;
        let plaintext = self.sm4_decrypt_bytes_with_aad(
            &sm4_key,
            sm4_iv.as_ref(),
            payload.bytes(),
            aad.map(str::as_bytes),
            mode,
        )?;
        Ok(utf8_lossy(&plaintext))
    }

    pub fn sm4_encrypt_bytes(
        &self,
        key: &Sm4Key,
        iv: Option<&Sm4Iv>,
        plaintext: &[u8],
        mode: Sm4Mode,
    ) -> Result<Vec<u8>, Error> {
        self.sm4_encrypt_bytes_with_aad(key, iv, plaintext, None, mode)
    }

    pub fn sm4_encrypt_bytes_with_aad(
        &self,
        key: &Sm4Key,
        iv: Option<&Sm4Iv>,
        plaintext: &[u8],
        aad: Option<&[u8]>,
        mode: Sm4Mode,
    ) -> Result<Vec<u8>, Error> {
        self.ensure_supported(mode)?;
        tracing::debug!(%mode, with_aad = aad.is_some(), "SM4 encrypt");
        Ok(sm4::encrypt_with_mode(mode, key, iv, plaintext, aad)?)
    }

    pub fn sm4_decrypt_bytes(
        &self,
        key: &Sm4Key,
        iv: Option<&Sm4Iv>,
        ciphertext: &[u8],
        mode: Sm4Mode,
    ) -> Result<Vec<u8>, Error> {
        self.sm4_decrypt_bytes_with_aad(key, iv, ciphertext, None, mode)
    }

    pub fn sm4_decrypt_bytes_with_aad(
        &self,
        key: &Sm4Key,
        iv: Option<&Sm4Iv>,
        ciphertext: &[u8],
        aad: Option<&[u8]>,
        mode: Sm4Mode,
    ) -> Result<Vec<u8>, Error> {
        self.ensure_supported(mode)?;
        tracing::debug!(%mode, with_aad = aad.is_some(), "SM4 decrypt");
        Ok(sm4::decrypt_with_mode(mode, key, iv, ciphertext, aad)?)
    }

    /// 生成新的 SM4 密钥，返回 32 个字符的十六进制文本
    pub fn generate_sm4_key(&self) -> Result<String, Error> {
        use crate::symmetric::systems::sm4::Sm4Ecb;
        use crate::symmetric::traits::SymmetricCryptographicSystem;

        let key = Sm4Ecb::generate_key(&self.config)?;
        Ok(Sm4Ecb::export_key(&key)?)
    }
}

#[cfg(all(feature = "symmetric", feature = "parallel"))]
impl MaskingEngine {
    /// [并行] 用同一密钥与 IV 加密一整列值，结果顺序与输入一致
    pub fn sm4_encrypt_column<T>(
        &self,
        key: &str,
        values: &[T],
        mode: Sm4Mode,
        iv: Option<&str>,
        encoding: Encoding,
    ) -> Result<Vec<String>, Error>
    where
        T: AsRef<str> + Sync,
    {
        use crate::symmetric::systems::sm4::{Sm4Cbc, Sm4Ecb, Sm4Gcm};
        use crate::symmetric::traits::SymmetricParallelSystem;

        let sm4_key = self.sm4_key(key, encoding)?;
        let sm4_iv = self.sm4_iv(mode, key, iv, encoding)?;
        let rows: Vec<&[u8]> = values.iter().map(|v| v.as_ref().as_bytes()).collect();
        tracing::debug!(%mode, rows = rows.len(), "SM4 column encrypt");

        let encrypted = match mode {
            Sm4Mode::Ecb => Sm4Ecb::par_encrypt_batch(&sm4_key, sm4_iv.as_ref(), &rows)?,
            Sm4Mode::Cbc => Sm4Cbc::par_encrypt_batch(&sm4_key, sm4_iv.as_ref(), &rows)?,
            Sm4Mode::Gcm => Sm4Gcm::par_encrypt_batch(&sm4_key, sm4_iv.as_ref(), &rows)?,
        };
        Ok(encrypted.into_iter().map(|c| encoding.encode(&c)).collect())
    }

    /// [并行] 用同一密钥与 IV 解密一整列值
    pub fn sm4_decrypt_column<T>(
        &self,
        key: &str,
        values: &[T],
        mode: Sm4Mode,
        iv: Option<&str>,
        encoding: Encoding,
    ) -> Result<Vec<String>, Error>
    where
        T: AsRef<str> + Sync,
    {
        use crate::symmetric::systems::sm4::{Sm4Cbc, Sm4Ecb, Sm4Gcm};
        use crate::symmetric::traits::SymmetricParallelSystem;

        let sm4_key = self.sm4_key(key, encoding)?;
        let sm4_iv = self.sm4_iv(mode, key, iv, encoding)?;
        let rows = values
            .iter()
            .map(|v| encoding.decode(v.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(%mode, rows = rows.len(), "SM4 column decrypt");

        let decrypted = match mode {
            Sm4Mode::Ecb => Sm4Ecb::par_decrypt_batch(&sm4_key, sm4_iv.as_ref(), &rows)?,
            Sm4Mode::Cbc => Sm4Cbc::par_decrypt_batch(&sm4_key, sm4_iv.as_ref(), &rows)?,
            Sm4Mode::Gcm => Sm4Gcm::par_decrypt_batch(&sm4_key, sm4_iv.as_ref(), &rows)?,
        };
        Ok(decrypted.iter().map(|p| utf8_lossy(p)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::ErrorKind;

    const KEY: &str = "mykey12345678901";
    const IV: &str = "1234567890abcdef";

    #[cfg(feature = "symmetric")]
    #[test]
    fn test_sm4_string_roundtrip_all_modes() {
        let engine = MaskingEngine::default();
        for mode in [Sm4Mode::Ecb, Sm4Mode::Cbc, Sm4Mode::Gcm] {
            for encoding in [Encoding::Hex, Encoding::Base64] {
                let c = engine
                    .sm4_encrypt(KEY, "13800138001", mode, Some(IV), encoding)
                    .unwrap();
                let p = engine.sm4_decrypt(KEY, &c, mode, Some(IV), encoding).unwrap();
                assert_eq!(p, "13800138001");
            }
        }
    }

    #[cfg(feature = "symmetric")]
    #[test]
    fn test_sm4_rejects_17_byte_hex_key() {
        let engine = MaskingEngine::default();
        let err = engine
            .sm4_encrypt(
                "6d796b6579313233343536373839303031",
                "x",
                Sm4Mode::Ecb,
                None,
                Encoding::Hex,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
    }

    #[cfg(feature = "symmetric")]
    #[test]
    fn test_sm4_missing_iv() {
        let engine = MaskingEngine::default();
        let err = engine
            .sm4_encrypt(KEY, "x", Sm4Mode::Cbc, None, Encoding::Base64)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        // 默认策略下 GCM 同样需要显式 nonce
        let err = engine
            .sm4_encrypt(KEY, "x", Sm4Mode::Gcm, Some(""), Encoding::Base64)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[cfg(feature = "symmetric")]
    #[test]
    fn test_sm4_legacy_gcm_nonce_equals_key() {
        let engine = MaskingEngine::new(CryptoConfig {
            gcm_nonce_policy: GcmNoncePolicy::LegacyKeyDerived,
            ..CryptoConfig::default()
        });
        let legacy = engine
            .sm4_encrypt(KEY, "13800138001", Sm4Mode::Gcm, None, Encoding::Base64)
            .unwrap();
        let explicit = engine
            .sm4_encrypt(KEY, "13800138001", Sm4Mode::Gcm, Some(KEY), Encoding::Base64)
            .unwrap();
        assert_eq!(legacy, explicit);
        assert_eq!(
            engine
                .sm4_decrypt(KEY, &legacy, Sm4Mode::Gcm, None, Encoding::Base64)
                .unwrap(),
            "13800138001"
        );
    }

    #[cfg(feature = "symmetric")]
    #[test]
    fn test_sm4_base64_key_under_base64_convention() {
        let engine = MaskingEngine::default();
        let b64_key = "bXlrZXkxMjM0NTY3ODkwMQ==";
        let a = engine
            .sm4_encrypt(b64_key, "value", Sm4Mode::Ecb, None, Encoding::Base64)
            .unwrap();
        let b = engine
            .sm4_encrypt(KEY, "value", Sm4Mode::Ecb, None, Encoding::Base64)
            .unwrap();
        assert_eq!(a, b);
    }

    #[cfg(feature = "symmetric")]
    #[test]
    fn test_sm4_empty_values() {
        let engine = MaskingEngine::default();
        for mode in [Sm4Mode::Ecb, Sm4Mode::Cbc, Sm4Mode::Gcm] {
            assert_eq!(engine.sm4_encrypt(KEY, "", mode, None, Encoding::Hex).unwrap(), "");
            assert_eq!(engine.sm4_decrypt(KEY, "", mode, None, Encoding::Hex).unwrap(), "");
        }
    }

    #[cfg(feature = "symmetric")]
    #[test]
    fn test_sm4_malformed_base64_ciphertext() {
        let engine = MaskingEngine::default();
        let err = engine
            .sm4_decrypt(KEY, "not base64!", Sm4Mode::Ecb, None, Encoding::Base64)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
    }

    #[cfg(feature = "asymmetric")]
    #[test]
    fn test_sm2_string_roundtrip_and_mode_mismatch() {
        let engine = MaskingEngine::default();
        let (public_key, private_key) = engine.generate_sm2_keypair().unwrap();

        let c = engine
            .sm2_encrypt(&public_key, "13800138001", Sm2Mode::C1C3C2, Encoding::Hex)
            .unwrap();
        let p = engine
            .sm2_decrypt(&private_key, &c, Sm2Mode::C1C3C2, Encoding::Hex)
            .unwrap();
        assert_eq!(p.as_deref(), Some("13800138001"));

        let err = engine
            .sm2_decrypt(&private_key, &c, Sm2Mode::C1C2C3, Encoding::Hex)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decryption);
    }

    #[cfg(feature = "asymmetric")]
    #[test]
    fn test_sm2_empty_values() {
        let engine = MaskingEngine::default();
        let (public_key, private_key) = engine.generate_sm2_keypair().unwrap();
        assert_eq!(
            engine
                .sm2_encrypt(&public_key, "", Sm2Mode::C1C3C2, Encoding::Base64)
                .unwrap(),
            ""
        );
        assert_eq!(
            engine
                .sm2_decrypt(&private_key, "", Sm2Mode::C1C3C2, Encoding::Base64)
                .unwrap(),
            None
        );
        assert_eq!(
            engine
                .sm2_decrypt("", "AAEC", Sm2Mode::C1C3C2, Encoding::Base64)
                .unwrap(),
            None
        );
    }

    #[cfg(feature = "asymmetric")]
    #[test]
    fn test_sm2_strict_public_key_config() {
        let lenient = MaskingEngine::default();
        let strict = MaskingEngine::new(CryptoConfig {
            strict_sm2_public_key: true,
            ..CryptoConfig::default()
        });
        let (public_key, _) = lenient.generate_sm2_keypair().unwrap();
        let padded = format!("ffff{}", &public_key[2..]);

        assert!(lenient.sm2_public_key(&padded).is_ok());
        let err = strict.sm2_public_key(&padded).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
        assert!(strict.sm2_public_key(&public_key).is_ok());
    }

    #[test]
    fn test_default_engine_registers_provider() {
        let engine = MaskingEngine::default();
        assert_eq!(engine.config(), &CryptoConfig::default());
        assert!(provider().modes().len() <= CipherMode::ALL.len());
        #[cfg(feature = "symmetric")]
        assert!(engine.ensure_supported(Sm4Mode::Gcm).is_ok());
    }

    #[cfg(feature = "symmetric")]
    #[test]
    fn test_sm4_gcm_12_byte_nonce_and_aad() {
        let engine = MaskingEngine::default();
        let nonce12 = "123456789012";
        let c = engine
            .sm4_encrypt_with_aad(KEY, "13800138001", Sm4Mode::Gcm, Some(nonce12), Some("user:42"), Encoding::Hex)
            .unwrap();
        assert_eq!(c, "9970179777eb5510653023fad1e3bbf469a2b280ab458f109be3c7");

        // 24 位十六进制与 12 个原始字符表示同一个 nonce
        let p = engine
            .sm4_decrypt_with_aad(
                KEY,
                &c,
                Sm4Mode::Gcm,
                Some("313233343536373839303132"),
                Some("user:42"),
                Encoding::Hex,
            )
            .unwrap();
        assert_eq!(p, "13800138001");

        let err = engine
            .sm4_decrypt_with_aad(KEY, &c, Sm4Mode::Gcm, Some(nonce12), Some("user:43"), Encoding::Hex)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decryption);
        let err = engine
            .sm4_decrypt(KEY, &c, Sm4Mode::Gcm, Some(nonce12), Encoding::Hex)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decryption);
    }

    #[cfg(feature = "symmetric")]
    #[test]
    fn test_sm4_nonce_and_aad_restrictions() {
        let engine = MaskingEngine::default();
        // CBC 不接受 12 字节 IV
        let err = engine
            .sm4_encrypt(KEY, "x", Sm4Mode::Cbc, Some("123456789012"), Encoding::Hex)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);

        let err = engine
            .sm4_encrypt(KEY, "x", Sm4Mode::Gcm, Some("12345678901"), Encoding::Hex)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);

        let err = engine
            .sm4_encrypt_with_aad(KEY, "x", Sm4Mode::Cbc, Some(IV), Some("row"), Encoding::Hex)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[cfg(feature = "symmetric")]
    #[test]
    fn test_sm4_hex_ciphertext_without_digits() {
        let engine = MaskingEngine::default();
        let err = engine
            .sm4_decrypt(KEY, "zz", Sm4Mode::Ecb, None, Encoding::Hex)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
    }

    #[cfg(feature = "asymmetric")]
    #[test]
    fn test_sm2_hex_ciphertext_without_digits() {
        let engine = MaskingEngine::default();
        let (_, private_key) = engine.generate_sm2_keypair().unwrap();
        let err = engine
            .sm2_decrypt(&private_key, "zz", Sm2Mode::C1C3C2, Encoding::Hex)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
    }

    #[cfg(feature = "asymmetric")]
    #[test]
    fn test_sm2_get_public_key_matches_generated_pair() {
        let engine = MaskingEngine::default();
        let (public_key, private_key) = engine.generate_sm2_keypair().unwrap();
        let derived = engine.sm2_get_public_key(&private_key).unwrap();
        assert_eq!(derived.len(), 128);
        assert_eq!(derived, public_key[2..]);
    }

    #[cfg(feature = "asymmetric")]
    #[test]
    fn test_sm2_sign_and_verify() {
        let engine = MaskingEngine::default();
        let (public_key, private_key) = engine.generate_sm2_keypair().unwrap();

        let signature = engine
            .sm2_sign(&private_key, "13800138001", None, Encoding::Hex)
            .unwrap();
        assert_eq!(signature.len(), 128);
        assert!(engine
            .sm2_verify(&public_key, "13800138001", &signature, None, Encoding::Hex)
            .unwrap());
        // 空 ID 等同于默认 ID
        assert!(engine
            .sm2_verify(&public_key, "13800138001", &signature, Some(""), Encoding::Hex)
            .unwrap());
        assert!(!engine
            .sm2_verify(&public_key, "13800138001", &signature, Some("ALICE123@YAHOO.COM"), Encoding::Hex)
            .unwrap());
        assert!(!engine
            .sm2_verify(&public_key, "13800138002", &signature, None, Encoding::Hex)
            .unwrap());

        let signature = engine
            .sm2_sign(&private_key, "测试中文加密", Some("ALICE123@YAHOO.COM"), Encoding::Base64)
            .unwrap();
        assert!(engine
            .sm2_verify(&public_key, "测试中文加密", &signature, Some("ALICE123@YAHOO.COM"), Encoding::Base64)
            .unwrap());

        let err = engine
            .sm2_verify(&public_key, "13800138001", "abcd", None, Encoding::Hex)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
    }

    #[cfg(all(feature = "symmetric", feature = "parallel"))]
    #[test]
    fn test_sm4_column_matches_single_values() {
        let engine = MaskingEngine::default();
        let column = vec!["13800138001", "", "测试中文加密", "13900139002"];
        let encrypted = engine
            .sm4_encrypt_column(KEY, &column, Sm4Mode::Cbc, Some(IV), Encoding::Base64)
            .unwrap();
        for (value, cipher) in column.iter().zip(&encrypted) {
            let single = engine
                .sm4_encrypt(KEY, value, Sm4Mode::Cbc, Some(IV), Encoding::Base64)
                .unwrap();
            assert_eq!(&single, cipher);
        }
        let decrypted = engine
            .sm4_decrypt_column(KEY, &encrypted, Sm4Mode::Cbc, Some(IV), Encoding::Base64)
            .unwrap();
        assert_eq!(decrypted, column);
    }
}
