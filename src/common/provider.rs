//! 进程级的密码学提供者注册。
//!
//! 曲线运算与分组密码轮函数来自 RustCrypto 的 `sm2`/`sm4` 系列 crate，在编译期静态链接。
//! 这里只在首次使用时登记一次可用的算法模式，之后的调用都复用同一份只读信息。
use crate::common::mode::{CipherMode, Sm4Mode};
use std::sync::OnceLock;

/// 提供者名称
pub const PROVIDER_NAME: &str = "RustCrypto";

/// 已注册提供者的只读描述
#[derive(Debug)]
pub struct CryptoProvider {
    name: &'static str,
    modes: Vec<CipherMode>,
}

impl CryptoProvider {
    fn register() -> Self {
        let modes: Vec<CipherMode> = CipherMode::ALL
            .into_iter()
            .filter(|mode| compiled_in(*mode))
            .collect();
        tracing::debug!(
            provider = PROVIDER_NAME,
            modes = ?modes,
            "registered cryptography provider"
        );
        Self {
            name: PROVIDER_NAME,
            modes,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn modes(&self) -> &[CipherMode] {
        &self.modes
    }

    pub fn supports(&self, mode: impl Into<CipherMode>) -> bool {
        self.modes.contains(&mode.into())
    }
}

fn compiled_in(mode: CipherMode) -> bool {
    match mode {
        CipherMode::Sm2(_) => cfg!(feature = "asymmetric"),
        CipherMode::Sm4(Sm4Mode::Ecb | Sm4Mode::Cbc | Sm4Mode::Gcm) => cfg!(feature = "symmetric"),
    }
}

static PROVIDER: OnceLock<CryptoProvider> = OnceLock::new();

/// 返回全局提供者，首次调用时完成注册。并发首次调用是安全的，只会注册一次。
pub fn provider() -> &'static CryptoProvider {
    PROVIDER.get_or_init(CryptoProvider::register)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::mode::Sm2Mode;

    #[test]
    fn test_provider_is_registered_once() {
        let a = provider() as *const CryptoProvider;
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| provider() as *const CryptoProvider as usize))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), a as usize);
        }
    }

    #[test]
    fn test_provider_lists_compiled_modes() {
        let p = provider();
        assert_eq!(p.name(), "RustCrypto");
        assert_eq!(p.supports(Sm2Mode::C1C3C2), cfg!(feature = "asymmetric"));
        assert_eq!(p.supports(Sm4Mode::Gcm), cfg!(feature = "symmetric"));
    }
}
