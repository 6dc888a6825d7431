//! 定义 SM2/SM4 的密码模式。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SM2 密文三段的排列顺序。
///
/// C1 为临时曲线点，C2 为被掩码的密文，C3 为完整性摘要。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sm2Mode {
    /// 旧版国密标准的顺序
    C1C2C3,
    /// 现行国密标准的顺序，也是默认值
    #[default]
    C1C3C2,
}

impl Sm2Mode {
    /// 兼容以整数传递模式的调用方：1 表示 C1C3C2，其余值表示 C1C2C3。
    pub fn from_mode_type(mode_type: i32) -> Self {
        if mode_type == 1 {
            Sm2Mode::C1C3C2
        } else {
            Sm2Mode::C1C2C3
        }
    }
}

/// SM4 分组模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sm4Mode {
    Ecb,
    Cbc,
    Gcm,
}

/// 算法与模式的组合。对 SM2 而言，模式同时决定输出三段的顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherMode {
    Sm2(Sm2Mode),
    Sm4(Sm4Mode),
}

impl CipherMode {
    pub const ALL: [CipherMode; 5] = [
        CipherMode::Sm2(Sm2Mode::C1C2C3),
        CipherMode::Sm2(Sm2Mode::C1C3C2),
        CipherMode::Sm4(Sm4Mode::Ecb),
        CipherMode::Sm4(Sm4Mode::Cbc),
        CipherMode::Sm4(Sm4Mode::Gcm),
    ];
}

impl From<Sm2Mode> for CipherMode {
    fn from(mode: Sm2Mode) -> Self {
        CipherMode::Sm2(mode)
    }
}

impl From<Sm4Mode> for CipherMode {
    fn from(mode: Sm4Mode) -> Self {
        CipherMode::Sm4(mode)
    }
}

impl fmt::Display for Sm2Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sm2Mode::C1C2C3 => f.write_str("C1C2C3"),
            Sm2Mode::C1C3C2 => f.write_str("C1C3C2"),
        }
    }
}

impl fmt::Display for Sm4Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sm4Mode::Ecb => f.write_str("ECB"),
            Sm4Mode::Cbc => f.write_str("CBC"),
            Sm4Mode::Gcm => f.write_str("GCM"),
        }
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherMode::Sm2(mode) => write!(f, "SM2/{mode}"),
            CipherMode::Sm4(Sm4Mode::Gcm) => f.write_str("SM4/GCM/NoPadding"),
            CipherMode::Sm4(mode) => write!(f, "SM4/{mode}/PKCS7Padding"),
        }
    }
}

impl FromStr for Sm2Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C1C2C3" => Ok(Sm2Mode::C1C2C3),
            "C1C3C2" => Ok(Sm2Mode::C1C3C2),
            other => Err(format!("unknown SM2 mode: {other}")),
        }
    }
}

impl FromStr for Sm4Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ECB" => Ok(Sm4Mode::Ecb),
            "CBC" => Ok(Sm4Mode::Cbc),
            "GCM" => Ok(Sm4Mode::Gcm),
            other => Err(format!("unknown SM4 mode: {other}")),
        }
    }
}
