//! 对称加密核心模块

pub mod errors;
pub mod systems;
pub mod traits;
