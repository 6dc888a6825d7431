use crate::asymmetric::systems::sm2::Sm2SystemError;
use crate::common::errors::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AsymmetricError {
    #[error("SM2 error: {0}")]
    Sm2(#[from] Sm2SystemError),
}

impl AsymmetricError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AsymmetricError::Sm2(e) => e.kind(),
        }
    }
}
