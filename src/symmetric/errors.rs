use crate::common::errors::ErrorKind;
use crate::symmetric::systems::sm4::Sm4SystemError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymmetricError {
    #[error("SM4 System error: {0}")]
    Sm4(#[from] Sm4SystemError),
}

impl SymmetricError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SymmetricError::Sm4(e) => e.kind(),
        }
    }
}
