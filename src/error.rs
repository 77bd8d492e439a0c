use crate::Fp;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Grid math divides by the cell size, so it must be finite and strictly positive.
    #[error("invalid cell size {0}: must be finite and greater than zero")]
    InvalidCellSize(Fp),
}
