use std::error::Error;
use std::fmt::{Display, Formatter};

macro_rules! impl_from_store_error {
    ($variant:path, $ty:path) => {
        impl From<$ty> for StoreError {
            fn from(value: $ty) -> Self {
                $variant(value)
            }
        }
    };
}

#[derive(Debug)]
pub enum StoreError {
    /// No alias with this name. Expected on `wake`, where it means "literal mac".
    NotFound(String),
    IOError(std::io::Error),
    Corrupt(serde_json::Error),
}

use StoreError::*;
impl_from_store_error!(IOError, std::io::Error);
impl_from_store_error!(Corrupt, serde_json::Error);

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NotFound(..))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFound(name) => write!(f, "no such alias: {}", name),
            IOError(e) => write!(f, "alias database i/o error: {}", e),
            Corrupt(e) => write!(f, "alias database is corrupt: {}", e),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NotFound(..) => None,
            IOError(e) => Some(e),
            Corrupt(e) => Some(e),
        }
    }
}
