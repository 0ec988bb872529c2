use std::error::Error;
use std::fmt::{Display, Formatter};

macro_rules! impl_from_parse_error {
    ($variant:path, $ty:path) => {
        impl From<$ty> for ParseError {
            fn from(value: $ty) -> Self {
                $variant(value)
            }
        }
    };
}

#[derive(Debug)]
pub struct NotFoundPath {
    inner: String
}

#[derive(Debug)]
pub struct DirPath {
    inner: String
}

impl Display for NotFoundPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<String> for NotFoundPath {
    fn from(value: String) -> Self {
        Self { inner: value }
    }
}

impl Display for DirPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<String> for DirPath {
    fn from(value: String) -> Self {
        Self { inner: value }
    }
}

#[derive(Debug)]
pub enum ParseError {
    IOError(std::io::Error),
    SerdeJsonError(serde_json::Error),
    SerdeTomlError(toml::de::Error),
    SerdeYamlError(serde_yml::Error),
    FileNotFound(NotFoundPath),
    PathIsDirectory(DirPath),
}

use ParseError::*;
impl_from_parse_error!(IOError, std::io::Error);
impl_from_parse_error!(SerdeJsonError, serde_json::Error);
impl_from_parse_error!(SerdeTomlError, toml::de::Error);
impl_from_parse_error!(SerdeYamlError, serde_yml::Error);
impl_from_parse_error!(FileNotFound, NotFoundPath);
impl_from_parse_error!(PathIsDirectory, DirPath);

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IOError(e) => write!(f, "{}", e),
            SerdeJsonError(e) => write!(f, "json: {}", e),
            SerdeTomlError(e) => write!(f, "toml: {}", e),
            SerdeYamlError(e) => write!(f, "yaml: {}", e),
            FileNotFound(p) => write!(f, "no such file or directory: {}", p),
            PathIsDirectory(p) => write!(f, "specified path is a directory: {}", p),
        }
    }
}

impl Error for ParseError {}
