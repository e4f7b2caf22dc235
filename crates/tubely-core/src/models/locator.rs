use crate::error::AppError;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Object-store locator persisted on a video record as `bucket,key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocator {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocator {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl FromStr for ObjectLocator {
    type Err = AppError;

    /// Exactly two non-empty comma separated parts; anything else is an `Io` error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(bucket), Some(key), None) if !bucket.is_empty() && !key.is_empty() => {
                Ok(ObjectLocator::new(bucket, key))
            }
            _ => Err(AppError::Io(format!(
                "invalid video locator format (expected bucket,key): {:?}",
                s
            ))),
        }
    }
}

impl Display for ObjectLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{},{}", self.bucket, self.key)
    }
}
