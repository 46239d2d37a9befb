//! Dataplane error types and API return values.
//!
//! Every binary-API reply carries a signed `retval`; zero is success and
//! negative values name the failure. This module turns failing codes into
//! [`DataplaneError`].

use std::fmt;
use thiserror::Error;

/// Return values of the dataplane binary API.
///
/// Unknown codes are preserved in [`ApiRetval::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiRetval {
    Success,
    Unspecified,
    InvalidSwIfIndex,
    NoSuchFib,
    NoSuchInnerFib,
    NoSuchLabel,
    NoSuchEntry,
    InvalidValue,
    InvalidValue2,
    Unimplemented,
    InvalidSwIfIndex2,
    Other(i32),
}

impl ApiRetval {
    /// Creates a return value from the raw code.
    pub fn from_raw(retval: i32) -> Self {
        match retval {
            0 => ApiRetval::Success,
            -1 => ApiRetval::Unspecified,
            -2 => ApiRetval::InvalidSwIfIndex,
            -3 => ApiRetval::NoSuchFib,
            -4 => ApiRetval::NoSuchInnerFib,
            -5 => ApiRetval::NoSuchLabel,
            -6 => ApiRetval::NoSuchEntry,
            -7 => ApiRetval::InvalidValue,
            -8 => ApiRetval::InvalidValue2,
            -9 => ApiRetval::Unimplemented,
            -10 => ApiRetval::InvalidSwIfIndex2,
            other => ApiRetval::Other(other),
        }
    }

    /// Returns the raw code.
    pub fn as_raw(&self) -> i32 {
        match self {
            ApiRetval::Success => 0,
            ApiRetval::Unspecified => -1,
            ApiRetval::InvalidSwIfIndex => -2,
            ApiRetval::NoSuchFib => -3,
            ApiRetval::NoSuchInnerFib => -4,
            ApiRetval::NoSuchLabel => -5,
            ApiRetval::NoSuchEntry => -6,
            ApiRetval::InvalidValue => -7,
            ApiRetval::InvalidValue2 => -8,
            ApiRetval::Unimplemented => -9,
            ApiRetval::InvalidSwIfIndex2 => -10,
            ApiRetval::Other(raw) => *raw,
        }
    }
}

impl fmt::Display for ApiRetval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApiRetval::Success => "SUCCESS",
            ApiRetval::Unspecified => "VNET_API_ERROR_UNSPECIFIED",
            ApiRetval::InvalidSwIfIndex => "VNET_API_ERROR_INVALID_SW_IF_INDEX",
            ApiRetval::NoSuchFib => "VNET_API_ERROR_NO_SUCH_FIB",
            ApiRetval::NoSuchInnerFib => "VNET_API_ERROR_NO_SUCH_INNER_FIB",
            ApiRetval::NoSuchLabel => "VNET_API_ERROR_NO_SUCH_LABEL",
            ApiRetval::NoSuchEntry => "VNET_API_ERROR_NO_SUCH_ENTRY",
            ApiRetval::InvalidValue => "VNET_API_ERROR_INVALID_VALUE",
            ApiRetval::InvalidValue2 => "VNET_API_ERROR_INVALID_VALUE_2",
            ApiRetval::Unimplemented => "VNET_API_ERROR_UNIMPLEMENTED",
            ApiRetval::InvalidSwIfIndex2 => "VNET_API_ERROR_INVALID_SW_IF_INDEX_2",
            ApiRetval::Other(raw) => return write!(f, "retval {}", raw),
        };
        write!(f, "{}", s)
    }
}

/// Error type for dataplane API calls.
#[derive(Debug, Clone, Error)]
pub enum DataplaneError {
    /// The dataplane replied with a non-zero return value.
    #[error("{api} failed: {retval}")]
    Retval { api: &'static str, retval: ApiRetval },

    /// The request could not be delivered or the reply could not be read.
    #[error("transport error during {api}: {message}")]
    Transport { api: &'static str, message: String },

    /// No reply arrived before the caller's deadline.
    #[error("{api} timed out")]
    Timeout { api: &'static str },

    /// The caller abandoned the request.
    #[error("{api} cancelled")]
    Cancelled { api: &'static str },
}

impl DataplaneError {
    /// Creates an error from a raw return value.
    pub fn from_retval(api: &'static str, retval: i32) -> Self {
        DataplaneError::Retval {
            api,
            retval: ApiRetval::from_raw(retval),
        }
    }

    /// Creates a transport error.
    pub fn transport(api: &'static str, message: impl Into<String>) -> Self {
        DataplaneError::Transport {
            api,
            message: message.into(),
        }
    }

    /// Returns the API message name the error belongs to.
    pub fn api(&self) -> &'static str {
        match self {
            DataplaneError::Retval { api, .. }
            | DataplaneError::Transport { api, .. }
            | DataplaneError::Timeout { api }
            | DataplaneError::Cancelled { api } => api,
        }
    }

    /// Returns the return value if the dataplane replied with one.
    pub fn retval(&self) -> Option<ApiRetval> {
        match self {
            DataplaneError::Retval { retval, .. } => Some(*retval),
            _ => None,
        }
    }

    /// Returns true if the same request may succeed when reissued.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DataplaneError::Transport { .. } | DataplaneError::Timeout { .. }
        )
    }
}

/// Result type for dataplane operations.
pub type DataplaneResult<T> = Result<T, DataplaneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retval_from_raw() {
        assert_eq!(ApiRetval::from_raw(0), ApiRetval::Success);
        assert_eq!(ApiRetval::from_raw(-2), ApiRetval::InvalidSwIfIndex);
        assert_eq!(ApiRetval::from_raw(-999), ApiRetval::Other(-999));
        assert_eq!(ApiRetval::from_raw(-999).as_raw(), -999);
        assert_eq!(ApiRetval::NoSuchEntry.as_raw(), -6);
    }

    #[test]
    fn test_error_from_raw_retval() {
        let err = DataplaneError::from_retval("bridge_domain_add_del", -6);
        assert_eq!(err.api(), "bridge_domain_add_del");
        assert_eq!(err.retval(), Some(ApiRetval::NoSuchEntry));
    }

    #[test]
    fn test_error_display() {
        let err = DataplaneError::from_retval("sw_interface_set_l2_bridge", -2);
        assert_eq!(
            err.to_string(),
            "sw_interface_set_l2_bridge failed: VNET_API_ERROR_INVALID_SW_IF_INDEX"
        );

        let err = DataplaneError::from_retval("delete_subif", -120);
        assert_eq!(err.to_string(), "delete_subif failed: retval -120");
    }

    #[test]
    fn test_error_retryable() {
        assert!(DataplaneError::transport("delete_subif", "connection reset").is_retryable());
        assert!(DataplaneError::Timeout { api: "delete_subif" }.is_retryable());
        assert!(!DataplaneError::from_retval("delete_subif", -2).is_retryable());
        assert!(!DataplaneError::Cancelled { api: "delete_subif" }.is_retryable());
    }
}
