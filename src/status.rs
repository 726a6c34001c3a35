//! The set of non-success statuses that have a dedicated error page.

use axum::http::StatusCode;
use std::fmt;

/// Statuses with a rendered error page. Anything else is unexpected.
pub const RENDERED: [StatusCode; 7] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::SEE_OTHER,
    StatusCode::TEMPORARY_REDIRECT,
    StatusCode::BAD_REQUEST,
    StatusCode::NOT_FOUND,
    StatusCode::GONE,
    StatusCode::IM_A_TEAPOT,
];

/// Returns `status` if it has a dedicated error page.
pub fn check(status: StatusCode) -> Result<StatusCode, UnexpectedStatus> {
    if RENDERED.contains(&status) {
        Ok(status)
    } else {
        Err(UnexpectedStatus(status))
    }
}

/// A status outside of [`RENDERED`] reached the error-page layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnexpectedStatus(pub StatusCode);

impl fmt::Display for UnexpectedStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unexpected status {}", self.0)
    }
}

impl std::error::Error for UnexpectedStatus {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_allowed() {
        for code in [301, 303, 307, 400, 404, 410, 418] {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(Ok(status), check(status));
        }
    }

    #[test]
    fn test_unexpected() {
        for code in [200, 302, 401, 403, 405, 500, 503] {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(Err(UnexpectedStatus(status)), check(status));
        }
    }
}
