//! Pure checks used by the login pipeline.

use lazy_static::lazy_static;
use regex::Regex;

use crate::users::UserStatus;

pub const PENDING_REASON: &str =
    "Your account is pending approval. Please contact administrator";
pub const REJECTED_REASON: &str =
    "Your account has been rejected. Please contact administrator";

/// Outcome of the account status gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCheck {
    Allowed,
    Denied { reason: &'static str },
}

/// Only `approved` lets a user in. Anything unrecognised is treated as
/// not yet approved.
pub fn check_status(status: &str) -> StatusCheck {
    match status.parse::<UserStatus>() {
        Ok(UserStatus::Approved) => StatusCheck::Allowed,
        Ok(UserStatus::Rejected) => StatusCheck::Denied {
            reason: REJECTED_REASON,
        },
        Ok(UserStatus::Pending) | Err(()) => StatusCheck::Denied {
            reason: PENDING_REASON,
        },
    }
}

/// Exact, case-sensitive comparison. No hierarchy: admins select `admin` too.
pub fn matches_role(requested: &str, stored: &str) -> bool {
    requested == stored
}

/// `local@domain.tld` shape only; deliverability is not checked.
pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approved_is_the_only_allowed_status() {
        assert_eq!(check_status("approved"), StatusCheck::Allowed);
        assert_eq!(
            check_status("pending"),
            StatusCheck::Denied {
                reason: PENDING_REASON
            }
        );
        assert_eq!(
            check_status("rejected"),
            StatusCheck::Denied {
                reason: REJECTED_REASON
            }
        );
    }

    #[test]
    fn unknown_status_fails_closed_with_pending_reason() {
        for status in ["", "deleted", "Approved", "APPROVED", "suspended"] {
            assert_eq!(
                check_status(status),
                StatusCheck::Denied {
                    reason: PENDING_REASON
                },
                "status {status:?}"
            );
        }
    }

    #[test]
    fn role_match_is_exact() {
        assert!(matches_role("client", "client"));
        assert!(matches_role("qa-qc-vendor", "qa-qc-vendor"));
        assert!(!matches_role("Client", "client"));
        assert!(!matches_role("admin", "client"));
        assert!(!matches_role("client", "admin"));
        assert!(!matches_role("", "client"));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("jo@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("jo@x"));
        assert!(!is_valid_email("jo.x.com"));
        assert!(!is_valid_email("jo @x.com"));
        assert!(!is_valid_email("jo@@x.com"));
        assert!(!is_valid_email(""));
    }
}
