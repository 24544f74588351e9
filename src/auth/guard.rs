//! Per-owner resource isolation
//!
//! A resource is visible and mutable only to the identity recorded as its
//! owner. A denied outcome must be reported exactly like not-found so a
//! caller cannot probe for the existence of other users' resources.

/// Authorization outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

/// Decide access for an authenticated identity against a resource owner.
///
/// Creates never pass through here: a new resource is owned by its creator.
pub fn authorize(user_id: i64, resource_owner_id: i64) -> Access {
    if user_id == resource_owner_id {
        Access::Allowed
    } else {
        Access::Denied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_allowed() {
        assert_eq!(authorize(7, 7), Access::Allowed);
    }

    #[test]
    fn non_owner_is_denied() {
        assert_eq!(authorize(7, 8), Access::Denied);
    }
}
