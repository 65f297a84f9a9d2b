//! Role model and the per-request authorization decision.
//!
//! Roles are a closed enumeration so the evaluator can be exhaustive;
//! the wire names (`ROLE_USER`, `ROLE_ADMIN`) exist only at the edges.

pub mod token;

pub use token::{Claims, TokenError, TokenService};

/// Closed role enumeration. Order matters for `RoleSet` storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }

    /// Parses a wire name back into a role. Unknown names are rejected,
    /// not defaulted, so stale tokens cannot smuggle roles in.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "ROLE_USER" => Some(Self::User),
            "ROLE_ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Maps a signup role tag. Anything that is not `admin` grants USER,
    /// matching the signup contract.
    #[must_use]
    pub fn from_signup_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

/// Small ordered set of roles. A user holds at most two entries, so a
/// sorted `Vec` beats a hash set here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    roles: Vec<Role>,
}

impl RoleSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { roles: Vec::new() }
    }

    #[must_use]
    pub fn user_only() -> Self {
        Self {
            roles: vec![Role::User],
        }
    }

    pub fn insert(&mut self, role: Role) {
        if let Err(pos) = self.roles.binary_search(&role) {
            self.roles.insert(pos, role);
        }
    }

    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        self.roles.binary_search(&role).is_ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.roles.iter().copied()
    }

    #[must_use]
    pub fn wire_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.wire_name().to_string()).collect()
    }

    /// Rebuilds a set from wire names, silently dropping unknown ones.
    #[must_use]
    pub fn from_wire_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names.into_iter().filter_map(Role::from_wire_name).collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = Self::new();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

/// Role requirement an endpoint declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    None,
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Decides access for one request. Pure; must run before any store
/// access so a Deny has zero side effects.
///
/// Rules, in order: no requirement allows anyone; ADMIN supersedes
/// ownership everywhere; a USER requirement with an owner id from the
/// route allows only the owner; a USER requirement without an owner id
/// ("my own profile" routes) allows any authenticated caller.
#[must_use]
pub fn authorize(required: RequiredRole, owner_id: Option<i64>, claims: &Claims) -> Decision {
    if required == RequiredRole::None {
        return Decision::Allow;
    }

    if claims.roles.contains(Role::Admin) {
        return Decision::Allow;
    }

    match (required, owner_id) {
        (RequiredRole::User, Some(owner)) if claims.subject_id == owner => Decision::Allow,
        (RequiredRole::User, None) => Decision::Allow,
        _ => Decision::Deny,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(subject_id: i64, roles: &[Role]) -> Claims {
        Claims {
            subject_id,
            email: format!("user{subject_id}@example.com"),
            roles: roles.iter().copied().collect(),
            expires_at: i64::MAX,
        }
    }

    #[test]
    fn none_requirement_allows_everyone() {
        let c = claims(1, &[Role::User]);
        assert_eq!(authorize(RequiredRole::None, None, &c), Decision::Allow);
        assert_eq!(authorize(RequiredRole::None, Some(99), &c), Decision::Allow);
    }

    #[test]
    fn admin_supersedes_ownership() {
        let admin = claims(1, &[Role::Admin]);
        assert_eq!(authorize(RequiredRole::User, Some(99), &admin), Decision::Allow);
        assert_eq!(authorize(RequiredRole::Admin, None, &admin), Decision::Allow);
        assert_eq!(authorize(RequiredRole::Admin, Some(99), &admin), Decision::Allow);
    }

    #[test]
    fn admin_requirement_denies_plain_users() {
        let user = claims(5, &[Role::User]);
        assert_eq!(authorize(RequiredRole::Admin, None, &user), Decision::Deny);
        assert_eq!(authorize(RequiredRole::Admin, Some(5), &user), Decision::Deny);
    }

    #[test]
    fn owner_match_allows_self_only() {
        let user = claims(5, &[Role::User]);
        assert_eq!(authorize(RequiredRole::User, Some(5), &user), Decision::Allow);
        assert_eq!(authorize(RequiredRole::User, Some(6), &user), Decision::Deny);
    }

    #[test]
    fn user_requirement_without_owner_allows_authenticated() {
        let user = claims(5, &[Role::User]);
        assert_eq!(authorize(RequiredRole::User, None, &user), Decision::Allow);
    }

    #[test]
    fn role_set_is_sorted_and_deduped() {
        let mut set = RoleSet::new();
        set.insert(Role::Admin);
        set.insert(Role::User);
        set.insert(Role::Admin);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Role::User, Role::Admin]);
    }

    #[test]
    fn unknown_wire_names_are_dropped() {
        let set = RoleSet::from_wire_names(["ROLE_ADMIN", "ROLE_SUPERUSER"]);
        assert!(set.contains(Role::Admin));
        assert!(!set.contains(Role::User));
    }
}
