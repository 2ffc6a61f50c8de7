// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

/// The caller a session belongs to.
///
/// `Anonymous` is a real, matchable principal: sessions opened without an identity
/// accessor belong to it and only it. `Connection` is a transport session (an MCP session
/// over HTTP) with no authenticated principal; it never matches a `Principal` of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionIdentity {
    #[default]
    Anonymous,
    Principal(String),
    Connection(String),
}

impl SessionIdentity {
    pub const ANONYMOUS_LABEL: &'static str = "anonymous";

    /// Empty or blank names collapse to `Anonymous`.
    pub fn principal(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            Self::Anonymous
        } else {
            Self::Principal(name)
        }
    }

    /// Blank connection ids collapse to `Anonymous`.
    pub fn connection(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.trim().is_empty() {
            Self::Anonymous
        } else {
            Self::Connection(id)
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    pub fn owns(&self, caller: &SessionIdentity) -> bool {
        self == caller
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str(Self::ANONYMOUS_LABEL),
            Self::Principal(name) => write!(f, "principal:{name}"),
            Self::Connection(id) => write!(f, "connection:{id}"),
        }
    }
}

/// Supplies the identity of the current caller when the transport carries none.
pub trait IdentityAccessor: Send + Sync {
    fn current_identity(&self) -> SessionIdentity;
}

/// Accessor that always reports one fixed identity.
#[derive(Debug, Clone)]
pub struct StaticIdentity(SessionIdentity);

impl StaticIdentity {
    pub fn new(identity: SessionIdentity) -> Self {
        Self(identity)
    }
}

impl IdentityAccessor for StaticIdentity {
    fn current_identity(&self) -> SessionIdentity {
        self.0.clone()
    }
}

/// Resolves the caller identity; no accessor means anonymous.
pub fn resolve_identity(accessor: Option<&dyn IdentityAccessor>) -> SessionIdentity {
    accessor.map(IdentityAccessor::current_identity).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{resolve_identity, SessionIdentity, StaticIdentity};

    #[test]
    fn anonymous_only_matches_anonymous() {
        let anon = SessionIdentity::Anonymous;
        let alice = SessionIdentity::principal("alice");
        assert!(anon.owns(&SessionIdentity::Anonymous));
        assert!(!anon.owns(&alice));
        assert!(!alice.owns(&anon));
        assert!(alice.owns(&SessionIdentity::principal("alice")));
    }

    #[test]
    fn principal_named_like_the_anonymous_label_is_not_anonymous() {
        let spoof = SessionIdentity::principal(SessionIdentity::ANONYMOUS_LABEL);
        assert!(!spoof.is_anonymous());
        assert!(!SessionIdentity::Anonymous.owns(&spoof));
    }

    #[test]
    fn connections_only_match_the_same_connection() {
        let first = SessionIdentity::connection("3f0c");
        assert!(first.owns(&SessionIdentity::connection("3f0c")));
        assert!(!first.owns(&SessionIdentity::connection("9a1b")));
        assert!(!first.owns(&SessionIdentity::principal("3f0c")));
        assert_eq!(first.to_string(), "connection:3f0c");
        assert_eq!(SessionIdentity::connection(""), SessionIdentity::Anonymous);
    }

    #[test]
    fn missing_accessor_resolves_to_anonymous() {
        assert_eq!(resolve_identity(None), SessionIdentity::Anonymous);
        let accessor = StaticIdentity::new(SessionIdentity::principal("bob"));
        assert_eq!(resolve_identity(Some(&accessor)), SessionIdentity::principal("bob"));
        assert_eq!(SessionIdentity::principal("  "), SessionIdentity::Anonymous);
    }
}
