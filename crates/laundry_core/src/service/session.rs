//! Login session passed explicitly to session-scoped operations.
//!
//! A session is produced by `LaundrySystem::login_client` /
//! `LaundrySystem::login_admin` and owned by the caller; the service keeps no
//! "current user" of its own.

use crate::model::contact::{Admin, Client};

/// Role of the logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Admin,
}

impl Role {
    /// Stable name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Admin => "admin",
        }
    }
}

/// Authenticated user for one interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Client(Client),
    Admin(Admin),
}

impl Session {
    pub fn role(&self) -> Role {
        match self {
            Self::Client(_) => Role::Client,
            Self::Admin(_) => Role::Admin,
        }
    }

    /// `"<name> <last name>"`, as shown in menu headers.
    pub fn display_name(&self) -> String {
        match self {
            Self::Client(client) => format!("{} {}", client.name, client.last_name),
            Self::Admin(admin) => format!("{} {}", admin.name, admin.last_name),
        }
    }

    pub fn client(&self) -> Option<&Client> {
        match self {
            Self::Client(client) => Some(client),
            Self::Admin(_) => None,
        }
    }

    pub fn admin(&self) -> Option<&Admin> {
        match self {
            Self::Admin(admin) => Some(admin),
            Self::Client(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, Session};
    use crate::model::contact::Client;

    #[test]
    fn client_session_exposes_client_only() {
        let mut client = Client::new(
            "Невская",
            "Есения",
            "Ивановна",
            "79161234567",
            "nevskay@mail.ru",
        );
        client.id = Some(1);
        let session = Session::Client(client);

        assert_eq!(session.role(), Role::Client);
        assert_eq!(session.display_name(), "Есения Невская");
        assert!(session.client().is_some());
        assert!(session.admin().is_none());
    }
}
