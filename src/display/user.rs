//! User display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::User;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Active")]
    active: &'static str,
    #[tabled(rename = "Registered")]
    registered: String,
}

/// Format users as a table, oldest registration first
pub fn format_user_table(users: &[User]) -> String {
    if users.is_empty() {
        return "No users registered.".to_string();
    }

    let mut users: Vec<&User> = users.iter().collect();
    users.sort_by_key(|u| u.created_at);

    let rows = users.into_iter().map(|user| UserRow {
        id: user.id.to_string(),
        username: user.username.clone(),
        email: user.email.clone(),
        active: if user.is_active { "yes" } else { "no" },
        registered: user.created_at.format("%Y-%m-%d %H:%M").to_string(),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(format_user_table(&[]), "No users registered.");
    }

    #[test]
    fn test_table_lists_users() {
        let mut bob = User::new("bob", "bob@example.com", "hash");
        bob.is_active = false;
        let alice = User::new("alice", "alice@example.com", "hash");

        let table = format_user_table(&[alice, bob]);
        assert!(table.contains("Username"));
        assert!(table.contains("alice@example.com"));
        let bob_line = table.lines().find(|l| l.contains("bob")).unwrap();
        assert!(bob_line.contains("no"));
    }
}
