use itertools::Itertools;

use crate::server::{config::RolesConfiguration, models::Role};

/// Maps a signed-in email to its role.
pub trait RoleProvider: Send + Sync {
    fn resolve(&self, email: &str) -> Role;

    /// Whether the email appears on any list, students included.
    fn is_listed(&self, email: &str) -> bool;

    /// Professors followed by coordinators, for scheduled detection runs.
    fn staff_emails(&self) -> Vec<String>;
}

/// Role lookup against static email lists. Unknown emails are students.
#[derive(Debug, Default, Clone)]
pub struct AllowlistRoleProvider {
    coordinators: Vec<String>,
    professors: Vec<String>,
    students: Vec<String>,
}

impl AllowlistRoleProvider {
    pub fn new(coordinators: &str, professors: &str, students: &str) -> Self {
        Self {
            coordinators: parse_list(coordinators),
            professors: parse_list(professors),
            students: parse_list(students),
        }
    }

    pub fn from_config(config: &RolesConfiguration) -> Self {
        Self::new(
            &config.coordinator_emails,
            &config.professor_emails,
            &config.student_emails,
        )
    }
}

fn parse_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

impl RoleProvider for AllowlistRoleProvider {
    fn resolve(&self, email: &str) -> Role {
        let email = email.trim().to_lowercase();
        let listed = |list: &[String]| list.iter().any(|entry| *entry == email);

        if listed(&self.coordinators) {
            Role::Coordinador
        } else if listed(&self.professors) {
            Role::Profesor
        } else {
            // Listed students and unknown emails alike.
            Role::Alumno
        }
    }

    fn is_listed(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.coordinators
            .iter()
            .chain(&self.professors)
            .chain(&self.students)
            .any(|entry| *entry == email)
    }

    fn staff_emails(&self) -> Vec<String> {
        self.professors
            .iter()
            .chain(self.coordinators.iter())
            .unique()
            .cloned()
            .collect()
    }
}
