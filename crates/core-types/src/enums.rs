use std::fmt;

/// The persisted record types of the gradebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Student,
    Subject,
    Grade,
}

impl Entity {
    /// Human readable name, as used in API messages.
    pub fn name(&self) -> &'static str {
        match self {
            Entity::Student => "Student",
            Entity::Subject => "Subject",
            Entity::Grade => "Grade",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
