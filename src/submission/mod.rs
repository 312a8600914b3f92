pub mod fields;
pub mod parser;
pub mod pipeline;

/// Value written to the trailing "reviewed" column of every new row.
pub const NOT_REVIEWED: &str = "FALSE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub description: String,
}

impl Submission {
    /// Positional sheet row: name, email, description, reviewed flag.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.description.clone(),
            NOT_REVIEWED.to_string(),
        ]
    }
}
