use thiserror::Error;

use crate::data::model::Role;

/// Explainable failures of the analysis pipeline. None of these are fatal:
/// each one maps onto a short user-facing message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Data does not contain the required column(s): {}", role_list(.0))]
    UnresolvedSchema(Vec<Role>),

    #[error("No valid geospatial data to display ({dropped} row(s) had missing or invalid coordinates or index).")]
    EmptyAfterFiltering { dropped: usize },
}

impl AnalysisError {
    /// The message wrapped as an HTML paragraph, for the map endpoint.
    pub fn to_html(&self) -> String {
        format!("<p>Error: {}</p>", crate::map::render::escape_html(&self.to_string()))
    }
}

fn role_list(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.canonical_name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = AnalysisError::UnresolvedSchema(vec![Role::Latitude, Role::Longitude]);
        assert_eq!(
            err.to_string(),
            "Data does not contain the required column(s): latitude, longitude"
        );
        assert_eq!(
            err.to_html(),
            "<p>Error: Data does not contain the required column(s): latitude, longitude</p>"
        );

        let err = AnalysisError::EmptyAfterFiltering { dropped: 3 };
        assert!(err.to_string().starts_with("No valid geospatial data to display"));
    }
}
