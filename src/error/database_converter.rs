use crate::error::{AppError, ConstraintParser};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors to structured AppError variants.
///
/// Constraint violations are mapped onto client errors using the information
/// extracted by [`ConstraintParser`]; anything unparseable stays a `Database` error.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn diesel::result::DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let constraint_name = info.constraint_name();
        let unparsed = |label: &str| AppError::Database {
            operation: operation.to_string(),
            source: anyhow::Error::msg(format!("{label}: {message}")),
        };

        match kind {
            DatabaseErrorKind::UniqueViolation => {
                match ConstraintParser::parse_unique_violation(message, constraint_name) {
                    Some((entity, field, value)) => AppError::Duplicate {
                        entity,
                        field,
                        value,
                    },
                    None => unparsed("Unique constraint violation"),
                }
            }
            DatabaseErrorKind::NotNullViolation => {
                match ConstraintParser::parse_not_null_violation(message, constraint_name) {
                    Some((entity, field)) => AppError::Validation {
                        field,
                        reason: format!("Field is required for {entity}"),
                    },
                    None => unparsed("Not null constraint violation"),
                }
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                match ConstraintParser::parse_foreign_key_violation(message, constraint_name) {
                    Some((entity, field, value)) => AppError::BadRequest {
                        message: format!("Invalid reference from {entity}.{field} to '{value}'"),
                    },
                    None => unparsed("Foreign key constraint violation"),
                }
            }
            DatabaseErrorKind::CheckViolation => {
                match ConstraintParser::parse_check_violation(message, constraint_name) {
                    Some((entity, field)) => AppError::Validation {
                        field,
                        reason: format!("Check constraint failed for {entity} field"),
                    },
                    None => unparsed("Check constraint violation"),
                }
            }
            _ => unparsed("Database error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDatabaseErrorInfo {
        message: String,
        constraint_name: Option<String>,
    }

    impl diesel::result::DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint_name.as_deref()
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, message: &str, constraint: Option<&str>) -> DieselError {
        DieselError::DatabaseError(
            kind,
            Box::new(MockDatabaseErrorInfo {
                message: message.to_string(),
                constraint_name: constraint.map(str::to_string),
            }),
        )
    }

    #[test]
    fn test_convert_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find");
        assert!(matches!(result, AppError::NotFound { .. }));
    }

    #[test]
    fn test_convert_unique_violation() {
        let error = db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value\nKey (api_key)=(api_123) already exists.",
            Some("members_api_key_key"),
        );
        match DatabaseErrorConverter::convert_diesel_error(error, "insert member") {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "member");
                assert_eq!(field, "api_key");
                assert_eq!(value, "api_123");
            }
            other => panic!("Expected Duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_foreign_key_violation() {
        let error = db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "violates foreign key constraint\nKey (club_member_id)=(9) is not present",
            Some("item_assigns_club_member_id_fkey"),
        );
        match DatabaseErrorConverter::convert_diesel_error(error, "insert assign") {
            AppError::BadRequest { message } => {
                assert!(message.contains("item_assign.club_member_id"));
                assert!(message.contains("'9'"));
            }
            other => panic!("Expected BadRequest error, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_not_null_violation() {
        let error = db_error(
            DatabaseErrorKind::NotNullViolation,
            "null value in column \"title\" of relation \"schedules\" violates not-null constraint",
            None,
        );
        match DatabaseErrorConverter::convert_diesel_error(error, "insert schedule") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "title");
                assert!(reason.contains("schedule"));
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_violation_stays_database_error() {
        let error = db_error(DatabaseErrorKind::UniqueViolation, "weird", None);
        assert!(matches!(
            DatabaseErrorConverter::convert_diesel_error(error, "op"),
            AppError::Database { .. }
        ));
    }
}
