pub mod attendance;
pub mod employee;

use std::fmt::Display;

use actix_web::web;

use crate::error::AppError;

/// Path and query ids arrive as text so a malformed one is a 400 with a
/// message instead of the router's bare 404.
pub(crate) fn parse_id(name: &str, raw: &str) -> Result<u64, AppError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| AppError::validation(format!("Invalid {name} '{raw}'")))
}

pub(crate) fn invalid_body(err: impl Display) -> AppError {
    AppError::validation(format!("Invalid request body: {err}"))
}

/// Routes extractor failures through [`AppError`] so they answer with the
/// same JSON body as every other 400.
pub fn extractor_errors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| invalid_body(err).into()))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            AppError::validation(format!("Invalid query string: {err}")).into()
        }))
        .app_data(web::PathConfig::default().error_handler(|err, _req| {
            AppError::validation(format!("Invalid path: {err}")).into()
        }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_ids_only() {
        assert_eq!(parse_id("id", "42").unwrap(), 42);
        assert_eq!(parse_id("id", " 7 ").unwrap(), 7);
        assert!(parse_id("id", "abc").is_err());
        assert!(parse_id("id", "-1").is_err());
        assert_eq!(
            parse_id("employeeId", "x").unwrap_err().to_string(),
            "Invalid employeeId 'x'"
        );
    }
}
