//! Response parsing for the 3ds Max listener
//!
//! The listener only ever answers with plain text. Each request kind has an
//! exhaustive set of recognized shapes; anything else lands in an explicit
//! fallback variant instead of being coerced into a default.

use pipeline_core::{PipelineError, Result, SceneObjectStats};

/// Failure marker; matched case-sensitively anywhere in a response
pub const ERROR_SENTINEL: &str = "ERROR";

/// Listener reply for an empty result set
pub const OK_SENTINEL: &str = "OK";

fn is_error(response: &str) -> bool {
    response.contains(ERROR_SENTINEL)
}

fn split_names(response: &str) -> Vec<String> {
    response
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reply to an object listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListResponse {
    Empty,
    Names(Vec<String>),
    Error(String),
}

impl ListResponse {
    pub fn parse(response: &str) -> Self {
        let response = response.trim();
        if response.is_empty() || response == OK_SENTINEL {
            ListResponse::Empty
        } else if is_error(response) {
            ListResponse::Error(response.to_string())
        } else {
            match split_names(response) {
                names if names.is_empty() => ListResponse::Empty,
                names => ListResponse::Names(names),
            }
        }
    }

    pub fn into_result(self) -> Result<Vec<String>> {
        match self {
            ListResponse::Empty => Ok(vec![]),
            ListResponse::Names(names) => Ok(names),
            ListResponse::Error(message) => Err(PipelineError::Protocol(format!(
                "Object listing failed: {}",
                message
            ))),
        }
    }
}

/// Reply to a geometry statistics query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsResponse {
    Stats(SceneObjectStats),
    NotFound,
    Unrecognized(String),
}

impl StatsResponse {
    pub fn parse(response: &str) -> Self {
        let response = response.trim();
        if is_error(response) {
            return StatsResponse::NotFound;
        }

        let parts: Vec<&str> = response.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [polygons, vertices] => match (polygons.parse::<u64>(), vertices.parse::<u64>()) {
                (Ok(polygons), Ok(vertices)) => {
                    StatsResponse::Stats(SceneObjectStats::new(polygons, vertices))
                }
                _ => StatsResponse::Unrecognized(response.to_string()),
            },
            _ => StatsResponse::Unrecognized(response.to_string()),
        }
    }

    pub fn into_result(self, object_name: &str) -> Result<SceneObjectStats> {
        match self {
            StatsResponse::Stats(stats) => Ok(stats),
            StatsResponse::NotFound => Err(PipelineError::NotFound(format!(
                "Object '{}' not found",
                object_name
            ))),
            StatsResponse::Unrecognized(text) => Err(PipelineError::Protocol(format!(
                "Unexpected stats response for '{}': {:?}",
                object_name, text
            ))),
        }
    }
}

/// Reply to an export request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportResponse {
    Succeeded(String),
    Failed(String),
}

impl ExportResponse {
    pub fn parse(response: &str) -> Self {
        let response = response.trim();
        if is_error(response) {
            ExportResponse::Failed(response.to_string())
        } else {
            ExportResponse::Succeeded(response.to_string())
        }
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            ExportResponse::Succeeded(_) => Ok(()),
            ExportResponse::Failed(message) => Err(PipelineError::Export(message)),
        }
    }
}

/// Reply to a texture audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureAuditResponse {
    Clean,
    Missing(Vec<String>),
    NotFound,
}

impl TextureAuditResponse {
    pub fn parse(response: &str) -> Self {
        let response = response.trim();
        if is_error(response) {
            TextureAuditResponse::NotFound
        } else if response.is_empty() || response == OK_SENTINEL {
            TextureAuditResponse::Clean
        } else {
            match split_names(response) {
                names if names.is_empty() => TextureAuditResponse::Clean,
                names => TextureAuditResponse::Missing(names),
            }
        }
    }

    pub fn into_result(self, object_name: &str) -> Result<Vec<String>> {
        match self {
            TextureAuditResponse::Clean => Ok(vec![]),
            TextureAuditResponse::Missing(files) => Ok(files),
            TextureAuditResponse::NotFound => Err(PipelineError::NotFound(format!(
                "Object '{}' not found",
                object_name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_empty_forms() {
        assert_eq!(ListResponse::parse(""), ListResponse::Empty);
        assert_eq!(ListResponse::parse("OK"), ListResponse::Empty);
        assert_eq!(ListResponse::parse(" , ,"), ListResponse::Empty);
    }

    #[test]
    fn test_list_names_trimmed() {
        assert_eq!(
            ListResponse::parse("Table01, Chair02 ,,Box"),
            ListResponse::Names(vec!["Table01".into(), "Chair02".into(), "Box".into()])
        );
    }

    #[test]
    fn test_list_error_is_protocol_fault() {
        let err = ListResponse::parse("-- ERROR: no scene").into_result().unwrap_err();
        assert!(matches!(err, PipelineError::Protocol(_)));
    }

    #[test]
    fn test_stats_parse() {
        assert_eq!(
            StatsResponse::parse("45000,23000"),
            StatsResponse::Stats(SceneObjectStats::new(45_000, 23_000))
        );
        assert_eq!(
            StatsResponse::parse(" 12 , 8 \n"),
            StatsResponse::Stats(SceneObjectStats::new(12, 8))
        );
    }

    #[test]
    fn test_stats_error_sentinel_is_not_found() {
        for response in ["ERROR", "ERROR: Object not found", "45000,ERROR"] {
            let err = StatsResponse::parse(response).into_result("Ghost").unwrap_err();
            assert!(matches!(err, PipelineError::NotFound(_)), "{}", response);
        }
    }

    #[test]
    fn test_stats_sentinel_is_case_sensitive() {
        assert_eq!(
            StatsResponse::parse("error"),
            StatsResponse::Unrecognized("error".into())
        );
    }

    #[test]
    fn test_stats_other_shapes_are_protocol_faults() {
        for response in ["", "OK", "45000", "1,2,3", "-1,5", "12.5,8", "a,b"] {
            let err = StatsResponse::parse(response).into_result("Table01").unwrap_err();
            assert!(matches!(err, PipelineError::Protocol(_)), "{:?}", response);
        }
    }

    #[test]
    fn test_export_outcomes() {
        assert!(ExportResponse::parse("\"SUCCESS\"").into_result().is_ok());
        assert!(ExportResponse::parse("").into_result().is_ok());

        match ExportResponse::parse("ERROR: Object not found").into_result() {
            Err(PipelineError::Export(message)) => assert_eq!(message, "ERROR: Object not found"),
            other => panic!("expected export fault, got {:?}", other),
        }
    }

    #[test]
    fn test_texture_audit() {
        assert_eq!(TextureAuditResponse::parse("OK"), TextureAuditResponse::Clean);
        assert_eq!(
            TextureAuditResponse::parse("wood.png,metal.tga"),
            TextureAuditResponse::Missing(vec!["wood.png".into(), "metal.tga".into()])
        );
        assert!(matches!(
            TextureAuditResponse::parse("ERROR: Object not found").into_result("Ghost"),
            Err(PipelineError::NotFound(_))
        ));
    }
}
