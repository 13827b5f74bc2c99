#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;
    use utoipa::openapi::{PathItemType, RefOr, schema::Schema};

    fn object_properties(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components");
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            _ => panic!("{} should be an object schema", name),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        let components = openapi.components.as_ref().unwrap();
        for name in ["ErrorResponse", "HealthResponse", "MonthGrid", "MonthReport", "StudentHistory", "Status"] {
            assert!(components.schemas.contains_key(name), "missing schema {}", name);
        }

        // Verify that the schema can be serialized to JSON without errors
        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let properties = object_properties("ErrorResponse");
        for field in ["error", "code", "success"] {
            assert!(properties.iter().any(|p| p == field), "missing {}", field);
        }
    }

    #[test]
    fn test_grid_row_uses_wire_names() {
        let properties = object_properties("GridRow");
        assert!(properties.iter().any(|p| p == "statusByDate"));
        assert!(properties.iter().any(|p| p == "in_roster"));

        let properties = object_properties("HistoryMonth");
        assert!(properties.iter().any(|p| p == "dayMap"));
    }

    #[test]
    fn test_user_schema_has_no_password() {
        let properties = object_properties("UserDto");
        assert!(properties.iter().all(|p| !p.contains("password")));
    }

    #[test]
    fn test_report_and_attendance_paths() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        let attendance = paths.get("/api/v1/attendance").expect("attendance path");
        assert!(attendance.operations.contains_key(&PathItemType::Post));
        assert!(attendance.operations.contains_key(&PathItemType::Get));

        for path in [
            "/api/v1/reports/month",
            "/api/v1/reports/month/summary",
            "/api/v1/reports/month/export",
            "/api/v1/reports/student",
            "/api/v1/subjects/next-code",
        ] {
            let item = paths.get(path).unwrap_or_else(|| panic!("missing path {}", path));
            assert!(item.operations.contains_key(&PathItemType::Get));
        }
    }

    #[test]
    fn test_health_endpoint_responses() {
        let openapi = ApiDoc::openapi();

        let health_path = openapi.paths.paths.get("/health").unwrap();
        let health_get = health_path.operations.get(&PathItemType::Get).unwrap();

        let responses = &health_get.responses;
        assert!(responses.responses.contains_key("200"));
        assert!(responses.responses.contains_key("500"));
    }

    #[test]
    fn test_all_error_responses_reference_correct_schema() {
        let openapi_json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));
        assert!(openapi_json.contains("ErrorResponse"));
    }
}
