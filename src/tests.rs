#[cfg(test)]
mod integration_tests {
    use crate::schemas::{ApiResponse, ErrorResponse};
    use crate::test_utils::test_utils::{UnreachableHolidays, setup_test_app, setup_test_app_with};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::NaiveDate;
    use common::{
        ClassDto, MonthGrid, MonthReport, Role, Session, SessionRecord, Status, StudentDto,
        StudentHistory, SubjectDto, TrackDto, UserDto,
    };
    use compute::StaticHolidays;
    use serde_json::{Value, json};
    use std::sync::Arc;

    /// Reference data shared by the attendance scenarios
    struct Fixture {
        class_id: i32,
        track_id: i32,
        subject_id: i32,
    }

    impl Fixture {
        fn month_query(&self, year: i32, month: u32) -> String {
            format!(
                "class_id={}&track_id={}&subject_id={}&year={}&month={}",
                self.class_id, self.track_id, self.subject_id, year, month
            )
        }

        fn session(&self, date: &str, entries: Value) -> Value {
            json!({
                "class_id": self.class_id,
                "track_id": self.track_id,
                "subject_id": self.subject_id,
                "date": date,
                "entries": entries,
            })
        }
    }

    async fn create_class(server: &TestServer, name: &str) -> ClassDto {
        let response = server.post("/api/v1/classes").json(&json!({ "name": name })).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<ApiResponse<ClassDto>>().data
    }

    async fn create_track(server: &TestServer, code: &str, name: &str) -> TrackDto {
        let response = server
            .post("/api/v1/tracks")
            .json(&json!({ "code": code, "name": name }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<ApiResponse<TrackDto>>().data
    }

    async fn create_subject(server: &TestServer, name: &str) -> SubjectDto {
        let response = server.post("/api/v1/subjects").json(&json!({ "name": name })).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<ApiResponse<SubjectDto>>().data
    }

    async fn create_student(server: &TestServer, nis: &str, name: &str, class_id: i32, track_id: i32) -> StudentDto {
        let response = server
            .post("/api/v1/students")
            .json(&json!({
                "nis": nis,
                "name": name,
                "sex": "L",
                "class_id": class_id,
                "track_id": track_id,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<ApiResponse<StudentDto>>().data
    }

    /// Class X, track Y, subject Math, students 001 (Ani) and 002 (Budi)
    async fn seed(server: &TestServer) -> Fixture {
        let class = create_class(server, "X").await;
        let track = create_track(server, "Y", "Track Y").await;
        let subject = create_subject(server, "Math").await;
        create_student(server, "001", "Ani", class.id, track.id).await;
        create_student(server, "002", "Budi", class.id, track.id).await;
        Fixture {
            class_id: class.id,
            track_id: track.id,
            subject_id: subject.id,
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_class_crud() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let created = create_class(&server, " X-1 ").await;
        assert_eq!(created.name, "X-1");

        let response = server
            .put(&format!("/api/v1/classes/{}", created.id))
            .json(&json!({ "name": "X-2" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<ClassDto> = response.json();
        assert_eq!(body.data.name, "X-2");
        assert_eq!(body.message, "Class updated successfully");

        let response = server.get("/api/v1/classes").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<ClassDto>> = response.json();
        assert_eq!(body.data.len(), 1);

        let response = server.delete(&format!("/api/v1/classes/{}", created.id)).await;
        response.assert_status(StatusCode::OK);

        let response = server.get(&format!("/api/v1/classes/{}", created.id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "NOT_FOUND");
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_create_class_requires_name() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.post("/api/v1/classes").json(&json!({ "name": "  " })).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "INVALID_PARAMETER");
    }

    #[tokio::test]
    async fn test_track_crud() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let created = create_track(&server, "TKJ", "Computer Networking").await;
        assert_eq!(created.code, "TKJ");

        let response = server
            .put(&format!("/api/v1/tracks/{}", created.id))
            .json(&json!({ "code": "TKJ", "name": "Networking" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<TrackDto> = response.json();
        assert_eq!(body.data.name, "Networking");

        let response = server.delete(&format!("/api/v1/tracks/{}", created.id)).await;
        response.assert_status(StatusCode::OK);

        let response = server.delete(&format!("/api/v1/tracks/{}", created.id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_subject_codes_are_generated_in_sequence() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/subjects/next-code").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["code"], "MPL01");

        let math = create_subject(&server, "Math").await;
        let physics = create_subject(&server, "Physics").await;
        assert_eq!(math.code, "MPL01");
        assert_eq!(physics.code, "MPL02");

        let response = server.get("/api/v1/subjects/next-code").await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["code"], "MPL03");

        // Renaming keeps the code
        let response = server
            .put(&format!("/api/v1/subjects/{}", math.id))
            .json(&json!({ "name": "Mathematics" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<SubjectDto> = response.json();
        assert_eq!(body.data.code, "MPL01");
        assert_eq!(body.data.name, "Mathematics");

        let response = server.get("/api/v1/subjects").await;
        let body: ApiResponse<Vec<SubjectDto>> = response.json();
        let codes: Vec<&str> = body.data.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["MPL01", "MPL02"]);
    }

    #[tokio::test]
    async fn test_student_crud_with_names() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let class = create_class(&server, "X").await;
        let track = create_track(&server, "Y", "Track Y").await;

        let created = create_student(&server, "001", "Ani", class.id, track.id).await;
        assert_eq!(created.class_name.as_deref(), Some("X"));
        assert_eq!(created.track_name.as_deref(), Some("Track Y"));

        let response = server
            .put(&format!("/api/v1/students/{}", created.id))
            .json(&json!({ "name": "Ani Lestari", "sex": "P" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<StudentDto> = response.json();
        assert_eq!(body.data.name, "Ani Lestari");
        assert_eq!(body.data.sex.as_deref(), Some("P"));
        assert_eq!(body.data.nis, "001");

        let response = server
            .get(&format!("/api/v1/students?class_id={}", class.id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<StudentDto>> = response.json();
        assert_eq!(body.data.len(), 1);

        let response = server.get(&format!("/api/v1/students?class_id={}", class.id + 100)).await;
        let body: ApiResponse<Vec<StudentDto>> = response.json();
        assert!(body.data.is_empty());

        let response = server.delete(&format!("/api/v1/students/{}", created.id)).await;
        response.assert_status(StatusCode::OK);
        let response = server.get(&format!("/api/v1/students/{}", created.id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_students_listed_by_name() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;
        create_student(&server, "003", "Adi", fixture.class_id, fixture.track_id).await;

        let response = server.get("/api/v1/students").await;
        let body: ApiResponse<Vec<StudentDto>> = response.json();
        let names: Vec<&str> = body.data.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Adi", "Ani", "Budi"]);
    }

    #[tokio::test]
    async fn test_student_validation() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/students")
            .json(&json!({ "nis": "001", "name": "Ani", "sex": "X" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/api/v1/students")
            .json(&json!({ "nis": " ", "name": "Ani" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_nis_conflicts() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        let response = server
            .post("/api/v1/students")
            .json(&json!({
                "nis": "001",
                "name": "Someone Else",
                "class_id": fixture.class_id,
                "track_id": fixture.track_id,
            }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_delete_referenced_class_conflicts() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        let response = server.delete(&format!("/api/v1/classes/{}", fixture.class_id)).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "CLASS_IN_USE");

        // Still there
        let response = server.get(&format!("/api/v1/classes/{}", fixture.class_id)).await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_subject_used_by_session_conflicts() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        server
            .post("/api/v1/attendance")
            .json(&fixture.session("2024-05-10", json!([{ "nis": "001", "status": "present" }])))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.delete(&format!("/api/v1/subjects/{}", fixture.subject_id)).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "SUBJECT_IN_USE");
    }

    #[tokio::test]
    async fn test_nis_locked_after_attendance() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        let response = server.get("/api/v1/students").await;
        let students: ApiResponse<Vec<StudentDto>> = response.json();
        let ani = students.data.iter().find(|s| s.nis == "001").unwrap().clone();
        let budi = students.data.iter().find(|s| s.nis == "002").unwrap().clone();

        server
            .post("/api/v1/attendance")
            .json(&fixture.session("2024-05-10", json!([{ "nis": "001", "status": "present" }])))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .put(&format!("/api/v1/students/{}", ani.id))
            .json(&json!({ "nis": "009" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "NIS_LOCKED");

        // Same NIS is not a change
        let response = server
            .put(&format!("/api/v1/students/{}", ani.id))
            .json(&json!({ "nis": "001", "name": "Ani L." }))
            .await;
        response.assert_status(StatusCode::OK);

        // No attendance yet for 002
        let response = server
            .put(&format!("/api/v1/students/{}", budi.id))
            .json(&json!({ "nis": "020" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<StudentDto> = response.json();
        assert_eq!(body.data.nis, "020");
    }

    #[tokio::test]
    async fn test_record_and_month_grid_end_to_end() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        let response = server
            .post("/api/v1/attendance")
            .json(&fixture.session(
                "2024-05-10",
                json!([
                    { "nis": "001", "status": "present" },
                    { "nis": "002", "status": "absent" },
                ]),
            ))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<SessionRecord> = response.json();
        assert_eq!(body.message, "Attendance recorded successfully");
        assert_eq!(body.data.date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());

        let response = server
            .get(&format!("/api/v1/reports/month?{}", fixture.month_query(2024, 5)))
            .await;
        response.assert_status(StatusCode::OK);
        let grid: ApiResponse<MonthGrid> = response.json();
        let grid = grid.data;
        assert_eq!(grid.days_in_month, 31);
        assert_eq!(grid.students.len(), 2);

        let ani = grid.students.iter().find(|s| s.nis == "001").unwrap();
        let budi = grid.students.iter().find(|s| s.nis == "002").unwrap();
        assert_eq!(ani.status_by_date.len(), 1);
        assert_eq!(ani.status_by_date.get("2024-05-10"), Some(&Status::Present));
        assert_eq!(budi.status_by_date.len(), 1);
        assert_eq!(budi.status_by_date.get("2024-05-10"), Some(&Status::Absent));
        assert!(ani.in_roster && budi.in_roster);
    }

    #[tokio::test]
    async fn test_month_grid_json_field_names() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        let response = server
            .get(&format!("/api/v1/reports/month?{}", fixture.month_query(2024, 2)))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["days_in_month"], 29);
        assert!(body["data"]["students"][0]["statusByDate"].is_object());
    }

    #[tokio::test]
    async fn test_recording_twice_replaces_lines() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        let first = server
            .post("/api/v1/attendance")
            .json(&fixture.session(
                "2024-05-10",
                json!([
                    { "nis": "001", "status": "present" },
                    { "nis": "002", "status": "present" },
                ]),
            ))
            .await
            .json::<ApiResponse<SessionRecord>>();
        let second = server
            .post("/api/v1/attendance")
            .json(&fixture.session("2024-05-10", json!([{ "nis": "002", "status": "sick" }])))
            .await
            .json::<ApiResponse<SessionRecord>>();
        assert_eq!(first.data.id, second.data.id);

        let response = server.get("/api/v1/attendance?date=2024-05-10").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<Session>> = response.json();
        assert_eq!(body.data.len(), 1);
        let entries = &body.data[0].entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].nis, "002");
        assert_eq!(entries[0].status, Status::Sick);
    }

    #[tokio::test]
    async fn test_record_missing_field() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        let response = server
            .post("/api/v1/attendance")
            .json(&json!({
                "class_id": fixture.class_id,
                "track_id": fixture.track_id,
                "subject_id": fixture.subject_id,
                "entries": [],
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "MISSING_PARAMETER");
        assert!(body.error.contains("date"));
    }

    #[tokio::test]
    async fn test_record_duplicate_nis_rejected() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        let response = server
            .post("/api/v1/attendance")
            .json(&fixture.session(
                "2024-05-10",
                json!([
                    { "nis": "001", "status": "present" },
                    { "nis": "001", "status": "absent" },
                ]),
            ))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "INVALID_PARAMETER");
    }

    #[tokio::test]
    async fn test_dangling_nis_appears_outside_roster() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        server
            .post("/api/v1/attendance")
            .json(&fixture.session("2024-05-10", json!([{ "nis": "777", "status": "excused" }])))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/api/v1/reports/month?{}", fixture.month_query(2024, 5)))
            .await;
        let grid: ApiResponse<MonthGrid> = response.json();
        assert_eq!(grid.data.students.len(), 3);
        let dangling = grid.data.students.last().unwrap();
        assert_eq!(dangling.nis, "777");
        assert!(!dangling.in_roster);
        assert_eq!(dangling.name, None);
    }

    #[tokio::test]
    async fn test_month_report_missing_parameter() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/api/v1/reports/month?class_id=1&track_id=1&subject_id=1&month=5")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "MISSING_PARAMETER");
        assert!(body.error.contains("year"));
    }

    #[tokio::test]
    async fn test_month_report_rejects_month_13() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/api/v1/reports/month?class_id=1&track_id=1&subject_id=1&month=13&year=2024")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_month_summary_flags_holidays_and_sundays() {
        let holidays = StaticHolidays::new([NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()]);
        let app = setup_test_app_with(Arc::new(holidays)).await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        server
            .post("/api/v1/attendance")
            .json(&fixture.session(
                "2024-05-10",
                json!([
                    { "nis": "001", "status": "present" },
                    { "nis": "002", "status": "absent" },
                ]),
            ))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/api/v1/reports/month/summary?{}", fixture.month_query(2024, 5)))
            .await;
        response.assert_status(StatusCode::OK);
        let report: ApiResponse<MonthReport> = response.json();
        let report = report.data;

        assert!(report.holidays_available);
        assert_eq!(report.days.len(), 31);
        // May 1st is a configured holiday, May 5th a Sunday
        assert!(report.days[0].is_holiday && report.days[0].non_instructional);
        assert!(report.days[4].is_sunday && report.days[4].non_instructional);
        assert!(!report.days[9].non_instructional);

        let first = &report.rows[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.name, "Ani");
        assert_eq!(first.symbols[9], "P");
        assert_eq!(first.symbols[8], "");
        assert_eq!(first.tally.present, 1);
        assert_eq!(first.tally.absent, 0);
        assert_eq!(report.rows[1].tally.absent, 1);
    }

    #[tokio::test]
    async fn test_month_summary_survives_unreachable_holiday_source() {
        let app = setup_test_app_with(Arc::new(UnreachableHolidays)).await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        let response = server
            .get(&format!("/api/v1/reports/month/summary?{}", fixture.month_query(2024, 5)))
            .await;

        response.assert_status(StatusCode::OK);
        let report: ApiResponse<MonthReport> = response.json();
        assert!(!report.data.holidays_available);
        assert!(report.data.days.iter().all(|d| !d.is_holiday));
        assert!(report.data.days[4].non_instructional);
        assert_eq!(report.data.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_month_export_csv() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        server
            .post("/api/v1/attendance")
            .json(&fixture.session("2024-02-29", json!([{ "nis": "001", "status": "sick" }])))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/api/v1/reports/month/export?{}", fixture.month_query(2024, 2)))
            .await;
        response.assert_status(StatusCode::OK);

        let headers = response.headers();
        assert_eq!(
            headers.get("content-type").unwrap().to_str().unwrap(),
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            headers.get("content-disposition").unwrap().to_str().unwrap(),
            "attachment; filename=\"attendance-2024-02.csv\""
        );

        let text = response.text();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        let days: Vec<String> = (1..=29).map(|d| d.to_string()).collect();
        assert_eq!(header, format!("No,NIS,Name,{},P,E,S,A", days.join(",")));

        let ani = lines.next().unwrap();
        assert!(ani.starts_with("1,001,Ani,"));
        assert!(ani.ends_with(",S,0,0,1,0"));
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_student_history_wraps_year() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let fixture = seed(&server).await;

        for (date, status) in [("2023-11-06", "present"), ("2024-01-15", "absent")] {
            server
                .post("/api/v1/attendance")
                .json(&fixture.session(date, json!([{ "nis": "001", "status": status }])))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .get("/api/v1/reports/student?nis=001&start=2023-11&end=2024-02")
            .await;
        response.assert_status(StatusCode::OK);
        let history: ApiResponse<StudentHistory> = response.json();
        let months: Vec<(i32, u32)> = history
            .data
            .months
            .iter()
            .map(|m| (m.year, m.month))
            .collect();
        assert_eq!(months, vec![(2023, 11), (2023, 12), (2024, 1), (2024, 2)]);
        assert_eq!(history.data.months[0].day_map.get(&6), Some(&Status::Present));
        assert!(history.data.months[1].day_map.is_empty());
        assert_eq!(history.data.months[2].day_map.get(&15), Some(&Status::Absent));
        assert_eq!(history.data.months[3].days_in_month, 29);
    }

    #[tokio::test]
    async fn test_student_history_invalid_range() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/api/v1/reports/student?nis=001&start=2024-03&end=2024-01")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get("/api/v1/reports/student?nis=001&start=2024-13&end=2024-12")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "INVALID_PARAMETER");

        let response = server.get("/api/v1/reports/student?start=2024-01&end=2024-02").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "MISSING_PARAMETER");
    }

    #[tokio::test]
    async fn test_create_user_hides_password() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "username": "guru1", "password": "rahasia", "role": "Teacher" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        assert_eq!(body.message, "User created successfully");
        assert_eq!(body.data["username"], "guru1");
        assert_eq!(body.data["role"], "Teacher");
        let object = body.data.as_object().unwrap();
        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("password_hash"));
        assert!(!object.contains_key("password_salt"));
    }

    #[tokio::test]
    async fn test_user_crud() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "username": "admin", "password": "pw", "role": "Admin" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: ApiResponse<UserDto> = response.json();

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "username": "admin", "password": "other", "role": "Teacher" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let response = server
            .put(&format!("/api/v1/users/{}", created.data.id))
            .json(&json!({ "role": "SuperUser", "password": "new" }))
            .await;
        response.assert_status(StatusCode::OK);
        let updated: ApiResponse<UserDto> = response.json();
        assert_eq!(updated.data.role, Role::SuperUser);
        assert_eq!(updated.data.username, "admin");

        let response = server.get("/api/v1/users").await;
        let users: ApiResponse<Vec<UserDto>> = response.json();
        assert_eq!(users.data.len(), 1);

        server
            .delete(&format!("/api/v1/users/{}", created.data.id))
            .await
            .assert_status(StatusCode::OK);
        server
            .get(&format!("/api/v1/users/{}", created.data.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api-docs/openapi.json").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert!(body["paths"]["/api/v1/reports/month"].is_object());
    }
}
