use aulux_server::server::{models::Role, router, AppState, Configuration};
use aulux_server::TokenPair;
use axum::{
    body::{to_bytes, Body},
    extract::Path,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get as get_route,
    Json, Router,
};
use chrono::{Duration, Utc};
use config::{Config, File, FileFormat};
use serde_json::{json, Value};
use tower::ServiceExt;

const BASE_CONFIG: &str = r#"
[server]
cookie_name = "aulux_session"

[oauth]
client_id = "client-id"
client_secret = "client-secret"
redirect_uri = "http://localhost:8080/auth/callback"
"#;

fn configuration(extra: &str) -> Configuration {
    Config::builder()
        .add_source(File::from_str(BASE_CONFIG, FileFormat::Toml))
        .add_source(File::from_str(extra, FileFormat::Toml))
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap()
}

struct TestServer {
    state: AppState,
    app: Router,
}

impl TestServer {
    fn new(extra: &str) -> Self {
        let state = AppState::from_config(&configuration(extra)).unwrap();
        let app = router(state.clone());
        Self { state, app }
    }

    /// Seed a live session and return its cookie header value.
    fn sign_in(&self, email: &str, role: Role) -> String {
        let tokens = TokenPair {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Utc::now() + Duration::hours(1),
        };
        let session = self.state.session_store.create_session(
            email.to_string(),
            Some("Ana Pérez".to_string()),
            role,
            tokens,
        );
        format!("aulux_session={}", session.session_id)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

async fn submissions(Path((course_id, work_id)): Path<(String, String)>) -> Response {
    if work_id == "w2" {
        let error = json!({ "error": { "code": 500, "message": "Backend Error", "status": "INTERNAL" } });
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response();
    }
    Json(json!({
        "studentSubmissions": [{
            "id": "sub1",
            "courseId": course_id,
            "courseWorkId": work_id,
            "userId": "s1",
            "state": "TURNED_IN",
            "updateTime": "2025-03-05T10:00:00Z"
        }]
    }))
    .into_response()
}

/// Serve a one-course Classroom on a local port and return its address.
async fn spawn_classroom() -> String {
    let app = Router::new()
        .route(
            "/v1/courses",
            get_route(|| async { Json(json!({ "courses": [{ "id": "c1", "name": "Álgebra" }] })) }),
        )
        .route(
            "/v1/courses/{course_id}/students",
            get_route(|Path(course_id): Path<String>| async move {
                Json(json!({
                    "students": [
                        {
                            "courseId": course_id,
                            "userId": "s1",
                            "profile": { "name": { "fullName": "Beto Díaz" }, "emailAddress": "beto@aulux.org" }
                        }
                    ]
                }))
            }),
        )
        .route(
            "/v1/courses/{course_id}/courseWork",
            get_route(|Path(course_id): Path<String>| async move {
                Json(json!({
                    "courseWork": [
                        {
                            "id": "w1",
                            "courseId": course_id,
                            "title": "TP 1",
                            "creationTime": "2025-03-01T10:00:00Z",
                            "dueDate": { "year": 2025, "month": 3, "day": 10 }
                        },
                        {
                            "id": "w2",
                            "courseId": course_id,
                            "title": "TP 2",
                            "creationTime": "2025-03-02T10:00:00Z",
                            "dueDate": { "year": 2025, "month": 3, "day": 20 }
                        }
                    ]
                }))
            }),
        )
        .route(
            "/v1/courses/{course_id}/courseWork/{work_id}/studentSubmissions",
            get_route(submissions),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn with_bearer(mut request: Request<Body>, secret: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {secret}").parse().unwrap(),
    );
    request
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new("");

    let (status, body) = server.send(get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_api_requires_session() {
    let server = TestServer::new("");

    let (status, body) = server.send(get("/api/attendance", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    // Unknown session id
    let (status, _) = server
        .send(get("/api/attendance", Some("aulux_session=nope")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_reports_role() {
    let server = TestServer::new("");
    let cookie = server.sign_in("coord@aulux.org", Role::Coordinador);

    let (status, body) = server.send(get("/auth/session", Some(&cookie))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "coord@aulux.org");
    assert_eq!(body["name"], "Ana Pérez");
    assert_eq!(body["role"], "coordinador");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let server = TestServer::new("");
    let cookie = server.sign_in("prof@aulux.org", Role::Profesor);

    let response = server
        .app
        .clone()
        .oneshot(json_request(Method::POST, "/auth/logout", Some(&cookie), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(!set_cookie.contains("Secure"));

    let (status, _) = server.send(get("/auth/session", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cron_rejected_without_configured_secret() {
    let server = TestServer::new("");

    let request = with_bearer(get("/api/notifications/cron", None), "anything");
    let (status, body) = server.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No autorizado");
}

#[tokio::test]
async fn test_cron_checks_bearer_secret() {
    let server = TestServer::new("[notifications]\ncron_secret = \"tick\"");

    let (status, _) = server
        .send(with_bearer(get("/api/notifications/cron", None), "tock"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server.send(get("/api/notifications/cron", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Right secret, but nobody on staff to check
    let (status, body) = server
        .send(with_bearer(get("/api/notifications/cron", None), "tick"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No hay profesores configurados");
}

#[tokio::test]
async fn test_manual_cron_needs_force() {
    let server = TestServer::new("[notifications]\ncron_secret = \"tick\"");

    let request = with_bearer(
        json_request(Method::POST, "/api/notifications/cron", None, json!({ "force": false })),
        "tick",
    );
    let (status, body) = server.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("force"));
    assert!(body.get("success").is_none());
}

#[tokio::test]
async fn test_cron_reports_teachers_without_session() {
    let server = TestServer::new(
        "[roles]\nprofessor_emails = \"prof@aulux.org\"\ncoordinator_emails = \"coord@aulux.org\"\n[notifications]\ncron_secret = \"tick\"",
    );

    let (status, body) = server
        .send(with_bearer(get("/api/notifications/cron", None), "tick"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["professorsChecked"], 2);
    assert_eq!(body["successfulChecks"], 0);
    assert_eq!(body["results"][0]["teacherEmail"], "prof@aulux.org");
    assert_eq!(body["results"][1]["teacherEmail"], "coord@aulux.org");
    assert!(body["results"][0]["error"].is_string());
}

#[tokio::test]
async fn test_detect_new_requires_teacher_email() {
    let server = TestServer::new("[notifications]\ncron_secret = \"tick\"");

    let request = with_bearer(
        json_request(Method::POST, "/api/notifications/detect-new", None, json!({})),
        "tick",
    );
    let (status, _) = server.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = with_bearer(
        get("/api/notifications/detect-new?teacherEmail=ghost@aulux.org", None),
        "tick",
    );
    let (status, _) = server.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_attendance_lifecycle() {
    let server = TestServer::new("");
    let cookie = server.sign_in("prof@aulux.org", Role::Profesor);

    // Missing required fields
    let (status, body) = server
        .send(json_request(
            Method::POST,
            "/api/attendance",
            Some(&cookie),
            json!({ "eventId": "ev1", "courseId": "c1" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Faltan campos requeridos: eventId, courseId, studentId, status"
    );

    // Invalid status
    let (status, _) = server
        .send(json_request(
            Method::POST,
            "/api/attendance",
            Some(&cookie),
            json!({ "eventId": "ev1", "courseId": "c1", "studentId": "s1", "status": "asleep" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Record
    let (status, body) = server
        .send(json_request(
            Method::POST,
            "/api/attendance",
            Some(&cookie),
            json!({
                "eventId": "ev1",
                "courseId": "c1",
                "studentId": "s1",
                "status": "present",
                "date": "2025-03-10"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Asistencia registrada");
    assert_eq!(body["record"]["courseName"], "Curso");
    assert_eq!(body["record"]["location"], "Virtual");
    assert_eq!(body["record"]["recordedBy"], "prof@aulux.org");
    let record_id = body["record"]["id"].as_str().unwrap().to_string();

    // Same event and student overwrites
    let (status, body) = server
        .send(json_request(
            Method::POST,
            "/api/attendance",
            Some(&cookie),
            json!({
                "eventId": "ev1",
                "courseId": "c1",
                "studentId": "s1",
                "status": "late",
                "date": "2025-03-10"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Asistencia actualizada");
    assert_eq!(body["record"]["id"], record_id.as_str());

    let (status, body) = server
        .send(get("/api/attendance?courseId=c1", Some(&cookie)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"].as_array().unwrap().len(), 1);
    assert_eq!(body["stats"]["lateCount"], 1);
    assert_eq!(body["stats"]["attendanceRate"], 100);
    assert_eq!(body["filters"]["courseId"], "c1");

    // Update
    let (status, body) = server
        .send(json_request(
            Method::PUT,
            "/api/attendance",
            Some(&cookie),
            json!({ "recordId": &record_id, "status": "absent", "notes": "avisó" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["status"], "absent");
    assert_eq!(body["record"]["notes"], "avisó");
    assert_eq!(body["record"]["updatedBy"], "prof@aulux.org");

    let (status, body) = server
        .send(json_request(
            Method::PUT,
            "/api/attendance",
            Some(&cookie),
            json!({ "recordId": "missing", "status": "absent" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Registro de asistencia no encontrado");

    // Delete
    let delete = |uri: &str| {
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .header(header::COOKIE, cookie.as_str())
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = server.send(delete("/api/attendance")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .send(delete(&format!("/api/attendance?recordId={record_id}")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedRecord"]["id"], record_id.as_str());

    let (status, _) = server
        .send(delete(&format!("/api/attendance?recordId={record_id}")))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = server.send(get("/api/attendance", Some(&cookie))).await;
    assert_eq!(body["stats"]["totalRecords"], 0);
    assert_eq!(body["stats"]["attendanceRate"], 0);
}

#[tokio::test]
async fn test_coordinator_metrics_forbidden_for_professor() {
    let server = TestServer::new("");
    let cookie = server.sign_in("prof@aulux.org", Role::Profesor);

    let (status, _) = server
        .send(get("/api/metrics/coordinator", Some(&cookie)))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_metrics_forbidden_for_alumno() {
    let server = TestServer::new("");
    let cookie = server.sign_in("alumno@aulux.org", Role::Alumno);

    let (status, body) = server.send(get("/api/metrics", Some(&cookie))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_metrics_report_from_classroom() {
    let base = spawn_classroom().await;
    let server = TestServer::new(&format!(
        "[classroom]\nclassroom_base_url = \"{base}/v1\"\ngoogle_base_url = \"{base}\""
    ));
    let cookie = server.sign_in("prof@aulux.org", Role::Profesor);

    let (status, body) = server.send(get("/api/metrics", Some(&cookie))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["totalCourses"], 1);
    assert_eq!(body["courses"][0]["courseId"], "c1");
    assert_eq!(body["courses"][0]["courseName"], "Álgebra");
    assert_eq!(body["courses"][0]["onTime"], 1);

    // The failing course work is reported, not fatal
    let failures = body["partialFailures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures[0]["scope"],
        "courses/c1/courseWork/w2/studentSubmissions"
    );
}

#[tokio::test]
async fn test_attendance_ignores_blank_filters() {
    let server = TestServer::new("");
    let cookie = server.sign_in("prof@aulux.org", Role::Profesor);

    let (status, _) = server
        .send(json_request(
            Method::POST,
            "/api/attendance",
            Some(&cookie),
            json!({ "eventId": "ev1", "courseId": "c1", "studentId": "s1", "status": "present" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .send(get("/api/attendance?courseId=&dateFrom=", Some(&cookie)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_attendance_bad_query_is_json_400() {
    let server = TestServer::new("");
    let cookie = server.sign_in("prof@aulux.org", Role::Profesor);

    let (status, body) = server
        .send(get("/api/attendance?dateFrom=yesterday", Some(&cookie)))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_session_cookie_secure_over_https() {
    let server =
        TestServer::new("[oauth]\nredirect_uri = \"https://aulux.org/auth/callback\"");
    let cookie = server.sign_in("prof@aulux.org", Role::Profesor);

    let response = server
        .app
        .clone()
        .oneshot(json_request(Method::POST, "/auth/logout", Some(&cookie), json!({})))
        .await
        .unwrap();

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("; Secure"));
}

#[tokio::test]
async fn test_send_notifications_without_providers() {
    let server = TestServer::new("");
    let cookie = server.sign_in("prof@aulux.org", Role::Profesor);

    let (status, body) = server
        .send(json_request(
            Method::POST,
            "/api/notifications/send",
            Some(&cookie),
            json!({
                "recipients": [
                    { "email": "ana@aulux.org", "phone": "+5491100000000" },
                    { "email": "beto@aulux.org" },
                    { "email": "" }
                ],
                "notificationType": "due_soon",
                "data": { "taskTitle": "TP 1", "courseName": "Álgebra" }
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], 0);
    assert_eq!(body["failed"], 4);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(results[1]["type"], "whatsapp");
}

#[tokio::test]
async fn test_send_notifications_validates_body() {
    let server = TestServer::new("");
    let cookie = server.sign_in("prof@aulux.org", Role::Profesor);

    let (status, _) = server
        .send(json_request(
            Method::POST,
            "/api/notifications/send",
            Some(&cookie),
            json!({
                "recipients": [{ "email": "ana@aulux.org" }],
                "notificationType": "party",
                "data": { "taskTitle": "TP 1", "courseName": "Álgebra" }
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .send(json_request(
            Method::POST,
            "/api/notifications/send",
            Some(&cookie),
            json!({
                "recipients": [],
                "notificationType": "new_task",
                "data": { "taskTitle": "TP 1", "courseName": "Álgebra" }
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trigger_rejects_unknown_action() {
    let server = TestServer::new("");
    let cookie = server.sign_in("prof@aulux.org", Role::Profesor);

    let (status, body) = server
        .send(json_request(
            Method::POST,
            "/api/notifications/trigger",
            Some(&cookie),
            json!({ "action": "dance" }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Acción no reconocida");
}
