use axum::http::{Method, StatusCode};
use tower::ServiceExt;

use crate::test_support::{self, MultipartPart};

fn key_upload_parts(exam_name: &str, subject: &str) -> Vec<MultipartPart> {
    vec![
        MultipartPart::File {
            name: "file",
            filename: "answer-key.pdf",
            content_type: "application/pdf",
            bytes: b"%PDF-1.4 fake answer key".to_vec(),
        },
        MultipartPart::Text { name: "exam_name", value: exam_name.to_string() },
        MultipartPart::Text { name: "subject", value: subject.to_string() },
        MultipartPart::Text { name: "total_marks", value: "100".to_string() },
        MultipartPart::Text { name: "key_type", value: "descriptive".to_string() },
    ]
}

#[tokio::test]
async fn teacher_uploads_key_and_it_appears_in_exams() {
    let ctx = test_support::setup_test_context().await;
    let teacher = test_support::insert_teacher(ctx.state.db(), "teacher@example.com").await;
    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            "/api/upload-key",
            Some(&token),
            key_upload_parts("Math Final", "Mathematics"),
        ))
        .await
        .expect("upload key");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert!(body["message"].as_str().unwrap_or("").contains("uploaded successfully"));

    // A second key for the same exam/subject pair still counts as one exam.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            "/api/upload-key",
            Some(&token),
            key_upload_parts("Math Final", "Mathematics"),
        ))
        .await
        .expect("upload second key");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/get-exams", Some(&token), None))
        .await
        .expect("get exams");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    let exams = body["exams"].as_array().expect("exams array");
    assert_eq!(exams.len(), 1);
    assert_eq!(exams[0]["exam_name"], "Math Final");
    assert_eq!(exams[0]["subject"], "Mathematics");
}

#[tokio::test]
async fn uploaded_key_file_is_served_back() {
    let ctx = test_support::setup_test_context().await;
    let teacher = test_support::insert_teacher(ctx.state.db(), "teacher@example.com").await;
    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            "/api/upload-key",
            Some(&token),
            key_upload_parts("Physics Final", "Physics"),
        ))
        .await
        .expect("upload key");
    assert_eq!(response.status(), StatusCode::OK);

    let key = crate::repositories::answer_keys::find_match(
        ctx.state.db(),
        "Physics Final",
        "Physics",
    )
    .await
    .expect("query key")
    .expect("key exists");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/uploads/{}", key.file_path),
            None,
            None,
        ))
        .await
        .expect("serve file");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(axum::http::header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
}

#[tokio::test]
async fn upload_key_rejects_missing_file_and_fields() {
    let ctx = test_support::setup_test_context().await;
    let teacher = test_support::insert_teacher(ctx.state.db(), "teacher@example.com").await;
    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            "/api/upload-key",
            Some(&token),
            vec![
                MultipartPart::Text { name: "exam_name", value: "Math Final".to_string() },
                MultipartPart::Text { name: "subject", value: "Mathematics".to_string() },
                MultipartPart::Text { name: "total_marks", value: "100".to_string() },
                MultipartPart::Text { name: "key_type", value: "descriptive".to_string() },
            ],
        ))
        .await
        .expect("upload without file");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(body["error"], "No file uploaded");

    let mut parts = key_upload_parts("Math Final", "Mathematics");
    parts.retain(|part| !matches!(part, MultipartPart::Text { name: "exam_name", .. }));
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request("/api/upload-key", Some(&token), parts))
        .await
        .expect("upload without exam name");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut parts = key_upload_parts("Math Final", "Mathematics");
    for part in &mut parts {
        if let MultipartPart::Text { name: "total_marks", value } = part {
            *value = "not-a-number".to_string();
        }
    }
    let response = ctx
        .app
        .oneshot(test_support::multipart_request("/api/upload-key", Some(&token), parts))
        .await
        .expect("upload with bad marks");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(body["error"], "Total marks must be a valid number");
}

#[tokio::test]
async fn student_cannot_upload_key() {
    let ctx = test_support::setup_test_context().await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::multipart_request(
            "/api/upload-key",
            Some(&token),
            key_upload_parts("Math Final", "Mathematics"),
        ))
        .await
        .expect("student upload key");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
