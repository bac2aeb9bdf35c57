use axum::http::{Method, StatusCode};
use tower::ServiceExt;

use crate::core::time::primitive_now_utc;
use crate::db::types::EvaluationMethod;
use crate::repositories;
use crate::test_support;

async fn evaluate_with_marks(ctx: &test_support::TestContext, submission_id: &str, marks: f64) {
    let finalized = repositories::submissions::finalize_evaluation(
        ctx.state.db(),
        repositories::submissions::FinalizeEvaluation {
            submission_id,
            marks_obtained: marks,
            total_marks: 100,
            feedback: "ok",
            method: EvaluationMethod::Manual,
            evaluated_at: primitive_now_utc(),
        },
    )
    .await
    .expect("finalize");
    assert!(finalized);
}

#[tokio::test]
async fn teacher_dashboard_counts_exams_and_submissions() {
    let ctx = test_support::setup_test_context().await;
    let teacher = test_support::insert_teacher(ctx.state.db(), "teacher@example.com").await;
    test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    // Two keys for the same pair count as one exam.
    test_support::insert_answer_key(ctx.state.db(), "Math Final", "Mathematics", 100, "teacher@example.com")
        .await;
    test_support::insert_answer_key(ctx.state.db(), "Math Final", "Mathematics", 100, "teacher@example.com")
        .await;
    test_support::insert_answer_key(ctx.state.db(), "Physics Final", "Physics", 80, "teacher@example.com")
        .await;

    let first = test_support::insert_submission(
        ctx.state.db(),
        "student@example.com",
        "Math Final",
        "Mathematics",
        "R-1",
    )
    .await;
    test_support::insert_submission(
        ctx.state.db(),
        "student@example.com",
        "Physics Final",
        "Physics",
        "R-1",
    )
    .await;
    evaluate_with_marks(&ctx, &first.id, 55.0).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/dashboard-stats",
            Some(&token),
            None,
        ))
        .await
        .expect("dashboard stats");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["total_exams"], 2);
    assert_eq!(body["total_submissions"], 2);
    assert_eq!(body["evaluated"], 1);
    assert_eq!(body["pending"], 1);
}

#[tokio::test]
async fn student_scope_averages_percentages_and_handles_zero() {
    let ctx = test_support::setup_test_context().await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let other = test_support::insert_student(ctx.state.db(), "other@example.com").await;
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());
    let other_token = test_support::bearer_token(&other.id, ctx.state.settings());

    let first = test_support::insert_submission(
        ctx.state.db(),
        "student@example.com",
        "Math Final",
        "Mathematics",
        "R-1",
    )
    .await;
    let second = test_support::insert_submission(
        ctx.state.db(),
        "student@example.com",
        "Physics Final",
        "Physics",
        "R-1",
    )
    .await;
    test_support::insert_submission(
        ctx.state.db(),
        "student@example.com",
        "Chemistry Final",
        "Chemistry",
        "R-1",
    )
    .await;

    evaluate_with_marks(&ctx, &first.id, 80.0).await;
    evaluate_with_marks(&ctx, &second.id, 60.0).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/dashboard-stats",
            Some(&student_token),
            None,
        ))
        .await
        .expect("student stats");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["total_submissions"], 3);
    assert_eq!(body["evaluated"], 2);
    assert_eq!(body["pending"], 1);
    assert_eq!(body["average_percentage"], 70.0);

    // A student with nothing evaluated averages to zero, not an error.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/dashboard-stats",
            Some(&other_token),
            None,
        ))
        .await
        .expect("empty student stats");
    let body = test_support::read_json(response).await;
    assert_eq!(body["total_submissions"], 0);
    assert_eq!(body["average_percentage"], 0.0);

    // Teachers can request a specific student's scope.
    let teacher = test_support::insert_teacher(ctx.state.db(), "teacher@example.com").await;
    let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/dashboard-stats?student=student@example.com",
            Some(&teacher_token),
            None,
        ))
        .await
        .expect("teacher-scoped student stats");
    let body = test_support::read_json(response).await;
    assert_eq!(body["evaluated"], 2);
    assert_eq!(body["average_percentage"], 70.0);
}
