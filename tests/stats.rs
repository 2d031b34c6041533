mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::{
    complete_lesson, enroll, insert_user_with_role, seed_published_course, setup_server,
    setup_test_db, signin, signup,
};

#[tokio::test]
async fn dashboard_reflects_enrollment_state() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let seeded = seed_published_course(&mut server, &db, "teach20", &[1, 1]).await;

    // one student finishes the course, one stops halfway
    server.clear_cookies();
    signup(&server, "stat-finisher", "pass").await;
    enroll(&server, seeded.course_id).await;
    complete_lesson(&server, seeded.lesson_ids[0]).await;
    complete_lesson(&server, seeded.lesson_ids[1]).await;

    server.clear_cookies();
    signup(&server, "stat-halfway", "pass").await;
    enroll(&server, seeded.course_id).await;
    complete_lesson(&server, seeded.lesson_ids[0]).await;
    server
        .post(&format!(
            "/api/v1/lessons/{}/position",
            seeded.lesson_ids[0]
        ))
        .json(&json!({ "position_seconds": 10, "watched_delta_seconds": 60 }))
        .await
        .assert_status(StatusCode::OK);

    // the owning instructor sees their course aggregates
    server.clear_cookies();
    signin(&server, "teach20", "teach").await;

    let resp = server.get("/api/v1/stats/dashboard").await;
    resp.assert_status(StatusCode::OK);
    let dashboard = resp.json::<Value>();

    assert_eq!(dashboard["enrollments"]["total"], 2);
    assert_eq!(dashboard["enrollments"]["active"], 1);
    assert_eq!(dashboard["enrollments"]["completed"], 1);
    assert_eq!(dashboard["enrollments"]["cancelled"], 0);

    let courses = dashboard["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["enrollments"], 2);
    // (100 + 50) / 2
    assert_eq!(courses[0]["avg_progress"].as_f64().unwrap(), 75.0);

    assert_eq!(dashboard["total_watch_time_seconds"], 60);

    // both signups landed today
    let daily = dashboard["daily_enrollments"].as_array().unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0]["enrollments"], 2);
}

#[tokio::test]
async fn dashboard_is_scoped_per_instructor() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let course_a = seed_published_course(&mut server, &db, "teach21", &[1]).await;
    let _course_b = seed_published_course(&mut server, &db, "teach22", &[1]).await;

    server.clear_cookies();
    signup(&server, "stat-student", "pass").await;
    enroll(&server, course_a.course_id).await;

    // teach22 has no enrollments; teach21's single enrollment is invisible
    server.clear_cookies();
    signin(&server, "teach22", "teach").await;
    let dashboard = server.get("/api/v1/stats/dashboard").await.json::<Value>();
    assert_eq!(dashboard["enrollments"]["total"], 0);
    assert_eq!(dashboard["courses"].as_array().unwrap().len(), 1);

    // an admin sees both courses
    insert_user_with_role(&db, "stat-admin", "admin", "admin").await;
    server.clear_cookies();
    signin(&server, "stat-admin", "admin").await;
    let dashboard = server.get("/api/v1/stats/dashboard").await.json::<Value>();
    assert_eq!(dashboard["enrollments"]["total"], 1);
    assert_eq!(dashboard["courses"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn dashboard_rejects_students() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;

    signup(&server, "stat-nosy", "pass").await;
    let resp = server.get("/api/v1/stats/dashboard").await;
    resp.assert_status(StatusCode::FORBIDDEN);
}
