mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::common::{
    complete_lesson, enroll, id_of, seed_published_course, setup_server, setup_test_db, signup,
};

#[tokio::test]
async fn four_lesson_completion_scenario() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    // two modules, two lessons each
    let seeded = seed_published_course(&mut server, &db, "teach3", &[2, 2]).await;

    server.clear_cookies();
    signup(&server, "learner1", "pass").await;
    let enrollment = enroll(&server, seeded.course_id).await;
    assert_eq!(enrollment["status"], "active");
    assert_eq!(enrollment["progress"], 0);

    // lessons 1-3: progress climbs, status stays active
    for (done, lesson_id) in seeded.lesson_ids.iter().take(3).enumerate() {
        let update = complete_lesson(&server, *lesson_id).await;
        assert_eq!(update["progress"], 25 * (done as i64 + 1));
        assert_eq!(update["status"], "active");
        assert_eq!(update["newly_completed"], false);
        assert!(update["certificate_number"].is_null());
    }

    // lesson 4 completes the course
    let update = complete_lesson(&server, seeded.lesson_ids[3]).await;
    assert_eq!(update["progress"], 100);
    assert_eq!(update["status"], "completed");
    assert_eq!(update["newly_completed"], true);
    let serial = update["certificate_number"].as_str().unwrap().to_string();
    assert!(serial.starts_with("CERT-"));

    // completed_at is stamped
    let enrollment_id = id_of(&enrollment);
    let detail = server
        .get(&format!("/api/v1/enrollments/{enrollment_id}"))
        .await
        .json::<Value>();
    assert_eq!(detail["status"], "completed");
    assert!(!detail["completed_at"].is_null());

    // exactly one certificate
    let certs = server.get("/api/v1/certificates/").await.json::<Value>();
    assert_eq!(certs.as_array().unwrap().len(), 1);
    assert_eq!(certs[0]["certificate_number"], serial.as_str());
}

#[tokio::test]
async fn re_marking_complete_is_idempotent() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let seeded = seed_published_course(&mut server, &db, "teach4", &[1]).await;

    server.clear_cookies();
    signup(&server, "learner2", "pass").await;
    enroll(&server, seeded.course_id).await;

    let first = complete_lesson(&server, seeded.lesson_ids[0]).await;
    assert_eq!(first["progress"], 100);
    assert_eq!(first["newly_completed"], true);

    // duplicate submit: same percent, no second completion, no second cert
    let second = complete_lesson(&server, seeded.lesson_ids[0]).await;
    assert_eq!(second["progress"], 100);
    assert_eq!(second["newly_completed"], false);
    assert!(second["certificate_number"].is_null());

    let certs = server.get("/api/v1/certificates/").await.json::<Value>();
    assert_eq!(certs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn completion_is_monotonic_after_unmark() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let seeded = seed_published_course(&mut server, &db, "teach5", &[2, 2]).await;

    server.clear_cookies();
    signup(&server, "learner3", "pass").await;
    enroll(&server, seeded.course_id).await;

    for lesson_id in &seeded.lesson_ids {
        complete_lesson(&server, *lesson_id).await;
    }

    // unmark one lesson: percent drops, status and certificate stay
    let resp = server
        .post(&format!(
            "/api/v1/lessons/{}/incomplete",
            seeded.lesson_ids[1]
        ))
        .await;
    resp.assert_status(StatusCode::OK);
    let update = resp.json::<Value>();
    assert_eq!(update["progress"], 75);
    assert_eq!(update["status"], "completed");

    let certs = server.get("/api/v1/certificates/").await.json::<Value>();
    assert_eq!(certs.as_array().unwrap().len(), 1);

    // completing it again does not issue a second certificate
    let update = complete_lesson(&server, seeded.lesson_ids[1]).await;
    assert_eq!(update["progress"], 100);
    assert_eq!(update["newly_completed"], false);

    let certs = server.get("/api/v1/certificates/").await.json::<Value>();
    assert_eq!(certs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_course_never_completes() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let seeded = seed_published_course(&mut server, &db, "teach6", &[]).await;

    server.clear_cookies();
    signup(&server, "learner4", "pass").await;
    let enrollment = enroll(&server, seeded.course_id).await;
    assert_eq!(enrollment["progress"], 0);
    assert_eq!(enrollment["status"], "active");

    let enrollment_id = id_of(&enrollment);
    let detail = server
        .get(&format!("/api/v1/enrollments/{enrollment_id}"))
        .await
        .json::<Value>();
    assert_eq!(detail["progress"], 0);
    assert_eq!(detail["status"], "active");
    assert!(detail["modules"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn lesson_navigation_walks_the_sequence() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    // three lessons spread over two modules
    let seeded = seed_published_course(&mut server, &db, "teach7", &[2, 1]).await;
    let (l1, l2, l3) = (
        seeded.lesson_ids[0],
        seeded.lesson_ids[1],
        seeded.lesson_ids[2],
    );

    server.clear_cookies();
    signup(&server, "learner5", "pass").await;
    enroll(&server, seeded.course_id).await;

    let view = server
        .get(&format!("/api/v1/lessons/{l1}"))
        .await
        .json::<Value>();
    assert!(view["previous"].is_null());
    assert_eq!(id_of(&view), l1);
    assert_eq!(view["next"]["id"].as_str().unwrap().parse::<Uuid>().unwrap(), l2);
    assert_eq!(view["sequence_index"], 0);
    assert_eq!(view["sequence_total"], 3);

    let view = server
        .get(&format!("/api/v1/lessons/{l2}"))
        .await
        .json::<Value>();
    assert_eq!(
        view["previous"]["id"].as_str().unwrap().parse::<Uuid>().unwrap(),
        l1
    );
    // next crosses into the second module
    assert_eq!(view["next"]["id"].as_str().unwrap().parse::<Uuid>().unwrap(), l3);

    let view = server
        .get(&format!("/api/v1/lessons/{l3}"))
        .await
        .json::<Value>();
    assert_eq!(
        view["previous"]["id"].as_str().unwrap().parse::<Uuid>().unwrap(),
        l2
    );
    assert!(view["next"].is_null());

    // unknown lesson id is a 404
    let resp = server.get(&format!("/api/v1/lessons/{}", Uuid::new_v4())).await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn playback_position_accumulates() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let seeded = seed_published_course(&mut server, &db, "teach8", &[1]).await;

    server.clear_cookies();
    signup(&server, "learner6", "pass").await;
    enroll(&server, seeded.course_id).await;
    let lesson_id = seeded.lesson_ids[0];

    let resp = server
        .post(&format!("/api/v1/lessons/{lesson_id}/position"))
        .json(&json!({ "position_seconds": 120, "watched_delta_seconds": 30 }))
        .await;
    resp.assert_status(StatusCode::OK);
    let row = resp.json::<Value>();
    assert_eq!(row["last_position"], 120);
    assert_eq!(row["watch_time"], 30);
    assert_eq!(row["is_completed"], false);

    // second report: position moves, watch time accumulates
    let row = server
        .post(&format!("/api/v1/lessons/{lesson_id}/position"))
        .json(&json!({ "position_seconds": 95, "watched_delta_seconds": 45 }))
        .await
        .json::<Value>();
    assert_eq!(row["last_position"], 95);
    assert_eq!(row["watch_time"], 75);

    // the lesson view resumes from the stored position
    let view = server
        .get(&format!("/api/v1/lessons/{lesson_id}"))
        .await
        .json::<Value>();
    assert_eq!(view["last_position"], 95);
    assert_eq!(view["watch_time"], 75);
}

#[tokio::test]
async fn enrollment_boundaries_are_enforced() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let course_a = seed_published_course(&mut server, &db, "teach9", &[1]).await;
    let course_b = seed_published_course(&mut server, &db, "teach10", &[1]).await;

    server.clear_cookies();
    signup(&server, "learner7", "pass").await;
    let enrollment = enroll(&server, course_a.course_id).await;

    // double enrollment is a conflict
    let resp = server
        .post("/api/v1/enrollments/")
        .json(&json!({ "course_id": course_a.course_id }))
        .await;
    resp.assert_status(StatusCode::CONFLICT);

    // marking a lesson of a course the student never enrolled in
    let resp = server
        .post(&format!(
            "/api/v1/lessons/{}/complete",
            course_b.lesson_ids[0]
        ))
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);

    // a foreign enrollment is invisible to other students
    let enrollment_id = id_of(&enrollment);
    server.clear_cookies();
    signup(&server, "learner8", "pass").await;
    let resp = server
        .get(&format!("/api/v1/enrollments/{enrollment_id}"))
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);

    // anonymous requests bounce at the door
    server.clear_cookies();
    let resp = server.get("/api/v1/enrollments/").await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cancelled_enrollment_rejects_progress() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let seeded = seed_published_course(&mut server, &db, "teach11", &[2]).await;

    server.clear_cookies();
    signup(&server, "learner9", "pass").await;
    let enrollment = enroll(&server, seeded.course_id).await;
    let enrollment_id = id_of(&enrollment);

    let resp = server
        .delete(&format!("/api/v1/enrollments/{enrollment_id}"))
        .await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.json::<Value>()["status"], "cancelled");

    // completion toggles refuse to touch a cancelled enrollment
    let resp = server
        .post(&format!(
            "/api/v1/lessons/{}/complete",
            seeded.lesson_ids[0]
        ))
        .await;
    resp.assert_status(StatusCode::CONFLICT);

    // and cancelling twice is a bad request
    let resp = server
        .delete(&format!("/api/v1/enrollments/{enrollment_id}"))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}
