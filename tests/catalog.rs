mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::{
    id_of, insert_user_with_role, seed_published_course, setup_server, setup_test_db, signin,
    signup,
};

#[tokio::test]
async fn students_cannot_author_courses() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;

    signup(&server, "student1", "pass").await;

    let resp = server
        .post("/api/v1/courses/")
        .json(&json!({ "title": "nope", "description": "" }))
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn drafts_are_invisible_to_students() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    insert_user_with_role(&db, "teach1", "teach", "instructor").await;
    signin(&server, "teach1", "teach").await;

    let course = server
        .post("/api/v1/courses/")
        .json(&json!({ "title": "draft course", "description": "", "published": false }))
        .await
        .json::<Value>();
    let course_id = id_of(&course);

    // the owner sees the draft in the catalog
    let catalog = server.get("/api/v1/courses/").await.json::<Value>();
    assert_eq!(catalog.as_array().unwrap().len(), 1);

    // a student sees an empty catalog and a 404 on direct access
    server.clear_cookies();
    signup(&server, "student2", "pass").await;

    let catalog = server.get("/api/v1/courses/").await.json::<Value>();
    assert!(catalog.as_array().unwrap().is_empty());

    let resp = server.get(&format!("/api/v1/courses/{course_id}")).await;
    resp.assert_status(StatusCode::NOT_FOUND);

    // enrolling into a draft is also a 404
    let resp = server
        .post("/api/v1/enrollments/")
        .json(&json!({ "course_id": course_id }))
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);

    // publish, and the student can see it
    server.clear_cookies();
    signin(&server, "teach1", "teach").await;
    let resp = server
        .put(&format!("/api/v1/courses/{course_id}"))
        .json(&json!({ "title": "draft course", "description": "", "published": true }))
        .await;
    resp.assert_status(StatusCode::OK);

    server.clear_cookies();
    signin(&server, "student2", "pass").await;
    let resp = server.get(&format!("/api/v1/courses/{course_id}")).await;
    resp.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn outline_follows_module_and_lesson_order() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    insert_user_with_role(&db, "teach2", "teach", "instructor").await;
    signin(&server, "teach2", "teach").await;

    let course = server
        .post("/api/v1/courses/")
        .json(&json!({ "title": "ordered", "description": "", "published": true }))
        .await
        .json::<Value>();
    let course_id = id_of(&course);

    // insert modules out of order; the outline must come back sorted
    for (title, order_index) in [("second", 2), ("first", 1)] {
        server
            .post("/api/v1/modules/")
            .json(&json!({
                "course_id": course_id,
                "title": title,
                "description": "",
                "order_index": order_index,
            }))
            .await
            .assert_status(StatusCode::OK);
    }

    let detail = server
        .get(&format!("/api/v1/courses/{course_id}"))
        .await
        .json::<Value>();
    let modules = detail["outline"]["modules"].as_array().unwrap();
    assert_eq!(modules[0]["title"], "first");
    assert_eq!(modules[1]["title"], "second");
    assert_eq!(detail["total_lessons"], 0);
}

#[tokio::test]
async fn foreign_instructor_cannot_touch_course() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let seeded = seed_published_course(&mut server, &db, "owner1", &[1]).await;

    insert_user_with_role(&db, "intruder", "teach", "instructor").await;
    server.clear_cookies();
    signin(&server, "intruder", "teach").await;

    let resp = server
        .put(&format!("/api/v1/courses/{}", seeded.course_id))
        .json(&json!({ "title": "hijacked", "description": "" }))
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);

    let resp = server
        .post("/api/v1/modules/")
        .json(&json!({
            "course_id": seeded.course_id,
            "title": "sneaky",
            "description": "",
        }))
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);

    let resp = server
        .delete(&format!("/api/v1/lessons/{}", seeded.lesson_ids[0]))
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn catalog_requires_auth() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;

    let resp = server.get("/api/v1/courses/").await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}
