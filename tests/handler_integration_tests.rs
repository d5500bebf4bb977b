mod common;

use axum::http::StatusCode;
use common::{PASSWORD, days_from_now, test_app};
use serde_json::json;

// --- Registration & login ---

#[tokio::test]
async fn register_job_seeker_returns_token_and_derived_age() {
    let app = test_app();
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "name": "  Jane  ",
                "email": "Jane@Example.COM",
                "password": PASSWORD,
                "phone": "0851234567",
                "role": "job_seeker",
                "dateOfBirth": "1995-06-15",
                "company": "Should be dropped",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered successfully");
    let user = &body["data"]["user"];
    assert_eq!(user["role"], "job_seeker");
    assert_eq!(user["email"], "jane@example.com");
    assert_eq!(user["name"], "Jane");
    assert!(user["age"].as_i64().unwrap() >= 30);
    assert!(user.get("company").is_none());
    assert!(user.get("passwordHash").is_none());
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn register_rejects_admin_role_and_unknown_roles() {
    let app = test_app();
    for role in ["admin", "superuser"] {
        let (status, body) = app
            .post(
                "/api/auth/register",
                None,
                json!({
                    "name": "Mallory",
                    "email": format!("{role}@example.com"),
                    "password": PASSWORD,
                    "phone": "1",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{role}");
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Role must be either job_seeker or recruiter");
    }
}

#[tokio::test]
async fn register_enforces_role_specific_fields() {
    let app = test_app();

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "name": "Rick", "email": "rick@example.com", "password": PASSWORD,
                "phone": "1", "role": "recruiter", "company": "   ",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Company name is required for recruiters");

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "name": "Jane", "email": "jane@example.com", "password": PASSWORD,
                "phone": "1", "role": "job_seeker",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Date of birth is required for job seekers");
}

#[tokio::test]
async fn register_rejects_job_seekers_under_sixteen() {
    let app = test_app();
    let fifteen = (chrono::Utc::now().date_naive() - chrono::Duration::days(15 * 365 + 30))
        .format("%Y-%m-%d")
        .to_string();
    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "name": "Kid", "email": "kid@example.com", "password": PASSWORD,
                "phone": "1", "role": "job_seeker", "dateOfBirth": fifteen,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict_regardless_of_case() {
    let app = test_app();
    app.register_seeker("dup@example.com").await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "name": "Other", "email": "DUP@example.com", "password": PASSWORD,
                "phone": "1", "role": "recruiter", "company": "Acme",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User already exists with this email");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = test_app();
    app.register_seeker("jane@example.com").await;

    let (wrong_pw_status, wrong_pw) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "jane@example.com", "password": "nope-nope" }),
        )
        .await;
    let (unknown_status, unknown) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ghost@example.com", "password": PASSWORD }),
        )
        .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);
    assert_eq!(wrong_pw["message"], "Invalid email or password");
}

#[tokio::test]
async fn login_accepts_mixed_case_email() {
    let app = test_app();
    let (_, id) = app.register_seeker("jane@example.com").await;
    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": " JANE@example.com ", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], id.to_string());
}

// --- Profile ---

#[tokio::test]
async fn profile_update_ignores_other_roles_fields() {
    let app = test_app();
    let (token, _) = app.register_recruiter("rick@example.com", "Acme").await;

    let (status, body) = app
        .put(
            "/api/auth/profile",
            Some(&token),
            json!({
                "name": "Rick R.",
                "company": "Acme Ltd",
                "skills": ["ignored"],
                "dateOfBirth": "2020-01-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let user = &body["data"];
    assert_eq!(user["role"], "recruiter");
    assert_eq!(user["name"], "Rick R.");
    assert_eq!(user["company"], "Acme Ltd");
    assert!(user.get("skills").is_none());
}

#[tokio::test]
async fn change_password_checks_current_and_rotates() {
    let app = test_app();
    let (token, _) = app.register_seeker("jane@example.com").await;

    let (status, _) = app
        .put(
            "/api/auth/change-password",
            Some(&token),
            json!({ "currentPassword": "wrong-one", "newPassword": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .put(
            "/api/auth/change-password",
            Some(&token),
            json!({ "currentPassword": PASSWORD, "newPassword": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put(
            "/api/auth/change-password",
            Some(&token),
            json!({ "currentPassword": PASSWORD, "newPassword": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "jane@example.com", "password": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

// --- Jobs ---

#[tokio::test]
async fn only_recruiters_create_jobs_and_company_comes_from_profile() {
    let app = test_app();
    let (seeker, _) = app.register_seeker("jane@example.com").await;
    let (recruiter, recruiter_id) = app.register_recruiter("rick@example.com", "Acme").await;

    let (status, body) = app
        .post(
            "/api/jobs",
            Some(&seeker),
            json!({ "title": "X", "location": "Y", "applicationDeadline": days_from_now(5) }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Recruiter role required.");

    let job = app
        .create_job(&recruiter, json!({ "company": "Spoofed Inc" }))
        .await;
    assert_eq!(job["company"], "Acme");
    assert_eq!(job["recruiterId"], recruiter_id.to_string());
    assert_eq!(job["status"], "active");
    assert_eq!(job["ageLimit"], json!({ "min": 18, "max": 65 }));
}

#[tokio::test]
async fn job_creation_validates_deadline_and_age_window() {
    let app = test_app();
    let (recruiter, _) = app.register_recruiter("rick@example.com", "Acme").await;

    let base = json!({ "title": "Dev", "location": "Cork" });
    let cases = [
        json!({ "applicationDeadline": days_from_now(-1) }),
        json!({ "applicationDeadline": days_from_now(5), "ageLimit": { "min": 40, "max": 30 } }),
        json!({ "applicationDeadline": days_from_now(5), "ageLimit": { "min": 15 } }),
        json!({ "applicationDeadline": days_from_now(5), "ageLimit": { "max": 101 } }),
    ];
    for case in cases {
        let mut body = base.clone();
        for (k, v) in case.as_object().unwrap() {
            body[k] = v.clone();
        }
        let (status, response) = app.post("/api/jobs", Some(&recruiter), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{case} -> {response}");
    }
}

#[tokio::test]
async fn foreign_and_missing_jobs_look_the_same_to_a_recruiter() {
    let app = test_app();
    let (owner, _) = app.register_recruiter("owner@example.com", "Acme").await;
    let (other, _) = app.register_recruiter("other@example.com", "Globex").await;
    let job = app.create_job(&owner, json!({})).await;
    let job_id = job["id"].as_str().unwrap();

    let (foreign_status, foreign) = app
        .put(&format!("/api/jobs/{job_id}"), Some(&other), json!({ "title": "Mine now" }))
        .await;
    let (missing_status, missing) = app
        .put(
            &format!("/api/jobs/{}", uuid::Uuid::new_v4()),
            Some(&other),
            json!({ "title": "Mine now" }),
        )
        .await;

    assert_eq!(foreign_status, StatusCode::NOT_FOUND);
    assert_eq!(missing_status, StatusCode::NOT_FOUND);
    assert_eq!(foreign, missing);
    assert_eq!(foreign["message"], "Job not found or you are not authorized");

    let (status, _) = app.delete(&format!("/api/jobs/{job_id}"), Some(&other)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .put(&format!("/api/jobs/{job_id}"), Some(&owner), json!({ "title": "Senior Dev" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Senior Dev");
    assert_eq!(body["data"]["company"], "Acme");
}

#[tokio::test]
async fn partial_age_update_is_checked_against_stored_bound() {
    let app = test_app();
    let (recruiter, _) = app.register_recruiter("rick@example.com", "Acme").await;
    let job = app
        .create_job(&recruiter, json!({ "ageLimit": { "min": 20, "max": 30 } }))
        .await;
    let uri = format!("/api/jobs/{}", job["id"].as_str().unwrap());

    let (status, _) = app
        .put(&uri, Some(&recruiter), json!({ "ageLimit": { "min": 35 } }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(&uri, Some(&recruiter), json!({ "ageLimit": { "max": 40 } }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ageLimit"], json!({ "min": 20, "max": 40 }));
}

#[tokio::test]
async fn listing_filters_by_numeric_salary_and_sorts() {
    let app = test_app();
    let (recruiter, _) = app.register_recruiter("rick@example.com", "Acme").await;
    app.create_job(&recruiter, json!({ "title": "Low", "salary": 30000 })).await;
    app.create_job(&recruiter, json!({ "title": "High", "salary": "90000" })).await;
    app.create_job(&recruiter, json!({ "title": "Vague", "salary": "Competitive" })).await;
    app.create_job(&recruiter, json!({ "title": "Hidden", "salary": 70000, "status": "draft" }))
        .await;

    let (status, body) = app.get("/api/jobs?sort=salary_desc", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["High", "Low", "Vague"]);
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["sort"], "salary_desc");

    let (_, body) = app.get("/api/jobs?minSalary=40000", None).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["High"]);

    let (_, body) = app.get("/api/jobs?page=2&limit=2", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["meta"]["totalPages"], 2);
}

#[tokio::test]
async fn get_job_reports_expiry_and_404() {
    let app = test_app();
    let (recruiter, _) = app.register_recruiter("rick@example.com", "Acme").await;
    let job = app.create_job(&recruiter, json!({})).await;

    let (status, body) = app
        .get(&format!("/api/jobs/{}", job["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isExpired"], false);

    let (status, body) = app
        .get(&format!("/api/jobs/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Job not found");
}

// --- Applications ---

#[tokio::test]
async fn applying_twice_to_the_same_job_conflicts() {
    let app = test_app();
    let (recruiter, recruiter_id) = app.register_recruiter("rick@example.com", "Acme").await;
    let (seeker, _) = app.register_seeker("jane@example.com").await;
    let first = app.create_job(&recruiter, json!({ "title": "One" })).await;
    let second = app.create_job(&recruiter, json!({ "title": "Two" })).await;

    let (status, body) = app.apply(&seeker, first["id"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["recruiterId"], recruiter_id.to_string());
    assert_eq!(body["data"]["job"]["title"], "One");

    let (status, body) = app.apply(&seeker, first["id"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "You have already applied for this job");

    let (status, _) = app.apply(&seeker, second["id"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, mine) = app.get("/api/applications/my-applications", Some(&seeker)).await;
    assert_eq!(mine["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn apply_requires_job_seeker_and_existing_job() {
    let app = test_app();
    let (recruiter, _) = app.register_recruiter("rick@example.com", "Acme").await;
    let (seeker, _) = app.register_seeker("jane@example.com").await;
    let job = app.create_job(&recruiter, json!({})).await;

    let (status, _) = app.apply(&recruiter, job["id"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.apply(&seeker, &uuid::Uuid::new_v4().to_string()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Job not found");
}

#[tokio::test]
async fn status_updates_are_limited_to_the_receiving_recruiter() {
    let app = test_app();
    let (owner, _) = app.register_recruiter("owner@example.com", "Acme").await;
    let (other, _) = app.register_recruiter("other@example.com", "Globex").await;
    let (seeker, _) = app.register_seeker("jane@example.com").await;
    let job = app.create_job(&owner, json!({})).await;
    let (_, applied) = app.apply(&seeker, job["id"].as_str().unwrap()).await;
    let uri = format!(
        "/api/applications/{}/status",
        applied["data"]["id"].as_str().unwrap()
    );

    let (status, body) = app.put(&uri, Some(&owner), json!({ "status": "hired" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid status");

    let (status, body) = app
        .put(&uri, Some(&other), json!({ "status": "shortlisted" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Application not found or you are not authorized");

    let (status, body) = app
        .put(&uri, Some(&owner), json!({ "status": "shortlisted" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "shortlisted");
    assert_eq!(body["data"]["applicant"]["email"], "jane@example.com");

    // Any status may follow any other.
    let (status, _) = app.put(&uri, Some(&owner), json!({ "status": "pending" })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, received) = app
        .get("/api/applications/received-applications", Some(&owner))
        .await;
    assert_eq!(received["data"].as_array().unwrap().len(), 1);
    let (_, received) = app
        .get("/api/applications/received-applications", Some(&other))
        .await;
    assert!(received["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn job_applicants_carry_age_eligibility() {
    let app = test_app();
    let (recruiter, _) = app.register_recruiter("rick@example.com", "Acme").await;
    let (seeker, _) = app.register_seeker("jane@example.com").await;
    let narrow = app
        .create_job(&recruiter, json!({ "ageLimit": { "min": 18, "max": 21 } }))
        .await;
    let broad = app.create_job(&recruiter, json!({})).await;
    app.apply(&seeker, narrow["id"].as_str().unwrap()).await;
    app.apply(&seeker, broad["id"].as_str().unwrap()).await;

    let (status, body) = app
        .get(
            &format!("/api/jobs/{}/applications", narrow["id"].as_str().unwrap()),
            Some(&recruiter),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let row = &body["data"]["applications"][0];
    assert_eq!(row["ageEligible"], false);
    assert!(row["applicant"]["age"].as_i64().is_some());

    let (_, body) = app
        .get(
            &format!("/api/jobs/{}/applications", broad["id"].as_str().unwrap()),
            Some(&recruiter),
        )
        .await;
    assert_eq!(body["data"]["applications"][0]["ageEligible"], true);

    let (_, mine) = app.get("/api/jobs/my-jobs", Some(&recruiter)).await;
    let counts: Vec<i64> = mine["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["applicationsCount"].as_i64().unwrap())
        .collect();
    assert_eq!(counts, [1, 1]);
}

#[tokio::test]
async fn deleting_a_job_removes_its_applications() {
    let app = test_app();
    let (recruiter, _) = app.register_recruiter("rick@example.com", "Acme").await;
    let (seeker, _) = app.register_seeker("jane@example.com").await;
    let job = app.create_job(&recruiter, json!({})).await;
    let job_id = job["id"].as_str().unwrap();
    app.apply(&seeker, job_id).await;

    let (status, body) = app.delete(&format!("/api/jobs/{job_id}"), Some(&recruiter)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Job deleted successfully");

    let (_, mine) = app.get("/api/applications/my-applications", Some(&seeker)).await;
    assert!(mine["data"].as_array().unwrap().is_empty());
    let (status, _) = app.get(&format!("/api/jobs/{job_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The former owner can no longer list applicants for it.
    let (status, body) = app
        .get(&format!("/api/jobs/{job_id}/applications"), Some(&recruiter))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Job not found or you are not authorized");
}

// --- Malformed input ---

#[tokio::test]
async fn unparseable_body_is_a_validation_error_in_the_envelope() {
    let app = test_app();
    let (recruiter, _) = app.register_recruiter("rick@example.com", "Acme").await;

    let (status, body) = app
        .post("/api/jobs", Some(&recruiter), json!({ "title": "T", "location": "L" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(
        body["message"].as_str().unwrap().contains("applicationDeadline"),
        "{body}"
    );

    let (status, body) = app
        .post("/api/auth/login", None, json!({ "email": 42 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn malformed_path_id_is_a_validation_error_in_the_envelope() {
    let app = test_app();
    let (recruiter, _) = app.register_recruiter("rick@example.com", "Acme").await;

    let (status, body) = app.get("/api/jobs/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());

    let (status, body) = app.delete("/api/jobs/42", Some(&recruiter)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn malformed_query_is_a_validation_error_in_the_envelope() {
    let app = test_app();

    let (status, body) = app.get("/api/jobs?page=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let app = test_app();
    let (recruiter, _) = app.register_recruiter("rick@example.com", "Acme").await;
    app.create_job(&recruiter, json!({})).await;

    let (status, body) = app
        .get("/api/jobs?page=9223372036854775807&limit=100", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["meta"]["total"], 1);
}

// --- CVs ---

#[tokio::test]
async fn at_most_one_cv_is_default() {
    let app = test_app();
    let (seeker, _) = app.register_seeker("jane@example.com").await;

    let (status, first) = app
        .post("/api/cv", Some(&seeker), json!({ "title": "Main", "isDefault": true }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, second) = app
        .post("/api/cv", Some(&seeker), json!({ "template": "modern", "isDefault": true }))
        .await;
    assert_eq!(second["data"]["title"], "My CV");

    let (_, list) = app.get("/api/cv/my", Some(&seeker)).await;
    let defaults: Vec<&str> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|cv| cv["isDefault"] == true)
        .map(|cv| cv["id"].as_str().unwrap())
        .collect();
    assert_eq!(defaults, [second["data"]["id"].as_str().unwrap()]);

    let first_uri = format!("/api/cv/{}", first["data"]["id"].as_str().unwrap());
    let (status, _) = app
        .put(&first_uri, Some(&seeker), json!({ "isDefault": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = app.get("/api/cv/my", Some(&seeker)).await;
    let defaults = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|cv| cv["isDefault"] == true)
        .count();
    assert_eq!(defaults, 1);
}

#[tokio::test]
async fn new_default_cv_clears_every_earlier_default() {
    let app = test_app();
    let (seeker, _) = app.register_seeker("jane@example.com").await;
    for title in ["Backend", "Frontend", "Data", "Ops"] {
        let (status, _) = app
            .post("/api/cv", Some(&seeker), json!({ "title": title, "isDefault": true }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, plain) = app.post("/api/cv", Some(&seeker), json!({ "title": "Draft" })).await;
    assert_eq!(plain["data"]["isDefault"], false);

    let (_, latest) = app
        .post("/api/cv", Some(&seeker), json!({ "title": "Latest", "isDefault": true }))
        .await;

    let (_, list) = app.get("/api/cv/my", Some(&seeker)).await;
    let cvs = list["data"].as_array().unwrap();
    assert_eq!(cvs.len(), 6);
    let defaults: Vec<&str> = cvs
        .iter()
        .filter(|cv| cv["isDefault"] == true)
        .map(|cv| cv["id"].as_str().unwrap())
        .collect();
    assert_eq!(defaults, [latest["data"]["id"].as_str().unwrap()]);
}

#[tokio::test]
async fn cvs_are_private_to_their_owner() {
    let app = test_app();
    let (jane, _) = app.register_seeker("jane@example.com").await;
    let (john, _) = app.register_seeker("john@example.com").await;
    let (_, cv) = app.post("/api/cv", Some(&jane), json!({})).await;
    let uri = format!("/api/cv/{}", cv["data"]["id"].as_str().unwrap());

    let (status, body) = app.put(&uri, Some(&john), json!({ "title": "Stolen" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "CV not found");
    let (status, _) = app.delete(&uri, Some(&john)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&uri, Some(&jane)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = app.get("/api/cv/my", Some(&jane)).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

// --- Contact ---

#[tokio::test]
async fn contact_submission_never_requires_a_token() {
    let app = test_app();
    let (seeker, _) = app.register_seeker("jane@example.com").await;
    let (admin, _) = app.seed_admin("admin@example.com").await;
    let message = json!({
        "name": "Guest", "email": "Guest@Example.com", "subject": "Hi", "message": "Hello",
    });

    let (status, body) = app.post("/api/contact", None, message.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["id"].is_string());

    let (status, _) = app
        .post("/api/contact", Some("not-a-real-token"), message.clone())
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.post("/api/contact", Some(&seeker), message).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.get("/api/contact", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let user_types: Vec<&serde_json::Value> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| &m["userType"])
        .collect();
    assert_eq!(user_types.len(), 3);
    assert_eq!(
        user_types.iter().filter(|t| **t == "job_seeker").count(),
        1
    );
    assert_eq!(body["data"][0]["email"], "guest@example.com");
}

#[tokio::test]
async fn contact_inbox_is_admin_only() {
    let app = test_app();
    let (seeker, _) = app.register_seeker("jane@example.com").await;
    let (admin, _) = app.seed_admin("admin@example.com").await;
    let (_, sent) = app
        .post(
            "/api/contact",
            None,
            json!({ "name": "G", "email": "g@example.com", "subject": "S", "message": "M" }),
        )
        .await;

    let (status, _) = app.get("/api/contact", Some(&seeker)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/api/contact", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let uri = format!("/api/contact/{}/status", sent["data"]["id"].as_str().unwrap());
    let (status, _) = app.put(&uri, Some(&admin), json!({ "status": "archived" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = app.put(&uri, Some(&admin), json!({ "status": "read" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "read");

    let (_, body) = app.get("/api/contact?status=new", Some(&admin)).await;
    assert_eq!(body["meta"]["total"], 0);
}

#[tokio::test]
async fn contact_validation_reports_missing_fields() {
    let app = test_app();
    let (status, body) = app
        .post(
            "/api/contact",
            None,
            json!({ "name": "G", "email": "not-an-email", "subject": " ", "message": "M" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("A valid email is required"));
    assert!(message.contains("Subject is required"));
}
