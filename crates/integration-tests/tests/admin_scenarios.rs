//! End-to-end scenarios against a real database.
//!
//! Each test receives a fresh database with the admin migrations applied.
//! Requires `DATABASE_URL` pointing at a `PostgreSQL` server that allows
//! creating databases.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::Utc;
use sqlx::PgPool;

use tutorlink_admin::db::{
    ApplicationRepository, NotificationRepository, StudentRepository, TeacherRepository,
    TestimonialRepository, TuitionRequestRepository,
};
use tutorlink_admin::error::AppError;
use tutorlink_admin::models::{ApplicationInput, ReportFilters, TestimonialInput};
use tutorlink_admin::services::{
    AdminAuthError, AdminAuthService, RegistrationError, RegistrationService, ReportService,
};
use tutorlink_core::{ApplicationStatus, NotificationType, TestimonialRole, TuitionRequestStatus};
use tutorlink_integration_tests::{student, teacher};

// =============================================================================
// Auth
// =============================================================================

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_login_repeats_and_failures_are_generic(pool: PgPool) {
    let auth = AdminAuthService::new(&pool);
    let admin = auth
        .create_admin("office@tutorlink.com.np", "Office", "correct horse")
        .await
        .unwrap();

    for _ in 0..3 {
        let signed_in = auth
            .login("office@tutorlink.com.np", "correct horse")
            .await
            .unwrap();
        assert_eq!(signed_in.id, admin.id);
    }

    let wrong_password = auth
        .login("office@tutorlink.com.np", "wrong horse")
        .await
        .unwrap_err();
    let unknown_email = auth
        .login("nobody@tutorlink.com.np", "correct horse")
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AdminAuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AdminAuthError::InvalidCredentials));
    assert_eq!(
        AppError::from(wrong_password).to_string(),
        AppError::from(unknown_email).to_string()
    );
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_password_reset_rules(pool: PgPool) {
    let auth = AdminAuthService::new(&pool);
    let admin = auth
        .create_admin("office@tutorlink.com.np", "Office", "correct horse")
        .await
        .unwrap();

    // Short passwords never get through, whatever the current password.
    for current in ["correct horse", "wrong horse"] {
        let result = auth
            .reset_password(Some(admin.id), current, "short", "short")
            .await;
        assert!(result.is_err());
    }

    assert!(matches!(
        auth.reset_password(None, "correct horse", "battery staple", "battery staple")
            .await,
        Err(AdminAuthError::Unauthorized)
    ));

    auth.reset_password(Some(admin.id), "correct horse", "battery staple", "battery staple")
        .await
        .unwrap();

    assert!(
        auth.login("office@tutorlink.com.np", "correct horse")
            .await
            .is_err()
    );
    auth.login("office@tutorlink.com.np", "battery staple")
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_deleted_admin_has_no_session_admin(pool: PgPool) {
    let auth = AdminAuthService::new(&pool);
    let admin = auth
        .create_admin("office@tutorlink.com.np", "Office", "correct horse")
        .await
        .unwrap();
    assert_eq!(
        auth.current_admin(admin.id).await.unwrap().map(|a| a.id),
        Some(admin.id)
    );

    sqlx::query("DELETE FROM tutorlink.admin WHERE id = $1")
        .bind(admin.id.as_i32())
        .execute(&pool)
        .await
        .unwrap();

    assert!(auth.current_admin(admin.id).await.unwrap().is_none());
}

// =============================================================================
// Registration
// =============================================================================

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_student_registration_creates_request_and_notification(pool: PgPool) {
    let (asha, request) = RegistrationService::new(&pool)
        .register_student(&student("Asha", "Bagmati", &["Math", "English"]))
        .await
        .unwrap();

    assert_eq!(asha.subjects, ["Math", "English"]);
    assert_eq!(request.student_id, asha.id);
    assert_eq!(request.status, TuitionRequestStatus::Active);

    let notifications = NotificationRepository::new(&pool);
    let feed = notifications.list(false, 50).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].kind, NotificationType::StudentRegistration);
    assert!(feed[0].message.contains("Asha"));

    notifications.delete(feed[0].id).await.unwrap();

    assert!(notifications.list(false, 50).await.unwrap().is_empty());
    assert!(
        StudentRepository::new(&pool)
            .get_by_id(asha.id)
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        TuitionRequestRepository::new(&pool)
            .get_by_id(request.id)
            .await
            .unwrap()
            .is_some()
    );
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_student_search_takes_wildcards_literally(pool: PgPool) {
    let registration = RegistrationService::new(&pool);
    for name in ["Asha", "Bina"] {
        registration
            .register_student(&student(name, "Bagmati", &["Math"]))
            .await
            .unwrap();
    }

    let students = StudentRepository::new(&pool);
    assert_eq!(students.list(None, 50, 0).await.unwrap().len(), 2);
    assert!(students.list(Some("%"), 50, 0).await.unwrap().is_empty());
    assert!(students.list(Some("_"), 50, 0).await.unwrap().is_empty());

    let found = students.list(Some("sha"), 50, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Asha");
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_application_flow_assigns_request(pool: PgPool) {
    let registration = RegistrationService::new(&pool);
    let (_, request) = registration
        .register_student(&student("Asha", "Bagmati", &["Math"]))
        .await
        .unwrap();
    let tutor = registration
        .register_teacher(&teacher("Sita Sharma", "Bagmati"))
        .await
        .unwrap();
    assert!(!tutor.is_approved);

    let apply = || {
        ApplicationInput {
            teacher_code: tutor.teacher_code.to_string(),
            tuition_request_id: Some(request.id.as_i32()),
        }
        .validate()
        .unwrap()
    };

    // Unapproved teacher, then unapproved request.
    assert!(registration.apply(&apply()).await.is_err());
    TeacherRepository::new(&pool)
        .set_approved(tutor.id, true)
        .await
        .unwrap();
    assert!(registration.apply(&apply()).await.is_err());

    TuitionRequestRepository::new(&pool)
        .update(request.id, None, Some(true))
        .await
        .unwrap();
    let application_id = registration.apply(&apply()).await.unwrap();

    // Second application by the same teacher is refused.
    assert!(matches!(
        registration.apply(&apply()).await,
        Err(RegistrationError::AlreadyApplied)
    ));

    registration
        .decide_application(application_id, ApplicationStatus::Approved)
        .await
        .unwrap();

    let detail = ApplicationRepository::new(&pool)
        .get_detail(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.status, ApplicationStatus::Approved);
    assert_eq!(detail.student_name, "Asha");

    let request = TuitionRequestRepository::new(&pool)
        .get_by_id(request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.status, TuitionRequestStatus::Assigned);
}

// =============================================================================
// Testimonials
// =============================================================================

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_testimonial_rating_bounds(pool: PgPool) {
    let input = |rating| TestimonialInput {
        name: "Sita".to_string(),
        role: Some(TestimonialRole::Parent),
        message: "Found a great tutor within a week.".to_string(),
        rating: Some(rating),
        location: None,
    };

    let errors = input(6).validate().unwrap_err();
    assert!(errors.field("rating").is_some());

    let repo = TestimonialRepository::new(&pool);
    let created = repo.create(&input(1).validate().unwrap()).await.unwrap();
    let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.rating.get(), 1);
}

// =============================================================================
// Reports
// =============================================================================

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_empty_dashboard_chart(pool: PgPool) {
    let chart = ReportService::new(&pool)
        .dashboard_chart(Utc::now())
        .await
        .unwrap();

    assert_eq!(chart.monthly_data.len(), 6);
    assert!(
        chart
            .monthly_data
            .iter()
            .all(|m| m.students == 0 && m.teachers == 0 && m.requests == 0)
    );
    assert!(chart.subject_data.is_empty());
    assert_eq!(chart.growth_percent, 0);
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_growth_from_empty_previous_month(pool: PgPool) {
    for name in ["Asha", "Bimal", "Chandra", "Dipa", "Eshan"] {
        StudentRepository::insert(&pool, &student(name, "Bagmati", &["Math"]))
            .await
            .unwrap();
    }

    let chart = ReportService::new(&pool)
        .dashboard_chart(Utc::now())
        .await
        .unwrap();

    let current = chart.monthly_data.last().unwrap();
    assert_eq!(current.students, 5);
    assert_eq!(chart.monthly_data[4].students, 0);
    assert_eq!(chart.growth_percent, 500);
    assert_eq!(chart.subject_data[0].name, "Math");
    assert_eq!(chart.subject_data[0].count, 5);
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_province_filter_only_narrows_people(pool: PgPool) {
    let registration = RegistrationService::new(&pool);
    registration
        .register_student(&student("Asha", "Bagmati", &["Math"]))
        .await
        .unwrap();
    registration
        .register_student(&student("Bimal", "Gandaki", &["Science"]))
        .await
        .unwrap();
    registration
        .register_teacher(&teacher("Sita Sharma", "Bagmati"))
        .await
        .unwrap();
    registration
        .register_teacher(&teacher("Gita Thapa", "Gandaki"))
        .await
        .unwrap();

    let report = ReportService::new(&pool)
        .full_report::<AppError>(Ok(ReportFilters {
            province: Some("Bagmati".to_string()),
            ..ReportFilters::default()
        }))
        .await;

    assert_eq!(report.students.len(), 1);
    assert!(report.students.iter().all(|s| s.province == "Bagmati"));
    assert_eq!(report.teachers.len(), 1);
    assert!(report.teachers.iter().all(|t| t.province == "Bagmati"));
    assert_eq!(report.tuition_requests.len(), 2);
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_bad_filters_degrade_to_empty_report(pool: PgPool) {
    RegistrationService::new(&pool)
        .register_student(&student("Asha", "Bagmati", &["Math"]))
        .await
        .unwrap();

    let report = ReportService::new(&pool)
        .full_report(Err("invalid date in `from`"))
        .await;

    assert!(report.students.is_empty());
    assert!(report.teachers.is_empty());
    assert!(report.applications.is_empty());
    assert!(report.tuition_requests.is_empty());
}
