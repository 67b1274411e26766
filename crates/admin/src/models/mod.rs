//! Domain models for the back-office.
//!
//! Each entity module holds the stored record (`sqlx::FromRow`, serialized
//! camelCase for the API) and, where the entity accepts writes, a loose
//! `*Input` type plus the validated `New*` value it produces.

pub mod admin;
pub mod application;
pub mod notice;
pub mod notification;
pub mod report;
pub mod session;
pub mod student;
pub mod teacher;
pub mod testimonial;
pub mod tuition_request;

pub use admin::Admin;
pub use application::{ApplicationDecision, ApplicationDetail, ApplicationInput, NewApplication};
pub use notice::{NewNotice, Notice, NoticeInput};
pub use notification::{NewNotification, Notification};
pub use report::{
    DashboardChartData, DashboardStats, FullReport, MonthlyPoint, ReportFilters, SubjectSlice,
};
pub use session::{CurrentAdmin, keys as session_keys};
pub use student::{NewStudent, Student, StudentInput};
pub use teacher::{NewTeacher, Teacher, TeacherAdminUpdate, TeacherInput, TeacherStanding};
pub use testimonial::{NewTestimonial, Testimonial, TestimonialInput};
pub use tuition_request::{TuitionRequest, TuitionRequestDetail, TuitionRequestUpdate};
