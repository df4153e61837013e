pub mod content_block;
pub mod course;
pub mod participant;
pub mod webinar;

pub use content_block::{ContentBlock, ContentBlockRequest};
pub use course::{
    Course, CourseBlock, CourseRequest, CourseSchedule, Frequency, NewCourseBlockRequest,
    UpdateCourseBlockRequest,
};
pub use participant::{CompletionStatus, NewResponseRequest, Participant, Response};
pub use webinar::{
    NewVisualTest, NewWebinar, NewWebinarDay, VisualTest, Webinar, WebinarDay, WebinarDayDetail,
    WebinarDetail,
};
