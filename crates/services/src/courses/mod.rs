mod service;
mod view;

pub use service::{CourseService, MarkOutcome};
pub use view::CourseView;
