#![forbid(unsafe_code)]

pub mod http;
pub mod identity;
pub mod repository;

pub use http::{HttpBackend, HttpInitError};
pub use identity::{Identity, IdentityProvider, Role, StaticIdentity};
pub use repository::{
    Backend, BackendError, CourseBackend, InMemoryBackend, Operation, QuizBackend,
    QuizResultRecord,
};
