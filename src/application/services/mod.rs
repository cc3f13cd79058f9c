//! Business logic services for the application layer.

pub mod example_service;
pub mod mailer_queue;
pub mod token_service;

pub use example_service::ExampleService;
pub use mailer_queue::MailerQueue;
pub use token_service::{TokenError, TokenPair, TokenPayload, TokenService};
