pub mod dispatcher;

pub use dispatcher::{parse_recipients, EmailJob, MailDispatcher, MailError};
