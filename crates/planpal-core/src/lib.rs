//! Core types: session, transcript, calendar embed, routes, privacy policy

pub mod calendar;
pub mod message;
pub mod privacy;
pub mod route;
pub mod session;
pub mod tracing;

pub use calendar::{CalendarError, CalendarView, CALENDAR_TIMEZONE};
pub use message::{Message, Role, Transcript};
pub use privacy::{PrivacyPolicy, PrivacySection};
pub use route::Route;
pub use session::{AuthPayload, Session, User};
pub use self::tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
