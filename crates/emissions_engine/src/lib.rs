//! Emissions engine: asynchronous job orchestration against the remote
//! computation service, plus the client-side result cache wiring.
mod day;
mod error;
mod flow;
mod handle;
mod http;
mod poll;
mod range;
mod service;
mod sink;
mod time;

pub use day::{DayOrchestrator, DaySettings};
pub use error::ServiceError;
pub use handle::DashboardHandle;
pub use http::{HttpJobService, HttpSettings};
pub use poll::{poll_job, PollOutcome, PollSettings};
pub use range::{RangeOrchestrator, RangeSettings};
pub use service::{ExistsReply, JobService, StartDisposition, StartReply};
pub use sink::{ChannelStateSink, NullSink, StateEvent, StateSink};
pub use time::{Sleeper, TokioSleeper};
