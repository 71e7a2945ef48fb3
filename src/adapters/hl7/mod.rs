//! HL7 v2 notification adapter
//!
//! - [`message`]: ORU^R01 rendering for exams and beds
//! - [`ack`]: MSA acknowledgement parsing
//! - [`transport`]: HTTP submission with bounded retry

pub mod ack;
pub mod message;
pub mod transport;

pub use ack::parse_ack;
pub use message::{escape, MessageRenderer, Segment};
pub use transport::{HttpTransport, Transport};
