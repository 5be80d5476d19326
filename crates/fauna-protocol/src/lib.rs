//! FaunaDB Wire Protocol
//!
//! Converts between wire JSON and the driver's value model, and defines the
//! messages exchanged when paging through a set.
//!
//! # Modules
//!
//! - **json**: Tagged value codec (`@ref`, `@set`, `@ts`, `@date`, `@obj`)
//! - **message**: Pagination options and response envelopes

pub mod json;
pub mod message;

pub use json::{decode, decode_event, decode_page, encode, encode_event, encode_page, Tag, Tagged};
pub use message::{ErrorDto, PageOptions, ResponseEnvelope};
