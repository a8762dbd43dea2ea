//! Typed clients for the bundled programs.
//!
//! Each binding wraps a [`ProgramClient`](crate::client::ProgramClient),
//! turns Rust arguments into program inputs and decodes mapping values and
//! records into Rust types.

pub mod handler_v1;
pub mod token;
pub mod token_v1;

pub use handler_v1::HandlerV1Contract;
pub use token::{Token, TokenContract};
pub use token_v1::TokenV1Contract;

use aleo_sandbox_types::{Address, Plaintext, Value};

pub(crate) fn address_input(address: &Address) -> Value {
    Plaintext::address(address).into()
}

pub(crate) fn u64_input(value: u64) -> Value {
    Plaintext::u64(value).into()
}
