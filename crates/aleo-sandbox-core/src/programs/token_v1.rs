//! `token_v1.aleo`: the token minted through `handler_v1.aleo`.
//!
//! Same interface as `token.aleo`, plus a `supply: u8 => u64` mapping with the
//! total minted under key `0u8`. `mint_public` aborts unless the immediate
//! caller is `handler_v1.aleo`; `mint_private` stays open.

use aleo_sandbox_types::ProgramId;

use super::token::TokenProgram;

pub const TOKEN_V1: &str = "token_v1.aleo";
pub const HANDLER_V1: &str = "handler_v1.aleo";

pub fn token_v1() -> TokenProgram {
    TokenProgram::with_policy(
        ProgramId::from_static(TOKEN_V1),
        Some(ProgramId::from_static(HANDLER_V1)),
        true,
    )
}
