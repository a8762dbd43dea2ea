//! `token.aleo`: a token with public balances and private `token` records.
//!
//! ```text
//! mapping account: address => u64;
//! record token { owner: address, amount: u64 }
//! ```

use aleo_sandbox_types::{Address, Entry, Plaintext, ProgramId, RecordPlaintext, Value};

use super::{CallContext, NativeProgram};
use crate::simulation::SimulationError;

pub const TOKEN_RECORD: &str = "token";
pub const ACCOUNT_MAPPING: &str = "account";
pub const SUPPLY_MAPPING: &str = "supply";

const FUNCTIONS: &[&str] = &[
    "mint_public",
    "mint_private",
    "transfer_public",
    "transfer_private",
    "transfer_private_to_public",
    "transfer_public_to_private",
];

/// Token program, optionally with a restricted public mint and a supply
/// counter (see [`super::token_v1`]).
#[derive(Debug, Clone)]
pub struct TokenProgram {
    id: ProgramId,
    /// Only this program may call `mint_public`.
    minter: Option<ProgramId>,
    /// Track total minted under `supply[0u8]`.
    track_supply: bool,
}

impl TokenProgram {
    /// `token.aleo`: unrestricted minting, no supply mapping.
    pub fn token() -> Self {
        Self {
            id: ProgramId::from_static("token.aleo"),
            minter: None,
            track_supply: false,
        }
    }

    pub(crate) fn with_policy(id: ProgramId, minter: Option<ProgramId>, track_supply: bool) -> Self {
        Self {
            id,
            minter,
            track_supply,
        }
    }

    fn amount_record(&self, ctx: &mut CallContext<'_>, owner: &Address, amount: u64) -> Value {
        let data = vec![("amount".to_string(), Entry::private(Plaintext::u64(amount)))];
        Value::Record(ctx.issue(TOKEN_RECORD, owner, data))
    }

    fn record_amount(ctx: &CallContext<'_>, record: &RecordPlaintext) -> Result<u64, SimulationError> {
        record
            .get("amount")
            .and_then(Plaintext::as_u64)
            .ok_or_else(|| ctx.invalid("token record has no u64 amount"))
    }

    fn credit(&self, ctx: &mut CallContext<'_>, who: &Address, amount: u64) -> Result<(), SimulationError> {
        let key = Plaintext::address(who);
        let balance = ctx.get_u64_or(ACCOUNT_MAPPING, &key, 0)?;
        let balance = ctx.checked_add(balance, amount)?;
        ctx.set(ACCOUNT_MAPPING, &key, Plaintext::u64(balance))
    }

    fn debit(&self, ctx: &mut CallContext<'_>, who: &Address, amount: u64) -> Result<(), SimulationError> {
        let key = Plaintext::address(who);
        let balance = ctx.get_u64_or(ACCOUNT_MAPPING, &key, 0)?;
        let balance = ctx.checked_sub(balance, amount)?;
        ctx.set(ACCOUNT_MAPPING, &key, Plaintext::u64(balance))
    }

    fn add_supply(&self, ctx: &mut CallContext<'_>, amount: u64) -> Result<(), SimulationError> {
        if !self.track_supply {
            return Ok(());
        }
        let key = Plaintext::u8(0);
        let supply = ctx.get_u64_or(SUPPLY_MAPPING, &key, 0)?;
        let supply = ctx.checked_add(supply, amount)?;
        ctx.set(SUPPLY_MAPPING, &key, Plaintext::u64(supply))
    }

    fn mint_public(&self, ctx: &mut CallContext<'_>, inputs: &[Value]) -> Result<Vec<Value>, SimulationError> {
        ctx.expect_inputs(inputs, 2)?;
        let receiver = ctx.input_address(inputs, 0)?;
        let amount = ctx.input_u64(inputs, 1)?;
        if let Some(minter) = &self.minter {
            ctx.ensure(
                ctx.caller().is_program(minter),
                &format!("mint_public may only be called by {}", minter),
            )?;
        }
        self.credit(ctx, &receiver, amount)?;
        self.add_supply(ctx, amount)?;
        Ok(Vec::new())
    }

    fn mint_private(&self, ctx: &mut CallContext<'_>, inputs: &[Value]) -> Result<Vec<Value>, SimulationError> {
        ctx.expect_inputs(inputs, 2)?;
        let receiver = ctx.input_address(inputs, 0)?;
        let amount = ctx.input_u64(inputs, 1)?;
        self.add_supply(ctx, amount)?;
        Ok(vec![self.amount_record(ctx, &receiver, amount)])
    }

    fn transfer_public(&self, ctx: &mut CallContext<'_>, inputs: &[Value]) -> Result<Vec<Value>, SimulationError> {
        ctx.expect_inputs(inputs, 2)?;
        let receiver = ctx.input_address(inputs, 0)?;
        let amount = ctx.input_u64(inputs, 1)?;
        let sender = ctx.caller().address();
        self.debit(ctx, &sender, amount)?;
        self.credit(ctx, &receiver, amount)?;
        Ok(Vec::new())
    }

    /// Returns `(remaining, transferred)`.
    fn transfer_private(&self, ctx: &mut CallContext<'_>, inputs: &[Value]) -> Result<Vec<Value>, SimulationError> {
        ctx.expect_inputs(inputs, 3)?;
        let sender = ctx.input_record(inputs, 0)?;
        let receiver = ctx.input_address(inputs, 1)?;
        let amount = ctx.input_u64(inputs, 2)?;
        let held = Self::record_amount(ctx, sender)?;
        let difference = ctx.checked_sub(held, amount)?;

        ctx.consume(sender)?;
        let remaining = self.amount_record(ctx, sender.owner(), difference);
        let transferred = self.amount_record(ctx, &receiver, amount);
        Ok(vec![remaining, transferred])
    }

    /// Returns the sender's change; the amount lands in the public balance.
    fn transfer_private_to_public(
        &self,
        ctx: &mut CallContext<'_>,
        inputs: &[Value],
    ) -> Result<Vec<Value>, SimulationError> {
        ctx.expect_inputs(inputs, 3)?;
        let sender = ctx.input_record(inputs, 0)?;
        let receiver = ctx.input_address(inputs, 1)?;
        let amount = ctx.input_u64(inputs, 2)?;
        let held = Self::record_amount(ctx, sender)?;
        let difference = ctx.checked_sub(held, amount)?;

        ctx.consume(sender)?;
        let remaining = self.amount_record(ctx, sender.owner(), difference);
        self.credit(ctx, &receiver, amount)?;
        Ok(vec![remaining])
    }

    fn transfer_public_to_private(
        &self,
        ctx: &mut CallContext<'_>,
        inputs: &[Value],
    ) -> Result<Vec<Value>, SimulationError> {
        ctx.expect_inputs(inputs, 2)?;
        let receiver = ctx.input_address(inputs, 0)?;
        let amount = ctx.input_u64(inputs, 1)?;
        let sender = ctx.caller().address();
        self.debit(ctx, &sender, amount)?;
        Ok(vec![self.amount_record(ctx, &receiver, amount)])
    }
}

impl NativeProgram for TokenProgram {
    fn id(&self) -> ProgramId {
        self.id.clone()
    }

    fn mappings(&self) -> &'static [&'static str] {
        if self.track_supply {
            &[ACCOUNT_MAPPING, SUPPLY_MAPPING]
        } else {
            &[ACCOUNT_MAPPING]
        }
    }

    fn functions(&self) -> &'static [&'static str] {
        FUNCTIONS
    }

    fn call(
        &self,
        ctx: &mut CallContext<'_>,
        function: &str,
        inputs: &[Value],
    ) -> Result<Vec<Value>, SimulationError> {
        match function {
            "mint_public" => self.mint_public(ctx, inputs),
            "mint_private" => self.mint_private(ctx, inputs),
            "transfer_public" => self.transfer_public(ctx, inputs),
            "transfer_private" => self.transfer_private(ctx, inputs),
            "transfer_private_to_public" => self.transfer_private_to_public(ctx, inputs),
            "transfer_public_to_private" => self.transfer_public_to_private(ctx, inputs),
            other => Err(SimulationError::UnknownFunction {
                program: self.id.clone(),
                function: other.to_string(),
            }),
        }
    }
}
