//! `handler_v1.aleo`: capped public sale of `token_v1.aleo`.
//!
//! ```text
//! import token_v1.aleo;
//! mapping settings: u8 => u64;   // 0u8 = max supply, 1u8 = mint limit
//! mapping minted: u8 => u64;     // 0u8 = total bought
//! ```

use aleo_sandbox_types::{Plaintext, ProgramId, Value};

use super::token_v1::{HANDLER_V1, TOKEN_V1};
use super::{CallContext, NativeProgram};
use crate::simulation::SimulationError;

pub const SETTINGS_MAPPING: &str = "settings";
pub const MINTED_MAPPING: &str = "minted";
pub const MAX_SUPPLY_KEY: u8 = 0;
pub const MINT_LIMIT_KEY: u8 = 1;
pub const MINTED_KEY: u8 = 0;

#[derive(Debug, Clone, Copy, Default)]
pub struct HandlerV1;

impl HandlerV1 {
    fn init(&self, ctx: &mut CallContext<'_>, inputs: &[Value]) -> Result<Vec<Value>, SimulationError> {
        ctx.expect_inputs(inputs, 2)?;
        let max_supply = ctx.input_u64(inputs, 0)?;
        let mint_limit = ctx.input_u64(inputs, 1)?;

        let is_deployer = match ctx.deployer() {
            Some(deployer) => ctx.caller().address() == *deployer,
            None => false,
        };
        ctx.ensure(is_deployer, "only the deployer can initialize")?;
        ctx.ensure(
            !ctx.contains(SETTINGS_MAPPING, &Plaintext::u8(MAX_SUPPLY_KEY))?,
            "already initialized",
        )?;
        ctx.ensure(mint_limit > 0, "mint limit must be positive")?;
        ctx.ensure(
            mint_limit <= max_supply,
            "mint limit must not exceed max supply",
        )?;

        ctx.set(
            SETTINGS_MAPPING,
            &Plaintext::u8(MAX_SUPPLY_KEY),
            Plaintext::u64(max_supply),
        )?;
        ctx.set(
            SETTINGS_MAPPING,
            &Plaintext::u8(MINT_LIMIT_KEY),
            Plaintext::u64(mint_limit),
        )?;
        ctx.set(MINTED_MAPPING, &Plaintext::u8(MINTED_KEY), Plaintext::u64(0))?;
        Ok(Vec::new())
    }

    fn buy_token(&self, ctx: &mut CallContext<'_>, inputs: &[Value]) -> Result<Vec<Value>, SimulationError> {
        ctx.expect_inputs(inputs, 1)?;
        let amount = ctx.input_u64(inputs, 0)?;

        let max_supply = ctx.get(SETTINGS_MAPPING, &Plaintext::u8(MAX_SUPPLY_KEY))?;
        let mint_limit = ctx.get(SETTINGS_MAPPING, &Plaintext::u8(MINT_LIMIT_KEY))?;
        let (Some(max_supply), Some(mint_limit)) = (
            max_supply.and_then(|v| v.as_u64()),
            mint_limit.and_then(|v| v.as_u64()),
        ) else {
            return Err(ctx.abort("not initialized"));
        };

        ctx.ensure(amount <= mint_limit, "amount exceeds mint limit")?;
        let minted = ctx.get_u64_or(MINTED_MAPPING, &Plaintext::u8(MINTED_KEY), 0)?;
        let minted = ctx.checked_add(minted, amount)?;
        ctx.ensure(minted <= max_supply, "max supply reached")?;
        ctx.set(
            MINTED_MAPPING,
            &Plaintext::u8(MINTED_KEY),
            Plaintext::u64(minted),
        )?;

        let buyer = ctx.signer().clone();
        ctx.call(
            &ProgramId::from_static(TOKEN_V1),
            "mint_public",
            &[Plaintext::address(&buyer).into(), Plaintext::u64(amount).into()],
        )?;
        Ok(Vec::new())
    }
}

impl NativeProgram for HandlerV1 {
    fn id(&self) -> ProgramId {
        ProgramId::from_static(HANDLER_V1)
    }

    fn imports(&self) -> Vec<ProgramId> {
        vec![ProgramId::from_static(TOKEN_V1)]
    }

    fn mappings(&self) -> &'static [&'static str] {
        &[SETTINGS_MAPPING, MINTED_MAPPING]
    }

    fn functions(&self) -> &'static [&'static str] {
        &["init", "buy_token"]
    }

    fn call(
        &self,
        ctx: &mut CallContext<'_>,
        function: &str,
        inputs: &[Value],
    ) -> Result<Vec<Value>, SimulationError> {
        match function {
            "init" => self.init(ctx, inputs),
            "buy_token" => self.buy_token(ctx, inputs),
            other => Err(SimulationError::UnknownFunction {
                program: self.id(),
                function: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::devnet_accounts;
    use crate::programs::token::ACCOUNT_MAPPING;
    use crate::simulation::SimulationEnvironment;
    use aleo_sandbox_types::{Address, TransactionStatus};

    struct Fixture {
        env: SimulationEnvironment,
        admin: Address,
        buyer: Address,
        handler: ProgramId,
        token: ProgramId,
    }

    fn deployed() -> Fixture {
        let mut env = SimulationEnvironment::new();
        let accounts = devnet_accounts();
        let admin = accounts[0].1.clone();
        let buyer = accounts[1].1.clone();
        let token = ProgramId::from_static(TOKEN_V1);
        let handler = ProgramId::from_static(HANDLER_V1);
        env.deploy(&admin, &token).unwrap();
        env.deploy(&admin, &handler).unwrap();
        Fixture {
            env,
            admin,
            buyer,
            handler,
            token,
        }
    }

    fn u64s(values: &[u64]) -> Vec<Value> {
        values.iter().map(|v| Plaintext::u64(*v).into()).collect()
    }

    fn status(f: &mut Fixture, signer: &Address, function: &str, inputs: &[u64]) -> TransactionStatus {
        let handler = f.handler.clone();
        f.env
            .execute(signer, &handler, function, &u64s(inputs))
            .unwrap()
            .status
    }

    fn balance(f: &Fixture, who: &Address) -> Option<u64> {
        f.env
            .mapping_value(&f.token, ACCOUNT_MAPPING, &Plaintext::address(who))
            .unwrap()
            .and_then(|v| v.as_u64())
    }

    #[test]
    fn test_init_once_by_deployer() {
        let mut f = deployed();
        let (admin, buyer) = (f.admin.clone(), f.buyer.clone());
        assert_eq!(status(&mut f, &buyer, "init", &[10_000, 100]), TransactionStatus::Rejected);
        assert_eq!(status(&mut f, &admin, "init", &[10_000, 100]), TransactionStatus::Accepted);
        assert_eq!(status(&mut f, &admin, "init", &[10_000, 100]), TransactionStatus::Rejected);
    }

    #[test]
    fn test_init_validates_limits() {
        let mut f = deployed();
        let admin = f.admin.clone();
        assert_eq!(status(&mut f, &admin, "init", &[100, 0]), TransactionStatus::Rejected);
        assert_eq!(status(&mut f, &admin, "init", &[100, 101]), TransactionStatus::Rejected);
    }

    #[test]
    fn test_buy_token_mints_through_token_v1() {
        let mut f = deployed();
        let (admin, buyer) = (f.admin.clone(), f.buyer.clone());
        assert_eq!(status(&mut f, &admin, "init", &[10_000, 100]), TransactionStatus::Accepted);

        let before = balance(&f, &buyer).unwrap_or(0);
        assert_eq!(status(&mut f, &buyer, "buy_token", &[10]), TransactionStatus::Accepted);
        assert_eq!(balance(&f, &buyer), Some(before + 10));

        let minted = f
            .env
            .mapping_value(&f.handler, MINTED_MAPPING, &Plaintext::u8(MINTED_KEY))
            .unwrap();
        assert_eq!(minted.and_then(|v| v.as_u64()), Some(10));
    }

    #[test]
    fn test_buy_token_rules() {
        let mut f = deployed();
        let (admin, buyer) = (f.admin.clone(), f.buyer.clone());
        assert_eq!(status(&mut f, &buyer, "buy_token", &[1]), TransactionStatus::Rejected);

        assert_eq!(status(&mut f, &admin, "init", &[150, 100]), TransactionStatus::Accepted);
        assert_eq!(status(&mut f, &buyer, "buy_token", &[1000]), TransactionStatus::Rejected);
        assert_eq!(status(&mut f, &buyer, "buy_token", &[100]), TransactionStatus::Accepted);
        assert_eq!(status(&mut f, &buyer, "buy_token", &[60]), TransactionStatus::Rejected);
        assert_eq!(balance(&f, &buyer), Some(100));
    }
}
