//! `handler_v1.aleo`: capped public sale of `token_v1.aleo`.

use super::u64_input;
use crate::client::ProgramClient;
use crate::session::Session;
use crate::transaction::TransactionHandle;
use aleo_sandbox_types::{Plaintext, ProgramId};
use anyhow::Result;

pub const HANDLER_V1_PROGRAM: &str = "handler_v1.aleo";

const SETTINGS: &str = "settings";
const MINTED: &str = "minted";
const MAX_SUPPLY_KEY: u8 = 0;
const MINT_LIMIT_KEY: u8 = 1;

#[derive(Debug, Clone)]
pub struct HandlerV1Contract {
    client: ProgramClient,
}

impl HandlerV1Contract {
    pub fn new(session: &Session) -> Self {
        Self::from_client(session.client(&ProgramId::from_static(HANDLER_V1_PROGRAM)))
    }

    pub fn from_client(client: ProgramClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ProgramClient {
        &self.client
    }

    pub fn with_signer(&self, index: usize) -> Result<Self> {
        Ok(Self::from_client(self.client.with_signer(index)?))
    }

    pub async fn is_deployed(&self) -> Result<bool> {
        self.client.is_deployed().await
    }

    pub async fn deploy(&self) -> Result<TransactionHandle> {
        self.client.deploy().await
    }

    /// One-time setup by the deployer. Requires `0 < mint_limit <= max_supply`.
    pub async fn init(&self, max_supply: u64, mint_limit: u64) -> Result<TransactionHandle> {
        self.client
            .call("init", &[u64_input(max_supply), u64_input(mint_limit)])
            .await
    }

    /// Mint `amount` public `token_v1` to the signer.
    pub async fn buy_token(&self, amount: u64) -> Result<TransactionHandle> {
        self.client.call("buy_token", &[u64_input(amount)]).await
    }

    pub async fn max_supply(&self) -> Result<Option<u64>> {
        self.setting(MAX_SUPPLY_KEY).await
    }

    pub async fn mint_limit(&self) -> Result<Option<u64>> {
        self.setting(MINT_LIMIT_KEY).await
    }

    pub async fn minted(&self, default: u64) -> Result<u64> {
        self.client
            .mapping_u64_or(MINTED, &Plaintext::u8(0), default)
            .await
    }

    async fn setting(&self, key: u8) -> Result<Option<u64>> {
        let value = self.client.mapping(SETTINGS, &Plaintext::u8(key)).await?;
        value
            .map(|v| {
                v.as_u64()
                    .ok_or_else(|| anyhow::anyhow!("{}[{}u8] is not a u64: {}", SETTINGS, key, v))
            })
            .transpose()
    }
}
