//! `token_v1.aleo`: the token interface with supply tracking. Only
//! `handler_v1.aleo` may call `mint_public`.

use super::token::TokenContract;
use crate::client::ProgramClient;
use crate::session::Session;
use aleo_sandbox_types::{Plaintext, ProgramId};
use anyhow::Result;
use std::ops::Deref;

pub const TOKEN_V1_PROGRAM: &str = "token_v1.aleo";

#[derive(Debug, Clone)]
pub struct TokenV1Contract {
    inner: TokenContract,
}

impl TokenV1Contract {
    pub fn new(session: &Session) -> Self {
        Self::from_client(session.client(&ProgramId::from_static(TOKEN_V1_PROGRAM)))
    }

    pub fn from_client(client: ProgramClient) -> Self {
        Self {
            inner: TokenContract::from_client(client),
        }
    }

    pub fn with_signer(&self, index: usize) -> Result<Self> {
        Ok(Self {
            inner: self.inner.with_signer(index)?,
        })
    }

    /// Total minted so far, or `default` before the first mint.
    pub async fn supply(&self, default: u64) -> Result<u64> {
        self.client()
            .mapping_u64_or("supply", &Plaintext::u8(0), default)
            .await
    }
}

impl Deref for TokenV1Contract {
    type Target = TokenContract;

    fn deref(&self) -> &TokenContract {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_direct_mint_public_is_rejected_and_supply_counts_private_mints() {
        let session = Session::evaluate().await.unwrap();
        let token = TokenV1Contract::new(&session);
        token.deploy().await.unwrap().wait().await.unwrap();
        let me = session.accounts()[0].address.clone();

        let rejected = token.mint_public(&me, 10).await.unwrap().wait().await.unwrap_err();
        assert!(rejected.is_rejected());
        assert_eq!(token.account(&me, 0).await.unwrap(), 0);
        assert_eq!(token.supply(0).await.unwrap(), 0);

        token.mint_private(&me, 25).await.unwrap().wait().await.unwrap();
        assert_eq!(token.supply(0).await.unwrap(), 25);
    }
}
