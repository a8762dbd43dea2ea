//! `token.aleo`.

use super::{address_input, u64_input};
use crate::client::ProgramClient;
use crate::session::Session;
use crate::transaction::TransactionHandle;
use aleo_sandbox_types::{Address, Plaintext, PrivateKey, ProgramId, RawRecord, RecordPlaintext};
use anyhow::Result;

pub const TOKEN_PROGRAM: &str = "token.aleo";

/// A decoded `token` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub owner: Address,
    pub amount: u64,
    pub nonce: String,
    pub version: Option<u8>,
    record: RecordPlaintext,
}

impl Token {
    /// Read the `token` members of a plaintext record.
    pub fn from_plaintext(record: RecordPlaintext) -> Result<Self> {
        let amount = record.get_u64("amount")?;
        Ok(Self {
            owner: record.owner().clone(),
            amount,
            nonce: record.nonce().to_string(),
            version: record.version(),
            record,
        })
    }

    /// Parse a plaintext record string (evaluate-mode outputs).
    pub fn parse(raw: &RawRecord) -> Result<Self> {
        Self::from_plaintext(raw.as_str().parse()?)
    }

    /// The full record, as passed back into a transition.
    pub fn record(&self) -> &RecordPlaintext {
        &self.record
    }
}

/// Client for `token.aleo` and programs with the same interface.
#[derive(Debug, Clone)]
pub struct TokenContract {
    client: ProgramClient,
}

impl TokenContract {
    pub fn new(session: &Session) -> Self {
        Self::from_client(session.client(&ProgramId::from_static(TOKEN_PROGRAM)))
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

    pub async fn mint_public(&self, receiver: &Address, amount: u64) -> Result<TransactionHandle> {
        self.client
            .call("mint_public", &[address_input(receiver), u64_input(amount)])
            .await
    }

    /// Outputs: `[token]`.
    pub async fn mint_private(&self, receiver: &Address, amount: u64) -> Result<TransactionHandle> {
        self.client
            .call("mint_private", &[address_input(receiver), u64_input(amount)])
            .await
    }

    pub async fn transfer_public(&self, receiver: &Address, amount: u64) -> Result<TransactionHandle> {
        self.client
            .call("transfer_public", &[address_input(receiver), u64_input(amount)])
            .await
    }

    /// Outputs: `[change, transferred]`.
    pub async fn transfer_private(
        &self,
        sender: &Token,
        receiver: &Address,
        amount: u64,
    ) -> Result<TransactionHandle> {
        self.client
            .call(
                "transfer_private",
                &[sender.record().clone().into(), address_input(receiver), u64_input(amount)],
            )
            .await
    }

    /// Outputs: `[change]`.
    pub async fn transfer_private_to_public(
        &self,
        sender: &Token,
        receiver: &Address,
        amount: u64,
    ) -> Result<TransactionHandle> {
        self.client
            .call(
                "transfer_private_to_public",
                &[sender.record().clone().into(), address_input(receiver), u64_input(amount)],
            )
            .await
    }

    /// Outputs: `[token]`.
    pub async fn transfer_public_to_private(
        &self,
        receiver: &Address,
        amount: u64,
    ) -> Result<TransactionHandle> {
        self.client
            .call(
                "transfer_public_to_private",
                &[address_input(receiver), u64_input(amount)],
            )
            .await
    }

    /// Public balance of `owner`, or `default` if it has none.
    pub async fn account(&self, owner: &Address, default: u64) -> Result<u64> {
        self.client
            .mapping_u64_or("account", &Plaintext::address(owner), default)
            .await
    }

    /// Decode a `token` record owned by `owner`, parsing or decrypting per mode.
    pub async fn decrypt_token(&self, raw: &RawRecord, owner: &PrivateKey) -> Result<Token> {
        Token::from_plaintext(self.client.decode_as(raw, owner).await?)
    }

    /// Decode a `token` record owned by the signer.
    pub async fn decode_token(&self, raw: &RawRecord) -> Result<Token> {
        Token::from_plaintext(self.client.decode(raw).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn first_record(records: &[RawRecord]) -> Result<&RawRecord> {
        records
            .first()
            .ok_or_else(|| anyhow!("Transaction returned no records"))
    }

    #[tokio::test]
    async fn test_public_to_private_round_trip() {
        let session = Session::evaluate().await.unwrap();
        let token = TokenContract::new(&session);
        token.deploy().await.unwrap().wait().await.unwrap();
        let me = session.accounts()[0].address.clone();

        token.mint_public(&me, 50).await.unwrap().wait().await.unwrap();
        let records = token
            .transfer_public_to_private(&me, 20)
            .await
            .unwrap()
            .records()
            .await
            .unwrap();
        let private = token.decode_token(first_record(&records).unwrap()).await.unwrap();
        assert_eq!(private.amount, 20);
        assert_eq!(private.version, Some(1));
        assert_eq!(token.account(&me, 0).await.unwrap(), 30);

        let receiver = session.accounts()[1].address.clone();
        let records = token
            .transfer_private_to_public(&private, &receiver, 5)
            .await
            .unwrap()
            .records()
            .await
            .unwrap();
        let change = token.decode_token(&records[0]).await.unwrap();
        assert_eq!(change.amount, 15);
        assert_eq!(token.account(&receiver, 0).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_spent_token_is_refused() {
        let session = Session::evaluate().await.unwrap();
        let token = TokenContract::new(&session);
        token.deploy().await.unwrap().wait().await.unwrap();
        let me = session.accounts()[0].address.clone();
        let other = session.accounts()[1].address.clone();

        let records = token.mint_private(&me, 10).await.unwrap().records().await.unwrap();
        let minted = Token::parse(&records[0]).unwrap();
        token
            .transfer_private(&minted, &other, 4)
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        let err = token.transfer_private(&minted, &other, 4).await.unwrap_err();
        assert!(format!("{:#}", err).contains("already spent"));
    }
}
