//! `token.aleo` end to end against the in-process sandbox.
//!
//! Cases share one session and run in order, so later cases see the state
//! left behind by earlier ones.

mod common;

use std::sync::Arc;

use aleo_sandbox::{ensure_deployed, SetupFailure, Suite, Token};
use anyhow::{anyhow, ensure};

use common::{evaluate_session, Contracts};

#[tokio::test]
async fn token_suite() {
    let contracts = Contracts::new(evaluate_session().await);

    let report = Suite::new("token", contracts)
        .on_setup_failure(SetupFailure::ReturnError)
        .before_all(|ctx: Arc<Contracts>| async move {
            ensure_deployed(&[ctx.token.client()]).await
        })
        .case("mint public to admin", |ctx: Arc<Contracts>| async move {
            let admin = ctx.session.accounts()[0].address.clone();
            ctx.token.mint_public(&admin, 10).await?.wait().await?;
            let balance = ctx.token.account(&admin, 0).await?;
            ensure!(balance == 10, "expected balance 10, got {}", balance);
            Ok::<(), anyhow::Error>(())
        })
        .case("mint private to admin", |ctx: Arc<Contracts>| async move {
            let admin = ctx.session.accounts()[0].address.clone();
            let records = ctx.token.mint_private(&admin, 100_000).await?.records().await?;
            let raw = records.first().ok_or_else(|| anyhow!("mint_private returned no record"))?;
            let token = ctx.token.decode_token(raw).await?;
            ensure!(token.amount == 100_000, "expected 100000, got {}", token.amount);
            ensure!(token.owner == admin, "record owned by {}", token.owner);
            Ok::<(), anyhow::Error>(())
        })
        .case("transfer private returns change", |ctx: Arc<Contracts>| async move {
            let admin = ctx.session.accounts()[0].address.clone();
            let receiver = ctx.session.accounts()[2].address.clone();
            let records = ctx
                .token
                .mint_private(&admin, 1_000_000_000)
                .await?
                .records()
                .await?;
            let minted: Token = ctx
                .token
                .decode_token(records.first().ok_or_else(|| anyhow!("no minted record"))?)
                .await?;

            let records = ctx
                .token
                .transfer_private(&minted, &receiver, 100_000_000)
                .await?
                .records()
                .await?;
            ensure!(records.len() == 2, "expected change and transfer, got {}", records.len());
            let change = ctx.token.decode_token(&records[0]).await?;
            ensure!(change.amount == 900_000_000, "change was {}", change.amount);

            let receiver_key = ctx.session.signer(2)?.private_key.clone();
            let sent = ctx.token.decrypt_token(&records[1], &receiver_key).await?;
            ensure!(sent.amount == 100_000_000, "transferred {}", sent.amount);
            ensure!(sent.owner == receiver, "transfer owned by {}", sent.owner);
            Ok::<(), anyhow::Error>(())
        })
        .failing("spending a token twice", |ctx: Arc<Contracts>| async move {
            let admin = ctx.session.accounts()[0].address.clone();
            let other = ctx.session.accounts()[1].address.clone();
            let records = ctx.token.mint_private(&admin, 5).await?.records().await?;
            let minted = ctx.token.decode_token(&records[0]).await?;
            ctx.token.transfer_private(&minted, &other, 1).await?.wait().await?;
            ctx.token.transfer_private(&minted, &other, 1).await?.wait().await?;
            Ok::<(), anyhow::Error>(())
        })
        .failing("transfer more than the public balance", |ctx: Arc<Contracts>| async move {
            let signer = ctx.token.with_signer(3)?;
            let admin = ctx.session.accounts()[0].address.clone();
            signer.transfer_public(&admin, 1).await?.wait().await?;
            Ok::<(), anyhow::Error>(())
        })
        .run()
        .await
        .expect("setup should succeed");

    report.assert_passed();
    assert_eq!(report.passed(), 5);
}
