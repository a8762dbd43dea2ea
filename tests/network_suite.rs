//! Execute-mode run against a live devnet.
//!
//! Needs a node at the configured endpoint, `snarkos` on `PATH`, the programs
//! built with `leo build`, and funded accounts in `.env`. Run with:
//!
//! ```text
//! RUN_NETWORK_TESTS=1 cargo test --test network_suite -- --ignored
//! ```

mod common;

use std::sync::Arc;
use std::time::Duration;

use aleo_sandbox::logging::init_test_tracing;
use aleo_sandbox::{ensure_deployed, ExecutionMode, SetupFailure, Session, Suite};
use anyhow::{anyhow, ensure};

use common::Contracts;

#[tokio::test]
#[ignore = "requires a snarkOS devnet and the snarkos binary"]
async fn token_against_devnet() {
    skip_if_no_network!();
    init_test_tracing();

    let session = Session::from_env().await.expect("config should load");
    if session.mode() != ExecutionMode::Execute {
        eprintln!("Skipping: ALEO_MODE selects {}", session.mode());
        return;
    }

    let report = Suite::new("token (devnet)", Contracts::new(session))
        .on_setup_failure(SetupFailure::ReturnError)
        .timeout(Duration::from_secs(600))
        .before_all(|ctx: Arc<Contracts>| async move {
            ensure_deployed(&[ctx.token.client()]).await
        })
        .case("mint public", |ctx: Arc<Contracts>| async move {
            let admin = ctx.session.accounts()[0].address.clone();
            let before = ctx.token.account(&admin, 0).await?;
            ctx.token.mint_public(&admin, 10).await?.wait().await?;
            let after = ctx.token.account(&admin, 0).await?;
            ensure!(after == before + 10, "balance went from {} to {}", before, after);
            Ok::<(), anyhow::Error>(())
        })
        .case("mint private and decrypt", |ctx: Arc<Contracts>| async move {
            let admin = ctx.session.accounts()[0].address.clone();
            let records = ctx.token.mint_private(&admin, 100_000).await?.records().await?;
            let raw = records.first().ok_or_else(|| anyhow!("mint_private returned no record"))?;
            ensure!(raw.is_ciphertext(), "network records should be ciphertexts");
            let token = ctx.token.decode_token(raw).await?;
            ensure!(token.amount == 100_000, "decrypted amount {}", token.amount);
            Ok::<(), anyhow::Error>(())
        })
        .run()
        .await
        .expect("deployment should succeed");

    report.assert_passed();
}
