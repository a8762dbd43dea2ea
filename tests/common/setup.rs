//! High-level test setup helpers.

use aleo_sandbox::logging::init_test_tracing;
use aleo_sandbox::{HandlerV1Contract, Session, TokenContract, TokenV1Contract};

/// A fresh in-memory sandbox session with test tracing installed.
#[allow(dead_code)]
pub async fn evaluate_session() -> Session {
    init_test_tracing();
    Session::evaluate()
        .await
        .expect("sandbox session should start")
}

/// Clients for the bundled programs, all on one session.
#[allow(dead_code)]
pub struct Contracts {
    pub session: Session,
    pub token: TokenContract,
    pub token_v1: TokenV1Contract,
    pub handler: HandlerV1Contract,
}

#[allow(dead_code)]
impl Contracts {
    pub fn new(session: Session) -> Self {
        Self {
            token: TokenContract::new(&session),
            token_v1: TokenV1Contract::new(&session),
            handler: HandlerV1Contract::new(&session),
            session,
        }
    }
}
