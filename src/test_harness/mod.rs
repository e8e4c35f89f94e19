//! Anvil-based test harness for end-to-end deploy and transact flows.
//!
//! # Example
//!
//! ```ignore
//! #[tokio::test]
//! async fn test_deploy() {
//!     let harness = AnvilTestHarness::new().await.unwrap();
//!     let client = harness.client(0).unwrap();
//!     let deployment = client.deploy(&artifact, &["1"]).await.unwrap();
//! }
//! ```

use std::time::Duration;

use crate::ext::{Artifact, ClientConfig, ContractClient};
use alloy::{
    node_bindings::{Anvil, AnvilInstance},
    primitives::{Address, Bytes, U256},
    providers::{ext::AnvilApi, DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use anyhow::Result;

/// Creation code that deploys a contract whose runtime code is `STOP`.
/// Constructor arguments appended to it are ignored.
pub const STOP_CONTRACT_CODE: &str = "0x600060005360016000f3";

/// Creation code that deploys a contract whose runtime code always reverts.
pub const REVERTING_CONTRACT_CODE: &str = "0x6460006000fd6000526005601bf3";

// ============================================================================
// AnvilTestHarness
// ============================================================================

/// Spawns a local Anvil node and hands out clients for its funded accounts.
pub struct AnvilTestHarness {
    /// The Anvil instance
    instance: AnvilInstance,
    /// Read-only provider connected to Anvil
    provider: DynProvider,
    /// Keys of the pre-funded accounts
    keys: Vec<PrivateKeySigner>,
}

impl AnvilTestHarness {
    /// Create a new test harness with a fresh Anvil instance
    pub async fn new() -> Result<Self> {
        Self::with_config(|anvil| anvil).await
    }

    /// Create a new test harness with custom Anvil configuration
    pub async fn with_config<F>(config: F) -> Result<Self>
    where
        F: FnOnce(Anvil) -> Anvil,
    {
        let instance = config(Anvil::new()).try_spawn()?;
        let provider = ProviderBuilder::new()
            .connect_http(instance.endpoint().parse()?)
            .erased();
        let keys = instance.keys().iter().map(|k| k.clone().into()).collect();

        Ok(Self {
            instance,
            provider,
            keys,
        })
    }

    pub fn endpoint(&self) -> String {
        self.instance.endpoint()
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Get the first test account (Alice)
    pub fn alice(&self) -> Address {
        self.keys[0].address()
    }

    /// Get the second test account (Bob)
    pub fn bob(&self) -> Address {
        self.keys[1].address()
    }

    pub fn signer(&self, index: usize) -> &PrivateKeySigner {
        &self.keys[index]
    }

    /// Client signing with account `index`, short retry delay and receipt timeout.
    pub fn client(&self, index: usize) -> Result<ContractClient> {
        self.client_with_config(
            index,
            ClientConfig::default()
                .with_retry_delay(Duration::from_millis(50))
                .with_receipt_timeout(Duration::from_secs(10))
                .with_poll_interval(Duration::from_millis(100)),
        )
    }

    pub fn client_with_config(&self, index: usize, config: ClientConfig) -> Result<ContractClient> {
        ContractClient::connect(&self.endpoint(), self.keys[index].clone(), config)
    }

    // ========================================================================
    // Account State
    // ========================================================================

    /// Set the ETH balance for an account
    pub async fn set_balance(&self, address: Address, balance: U256) -> Result<()> {
        self.provider.anvil_set_balance(address, balance).await?;
        Ok(())
    }

    pub async fn get_nonce(&self, address: Address) -> Result<u64> {
        Ok(self.provider.get_transaction_count(address).await?)
    }

    pub async fn get_code(&self, address: Address) -> Result<Bytes> {
        Ok(self.provider.get_code_at(address).await?)
    }
}

/// Artifact with the given constructor inputs and creation code.
pub fn artifact(constructor_inputs: &[&str], bytecode: &str) -> Result<Artifact> {
    let inputs: Vec<_> = constructor_inputs
        .iter()
        .map(|ty| serde_json::json!({ "name": "", "type": ty }))
        .collect();
    let document = serde_json::json!({
        "abi": [
            {
                "type": "constructor",
                "inputs": inputs,
                "stateMutability": "nonpayable",
            },
            {
                "type": "function",
                "name": "store",
                "inputs": [
                    { "name": "value", "type": "uint256" },
                    { "name": "owners", "type": "address[]" },
                ],
                "outputs": [],
                "stateMutability": "nonpayable",
            },
        ],
        "bytecode": bytecode,
    });
    Ok(Artifact::from_json(&document.to_string())?)
}

// ============================================================================
// Tests
// ============================================================================
