//! Contract client: deployment and method calls from text arguments.
//!
//! ```text
//! ContractClient
//! ├── deploy:            artifact → constructor types → decode → encode
//! │                      → bytecode ‖ args → submit → receipt → address
//! ├── transact:          signature → descriptor → decode → encode → submit
//! └── transact_with_abi: interface document → function → decode → encode → submit
//!
//! submit: SubmissionRetrier(send_transaction) → wait for receipt (timeout)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let signer = parse_signer(key_hex)?;
//! let client = ContractClient::connect(rpc_url, signer, ClientConfig::default())?;
//!
//! let deployment = client.deploy(&Artifact::from_json(&json)?, &["Token", "TKN", "1000", "18"]).await?;
//! client.transact(deployment.address, "transfer(address,uint256)", &[to, "10"]).await?;
//! ```

use std::{str::FromStr, sync::Arc, time::Duration};

use alloy::{
    dyn_abi::JsonAbiExt,
    json_abi::JsonAbi,
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
};
use anyhow::{bail, Context};
use tokio_util::sync::CancellationToken;

use crate::ext::{
    encode_arguments, parse_types, Artifact, FunctionDescriptor, Sleeper, SubmissionRetrier,
    DEFAULT_RETRY_DELAY,
};

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for submission and receipt handling.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Delay between attempts after a transient node error (default: 1 second)
    pub retry_delay: Duration,
    /// Maximum time to wait for a receipt (default: wait indefinitely)
    pub receipt_timeout: Option<Duration>,
    /// Receipt polling interval (default: provider's own)
    pub poll_interval: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            receipt_timeout: None,
            poll_interval: None,
        }
    }
}

impl ClientConfig {
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = Some(timeout);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }
}

/// Build a signer from private key hex, `0x` prefix optional.
pub fn parse_signer(key_hex: &str) -> anyhow::Result<PrivateKeySigner> {
    PrivateKeySigner::from_str(key_hex.trim()).context("invalid private key")
}

// ============================================================================
// Results
// ============================================================================

/// A mined contract creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

// ============================================================================
// ContractClient
// ============================================================================

/// Signs, submits and confirms contract transactions for one signer.
#[derive(Clone)]
pub struct ContractClient {
    provider: DynProvider,
    signer: Address,
    config: ClientConfig,
    retrier: SubmissionRetrier,
}

impl ContractClient {
    /// Connect to an HTTP endpoint with `signer` as the sending account.
    pub fn connect(
        rpc_url: &str,
        signer: PrivateKeySigner,
        config: ClientConfig,
    ) -> anyhow::Result<Self> {
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url.parse()?);
        if let Some(interval) = config.poll_interval {
            provider.client().set_poll_interval(interval);
        }

        tracing::debug!(%address, rpc_url, "connected contract client");
        Ok(Self::with_provider(provider.erased(), address, config))
    }

    /// Wrap a provider that can already sign for `signer`.
    pub fn with_provider(provider: DynProvider, signer: Address, config: ClientConfig) -> Self {
        let retrier = SubmissionRetrier::new(signer).with_delay(config.retry_delay);
        Self {
            provider,
            signer,
            config,
            retrier,
        }
    }

    /// Stop retrying once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.retrier = self.retrier.with_cancellation(cancel);
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.retrier = self.retrier.with_sleeper(sleeper);
        self
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Deploy `artifact`, passing `args` to its constructor.
    pub async fn deploy<S: AsRef<str>>(
        &self,
        artifact: &Artifact,
        args: &[S],
    ) -> anyhow::Result<Deployment> {
        let constructor = artifact.constructor_interface()?;
        let encoded = constructor.encode_args(args)?;

        let mut code = artifact.bytecode()?;
        code.extend_from_slice(&encoded);

        tracing::info!(
            signer = %self.signer,
            code_len = code.len(),
            args = args.len(),
            "deploying contract"
        );
        let receipt = self
            .submit(TransactionRequest::default().with_deploy_code(code))
            .await?;

        let address = receipt
            .contract_address
            .context("deployment receipt has no contract address")?;
        tracing::info!(%address, tx_hash = %receipt.transaction_hash, "contract deployed");

        Ok(Deployment {
            address,
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }

    /// Call a method given by a bare `name(type,...)` signature.
    pub async fn transact<S: AsRef<str>>(
        &self,
        address: Address,
        signature: &str,
        args: &[S],
    ) -> anyhow::Result<TxHash> {
        let descriptor = FunctionDescriptor::from_signature(signature)?;
        if descriptor.is_constructor() {
            bail!("signature '{signature}' has no method name");
        }

        let input = descriptor.encode_args(args)?;
        self.call(address, descriptor.signature(), input).await
    }

    /// Call `method` as declared in a full interface document.
    ///
    /// With overloads, the one whose arity matches `args` is used.
    pub async fn transact_with_abi<S: AsRef<str>>(
        &self,
        address: Address,
        abi: &JsonAbi,
        method: &str,
        args: &[S],
    ) -> anyhow::Result<TxHash> {
        let overloads = abi
            .function(method)
            .with_context(|| format!("method '{method}' not found in interface"))?;
        let function = overloads
            .iter()
            .find(|f| f.inputs.len() == args.len())
            .or_else(|| overloads.first())
            .with_context(|| format!("method '{method}' not found in interface"))?;

        let types = parse_types(function.inputs.iter().map(|p| p.selector_type()))?;
        let values = encode_arguments(&types, args)?;
        let input = function.abi_encode_input(&values)?;

        self.call(address, function.signature(), input).await
    }

    async fn call(
        &self,
        address: Address,
        signature: String,
        input: Vec<u8>,
    ) -> anyhow::Result<TxHash> {
        tracing::info!(signer = %self.signer, %address, %signature, "sending transaction");
        let tx = TransactionRequest::default()
            .with_to(address)
            .with_input(input);

        let receipt = self.submit(tx).await?;
        Ok(receipt.transaction_hash)
    }

    /// Send through the retrier and wait for a successful receipt.
    async fn submit(&self, tx: TransactionRequest) -> anyhow::Result<TransactionReceipt> {
        let tx = tx.with_from(self.signer);

        let pending = self
            .retrier
            .submit(|| {
                let tx = tx.clone();
                async move { self.provider.send_transaction(tx).await }
            })
            .await?;

        let tx_hash = *pending.tx_hash();
        tracing::debug!(signer = %self.signer, %tx_hash, "transaction sent, waiting for receipt");

        let receipt = pending
            .with_timeout(self.config.receipt_timeout)
            .get_receipt()
            .await
            .with_context(|| format!("failed to get receipt for {tx_hash}"))?;

        if !receipt.status() {
            tracing::warn!(signer = %self.signer, %tx_hash, "transaction reverted");
            bail!("transaction {tx_hash} reverted");
        }
        Ok(receipt)
    }
}
