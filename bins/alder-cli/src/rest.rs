//! REST client for the node, its built-in wallet and the explorer backend.
//!
//! Amounts travel as decimal strings of smallest units. Every failure is
//! mapped to a [`ClientError`]; a refusal that mentions consolidation
//! becomes [`ClientError::ConsolidationRequired`] so the transfer builder
//! can fall back to a consolidation sweep.

use alder_core::address::{Address, AddressHash};
use alder_core::error::ClientError;
use alder_core::traits::NodeClient;
use alder_core::types::{
    ContractCallRequest, SentTx, SignAndSendRequest, SweepBuild, SweepTx, TransferRequest,
    UnsignedTx,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::Settings;

pub struct RestNodeClient {
    client: Client,
    node_host: String,
    explorer_host: String,
    wallet_name: String,
}

// ── Wire types ────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Destination<'a> {
    address: &'a str,
    amount: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildTransferBody<'a> {
    from_public_key: &'a str,
    destinations: Vec<Destination<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_price: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildSweepBody<'a> {
    from_public_key: &'a str,
    to_address: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteScriptBody<'a> {
    from_public_key: &'a str,
    bytecode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_price: Option<String>,
}

#[derive(Serialize)]
struct UnlockBody<'a> {
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuiltTxDto {
    tx_id: String,
    unsigned_tx: String,
    #[serde(default)]
    from_group: u32,
    #[serde(default)]
    to_group: u32,
    gas_amount: u64,
    gas_price: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SweepDto {
    unsigned_txs: Vec<BuiltTxDto>,
}

#[derive(Deserialize)]
struct SignatureDto {
    signature: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitDto {
    tx_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceDto {
    balance: String,
    #[serde(default)]
    locked_balance: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletAddressDto {
    public_key: String,
}

#[derive(Deserialize)]
struct ErrorDto {
    detail: String,
}

/// One entry of the explorer's address history.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTx {
    /// Transaction id.
    pub hash: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

fn units(raw: &str) -> Result<u128, ClientError> {
    raw.parse()
        .map_err(|_| ClientError::Malformed(format!("not an integer amount: {raw}")))
}

impl TryFrom<BuiltTxDto> for UnsignedTx {
    type Error = ClientError;

    fn try_from(dto: BuiltTxDto) -> Result<Self, Self::Error> {
        Ok(UnsignedTx {
            gas_price: units(&dto.gas_price)?,
            tx_id: dto.tx_id,
            unsigned_tx: dto.unsigned_tx,
            from_group: dto.from_group,
            to_group: dto.to_group,
            gas_amount: dto.gas_amount,
        })
    }
}

fn into_sweep(dto: SweepDto) -> Result<SweepBuild, ClientError> {
    let mut fees: u128 = 0;
    let mut unsigned_txs = Vec::with_capacity(dto.unsigned_txs.len());
    for tx in dto.unsigned_txs {
        let fee = (tx.gas_amount as u128)
            .checked_mul(units(&tx.gas_price)?)
            .and_then(|fee| fees.checked_add(fee))
            .ok_or_else(|| ClientError::Malformed("sweep fee overflow".into()))?;
        fees = fee;
        unsigned_txs.push(SweepTx {
            tx_id: tx.tx_id,
            unsigned_tx: tx.unsigned_tx,
        });
    }
    Ok(SweepBuild { unsigned_txs, fees })
}

/// Map a non-success response body to a [`ClientError`].
fn rejection(status: u16, body: &str) -> ClientError {
    let detail = serde_json::from_str::<ErrorDto>(body)
        .map(|e| e.detail)
        .unwrap_or_else(|_| body.trim().to_string());
    if detail.to_lowercase().contains("consolidat") {
        ClientError::ConsolidationRequired(detail)
    } else {
        ClientError::Rejected { status, detail }
    }
}

impl RestNodeClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            node_host: settings.node_host()?,
            explorer_host: settings.explorer_api_host()?,
            wallet_name: settings.wallet_name.clone(),
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status.as_u16(), &body));
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!(path, "POST");
        self.send(self.client.post(format!("{}{path}", self.node_host)).json(body))
            .await
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, ClientError> {
        debug!(%url, "GET");
        self.send(self.client.get(url)).await
    }

    /// Unlock the node wallet for signing.
    pub async fn unlock(&self, password: &Zeroizing<String>) -> Result<(), ClientError> {
        let body = UnlockBody {
            password: password.as_str(),
        };
        let url = format!("{}/wallets/{}/unlock", self.node_host, self.wallet_name);
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::Signing(rejection(status.as_u16(), &body).to_string()))
        }
    }

    /// Fetch balances and the public key of a wallet address.
    pub async fn fetch_address(&self, hash: &AddressHash) -> Result<Address> {
        let balance: BalanceDto = self
            .get(format!("{}/addresses/{hash}/balance", self.node_host))
            .await
            .with_context(|| format!("failed to fetch balance of {hash}"))?;
        let info: WalletAddressDto = self
            .get(format!(
                "{}/wallets/{}/addresses/{hash}",
                self.node_host, self.wallet_name
            ))
            .await
            .with_context(|| format!("{hash} is not an address of wallet {}", self.wallet_name))?;
        let locked = match balance.locked_balance.as_deref() {
            Some(raw) => units(raw)?,
            None => 0,
        };
        Ok(Address::new(hash.clone(), info.public_key, units(&balance.balance)?, locked)?)
    }

    /// Latest transactions of `hash` according to the explorer.
    pub async fn history(&self, hash: &AddressHash, page: u32) -> Result<Vec<ExplorerTx>, ClientError> {
        self.get(format!(
            "{}/addresses/{hash}/transactions?page={page}",
            self.explorer_host
        ))
        .await
    }
}

#[async_trait]
impl NodeClient for RestNodeClient {
    async fn build_sweep_transactions(
        &self,
        from: &Address,
        to: &AddressHash,
    ) -> Result<SweepBuild, ClientError> {
        let body = BuildSweepBody {
            from_public_key: &from.public_key,
            to_address: to.as_str(),
        };
        let dto: SweepDto = self.post("/transactions/sweep-address/build", &body).await?;
        into_sweep(dto)
    }

    async fn create_transaction(&self, request: &TransferRequest) -> Result<UnsignedTx, ClientError> {
        let body = BuildTransferBody {
            from_public_key: &request.from_public_key,
            destinations: vec![Destination {
                address: request.to.as_str(),
                amount: request.amount.to_string(),
            }],
            gas_amount: request.gas_amount,
            gas_price: request.gas_price.map(|p| p.to_string()),
        };
        let dto: BuiltTxDto = self.post("/transactions/build", &body).await?;
        dto.try_into()
    }

    async fn build_contract_call(
        &self,
        request: &ContractCallRequest,
    ) -> Result<UnsignedTx, ClientError> {
        let body = ExecuteScriptBody {
            from_public_key: &request.from_public_key,
            bytecode: &request.bytecode,
            amount: request.amount.map(|a| a.to_string()),
            gas_amount: request.gas_amount,
            gas_price: request.gas_price.map(|p| p.to_string()),
        };
        let dto: BuiltTxDto = self.post("/contracts/unsigned-tx/execute-script", &body).await?;
        dto.try_into()
    }

    async fn sign_and_send_transaction(
        &self,
        request: &SignAndSendRequest,
    ) -> Result<SentTx, ClientError> {
        let activate = serde_json::json!({ "address": request.from.as_str() });
        let _: serde_json::Value = self
            .post(
                &format!("/wallets/{}/change-active-address", self.wallet_name),
                &activate,
            )
            .await
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        let sign = serde_json::json!({ "data": request.tx_id });
        let signed: SignatureDto = self
            .post(&format!("/wallets/{}/sign", self.wallet_name), &sign)
            .await
            .map_err(|e| ClientError::Signing(e.to_string()))?;
        let signature = signed.signature;

        let submit = serde_json::json!({
            "unsignedTx": request.unsigned_tx,
            "signature": signature,
        });
        let submitted: SubmitDto = self.post("/transactions/submit", &submit).await?;
        Ok(SentTx {
            tx_id: submitted.tx_id,
            signature,
        })
    }
}
