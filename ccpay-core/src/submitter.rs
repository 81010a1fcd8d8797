//! Builds and broadcasts the payment transfer for an order.

use std::sync::Arc;

use ccpay_sdk::config::ChainConfig;
use ccpay_sdk::objects::{Coin, PaymentOrder, ValidationError, validate_base_amount};
use tracing::{info, warn};

use crate::error::CheckoutError;
use crate::signing::{Fee, SigningLibraryLoader};
use crate::wallet::OfflineSigner;

/// Memo attached to every payment so the backend can correlate on-chain
/// transfers with orders.
pub fn payment_memo(order_id: &str) -> String {
    format!("order:{order_id}")
}

/// Sends order payments through the lazily loaded signing library.
#[derive(Debug, Clone)]
pub struct TransactionSubmitter {
    loader: Arc<SigningLibraryLoader>,
}

impl TransactionSubmitter {
    pub fn new(loader: Arc<SigningLibraryLoader>) -> Self {
        Self { loader }
    }

    /// Pay `order` in full from the signer's first account and return the
    /// transaction hash.
    ///
    /// Every call broadcasts a new transaction. Callers must not retry
    /// without the user's confirmation or the order gets paid twice.
    pub async fn submit_payment(
        &self,
        signer: Arc<dyn OfflineSigner>,
        order: &PaymentOrder,
        chain: &ChainConfig,
    ) -> Result<String, CheckoutError> {
        let accounts = signer.accounts().await?;
        let sender = accounts
            .first()
            .map(|account| account.address.clone())
            .ok_or(CheckoutError::NoAccount)?;

        let library = self.loader.load().await?;

        let gas_price = chain.parsed_gas_price()?;
        let rpc_endpoint = chain.rpc_url()?;
        if order.recipient_address.is_empty() {
            return Err(ValidationError::EmptyField("recipient_address").into());
        }
        let amount = [Coin::new(
            validate_base_amount(&order.amount_base)?,
            chain.denom.as_str(),
        )];
        let memo = payment_memo(&order.order_id);

        let client = library
            .connect_with_signer(&rpc_endpoint, signer, gas_price)
            .await?;

        info!(
            order_id = %order.order_id,
            sender = %sender,
            recipient = %order.recipient_address,
            amount = %order.amount_base,
            denom = %chain.denom,
            "Broadcasting payment"
        );
        let result = client
            .send_tokens(&sender, &order.recipient_address, &amount, Fee::Auto, &memo)
            .await?;

        if result.code != 0 {
            warn!(
                order_id = %order.order_id,
                code = result.code,
                raw_log = %result.raw_log,
                "Payment rejected on chain"
            );
            return Err(CheckoutError::TransactionFailed {
                code: result.code,
                raw_log: result.raw_log,
            });
        }

        info!(order_id = %order.order_id, tx_hash = %result.transaction_hash, height = result.height, "Payment broadcast");
        Ok(result.transaction_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{BroadcastResult, SigningClient, SigningError, SigningLibrary};
    use crate::wallet::{AccountData, WalletError};
    use async_trait::async_trait;
    use ccpay_sdk::objects::{GasPrice, OrderStatus};
    use std::sync::Mutex;
    use url::Url;

    #[derive(Debug, Clone, PartialEq)]
    struct Sent {
        rpc: String,
        gas_price: String,
        sender: String,
        recipient: String,
        amount: Vec<Coin>,
        fee: Fee,
        memo: String,
    }

    struct Recorder {
        code: u32,
        sent: Mutex<Vec<Sent>>,
    }

    struct RecordingClient {
        recorder: Arc<Recorder>,
        rpc: String,
        gas_price: String,
    }

    #[async_trait]
    impl SigningClient for RecordingClient {
        async fn send_tokens(
            &self,
            sender: &str,
            recipient: &str,
            amount: &[Coin],
            fee: Fee,
            memo: &str,
        ) -> Result<BroadcastResult, SigningError> {
            self.recorder.sent.lock().unwrap().push(Sent {
                rpc: self.rpc.clone(),
                gas_price: self.gas_price.clone(),
                sender: sender.to_string(),
                recipient: recipient.to_string(),
                amount: amount.to_vec(),
                fee,
                memo: memo.to_string(),
            });
            Ok(BroadcastResult {
                code: self.recorder.code,
                raw_log: if self.recorder.code == 0 {
                    String::new()
                } else {
                    "out of gas".to_string()
                },
                transaction_hash: "ABC123".to_string(),
                height: 42,
            })
        }
    }

    #[async_trait]
    impl SigningLibrary for Arc<Recorder> {
        async fn connect_with_signer(
            &self,
            rpc_endpoint: &Url,
            _signer: Arc<dyn OfflineSigner>,
            gas_price: GasPrice,
        ) -> Result<Box<dyn SigningClient>, SigningError> {
            Ok(Box::new(RecordingClient {
                recorder: self.clone(),
                rpc: rpc_endpoint.to_string(),
                gas_price: gas_price.to_string(),
            }))
        }
    }

    struct Signer(Vec<&'static str>);

    #[async_trait]
    impl OfflineSigner for Signer {
        async fn accounts(&self) -> Result<Vec<AccountData>, WalletError> {
            Ok(self
                .0
                .iter()
                .map(|address| AccountData {
                    address: address.to_string(),
                    algo: "secp256k1".to_string(),
                    pubkey: vec![2; 33],
                })
                .collect())
        }

        async fn sign(&self, _: &str, _: &[u8]) -> Result<Vec<u8>, WalletError> {
            Ok(vec![0; 64])
        }
    }

    fn order() -> PaymentOrder {
        PaymentOrder {
            order_id: "ord_1".to_string(),
            recipient_address: "dora1recipient".to_string(),
            amount_base: "500000000000000000".to_string(),
            denom: "peaka".to_string(),
            status: OrderStatus::Created,
            expires_at: None,
            tx_hash: None,
            paid_at: None,
            credit_issued: None,
            price_snapshot: None,
        }
    }

    fn submitter(code: u32) -> (TransactionSubmitter, Arc<Recorder>) {
        let recorder = Arc::new(Recorder {
            code,
            sent: Mutex::new(vec![]),
        });
        let loader = SigningLibraryLoader::preloaded(Arc::new(recorder.clone()));
        (TransactionSubmitter::new(Arc::new(loader)), recorder)
    }

    #[tokio::test]
    async fn test_submit_builds_single_coin_transfer() {
        let (submitter, recorder) = submitter(0);
        let signer = Arc::new(Signer(vec!["dora1sender", "dora1other"]));

        let tx_hash = submitter
            .submit_payment(signer, &order(), &ChainConfig::default())
            .await
            .unwrap();

        assert_eq!(tx_hash, "ABC123");
        let sent = recorder.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![Sent {
                rpc: "https://vota-testnet-rpc.dorafactory.org/".to_string(),
                gas_price: "0.025peaka".to_string(),
                sender: "dora1sender".to_string(),
                recipient: "dora1recipient".to_string(),
                amount: vec![Coin::new("500000000000000000", "peaka")],
                fee: Fee::Auto,
                memo: "order:ord_1".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_nonzero_code_is_failure() {
        let (submitter, _) = submitter(11);
        let signer = Arc::new(Signer(vec!["dora1sender"]));

        let err = submitter
            .submit_payment(signer, &order(), &ChainConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::TransactionFailed { code: 11, ref raw_log } if raw_log == "out of gas"
        ));
    }

    #[tokio::test]
    async fn test_signer_without_accounts() {
        let (submitter, recorder) = submitter(0);

        let err = submitter
            .submit_payment(Arc::new(Signer(vec![])), &order(), &ChainConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::NoAccount));
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_amount_is_not_broadcast() {
        let (submitter, recorder) = submitter(0);
        let mut order = order();
        order.amount_base = "0.5".to_string();

        let err = submitter
            .submit_payment(Arc::new(Signer(vec!["dora1sender"])), &order, &ChainConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Validation(ValidationError::InvalidBaseAmount(_))));
        assert!(recorder.sent.lock().unwrap().is_empty());
    }
}
