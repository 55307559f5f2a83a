use std::path::{Path, PathBuf};

use alloy::{
    network::{ReceiptResponse, TransactionBuilder},
    primitives::Address,
    providers::{DynProvider, Provider},
    rpc::types::TransactionRequest,
};
use redpacket_models::{DeploymentArtifact, HardhatArtifact};
use snafu::{ensure, ResultExt};
use tracing::info;

use crate::error::{classify_rpc_error, PendingTransactionSnafu};
use crate::Result;

/// Deploys the creation bytecode of a compiled contract from `from` and
/// returns the new contract's address.
pub async fn deploy_from_artifact(
    provider: &DynProvider,
    artifact: &HardhatArtifact,
    from: Address,
) -> Result<Address> {
    ensure!(!artifact.bytecode.is_empty(), crate::error::EmptyBytecodeSnafu);

    info!("Deploying {} from {from}", artifact.contract_name);
    let tx = TransactionRequest::default()
        .with_from(from)
        .with_deploy_code(artifact.bytecode.clone());

    let receipt = provider
        .send_transaction(tx)
        .await
        .map_err(|e| classify_rpc_error(e, None))?
        .get_receipt()
        .await
        .context(PendingTransactionSnafu)?;

    let tx_hash = receipt.transaction_hash;
    ensure!(
        receipt.status(),
        crate::error::RevertedSnafu {
            action: "deploy a contract",
            tx_hash
        }
    );
    let address = receipt
        .contract_address
        .ok_or(crate::Error::NoContractAddress { tx_hash })?;

    info!("{} deployed at {address}", artifact.contract_name);
    Ok(address)
}

/// Deploys `artifact` and writes `<out_dir>/<ContractName>.json` with the
/// deployed address and ABI.
pub async fn deploy_and_export(
    provider: &DynProvider,
    artifact: &HardhatArtifact,
    from: Address,
    out_dir: impl AsRef<Path>,
) -> Result<(DeploymentArtifact, PathBuf)> {
    let address = deploy_from_artifact(provider, artifact, from).await?;
    let exported = DeploymentArtifact {
        address,
        abi: artifact.abi.clone(),
    };
    let path = out_dir
        .as_ref()
        .join(format!("{}.json", artifact.contract_name));
    exported.save(&path)?;

    info!("Wrote deployment artifact to {}", path.display());
    Ok((exported, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        primitives::{address, Bytes},
        providers::ProviderBuilder,
        transports::mock::Asserter,
    };

    #[tokio::test]
    async fn test_empty_bytecode_is_rejected_before_sending() {
        let provider = ProviderBuilder::new()
            .connect_mocked_client(Asserter::new())
            .erased();
        let artifact = HardhatArtifact {
            contract_name: "Logger".to_string(),
            abi: vec![],
            bytecode: Bytes::new(),
        };

        let err = deploy_from_artifact(
            &provider,
            &artifact,
            address!("0x9146E804C874b4651C44685C95804A48b3F935f4"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, crate::Error::EmptyBytecode));
    }
}
