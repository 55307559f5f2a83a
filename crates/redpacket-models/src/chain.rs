use serde::Serialize;

/// A network the client knows how to describe to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub id: u64,
    pub name: &'static str,
    pub explorer_url: &'static str,
}

pub const MAINNET: ChainInfo = ChainInfo {
    id: 1,
    name: "Ethereum",
    explorer_url: "https://etherscan.io",
};

pub const SEPOLIA: ChainInfo = ChainInfo {
    id: 11_155_111,
    name: "Sepolia",
    explorer_url: "https://sepolia.etherscan.io",
};

pub const SUPPORTED_CHAINS: [ChainInfo; 2] = [MAINNET, SEPOLIA];

impl ChainInfo {
    #[must_use]
    pub fn by_id(id: u64) -> Option<ChainInfo> {
        SUPPORTED_CHAINS.iter().copied().find(|chain| chain.id == id)
    }

    #[must_use]
    pub fn explorer_address_url(&self, address: &str) -> String {
        format!("{}/address/{address}", self.explorer_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_explorer_link() {
        let sepolia = ChainInfo::by_id(11_155_111).unwrap();
        assert_eq!(sepolia.name, "Sepolia");
        assert_eq!(
            sepolia.explorer_address_url("0xabc"),
            "https://sepolia.etherscan.io/address/0xabc"
        );
        assert!(ChainInfo::by_id(31337).is_none());
    }
}
