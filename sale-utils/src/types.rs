use concordium_cis2::{TokenAmountU64, TokenIdUnit};

pub type ContractTokenId = TokenIdUnit;
pub type ContractTokenAmount = TokenAmountU64;
pub type MicroCcd = u64;

pub type AllowedPercentage = u8;
