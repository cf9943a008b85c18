/// Blocks between the target block and the first block an attestation may land in.
pub const MIN_ATTESTATION_WINDOW: u64 = 11;

/// Default factor applied to fee estimates when setting resource bounds.
pub const FEE_ESTIMATION_MULTIPLIER: f64 = 1.5;

pub const SN_MAIN: &str = "SN_MAIN";
pub const SN_SEPOLIA: &str = "SN_SEPOLIA";

/// STRK token, same address on every public network.
pub const STRK_CONTRACT_ADDRESS: &str =
    "0x04718f5a0fc34cc1af16a1cdee98ffb20c31f5cd61d6ab07201858f4287c938d";

pub mod mainnet {
    pub const STAKING_CONTRACT: &str =
        "0x00ca1702e64c81d9a07b86bd2c540188d92a2c73cf5cc0e508d949015e7e84a7";
    pub const ATTEST_CONTRACT: &str =
        "0x010398fe631af9ab2311840432d507bf7ef4b959ae967f1507928f5afe888a99";
}

pub mod sepolia {
    pub const STAKING_CONTRACT: &str =
        "0x03745ab04a431fc02871a139be6b93d9260b0ff3e779ad9c8b377183b23109f1";
    pub const ATTEST_CONTRACT: &str =
        "0x03f32e152b9637c31bfcf73e434f78591067a01ba070505ff6ee195642c9acfb";
}
