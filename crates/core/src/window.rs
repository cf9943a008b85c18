use attestor_types::{AttestInfo, BlockNumber};

/// Where a block falls relative to the attestation window of its epoch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WindowPhase {
    /// The block is the target block itself.
    TargetReached,
    /// Between the target block and the block before the window opens.
    Prepare,
    /// Inside the window, the attestation must be sent.
    Attest,
    /// The last block of the window.
    EndOfWindow,
}

/// Classifies `number` against `attest`. Blocks outside
/// `[target_block, window_end]` have no phase.
///
/// `window_start - 1` already belongs to [`WindowPhase::Attest`]: the
/// transaction sent there lands in `window_start` at the earliest.
pub fn classify(number: BlockNumber, attest: &AttestInfo) -> Option<WindowPhase> {
    let attest_from = attest.window_start - 1;

    if number == attest.target_block {
        Some(WindowPhase::TargetReached)
    } else if number > attest.target_block && number < attest_from {
        Some(WindowPhase::Prepare)
    } else if number >= attest_from && number < attest.window_end {
        Some(WindowPhase::Attest)
    } else if number == attest.window_end {
        Some(WindowPhase::EndOfWindow)
    } else {
        None
    }
}
