use crewpass_core::engine::VoucherEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: VoucherEngine,
}
