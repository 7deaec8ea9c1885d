use wasm_bindgen::prelude::*;

/// Snapshot of the last `relax` call. All zeros while metrics are disabled.
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub(super) relax_ms: f64,
    pub(super) diss_relax_ms: f64,
    pub(super) avalanche_size: u32,
    pub(super) diss_events: u32,
    pub(super) passes: u32,
    pub(super) diss_passes: u32,
    pub(super) drives: u32,
    pub(super) grid_size: u32,
    pub(super) grain_count: f64,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn relax_ms(&self) -> f64 { self.relax_ms }
    #[wasm_bindgen(getter)]
    pub fn diss_relax_ms(&self) -> f64 { self.diss_relax_ms }
    #[wasm_bindgen(getter)]
    pub fn avalanche_size(&self) -> u32 { self.avalanche_size }
    #[wasm_bindgen(getter)]
    pub fn diss_events(&self) -> u32 { self.diss_events }
    #[wasm_bindgen(getter)]
    pub fn passes(&self) -> u32 { self.passes }
    #[wasm_bindgen(getter)]
    pub fn diss_passes(&self) -> u32 { self.diss_passes }
    #[wasm_bindgen(getter)]
    pub fn drives(&self) -> u32 { self.drives }
    #[wasm_bindgen(getter)]
    pub fn grid_size(&self) -> u32 { self.grid_size }
    #[wasm_bindgen(getter)]
    pub fn grain_count(&self) -> f64 { self.grain_count }
}
