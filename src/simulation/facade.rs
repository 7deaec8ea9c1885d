use wasm_bindgen::prelude::*;

use crate::core::random::Feeds;
use crate::domain::rules::{BoundaryType, GridValueType, IterationStrategy, TopplingRule};

use super::perf_stats::PerfStats;
use super::SandPileCore;

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// JS-facing sandpile. Rule, boundary and value kinds travel as `u8` codes
/// (see the `rule_*`, `boundary_*` and `value_*` exports).
#[wasm_bindgen]
pub struct SandPile {
    core: SandPileCore,
}

#[wasm_bindgen]
impl SandPile {
    /// Build with default feeds. Boundary code 0 keeps the rule's default.
    #[wasm_bindgen(constructor)]
    pub fn new(size: u32, rule: u8, boundary: u8) -> Result<SandPile, JsValue> {
        let rule = TopplingRule::try_from(rule).map_err(js_err)?;
        let boundary = BoundaryType::try_from(boundary).map_err(js_err)?;
        let core = SandPileCore::new(size, rule, boundary, &Feeds::default()).map_err(js_err)?;
        Ok(Self { core })
    }

    /// Build from a JSON run configuration (missing fields use defaults).
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(json: String) -> Result<SandPile, JsValue> {
        let core = SandPileCore::from_config_json(&json).map_err(js_err)?;
        Ok(Self { core })
    }

    #[wasm_bindgen(getter)]
    pub fn size(&self) -> u32 { self.core.size() }

    #[wasm_bindgen(getter)]
    pub fn rule(&self) -> u8 { self.core.rule() as u8 }

    #[wasm_bindgen(getter)]
    pub fn boundary(&self) -> u8 { self.core.boundary() as u8 }

    #[wasm_bindgen(getter)]
    pub fn drives(&self) -> f64 { self.core.drives() as f64 }

    /// Drop one grain; returns the row-major index it landed on.
    pub fn drive(&mut self) -> Result<u32, JsValue> {
        self.core.drive().map(|idx| idx as u32).map_err(js_err)
    }

    /// Avalanche size when `measure` is set, else 0.
    pub fn relax(&mut self, measure: bool) -> Result<f64, JsValue> {
        self.core.relax(measure).map(|n| n as f64).map_err(js_err)
    }

    /// `drive` + `relax` in one call.
    pub fn tick(&mut self, measure: bool) -> Result<f64, JsValue> {
        self.drive()?;
        self.relax(measure)
    }

    pub fn clear(&mut self) {
        self.core.clear();
    }

    pub fn populate(&mut self, cell_count: u32, particles: f64) -> Result<f64, JsValue> {
        self.core
            .populate(cell_count as usize, particles)
            .map_err(js_err)
    }

    // === Per-rule settings ===

    pub fn set_threshold(&mut self, threshold: f64) -> Result<(), JsValue> {
        self.core
            .toppling_mut()
            .and_then(|t| t.set_threshold(threshold))
            .map_err(js_err)
    }

    pub fn set_dissipative_mode(&mut self, mode: bool) -> Result<(), JsValue> {
        let t = self.core.toppling_mut().map_err(js_err)?;
        t.set_dissipative_mode(mode);
        Ok(())
    }

    pub fn set_dissipation_rate(&mut self, rate: f64) -> Result<(), JsValue> {
        let t = self.core.toppling_mut().map_err(js_err)?;
        t.set_dissipation_rate(rate);
        Ok(())
    }

    pub fn set_dissipation_amount(&mut self, amount: f64) -> Result<(), JsValue> {
        let t = self.core.toppling_mut().map_err(js_err)?;
        t.set_dissipation_amount(amount);
        Ok(())
    }

    pub fn set_dissipation_threshold(&mut self, threshold: f64) -> Result<(), JsValue> {
        let t = self.core.toppling_mut().map_err(js_err)?;
        t.set_dissipation_threshold(threshold);
        Ok(())
    }

    pub fn set_cell_capacity(&mut self, capacity: f64) -> Result<(), JsValue> {
        let t = self.core.toppling_mut().map_err(js_err)?;
        t.set_cell_capacity(capacity);
        Ok(())
    }

    /// Sweep strategy code (see the `strategy_*` exports).
    pub fn set_strategy(&mut self, strategy: u8) -> Result<(), JsValue> {
        let strategy = IterationStrategy::try_from(strategy).map_err(js_err)?;
        let t = self.core.toppling_mut().map_err(js_err)?;
        t.set_strategy(strategy);
        Ok(())
    }

    pub fn set_equal_split(&mut self, equal: bool) -> Result<(), JsValue> {
        let t = self.core.toppling_mut().map_err(js_err)?;
        t.set_equal_split(equal);
        Ok(())
    }

    /// Record grain totals around every relaxation pass.
    pub fn set_counter_during_avalanches(&mut self, count: bool) -> Result<(), JsValue> {
        let t = self.core.toppling_mut().map_err(js_err)?;
        t.set_counter_during_avalanches(count);
        Ok(())
    }

    pub fn set_diss_cell_capacity(&mut self, capacity: f64) -> Result<(), JsValue> {
        let t = self.core.diss_toppling_mut().map_err(js_err)?;
        t.set_cell_capacity(capacity);
        Ok(())
    }

    // === Snapshots ===

    /// Per-cell projection, L² values in row-major order.
    pub fn get_values(&self, kind: u8) -> Result<js_sys::Float32Array, JsValue> {
        let kind = GridValueType::try_from(kind).map_err(js_err)?;
        let n = self.core.size() as usize;
        let mut values = vec![0.0f32; n * n];
        self.core.get_values(&mut values, kind).map_err(js_err)?;
        Ok(js_sys::Float32Array::from(values.as_slice()))
    }

    pub fn get_value(&self, kind: u8) -> Result<f64, JsValue> {
        let kind = GridValueType::try_from(kind).map_err(js_err)?;
        self.core.get_value(kind).map(|v| v as f64).map_err(js_err)
    }

    /// Patch-summed heights, (L / patch)² values.
    pub fn coarsen(&self, patch: u32) -> Result<js_sys::Float32Array, JsValue> {
        if patch == 0 {
            return Err(JsValue::from_str("patch size must be positive"));
        }
        let side = (self.core.size() / patch) as usize;
        let mut values = vec![0.0f32; side * side];
        self.core.coarsen(&mut values, patch).map_err(js_err)?;
        Ok(js_sys::Float32Array::from(values.as_slice()))
    }

    /// Avalanche histogram as `{"size": count, ...}`.
    pub fn avalanches_json(&self) -> String {
        self.core.avalanches_json()
    }

    /// Grain-total histogram, `undefined` while the counter is off.
    pub fn grains_during_avalanches_json(&self) -> Option<String> {
        self.core.grains_during_avalanches().map(|c| c.to_json())
    }

    pub fn print(&self) -> String {
        self.core.print()
    }

    // === Perf ===

    /// Enable or disable per-relax perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Last relax perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.get_perf_stats()
    }
}

impl SandPile {
    /// The engine behind the JS handle.
    pub fn core(&self) -> &SandPileCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut SandPileCore {
        &mut self.core
    }
}
