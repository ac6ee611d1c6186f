//! WASM bindings for book-mesher.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.
//! The host calls `setConfig` whenever the UI changes and `tick` once per
//! animation frame, then reads `renderListJson` to update its scene graph.

use crate::{BookConfigInput, BookScene, Mesher};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// A live book scene owned by the JS host.
#[wasm_bindgen]
pub struct BookSceneHandle {
    inner: BookScene,
}

#[wasm_bindgen]
impl BookSceneHandle {
    /// Create a scene from UI configuration JSON. Missing fields use defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<BookSceneHandle, JsError> {
        let input = match config_json {
            Some(json) => BookConfigInput::from_json(&json).map_err(js_error)?,
            None => BookConfigInput::default(),
        };
        let inner = BookScene::from_input(&input).map_err(js_error)?;
        Ok(BookSceneHandle { inner })
    }

    /// Apply new UI configuration. On error the scene keeps its previous state.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config_json: &str) -> Result<(), JsError> {
        let input = BookConfigInput::from_json(config_json).map_err(js_error)?;
        self.inner.apply_input(&input).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setExploded)]
    pub fn set_exploded(&mut self, exploded: bool) {
        self.inner.set_exploded(exploded);
    }

    /// Advance the springs by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.inner.tick(dt);
    }

    /// Whether every spring is at rest, so the host can stop requesting frames.
    #[wasm_bindgen(getter)]
    pub fn settled(&self) -> bool {
        self.inner.springs().is_settled()
    }

    /// Current render list as JSON.
    #[wasm_bindgen(js_name = renderListJson)]
    pub fn render_list_json(&self) -> Result<String, JsError> {
        self.inner.render_list().to_json().map_err(js_error)
    }

    /// Current frame as GLB bytes.
    #[wasm_bindgen(js_name = exportGlb)]
    pub fn export_glb(&self) -> Result<js_sys::Uint8Array, JsError> {
        let output = Mesher::new()
            .mesh(&self.inner.render_list())
            .map_err(js_error)?;
        let glb = crate::export_glb(&output).map_err(js_error)?;
        Ok(js_sys::Uint8Array::from(glb.as_slice()))
    }
}

/// Names of the built-in color presets.
#[wasm_bindgen(js_name = presetNames)]
pub fn preset_names() -> Vec<String> {
    crate::Preset::ALL.iter().map(|p| p.name().to_string()).collect()
}
