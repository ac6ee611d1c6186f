//! # Book Mesher
//!
//! A Rust library for generating a customizable 3D book model.
//!
//! ## Overview
//!
//! This library takes a book configuration (colors, cover overhang, page count,
//! open or closed presentation) and produces an ordered list of primitive shapes
//! with placements and materials. Cover parts of the closed book animate between
//! their assembled and exploded positions on damped springs. The per-frame render
//! list can be handed to any renderer, or tessellated and exported as GLB/OBJ.
//!
//! ## Quick Start
//!
//! ```ignore
//! use book_mesher::{BookConfig, BookScene, Mesher, export_glb};
//!
//! let mut scene = BookScene::new(BookConfig::default());
//!
//! // Each displayed frame
//! scene.tick(1.0 / 60.0);
//! let frame = scene.render_list();
//!
//! // Toggle the exploded view; springs pick it up on the next tick
//! scene.set_exploded(true);
//!
//! // Or bake the current frame to a file
//! let output = Mesher::new().mesh(&frame)?;
//! let glb_bytes = export_glb(&output)?;
//! ```
//!
//! ## UI Integration
//!
//! Hosts that speak JSON can send the raw configuration and let the library
//! validate it:
//!
//! ```ignore
//! use book_mesher::{BookConfigInput, BookScene};
//!
//! let input = BookConfigInput::from_json(r#"{ "preset": "rustic", "viewVariant": "open" }"#)?;
//! scene.apply_input(&input)?;
//! ```

pub mod animation;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod mesher;
pub mod scene;
pub mod types;

// Re-export main types for convenience
pub use animation::{SpringConfig, SpringState, SpringTransitionEngine};
pub use config::{BookConfig, BookConfigInput, ComponentId, Palette, Preset, ViewVariant, YapSize};
pub use error::{BookError, ConfigurationError, Result};
pub use export::gltf::export_glb;
pub use export::obj::{export_obj, ObjExport};
pub use layout::{
    ComponentDescriptor, JitterSource, LayoutEngine, Material, NoJitter, PartId, SeededJitter,
    Shape,
};
pub use mesher::{Mesh, MeshBatch, Mesher, MesherConfig, MesherOutput, Vertex};
pub use scene::{assemble, BookScene, PositionSource, RenderItem, RenderList};
pub use types::{BoundingBox, Rgb, Transform};

/// Lay out, assemble and export a configuration in one call.
/// Springs start at rest, so exploded configurations export fully exploded.
pub fn export_book_glb(config: &BookConfig) -> Result<Vec<u8>> {
    let scene = BookScene::new(*config);
    let output = Mesher::new().mesh(&scene.render_list())?;
    export_glb(&output)
}

#[cfg(feature = "wasm")]
pub mod wasm;
