use std::path::PathBuf;

use xrshim_harness::build::LayerBuild;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    let root = manifest_dir.join("../..");
    LayerBuild::new(
        root.join("registry/openxr_core.json"),
        root.join("layer_apis.json"),
        "minimal",
    )
    .with_namespace("demo")
    .run()?;
    Ok(())
}
