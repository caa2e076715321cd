use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::Result;
use crate::store::{Collection, ContentStore, RuleChanges, ServerRules, Updates};

/// Writes the collection as its deployable JSON file into `dir`.
pub fn export_collection<C: Collection>(store: &ContentStore<C>, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(C::EXPORT_FILE_NAME);
    std::fs::write(&path, store.export_json()?)?;
    tracing::info!("Exported {} {} to {}", store.len(), C::NAME, path.display());
    Ok(path)
}

fn add_entry<C: Collection, W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    store: &ContentStore<C>,
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(C::RESOURCE_PATH, options)?;
    zip.write_all(store.export_json()?.as_bytes())?;
    Ok(())
}

/// Zip of all three collections laid out as the site's `data/` directory.
pub fn export_bundle(
    path: &Path,
    updates: &ContentStore<Updates>,
    rule_changes: &ContentStore<RuleChanges>,
    rules: &ContentStore<ServerRules>,
) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    add_entry(&mut zip, updates, options)?;
    add_entry(&mut zip, rule_changes, options)?;
    add_entry(&mut zip, rules, options)?;
    zip.finish()?;

    tracing::info!("Wrote content bundle to {}", path.display());
    Ok(path.to_path_buf())
}
