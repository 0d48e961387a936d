// src/utils/segment_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;
use crate::extractors::segments::tokenize;
use crate::utils::error::StorageError;

/// Renders one line per segment: index, byte range, classification and text.
pub fn render_segment_dump(raw: &str) -> String {
    let mut dump = String::new();

    for (index, segment) in tokenize(raw).iter().enumerate() {
        dump.push_str(&format!(
            "{:>4} {:>6}..{:<6} {:<12} | {}\n",
            index,
            segment.start,
            segment.end,
            segment.kind.label(),
            segment.text
        ));
    }

    dump
}

/// Writes the segment dump for `raw` to `filename`, to see why a section was or wasn't recognised.
pub fn write_segment_dump<P: AsRef<Path>>(raw: &str, filename: P) -> Result<(), StorageError> {
    let path = filename.as_ref();
    let mut file = File::create(path)?;
    file.write_all(render_segment_dump(raw).as_bytes())?;

    tracing::info!("Saved segment dump to {}", path.display());
    Ok(())
}
