use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use readalign::annotation::AnnotationTask;

/// Writes `<out_dir>/<case id>.json` per task and returns the number written.
pub fn write_tasks(out_dir: &Path, tasks: &[(String, AnnotationTask)]) -> Result<usize, String> {
    fs::create_dir_all(out_dir).map_err(|err| {
        format!(
            "Failed to create task output directory '{}': {err}",
            out_dir.display()
        )
    })?;

    for (id, task) in tasks {
        let path = out_dir.join(format!("{}.json", file_stem_for(id)));
        let file = File::create(&path)
            .map_err(|err| format!("Failed to create task file '{}': {err}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, task).map_err(|err| {
            format!("Failed to serialize task '{}': {err}", path.display())
        })?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|err| format!("Failed to finalize task file '{}': {err}", path.display()))?;
    }
    Ok(tasks.len())
}

// Case ids may contain path separators.
fn file_stem_for(id: &str) -> String {
    id.chars()
        .map(|ch| if ch == '/' || ch == '\\' { '_' } else { ch })
        .collect()
}
