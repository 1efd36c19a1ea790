use crate::config::FileTypeTable;
use crate::tools::validate_path_exists;
use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 展開輸入路徑
///
/// 檔案直接保留（依輸入順序）；資料夾則遞迴找出影片檔並依路徑排序後接在原位置。
/// 任何不存在的路徑都視為錯誤。
pub fn expand_input_paths(
    inputs: &[PathBuf],
    file_type_table: &FileTypeTable,
) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::with_capacity(inputs.len());

    for input in inputs {
        validate_path_exists(input)?;

        if input.is_dir() {
            let videos = scan_video_files(input, file_type_table);
            if videos.is_empty() {
                warn!("資料夾內沒有影片檔案: {}", input.display());
            }
            expanded.extend(videos);
        } else {
            expanded.push(input.clone());
        }
    }

    debug!("展開後共 {} 個輸入檔案", expanded.len());
    Ok(expanded)
}

pub fn scan_video_files(directory: &Path, file_type_table: &FileTypeTable) -> Vec<PathBuf> {
    let mut video_files: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| file_type_table.is_video_file(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    video_files.sort();
    video_files
}
