use super::models::ClipDescriptor;
use crate::component::project::{MediaFile, MediaType, Project, Scene};
use std::path::Path;
use uuid::Uuid;

/// 專案內片段目錄名稱，`MediaFile::url` 以此為前綴
pub const MEDIA_DIR_NAME: &str = "media";

const SCENE_DESCRIPTION: &str = "Automatically detected video segment";

/// 依片段順序建立場景，標題為 `Scene 1`, `Scene 2`, ...
#[must_use]
pub fn assemble_project(title: &str, clips: &[ClipDescriptor]) -> Project {
    let mut project = Project::new(title);
    project.scenes = clips
        .iter()
        .enumerate()
        .map(|(i, clip)| scene_from_clip(i + 1, clip))
        .collect();
    project.touch();
    project
}

/// `number` 從 1 開始
#[must_use]
pub fn scene_from_clip(number: usize, clip: &ClipDescriptor) -> Scene {
    let file_name = file_name_of(&clip.output_path);

    let mut scene = Scene::new(format!("scene-{}", Uuid::new_v4()), format!("Scene {number}"));
    scene.description = SCENE_DESCRIPTION.to_string();
    scene.audio_duration = Some(clip.duration_seconds);
    scene.add_media(MediaFile {
        url: format!("{MEDIA_DIR_NAME}/{file_name}"),
        file_name: file_name.clone(),
        media_type: MediaType::Video,
        original_name: Some(file_name),
    });
    scene
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
