use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 朗讀速度預估使用的每分鐘字數
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 180;

/// 播放速度 1-10，5 為原速
pub const DEFAULT_SPEED: u8 = 5;

/// 目前時間，ISO 8601（UTC，毫秒）
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `M:SS`，超過一小時為 `H:MM:SS`
#[must_use]
pub fn format_duration_from_seconds(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{}:{secs:02}", seconds / 60)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub file_name: String,
    /// 相對於專案目錄的路徑
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub original_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceSettings {
    pub voice: String,
    pub gender: String,
    pub narrator_description: String,
    pub steerability: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice: "alloy".to_string(),
            gender: "female".to_string(),
            narrator_description:
                "Act as a warm female narrator, soft and supportive, slower pace".to_string(),
            steerability: "warm, calm".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectSettings {
    pub voice_settings: VoiceSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub narrator_description: String,
    #[serde(default)]
    pub media: Vec<MediaFile>,
    #[serde(default)]
    pub audio_url: Option<String>,
    /// 秒
    #[serde(default)]
    pub audio_duration: Option<u64>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default = "default_speed")]
    pub speed: u8,
    #[serde(default)]
    pub recommended_speed: Option<u8>,
}

const fn default_speed() -> u8 {
    DEFAULT_SPEED
}

impl Scene {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: String::new(),
            description: String::new(),
            narrator_description: String::new(),
            media: Vec::new(),
            audio_url: None,
            audio_duration: None,
            is_completed: false,
            speed: DEFAULT_SPEED,
            recommended_speed: None,
        }
    }

    /// 依字數估算朗讀秒數
    #[must_use]
    pub fn text_duration(&self, words_per_minute: u32) -> u64 {
        if words_per_minute == 0 {
            return 0;
        }

        let words = self.text.split_whitespace().count();
        let seconds = words as f64 / f64::from(words_per_minute) * 60.0;
        seconds.round() as u64
    }

    /// 有實際音訊長度時以其為準，否則依字數估算
    #[must_use]
    pub fn duration(&self, words_per_minute: u32) -> u64 {
        self.audio_duration
            .unwrap_or_else(|| self.text_duration(words_per_minute))
    }

    /// `M:SS`
    #[must_use]
    pub fn format_duration(&self) -> String {
        let seconds = self.duration(DEFAULT_WORDS_PER_MINUTE);
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }

    pub fn add_media(&mut self, media: MediaFile) {
        self.media.push(media);
    }

    /// 依檔名移除，有移除任何項目時回傳 true
    pub fn remove_media(&mut self, file_name: &str) -> bool {
        let before = self.media.len();
        self.media.retain(|m| m.file_name != file_name);
        self.media.len() < before
    }

    #[must_use]
    pub fn image_count(&self) -> usize {
        self.count_media(MediaType::Image)
    }

    #[must_use]
    pub fn video_count(&self) -> usize {
        self.count_media(MediaType::Video)
    }

    fn count_media(&self, media_type: MediaType) -> usize {
        self.media
            .iter()
            .filter(|m| m.media_type == media_type)
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionStats {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub settings: ProjectSettings,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    pub created_at: String,
    pub updated_at: String,
}

impl Project {
    /// 建立空專案，id 為 `project-<毫秒時間戳>`
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

        Self {
            id: format!("project-{}", now.timestamp_millis()),
            title: title.into(),
            settings: ProjectSettings::default(),
            scenes: Vec::new(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }

    /// `index` 為 `None` 或超出範圍時加在最後
    pub fn add_scene(&mut self, scene: Scene, index: Option<usize>) {
        match index {
            Some(i) if i < self.scenes.len() => self.scenes.insert(i, scene),
            _ => self.scenes.push(scene),
        }
        self.touch();
    }

    pub fn remove_scene(&mut self, scene_id: &str) -> bool {
        let before = self.scenes.len();
        self.scenes.retain(|s| s.id != scene_id);

        let removed = self.scenes.len() < before;
        if removed {
            self.touch();
        }
        removed
    }

    #[must_use]
    pub fn scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == scene_id)
    }

    pub fn scene_mut(&mut self, scene_id: &str) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.id == scene_id)
    }

    /// 移動場景到新位置，位置未改變或找不到場景時回傳 false
    pub fn move_scene(&mut self, scene_id: &str, new_index: usize) -> bool {
        let Some(current) = self.scenes.iter().position(|s| s.id == scene_id) else {
            return false;
        };
        if current == new_index {
            return false;
        }

        let scene = self.scenes.remove(current);
        let target = new_index.min(self.scenes.len());
        self.scenes.insert(target, scene);
        self.touch();
        true
    }

    #[must_use]
    pub fn total_duration(&self, words_per_minute: u32) -> u64 {
        self.scenes
            .iter()
            .map(|s| s.duration(words_per_minute))
            .sum()
    }

    #[must_use]
    pub fn format_total_duration(&self) -> String {
        format_duration_from_seconds(self.total_duration(DEFAULT_WORDS_PER_MINUTE))
    }

    #[must_use]
    pub fn completion_stats(&self) -> CompletionStats {
        let total = self.scenes.len();
        let completed = self.scenes.iter().filter(|s| s.is_completed).count();
        let percentage = if total == 0 {
            0
        } else {
            (completed as f64 / total as f64 * 100.0).round() as u32
        };

        CompletionStats {
            completed,
            total,
            percentage,
        }
    }

    /// 沒有任何場景的專案不算完成
    #[must_use]
    pub fn is_completed(&self) -> bool {
        !self.scenes.is_empty() && self.scenes.iter().all(|s| s.is_completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with(id: &str, audio: Option<u64>, completed: bool) -> Scene {
        let mut scene = Scene::new(id, id);
        scene.audio_duration = audio;
        scene.is_completed = completed;
        scene
    }

    fn video(name: &str) -> MediaFile {
        MediaFile {
            file_name: name.to_string(),
            url: format!("media/{name}"),
            media_type: MediaType::Video,
            original_name: Some(name.to_string()),
        }
    }

    #[test]
    fn test_format_duration_from_seconds() {
        assert_eq!(format_duration_from_seconds(0), "0:00");
        assert_eq!(format_duration_from_seconds(65), "1:05");
        assert_eq!(format_duration_from_seconds(3599), "59:59");
        assert_eq!(format_duration_from_seconds(3600), "1:00:00");
        assert_eq!(format_duration_from_seconds(3725), "1:02:05");
    }

    #[test]
    fn test_text_duration() {
        let mut scene = Scene::new("s", "s");
        assert_eq!(scene.text_duration(DEFAULT_WORDS_PER_MINUTE), 0);

        scene.text = "word ".repeat(90);
        assert_eq!(scene.text_duration(DEFAULT_WORDS_PER_MINUTE), 30);
        assert_eq!(scene.duration(DEFAULT_WORDS_PER_MINUTE), 30);

        scene.audio_duration = Some(12);
        assert_eq!(scene.duration(DEFAULT_WORDS_PER_MINUTE), 12);
        assert_eq!(scene.format_duration(), "0:12");
    }

    #[test]
    fn test_media_helpers() {
        let mut scene = Scene::new("s", "s");
        scene.add_media(video("a.mp4"));
        scene.add_media(MediaFile {
            media_type: MediaType::Image,
            ..video("b.png")
        });

        assert_eq!(scene.video_count(), 1);
        assert_eq!(scene.image_count(), 1);
        assert!(scene.remove_media("a.mp4"));
        assert!(!scene.remove_media("a.mp4"));
        assert_eq!(scene.video_count(), 0);
    }

    #[test]
    fn test_project_scene_management() {
        let mut project = Project::new("demo");
        assert!(project.id.starts_with("project-"));

        project.add_scene(scene_with("a", Some(10), false), None);
        project.add_scene(scene_with("b", Some(20), false), None);
        project.add_scene(scene_with("c", Some(30), false), Some(0));

        let order: Vec<&str> = project.scenes.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);

        assert!(project.move_scene("c", 2));
        assert!(!project.move_scene("c", 2));
        assert!(!project.move_scene("missing", 0));
        let order: Vec<&str> = project.scenes.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);

        assert!(project.move_scene("a", 99));
        assert_eq!(project.scenes.last().map(|s| s.id.as_str()), Some("a"));

        assert!(project.remove_scene("b"));
        assert!(!project.remove_scene("b"));
        assert!(project.scene("b").is_none());
        assert_eq!(project.total_duration(DEFAULT_WORDS_PER_MINUTE), 40);
    }

    #[test]
    fn test_format_total_duration() {
        let mut project = Project::new("long");
        project.add_scene(scene_with("a", Some(3000), false), None);
        assert_eq!(project.format_total_duration(), "50:00");

        project.add_scene(scene_with("b", Some(725), false), None);
        assert_eq!(project.format_total_duration(), "1:02:05");
    }

    #[test]
    fn test_completion_stats() {
        let mut project = Project::new("p");
        assert!(!project.is_completed());
        assert_eq!(project.completion_stats().percentage, 0);

        project.add_scene(scene_with("a", None, true), None);
        project.add_scene(scene_with("b", None, false), None);
        project.add_scene(scene_with("c", None, false), None);

        let stats = project.completion_stats();
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.percentage, 33);
        assert!(!project.is_completed());

        for scene in &mut project.scenes {
            scene.is_completed = true;
        }
        assert!(project.is_completed());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let json = r#"{
            "id": "project-1",
            "title": "old",
            "scenes": [{"id": "scene-1", "title": "Scene 1", "media": [
                {"fileName": "a.mp4", "url": "media/a.mp4", "type": "video"}
            ]}],
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }"#;

        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.settings, ProjectSettings::default());
        assert_eq!(project.scenes[0].speed, DEFAULT_SPEED);
        assert_eq!(project.scenes[0].narrator_description, "");
        assert_eq!(project.scenes[0].media[0].original_name, None);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut scene = Scene::new("scene-1", "Scene 1");
        scene.add_media(video("a.mp4"));
        scene.audio_duration = Some(7);

        let value = serde_json::to_value(&scene).unwrap();
        assert_eq!(value["audioDuration"], 7);
        assert_eq!(value["isCompleted"], false);
        assert!(value["audioUrl"].is_null());
        assert_eq!(value["media"][0]["type"], "video");
        assert_eq!(value["media"][0]["fileName"], "a.mp4");
    }
}
