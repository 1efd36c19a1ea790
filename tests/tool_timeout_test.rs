//! 片段逾時只限制擷取
//!
//! 以 shell script 模擬 ffmpeg / ffprobe：場景偵測比片段逾時還慢，
//! 偵測結果仍須被採用；擷取超過逾時則被終止。

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use scene_splitter::component::scene_splitter::{
    MediaToolkit, PipelineConfig, ScenePipeline, TimeInterval,
};
use scene_splitter::config::ClipEncodingSettings;
use scene_splitter::error::{ExtractionError, ToolError};
use scene_splitter::tools::AvailableTools;
use tempfile::TempDir;

const CLIP_TIMEOUT: Duration = Duration::from_millis(300);

/// 寫入 script 與執行其他 script 不可同時進行，避免 ETXTBSY
static SCRIPT_LOCK: Mutex<()> = Mutex::new(());

/// 長度 60 秒，偵測 1 秒後回報 20、40 秒的變換點
const FAKE_FFPROBE: &str = r#"#!/bin/sh
case "$*" in
    *-version*) exit 0 ;;
    *format=duration*) echo 60.000000 ;;
    *)
        sleep 1
        echo '{"frames":[{"pts_time":"20.000000"},{"pts_time":"40.000000"}]}'
        ;;
esac
"#;

/// 將最後一個參數（輸出檔）寫入內容
const FAST_FFMPEG: &str = r#"#!/bin/sh
case "$*" in
    *-version*) exit 0 ;;
esac
for last; do :; done
echo clip > "$last"
"#;

const SLOW_FFMPEG: &str = r#"#!/bin/sh
case "$*" in
    *-version*) exit 0 ;;
esac
exec sleep 5
"#;

fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn fake_tools(dir: &Path, ffmpeg_script: &str) -> AvailableTools {
    let ffprobe = write_script(dir, "ffprobe", FAKE_FFPROBE);
    let ffmpeg = write_script(dir, "ffmpeg", ffmpeg_script);
    AvailableTools::check_programs(ffmpeg.to_str().unwrap(), ffprobe.to_str().unwrap()).unwrap()
}

fn pipeline_config(media_dir: &Path) -> PipelineConfig {
    PipelineConfig {
        min_segment_seconds: 5.0,
        scene_threshold: 0.4,
        media_dir: media_dir.to_path_buf(),
        workers: Some(2),
        clip_timeout: Some(CLIP_TIMEOUT),
    }
}

fn source_video(dir: &Path) -> PathBuf {
    let path = dir.join("long.mp4");
    fs::write(&path, b"video").unwrap();
    path
}

#[test]
fn test_slow_detection_is_not_cut_by_clip_timeout() {
    let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let tools = fake_tools(dir.path(), FAST_FFMPEG);
    let source = source_video(dir.path());
    let media_dir = dir.path().join("media");
    fs::create_dir_all(&media_dir).unwrap();

    let shutdown = Arc::new(AtomicBool::new(false));
    let config = pipeline_config(&media_dir);
    let toolkit = MediaToolkit::ffmpeg(
        &tools,
        &shutdown,
        config.clip_timeout,
        &ClipEncodingSettings::default(),
    );

    let report = ScenePipeline::new(&toolkit, &config, Arc::clone(&shutdown))
        .run(&[source])
        .unwrap();

    let file = report.files[0].outcome.as_ref().unwrap();
    assert!(!file.detection_failed);
    assert_eq!(file.boundaries_detected, 2);

    let intervals: Vec<TimeInterval> = file.segments.iter().map(|s| s.segment.interval).collect();
    assert_eq!(
        intervals,
        vec![
            TimeInterval { start: 0.0, end: 20.0 },
            TimeInterval { start: 20.0, end: 40.0 },
            TimeInterval { start: 40.0, end: 60.0 },
        ]
    );
    assert_eq!(report.clips().count(), 3);
    assert!(media_dir.join("long_scene_003.mp4").exists());
}

#[test]
fn test_slow_extraction_times_out() {
    let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let tools = fake_tools(dir.path(), SLOW_FFMPEG);
    let source = source_video(dir.path());
    let media_dir = dir.path().join("media");
    fs::create_dir_all(&media_dir).unwrap();

    let shutdown = Arc::new(AtomicBool::new(false));
    let toolkit = MediaToolkit::ffmpeg(
        &tools,
        &shutdown,
        Some(CLIP_TIMEOUT),
        &ClipEncodingSettings::default(),
    );

    let output = media_dir.join("long_scene_001.mp4");
    let started = Instant::now();
    let err = toolkit
        .extractor
        .extract(&source, TimeInterval { start: 0.0, end: 20.0 }, &output)
        .unwrap_err();

    assert!(matches!(
        err,
        ExtractionError::Tool {
            source: ToolError::TimedOut { .. },
            ..
        }
    ));
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(!output.exists());
}
