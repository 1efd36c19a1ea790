pub mod load;
pub mod save;
pub mod types;

pub use types::{
    ClipEncodingSettings, Config, FileTypeTable, Language, MAX_RECENT_PATHS,
    SceneSplitterSettings, UserSettings,
};
