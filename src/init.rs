use env_logger::Env;

/// 初始化日誌系統
///
/// 預設等級為 `info`，可用 `RUST_LOG` 覆寫；`verbose` 時本 crate 提升到 `debug`
pub fn init(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_module("scene_splitter", log::LevelFilter::Debug);
    }
    builder.format_timestamp_millis();

    // 測試或重複呼叫時 logger 可能已經存在
    let _ = builder.try_init();
}
