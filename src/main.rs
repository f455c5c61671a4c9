use std::net::SocketAddr;
use WhisperTranscribeServer::{
    config::Config, create_app, handlers::AppState, whisper::WhisperEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ログの初期化
    env_logger::init();

    println!("WhisperTranscribeServer を起動中...");

    // 設定ファイルの読み込みと検証
    let config = Config::load_or_create_default("config.toml")?;
    config.validate()?;

    println!("設定ファイルを読み込みました");
    println!("サーバーアドレス: {}", config.server_address());
    println!("Whisperモデル: {}", config.whisper.model_path);

    // Whisperエンジンの初期化
    // モデルのロードに失敗した場合はサーバーを起動せずに終了する
    let engine = match WhisperEngine::new(&config.whisper.model_path, &config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Whisperエンジンの初期化に失敗しました: {}", e);
            return Err(e);
        }
    };
    println!("Whisperエンジンを初期化しました");

    // ルーターの構築
    let app_state = AppState::new(config.clone()).with_engine(engine);
    let app = create_app(app_state);

    // サーバーアドレスの解析
    let addr: SocketAddr = config
        .server_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("無効なサーバーアドレス: {}", e))?;

    println!("サーバーを起動します: http://{}", addr);
    println!("API エンドポイント:");
    println!("  GET  /health - ヘルスチェック");
    println!("  POST /transcribe - 文字起こし（ボディは音声バイト列）");
    println!();
    println!("使用例:");
    println!("  curl --data-binary @audio.wav http://{}/transcribe", addr);

    // サーバーの起動
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("サーバーの起動に失敗: {}", e))?;

    Ok(())
}
