use thiserror::Error;

#[derive(Error, Debug)]
pub enum AircraftIdError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("ワークブック読み込みエラー: {0}")]
    Workbook(String),

    #[error("レポート生成エラー: {0}")]
    ReportGeneration(String),

    #[error("ダウンロードエラー: {0}")]
    Download(String),

    #[error("画像リストの{line}行目が不正です: \"{content}\"")]
    InvalidImageList { line: usize, content: String },

    #[error("不明なクラス名: {0}")]
    UnknownClass(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Common(#[from] aircraft_id_common::Error),
}

impl From<calamine::Error> for AircraftIdError {
    fn from(e: calamine::Error) -> Self {
        AircraftIdError::Workbook(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AircraftIdError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        AircraftIdError::ReportGeneration(e.to_string())
    }
}

impl From<image::ImageError> for AircraftIdError {
    fn from(e: image::ImageError) -> Self {
        AircraftIdError::ImageLoad(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AircraftIdError>;
