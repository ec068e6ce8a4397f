use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aircraft-id")]
#[command(about = "航空機画像データセット作成・検出結果後処理ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 台帳ワークブックの説明文を写真ファイル名に照合
    Match {
        /// 台帳ワークブック（.xlsx）
        #[arg(required = true)]
        workbook: PathBuf,

        /// シート名と同名の写真フォルダを含むディレクトリ
        #[arg(required = true)]
        photos_root: PathBuf,

        /// 対象シート（省略時は全シート）
        #[arg(short, long)]
        sheet: Vec<String>,

        /// 数字・英字の続きに一致した候補を除外（1984.26.8 と 1984.26.81 を区別）
        #[arg(long)]
        strict: bool,

        /// 照合結果のExcel出力先
        #[arg(long)]
        report: Option<PathBuf>,

        /// 照合結果のJSON出力先
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// 説明文に含まれる機種名・型式記号を抽出
    Identify {
        /// 台帳ワークブック（.xlsx）
        #[arg(required = true)]
        workbook: PathBuf,

        /// 機種一覧ワークブック（A列: 機種名, B列: 型式記号）
        #[arg(required = true)]
        reference: PathBuf,
    },

    /// 日付キーを照合候補に展開して表示
    Expand {
        /// 日付キー（例: 1984.19.47.a-s）
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// フォルダ内の画像をグレースケールに変換
    Grayscale {
        /// 画像フォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力フォルダ（省略時は入力フォルダ）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 画像をPNG/JPEGに再エンコード
    Convert {
        /// 入力フォルダ
        #[arg(required = true)]
        input: PathBuf,

        /// 出力フォルダ
        #[arg(required = true)]
        output: PathBuf,

        /// 出力形式 (png/jpeg)
        #[arg(short, long, default_value = "png")]
        format: OutputFormat,

        /// JPEG品質 (1-100)
        #[arg(short, long, default_value = "95", value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,
    },

    /// ファイル名をUUIDに変更
    Rename {
        /// 対象フォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// 対象拡張子
        #[arg(short, long, default_value = "png")]
        extension: String,
    },

    /// 検出結果JSONからYOLOラベルを生成
    StoreBoxes {
        /// 検出結果JSON
        #[arg(required = true)]
        results: PathBuf,

        /// 元画像フォルダ
        #[arg(required = true)]
        images: PathBuf,

        /// 出力フォルダ（画像と labels/ を出力）
        #[arg(required = true)]
        output: PathBuf,

        /// 残すクラス（インデックスまたは --config のクラス名、カンマ区切り）
        #[arg(short, long, value_delimiter = ',', default_value = "0")]
        classes: Vec<String>,

        /// 信頼度の閾値（省略時は設定値）
        #[arg(short, long)]
        threshold: Option<f64>,

        /// クラス名YAML（--classes にクラス名を使う場合）
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// バウンディングボックスCSVからYOLOラベルを生成
    CsvLabels {
        /// CSV（image_path,x1,y1,x2,y2,class_name）
        #[arg(required = true)]
        csv: PathBuf,

        /// ラベル出力フォルダ
        #[arg(required = true)]
        output: PathBuf,

        /// クラス名YAML
        #[arg(long, required = true)]
        config: PathBuf,
    },

    /// ラベルファイルのクラス列を書き換え
    Relabel {
        /// ラベルフォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// 全行のクラスをこのインデックスに置換
        #[arg(long, conflicts_with_all = ["config", "mapping"])]
        index: Option<usize>,

        /// クラス名→インデックスの対応をYAMLから取得
        #[arg(long, conflicts_with = "mapping")]
        config: Option<PathBuf>,

        /// クラス名→インデックスの対応（例: Aircraft=0,Jet=1）
        #[arg(long)]
        mapping: Option<String>,
    },

    /// 画像リストの画像を並列ダウンロード
    Download {
        /// 画像リスト（1行1件: split/imageid）
        #[arg(required = true)]
        image_list: PathBuf,

        /// 保存先フォルダ
        #[arg(short, long, default_value = ".")]
        download_folder: PathBuf,

        /// ワーカースレッド数（省略時は設定値）
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Open Imagesからクラスを絞り込んでデータセットを作成
    Prepare {
        /// クラス名（例: "Airplane" "Helicopter"）
        #[arg(required = true)]
        classes: Vec<String>,

        /// データセット出力先
        #[arg(long, default_value = "dataset")]
        dataset: PathBuf,

        /// アノテーションCSVの保存先
        #[arg(long, default_value = ".")]
        csv_dir: PathBuf,

        /// 対象split（カンマ区切り）
        #[arg(long, value_delimiter = ',', default_value = "train,validation,test")]
        splits: Vec<String>,

        /// 遮蔽フラグ (0/1/2=不問)
        #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(0..=2))]
        occluded: u8,

        /// 見切れフラグ (0/1/2=不問)
        #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(0..=2))]
        truncated: u8,

        /// 集合フラグ (0/1/2=不問)
        #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(0..=2))]
        group_of: u8,

        /// 描画物フラグ (0/1/2=不問)
        #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(0..=2))]
        depiction: u8,

        /// 屋内フラグ (0/1/2=不問)
        #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(0..=2))]
        inside: u8,

        /// 1クラスあたりの画像上限
        #[arg(long)]
        limit: Option<usize>,

        /// ワーカースレッド数（省略時は設定値）
        #[arg(short, long)]
        threads: Option<usize>,

        /// 不足しているアノテーションCSVを確認なしでダウンロード
        #[arg(long)]
        auto_download: bool,

        /// 既存のデータセットフォルダを確認なしで削除
        #[arg(short, long)]
        yes: bool,
    },

    /// クラスフォルダ構成のデータセットを train/val/test に分割
    Split {
        /// 入力フォルダ（クラスごとのサブフォルダ）
        #[arg(required = true)]
        input: PathBuf,

        /// 出力フォルダ
        #[arg(required = true)]
        output: PathBuf,

        /// 分割比率 train,val,test
        #[arg(long, value_delimiter = ',', default_value = "0.7,0.15,0.15")]
        ratio: Vec<f64>,

        /// シャッフルのシード
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// 検出結果JSONを集計
    Analyze {
        /// 検出結果JSON
        #[arg(required = true)]
        results: PathBuf,

        /// 集計結果の出力フォルダ
        #[arg(short, long, default_value = "analysis_results")]
        output: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// ダウンロードのスレッド数を設定
        #[arg(long)]
        set_threads: Option<usize>,

        /// 信頼度の閾値を設定
        #[arg(long)]
        set_threshold: Option<f64>,

        /// 画像バケットのURLを設定
        #[arg(long)]
        set_bucket_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            _ => Err(format!("Unknown format: {}. Use png or jpeg", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Png => write!(f, "PNG"),
            OutputFormat::Jpeg => write!(f, "JPEG"),
        }
    }
}
