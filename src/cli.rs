use clap::{Parser, Subcommand};
use progress_common::Corridor;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "progress-dashboard")]
#[command(about = "駅別ユーティリティ移設工事の進捗ダッシュボード・日報PDF生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 駅一覧（設定済みの駅とデータフォルダ内のワークブック）
    Stations,

    /// 回廊・区間別の作業内訳
    Breakdown {
        /// 駅名（省略時は対話選択）
        #[arg(short, long)]
        station: Option<String>,

        /// 回廊 (East/West)。省略時はデータの先頭
        #[arg(short, long)]
        corridor: Option<Corridor>,

        /// 区間名または All。省略時は先頭の選択肢
        #[arg(long)]
        section: Option<String>,

        /// 絞り込み結果をExcelに出力
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },

    /// 進捗グラフをSVGで出力
    Plot {
        #[arg(short, long)]
        station: Option<String>,

        /// 出力フォルダ（デフォルト: 設定の出力フォルダ）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// S字カーブの実績打ち切り日 (YYYY-MM-DD)
        #[arg(long)]
        cutoff: Option<String>,
    },

    /// 全駅の進捗比較グラフ
    Overview {
        /// 駅別進捗のワークブック
        #[arg(required = true)]
        workbook: PathBuf,

        /// シート名（デフォルト: 先頭シート）
        #[arg(long)]
        sheet: Option<String>,

        /// 出力SVGファイル
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 工事写真ギャラリーをHTMLで出力
    Gallery {
        #[arg(short, long)]
        station: Option<String>,

        /// 画像フォルダ（デフォルト: 設定の画像フォルダ）
        #[arg(long)]
        image_dir: Option<PathBuf>,

        /// 出力HTMLファイル
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 課題ログ（パスコードが必要）
    Issues {
        #[arg(short, long)]
        station: Option<String>,

        /// パスコード（省略時は対話入力）
        #[arg(long)]
        passcode: Option<String>,

        /// CSVに出力
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// 現場巡回日報PDFを生成
    Report {
        /// 日報の入力内容（JSON）
        #[arg(long, required = true)]
        input: PathBuf,

        /// 添付写真（最大4枚）
        #[arg(long = "image")]
        images: Vec<PathBuf>,

        /// 出力フォルダ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定管理
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// データフォルダを設定
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// 課題ログのパスコードを設定
        #[arg(long)]
        set_passcode: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_breakdown() {
        let cli = Cli::try_parse_from([
            "progress-dashboard",
            "-v",
            "breakdown",
            "-s",
            "Badda",
            "-c",
            "west",
            "--section",
            "All",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Breakdown {
                station,
                corridor,
                section,
                xlsx,
            } => {
                assert_eq!(station.as_deref(), Some("Badda"));
                assert_eq!(corridor, Some(Corridor::West));
                assert_eq!(section.as_deref(), Some("All"));
                assert!(xlsx.is_none());
            }
            _ => panic!("expected breakdown"),
        }
    }

    #[test]
    fn test_parse_report_images() {
        let cli = Cli::try_parse_from([
            "progress-dashboard",
            "report",
            "--input",
            "record.json",
            "--image",
            "a.jpg",
            "--image",
            "b.jpg",
        ])
        .unwrap();
        match cli.command {
            Commands::Report { images, .. } => assert_eq!(images.len(), 2),
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_unknown_corridor_rejected() {
        assert!(Cli::try_parse_from(["progress-dashboard", "breakdown", "-c", "north"]).is_err());
    }
}
