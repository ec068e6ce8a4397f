use aircraft_id_common::{expand_metadata_key, load_results, ClassMap};
use aircraft_id_tools::{analysis, cli, config, convert, dataset, error, labels, matcher, openimages};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use env_logger::Env;
use error::Result;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let config = Config::load()?;

    match cli.command {
        Commands::Match { workbook, photos_root, sheet, strict, report, json } => {
            println!("📋 aircraft-id - 台帳照合\n");

            println!("[1/2] 台帳と写真フォルダを照合中...");
            let options = matcher::MatchOptions { strict_boundary: strict };
            let reports = matcher::process_workbook(&workbook, &photos_root, &sheet, options)?;
            for sheet_report in &reports {
                println!(
                    "✔ {}: {}件中 {}件を照合{}",
                    sheet_report.sheet_name,
                    sheet_report.matches.len(),
                    sheet_report.matched_count(),
                    if sheet_report.rejected_keys.is_empty() {
                        String::new()
                    } else {
                        format!("（展開できないキー {}件）", sheet_report.rejected_keys.len())
                    }
                );
                for rejected in &sheet_report.rejected_keys {
                    println!("  ✗ {}: {}", rejected.key, rejected.reason);
                }
            }

            println!("\n[2/2] 結果を出力中...");
            if report.is_none() && json.is_none() {
                for sheet_report in &reports {
                    println!("\n== {} ==", sheet_report.sheet_name);
                    for photo in &sheet_report.matches {
                        println!("{}\t{}", photo.file_name, photo.description);
                    }
                }
            }
            if let Some(path) = report {
                matcher::report::write_xlsx(&reports, &path)?;
                println!("✔ Excelを保存: {}", path.display());
            }
            if let Some(path) = json {
                matcher::report::write_json(&reports, &path)?;
                println!("✔ JSONを保存: {}", path.display());
            }

            println!("\n✅ 照合完了");
        }

        Commands::Identify { workbook, reference } => {
            println!("🔎 aircraft-id - 機種抽出\n");

            let reference = matcher::reference::AircraftReference::from_workbook(&reference)?;
            println!(
                "✔ 機種名 {}件 / 型式記号 {}件を読み込み\n",
                reference.models().len(),
                reference.designators().len()
            );

            for sheet in matcher::reference::identify_workbook(&workbook, &reference)? {
                println!("シート: {}", sheet.sheet_name);
                for (description, mentions) in &sheet.descriptions {
                    println!("\n  説明: {}", description);
                    if !mentions.models.is_empty() {
                        println!("  機種名: {}", mentions.models.join(", "));
                    }
                    if !mentions.designators.is_empty() {
                        println!("  型式記号: {}", mentions.designators.join(", "));
                        println!("  該当機種: {}", mentions.names.join(", "));
                    }
                }
                println!();
            }
        }

        Commands::Expand { keys } => {
            for key in keys {
                match expand_metadata_key(&key) {
                    Ok(fragments) => {
                        println!("{} ({}件)", key, fragments.len());
                        for fragment in fragments {
                            println!("  {}", fragment);
                        }
                    }
                    Err(e) => println!("✗ {}: {}", key, e),
                }
            }
        }

        Commands::Grayscale { folder, output } => {
            println!("🖼 aircraft-id - グレースケール変換\n");
            let report = convert::grayscale_folder(&folder, output.as_deref())?;
            report.print_summary("グレースケール変換");
        }

        Commands::Convert { input, output, format, quality } => {
            println!("🖼 aircraft-id - 画像変換 ({})\n", format);
            let report = convert::convert_folder(&input, &output, format, quality)?;
            report.print_summary("画像変換");
        }

        Commands::Rename { folder, extension } => {
            let renamed = convert::rename_with_uuid(&folder, &extension)?;
            for (old, new) in &renamed {
                println!("{} → {}", old, new);
            }
            println!("✔ {}件をリネーム", renamed.len());
        }

        Commands::StoreBoxes { results, images, output, classes, threshold, config: names } => {
            println!("🏷 aircraft-id - ラベル生成\n");

            let class_map = names.as_deref().map(ClassMap::from_yaml_file).transpose()?;
            let classes = labels::StoreOptions::resolve_classes(&classes, class_map.as_ref())?;
            println!("- 対象クラス: {:?}", classes);

            println!("[1/2] 検出結果を読み込み中...");
            let detections = load_results(&std::fs::read_to_string(&results)?)?;
            println!("✔ {}枚分の検出結果\n", detections.len());

            println!("[2/2] ラベルを出力中...");
            let options = labels::StoreOptions {
                classes,
                threshold: threshold.unwrap_or(config.confidence_threshold),
            };
            let report = labels::store_boxes(&detections, &images, &output, &options)?;
            report.print_summary("ラベル生成");
        }

        Commands::CsvLabels { csv, output, config: names } => {
            let class_map = ClassMap::from_yaml_file(&names)?;
            let report = labels::csv_to_labels(&csv, &class_map, &output)?;
            report.print_summary("CSV変換");
        }

        Commands::Relabel { folder, index, config: names, mapping } => {
            let report = match (index, names, mapping) {
                (Some(index), _, _) => labels::relabel_index(&folder, index)?,
                (None, Some(path), _) => {
                    labels::replace_class_names(&folder, &ClassMap::from_yaml_file(&path)?)?
                }
                (None, None, Some(pairs)) => {
                    labels::replace_class_names(&folder, &ClassMap::from_pairs(&pairs)?)?
                }
                (None, None, None) => {
                    return Err(error::AircraftIdError::Config(
                        "--index, --config, --mapping のいずれかを指定してください".into(),
                    ))
                }
            };
            report.print_summary("ラベル書き換え");
        }

        Commands::Download { image_list, download_folder, threads } => {
            println!("⬇ aircraft-id - 画像ダウンロード\n");

            let requests = openimages::parse_image_list(&std::fs::read_to_string(&image_list)?)?;
            println!("✔ {}件の画像を指定\n", requests.len());

            let fetcher = http_fetcher(&config)?;
            let threads = threads.unwrap_or(config.download_threads);
            let summary = openimages::download_all(&requests, &download_folder, threads, &fetcher)?;
            summary.print_summary();
        }

        Commands::Prepare {
            classes,
            dataset,
            csv_dir,
            splits,
            occluded,
            truncated,
            group_of,
            depiction,
            inside,
            limit,
            threads,
            auto_download,
            yes,
        } => {
            println!("📦 aircraft-id - データセット作成\n");

            let options = openimages::PrepareOptions {
                classes,
                dataset_dir: dataset,
                csv_dir,
                splits,
                filter: openimages::AttributeFilter { occluded, truncated, group_of, depiction, inside },
                limit,
                threads: threads.unwrap_or(config.download_threads),
                annotations_url: config.annotations_url.clone(),
                auto_download,
                assume_yes: yes,
            };
            let fetcher = http_fetcher(&config)?;

            match openimages::prepare_dataset(&options, &fetcher)? {
                Some(summary) => {
                    println!();
                    summary.download.print_summary();
                    println!("✔ ラベル: {}件", summary.labels_written);
                    println!("\n✅ データセット作成完了: {}", options.dataset_dir.display());
                }
                None => println!("中止しました"),
            }
        }

        Commands::Split { input, output, ratio, seed } => {
            let ratios = dataset::SplitRatios::from_slice(&ratio)?;
            let results = dataset::split_dataset(&input, &output, ratios, seed)?;
            for class in &results {
                println!(
                    "✔ {}: train {} / val {} / test {}",
                    class.class_name, class.counts[0], class.counts[1], class.counts[2]
                );
            }
            println!("\n✅ 分割完了: {}", output.display());
        }

        Commands::Analyze { results, output } => {
            let (summary, written) = analysis::analyze_results(&results, &output)?;
            print!("{}", analysis::format_summary(&summary));
            for class in &summary.classes {
                println!("Average confidence for {}: {:.2}", class.class_name, class.average_confidence());
            }
            println!("\n✔ {}件のレポートを保存: {}", written.len(), output.display());
        }

        Commands::Config { set_threads, set_threshold, set_bucket_url, show } => {
            let mut config = config;

            if let Some(threads) = set_threads {
                config.set_download_threads(threads)?;
                println!("✔ スレッド数を設定しました: {}", threads);
            }
            if let Some(threshold) = set_threshold {
                config.set_confidence_threshold(threshold)?;
                println!("✔ 信頼度の閾値を設定しました: {}", threshold);
            }
            if let Some(url) = set_bucket_url {
                config.set_bucket_url(url)?;
                println!("✔ バケットURLを設定しました");
            }

            if show {
                println!("設定 ({}):", Config::config_path().map(|p| p.display().to_string()).unwrap_or_default());
                println!("  スレッド数: {}", config.download_threads);
                println!("  信頼度の閾値: {}", config.confidence_threshold);
                println!("  バケットURL: {}", config.bucket_url());
                println!("  アノテーションURL: {}", config.annotations_url);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
            }
        }
    }

    Ok(())
}

fn http_fetcher(config: &Config) -> Result<openimages::HttpFetcher> {
    openimages::HttpFetcher::new(&config.bucket_url(), Duration::from_secs(config.timeout_seconds))
}
