use crate::error::Result;
use crate::scanner::scan_folder;
use log::info;
use std::path::Path;
use uuid::Uuid;

/// 指定拡張子のファイルをUUID名に変更し、(旧名, 新名) の一覧を返す
///
/// 生成した名前が既存ファイルと衝突した場合は再生成する。
pub fn rename_with_uuid(folder: &Path, extension: &str) -> Result<Vec<(String, String)>> {
    let extension = extension.trim_start_matches('.').to_lowercase();
    let files = scan_folder(folder, &[extension.as_str()])?;

    let mut renamed = Vec::with_capacity(files.len());
    for file in files {
        let (new_name, new_path) = loop {
            let candidate = format!("{}.{}", Uuid::new_v4(), extension);
            let path = folder.join(&candidate);
            if !path.exists() {
                break (candidate, path);
            }
        };

        std::fs::rename(&file.path, &new_path)?;
        info!("Renamed '{}' to '{}'", file.file_name, new_name);
        renamed.push((file.file_name, new_name));
    }

    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_only_matching_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("jet_1.png"), b"a").unwrap();
        std::fs::write(dir.path().join("jet_2.PNG"), b"b").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"c").unwrap();

        let renamed = rename_with_uuid(dir.path(), ".png").unwrap();
        assert_eq!(renamed.len(), 2);
        assert_eq!(renamed[0].0, "jet_1.png");

        for (_, new_name) in &renamed {
            let stem = new_name.trim_end_matches(".png");
            assert!(Uuid::parse_str(stem).is_ok(), "not a uuid: {}", new_name);
            assert!(dir.path().join(new_name).exists());
        }
        assert!(!dir.path().join("jet_1.png").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
