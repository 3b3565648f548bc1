use crate::error::{AppError, AppResult, SourceError};
use crate::models::signal::WorkItem;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// 从名单文件读取所有姓名
///
/// 文件首行是表头，会被丢弃；读取失败直接返回错误，调用方据此终止程序
pub async fn load_names(source_path: &Path) -> AppResult<Vec<WorkItem>> {
    let path_str = source_path.display().to_string();

    let content = fs::read_to_string(source_path)
        .await
        .map_err(|e| AppError::source_read_failed(path_str.clone(), e))?;

    let mut lines = content.lines();
    if lines.next().is_none() {
        return Err(SourceError::Empty { path: path_str }.into());
    }

    let names = parse_names(lines);
    debug!("从 {} 解析出 {} 个姓名", source_path.display(), names.len());

    Ok(names)
}

/// 从数据行中提取姓名（不含表头）
///
/// 姓名取第一个制表符之前的部分，并去掉其中的引号和逗号。
/// 遇到没有制表符或姓名为空的行即视为数据结束。
pub fn parse_names<'a, I>(lines: I) -> Vec<WorkItem>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names = Vec::new();

    for line in lines {
        let Some(name) = name_field(line) else {
            break;
        };
        names.push(name);
    }

    names
}

fn name_field(line: &str) -> Option<String> {
    match line.find('\t') {
        Some(index) if index > 0 => Some(
            line[..index]
                .chars()
                .filter(|c| *c != '"' && *c != ',')
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_name() {
        let names = parse_names(["\"Jane Doe\"\t1990-01-01"]);
        assert_eq!(names, vec!["Jane Doe".to_string()]);
    }

    #[test]
    fn test_commas_stripped() {
        let names = parse_names(["\"Doe, Jane\"\tBrussel\t1000"]);
        assert_eq!(names, vec!["Doe Jane".to_string()]);
    }

    #[test]
    fn test_stops_at_line_without_name() {
        let names = parse_names(["Jan Peeters\tx", "An Janssens\ty", "", "Late Entry\tz"]);
        assert_eq!(names, vec!["Jan Peeters".to_string(), "An Janssens".to_string()]);

        let names = parse_names(["\tno name", "Jan Peeters\tx"]);
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_load_names_skips_header() {
        let dir = std::env::temp_dir().join(format!("address_lookup_src_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("names.txt");
        std::fs::write(
            &path,
            "naam\tgeboortedatum\n\"Jane Doe\"\t1990-01-01\n\"Jan Peeters\"\t1985-05-05\n",
        )
        .unwrap();

        let names = load_names(&path).await.unwrap();
        assert_eq!(names, vec!["Jane Doe".to_string(), "Jan Peeters".to_string()]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let err = tokio_test::block_on(load_names(Path::new("/definitely/not/here/names.txt")))
            .unwrap_err();
        assert!(matches!(err, AppError::Source(SourceError::ReadFailed { .. })));
    }

    #[tokio::test]
    async fn test_empty_file_is_source_error() {
        let dir = std::env::temp_dir().join(format!("address_lookup_empty_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let err = load_names(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Source(SourceError::Empty { .. })));

        std::fs::remove_dir_all(&dir).ok();
    }
}
