use std::fs;
use std::path::Path;

use anyhow::Context;

/// Read a URL list: a JSON array of strings, or one URL per line with blank
/// lines and `#` comments ignored.
pub fn load_urls(path: &Path, limit: Option<usize>) -> anyhow::Result<Vec<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading URL list {}", path.display()))?;
    let mut urls = parse_urls(&content)
        .with_context(|| format!("parsing URL list {}", path.display()))?;
    if let Some(limit) = limit {
        urls.truncate(limit);
    }
    Ok(urls)
}

fn parse_urls(content: &str) -> anyhow::Result<Vec<String>> {
    if content.trim_start().starts_with('[') {
        let urls: Vec<String> = serde_json::from_str(content)?;
        return Ok(urls);
    }
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn plain_list_trims_and_skips_comments() {
        let urls = parse_urls("# seeds\nhttps://a.example \n\n  https://b.example\n").unwrap();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn json_array_is_accepted() {
        let urls = parse_urls(r#" ["https://a.example", "https://b.example"] "#).unwrap();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_urls("[\"https://a.example\"").is_err());
    }

    #[test]
    fn limit_truncates_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "https://a.example\nhttps://b.example\nhttps://c.example").unwrap();

        let urls = load_urls(file.path(), Some(2)).unwrap();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);

        let all = load_urls(file.path(), None).unwrap();
        assert_eq!(all.len(), 3);
    }
}
