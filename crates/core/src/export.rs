use chrono::NaiveDate;

const UNTITLED: &str = "記事タイトル";

/// Assembles the exportable markdown document: title heading, the
/// current article body, a separator and the generation footer. Output
/// is byte-for-byte stable for identical inputs.
pub fn render_markdown(title: Option<&str>, body: &str, date: NaiveDate) -> String {
    let title = title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(UNTITLED);

    format!(
        "# {title}\n\n{body}\n\n---\n生成日: {date}\nYAE (Young AI Editor) で生成\n",
        title = title,
        body = body,
        date = date.format("%Y-%m-%d"),
    )
}
