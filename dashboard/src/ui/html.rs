use std::fmt::Write;

use crate::services::TablePreview;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Element id for field `name` inside form `form`; ids repeat across forms
/// otherwise.
pub fn field_id(form: &str, name: &str) -> String {
    format!("{}-{}", form, name)
}

pub fn text_input(form: &str, name: &str, label: &str, value: &str) -> String {
    format!(
        r#"<label for="{id}">{label}</label><input type="text" id="{id}" name="{name}" value="{value}">"#,
        id = field_id(form, name),
        name = name,
        label = escape(label),
        value = escape(value),
    )
}

pub fn file_input(form: &str, label: &str, accept: &str) -> String {
    format!(
        r#"<label for="{id}">{label}</label><input type="file" id="{id}" name="file" accept="{accept}">"#,
        id = field_id(form, "file"),
        label = escape(label),
        accept = escape(accept),
    )
}

/// `<select>` over `options`, keeping `selected` chosen when present.
pub fn select<'a>(
    form: &str,
    name: &str,
    label: &str,
    options: impl IntoIterator<Item = &'a str>,
    selected: &str,
) -> String {
    let mut out = format!(
        r#"<label for="{id}">{label}</label><select id="{id}" name="{name}">"#,
        id = field_id(form, name),
        name = name,
        label = escape(label),
    );
    for option in options {
        let marker = if option == selected { " selected" } else { "" };
        let _ = write!(
            out,
            r#"<option value="{value}"{marker}>{value}</option>"#,
            value = escape(option),
            marker = marker,
        );
    }
    out.push_str("</select>");
    out
}

pub fn table(preview: &TablePreview) -> String {
    let mut out = format!(
        "<div class=\"meta\">{} rows × {} columns</div><table><thead><tr>",
        preview.total_rows, preview.total_columns
    );
    for header in &preview.headers {
        let _ = write!(out, "<th>{}</th>", escape(header));
    }
    out.push_str("</tr></thead><tbody>");
    for row in &preview.rows {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape(cell));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}
