//! Textual splice of a new entry into the root element.
//!
//! Only the root element is re-emitted, behind a fixed declaration line. Its existing
//! bytes are copied through untouched; the new `<map><file>` node and a newline go right
//! before the root end tag.

use xml::writer::{EmitterConfig, XmlEvent};

/// Declaration line written at the top of every persisted manifest.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Serializes `<map><file>record</file></map>` with text escaping, no declaration and
/// no indentation.
pub(super) fn render_entry(record: &str) -> Result<String, xml::writer::Error> {
    let mut buf = Vec::new();
    {
        let mut w = EmitterConfig::new()
            .write_document_declaration(false)
            .perform_indent(false)
            .create_writer(&mut buf);
        w.write(XmlEvent::start_element("map"))?;
        w.write(XmlEvent::start_element("file"))?;
        w.write(XmlEvent::characters(record))?;
        w.write(XmlEvent::end_element())?;
        w.write(XmlEvent::end_element())?;
    }
    // The emitter only produces UTF-8 from &str input.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Byte range of the root element inside an already well-formed document.
pub(super) fn root_span(text: &str) -> Option<(usize, usize)> {
    let start = skip_prolog(text)?;
    let end = root_end(text, start)?;
    Some((start, end))
}

/// Offset just past the end tag matching the start tag at `start`. Comments, CDATA, PIs
/// and quoted attribute values are skipped whole, so their content never counts as markup.
fn root_end(text: &str, start: usize) -> Option<usize> {
    let mut pos = start;
    let mut depth = 0usize;
    loop {
        pos += text[pos..].find('<')?;
        let rest = &text[pos..];
        if rest.starts_with("<!--") {
            pos += rest.find("-->")? + 3;
        } else if rest.starts_with("<![CDATA[") {
            pos += rest.find("]]>")? + 3;
        } else if rest.starts_with("<?") {
            pos += rest.find("?>")? + 2;
        } else if rest.starts_with("</") {
            pos += rest.find('>')? + 1;
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(pos);
            }
        } else {
            let len = tag_len(rest)?;
            let self_closing = rest[..len].ends_with("/>");
            pos += len;
            if !self_closing {
                depth += 1;
            } else if depth == 0 {
                return Some(pos);
            }
        }
    }
}

/// Length of a start tag, honoring `>` inside quoted attribute values.
fn tag_len(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in tag.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Offset of the root start tag, past BOM, whitespace, declaration, PIs, comments and
/// doctype.
fn skip_prolog(text: &str) -> Option<usize> {
    let mut pos = text.strip_prefix('\u{feff}').map_or(0, |_| '\u{feff}'.len_utf8());
    loop {
        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.starts_with("<?") {
            pos += trimmed.find("?>")? + 2;
        } else if trimmed.starts_with("<!--") {
            pos += trimmed.find("-->")? + 3;
        } else if trimmed.starts_with("<!") {
            pos += doctype_len(trimmed)?;
        } else if trimmed.starts_with('<') {
            return Some(pos);
        } else {
            return None;
        }
    }
}

/// Length of a `<!DOCTYPE ...>` declaration, including an internal `[...]` subset.
fn doctype_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '>' if depth == 0 => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Builds the persisted manifest: declaration, then the root element with `node` and a
/// newline appended as its last children.
pub(super) fn splice_entry(text: &str, root_name: &str, node: &str) -> Option<String> {
    let (start, end) = root_span(text)?;
    let root = &text[start..end];
    let mut out = String::with_capacity(
        XML_DECLARATION.len() + root.len() + node.len() + root_name.len() + 4,
    );
    out.push_str(XML_DECLARATION);

    match root.rfind("</") {
        Some(close) => {
            out.push_str(&root[..close]);
            out.push_str(node);
            out.push('\n');
            out.push_str(&root[close..]);
        }
        None => {
            // Self-closing root: `<maps/>` becomes `<maps>NODE\n</maps>`.
            let open = root.strip_suffix("/>")?.trim_end();
            out.push_str(open);
            out.push('>');
            out.push_str(node);
            out.push('\n');
            out.push_str("</");
            out.push_str(root_name);
            out.push('>');
        }
    }
    Some(out)
}
