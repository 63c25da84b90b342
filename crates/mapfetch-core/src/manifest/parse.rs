//! Event-reader pass over the manifest: proves it well formed and collects entries.

use xml::reader::{EventReader, ParserConfig, XmlEvent};

/// What the reader learned about a manifest document.
#[derive(Debug)]
pub(super) struct ParsedManifest {
    /// Qualified name of the root element (`prefix:local` when prefixed).
    pub root: String,
    /// Text of every `<map><file>` pair directly under the root, in document order.
    pub entries: Vec<String>,
}

/// Parses the whole document. Any reader error (including trailing garbage or a
/// missing root) is returned as a message.
pub(super) fn parse_manifest(text: &str) -> Result<ParsedManifest, String> {
    let config = ParserConfig::new().ignore_comments(true);
    let reader = EventReader::new_with_config(text.as_bytes(), config);

    let mut root: Option<String> = None;
    let mut entries = Vec::new();
    // Element names from the root down to the current element.
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for event in reader {
        match event.map_err(|e| e.to_string())? {
            XmlEvent::StartElement { name, .. } => {
                let qualified = match name.prefix {
                    Some(prefix) => format!("{}:{}", prefix, name.local_name),
                    None => name.local_name,
                };
                if root.is_none() {
                    root = Some(qualified.clone());
                }
                stack.push(qualified);
                if is_entry_file(&stack) {
                    current = Some(String::new());
                }
            }
            XmlEvent::EndElement { .. } => {
                if is_entry_file(&stack) {
                    if let Some(text) = current.take() {
                        entries.push(text);
                    }
                }
                stack.pop();
            }
            XmlEvent::Characters(s) | XmlEvent::CData(s) | XmlEvent::Whitespace(s) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&s);
                }
            }
            XmlEvent::EndDocument => break,
            _ => {}
        }
    }

    let root = root.ok_or_else(|| "document has no root element".to_string())?;
    Ok(ParsedManifest { root, entries })
}

/// True when the innermost open element is `<file>` inside a `<map>` child of the root.
fn is_entry_file(stack: &[String]) -> bool {
    matches!(stack, [_, map, file] if map == "map" && file == "file")
}
