// Text helpers: source summaries and docstrings

use tree_sitter::Node;

/// Source text of a node with whitespace runs collapsed to single spaces
pub fn summary(node: &Node, source: &[u8]) -> Option<String> {
    let text = node.utf8_text(source).ok()?;
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Argument list text without the surrounding parentheses
pub fn arguments(node: &Node, source: &[u8]) -> Option<String> {
    let text = summary(node, source)?;
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(&text)
        .trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

/// Docstring of a class or function body.
///
/// A docstring is the first statement of the block when that statement is a
/// plain (optionally `r`/`u` prefixed) string literal, or several of them
/// written next to each other.
pub fn docstring(body: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;

    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }

    let literal = first.named_child(0)?;
    let content = match literal.kind() {
        "string" => strip_quotes(literal.utf8_text(source).ok()?)?.to_string(),
        // `"a" "b"` is one literal, "ab"
        "concatenated_string" => {
            let mut cursor = literal.walk();
            let parts: Option<Vec<&str>> = literal
                .named_children(&mut cursor)
                .filter(|part| part.kind() != "comment")
                .map(|part| match part.kind() {
                    "string" => strip_quotes(part.utf8_text(source).ok()?),
                    _ => None,
                })
                .collect();
            parts?.concat()
        }
        _ => return None,
    };

    let cleaned = clean_docstring(&content);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Remove the prefix and quotes of a string literal
fn strip_quotes(text: &str) -> Option<&str> {
    let unprefixed = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let prefix = &text[..text.len() - unprefixed.len()];
    if prefix.chars().any(|c| !matches!(c, 'r' | 'R' | 'u' | 'U')) {
        // f-strings and bytes are not docstrings
        return None;
    }

    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = unprefixed
            .strip_prefix(quote)
            .and_then(|t| t.strip_suffix(quote))
        {
            return Some(inner);
        }
    }
    None
}

/// Trim and dedent the way Python's `inspect.cleandoc` does
pub fn clean_docstring(text: &str) -> String {
    let lines: Vec<String> = text.lines().map(|l| l.replace('\t', "        ")).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let dedented: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim()
            } else if line.trim().is_empty() {
                ""
            } else {
                line.get(margin..).unwrap_or(line.trim_start()).trim_end()
            }
        })
        .collect();

    dedented.join("\n").trim().to_string()
}
