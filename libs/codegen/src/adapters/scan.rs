//! # Source Masking
//!
//! Text adapters locate structure with regexes and brace counting. Both go
//! wrong inside strings and comments, so they run over a *masked* copy of
//! the source: literal and comment contents are blanked to spaces while
//! delimiters, newlines and byte offsets stay where they were. A range found
//! in the mask slices the original source unchanged.

/// Which lexical forms a language has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Syntax {
    /// `// ...` comments.
    pub line_comments: bool,
    /// Backtick template literals with `${ }` substitutions.
    pub templates: bool,
    /// `/.../` regex literals after an operator.
    pub regex_literals: bool,
}

pub(crate) const SCRIPT: Syntax = Syntax {
    line_comments: true,
    templates: true,
    regex_literals: true,
};

pub(crate) const CSS: Syntax = Syntax {
    line_comments: false,
    templates: false,
    regex_literals: false,
};

/// Why a source could not be masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unterminated {
    String(usize),
    Comment(usize),
    Template(usize),
    Regex(usize),
}

impl std::fmt::Display for Unterminated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unterminated::String(at) => write!(f, "unterminated string at byte {at}"),
            Unterminated::Comment(at) => write!(f, "unterminated comment at byte {at}"),
            Unterminated::Template(at) => write!(f, "unterminated template literal at byte {at}"),
            Unterminated::Regex(at) => write!(f, "unterminated regex literal at byte {at}"),
        }
    }
}

enum Frame {
    /// Substitution code inside a template, with its own brace depth.
    Substitution(usize),
    Template,
}

/// Blank out string, comment and template contents.
pub(crate) fn mask(source: &str, syntax: Syntax) -> Result<String, Unterminated> {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut frames: Vec<Frame> = Vec::new();
    let mut i = 0;
    // Last significant code byte, for telling `/` division from a regex.
    let mut last_code: Option<u8> = None;

    while i < bytes.len() {
        if let Some(Frame::Template) = frames.last() {
            match bytes[i] {
                b'`' => {
                    frames.pop();
                    out.push('`');
                    last_code = Some(b'`');
                    i += 1;
                }
                b'$' if bytes.get(i + 1) == Some(&b'{') => {
                    frames.push(Frame::Substitution(0));
                    out.push_str("${");
                    last_code = Some(b'{');
                    i += 2;
                }
                b'\\' => i = blank(source, &mut out, i, 2),
                _ => i = blank(source, &mut out, i, 1),
            }
            continue;
        }

        let b = bytes[i];
        match b {
            b'\'' | b'"' => {
                let start = i;
                out.push(b as char);
                i += 1;
                loop {
                    match bytes.get(i) {
                        None | Some(b'\n') => return Err(Unterminated::String(start)),
                        Some(&c) if c == b => break,
                        Some(b'\\') => i = blank(source, &mut out, i, 2),
                        Some(_) => i = blank(source, &mut out, i, 1),
                    }
                }
                out.push(b as char);
                i += 1;
                last_code = Some(b);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let start = i;
                let Some(len) = source[i + 2..].find("*/") else {
                    return Err(Unterminated::Comment(start));
                };
                i = blank(source, &mut out, i, len + 4);
            }
            b'/' if syntax.line_comments && bytes.get(i + 1) == Some(&b'/') => {
                let len = source[i..].find('\n').unwrap_or(source.len() - i);
                i = blank(source, &mut out, i, len);
            }
            b'/' if syntax.regex_literals && starts_regex(last_code, &out) => {
                let start = i;
                out.push('/');
                i += 1;
                let mut in_class = false;
                loop {
                    match bytes.get(i) {
                        None | Some(b'\n') => return Err(Unterminated::Regex(start)),
                        Some(b'/') if !in_class => break,
                        Some(b'\\') => i = blank(source, &mut out, i, 2),
                        Some(&c) => {
                            if c == b'[' {
                                in_class = true;
                            } else if c == b']' {
                                in_class = false;
                            }
                            i = blank(source, &mut out, i, 1);
                        }
                    }
                }
                out.push('/');
                i += 1;
                // A regex is an operand: a following `/` divides.
                last_code = Some(b')');
            }
            b'`' if syntax.templates => {
                frames.push(Frame::Template);
                out.push('`');
                i += 1;
            }
            b'{' => {
                if let Some(Frame::Substitution(depth)) = frames.last_mut() {
                    *depth += 1;
                }
                out.push('{');
                last_code = Some(b);
                i += 1;
            }
            b'}' => {
                if let Some(Frame::Substitution(depth)) = frames.last_mut() {
                    if *depth == 0 {
                        frames.pop();
                    } else {
                        *depth -= 1;
                    }
                }
                out.push('}');
                last_code = Some(b);
                i += 1;
            }
            _ => {
                let ch_len = utf8_len(b);
                let end = (i + ch_len).min(bytes.len());
                out.push_str(&source[i..end]);
                if !b.is_ascii_whitespace() {
                    last_code = Some(b);
                }
                i = end;
            }
        }
    }

    match frames.last() {
        None => Ok(out),
        Some(_) => Err(Unterminated::Template(source.rfind('`').unwrap_or(0))),
    }
}

/// Copy `len` bytes starting at `from` as blanks, keeping newlines and
/// whole characters. Returns the index after the blanked run.
fn blank(source: &str, out: &mut String, from: usize, len: usize) -> usize {
    let mut end = (from + len).min(source.len());
    while !source.is_char_boundary(end) {
        end += 1;
    }
    for ch in source[from..end].chars() {
        if ch == '\n' {
            out.push('\n');
        } else {
            for _ in 0..ch.len_utf8() {
                out.push(' ');
            }
        }
    }
    end
}

fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}

/// Keywords after which `/` opens a regex instead of dividing.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "in", "of", "void", "delete", "instanceof", "new", "throw", "yield", "await",
    "else", "do",
];

fn starts_regex(last_code: Option<u8>, masked: &str) -> bool {
    match last_code {
        None => true,
        Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' => {
            let text = masked.trim_end();
            let word_start = text
                .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
                .map_or(0, |i| i + 1);
            let word = &text[word_start..];
            let member_access = text[..word_start].ends_with('.');
            !member_access && REGEX_PREFIX_KEYWORDS.contains(&word)
        }
        Some(b) => matches!(
            b,
            b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'{' | b'}' | b';' | b'+' | b'-' | b'*' | b'%' | b'<' | b'>' | b'~' | b'^'
        ),
    }
}

// =============================================================================
// BRACKETS
// =============================================================================

/// `()`, `[]` and `{}` nest properly in an already-masked text.
pub(crate) fn brackets_balanced(masked: &str) -> bool {
    let mut stack = Vec::new();
    for b in masked.bytes() {
        match b {
            b'(' | b'[' | b'{' => stack.push(b),
            b')' | b']' | b'}' => {
                let open = match b {
                    b')' => b'(',
                    b']' => b'[',
                    _ => b'{',
                };
                if stack.pop() != Some(open) {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}

/// Index of the `}` closing the `{` at `open`.
pub(crate) fn matching_brace(masked: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, b) in masked.as_bytes().get(open..)?.iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Curly-brace nesting depth at byte `at`.
pub(crate) fn depth_at(masked: &str, at: usize) -> usize {
    let mut depth = 0usize;
    for b in masked.as_bytes()[..at.min(masked.len())].iter() {
        match b {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

// =============================================================================
// TEXT SPLICING
// =============================================================================

/// Leading whitespace of the line holding byte `at`.
pub(crate) fn line_indent(source: &str, at: usize) -> &str {
    let start = line_start(source, at);
    let line = &source[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Indentation of the first member line inside the block `open..close`,
/// relative to the line holding `{`.
pub(crate) fn body_indent_unit(source: &str, open: usize, close: usize) -> Option<&str> {
    let outer = line_indent(source, open);
    let first = source[open + 1..close].lines().skip(1).find(|line| !line.trim().is_empty())?;
    let width = first.len() - first.trim_start_matches([' ', '\t']).len();
    first[..width].strip_prefix(outer).filter(|unit| !unit.is_empty())
}

pub(crate) fn line_start(source: &str, at: usize) -> usize {
    source[..at].rfind('\n').map_or(0, |i| i + 1)
}

/// Prefix every non-empty line of `text` with `indent`.
pub(crate) fn indent_lines(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Insert `member` as the last entry of the block spanning `open..=close`.
///
/// A non-empty body gets a blank line before the new member.
pub(crate) fn insert_before_close(source: &str, open: usize, close: usize, member: &str, indent_unit: &str) -> String {
    insert_last(source, open, close, member, indent_unit, true)
}

/// [`insert_before_close`], with the blank separator line optional.
pub(crate) fn insert_last(
    source: &str,
    open: usize,
    close: usize,
    member: &str,
    indent_unit: &str,
    separated: bool,
) -> String {
    let outer = line_indent(source, open).to_string();
    let inner = format!("{outer}{indent_unit}");
    let block = indent_lines(member, &inner);
    let body_empty = source[open + 1..close].trim().is_empty();
    let separator = if separated && !body_empty { "\n" } else { "" };

    let start = line_start(source, close);
    let mut out = String::with_capacity(source.len() + block.len() + 8);
    if source[start..close].trim().is_empty() {
        out.push_str(&source[..start]);
        out.push_str(separator);
        out.push_str(&block);
        out.push('\n');
        out.push_str(&source[start..]);
    } else {
        let at = source[..close].trim_end_matches([' ', '\t']).len();
        out.push_str(&source[..at]);
        out.push('\n');
        out.push_str(separator);
        out.push_str(&block);
        out.push('\n');
        out.push_str(&outer);
        out.push_str(&source[close..]);
    }
    out
}

/// Insert `member` as the first entry of the block spanning `open..=close`.
pub(crate) fn insert_after_open(source: &str, open: usize, close: usize, member: &str, indent_unit: &str) -> String {
    let body_empty = source[open + 1..close].trim().is_empty();
    if body_empty {
        return insert_before_close(source, open, close, member, indent_unit);
    }
    let outer = line_indent(source, open);
    let block = indent_lines(member, &format!("{outer}{indent_unit}"));
    let rest = &source[open + 1..];
    let mut out = String::with_capacity(source.len() + block.len() + 4);
    out.push_str(&source[..=open]);
    match rest.find('\n') {
        Some(nl) if rest[..nl].trim().is_empty() => {
            out.push_str(&rest[..=nl]);
            out.push_str(&block);
            out.push('\n');
            out.push_str(&rest[nl + 1..]);
        }
        _ => {
            out.push('\n');
            out.push_str(&block);
            out.push('\n');
            out.push_str(&format!("{outer}{indent_unit}"));
            out.push_str(rest.trim_start());
        }
    }
    out
}

/// Append `content` to `source` after a blank line.
pub(crate) fn append_block(source: &str, content: &str) -> String {
    let head = source.trim_end();
    let tail = content.trim_end();
    if head.is_empty() {
        format!("{tail}\n")
    } else {
        format!("{head}\n\n{tail}\n")
    }
}
