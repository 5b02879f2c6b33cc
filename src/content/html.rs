//! Allowlist sanitizer for blog post bodies.
//!
//! Post bodies arrive as HTML fragments captured from a rich-text editor that
//! only offers inline formatting, links, lists and headings. Anything outside
//! that vocabulary is unwrapped (text kept) or, for active content, removed
//! together with its body. Text is re-escaped, so the output never carries raw
//! `<` or `&` outside of the tags emitted here.

use std::borrow::Cow;

const ALLOWED_TAGS: &[&str] = &[
    "p",
    "br",
    "b",
    "strong",
    "i",
    "em",
    "u",
    "a",
    "ul",
    "ol",
    "li",
    "h1",
    "h2",
    "h3",
    "h4",
    "blockquote",
    "code",
    "pre",
    "span",
    "div",
];

const REMOVED_WITH_BODY: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "template", "noscript",
];

const SAFE_SCHEMES: &[&str] = &["http://", "https://", "mailto:"];

const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, PartialEq, Eq)]
struct Tag {
    name: String,
    closing: bool,
    href: Option<String>,
}

/// Returns the sanitized form of `input`.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut skipping: Option<String> = None;
    let mut rest = input;

    while let Some(lt) = rest.find('<') {
        let (text, tail) = rest.split_at(lt);
        if skipping.is_none() {
            push_text(&mut out, text);
        }

        if let Some(after_comment) = tail.strip_prefix("<!--") {
            rest = match after_comment.find("-->") {
                Some(end) => &after_comment[end + 3..],
                None => "",
            };
            continue;
        }

        let Some((tag, consumed)) = parse_tag(tail) else {
            if skipping.is_none() {
                out.push_str("&lt;");
            }
            rest = &tail[1..];
            continue;
        };
        rest = &tail[consumed..];

        if let Some(open) = skipping.as_deref() {
            if tag.closing && tag.name == open {
                skipping = None;
            }
            continue;
        }

        if REMOVED_WITH_BODY.contains(&tag.name.as_str()) {
            if !tag.closing {
                skipping = Some(tag.name);
            }
            continue;
        }

        if ALLOWED_TAGS.contains(&tag.name.as_str()) {
            emit_tag(&mut out, &tag);
        }
    }

    if skipping.is_none() {
        push_text(&mut out, rest);
    }
    out
}

/// Plain text of an HTML fragment, tags removed and entities decoded.
pub fn text_content(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(lt) = rest.find('<') {
        text.push_str(&rest[..lt]);
        match rest[lt..].find('>') {
            Some(gt) => {
                // Tags separate words the same way whitespace does.
                text.push(' ');
                rest = &rest[lt + gt + 1..];
            }
            None => {
                rest = &rest[lt..];
                break;
            }
        }
    }
    text.push_str(rest);
    html_escape::decode_html_entities(&text).into_owned()
}

/// Minutes needed to read `html` at 200 words per minute, never below one.
pub fn reading_minutes(html: &str) -> usize {
    let words = text_content(html).split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

fn push_text(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    let decoded: Cow<'_, str> = html_escape::decode_html_entities(text);
    out.push_str(&html_escape::encode_text(&decoded));
}

fn emit_tag(out: &mut String, tag: &Tag) {
    if tag.name == "br" {
        if !tag.closing {
            out.push_str("<br>");
        }
        return;
    }
    if tag.closing {
        out.push_str("</");
        out.push_str(&tag.name);
        out.push('>');
        return;
    }
    out.push('<');
    out.push_str(&tag.name);
    if let Some(href) = tag.href.as_deref() {
        out.push_str(" href=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(href));
        out.push('"');
    }
    out.push('>');
}

fn parse_tag(s: &str) -> Option<(Tag, usize)> {
    let end = s.find('>')?;
    let inner = &s[1..end];
    let (closing, body) = match inner.strip_prefix('/') {
        Some(body) => (true, body),
        None => (false, inner),
    };

    let name_len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }
    let name = body[..name_len].to_ascii_lowercase();

    let href = if name == "a" && !closing {
        attributes(&body[name_len..])
            .into_iter()
            .find(|(key, _)| key == "href")
            .and_then(|(_, value)| safe_href(&value))
    } else {
        None
    };

    Some((
        Tag {
            name,
            closing,
            href,
        },
        end + 1,
    ))
}

fn attributes(mut s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    loop {
        s = s.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if s.is_empty() {
            break;
        }
        let name_end = s
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(s.len());
        if name_end == 0 {
            s = &s[1..];
            continue;
        }
        let name = s[..name_end].to_ascii_lowercase();
        s = s[name_end..].trim_start();

        let value = match s.strip_prefix('=') {
            Some(v) => {
                let v = v.trim_start();
                match v.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        let body = &v[1..];
                        let close = body.find(quote).unwrap_or(body.len());
                        s = body.get(close + 1..).unwrap_or("");
                        body[..close].to_string()
                    }
                    _ => {
                        let end = v.find(char::is_whitespace).unwrap_or(v.len());
                        s = &v[end..];
                        v[..end].to_string()
                    }
                }
            }
            None => String::new(),
        };
        attrs.push((name, value));
    }
    attrs
}

fn safe_href(raw: &str) -> Option<String> {
    let decoded = html_escape::decode_html_entities(raw);
    let href = decoded.trim();
    let lowered = href.to_ascii_lowercase();
    SAFE_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
        .then(|| href.to_string())
}
