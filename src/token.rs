//! Rule tokenizer.
//!
//! A rule is literal text interleaved with dynamic segments written in one of two forms:
//!
//! - short: `:name`, optionally followed by an inline regex `#config#`; always uses the `default`
//!   filter. A bare `:` is an unnamed segment.
//! - long: `<name>`, `<name:filter>` or `<name:filter:config>`. Every part is optional, so `<>` and
//!   `<:path>` are unnamed segments. Inside the config `\>` stands for `>`.
//!
//! A marker preceded by an odd run of backslashes is escaped: it is kept as literal text and the
//! run loses one backslash. An even run is kept as is and the marker is live.

use std::borrow::Cow;

/// Filter used when a segment names none.
pub const DEFAULT_FILTER: &str = "default";

/// One piece of a tokenized rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Static text.
    Literal(Cow<'a, str>),

    /// A dynamic segment.
    Dynamic {
        /// Parameter name; `None` for an unnamed segment.
        name: Option<&'a str>,

        /// Filter name, `"default"` when not given.
        filter: &'a str,

        /// Filter configuration, `None` when absent or empty.
        config: Option<Cow<'a, str>>,
    },
}

impl Token<'_> {
    /// Returns `true` for dynamic segments.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Token::Dynamic { .. })
    }
}

/// Iterator over the [tokens](Token) of a rule.
///
/// ```
/// use route_rules::Token;
///
/// let tokens = Token::scan("/user/<id:int>").collect::<Vec<_>>();
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0], Token::Literal("/user/".into()));
/// assert_eq!(
///     tokens[1],
///     Token::Dynamic { name: Some("id"), filter: "int", config: None }
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rule: &'a str,
    pos: usize,
    pending: Option<Token<'a>>,
}

impl<'a> Token<'a> {
    /// Tokenizes `rule`.
    pub fn scan(rule: &'a str) -> Tokens<'a> {
        Tokens {
            rule,
            pos: 0,
            pending: None,
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }

        let rule = self.rule;
        let bytes = rule.as_bytes();

        // literal text is borrowed until an escaped marker forces a copy
        let mut owned: Option<String> = None;
        let mut lit_start = self.pos;
        let mut idx = self.pos;

        while idx < bytes.len() {
            if !matches!(bytes[idx], b'\\' | b':' | b'<') {
                idx += 1;
                continue;
            }

            let run_end = idx + bytes[idx..].iter().take_while(|&&b| b == b'\\').count();

            let (token, end) = match scan_marker(rule, run_end) {
                Some(marker) => marker,
                None => {
                    idx = run_end.max(idx + 1);
                    continue;
                }
            };

            let run = run_end - idx;

            if run % 2 == 1 {
                let buf = owned.get_or_insert_with(String::new);
                buf.push_str(&rule[lit_start..idx]);
                buf.push_str(&rule[idx + 1..end]);

                idx = end;
                lit_start = end;
                continue;
            }

            let literal = take_literal(owned, &rule[lit_start..run_end]);
            self.pos = end;

            return match literal {
                Some(literal) => {
                    self.pending = Some(token);
                    Some(Token::Literal(literal))
                }
                None => Some(token),
            };
        }

        self.pos = bytes.len();
        take_literal(owned, &rule[lit_start..]).map(Token::Literal)
    }
}

fn take_literal<'a>(owned: Option<String>, tail: &'a str) -> Option<Cow<'a, str>> {
    let literal = match owned {
        Some(mut buf) => {
            buf.push_str(tail);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(tail),
    };

    (!literal.is_empty()).then_some(literal)
}

/// Tries to read a marker starting at `start`, returning it and the index just past it.
fn scan_marker(rule: &str, start: usize) -> Option<(Token<'_>, usize)> {
    match rule.as_bytes().get(start)? {
        b':' => Some(scan_short(rule, start + 1)),
        b'<' => scan_long(rule, start + 1),
        _ => None,
    }
}

/// `:` [ident] [`#` config `#`]; never fails once the colon is seen.
fn scan_short(rule: &str, start: usize) -> (Token<'_>, usize) {
    let (name, mut end) = scan_ident(rule, start);
    let mut config = None;

    if rule[end..].starts_with('#') {
        let body = &rule[end + 1..];

        if let Some(close) = body.find(|c: char| c == '#' || c == '\n') {
            if body.as_bytes()[close] == b'#' {
                config = Some(&body[..close]).filter(|conf| !conf.is_empty());
                end += close + 2;
            }
        }
    }

    let token = Token::Dynamic {
        name,
        filter: DEFAULT_FILTER,
        config: config.map(Cow::Borrowed),
    };

    (token, end)
}

/// [ident] [`:` filter [`:` config]] `>`
fn scan_long(rule: &str, start: usize) -> Option<(Token<'_>, usize)> {
    let bytes = rule.as_bytes();
    let (name, mut pos) = scan_ident(rule, start);
    let mut filter = "";
    let mut config = None;

    if bytes.get(pos) == Some(&b':') {
        let filter_start = pos + 1;
        pos = filter_start
            + bytes[filter_start..]
                .iter()
                .take_while(|b| b.is_ascii_alphabetic() || **b == b'_')
                .count();
        filter = &rule[filter_start..pos];

        if bytes.get(pos) == Some(&b':') {
            let (conf, conf_end) = scan_config(rule, pos + 1);
            config = conf;
            pos = conf_end;
        }
    }

    if bytes.get(pos) != Some(&b'>') {
        return None;
    }

    let token = Token::Dynamic {
        name,
        filter: if filter.is_empty() {
            DEFAULT_FILTER
        } else {
            filter
        },
        config,
    };

    Some((token, pos + 1))
}

/// Reads a long-form config up to, not including, the closing `>`.
fn scan_config(rule: &str, start: usize) -> (Option<Cow<'_, str>>, usize) {
    let bytes = rule.as_bytes();
    let mut pos = start;
    let mut has_escaped_close = false;

    while pos < bytes.len() {
        match bytes[pos] {
            b'>' => break,
            b'\\' => match bytes.get(pos + 1) {
                Some(b'\n') | None => break,
                Some(b'>') => {
                    has_escaped_close = true;
                    pos += 2;
                }
                Some(_) => {
                    // escape pairs may carry a multi-byte char
                    let ch_len = rule[pos + 1..].chars().next().map_or(1, char::len_utf8);
                    pos += 1 + ch_len;
                }
            },
            _ => pos += 1,
        }
    }

    let raw = &rule[start..pos];

    let config = if raw.is_empty() {
        None
    } else if has_escaped_close {
        Some(Cow::Owned(unescape_close(raw)))
    } else {
        Some(Cow::Borrowed(raw))
    };

    (config, pos)
}

fn unescape_close(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('>') => out.push('>'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Reads an optional `[A-Za-z_][A-Za-z0-9_]*` identifier.
fn scan_ident(rule: &str, start: usize) -> (Option<&str>, usize) {
    let bytes = rule.as_bytes();

    match bytes.get(start) {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return (None, start),
    }

    let end = start
        + bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count();

    (Some(&rule[start..end]), end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(text: &str) -> Token<'_> {
        Token::Literal(Cow::Borrowed(text))
    }

    fn dynamic<'a>(name: Option<&'a str>, filter: &'a str, config: Option<&'a str>) -> Token<'a> {
        Token::Dynamic {
            name,
            filter,
            config: config.map(Cow::Borrowed),
        }
    }

    fn scan(rule: &str) -> Vec<Token<'_>> {
        Token::scan(rule).collect()
    }

    #[test]
    fn static_rule() {
        assert_eq!(scan("/about/team"), [lit("/about/team")]);
        assert!(scan("").is_empty());
    }

    #[test]
    fn long_form() {
        assert_eq!(
            scan("/user/<id:int>/posts/<slug>"),
            [
                lit("/user/"),
                dynamic(Some("id"), "int", None),
                lit("/posts/"),
                dynamic(Some("slug"), "default", None),
            ]
        );

        assert_eq!(
            scan("<a>"),
            [dynamic(Some("a"), "default", None)]
        );
        assert_eq!(scan("<>"), [dynamic(None, "default", None)]);
        assert_eq!(scan("<:path>"), [dynamic(None, "path", None)]);
        assert_eq!(scan("<a:>"), [dynamic(Some("a"), "default", None)]);
        assert_eq!(scan("<a:int:>"), [dynamic(Some("a"), "int", None)]);
        assert_eq!(
            scan("<a::[0-9]+>"),
            [dynamic(Some("a"), "default", Some("[0-9]+"))]
        );
        assert_eq!(
            scan(r"/<y:re:\d{4}>.html"),
            [
                lit("/"),
                dynamic(Some("y"), "re", Some(r"\d{4}")),
                lit(".html"),
            ]
        );
    }

    #[test]
    fn long_form_config_escapes() {
        let tokens = scan(r"<a:re:x\>y>");
        assert_eq!(
            tokens,
            [Token::Dynamic {
                name: Some("a"),
                filter: "re",
                config: Some(Cow::Owned("x>y".to_owned())),
            }]
        );

        // escaped backslash keeps its regex meaning and does not escape the close
        assert_eq!(scan(r"<a:re:x\\>"), [dynamic(Some("a"), "re", Some(r"x\\"))]);
    }

    #[test]
    fn malformed_long_form_is_literal() {
        assert_eq!(scan("/a<b"), [lit("/a<b")]);
        assert_eq!(scan("/a<b c>"), [lit("/a<b c>")]);

        // scanning resumes right after the rejected `<`
        assert_eq!(
            scan("<name:in-t>"),
            [lit("<name"), dynamic(Some("in"), "default", None), lit("-t>")]
        );
    }

    #[test]
    fn short_form() {
        assert_eq!(
            scan("/user/:id"),
            [lit("/user/"), dynamic(Some("id"), "default", None)]
        );
        assert_eq!(
            scan("/:id#[0-9]+#/x"),
            [
                lit("/"),
                dynamic(Some("id"), "default", Some("[0-9]+")),
                lit("/x"),
            ]
        );
        assert_eq!(scan("/:"), [lit("/"), dynamic(None, "default", None)]);
        assert_eq!(
            scan("/:#.*#"),
            [lit("/"), dynamic(None, "default", Some(".*"))]
        );
        assert_eq!(scan(":a##"), [dynamic(Some("a"), "default", None)]);

        // unterminated config is literal
        assert_eq!(
            scan(":a#b"),
            [dynamic(Some("a"), "default", None), lit("#b")]
        );
    }

    #[test]
    fn escaped_markers() {
        assert_eq!(scan(r"a\:b"), [Token::Literal(Cow::Owned("a:b".to_owned()))]);
        assert_eq!(
            scan(r"/x\<id:int>"),
            [Token::Literal(Cow::Owned("/x<id:int>".to_owned()))]
        );

        // three backslashes escape, leaving two
        assert_eq!(
            scan(r"a\\\:b"),
            [Token::Literal(Cow::Owned(r"a\\:b".to_owned()))]
        );

        // two backslashes do not escape and stay in the text
        assert_eq!(
            scan(r"a\\:b"),
            [lit(r"a\\"), dynamic(Some("b"), "default", None)]
        );

        // backslashes without a following marker are plain text
        assert_eq!(scan(r"a\b"), [lit(r"a\b")]);
    }

    #[test]
    fn escaped_then_live_marker() {
        assert_eq!(
            scan(r"/\:x/:y"),
            [
                Token::Literal(Cow::Owned("/:x/".to_owned())),
                dynamic(Some("y"), "default", None),
            ]
        );
    }

    #[test]
    fn non_ascii_text() {
        assert_eq!(
            scan("/café/<nom>/ü"),
            [
                lit("/café/"),
                dynamic(Some("nom"), "default", None),
                lit("/ü"),
            ]
        );
    }
}
