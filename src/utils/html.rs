// src/utils/html.rs

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::utils::style::StyleSanitizer;

/// Tags that survive sanitization by default.
pub const DEFAULT_ALLOWED_TAGS: &[&str] = &["p", "b", "strong", "i", "em", "ul", "li", "br", "span"];

/// Elements removed together with their content. These can never be allowed.
pub const DANGEROUS_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "link", "meta",
];

/// Dangerous elements that carry a body; the others are removed as lone tags.
const DANGEROUS_CONTAINERS: &[&str] = &["script", "style", "iframe", "object"];

/// Matched ASCII case-insensitively, anywhere in the text.
const SCRIPT_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

const LINE_BREAK: &str = "br";
const PARAGRAPH: &str = "p";

/// Opening or closing tag. The name must be followed by whitespace, `/` or `>`.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)([\s/][^>]*)?>").expect("valid regex")
});

static TAG_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

/// One attribute: a name, then optionally `=` and a double-quoted, single-quoted
/// or bare value. An unterminated quote runs to the end of the tag.
static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s/=]+)(?:\s*=\s*(?:"([^"]*)"?|'([^']*)'?|(\S*)))?"#).expect("valid regex")
});

/// A piece of markup as seen by the sanitizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Tag(TagToken<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken<'a> {
    /// Lowercase tag name.
    pub name: String,
    pub closing: bool,
    /// Raw attribute source, everything between the name and `>`.
    pub attributes: &'a str,
}

/// Splits markup into text and tag tokens.
///
/// The sanitizer only relies on this seam, so the linear scanner below can be
/// replaced by a real HTML tokenizer if the allowed vocabulary ever needs
/// nesting-aware handling.
pub trait TagTokenizer {
    fn tokenize<'a>(&self, input: &'a str) -> Vec<Token<'a>>;
}

/// Linear regex scan over well-formed tag syntax. Anything else is text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexTagTokenizer;

impl TagTokenizer for RegexTagTokenizer {
    fn tokenize<'a>(&self, input: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut last = 0;

        for caps in TAG_RE.captures_iter(input) {
            let Some(whole) = caps.get(0) else { continue };

            if whole.start() > last {
                tokens.push(Token::Text(&input[last..whole.start()]));
            }
            tokens.push(Token::Tag(TagToken {
                name: caps[2].to_ascii_lowercase(),
                closing: !caps[1].is_empty(),
                attributes: caps.get(3).map_or("", |m| m.as_str()),
            }));
            last = whole.end();
        }

        if last < input.len() {
            tokens.push(Token::Text(&input[last..]));
        }
        tokens
    }
}

/// Whitelist-based HTML rewriter.
///
/// Works in two linear scans over the input:
/// 1. removes dangerous elements (with their content), comments, script-capable
///    URL schemes and `on*=` event handlers;
/// 2. rewrites every tag. Disallowed tags are unwrapped and allowed tags are
///    re-emitted in lowercase with only a sanitized `style` attribute. Schemes and
///    handlers joined up by an unwrapped tag are dropped, and so are empty allowed
///    pairs other than `<p></p>`.
///
/// Each scan writes into a buffer and re-checks only its tail after every
/// character, so a construct reassembled by a removal is caught as soon as its
/// last character lands. The output is the fixpoint that repeating the removals
/// until nothing changes would reach, without the repeated passes.
///
/// Stray `<` characters in text are emitted as `&lt;` so no removal can
/// reassemble a live tag.
#[derive(Debug, Clone)]
pub struct HtmlSanitizer<T = RegexTagTokenizer> {
    allowed_tags: HashSet<String>,
    style: StyleSanitizer,
    tokenizer: T,
}

impl HtmlSanitizer<RegexTagTokenizer> {
    pub fn new<I, S>(allowed_tags: I, style: StyleSanitizer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allowed = HashSet::new();
        for tag in allowed_tags {
            let tag = tag.as_ref().trim().to_ascii_lowercase();
            if tag.is_empty() {
                continue;
            }
            if DANGEROUS_TAGS.contains(&tag.as_str()) {
                tracing::warn!("Refusing to allow dangerous tag '{}'", tag);
                continue;
            }
            allowed.insert(tag);
        }

        Self {
            allowed_tags: allowed,
            style,
            tokenizer: RegexTagTokenizer,
        }
    }
}

impl Default for HtmlSanitizer<RegexTagTokenizer> {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_TAGS, StyleSanitizer::default())
    }
}

impl<T: TagTokenizer> HtmlSanitizer<T> {
    /// Swaps the tokenizer, keeping the tag and style whitelists.
    pub fn with_tokenizer<U: TagTokenizer>(self, tokenizer: U) -> HtmlSanitizer<U> {
        HtmlSanitizer {
            allowed_tags: self.allowed_tags,
            style: self.style,
            tokenizer,
        }
    }

    pub fn is_allowed(&self, tag: &str) -> bool {
        self.allowed_tags.contains(&tag.to_ascii_lowercase())
    }

    /// Sanitizes `input`. Never fails; `None` yields an empty string.
    pub fn sanitize(&self, input: Option<&str>) -> String {
        match input {
            Some(input) if !input.is_empty() => self.clean(input),
            _ => String::new(),
        }
    }

    /// Runs both scans over `input`.
    pub fn clean(&self, input: &str) -> String {
        let stripped = strip_dangerous(input);
        if stripped.len() != input.len() {
            tracing::debug!(
                "Removed {} bytes of dangerous markup",
                input.len() - stripped.len()
            );
        }

        self.rewrite_tags(&stripped)
    }

    fn rewrite_tags(&self, input: &str) -> String {
        let mut out = Markup::with_capacity(input.len());

        for token in self.tokenizer.tokenize(input) {
            match token {
                Token::Text(text) => out.push_text(text),
                Token::Tag(tag) => self.push_tag(&mut out, &tag),
            }
        }
        out.buf
    }

    fn push_tag(&self, out: &mut Markup, tag: &TagToken<'_>) {
        if !self.allowed_tags.contains(&tag.name) {
            return;
        }

        if tag.name == LINE_BREAK {
            out.buf.push_str("<br />");
        } else if tag.closing {
            out.close(&tag.name);
        } else {
            let style = self.sanitize_attributes(tag.attributes);
            out.open(&tag.name, style.as_deref());
        }
    }

    /// Keeps only a sanitized `style` attribute; everything else is dropped.
    fn sanitize_attributes(&self, attributes: &str) -> Option<String> {
        let style = self.style.sanitize(style_attribute(attributes)?)?;
        // A whitelisted property name may itself end in a scheme (`x-data: 1`).
        (strip_scripting(&style) == style).then_some(style)
    }
}

/// Returns true if `input` contains anything that looks like a tag.
pub fn contains_markup(input: &str) -> bool {
    TAG_RE.is_match(input) || COMMENT_RE.is_match(input)
}

/// Removes every tag marker, keeping the text between them.
///
/// This is a plain-text view for scanning, not a sanitizer.
pub fn strip_tags(input: &str) -> Cow<'_, str> {
    TAG_MARKER_RE.replace_all(input, "")
}

/// Value of the first attribute actually named `style`.
fn style_attribute(attributes: &str) -> Option<&str> {
    ATTRIBUTE_RE
        .captures_iter(attributes)
        .find(|caps| caps[1].eq_ignore_ascii_case("style"))
        .and_then(|caps| {
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
        })
}

/// Output of the rewrite scan.
struct Markup {
    buf: String,
    /// Opening tags written so far: name, start offset, end offset.
    open: Vec<(String, usize, usize)>,
}

impl Markup {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            open: Vec::new(),
        }
    }

    fn push_text(&mut self, text: &str) {
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            rest = &rest[c.len_utf8()..];
            if c == '<' {
                self.buf.push_str("&lt;");
                continue;
            }

            self.buf.push(c);
            match scripting_suffix(&self.buf) {
                Some(Scripting::Scheme(at)) => self.buf.truncate(at),
                Some(Scripting::Handler(at)) => {
                    self.buf.truncate(at);
                    rest = &rest[handler_value_len(rest)..];
                }
                None => {}
            }
        }
    }

    fn open(&mut self, name: &str, style: Option<&str>) {
        let start = self.buf.len();
        self.buf.push('<');
        self.buf.push_str(name);
        if let Some(style) = style {
            self.buf.push_str(" style=\"");
            self.buf.push_str(style);
            self.buf.push('"');
        }
        self.buf.push('>');
        self.open.push((name.to_string(), start, self.buf.len()));
    }

    /// Writes a closing tag, or drops the whole pair when its opening tag is
    /// the last thing written.
    fn close(&mut self, name: &str) {
        let empty = name != PARAGRAPH
            && self
                .open
                .last()
                .is_some_and(|(open, _, end)| open == name && *end == self.buf.len());

        if empty {
            if let Some((_, start, _)) = self.open.pop() {
                self.buf.truncate(start);
            }
            return;
        }

        self.buf.push_str("</");
        self.buf.push_str(name);
        self.buf.push('>');
    }
}

fn strip_dangerous(input: &str) -> String {
    let mut scrubber = Scrubber::with_capacity(input.len());
    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        if scrubber.push(c) {
            rest = &rest[handler_value_len(rest)..];
        }
    }
    scrubber.out
}

/// Output of the dangerous-construct scan.
///
/// Alongside the text it remembers where each surviving `<` and `>` sits, the
/// earliest unclosed comment, and where the body of each open dangerous
/// container begins. Every removal is then a truncation of the tail.
struct Scrubber {
    out: String,
    lts: Vec<usize>,
    gts: Vec<usize>,
    comment: Option<usize>,
    bodies: [Option<usize>; DANGEROUS_CONTAINERS.len()],
}

impl Scrubber {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            lts: Vec::new(),
            gts: Vec::new(),
            comment: None,
            bodies: [None; DANGEROUS_CONTAINERS.len()],
        }
    }

    /// Appends `c`. Returns true when an event-handler name was just removed;
    /// the caller then drops the handler's value from its input.
    fn push(&mut self, c: char) -> bool {
        self.out.push(c);
        let end = self.out.len();

        match c {
            '<' => self.lts.push(end - 1),
            '>' => self.close_angle(),
            '-' => {
                if self.comment.is_none() && self.out.ends_with(COMMENT_OPEN) {
                    self.comment = Some(end - COMMENT_OPEN.len());
                }
            }
            ':' | '=' => match scripting_suffix(&self.out) {
                Some(Scripting::Scheme(at)) => self.truncate(at),
                Some(Scripting::Handler(at)) => {
                    self.truncate(at);
                    return true;
                }
                None => {}
            },
            _ => {}
        }
        false
    }

    fn close_angle(&mut self) {
        let end = self.out.len();

        if let Some(start) = self.comment {
            let min_len = COMMENT_OPEN.len() + COMMENT_CLOSE.len();
            if end - start >= min_len && self.out.ends_with(COMMENT_CLOSE) {
                self.truncate(start);
                return;
            }
        }

        // Only the first and the last `<` since the previous `>` can start a
        // dangerous tag here; anything in between is unwrapped by the rewrite.
        let floor = self.gts.last().map_or(0, |&gt| gt + 1);
        let first = self.lts.partition_point(|&lt| lt < floor);
        let candidates = [self.lts.get(first).copied(), self.lts.last().copied()];

        for start in candidates.into_iter().flatten() {
            if start < floor {
                continue;
            }
            if let Some((closing, name)) = dangerous_tag(&self.out[start..]) {
                self.remove_dangerous(start, closing, name);
                return;
            }
        }
        self.gts.push(end - 1);
    }

    fn remove_dangerous(&mut self, start: usize, closing: bool, name: &str) {
        let Some(kind) = DANGEROUS_CONTAINERS.iter().position(|c| *c == name) else {
            self.truncate(start);
            return;
        };

        if closing {
            // The earliest open body of this kind ends here, with everything
            // after it. Without one the closing tag goes alone.
            let body = self.bodies[kind].take();
            self.truncate(body.unwrap_or(start));
        } else {
            self.truncate(start);
            if self.bodies[kind].is_none() {
                self.bodies[kind] = Some(start);
            }
        }
    }

    fn truncate(&mut self, len: usize) {
        self.out.truncate(len);
        while self.lts.last().is_some_and(|&lt| lt >= len) {
            self.lts.pop();
        }
        while self.gts.last().is_some_and(|&gt| gt >= len) {
            self.gts.pop();
        }
        if self.comment.is_some_and(|start| start + COMMENT_OPEN.len() > len) {
            self.comment = None;
        }
        for body in &mut self.bodies {
            if body.is_some_and(|at| at > len) {
                *body = None;
            }
        }
    }
}

/// `(closing, name)` if `tag` (running from `<` to `>`) opens or closes a
/// dangerous element.
fn dangerous_tag(tag: &str) -> Option<(bool, &'static str)> {
    let body = tag.strip_prefix('<')?;
    let (closing, body) = match body.strip_prefix('/') {
        Some(body) => (true, body),
        None => (false, body),
    };

    DANGEROUS_TAGS
        .iter()
        .copied()
        .find(|name| {
            body.get(..name.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(name))
                && !body[name.len()..].starts_with(is_word)
        })
        .map(|name| (closing, name))
}

/// A script-capable construct found at the end of a buffer.
enum Scripting {
    /// Scheme prefix starting at this offset.
    Scheme(usize),
    /// `on<word>=` starting at this offset. Its value is still ahead in the input.
    Handler(usize),
}

/// Checks whether `out`, which just received its last character, now ends in a
/// scheme prefix or an event-handler name.
fn scripting_suffix(out: &str) -> Option<Scripting> {
    let bytes = out.as_bytes();
    match *bytes.last()? {
        b':' => SCRIPT_SCHEMES.iter().find_map(|scheme| {
            let at = bytes.len().checked_sub(scheme.len())?;
            bytes[at..]
                .eq_ignore_ascii_case(scheme.as_bytes())
                .then_some(Scripting::Scheme(at))
        }),
        b'=' => {
            let head = out[..out.len() - 1].trim_end();
            let (start, _) = head
                .char_indices()
                .rev()
                .take_while(|&(_, c)| is_word(c))
                .last()?;
            let name = &head.as_bytes()[start..];
            (name.len() > 2 && name[..2].eq_ignore_ascii_case(b"on"))
                .then_some(Scripting::Handler(start))
        }
        _ => None,
    }
}

/// Length of the value after a removed `on<word>=`: optional whitespace, then a
/// quoted string, or a bare run up to whitespace or an angle bracket.
fn handler_value_len(rest: &str) -> usize {
    let value = rest.trim_start();
    let skipped = rest.len() - value.len();

    let quoted = value
        .chars()
        .next()
        .filter(|&q| q == '"' || q == '\'')
        .and_then(|q| {
            let tail = &value[1..];
            tail.find([q, '<', '>'])
                .filter(|&i| tail[i..].starts_with(q))
                .map(|i| i + 2)
        });
    let len = quoted.unwrap_or_else(|| {
        value
            .find(|c: char| c.is_whitespace() || c == '<' || c == '>')
            .unwrap_or(value.len())
    });

    skipped + len
}

/// Removes script-capable scheme prefixes and `on*=` handlers, including any
/// that a removal joins back together.
fn strip_scripting(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        out.push(c);
        match scripting_suffix(&out) {
            Some(Scripting::Scheme(at)) => out.truncate(at),
            Some(Scripting::Handler(at)) => {
                out.truncate(at);
                rest = &rest[handler_value_len(rest)..];
            }
            None => {}
        }
    }
    out
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
