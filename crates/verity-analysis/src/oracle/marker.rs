//! Recursive-descent parser for marker and flow comment bodies.
//!
//! ```text
//! marker    := "Noncompliant" shift? count? (attrs | message | text)* flows?
//! shift     := "@" ("+" INT | "-" INT | INT)
//! count     := INT                      1..=MAX_COUNT
//! attrs     := "[[" attr (";" attr)* "]]"
//! attr      := NAME "=" VALUE
//! message   := "{{" TEXT "}}"
//! flows     := ("flow@" ID ("," ID)* (attrs | message | text)*)+
//! ```
//!
//! Free text between the parts is ignored; stray `]]` or `}}` is an error.

use verity_core::errors::OracleError;

/// A line reference, relative to some anchor line or absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineRef {
    Relative(i64),
    Absolute(u32),
}

impl LineRef {
    pub(crate) fn resolve(self, anchor: u32) -> i64 {
        match self {
            Self::Relative(offset) => i64::from(anchor).saturating_add(offset),
            Self::Absolute(line) => line as i64,
        }
    }
}

/// Attribute names, after alias folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrName {
    StartColumn,
    EndColumn,
    EndLine,
    Secondary,
    EffortToFix,
    Flows,
    Message,
    Order,
}

impl AttrName {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "sc" | "startColumn" => Some(Self::StartColumn),
            "ec" | "endColumn" => Some(Self::EndColumn),
            "el" | "endLine" => Some(Self::EndLine),
            "secondary" => Some(Self::Secondary),
            "effortToFix" => Some(Self::EffortToFix),
            "flows" => Some(Self::Flows),
            "message" => Some(Self::Message),
            "order" => Some(Self::Order),
            _ => None,
        }
    }
}

/// Where an attribute list appears; each place admits a different set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrScope {
    Marker,
    Flow,
}

impl AttrScope {
    fn admits(self, name: AttrName) -> bool {
        match self {
            Self::Marker => name != AttrName::Order,
            Self::Flow => matches!(
                name,
                AttrName::StartColumn | AttrName::EndColumn | AttrName::Message | AttrName::Order
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Attributes {
    pub start_column: Option<u32>,
    pub end_column: Option<u32>,
    pub end_line: Option<LineRef>,
    pub secondary: Option<Vec<LineRef>>,
    pub effort_to_fix: Option<f64>,
    pub flows: Option<Vec<String>>,
    pub message: Option<String>,
    pub order: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedMarker {
    pub shift: LineRef,
    pub count: Option<u32>,
    pub attributes: Attributes,
    pub flow_steps: Vec<ParsedFlowStep>,
    /// Byte offset, within the parsed body, where the flow declarations begin.
    pub flows_offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedFlowStep {
    pub id: String,
    /// Byte offset of the `flow@` token within the parsed text.
    pub offset: usize,
    pub attributes: Attributes,
}

struct Cursor<'s> {
    text: &'s str,
    pos: usize,
    line: u32,
}

impl<'s> Cursor<'s> {
    fn new(text: &'s str, line: u32) -> Self {
        Self { text, pos: 0, line }
    }

    fn rest(&self) -> &'s str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Run of characters up to whitespace or a `[[`, `{{`, `]]`, `}}` delimiter.
    fn token(&mut self) -> &'s str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || ["[[", "{{", "]]", "}}"].iter().any(|d| self.starts_with(d)) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.text[start..self.pos]
    }

    /// Text up to `close`, consuming the delimiter.
    fn delimited(&mut self, open: &'static str, close: &str) -> Result<&'s str, OracleError> {
        let rest = self.rest();
        match rest.find(close) {
            Some(idx) => {
                self.pos += idx + close.len();
                Ok(&rest[..idx])
            }
            None => Err(OracleError::Unterminated {
                line: self.line,
                delimiter: open,
            }),
        }
    }

    fn skip_free_text(&mut self) -> Result<(), OracleError> {
        for stray in ["]]", "}}"] {
            if self.starts_with(stray) {
                return Err(OracleError::UnexpectedToken {
                    line: self.line,
                    text: stray.to_string(),
                });
            }
        }
        if self.token().is_empty() {
            // Single character that cannot start a token: step over it.
            if let Some(c) = self.peek() {
                self.pos += c.len_utf8();
            }
        }
        Ok(())
    }
}

/// Parse the text following the `Noncompliant` keyword.
pub(crate) fn parse_marker(body: &str, line: u32) -> Result<ParsedMarker, OracleError> {
    let mut cur = Cursor::new(body, line);

    let shift = if cur.eat("@") {
        parse_shift(cur.token(), line)?
    } else {
        LineRef::Relative(0)
    };

    cur.skip_ws();
    let count = match cur.peek() {
        Some(c) if c.is_ascii_digit() => Some(parse_count(cur.token(), line)?),
        _ => None,
    };

    let mut attributes = Attributes::default();
    let mut flow_steps = Vec::new();
    let mut flows_offset = body.len();
    loop {
        cur.skip_ws();
        if cur.at_end() {
            break;
        }
        if cur.eat("[[") {
            let inner = cur.delimited("[[", "]]")?;
            parse_attributes(inner, line, AttrScope::Marker, &mut attributes)?;
        } else if cur.eat("{{") {
            let message = cur.delimited("{{", "}}")?;
            set_once(&mut attributes.message, message.to_string(), "message", line)?;
        } else if cur.starts_with("flow@") {
            flows_offset = cur.pos;
            flow_steps = parse_flows(cur.rest(), line)?
                .into_iter()
                .map(|mut step| {
                    step.offset += flows_offset;
                    step
                })
                .collect();
            break;
        } else {
            cur.skip_free_text()?;
        }
    }

    Ok(ParsedMarker {
        shift,
        count,
        attributes,
        flow_steps,
        flows_offset,
    })
}

/// Parse one or more `flow@ids ...` declarations. `text` starts at the first one.
pub(crate) fn parse_flows(text: &str, line: u32) -> Result<Vec<ParsedFlowStep>, OracleError> {
    let starts: Vec<usize> = text.match_indices("flow@").map(|(i, _)| i).collect();
    let mut steps = Vec::new();
    for (n, &start) in starts.iter().enumerate() {
        let end = starts.get(n + 1).copied().unwrap_or(text.len());
        let mut cur = Cursor::new(&text[start..end], line);
        cur.eat("flow@");
        let ids: Vec<String> = cur.token().split(',').map(|id| id.trim().to_string()).collect();
        if let Some(empty) = ids.iter().find(|id| id.is_empty()) {
            return Err(OracleError::InvalidFlow {
                id: empty.clone(),
                reason: format!("line {line}: empty flow id"),
            });
        }

        let mut attributes = Attributes::default();
        loop {
            cur.skip_ws();
            if cur.at_end() {
                break;
            }
            if cur.eat("[[") {
                let inner = cur.delimited("[[", "]]")?;
                parse_attributes(inner, line, AttrScope::Flow, &mut attributes)?;
            } else if cur.eat("{{") {
                let message = cur.delimited("{{", "}}")?;
                set_once(&mut attributes.message, message.to_string(), "message", line)?;
            } else {
                cur.skip_free_text()?;
            }
        }

        steps.extend(ids.into_iter().map(|id| ParsedFlowStep {
            id,
            offset: start,
            attributes: attributes.clone(),
        }));
    }
    Ok(steps)
}

fn parse_shift(token: &str, line: u32) -> Result<LineRef, OracleError> {
    line_ref(token).ok_or_else(|| OracleError::InvalidShift {
        line,
        shift: format!("@{token}"),
    })
}

/// Upper bound on `Noncompliant N`; each unit of count becomes a matcher slot.
pub(crate) const MAX_COUNT: u32 = 1000;

fn parse_count(token: &str, line: u32) -> Result<u32, OracleError> {
    match token.parse::<u32>() {
        Ok(n) if (1..=MAX_COUNT).contains(&n) => Ok(n),
        _ => Err(OracleError::InvalidCount {
            line,
            value: token.to_string(),
        }),
    }
}

fn parse_attributes(
    inner: &str,
    line: u32,
    scope: AttrScope,
    attrs: &mut Attributes,
) -> Result<(), OracleError> {
    for segment in inner.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((raw_name, raw_value)) = segment.split_once('=') else {
            return Err(OracleError::InvalidValue {
                line,
                name: segment.to_string(),
                value: String::new(),
                reason: "expected name=value".to_string(),
            });
        };
        let (raw_name, value) = (raw_name.trim(), raw_value.trim());
        let name = AttrName::parse(raw_name)
            .filter(|&n| scope.admits(n))
            .ok_or_else(|| OracleError::UnknownAttribute {
                line,
                name: raw_name.to_string(),
            })?;
        let invalid = |reason: &str| OracleError::InvalidValue {
            line,
            name: raw_name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match name {
            AttrName::StartColumn => {
                let v = positive(value).ok_or_else(|| invalid("expected a positive integer"))?;
                set_once(&mut attrs.start_column, v, raw_name, line)?;
            }
            AttrName::EndColumn => {
                let v = positive(value).ok_or_else(|| invalid("expected a positive integer"))?;
                set_once(&mut attrs.end_column, v, raw_name, line)?;
            }
            AttrName::EndLine => {
                let v = match line_ref(value) {
                    Some(LineRef::Relative(offset)) if offset < 0 => {
                        return Err(invalid("a relative end line must be +N"))
                    }
                    Some(r) => r,
                    None => return Err(invalid("expected N or +N")),
                };
                set_once(&mut attrs.end_line, v, raw_name, line)?;
            }
            AttrName::Secondary => {
                let refs = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| line_ref(s).ok_or_else(|| invalid("expected a comma list of N, +N or -N")))
                    .collect::<Result<Vec<_>, _>>()?;
                set_once(&mut attrs.secondary, refs, raw_name, line)?;
            }
            AttrName::EffortToFix => {
                let v = value
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .ok_or_else(|| invalid("expected a non-negative number"))?;
                set_once(&mut attrs.effort_to_fix, v, raw_name, line)?;
            }
            AttrName::Flows => {
                let ids = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                set_once(&mut attrs.flows, ids, raw_name, line)?;
            }
            AttrName::Message => {
                set_once(&mut attrs.message, value.to_string(), raw_name, line)?;
            }
            AttrName::Order => {
                let v = positive(value).ok_or_else(|| invalid("expected a positive integer"))?;
                set_once(&mut attrs.order, v, raw_name, line)?;
            }
        }
    }
    Ok(())
}

fn set_once<T>(slot: &mut Option<T>, value: T, name: &str, line: u32) -> Result<(), OracleError> {
    if slot.is_some() {
        return Err(OracleError::DuplicateAttribute {
            line,
            name: name.to_string(),
        });
    }
    *slot = Some(value);
    Ok(())
}

fn positive(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|&v| v > 0)
}

/// `N` (absolute), `+N` or `-N` (relative).
fn line_ref(value: &str) -> Option<LineRef> {
    let (sign, digits) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => (0, value),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match sign {
        0 => digits.parse::<u32>().ok().map(LineRef::Absolute),
        s => digits.parse::<i64>().ok().map(|v| LineRef::Relative(s * v)),
    }
}
